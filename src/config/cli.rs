use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Where the command line writes its result: a file, or stdout when no path is given.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn write(&self, data: &[u8]) -> Result<String> {
        match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, data)?;
                Ok(path.display().to_string())
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(data)?;
                stdout.flush()?;
                Ok("stdout".to_string())
            }
        }
    }
}

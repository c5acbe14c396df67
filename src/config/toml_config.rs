use crate::adapters::http::DEFAULT_FETCH_TIMEOUT;
use crate::core::codec::{CodecLimits, DEFAULT_MAX_POINTS, DEFAULT_MAX_TRIANGLES};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, TriangulatorError};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8080";
pub const MAX_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    pub codec: Option<CodecConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,
    pub timeout_ms: Option<u64>,
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    pub max_points: Option<u32>,
    pub max_triangles: Option<u32>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_UPSTREAM_URL)
    }
}

impl TomlConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            upstream: UpstreamConfig {
                base_url: base_url.to_string(),
                timeout_ms: None,
            },
            codec: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TriangulatorError::InvalidConfigValue {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| TriangulatorError::internal(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("upstream.base_url", &self.upstream.base_url)?;

        if let Some(timeout_ms) = self.upstream.timeout_ms {
            validate_range("upstream.timeout_ms", timeout_ms, 1, MAX_TIMEOUT_MS)?;
        }

        let limits = self.codec_limits();
        validate_positive_number("codec.max_points", limits.max_points as usize, 1)?;
        validate_positive_number("codec.max_triangles", limits.max_triangles as usize, 1)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn upstream_base_url(&self) -> &str {
        &self.upstream.base_url
    }

    fn fetch_timeout(&self) -> Duration {
        self.upstream
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    fn codec_limits(&self) -> CodecLimits {
        let codec = self.codec.as_ref();
        CodecLimits {
            max_points: codec
                .and_then(|c| c.max_points)
                .unwrap_or(DEFAULT_MAX_POINTS),
            max_triangles: codec
                .and_then(|c| c.max_triangles)
                .unwrap_or(DEFAULT_MAX_TRIANGLES),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, OutputFormat};

pub use crate::adapters::http::HttpPointSetFetcher;
pub use crate::config::{cli::OutputSink, toml_config::TomlConfig};
pub use crate::core::classifier::{classify, Outcome};
pub use crate::core::codec::{Codec, CodecLimits};
pub use crate::core::service::{TriangulationResponse, TriangulationService};
pub use crate::core::triangulation::triangulate;
pub use crate::domain::model::{Point, PointSet, PointSetId, Triangle, TriangulationResult};
pub use crate::domain::ports::{ConfigProvider, PointSetFetcher};
pub use crate::utils::error::{ErrorCategory, ErrorKind, Result, TriangulatorError};

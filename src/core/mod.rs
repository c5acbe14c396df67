pub mod classifier;
pub mod codec;
pub mod service;
pub mod triangulation;

pub use crate::domain::model::{Point, PointSet, PointSetId, Triangle, TriangulationResult};
pub use crate::domain::ports::{ConfigProvider, PointSetFetcher};
pub use crate::utils::error::Result;

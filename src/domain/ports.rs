use crate::core::codec::CodecLimits;
use crate::domain::model::{PointSet, PointSetId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves point sets from the point set manager.
///
/// Implementations must report failures using only the upstream vocabulary:
/// `InvalidIdentifier`, `NotFound`, `UpstreamUnavailable`, `Timeout` and
/// `MalformedUpstreamResponse`.
#[async_trait]
pub trait PointSetFetcher: Send + Sync {
    async fn fetch(&self, id: &PointSetId) -> Result<PointSet>;
}

pub trait ConfigProvider: Send + Sync {
    fn upstream_base_url(&self) -> &str;
    fn fetch_timeout(&self) -> Duration;
    fn codec_limits(&self) -> CodecLimits;
}

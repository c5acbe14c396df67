use crate::core::codec::{Codec, HEADER_SIZE, POINT_RECORD_SIZE};
use crate::core::{ConfigProvider, PointSet, PointSetFetcher, PointSetId};
use crate::utils::error::{Result, TriangulatorError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches binary point sets from the point set manager over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPointSetFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
    codec: Codec,
}

impl HttpPointSetFetcher {
    pub fn new(base_url: &str, timeout: Duration, codec: Codec) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriangulatorError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            codec,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.upstream_base_url(),
            config.fetch_timeout(),
            Codec::new(config.codec_limits()),
        )
    }

    fn endpoint(&self, id: &PointSetId) -> String {
        format!("{}/pointset/{}", self.base_url, id)
    }

    /// Largest body a point set within the codec's ceiling can occupy.
    fn body_limit(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.codec.limits().max_points) * POINT_RECORD_SIZE as u64
    }

    fn oversized_body(&self, len: u64) -> TriangulatorError {
        TriangulatorError::MalformedUpstreamResponse {
            reason: format!(
                "Response body of at least {} bytes exceeds the {} byte limit",
                len,
                self.body_limit()
            ),
        }
    }

    /// Reads the body chunk by chunk, giving up as soon as it passes the limit.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.body_limit();
        if let Some(len) = response.content_length() {
            if len > limit {
                return Err(self.oversized_body(len));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport_error(e))? {
            let len = (body.len() + chunk.len()) as u64;
            if len > limit {
                return Err(self.oversized_body(len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn transport_error(&self, error: reqwest::Error) -> TriangulatorError {
        if error.is_timeout() {
            TriangulatorError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            TriangulatorError::UpstreamUnavailable {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl PointSetFetcher for HttpPointSetFetcher {
    async fn fetch(&self, id: &PointSetId) -> Result<PointSet> {
        let endpoint = self.endpoint(id);
        tracing::debug!("Requesting point set from: {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!("Point set manager response status: {}", status);

        match status {
            StatusCode::NOT_FOUND => {
                return Err(TriangulatorError::NotFound { id: id.to_string() });
            }
            StatusCode::BAD_REQUEST => {
                return Err(TriangulatorError::InvalidIdentifier { id: id.to_string() });
            }
            status if !status.is_success() => {
                return Err(TriangulatorError::UpstreamUnavailable {
                    reason: format!("Point set manager answered with status: {}", status),
                });
            }
            _ => {}
        }

        let body = self.read_body(response).await?;
        tracing::debug!("Received {} bytes for point set {}", body.len(), id);

        self.codec
            .decode_point_set(id.clone(), &body)
            .map_err(|e| TriangulatorError::MalformedUpstreamResponse {
                reason: e.to_string(),
            })
    }
}

use crate::core::classifier::{classify, Outcome};
use crate::core::codec::Codec;
use crate::core::triangulation::triangulate;
use crate::core::{ConfigProvider, PointSetFetcher};
use crate::domain::model::{PointSet, PointSetId, TriangulationResult};
use crate::utils::error::{Result, TriangulatorError};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::Instrument;

pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Lifecycle of one request. Any stage before `Responding` may move to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    ValidatingId,
    Fetching,
    Triangulating,
    Encoding,
    Responding,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangulationResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl TriangulationResponse {
    pub fn binary(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: BINARY_CONTENT_TYPE,
            body,
        }
    }

    pub fn from_outcome(outcome: &Outcome) -> Self {
        let body = serde_json::to_vec(outcome)
            .unwrap_or_else(|_| outcome.message.clone().into_bytes());
        Self {
            status: outcome.status,
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Per-request pipeline: validate id, fetch under a deadline, triangulate, encode.
pub struct TriangulationService<F: PointSetFetcher> {
    fetcher: F,
    codec: Codec,
    fetch_timeout: Duration,
}

impl<F: PointSetFetcher> TriangulationService<F> {
    pub fn new(fetcher: F, codec: Codec, fetch_timeout: Duration) -> Self {
        Self {
            fetcher,
            codec,
            fetch_timeout,
        }
    }

    pub fn from_config<C: ConfigProvider>(fetcher: F, config: &C) -> Self {
        Self::new(
            fetcher,
            Codec::new(config.codec_limits()),
            config.fetch_timeout(),
        )
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Runs the whole pipeline, including the encode ceiling, and returns the
    /// triangles rather than their wire form.
    pub async fn triangulate_by_id(&self, raw_id: &str) -> Result<TriangulationResult> {
        self.run(raw_id)
            .await
            .map(|(result, _)| result)
            .map_err(|(_, error)| error)
    }

    /// Runs the whole pipeline and always produces a classified response.
    pub async fn handle(&self, raw_id: &str) -> TriangulationResponse {
        let span = tracing::info_span!("triangulation", point_set_id = %raw_id);

        async move {
            match self.run(raw_id).await {
                Ok((_, body)) => {
                    enter(Stage::Responding);
                    tracing::info!("Responding with {} bytes", body.len());
                    TriangulationResponse::binary(body)
                }
                Err((stage, error)) => {
                    enter(Stage::Error);
                    let outcome = classify(&error);
                    if outcome.status.is_server_error() {
                        tracing::error!(
                            "Request failed during {:?}: {} ({})",
                            stage,
                            error,
                            outcome.status
                        );
                    } else {
                        tracing::warn!(
                            "Request rejected during {:?}: {} ({})",
                            stage,
                            error,
                            outcome.status
                        );
                    }
                    TriangulationResponse::from_outcome(&outcome)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// On failure, reports the stage that failed alongside the error.
    async fn run(
        &self,
        raw_id: &str,
    ) -> std::result::Result<(TriangulationResult, Vec<u8>), (Stage, TriangulatorError)> {
        enter(Stage::Received);

        enter(Stage::ValidatingId);
        let id = PointSetId::parse(raw_id).map_err(|error| (Stage::ValidatingId, error))?;

        enter(Stage::Fetching);
        let point_set = self
            .fetch_with_deadline(&id)
            .await
            .map_err(|error| (Stage::Fetching, error))?;
        tracing::debug!("Fetched {} points", point_set.len());

        enter(Stage::Triangulating);
        let result = triangulate(&point_set).map_err(|error| (Stage::Triangulating, error))?;

        enter(Stage::Encoding);
        let body = self
            .codec
            .encode_result(&result)
            .map_err(|error| (Stage::Encoding, error))?;

        Ok((result, body))
    }

    /// Dropping the fetch future on expiry cancels the in-flight request.
    async fn fetch_with_deadline(&self, id: &PointSetId) -> Result<PointSet> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(id)).await {
            Ok(result) => result,
            Err(_) => Err(TriangulatorError::Timeout {
                timeout_ms: u64::try_from(self.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = ?stage, "Entering stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::CodecLimits;
    use crate::domain::model::Point;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ID: &str = "9d3c2b1a-0f4e-4d5c-8b6a-7e9f0a1b2c3d";

    /// Serves canned outcomes and counts calls.
    struct StubFetcher {
        points: Option<Vec<(f64, f64)>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn serving(points: &[(f64, f64)]) -> Self {
            Self {
                points: Some(points.to_vec()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                points: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::serving(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])
            }
        }
    }

    #[async_trait]
    impl PointSetFetcher for StubFetcher {
        async fn fetch(&self, id: &PointSetId) -> Result<PointSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.points {
                Some(points) => {
                    let points = points
                        .iter()
                        .enumerate()
                        .map(|(index, &(x, y))| {
                            Point::new(x, y)
                                .ok_or(TriangulatorError::NonFiniteCoordinate { index })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(PointSet::new(id.clone(), points))
                }
                None => Err(TriangulatorError::NotFound {
                    id: id.to_string(),
                }),
            }
        }
    }

    fn service(fetcher: StubFetcher) -> TriangulationService<StubFetcher> {
        TriangulationService::new(fetcher, Codec::default(), Duration::from_millis(200))
    }

    fn error_code(response: &TriangulationResponse) -> String {
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        body["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_square_is_encoded_as_two_triangles() {
        let service = service(StubFetcher::serving(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]));

        let response = service.handle(ID).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type, BINARY_CONTENT_TYPE);
        let decoded = service.codec().decode_result(&response.body).unwrap();
        assert_eq!(decoded, service.triangulate_by_id(ID).await.unwrap());
        assert_eq!(decoded.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_fetcher() {
        let service = service(StubFetcher::serving(&[(0.0, 0.0)]));

        let response = service.handle("not-a-uuid").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);
        assert_eq!(error_code(&response), "INVALID_POINT_SET_ID");
        assert_eq!(service.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_point_set_is_404() {
        let response = service(StubFetcher::missing()).handle(ID).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&response), "POINT_SET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out_as_502() {
        let service = service(StubFetcher::slow(Duration::from_secs(5)));

        let started = std::time::Instant::now();
        let response = service.handle(ID).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        let err = service.triangulate_by_id(ID).await.unwrap_err();
        assert!(matches!(err, TriangulatorError::Timeout { timeout_ms: 200 }));
    }

    #[tokio::test]
    async fn test_two_points_is_500() {
        let response = service(StubFetcher::serving(&[(0.0, 0.0), (1.0, 1.0)]))
            .handle(ID)
            .await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_code(&response), "TRIANGULATION_FAILED");
    }

    #[tokio::test]
    async fn test_encoding_ceiling_is_classified() {
        let fetcher = StubFetcher::serving(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let codec = Codec::new(CodecLimits {
            max_points: 10,
            max_triangles: 1,
        });
        let service = TriangulationService::new(fetcher, codec, Duration::from_secs(1));

        let response = service.handle(ID).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_code(&response), "SERIALIZATION_FAILED");
    }

    #[tokio::test]
    async fn test_triangulate_by_id_enforces_encoding_ceiling() {
        let fetcher = StubFetcher::serving(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let codec = Codec::new(CodecLimits {
            max_points: 10,
            max_triangles: 1,
        });
        let service = TriangulationService::new(fetcher, codec, Duration::from_secs(1));

        let err = service.triangulate_by_id(ID).await.unwrap_err();
        assert!(matches!(
            err,
            TriangulatorError::OversizedDeclaration { count: 2, max: 1 }
        ));
    }

    #[tokio::test]
    async fn test_failures_report_the_stage_they_left() {
        let service = service(StubFetcher::missing());

        let (stage, _) = service.run("not-a-uuid").await.unwrap_err();
        assert_eq!(stage, Stage::ValidatingId);

        let (stage, err) = service.run(ID).await.unwrap_err();
        assert_eq!(stage, Stage::Fetching);
        assert!(matches!(err, TriangulatorError::NotFound { .. }));

        let (stage, _) = self::service(StubFetcher::serving(&[(0.0, 0.0)]))
            .run(ID)
            .await
            .unwrap_err();
        assert_eq!(stage, Stage::Triangulating);

        let codec = Codec::new(CodecLimits {
            max_points: 10,
            max_triangles: 1,
        });
        let square = StubFetcher::serving(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let (stage, _) = TriangulationService::new(square, codec, Duration::from_secs(1))
            .run(ID)
            .await
            .unwrap_err();
        assert_eq!(stage, Stage::Encoding);
    }
}

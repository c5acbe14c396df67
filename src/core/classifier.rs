use crate::utils::error::TriangulatorError;
use reqwest::StatusCode;
use serde::Serialize;

/// The externally visible result of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// Maps every error to exactly one status and machine-readable code.
///
/// The match is exhaustive: adding a variant to
/// [`TriangulatorError`] does not compile until it is classified here.
pub fn classify(error: &TriangulatorError) -> Outcome {
    let (status, code) = match error {
        TriangulatorError::InvalidIdentifier { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_POINT_SET_ID")
        }
        TriangulatorError::NotFound { .. } => (StatusCode::NOT_FOUND, "POINT_SET_NOT_FOUND"),
        TriangulatorError::UpstreamUnavailable { .. }
        | TriangulatorError::Timeout { .. }
        | TriangulatorError::MalformedUpstreamResponse { .. } => {
            (StatusCode::BAD_GATEWAY, "POINT_SET_MANAGER_UNAVAILABLE")
        }
        TriangulatorError::InsufficientPoints { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "TRIANGULATION_FAILED")
        }
        TriangulatorError::MalformedHeader { .. }
        | TriangulatorError::TruncatedPayload { .. }
        | TriangulatorError::OversizedDeclaration { .. }
        | TriangulatorError::NonFiniteCoordinate { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_FAILED")
        }
        TriangulatorError::InvalidConfigValue { .. }
        | TriangulatorError::Io(_)
        | TriangulatorError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    Outcome {
        status,
        code,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    fn sample(kind: ErrorKind) -> TriangulatorError {
        match kind {
            ErrorKind::InvalidIdentifier => TriangulatorError::InvalidIdentifier {
                id: "nope".to_string(),
            },
            ErrorKind::NotFound => TriangulatorError::NotFound {
                id: "missing".to_string(),
            },
            ErrorKind::UpstreamUnavailable => TriangulatorError::UpstreamUnavailable {
                reason: "connection refused".to_string(),
            },
            ErrorKind::Timeout => TriangulatorError::Timeout { timeout_ms: 5000 },
            ErrorKind::MalformedUpstreamResponse => TriangulatorError::MalformedUpstreamResponse {
                reason: "short body".to_string(),
            },
            ErrorKind::InsufficientPoints => TriangulatorError::InsufficientPoints { count: 2 },
            ErrorKind::MalformedHeader => TriangulatorError::MalformedHeader { len: 1 },
            ErrorKind::TruncatedPayload => TriangulatorError::TruncatedPayload {
                expected: 80,
                actual: 48,
            },
            ErrorKind::OversizedDeclaration => TriangulatorError::OversizedDeclaration {
                count: 10,
                max: 5,
            },
            ErrorKind::NonFiniteCoordinate => TriangulatorError::NonFiniteCoordinate { index: 0 },
            ErrorKind::InvalidConfigValue => TriangulatorError::InvalidConfigValue {
                field: "upstream.base_url".to_string(),
                value: String::new(),
                reason: "URL cannot be empty".to_string(),
            },
            ErrorKind::Io => {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into()
            }
            ErrorKind::Internal => TriangulatorError::internal("unexpected"),
        }
    }

    fn expected_status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::InvalidIdentifier => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamUnavailable
            | ErrorKind::Timeout
            | ErrorKind::MalformedUpstreamResponse => StatusCode::BAD_GATEWAY,
            ErrorKind::InsufficientPoints
            | ErrorKind::MalformedHeader
            | ErrorKind::TruncatedPayload
            | ErrorKind::OversizedDeclaration
            | ErrorKind::NonFiniteCoordinate
            | ErrorKind::InvalidConfigValue
            | ErrorKind::Io
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[test]
    fn test_every_kind_maps_to_its_status() {
        for kind in ErrorKind::ALL {
            let error = sample(kind);
            assert_eq!(error.kind(), kind);

            let outcome = classify(&error);
            assert_eq!(outcome.status, expected_status(kind), "{:?}", kind);
            assert!(!outcome.message.is_empty());
        }
    }

    #[test]
    fn test_outcome_carries_code_and_message() {
        let outcome = classify(&TriangulatorError::NotFound {
            id: "abc".to_string(),
        });
        assert_eq!(outcome.code, "POINT_SET_NOT_FOUND");
        assert_eq!(outcome.message, "Point set not found: abc");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "POINT_SET_NOT_FOUND", "message": "Point set not found: abc"})
        );
    }
}

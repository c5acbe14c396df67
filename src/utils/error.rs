use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriangulatorError {
    #[error("Point set id is not a valid UUID: {id}")]
    InvalidIdentifier { id: String },

    #[error("Point set not found: {id}")]
    NotFound { id: String },

    #[error("Point set manager unavailable: {reason}")]
    UpstreamUnavailable { reason: String },

    #[error("Point set manager did not answer within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Point set manager returned a malformed point set: {reason}")]
    MalformedUpstreamResponse { reason: String },

    #[error("At least 3 points are required, got {count}")]
    InsufficientPoints { count: usize },

    #[error("Payload too short to contain a header: {len} bytes")]
    MalformedHeader { len: usize },

    #[error("Payload size mismatch: header declares {expected} bytes, {actual} available")]
    TruncatedPayload { expected: u64, actual: u64 },

    #[error("Declared count {count} exceeds the maximum of {max}")]
    OversizedDeclaration { count: u64, max: u64 },

    #[error("Non-finite coordinate at point {index}")]
    NonFiniteCoordinate { index: usize },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Fieldless mirror of [`TriangulatorError`], used to enumerate every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidIdentifier,
    NotFound,
    UpstreamUnavailable,
    Timeout,
    MalformedUpstreamResponse,
    InsufficientPoints,
    MalformedHeader,
    TruncatedPayload,
    OversizedDeclaration,
    NonFiniteCoordinate,
    InvalidConfigValue,
    Io,
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::InvalidIdentifier,
        ErrorKind::NotFound,
        ErrorKind::UpstreamUnavailable,
        ErrorKind::Timeout,
        ErrorKind::MalformedUpstreamResponse,
        ErrorKind::InsufficientPoints,
        ErrorKind::MalformedHeader,
        ErrorKind::TruncatedPayload,
        ErrorKind::OversizedDeclaration,
        ErrorKind::NonFiniteCoordinate,
        ErrorKind::InvalidConfigValue,
        ErrorKind::Io,
        ErrorKind::Internal,
    ];

    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::InvalidIdentifier => ErrorCategory::Input,
            ErrorKind::NotFound
            | ErrorKind::UpstreamUnavailable
            | ErrorKind::Timeout
            | ErrorKind::MalformedUpstreamResponse => ErrorCategory::Upstream,
            ErrorKind::MalformedHeader
            | ErrorKind::TruncatedPayload
            | ErrorKind::OversizedDeclaration
            | ErrorKind::NonFiniteCoordinate => ErrorCategory::Codec,
            ErrorKind::InsufficientPoints => ErrorCategory::Algorithm,
            ErrorKind::InvalidConfigValue | ErrorKind::Io | ErrorKind::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Upstream,
    Codec,
    Algorithm,
    Internal,
}

impl TriangulatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TriangulatorError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            TriangulatorError::NotFound { .. } => ErrorKind::NotFound,
            TriangulatorError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            TriangulatorError::Timeout { .. } => ErrorKind::Timeout,
            TriangulatorError::MalformedUpstreamResponse { .. } => {
                ErrorKind::MalformedUpstreamResponse
            }
            TriangulatorError::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
            TriangulatorError::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            TriangulatorError::TruncatedPayload { .. } => ErrorKind::TruncatedPayload,
            TriangulatorError::OversizedDeclaration { .. } => ErrorKind::OversizedDeclaration,
            TriangulatorError::NonFiniteCoordinate { .. } => ErrorKind::NonFiniteCoordinate,
            TriangulatorError::InvalidConfigValue { .. } => ErrorKind::InvalidConfigValue,
            TriangulatorError::Io(_) => ErrorKind::Io,
            TriangulatorError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TriangulatorError::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriangulatorError>;

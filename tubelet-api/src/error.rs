use thiserror::Error;
use tubelet_http::HttpError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("server error {status} {reason}")]
    ServerError { status: u16, reason: String },

    #[error("HTTP error {status} {reason}")]
    Http { status: u16, reason: String },

    /// An authenticated operation was attempted without configured credentials.
    #[error("authentication required but no credentials are configured")]
    AuthRequired,

    /// A mutation (subscribe, unsubscribe, mark watched) was rejected.
    #[error("request failed with {status} {reason}")]
    RequestFailed { status: u16, reason: String },

    #[error("unknown result type: {0}")]
    UnknownResultType(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid instance URL: {0}")]
    Url(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl ApiError {
    /// Status code for the variants produced by a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::ServerError { status, .. }
            | ApiError::Http { status, .. }
            | ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_http_status(&self) -> bool {
        self.status().is_some()
    }

    /// Re-tag a status error as the failure of a mutation.
    pub(crate) fn into_request_failed(self) -> Self {
        match self {
            ApiError::NotFound { .. } => ApiError::RequestFailed {
                status: 404,
                reason: "Not Found".into(),
            },
            ApiError::ServerError { status, reason } | ApiError::Http { status, reason } => {
                ApiError::RequestFailed { status, reason }
            }
            other => other,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(_) => ApiError::Timeout,
            HttpError::Status {
                status,
                reason,
                message,
            } => {
                let code = status.as_u16();
                if code == 404 {
                    ApiError::NotFound { message }
                } else if status.is_server_error() {
                    ApiError::ServerError {
                        status: code,
                        reason,
                    }
                } else {
                    ApiError::Http {
                        status: code,
                        reason,
                    }
                }
            }
            HttpError::Network(m) => ApiError::Network(m),
            HttpError::Decode(m, snippet) => ApiError::Decode(format!("{m} (body: {snippet})")),
            HttpError::Url(m) => ApiError::Url(m),
            HttpError::Build(m) => ApiError::Client(m),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

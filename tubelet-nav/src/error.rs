use thiserror::Error;
use tubelet_api::ApiError;

#[derive(Debug, Error)]
pub enum NavError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No directory candidate passed the liveness probe.
    #[error("no working instance found in the instance directory")]
    AutodetectionFailed,

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("missing parameter {0:?}")]
    MissingParameter(&'static str),

    #[error("no instance configured and auto-detection is disabled")]
    NoServerConfigured,

    #[error("video {0} has no playable stream")]
    NoPlayableStream(String),

    #[error("search history I/O failed: {0}")]
    History(#[from] std::io::Error),

    #[error("search history is not a JSON list of strings: {0}")]
    HistoryFormat(#[from] serde_json::Error),
}

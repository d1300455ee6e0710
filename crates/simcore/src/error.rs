use thiserror::Error;

/// Errors raised at the edges of the engine (messages, config, threads).
///
/// The integration loop itself never fails: every divisor and accumulator is
/// guarded, so this type only shows up where data enters or leaves a session.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session has been torn down")]
    SessionClosed,
}

pub type SimResult<T> = Result<T, SimError>;

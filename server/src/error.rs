use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("packet encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    /// The event loop lost its inbound channel and cannot keep ticking.
    #[error("simulation scheduler lost: {0}")]
    SchedulerLost(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;

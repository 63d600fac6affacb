use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("page_type is required but not found in event")]
    MissingPageType,

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

pub type EventResult<T> = Result<T, EventError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown delay strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown operation kind: {0}")]
    UnknownOperationKind(String),

    #[error("unknown policy preset: {0}")]
    UnknownPreset(String),

    #[error("invalid backoff policy: {0}")]
    InvalidPolicy(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

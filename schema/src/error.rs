use thiserror::Error;

/// Errors raised at the boundary of the tower, before anything reaches a queue
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid request kind: {0:?}")]
    InvalidRequestKind(String),
    #[error("Malformed request on line {line}: {reason}")]
    MalformedRequest { line: usize, reason: String },
    #[error("Invalid request weights: {0}")]
    InvalidWeights(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

use super::SessionStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot {operation} session while it is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionStatus,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;

use std::io;

use thiserror::Error;

/// Failures of the analysis and opponent-move collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("analysis service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service answered but produced no moves for a position that has some.
    #[error("analysis service returned no moves")]
    EmptyResult,

    #[error("invalid move: {0}")]
    InvalidMove(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("session store format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Inputs that are dropped on purpose rather than reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// A fetch finished after its target or context was superseded.
    StaleResponse,
    /// Pointer input that does not map onto the board.
    InvalidGesture,
}

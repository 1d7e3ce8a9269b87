//! Contracts of the collaborators this crate consumes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cozy_chess::Color;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, RulesError, StoreError};
use crate::record::{Evaluation, LegalMove, PositionKey, TopMove};

/// Analysis backend selection. Scores from different engines are not comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    #[default]
    Stockfish,
    Random,
}

impl FromStr for EngineId {
    type Err = std::convert::Infallible;

    /// Unknown identifiers select Stockfish.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "random" => EngineId::Random,
            _ => EngineId::Stockfish,
        })
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineId::Stockfish => f.write_str("stockfish"),
            EngineId::Random => f.write_str("random"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionStatus {
    pub turn: Color,
    pub outcome: Option<Outcome>,
}

impl PositionStatus {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn side_to_move(&self) -> Side {
        Side(self.turn)
    }
}

/// A colour printed as `white` or `black`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Side(pub Color);

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

pub trait RulesEngine {
    /// One entry per (from, to) pair, with metadata.
    fn legal_moves(&self, position: &PositionKey) -> Result<Vec<LegalMove>, RulesError>;

    /// Plays `uci` and returns the resulting position.
    fn apply(&self, position: &PositionKey, uci: &str) -> Result<PositionKey, RulesError>;

    fn status(&self, position: &PositionKey) -> Result<PositionStatus, RulesError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisLimits {
    pub depth: u8,
    pub multipv: u8,
}

pub trait AnalysisService {
    /// Best moves first, scored for the side to move.
    fn top_moves(
        &mut self,
        position: &PositionKey,
        engine: EngineId,
        limits: AnalysisLimits,
    ) -> Result<Vec<TopMove>, AnalysisError>;

    /// Score of `uci` alone, from the mover's point of view.
    fn evaluate_move(
        &mut self,
        position: &PositionKey,
        uci: &str,
        engine: EngineId,
        depth: u8,
    ) -> Result<Evaluation, AnalysisError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentReply {
    Move(String),
    /// No real move was produced. Never applied.
    Placeholder,
}

pub trait OpponentService {
    fn opponent_move(
        &mut self,
        position: &PositionKey,
        history: &[String],
        engine: EngineId,
        depth: u8,
    ) -> Result<OpponentReply, AnalysisError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub fen: String,
    pub history: Vec<String>,
    #[serde(default)]
    pub engine: EngineId,
    pub saved_at: DateTime<Utc>,
}

pub trait SessionStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<SessionSnapshot>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_names() {
        let status = PositionStatus {
            turn: Color::Black,
            outcome: None,
        };
        assert_eq!(status.side_to_move().to_string(), "black");
        assert_eq!(Side(Color::White).to_string(), "white");
    }

    #[test]
    fn test_engine_ids() {
        assert_eq!("random".parse::<EngineId>().unwrap(), EngineId::Random);
        assert_eq!(" Stockfish ".parse::<EngineId>().unwrap(), EngineId::Stockfish);
        assert_eq!("leela".parse::<EngineId>().unwrap(), EngineId::Stockfish);
        assert_eq!(EngineId::Random.to_string(), "random");
    }
}

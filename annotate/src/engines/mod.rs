//! Analysis and opponent backends, selected by [`EngineId`].

mod random;
mod stockfish;

pub use random::RandomEngine;
pub use stockfish::UciEngine;

use std::path::PathBuf;

use log::debug;

use crate::error::AnalysisError;
use crate::record::{Evaluation, PositionKey, TopMove};
use crate::services::{AnalysisLimits, AnalysisService, EngineId, OpponentReply, OpponentService};

/// Every engine the client can switch between.
pub struct Engines {
    stockfish: UciEngine,
    random: RandomEngine,
}

impl Engines {
    pub fn new(stockfish_path: PathBuf, seed: Option<u64>) -> Self {
        Self {
            stockfish: UciEngine::new(stockfish_path),
            random: RandomEngine::new(seed),
        }
    }

    fn get(&mut self, engine: EngineId) -> &mut dyn Backend {
        match engine {
            EngineId::Stockfish => &mut self.stockfish,
            EngineId::Random => &mut self.random,
        }
    }
}

/// An engine that can answer both analysis and opponent requests.
trait Backend {
    fn top_moves(&mut self, position: &PositionKey, limits: AnalysisLimits) -> Result<Vec<TopMove>, AnalysisError>;

    fn evaluate_move(&mut self, position: &PositionKey, uci: &str, depth: u8) -> Result<Evaluation, AnalysisError>;

    fn best_move(&mut self, position: &PositionKey, depth: u8) -> Result<OpponentReply, AnalysisError>;
}

impl AnalysisService for Engines {
    fn top_moves(
        &mut self,
        position: &PositionKey,
        engine: EngineId,
        limits: AnalysisLimits,
    ) -> Result<Vec<TopMove>, AnalysisError> {
        self.get(engine).top_moves(position, limits)
    }

    fn evaluate_move(
        &mut self,
        position: &PositionKey,
        uci: &str,
        engine: EngineId,
        depth: u8,
    ) -> Result<Evaluation, AnalysisError> {
        self.get(engine).evaluate_move(position, uci, depth)
    }
}

impl OpponentService for Engines {
    fn opponent_move(
        &mut self,
        position: &PositionKey,
        history: &[String],
        engine: EngineId,
        depth: u8,
    ) -> Result<OpponentReply, AnalysisError> {
        debug!("Opponent move after {} plies ({})", history.len(), engine);
        self.get(engine).best_move(position, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stockfish_is_unavailable() {
        let mut engines = Engines::new(PathBuf::from("/nonexistent/stockfish-binary"), Some(1));
        let result = engines.top_moves(
            &PositionKey::startpos(),
            EngineId::Stockfish,
            AnalysisLimits { depth: 1, multipv: 1 },
        );
        assert!(matches!(result, Err(AnalysisError::ServiceUnavailable(_))));
    }

    #[test]
    fn test_dispatches_to_random() {
        let mut engines = Engines::new(PathBuf::from("/nonexistent/stockfish-binary"), Some(1));
        let top = engines
            .top_moves(
                &PositionKey::startpos(),
                EngineId::Random,
                AnalysisLimits { depth: 1, multipv: 3 },
            )
            .unwrap();
        assert_eq!(top.len(), 3);

        let reply = engines
            .opponent_move(&PositionKey::startpos(), &[], EngineId::Random, 1)
            .unwrap();
        assert!(matches!(reply, OpponentReply::Move(_)));
    }
}

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::Backend;
use crate::error::AnalysisError;
use crate::record::{Evaluation, LegalMove, PositionKey, TopMove};
use crate::rules::CozyRules;
use crate::services::{AnalysisLimits, OpponentReply, RulesEngine};

const SCORE_SPREAD: i32 = 50;

/// Offline stand-in: legal moves with uniformly random scores in [-50, 50].
pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    /// A fixed seed makes every answer reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn legal_moves(position: &PositionKey) -> Result<Vec<LegalMove>, AnalysisError> {
        CozyRules
            .legal_moves(position)
            .map_err(|e| AnalysisError::InvalidMove(e.to_string()))
    }

    fn score(&mut self) -> Evaluation {
        Evaluation::Centipawns(self.rng.gen_range(-SCORE_SPREAD..=SCORE_SPREAD))
    }
}

impl Backend for RandomEngine {
    fn top_moves(&mut self, position: &PositionKey, limits: AnalysisLimits) -> Result<Vec<TopMove>, AnalysisError> {
        let moves = Self::legal_moves(position)?;
        if moves.is_empty() {
            return Err(AnalysisError::EmptyResult);
        }

        Ok(moves
            .into_iter()
            .take(limits.multipv.max(1) as usize)
            .map(|mv| TopMove {
                uci: mv.uci,
                evaluation: self.score(),
            })
            .collect())
    }

    fn evaluate_move(&mut self, position: &PositionKey, uci: &str, _depth: u8) -> Result<Evaluation, AnalysisError> {
        let moves = Self::legal_moves(position)?;
        if !moves.iter().any(|mv| mv.uci == uci) {
            return Err(AnalysisError::InvalidMove(uci.to_string()));
        }
        Ok(self.score())
    }

    fn best_move(&mut self, position: &PositionKey, _depth: u8) -> Result<OpponentReply, AnalysisError> {
        let moves = Self::legal_moves(position)?;
        Ok(match moves.choose(&mut self.rng) {
            Some(mv) => OpponentReply::Move(mv.uci.clone()),
            None => OpponentReply::Placeholder,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: AnalysisLimits = AnalysisLimits {
        depth: 10,
        multipv: 20,
    };

    #[test]
    fn test_scores_within_spread() {
        let mut engine = RandomEngine::new(Some(7));
        let top = engine.top_moves(&PositionKey::startpos(), LIMITS).unwrap();
        assert_eq!(top.len(), 20);
        for mv in &top {
            let Evaluation::Centipawns(cp) = mv.evaluation else {
                panic!("Expected centipawns")
            };
            assert!((-50..=50).contains(&cp));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = RandomEngine::new(Some(42));
        let mut b = RandomEngine::new(Some(42));
        assert_eq!(
            a.top_moves(&PositionKey::startpos(), LIMITS).unwrap(),
            b.top_moves(&PositionKey::startpos(), LIMITS).unwrap()
        );
        assert_eq!(
            a.best_move(&PositionKey::startpos(), 1).unwrap(),
            b.best_move(&PositionKey::startpos(), 1).unwrap()
        );
    }

    #[test]
    fn test_evaluate_rejects_illegal_move() {
        let mut engine = RandomEngine::new(Some(1));
        assert!(engine.evaluate_move(&PositionKey::startpos(), "e2e4", 8).is_ok());
        assert_eq!(
            engine.evaluate_move(&PositionKey::startpos(), "e2e5", 8),
            Err(AnalysisError::InvalidMove("e2e5".to_string()))
        );
    }

    #[test]
    fn test_terminal_position() {
        let mated =
            PositionKey::new("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let mut engine = RandomEngine::new(Some(1));
        assert_eq!(engine.top_moves(&mated, LIMITS), Err(AnalysisError::EmptyResult));
        assert_eq!(engine.best_move(&mated, 1), Ok(OpponentReply::Placeholder));
    }
}

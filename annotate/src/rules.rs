//! Chess rules backed by cozy-chess.

use cozy_chess::{Board, File, Move, Piece, Square};
use uci::{move_to_uci, uci_to_move};
use utils::{
    collect_legal_moves, has_check, has_insufficient_material, has_legal_moves, is_capture,
    is_castle, is_checkmate, make_move, to_san,
};

use crate::error::RulesError;
use crate::record::{LegalMove, PositionKey};
use crate::services::{Outcome, PositionStatus, RulesEngine};

#[derive(Debug, Clone, Copy, Default)]
pub struct CozyRules;

impl CozyRules {
    pub fn board(position: &PositionKey) -> Result<Board, RulesError> {
        position
            .as_str()
            .parse::<Board>()
            .map_err(|_| RulesError::InvalidPosition(position.to_string()))
    }

    fn describe(board: &Board, mv: Move) -> LegalMove {
        let after = make_move(board, mv);

        // Castling is stored as king-takes-rook; report the king's destination
        let to = if is_castle(board, mv) {
            let file = if mv.to.file() > mv.from.file() {
                File::G
            } else {
                File::C
            };
            Square::new(file, mv.from.rank())
        } else {
            mv.to
        };

        LegalMove {
            from: mv.from,
            to,
            notation: to_san(board, mv),
            uci: move_to_uci(board, mv),
            is_capture: is_capture(board, mv),
            is_check: has_check(&after),
            is_checkmate: is_checkmate(&after),
        }
    }
}

impl RulesEngine for CozyRules {
    /// Under-promotions are folded into the queen promotion.
    fn legal_moves(&self, position: &PositionKey) -> Result<Vec<LegalMove>, RulesError> {
        let board = Self::board(position)?;

        Ok(collect_legal_moves(&board)
            .into_iter()
            .filter(|mv| matches!(mv.promotion, None | Some(Piece::Queen)))
            .map(|mv| Self::describe(&board, mv))
            .collect())
    }

    fn apply(&self, position: &PositionKey, uci: &str) -> Result<PositionKey, RulesError> {
        let mut board = Self::board(position)?;

        let mv = uci_to_move(&board, uci.trim())
            .ok_or_else(|| RulesError::IllegalMove(uci.to_string()))?;
        board
            .try_play(mv)
            .map_err(|_| RulesError::IllegalMove(uci.to_string()))?;

        Ok(PositionKey::new(board.to_string()))
    }

    fn status(&self, position: &PositionKey) -> Result<PositionStatus, RulesError> {
        let board = Self::board(position)?;
        let turn = board.side_to_move();

        let outcome = if !has_legal_moves(&board) {
            if has_check(&board) {
                Some(Outcome::Checkmate { winner: !turn })
            } else {
                Some(Outcome::Stalemate)
            }
        } else if board.halfmove_clock() >= 100 {
            Some(Outcome::FiftyMoveRule)
        } else if has_insufficient_material(&board) {
            Some(Outcome::InsufficientMaterial)
        } else {
            None
        };

        Ok(PositionStatus { turn, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::Color;

    fn position(fen: &str) -> PositionKey {
        PositionKey::new(fen)
    }

    fn find<'a>(moves: &'a [LegalMove], uci: &str) -> &'a LegalMove {
        moves.iter().find(|mv| mv.uci == uci).unwrap()
    }

    #[test]
    fn test_start_position() {
        let moves = CozyRules.legal_moves(&PositionKey::startpos()).unwrap();
        assert_eq!(moves.len(), 20);

        let knight = find(&moves, "g1f3");
        assert_eq!(knight.notation, "Nf3");
        assert!(!knight.is_capture && !knight.is_check);
    }

    #[test]
    fn test_castling_uses_king_destination() {
        let moves = CozyRules
            .legal_moves(&position("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"))
            .unwrap();
        let short = find(&moves, "e1g1");
        assert_eq!(short.to, Square::G1);
        assert_eq!(short.notation, "O-O");
        assert_eq!(find(&moves, "e1c1").to, Square::C1);
    }

    #[test]
    fn test_promotion_has_single_canonical_choice() {
        let moves = CozyRules
            .legal_moves(&position("8/P6k/8/8/8/8/8/K7 w - - 0 1"))
            .unwrap();
        let promotions: Vec<_> = moves.iter().filter(|mv| mv.from == Square::A7).collect();
        assert_eq!(promotions.len(), 1);
        assert_eq!(promotions[0].uci, "a7a8q");
    }

    #[test]
    fn test_check_and_mate_flags() {
        let moves = CozyRules
            .legal_moves(&position(
                "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
            ))
            .unwrap();
        let mate = find(&moves, "d8h4");
        assert!(mate.is_check && mate.is_checkmate);
        assert_eq!(mate.notation, "Qh4#");
    }

    #[test]
    fn test_apply() {
        let after = CozyRules.apply(&PositionKey::startpos(), "e2e4").unwrap();
        assert!(after
            .as_str()
            .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq"));

        assert_eq!(
            CozyRules.apply(&PositionKey::startpos(), "e2e5"),
            Err(RulesError::IllegalMove("e2e5".to_string()))
        );
        assert!(matches!(
            CozyRules.apply(&position("not a fen"), "e2e4"),
            Err(RulesError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_status() {
        let ongoing = CozyRules.status(&PositionKey::startpos()).unwrap();
        assert_eq!(ongoing.turn, Color::White);
        assert!(!ongoing.is_over());

        let mated = CozyRules
            .status(&position(
                "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            ))
            .unwrap();
        assert_eq!(
            mated.outcome,
            Some(Outcome::Checkmate {
                winner: Color::Black
            })
        );

        let stalemate = CozyRules.status(&position("k7/2Q5/1K6/8/8/8/8/8 b - - 0 1")).unwrap();
        assert_eq!(stalemate.outcome, Some(Outcome::Stalemate));

        let bare = CozyRules.status(&position("8/8/4k3/8/8/3K4/8/8 w - - 0 1")).unwrap();
        assert_eq!(bare.outcome, Some(Outcome::InsufficientMaterial));

        let fifty = CozyRules
            .status(&position("4k3/8/8/8/8/8/4P3/4K3 w - - 100 80"))
            .unwrap();
        assert_eq!(fifty.outcome, Some(Outcome::FiftyMoveRule));
    }
}

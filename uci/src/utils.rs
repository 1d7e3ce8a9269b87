// cozy-chess uses "king captures rook" notation for castling internally (e.g., e1h1),
// but UCI expects standard notation (e.g., e1g1). These utils handle the conversions.

use cozy_chess::{
    util::{display_uci_move, parse_uci_move},
    Board, Move,
};

#[inline]
pub fn move_to_uci(board: &Board, mv: Move) -> String {
    display_uci_move(board, mv).to_string()
}

/// Parses a UCI move string against `board`, accepting standard castling notation.
#[inline]
pub fn uci_to_move(board: &Board, uci: &str) -> Option<Move> {
    parse_uci_move(board, uci).ok()
}

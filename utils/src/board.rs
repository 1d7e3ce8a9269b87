use cozy_chess::{Board, Move, Piece};

/// Check if a move captures something, en passant included.
/// Castling is represented as "king captures rook" and is not a capture.
#[inline(always)]
pub fn is_capture(board: &Board, mv: Move) -> bool {
    if board.colors(!board.side_to_move()).has(mv.to) {
        return true;
    }
    board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file()
}

/// Check if a move is castling (king onto its own rook).
#[inline(always)]
pub fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.colors(board.side_to_move()).has(mv.to)
}

/// Make a move and return a new board.
#[inline(always)]
pub fn make_move(board: &Board, mv: Move) -> Board {
    let mut new_board = board.clone();
    new_board.play_unchecked(mv);
    new_board
}

/// Check if there are any legal moves in the position.
#[inline(always)]
pub fn has_legal_moves(board: &Board) -> bool {
    board.generate_moves(|_| true)
}

/// Collect all legal moves into a Vec.
pub fn collect_legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|batch| {
        moves.extend(batch);
        false
    });
    moves
}

/// Check if the side to move is in check.
#[inline(always)]
pub fn has_check(board: &Board) -> bool {
    !board.checkers().is_empty()
}

/// Check if the side to move has been checkmated.
#[inline(always)]
pub fn is_checkmate(board: &Board) -> bool {
    has_check(board) && !has_legal_moves(board)
}

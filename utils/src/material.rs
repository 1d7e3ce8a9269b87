use cozy_chess::{BitBoard, Board, Color, Piece};

const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

/// True when neither side can ever deliver mate: K v K, K+minor v K,
/// or K+B v K+B with both bishops on the same square colour.
pub fn has_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let bishops = board.pieces(Piece::Bishop);
    let minors = board.pieces(Piece::Knight) | bishops;

    let white_minors = minors & board.colors(Color::White);
    let black_minors = minors & board.colors(Color::Black);

    match (white_minors.len(), black_minors.len()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            let white_bishop = white_minors & bishops;
            let black_bishop = black_minors & bishops;

            // Opposite-coloured bishops (or any knight) can still construct a mate
            !white_bishop.is_empty()
                && !black_bishop.is_empty()
                && (white_bishop & LIGHT_SQUARES).is_empty()
                    == (black_bishop & LIGHT_SQUARES).is_empty()
        }
        _ => false,
    }
}

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::board::{collect_legal_moves, has_check, is_capture, is_castle, make_move};

/// Standard algebraic notation for a legal move, with `+`/`#` suffixes.
pub fn to_san(board: &Board, mv: Move) -> String {
    let Some(moving_piece) = board.piece_on(mv.from) else {
        return String::new();
    };

    let mut san = if is_castle(board, mv) {
        if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        body(board, mv, moving_piece)
    };

    let after = make_move(board, mv);
    if has_check(&after) {
        san.push(if after.generate_moves(|_| true) { '+' } else { '#' });
    }

    san
}

fn body(board: &Board, mv: Move, moving_piece: Piece) -> String {
    let capture = is_capture(board, mv);
    let mut san = String::new();

    if moving_piece != Piece::Pawn {
        san.push(piece_to_char(moving_piece));
        san.push_str(&disambiguation(board, mv, moving_piece));
    } else if capture {
        // Pawn captures name their source file
        san.push(file_to_char(mv.from.file()));
    }

    if capture {
        san.push('x');
    }

    san.push_str(&square_name(mv.to));

    if let Some(promotion) = mv.promotion {
        san.push('=');
        san.push(piece_to_char(promotion));
    }

    san
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = collect_legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to && other.from != mv.from && board.piece_on(other.from) == Some(piece)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        return file_to_char(mv.from.file()).to_string();
    }

    if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        return rank_to_char(mv.from.rank()).to_string();
    }

    square_name(mv.from)
}

#[inline]
fn piece_to_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

#[inline]
fn file_to_char(file: File) -> char {
    (b'a' + file as u8) as char
}

#[inline]
fn rank_to_char(rank: Rank) -> char {
    (b'1' + rank as u8) as char
}

#[inline]
fn square_name(square: Square) -> String {
    format!("{}{}", file_to_char(square.file()), rank_to_char(square.rank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn san_of(fen: &str, uci: &str) -> String {
        let board = Board::from_str(fen).unwrap();
        let mv = cozy_chess::util::parse_uci_move(&board, uci).unwrap();
        to_san(&board, mv)
    }

    #[test]
    fn test_opening_moves() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(san_of(start, "e2e4"), "e4");
        assert_eq!(san_of(start, "g1f3"), "Nf3");
    }

    #[test]
    fn test_pawn_capture_and_promotion() {
        assert_eq!(
            san_of("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2", "e4d5"),
            "exd5"
        );
        assert_eq!(san_of("8/P6k/8/8/8/8/8/K7 w - - 0 1", "a7a8q"), "a8=Q");
    }

    #[test]
    fn test_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_file_disambiguation() {
        // Knights on b1 and f1 both reach d2
        assert_eq!(san_of("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1", "b1d2"), "Nbd2");
    }

    #[test]
    fn test_rank_disambiguation() {
        // Rooks on a1 and a5 both reach a3
        assert_eq!(san_of("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
    }

    #[test]
    fn test_check_and_mate_suffixes() {
        assert_eq!(
            san_of("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2", "d8h4"),
            "Qh4#"
        );
        assert_eq!(san_of("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", "a1a8"), "Ra8+");
    }
}

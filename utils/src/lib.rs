mod board;
mod material;
mod san;

pub use board::{
    collect_legal_moves, has_check, has_legal_moves, is_capture, is_castle, is_checkmate,
    make_move,
};
pub use material::has_insufficient_material;
pub use san::to_san;

mod decoder;
mod encoder;
mod process;
mod utils;

pub mod commands;

pub use commands::{EngineOutput, GoParams, Info, Score, UciCommand};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use process::{EngineProcess, SearchReport};
pub use utils::{move_to_uci, uci_to_move};

/// Null move in UCI format, sent as the bestmove when the position has no legal moves.
pub const NULL_MOVE: &str = "0000";

/// Some engines report a missing bestmove this way instead of the null move.
pub const NO_MOVE: &str = "(none)";

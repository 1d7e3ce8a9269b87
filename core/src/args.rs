use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use cozy_chess::Color;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Log everything to a file at debug level instead of stderr.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Level for stderr logging.
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Analysis engine: stockfish or random. Unknown names select stockfish.
    #[arg(short, long, default_value = "stockfish")]
    pub engine: String,

    /// Path of the UCI engine binary.
    #[arg(long, env = "STOCKFISH_PATH", default_value = "stockfish")]
    pub stockfish: PathBuf,

    /// Side played by the human.
    #[arg(long, value_enum, default_value_t = Side::White)]
    pub human: Side,

    /// Save the game here after every move and restore it on startup.
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    /// Seed for the random engine.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

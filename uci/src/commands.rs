/// Commands the client sends to an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum UciCommand {
    Uci,
    IsReady,

    UciNewGame,
    Position {
        fen: String,
        moves: Vec<String>,
    },
    Go(GoParams),

    Stop,
    Quit,
    SetOption {
        name: String,
        value: String,
    },
}

/// Lines an engine writes back.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    IdName(String),
    IdAuthor(String),
    UciOk,
    ReadyOk,
    BestMove {
        best_move: String,
        ponder: Option<String>,
    },
    Info(Info),
    Option(String),
    Unknown(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub depth: Option<u8>,
    pub sel_depth: Option<u8>,
    /// 1-based line index when the engine runs with MultiPV > 1.
    pub multipv: Option<u8>,
    pub nodes: Option<u64>,
    pub time: Option<u64>,
    pub pv: Vec<String>,
    pub score: Option<Score>,
    /// Set when the score is only a lowerbound/upperbound.
    pub bound: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32), // centipawns, from the side to move
    Mate(i32),       // Positive for mate-in-n, negative for mated-in-n
}

impl Score {
    /// Same score seen from the other side of the board.
    pub fn negate(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(moves) => Score::Mate(-moves),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoParams {
    // Search in the background until a stop command is received.
    pub infinite: bool,

    // Restrict search to moves in this list.
    pub search_moves: Option<Vec<String>>,

    // Integer of milliseconds White has left on the clock.
    pub wtime: Option<u64>,

    // Integer of milliseconds Black has left on the clock.
    pub btime: Option<u64>,

    // Search depth ply only.
    pub depth: Option<u8>,

    // Search exactly movetime milliseconds.
    pub move_time: Option<u64>,
}

impl GoParams {
    pub fn depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
}

use super::commands::{GoParams, UciCommand};

pub struct Encoder {}

impl Encoder {
    pub fn encode(&self, command: &UciCommand) -> String {
        match command {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),

            UciCommand::Position { fen, moves } => {
                if moves.is_empty() {
                    format!("position fen {}", fen)
                } else {
                    format!("position fen {} moves {}", fen, moves.join(" "))
                }
            }
            UciCommand::Go(params) => encode_go(params),
            UciCommand::SetOption { name, value } => {
                if value.is_empty() {
                    format!("setoption name {}", name)
                } else {
                    format!("setoption name {} value {}", name, value)
                }
            }

            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

fn encode_go(params: &GoParams) -> String {
    let mut parts = vec!["go".to_string()];

    if let Some(moves) = &params.search_moves {
        if !moves.is_empty() {
            parts.push(format!("searchmoves {}", moves.join(" ")));
        }
    }
    if let Some(wtime) = params.wtime {
        parts.push(format!("wtime {}", wtime));
    }
    if let Some(btime) = params.btime {
        parts.push(format!("btime {}", btime));
    }
    if let Some(depth) = params.depth {
        parts.push(format!("depth {}", depth));
    }
    if let Some(move_time) = params.move_time {
        parts.push(format!("movetime {}", move_time));
    }
    if params.infinite {
        parts.push("infinite".to_string());
    }

    parts.join(" ")
}

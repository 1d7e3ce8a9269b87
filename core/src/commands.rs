use annotate::services::EngineId;
use annotate::Persona;
use cozy_chess::Color;

/// One line of driver input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NewGame,
    /// `fen` is `None` for the start position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Engine(EngineId),
    Refresh,

    Down(f32, f32),
    Drag(f32, f32),
    Up(f32, f32),
    Cancel,
    Preview(String),

    Play(String),
    Flip,
    /// Board origin and square size on the pointer surface.
    Geometry(f32, f32, f32),
    /// The side the human plays.
    Side(Color),
    List,
    Show,
    /// Position score for White.
    Eval,
    Coach(Persona),

    SetOption {
        name: String,
        value: String,
    },
    Options,
    Quit,

    Unknown(String),
}

pub struct Decoder;

impl Decoder {
    pub fn decode(&self, input: &str) -> Command {
        let input = input.trim();
        let mut tokens = input.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        let rest: Vec<&str> = tokens.collect();

        match (keyword, rest.as_slice()) {
            ("new", []) => Command::NewGame,
            ("position", _) => self.decode_position(input),
            ("engine", [id]) => Command::Engine(id.parse().unwrap_or_default()),
            ("refresh", []) => Command::Refresh,

            ("down", [x, y]) => point(x, y).map_or(Command::Unknown(input.to_string()), |(x, y)| Command::Down(x, y)),
            ("drag", [x, y]) => point(x, y).map_or(Command::Unknown(input.to_string()), |(x, y)| Command::Drag(x, y)),
            ("up", [x, y]) => point(x, y).map_or(Command::Unknown(input.to_string()), |(x, y)| Command::Up(x, y)),
            ("cancel", []) => Command::Cancel,
            ("preview", [uci]) => Command::Preview(uci.to_string()),

            ("play", [uci]) => Command::Play(uci.to_string()),
            ("flip", []) => Command::Flip,
            ("geometry", [x, y, size]) => match (point(x, y), size.parse()) {
                (Some((x, y)), Ok(size)) => Command::Geometry(x, y, size),
                _ => Command::Unknown(input.to_string()),
            },
            ("side", ["white"]) => Command::Side(Color::White),
            ("side", ["black"]) => Command::Side(Color::Black),
            ("list", []) => Command::List,
            ("show", []) => Command::Show,
            ("eval", []) => Command::Eval,
            ("coach", []) => Command::Coach(Persona::default()),
            ("coach", [persona]) => Command::Coach(persona.parse().unwrap_or_default()),

            ("setoption", _) => self.decode_setoption(input),
            ("options", []) => Command::Options,
            ("quit", _) => Command::Quit,

            _ => Command::Unknown(input.to_string()),
        }
    }

    fn decode_position(&self, input: &str) -> Command {
        // Parse: position startpos|fen <fen> [moves <m1> <m2> ...]
        let (head, moves) = match input.split_once(" moves") {
            Some((head, moves)) => (head, moves.split_whitespace().map(str::to_string).collect()),
            None => (input, Vec::new()),
        };

        let head = head.trim_start_matches("position").trim();
        let fen = if let Some(fen) = head.strip_prefix("fen") {
            let fen = fen.trim();
            if fen.is_empty() {
                return Command::Unknown(input.to_string());
            }
            Some(fen.to_string())
        } else if head == "startpos" {
            None
        } else {
            return Command::Unknown(input.to_string());
        };

        Command::Position { fen, moves }
    }

    fn decode_setoption(&self, input: &str) -> Command {
        // Parse: setoption name <name> value <value>
        let Some(rest) = input.strip_prefix("setoption name ") else {
            return Command::Unknown(input.to_string());
        };

        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };

        Command::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

fn point(x: &str, y: &str) -> Option<(f32, f32)> {
    Some((x.parse().ok()?, y.parse().ok()?))
}

use super::commands::{EngineOutput, Info, Score};

pub struct Decoder;

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, input: &str) -> EngineOutput {
        match input {
            "uciok" => EngineOutput::UciOk,
            "readyok" => EngineOutput::ReadyOk,

            _ if input.starts_with("id name ") => {
                EngineOutput::IdName(input["id name ".len()..].trim().to_string())
            }
            _ if input.starts_with("id author ") => {
                EngineOutput::IdAuthor(input["id author ".len()..].trim().to_string())
            }
            _ if input.starts_with("bestmove") => self.decode_bestmove(input),
            _ if input.starts_with("info") => EngineOutput::Info(self.decode_info(input)),
            _ if input.starts_with("option") => EngineOutput::Option(input.to_string()),

            _ => EngineOutput::Unknown(input.to_string()),
        }
    }

    fn decode_bestmove(&self, input: &str) -> EngineOutput {
        // Parse: bestmove <move> [ponder <move>]
        let mut tokens = input.split_whitespace().skip(1);
        let best_move = tokens.next().unwrap_or_default().to_string();

        let ponder = match (tokens.next(), tokens.next()) {
            (Some("ponder"), Some(mv)) => Some(mv.to_string()),
            _ => None,
        };

        EngineOutput::BestMove { best_move, ponder }
    }

    fn decode_info(&self, input: &str) -> Info {
        let mut info = Info::default();
        let tokens: Vec<&str> = input.split_whitespace().skip(1).collect();

        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                "depth" => {
                    info.depth = parse_at(&tokens, i + 1);
                    i += 2;
                }
                "seldepth" => {
                    info.sel_depth = parse_at(&tokens, i + 1);
                    i += 2;
                }
                "multipv" => {
                    info.multipv = parse_at(&tokens, i + 1);
                    i += 2;
                }
                "nodes" => {
                    info.nodes = parse_at(&tokens, i + 1);
                    i += 2;
                }
                "time" => {
                    info.time = parse_at(&tokens, i + 1);
                    i += 2;
                }
                "score" => {
                    info.score = match tokens.get(i + 1) {
                        Some(&"cp") => parse_at(&tokens, i + 2).map(Score::Centipawns),
                        Some(&"mate") => parse_at(&tokens, i + 2).map(Score::Mate),
                        _ => None,
                    };
                    i += 3;
                    if matches!(tokens.get(i), Some(&"lowerbound") | Some(&"upperbound")) {
                        info.bound = true;
                        i += 1;
                    }
                }
                "pv" => {
                    info.pv = tokens[i + 1..].iter().map(|mv| mv.to_string()).collect();
                    break;
                }
                // Free text runs to the end of the line
                "string" => break,
                _ => i += 1,
            }
        }

        info
    }
}

fn parse_at<T: std::str::FromStr>(tokens: &[&str], index: usize) -> Option<T> {
    tokens.get(index).and_then(|token| token.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_outputs() {
        assert!(matches!(Decoder.decode("uciok"), EngineOutput::UciOk));
        assert!(matches!(Decoder.decode("readyok"), EngineOutput::ReadyOk));
        assert_eq!(
            Decoder.decode("id name Stockfish 16"),
            EngineOutput::IdName("Stockfish 16".to_string())
        );
        assert_eq!(
            Decoder.decode("id author the Stockfish developers"),
            EngineOutput::IdAuthor("the Stockfish developers".to_string())
        );
    }

    #[test]
    fn test_bestmove_with_ponder() {
        let EngineOutput::BestMove { best_move, ponder } = Decoder.decode("bestmove e2e4 ponder e7e5")
        else {
            panic!("Expected BestMove")
        };
        assert_eq!(best_move, "e2e4");
        assert_eq!(ponder.as_deref(), Some("e7e5"));
    }

    #[test]
    fn test_bestmove_none() {
        let EngineOutput::BestMove { best_move, ponder } = Decoder.decode("bestmove (none)") else {
            panic!("Expected BestMove")
        };
        assert_eq!(best_move, "(none)");
        assert!(ponder.is_none());
    }

    #[test]
    fn test_info_multipv_centipawns() {
        let line = "info depth 10 seldepth 14 multipv 2 score cp -35 nodes 20345 nps 900000 time 22 pv d2d4 d7d5 c2c4";
        let EngineOutput::Info(info) = Decoder.decode(line) else {
            panic!("Expected Info")
        };
        assert_eq!(info.depth, Some(10));
        assert_eq!(info.sel_depth, Some(14));
        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.score, Some(Score::Centipawns(-35)));
        assert_eq!(info.nodes, Some(20345));
        assert_eq!(info.time, Some(22));
        assert_eq!(info.pv, vec!["d2d4", "d7d5", "c2c4"]);
        assert!(!info.bound);
    }

    #[test]
    fn test_info_mate_and_bound() {
        let EngineOutput::Info(info) = Decoder.decode("info depth 5 score mate -3 pv h7h8") else {
            panic!("Expected Info")
        };
        assert_eq!(info.score, Some(Score::Mate(-3)));

        let EngineOutput::Info(info) =
            Decoder.decode("info depth 7 score cp 40 lowerbound nodes 100 pv e2e4")
        else {
            panic!("Expected Info")
        };
        assert_eq!(info.score, Some(Score::Centipawns(40)));
        assert!(info.bound);
        assert_eq!(info.nodes, Some(100));
    }

    #[test]
    fn test_info_string_is_not_parsed() {
        let EngineOutput::Info(info) = Decoder.decode("info string NNUE evaluation using nn.bin depth 3")
        else {
            panic!("Expected Info")
        };
        assert_eq!(info.depth, None);
        assert!(info.pv.is_empty());
    }

    #[test]
    fn test_unknown_output() {
        assert!(matches!(
            Decoder.decode("Stockfish 16 by the Stockfish developers"),
            EngineOutput::Unknown(_)
        ));
    }
}

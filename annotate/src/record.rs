use std::fmt;

use ahash::{AHashMap, AHashSet};
use cozy_chess::Square;
use uci::Score;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Full board, turn, castling and en passant encoding (a FEN). Every cache is scoped to one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn new(fen: impl Into<String>) -> Self {
        Self(fen.into().trim().to_string())
    }

    pub fn startpos() -> Self {
        Self(START_FEN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine verdict for one move, from the mover's point of view.
/// A mate distance and a centipawn score are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Plies-to-mate style distance; `0` is an immediately mating move, negative means getting mated.
    Mate(i32),
}

impl Evaluation {
    pub fn negate(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(n) => Evaluation::Mate(-n),
        }
    }
}

impl From<Score> for Evaluation {
    fn from(score: Score) -> Self {
        match score {
            Score::Centipawns(cp) => Evaluation::Centipawns(cp),
            Score::Mate(n) => Evaluation::Mate(n),
        }
    }
}

/// Legality and metadata for one move, as supplied by the rules collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
    pub notation: String,
    pub uci: String,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
}

/// One entry of the analysis feed, in the service's own order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopMove {
    pub uci: String,
    pub evaluation: Evaluation,
}

/// One legal move in the current position, enriched with whatever analysis is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub notation: String,
    pub uci: String,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub evaluation: Option<Evaluation>,
    /// 1-based place in the analysis service's ordering. Never recomputed locally.
    pub rank: Option<u32>,
}

impl MoveRecord {
    pub fn score_centipawns(&self) -> Option<i32> {
        match self.evaluation {
            Some(Evaluation::Centipawns(cp)) => Some(cp),
            _ => None,
        }
    }

    pub fn mate_in(&self) -> Option<i32> {
        match self.evaluation {
            Some(Evaluation::Mate(n)) => Some(n),
            _ => None,
        }
    }
}

impl From<LegalMove> for MoveRecord {
    fn from(legal: LegalMove) -> Self {
        Self {
            from: legal.from,
            to: legal.to,
            notation: legal.notation,
            uci: legal.uci,
            is_capture: legal.is_capture,
            is_check: legal.is_check,
            is_checkmate: legal.is_checkmate,
            evaluation: None,
            rank: None,
        }
    }
}

/// Folds the analysis feed into the legality feed by exact `uci` match.
///
/// Moves the analysis does not mention stay unevaluated and unranked. A second record for an
/// already seen (from, to) pair is dropped, so the first canonical choice wins.
pub fn merge(legal: Vec<LegalMove>, analysis: &[TopMove]) -> Vec<MoveRecord> {
    let mut ranked: AHashMap<&str, (u32, Evaluation)> = AHashMap::with_capacity(analysis.len());
    for (index, top) in analysis.iter().enumerate() {
        ranked
            .entry(top.uci.as_str())
            .or_insert((index as u32 + 1, top.evaluation));
    }

    let mut seen = AHashSet::with_capacity(legal.len());
    let mut records = Vec::with_capacity(legal.len());

    for mv in legal {
        if !seen.insert((mv.from, mv.to)) {
            continue;
        }

        let mut record = MoveRecord::from(mv);
        if let Some(&(rank, evaluation)) = ranked.get(record.uci.as_str()) {
            record.rank = Some(rank);
            record.evaluation = Some(evaluation);
        }
        records.push(record);
    }

    records
}

use std::fmt;
use std::str::FromStr;

use crate::ranking::best_move;
use crate::record::{Evaluation, MoveRecord};

pub const FALLBACK_DIALOG: &str =
    "Engine unavailable. Playing it safe; develop pieces and control the center.";

const RECOMMENDED: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persona {
    Aggressive,
    Defensive,
    #[default]
    Balanced,
}

impl Persona {
    pub fn dialog(self) -> &'static str {
        match self {
            Persona::Aggressive => "Hit fast and hard. Open lines, seek tactics, and keep initiative.",
            Persona::Defensive => {
                "Stabilize the position. Cover weaknesses, trade down pressure, and neutralize threats."
            }
            Persona::Balanced => {
                "Healthy development and central control. Improve pieces, avoid unnecessary risks."
            }
        }
    }
}

impl FromStr for Persona {
    type Err = std::convert::Infallible;

    /// Anything unrecognised is coached as balanced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Persona::Aggressive,
            "defensive" => Persona::Defensive,
            _ => Persona::Balanced,
        })
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Aggressive => f.write_str("aggressive"),
            Persona::Defensive => f.write_str("defensive"),
            Persona::Balanced => f.write_str("balanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub persona: Persona,
    pub dialog: &'static str,
    pub best: Option<MoveRecord>,
    pub recommended: Vec<MoveRecord>,
    pub evaluation: Option<Evaluation>,
    /// No analysis was available; suggestions are just the first legal moves.
    pub fallback: bool,
}

impl Advice {
    /// Coaching for a move list already in display order.
    pub fn new(records: &[MoveRecord], persona: Persona) -> Self {
        let analysed = records
            .iter()
            .any(|record| record.rank.is_some() || record.evaluation.is_some());

        let recommended: Vec<MoveRecord> = records.iter().take(RECOMMENDED).cloned().collect();

        if !analysed {
            return Self {
                persona,
                dialog: FALLBACK_DIALOG,
                best: recommended.first().cloned(),
                recommended,
                evaluation: None,
                fallback: true,
            };
        }

        let best = best_move(records).cloned();
        Self {
            persona,
            dialog: persona.dialog(),
            evaluation: best.as_ref().and_then(|record| record.evaluation),
            best,
            recommended,
            fallback: false,
        }
    }
}

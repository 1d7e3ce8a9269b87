use std::fmt;

use cozy_chess::Square;

use crate::quality::{classify, Quality};
use crate::record::{Evaluation, MoveRecord};

pub const PENDING_MARKER: &str = "...";
pub const UNAVAILABLE_MARKER: &str = "unavailable";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HudPhase {
    #[default]
    Standby,
    Dragging,
    Computing,
    Analyzed,
    Error,
}

impl fmt::Display for HudPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HudPhase::Standby => "Standby",
            HudPhase::Dragging => "Dragging",
            HudPhase::Computing => "Computing",
            HudPhase::Analyzed => "Analyzed",
            HudPhase::Error => "Error",
        };
        f.write_str(label)
    }
}

/// What the targeting display shows. The default value is the empty state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudView {
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub notation: String,
    pub quality: Quality,
    pub score_text: String,
    pub rank_text: String,
    pub phase: HudPhase,
}

impl Default for HudView {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            notation: String::new(),
            quality: Quality::Unknown,
            score_text: String::new(),
            rank_text: String::new(),
            phase: HudPhase::Standby,
        }
    }
}

impl HudView {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `#N` for mates, signed pawns otherwise (two decimals, none from 1000 cp up).
pub fn format_score(evaluation: Option<Evaluation>) -> String {
    match evaluation {
        Some(Evaluation::Mate(n)) => format!("#{}", n),
        Some(Evaluation::Centipawns(cp)) if cp.abs() >= 1000 => format!("{:+.0}", cp as f64 / 100.0),
        Some(Evaluation::Centipawns(cp)) => format!("{:+.2}", cp as f64 / 100.0),
        None => PENDING_MARKER.to_string(),
    }
}

fn format_rank(rank: Option<u32>) -> String {
    rank.map(|rank| format!("Rank {}", rank)).unwrap_or_default()
}

/// Projects the targeted move onto the HUD. It never reads anything but what it is given.
#[derive(Debug, Default)]
pub struct Overlay {
    view: HudView,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &HudView {
        &self.view
    }

    pub fn reset(&mut self) {
        self.view = HudView::default();
    }

    /// A drag started but nothing is targeted yet.
    pub fn dragging(&mut self, source: Square) {
        self.view = HudView {
            from: Some(source),
            phase: HudPhase::Dragging,
            ..HudView::default()
        };
    }

    /// Shows `record` waiting on an evaluation.
    pub fn computing(&mut self, record: &MoveRecord) {
        self.project(record, HudPhase::Computing);
        self.view.score_text = PENDING_MARKER.to_string();
    }

    pub fn analyzed(&mut self, record: &MoveRecord) {
        self.project(record, HudPhase::Analyzed);
    }

    /// Shows `record` with an explicit unavailable score rather than a stale one.
    pub fn unavailable(&mut self, record: &MoveRecord) {
        self.project(record, HudPhase::Error);
        self.view.score_text = UNAVAILABLE_MARKER.to_string();
    }

    fn project(&mut self, record: &MoveRecord, phase: HudPhase) {
        self.view = HudView {
            from: Some(record.from),
            to: Some(record.to),
            notation: record.notation.clone(),
            quality: classify(Some(record)),
            score_text: format_score(record.evaluation),
            rank_text: format_rank(record.rank),
            phase,
        };
    }
}

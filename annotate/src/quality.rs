use std::fmt;

use crate::record::MoveRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Excellent,
    Good,
    Neutral,
    Poor,
    /// Reserved for "no record at all".
    Unknown,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quality::Excellent => "Excellent",
            Quality::Good => "Good",
            Quality::Neutral => "Neutral",
            Quality::Poor => "Poor",
            Quality::Unknown => "Unknown",
        };
        f.pad(label)
    }
}

/// Maps a record onto a quality tier. The service's rank always wins over a score.
pub fn classify(record: Option<&MoveRecord>) -> Quality {
    let Some(record) = record else {
        return Quality::Unknown;
    };

    if let Some(rank) = record.rank {
        return match rank {
            0..=1 => Quality::Excellent,
            2..=3 => Quality::Good,
            4..=5 => Quality::Neutral,
            _ => Quality::Poor,
        };
    }

    if let Some(cp) = record.score_centipawns() {
        return if cp >= 100 {
            Quality::Excellent
        } else if cp >= 0 {
            Quality::Good
        } else if cp >= -100 {
            Quality::Neutral
        } else {
            Quality::Poor
        };
    }

    if record.is_capture || record.is_check {
        return Quality::Good;
    }

    Quality::Neutral
}

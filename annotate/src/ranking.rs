use std::cmp::Ordering;

use crate::record::MoveRecord;

const MATE_PRIORITY: i64 = 100_000;
const MATE_STEP: i64 = 1_000;

/// Sort key for unranked records: mate distance, then score, then a tactical heuristic.
pub fn priority(record: &MoveRecord) -> i64 {
    if let Some(mate) = record.mate_in() {
        return MATE_PRIORITY - MATE_STEP * i64::from(mate).abs();
    }

    if let Some(cp) = record.score_centipawns() {
        return i64::from(cp);
    }

    10 * record.is_capture as i64 + 5 * record.is_check as i64 + 100 * record.is_checkmate as i64
}

/// Display order: `Less` means `a` is listed before `b`.
pub fn compare(a: &MoveRecord, b: &MoveRecord) -> Ordering {
    let by_rank = match (a.rank, b.rank) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_rank
        .then_with(|| priority(b).cmp(&priority(a)))
        .then_with(|| b.is_capture.cmp(&a.is_capture))
        .then_with(|| b.is_check.cmp(&a.is_check))
}

/// Stable in-place sort by [`compare`].
pub fn sort(records: &mut [MoveRecord]) {
    records.sort_by(compare);
}

/// The first record in display order, if any.
pub fn best_move(records: &[MoveRecord]) -> Option<&MoveRecord> {
    records.iter().min_by(|a, b| compare(a, b))
}

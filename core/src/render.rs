//! Plain-text rendering of the session for the line protocol.

use annotate::{classify, format_score, Advice, Evaluation, HudView, MoveRecord, Notice, Session};

/// One `hud ...` line. Empty fields are left out.
pub fn hud(view: &HudView) -> String {
    if view.is_empty() {
        return format!("hud {}", view.phase);
    }

    let squares = match (view.from, view.to) {
        (Some(from), Some(to)) => format!("{}{}", from, to),
        (Some(from), None) => from.to_string(),
        _ => String::new(),
    };

    let mut fields = vec![view.phase.to_string(), squares];
    if view.to.is_some() {
        fields.push(view.notation.clone());
        fields.push(view.quality.to_string());
        fields.push(view.score_text.clone());
        fields.push(view.rank_text.clone());
    }

    let fields: Vec<String> = fields.into_iter().filter(|field| !field.is_empty()).collect();
    format!("hud {}", fields.join(" "))
}

/// The move list in display order, one line per move.
pub fn move_list(records: &[MoveRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let score = match record.evaluation {
                Some(_) => format_score(record.evaluation),
                None => "-".to_string(),
            };
            let rank = record
                .rank
                .map(|rank| format!("Rank {}", rank))
                .unwrap_or_default();

            format!(
                "{:>3}. {:<8} {:<6} {:>7}  {:<9} {}",
                i + 1,
                record.notation,
                record.uci,
                score,
                classify(Some(record)),
                rank
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

pub fn advice(advice: &Advice) -> Vec<String> {
    let mut lines = vec![format!("coach {}: {}", advice.persona, advice.dialog)];

    if let Some(best) = &advice.best {
        let score = match advice.evaluation {
            Some(_) => format_score(advice.evaluation),
            None => "-".to_string(),
        };
        lines.push(format!("best {} {}", best.notation, score));
    }

    let recommended: Vec<&str> = advice
        .recommended
        .iter()
        .map(|record| record.notation.as_str())
        .collect();
    if !recommended.is_empty() {
        lines.push(format!("recommended {}", recommended.join(", ")));
    }
    lines
}

/// `eval <score>` for White, or `eval -` before the position is scored.
pub fn evaluation(evaluation: Option<Evaluation>) -> String {
    match evaluation {
        Some(_) => format!("eval {}", format_score(evaluation)),
        None => "eval -".to_string(),
    }
}

pub fn notice(notice: &Notice) -> String {
    format!("notice {}", notice)
}

pub fn summary(session: &Session) -> Vec<String> {
    let status = session.status();
    let mut lines = vec![
        format!("position {}", session.position()),
        format!(
            "turn {}{}",
            status.side_to_move(),
            if session.is_human_turn() { " (you)" } else { "" }
        ),
        format!("engine {}", session.engine()),
    ];
    if !session.history().is_empty() {
        lines.push(format!("moves {}", session.history().join(" ")));
    }
    if status.is_over() {
        lines.push("game over".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate::{HudPhase, Persona, Quality};
    use cozy_chess::Square;

    fn record(uci: &str, notation: &str, evaluation: Option<Evaluation>, rank: Option<u32>) -> MoveRecord {
        MoveRecord {
            from: uci[0..2].parse().unwrap(),
            to: uci[2..4].parse().unwrap(),
            notation: notation.to_string(),
            uci: uci.to_string(),
            is_capture: false,
            is_check: false,
            is_checkmate: false,
            evaluation,
            rank,
        }
    }

    #[test]
    fn test_hud_standby() {
        assert_eq!(hud(&HudView::default()), "hud Standby");
    }

    #[test]
    fn test_hud_dragging() {
        let view = HudView {
            from: Some(Square::E2),
            phase: HudPhase::Dragging,
            ..HudView::default()
        };
        assert_eq!(hud(&view), "hud Dragging e2");
    }

    #[test]
    fn test_hud_analyzed() {
        let view = HudView {
            from: Some(Square::G1),
            to: Some(Square::F3),
            notation: "Nf3".to_string(),
            quality: Quality::Excellent,
            score_text: "+0.31".to_string(),
            rank_text: "Rank 1".to_string(),
            phase: HudPhase::Analyzed,
        };
        assert_eq!(hud(&view), "hud Analyzed g1f3 Nf3 Excellent +0.31 Rank 1");
    }

    #[test]
    fn test_move_list() {
        let lines = move_list(&[
            record("e2e4", "e4", Some(Evaluation::Centipawns(30)), Some(1)),
            record("a2a3", "a3", None, None),
        ]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1. e4"));
        assert!(lines[0].contains("+0.30"));
        assert!(lines[0].ends_with("Rank 1"));
        assert!(lines[1].contains(" - "));
        assert!(lines[1].ends_with("Neutral"));
    }

    #[test]
    fn test_evaluation() {
        assert_eq!(evaluation(Some(Evaluation::Centipawns(-60))), "eval -0.60");
        assert_eq!(evaluation(Some(Evaluation::Mate(-1))), "eval #-1");
        assert_eq!(evaluation(None), "eval -");
    }

    #[test]
    fn test_advice_fallback() {
        let records = vec![record("e2e4", "e4", None, None), record("d2d4", "d4", None, None)];
        let lines = advice(&Advice::new(&records, Persona::Aggressive));
        assert_eq!(lines[0], format!("coach aggressive: {}", annotate::FALLBACK_DIALOG));
        assert_eq!(lines[1], "best e4 -");
        assert_eq!(lines[2], "recommended e4, d4");
    }
}

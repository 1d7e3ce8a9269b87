use std::io;
use std::path::PathBuf;

use log::{debug, info, warn};
use uci::{EngineProcess, GoParams, SearchReport, NO_MOVE, NULL_MOVE};

use super::Backend;
use crate::error::AnalysisError;
use crate::record::{Evaluation, PositionKey, TopMove};
use crate::rules::CozyRules;
use crate::services::{AnalysisLimits, OpponentReply, RulesEngine};

/// A UCI engine binary, spawned on first use and respawned after any pipe failure.
pub struct UciEngine {
    path: PathBuf,
    process: Option<EngineProcess>,
    multipv: Option<u8>,
}

impl UciEngine {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            process: None,
            multipv: None,
        }
    }

    fn unavailable(&self, error: io::Error) -> AnalysisError {
        AnalysisError::ServiceUnavailable(format!("{}: {}", self.path.display(), error))
    }

    fn process(&mut self) -> Result<&mut EngineProcess, AnalysisError> {
        if self.process.is_none() {
            let mut process = EngineProcess::spawn(&self.path).map_err(|e| self.unavailable(e))?;
            process.new_game().map_err(|e| self.unavailable(e))?;
            info!(
                "Started {} ({})",
                process.name().unwrap_or("UCI engine"),
                self.path.display()
            );
            self.multipv = None;
            self.process = Some(process);
        }

        self.process
            .as_mut()
            .ok_or_else(|| AnalysisError::ServiceUnavailable("engine not running".to_string()))
    }

    /// Runs one search with the given MultiPV. A failed exchange kills the process.
    fn search(&mut self, fen: &str, moves: &[String], depth: u8, multipv: u8) -> Result<SearchReport, AnalysisError> {
        let stale_multipv = self.multipv != Some(multipv);
        let process = self.process()?;

        let result = exchange(process, fen, moves, depth, stale_multipv.then_some(multipv));

        match result {
            Ok(report) => {
                self.multipv = Some(multipv);
                Ok(report)
            }
            Err(e) => {
                warn!("Engine exchange failed, dropping process: {}", e);
                self.process = None;
                self.multipv = None;
                Err(self.unavailable(e))
            }
        }
    }

    fn validate(position: &PositionKey, uci: &str) -> Result<(), AnalysisError> {
        CozyRules
            .apply(position, uci)
            .map(|_| ())
            .map_err(|e| AnalysisError::InvalidMove(e.to_string()))
    }
}

fn exchange(
    process: &mut EngineProcess,
    fen: &str,
    moves: &[String],
    depth: u8,
    multipv: Option<u8>,
) -> io::Result<SearchReport> {
    if let Some(multipv) = multipv {
        process.set_option("MultiPV", &multipv.to_string())?;
        process.sync()?;
    }
    process.search(fen, moves, GoParams::depth(depth))
}

impl Backend for UciEngine {
    fn top_moves(&mut self, position: &PositionKey, limits: AnalysisLimits) -> Result<Vec<TopMove>, AnalysisError> {
        let report = self.search(position.as_str(), &[], limits.depth, limits.multipv.max(1))?;

        let top: Vec<TopMove> = report
            .lines
            .into_iter()
            .filter_map(|line| {
                let uci = line.pv.first()?.clone();
                let evaluation = Evaluation::from(line.score?);
                Some(TopMove { uci, evaluation })
            })
            .collect();

        if top.is_empty() {
            return Err(AnalysisError::EmptyResult);
        }
        Ok(top)
    }

    fn evaluate_move(&mut self, position: &PositionKey, uci: &str, depth: u8) -> Result<Evaluation, AnalysisError> {
        Self::validate(position, uci)?;

        let report = self.search(position.as_str(), &[uci.to_string()], depth, 1)?;

        // Scored for the opponent, who moves next
        let score = report
            .lines
            .first()
            .and_then(|line| line.score)
            .ok_or(AnalysisError::EmptyResult)?;

        debug!("{} scored {:?} at depth {}", uci, score, depth);
        Ok(Evaluation::from(score).negate())
    }

    fn best_move(&mut self, position: &PositionKey, depth: u8) -> Result<OpponentReply, AnalysisError> {
        let report = self.search(position.as_str(), &[], depth, 1)?;

        Ok(match report.best_move.as_str() {
            "" | NULL_MOVE | NO_MOVE => OpponentReply::Placeholder,
            mv => OpponentReply::Move(mv.to_string()),
        })
    }
}

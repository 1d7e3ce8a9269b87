use std::collections::VecDeque;
use std::fmt;

use chrono::Utc;
use cozy_chess::{Color, Square};
use log::{debug, info, warn};

use crate::coach::{Advice, Persona};
use crate::coalescer::{Coalescer, FetchCompletion, FetchRequest, Lookup, Resolution};
use crate::error::{AnalysisError, Ignored, RulesError};
use crate::gesture::{BoardGeometry, GestureTracker, Tracked};
use crate::overlay::{HudView, Overlay};
use crate::ranking;
use crate::record::{merge, Evaluation, LegalMove, MoveRecord, PositionKey, TopMove};
use crate::services::{
    AnalysisLimits, AnalysisService, EngineId, OpponentReply, Outcome, PositionStatus, RulesEngine, Side,
    SessionSnapshot, SessionStore,
};

/// Whole-position analysis to run for the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichRequest {
    pub epoch: u64,
    pub position: PositionKey,
    pub engine: EngineId,
}

/// A move wanted from the opponent collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentRequest {
    pub epoch: u64,
    pub position: PositionKey,
    pub history: Vec<String>,
    pub engine: EngineId,
}

/// Transient user-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AnalysisFailed(AnalysisError),
    OpponentFailed(AnalysisError),
    OpponentPlaceholder,
    IllegalOpponentMove(String),
    GameOver(Outcome),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AnalysisFailed(e) => write!(f, "analysis failed: {}", e),
            Notice::OpponentFailed(e) => write!(f, "opponent failed: {}", e),
            Notice::OpponentPlaceholder => f.write_str("opponent produced no move"),
            Notice::IllegalOpponentMove(uci) => write!(f, "opponent sent an illegal move: {}", uci),
            Notice::GameOver(Outcome::Checkmate { winner }) => {
                write!(f, "checkmate, {} wins", Side(*winner))
            }
            Notice::GameOver(Outcome::Stalemate) => f.write_str("stalemate"),
            Notice::GameOver(Outcome::FiftyMoveRule) => f.write_str("draw by the fifty-move rule"),
            Notice::GameOver(Outcome::InsufficientMaterial) => {
                f.write_str("draw by insufficient material")
            }
        }
    }
}

impl From<MoveRecord> for LegalMove {
    fn from(record: MoveRecord) -> Self {
        Self {
            from: record.from,
            to: record.to,
            notation: record.notation,
            uci: record.uci,
            is_capture: record.is_capture,
            is_check: record.is_check,
            is_checkmate: record.is_checkmate,
        }
    }
}

/// Everything one player's annotated game needs, owned in one place.
///
/// All state changes happen on the caller's thread. Work that has to wait on a collaborator is
/// handed out as a request and folded back in through the matching `apply_*`/`complete_*`
/// method, which re-checks that the result still belongs to the current context.
pub struct Session {
    rules: Box<dyn RulesEngine>,
    store: Option<Box<dyn SessionStore>>,
    engine: EngineId,
    human: Color,
    position: PositionKey,
    status: PositionStatus,
    history: Vec<String>,
    records: Vec<MoveRecord>,
    coalescer: Coalescer,
    tracker: GestureTracker,
    overlay: Overlay,
    notices: VecDeque<Notice>,
}

impl Session {
    /// An empty session. Call [`Session::new_game`], [`Session::restore`] or
    /// [`Session::load_position`] before use.
    pub fn new(rules: Box<dyn RulesEngine>, engine: EngineId, human: Color, debounce: u64) -> Self {
        Self {
            rules,
            store: None,
            engine,
            human,
            position: PositionKey::startpos(),
            status: PositionStatus {
                turn: Color::White,
                outcome: None,
            },
            history: Vec::new(),
            records: Vec::new(),
            coalescer: Coalescer::new(debounce, engine),
            tracker: GestureTracker::new(BoardGeometry {
                orientation: human,
                ..BoardGeometry::default()
            }),
            overlay: Overlay::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn with_store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn position(&self) -> &PositionKey {
        &self.position
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn status(&self) -> PositionStatus {
        self.status
    }

    pub fn engine(&self) -> EngineId {
        self.engine
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn epoch(&self) -> u64 {
        self.coalescer.epoch()
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.tracker.geometry()
    }

    pub fn set_geometry(&mut self, geometry: BoardGeometry) {
        self.clear_targeting();
        self.tracker.set_geometry(geometry);
    }

    pub fn set_debounce(&mut self, debounce: u64) {
        self.coalescer.set_debounce(debounce);
    }

    pub fn is_human_turn(&self) -> bool {
        self.status.turn == self.human && !self.status.is_over()
    }

    /// Moves in display order.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn best_move(&self) -> Option<&MoveRecord> {
        ranking::best_move(&self.records)
    }

    /// Score of the position from White's point of view: the best move's score, flipped when Black
    /// is to move. `None` until the best move is scored.
    pub fn position_evaluation(&self) -> Option<Evaluation> {
        let evaluation = self.best_move()?.evaluation?;
        Some(match self.status.turn {
            Color::White => evaluation,
            Color::Black => evaluation.negate(),
        })
    }

    pub fn display(&self) -> &HudView {
        self.overlay.view()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn coach(&self, persona: Persona) -> Advice {
        Advice::new(&self.records, persona)
    }

    /// Switches to `position`. Every cache, record and targeting of the old position is dropped.
    pub fn load_position(&mut self, position: PositionKey, history: Vec<String>) -> Result<(), RulesError> {
        let legal = self.rules.legal_moves(&position)?;
        let status = self.rules.status(&position)?;

        self.clear_targeting();
        self.coalescer.reset(Some(position.clone()), self.engine);

        self.records = merge(legal, &[]);
        ranking::sort(&mut self.records);
        self.position = position;
        self.status = status;
        self.history = history;

        info!(
            "Position {} ({} legal moves, {} to move)",
            self.position,
            self.records.len(),
            status.side_to_move()
        );
        if let Some(outcome) = status.outcome {
            self.notices.push_back(Notice::GameOver(outcome));
        }
        Ok(())
    }

    pub fn new_game(&mut self) -> Result<(), RulesError> {
        self.load_position(PositionKey::startpos(), Vec::new())?;
        self.persist();
        Ok(())
    }

    /// Loads the stored session, if any. Store failures are logged and leave the session as is.
    pub fn restore(&mut self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(e) => {
                warn!("Could not read the saved session: {}", e);
                return false;
            }
        };

        let engine = self.engine;
        self.engine = snapshot.engine;
        match self.load_position(PositionKey::new(snapshot.fen), snapshot.history) {
            Ok(()) => {
                info!("Restored session saved at {}", snapshot.saved_at);
                true
            }
            Err(e) => {
                warn!("Saved session is unusable: {}", e);
                self.engine = engine;
                false
            }
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let snapshot = SessionSnapshot {
            fen: self.position.to_string(),
            history: self.history.clone(),
            engine: self.engine,
            saved_at: Utc::now(),
        };
        if let Err(e) = store.save(&snapshot) {
            warn!("Session not saved: {}", e);
        }
    }

    /// The analysis to run for the current position, unless the game is over.
    pub fn enrich_request(&self) -> Option<EnrichRequest> {
        if self.status.is_over() || self.records.is_empty() {
            return None;
        }
        Some(EnrichRequest {
            epoch: self.epoch(),
            position: self.position.clone(),
            engine: self.engine,
        })
    }

    /// Folds a whole-position analysis in. Returns false when it no longer applies.
    pub fn apply_analysis(
        &mut self,
        request: &EnrichRequest,
        result: Result<Vec<TopMove>, AnalysisError>,
    ) -> bool {
        if request.epoch != self.epoch() || request.position != self.position {
            debug!("Dropping analysis for an old context ({:?})", Ignored::StaleResponse);
            return false;
        }

        let top = match result {
            Ok(top) if top.is_empty() => Err(AnalysisError::EmptyResult),
            other => other,
        };
        let top = match top {
            Ok(top) => top,
            Err(e) => {
                warn!("Analysis of {} failed: {}", self.position, e);
                self.notices.push_back(Notice::AnalysisFailed(e));
                return true;
            }
        };

        self.coalescer.absorb(request.epoch, &self.position, &top);

        let legal: Vec<LegalMove> = self.records.drain(..).map(LegalMove::from).collect();
        self.records = merge(legal, &top);
        for record in self.records.iter_mut().filter(|record| record.rank.is_none()) {
            record.evaluation = self.coalescer.lookup(&record.uci);
        }
        ranking::sort(&mut self.records);

        // A target waiting on its own fetch may have just been answered
        if let Some(record) = self.current_record() {
            if record.evaluation.is_some() && self.overlay.view().to == Some(record.to) {
                let record = record.clone();
                self.coalescer.cancel_pending();
                self.overlay.analyzed(&record);
            }
        }
        true
    }

    /// Runs the analysis synchronously against `service`.
    pub fn enrich(
        &mut self,
        service: &mut dyn AnalysisService,
        limits: AnalysisLimits,
    ) -> Result<(), AnalysisError> {
        let Some(request) = self.enrich_request() else {
            return Ok(());
        };

        let result = service.top_moves(&request.position, request.engine, limits);
        let error = match &result {
            Ok(top) if top.is_empty() => Some(AnalysisError::EmptyResult),
            Ok(_) => None,
            Err(e) => Some(e.clone()),
        };
        self.apply_analysis(&request, result);

        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn set_engine(&mut self, engine: EngineId) {
        info!("Engine {} -> {}", self.engine, engine);
        self.engine = engine;
        self.invalidate();
    }

    /// Forgets every evaluation of the current position and cancels outstanding work.
    pub fn invalidate(&mut self) {
        self.clear_targeting();
        self.coalescer.reset(Some(self.position.clone()), self.engine);

        for record in &mut self.records {
            record.evaluation = None;
            record.rank = None;
        }
        ranking::sort(&mut self.records);
    }

    fn clear_targeting(&mut self) {
        self.tracker.reset();
        self.coalescer.cancel_pending();
        self.overlay.reset();
    }

    fn record_for(&self, from: Square, to: Square) -> Option<&MoveRecord> {
        self.records
            .iter()
            .find(|record| record.from == from && record.to == to)
    }

    fn current_record(&self) -> Option<&MoveRecord> {
        let (from, to) = self.tracker.current_move()?;
        self.record_for(from, to)
    }

    fn current_uci(&self) -> Option<String> {
        self.current_record().map(|record| record.uci.clone())
    }

    /// Starts a drag at the pointer position. Only the human's own pieces with moves can be picked up.
    pub fn begin_gesture(&mut self, x: f32, y: f32) -> Result<Square, Ignored> {
        if !self.is_human_turn() {
            return Err(Ignored::InvalidGesture);
        }

        let source = self.tracker.source_at(x, y)?;
        let targets: Vec<Square> = self
            .records
            .iter()
            .filter(|record| record.from == source)
            .map(|record| record.to)
            .collect();
        if targets.is_empty() {
            return Err(Ignored::InvalidGesture);
        }

        self.clear_targeting();
        self.tracker.begin(source, targets);
        self.overlay.dragging(source);
        Ok(source)
    }

    pub fn continue_gesture(&mut self, x: f32, y: f32, now: u64) -> Tracked {
        let tracked = self.tracker.track(x, y);
        match tracked {
            Tracked::Target(_) => self.target_changed(now),
            Tracked::Ignored(reason) => debug!("Pointer ({}, {}) ignored: {:?}", x, y, reason),
            Tracked::Unchanged => {}
        }
        tracked
    }

    /// Ends the drag and clears the targeting. Returns the dropped move if it is legal.
    pub fn end_gesture(&mut self, x: f32, y: f32) -> Option<String> {
        let dropped = self.tracker.end(x, y);
        let uci = dropped
            .and_then(|(from, to)| self.record_for(from, to))
            .map(|record| record.uci.clone());

        self.clear_targeting();
        uci
    }

    pub fn cancel_gesture(&mut self) {
        self.clear_targeting();
    }

    /// Targets a move without dragging, e.g. from the move list.
    pub fn preview(&mut self, uci: &str, now: u64) -> Result<(), Ignored> {
        if !self.is_human_turn() {
            return Err(Ignored::InvalidGesture);
        }
        let Some(record) = self.records.iter().find(|record| record.uci == uci) else {
            return Err(Ignored::InvalidGesture);
        };

        let (from, to) = (record.from, record.to);
        self.clear_targeting();
        self.tracker.preview(from, to);
        self.target_changed(now);
        Ok(())
    }

    fn target_changed(&mut self, now: u64) {
        let Some(record) = self.current_record().cloned() else {
            return;
        };

        match self.coalescer.request(&record.uci, now) {
            Lookup::Hit(evaluation) => {
                let record = self.fold_evaluation(&record.uci, evaluation).unwrap_or(record);
                self.overlay.analyzed(&record);
            }
            Lookup::Scheduled { .. } | Lookup::AwaitingInFlight => self.overlay.computing(&record),
        }
    }

    /// Stores a single-move evaluation on its record and keeps the list ordered.
    fn fold_evaluation(&mut self, uci: &str, evaluation: Evaluation) -> Option<MoveRecord> {
        let record = self.records.iter_mut().find(|record| record.uci == uci)?;
        if record.rank.is_none() && record.evaluation != Some(evaluation) {
            record.evaluation = Some(evaluation);
            let folded = record.clone();
            ranking::sort(&mut self.records);
            return Some(folded);
        }
        Some(record.clone())
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.coalescer.next_deadline()
    }

    /// Fires the debounce timer if due.
    pub fn tick(&mut self, now: u64) -> Option<FetchRequest> {
        let request = self.coalescer.poll(now)?;
        debug!("Fetching {} (#{})", request.uci, request.id);
        Some(request)
    }

    pub fn complete_fetch(&mut self, completion: FetchCompletion) -> Resolution {
        let current = self.current_uci();
        let resolution = self.coalescer.complete(completion, current.as_deref());

        match &resolution {
            Resolution::Current { uci, evaluation } => {
                if let Some(record) = self.fold_evaluation(uci, *evaluation) {
                    self.overlay.analyzed(&record);
                }
            }
            Resolution::Cached { uci, evaluation } => {
                self.fold_evaluation(uci, *evaluation);
            }
            Resolution::Failed { uci, error } => {
                debug!("Evaluation of {} failed: {}", uci, error);
                if let Some(record) = self.current_record().cloned() {
                    self.overlay.unavailable(&record);
                }
            }
            Resolution::Ignored(reason) => debug!("Fetch result ignored: {:?}", reason),
        }

        resolution
    }

    /// Plays `uci` for the side to move, then saves the session.
    pub fn apply_move(&mut self, uci: &str) -> Result<(), RulesError> {
        let next = self.rules.apply(&self.position, uci)?;

        let mut history = self.history.clone();
        history.push(uci.to_string());
        self.load_position(next, history)?;

        self.persist();
        Ok(())
    }

    /// What to ask the opponent for, when it is the opponent's turn.
    pub fn opponent_request(&self) -> Option<OpponentRequest> {
        if self.status.is_over() || self.status.turn == self.human {
            return None;
        }
        Some(OpponentRequest {
            epoch: self.epoch(),
            position: self.position.clone(),
            history: self.history.clone(),
            engine: self.engine,
        })
    }

    /// Applies the opponent's reply if it is a real, legal move for the position it was asked about.
    /// Returns true if a move was played.
    pub fn apply_opponent_reply(
        &mut self,
        request: &OpponentRequest,
        reply: Result<OpponentReply, AnalysisError>,
    ) -> bool {
        if request.epoch != self.epoch() || request.position != self.position {
            debug!("Dropping opponent reply for an old position");
            return false;
        }

        let uci = match reply {
            Ok(OpponentReply::Move(uci)) => uci,
            Ok(OpponentReply::Placeholder) => {
                self.notices.push_back(Notice::OpponentPlaceholder);
                return false;
            }
            Err(e) => {
                warn!("Opponent move failed: {}", e);
                self.notices.push_back(Notice::OpponentFailed(e));
                return false;
            }
        };

        match self.apply_move(&uci) {
            Ok(()) => true,
            Err(e) => {
                warn!("Opponent move rejected: {}", e);
                self.notices.push_back(Notice::IllegalOpponentMove(uci));
                false
            }
        }
    }

    /// Mirrors the board. Any gesture in progress ends.
    pub fn flip(&mut self) {
        let geometry = self.tracker.geometry().flipped();
        self.set_geometry(geometry);
    }

    pub fn set_human(&mut self, human: Color) {
        self.human = human;
        self.clear_targeting();
    }
}

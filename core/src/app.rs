//! The arena loop: reads driver commands, owns the session and coordinates the engine worker.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use annotate::engines::Engines;
use annotate::rules::CozyRules;
use annotate::services::{OpponentReply, RulesEngine};
use annotate::{
    AnalysisError, BoardGeometry, EnrichRequest, FetchCompletion, HudConfig, HudView, OpponentRequest,
    PositionKey, RulesError, Session, TopMove,
};
use log::{debug, info, warn};

use crate::commands::{Command, Decoder};
use crate::render;
use crate::worker::{EngineWorker, Job};

/// Everything the arena loop reacts to.
pub enum Event {
    Input(String),
    InputClosed,
    Interrupted,
    Analysis {
        request: EnrichRequest,
        result: Result<Vec<TopMove>, AnalysisError>,
    },
    Evaluation(FetchCompletion),
    Opponent {
        request: OpponentRequest,
        reply: Result<OpponentReply, AnalysisError>,
    },
}

pub struct Arena<W: Write> {
    session: Session,
    config: HudConfig,
    decoder: Decoder,
    jobs: Sender<Job>,
    events: Receiver<Event>,
    event_tx: Sender<Event>,
    worker_handle: Option<JoinHandle<()>>,
    started: Instant,
    output: W,
    // Jobs sent to the worker whose event has not come back yet, reported at shutdown
    outstanding: usize,
    // Epoch the last analysis / opponent request was sent for
    enriched: Option<u64>,
    asked_opponent: Option<u64>,
    last_view: HudView,
}

impl<W: Write> Arena<W> {
    /// Creates the arena, spawning the engine worker thread.
    pub fn new(session: Session, config: HudConfig, engines: Engines, output: W) -> Self {
        let (jobs, jobs_rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();

        let worker = EngineWorker::new(engines, jobs_rx, event_tx.clone());
        let worker_handle = thread::spawn(move || worker.run());

        Self {
            session,
            config,
            decoder: Decoder,
            jobs,
            events,
            event_tx,
            worker_handle: Some(worker_handle),
            started: Instant::now(),
            output,
            outstanding: 0,
            enriched: None,
            asked_opponent: None,
            last_view: HudView::default(),
        }
    }

    /// Sender for input sources living on other threads.
    pub fn sender(&self) -> Sender<Event> {
        self.event_tx.clone()
    }

    /// Runs until quit, end of input or interrupt.
    pub fn run(mut self) -> io::Result<()> {
        self.pump()?;

        loop {
            let event = match self.session.next_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_sub(self.now());
                    match self.events.recv_timeout(Duration::from_millis(wait)) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.events.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                },
            };

            if let Some(event) = event {
                if !self.handle(event)? {
                    break;
                }
            }
            self.pump()?;
        }

        self.shutdown();
        Ok(())
    }

    fn now(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Handles one event. Returns false if we should quit.
    fn handle(&mut self, event: Event) -> io::Result<bool> {
        match event {
            Event::Input(line) => return self.execute(&line),
            Event::InputClosed => {
                debug!("Input closed");
                return Ok(false);
            }
            Event::Interrupted => {
                info!("Interrupted");
                return Ok(false);
            }
            Event::Analysis { request, result } => {
                self.outstanding = self.outstanding.saturating_sub(1);
                if !self.session.apply_analysis(&request, result) {
                    debug!("Analysis for epoch {} superseded", request.epoch);
                }
            }
            Event::Evaluation(completion) => {
                self.outstanding = self.outstanding.saturating_sub(1);
                let resolution = self.session.complete_fetch(completion);
                debug!("Fetch resolved: {:?}", resolution);
            }
            Event::Opponent { request, reply } => {
                self.outstanding = self.outstanding.saturating_sub(1);
                if self.session.apply_opponent_reply(&request, reply) {
                    if let Some(uci) = self.session.history().last() {
                        writeln!(self.output, "opponent {}", uci)?;
                    }
                }
            }
        }
        Ok(true)
    }

    /// Executes one driver command. Returns false on quit.
    fn execute(&mut self, line: &str) -> io::Result<bool> {
        debug!("Input: {:?}", line.trim());
        let now = self.now();

        match self.decoder.decode(line) {
            Command::NewGame => {
                if let Err(e) = self.session.new_game() {
                    writeln!(self.output, "error {}", e)?;
                }
            }
            Command::Position { fen, moves } => {
                let result = resolve_position(fen, &moves)
                    .and_then(|position| self.session.load_position(position, moves));
                if let Err(e) = result {
                    writeln!(self.output, "error {}", e)?;
                }
            }
            Command::Engine(engine) => self.session.set_engine(engine),
            Command::Refresh => self.session.invalidate(),

            Command::Down(x, y) => {
                if let Err(reason) = self.session.begin_gesture(x, y) {
                    debug!("Pointer down at ({}, {}) ignored: {:?}", x, y, reason);
                }
            }
            Command::Drag(x, y) => {
                self.session.continue_gesture(x, y, now);
            }
            Command::Up(x, y) => {
                if let Some(uci) = self.session.end_gesture(x, y) {
                    self.play(&uci)?;
                }
            }
            Command::Cancel => self.session.cancel_gesture(),
            Command::Preview(uci) => {
                if let Err(reason) = self.session.preview(&uci, now) {
                    writeln!(self.output, "error cannot preview {}: {:?}", uci, reason)?;
                }
            }

            Command::Play(uci) => self.play(&uci)?,
            Command::Flip => self.session.flip(),
            Command::Geometry(origin_x, origin_y, square_size) => {
                let geometry = BoardGeometry {
                    origin_x,
                    origin_y,
                    square_size,
                    ..self.session.geometry()
                };
                self.session.set_geometry(geometry);
            }
            Command::Side(human) => self.session.set_human(human),
            Command::List => {
                for line in render::move_list(self.session.records()) {
                    writeln!(self.output, "{}", line)?;
                }
            }
            Command::Show => {
                for line in render::summary(&self.session) {
                    writeln!(self.output, "{}", line)?;
                }
            }
            Command::Eval => {
                writeln!(self.output, "{}", render::evaluation(self.session.position_evaluation()))?;
            }
            Command::Coach(persona) => {
                for line in render::advice(&self.session.coach(persona)) {
                    writeln!(self.output, "{}", line)?;
                }
            }

            Command::SetOption { name, value } => {
                if let Err(e) = self.config.update(&name, &value) {
                    debug!("Option setting failed: {}", e);
                    writeln!(self.output, "error {}", e)?;
                } else {
                    debug!("Set option '{}' to '{}'", name, value);
                    self.session.set_debounce(self.config.debounce_ms.value);
                }
            }
            Command::Options => {
                for line in self.config.describe() {
                    writeln!(self.output, "{}", line)?;
                }
            }
            Command::Quit => return Ok(false),

            Command::Unknown(line) => {
                debug!("Unknown command: {}", line);
                writeln!(self.output, "error unknown command: {}", line)?;
            }
        }
        Ok(true)
    }

    fn play(&mut self, uci: &str) -> io::Result<()> {
        if !self.session.is_human_turn() && self.config.auto_opponent.value {
            return writeln!(self.output, "error not your turn");
        }
        match self.session.apply_move(uci) {
            Ok(()) => writeln!(self.output, "played {}", uci),
            Err(e) => writeln!(self.output, "error {}", e),
        }
    }

    /// Hands due work to the worker and prints whatever changed.
    fn pump(&mut self) -> io::Result<()> {
        if let Some(request) = self.session.tick(self.now()) {
            let depth = self.config.move_eval_depth.value;
            self.send(Job::Evaluate { request, depth });
        }

        let auto_opponent = self.config.auto_opponent.value;
        if self.session.is_human_turn() || !auto_opponent {
            if let Some(request) = self.session.enrich_request() {
                if self.enriched != Some(request.epoch) {
                    self.enriched = Some(request.epoch);
                    let limits = self.config.analysis_limits();
                    self.send(Job::Enrich { request, limits });
                }
            }
        }

        if auto_opponent {
            if let Some(request) = self.session.opponent_request() {
                if self.asked_opponent != Some(request.epoch) {
                    self.asked_opponent = Some(request.epoch);
                    let depth = self.config.opponent_depth.value;
                    self.send(Job::Opponent { request, depth });
                }
            }
        }

        for notice in self.session.drain_notices() {
            writeln!(self.output, "{}", render::notice(&notice))?;
        }

        if *self.session.display() != self.last_view {
            self.last_view = self.session.display().clone();
            writeln!(self.output, "{}", render::hud(&self.last_view))?;
        }

        self.output.flush()
    }

    fn send(&mut self, job: Job) {
        if self.jobs.send(job).is_err() {
            warn!("Engine worker is gone");
            return;
        }
        self.outstanding += 1;
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.worker_handle.take() else {
            return;
        };
        if self.outstanding > 0 {
            info!("Shutting down with {} engine jobs outstanding", self.outstanding);
        }
        let _ = self.jobs.send(Job::Quit);
        let _ = handle.join();
    }
}

impl<W: Write> Drop for Arena<W> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The position reached by playing `moves` from `fen` (or the start position).
fn resolve_position(fen: Option<String>, moves: &[String]) -> Result<PositionKey, RulesError> {
    let start = fen.map(PositionKey::new).unwrap_or_else(PositionKey::startpos);
    moves
        .iter()
        .try_fold(start, |position, uci| CozyRules.apply(&position, uci))
}

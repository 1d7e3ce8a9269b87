use std::sync::mpsc::{Receiver, Sender};

use annotate::engines::Engines;
use annotate::services::{AnalysisLimits, AnalysisService, OpponentService};
use annotate::{EnrichRequest, FetchOutcome, FetchRequest, OpponentRequest};
use log::debug;

use crate::app::Event;

/// Work sent from the arena loop to the engine worker.
pub enum Job {
    /// Whole-position analysis.
    Enrich {
        request: EnrichRequest,
        limits: AnalysisLimits,
    },
    /// Single-move evaluation. Skipped if its token was cancelled while queued.
    Evaluate { request: FetchRequest, depth: u8 },
    Opponent { request: OpponentRequest, depth: u8 },
    /// Shut down the worker thread.
    Quit,
}

/// Engine worker that processes jobs on a dedicated thread.
///
/// Owns the engines, so a slow search never blocks pointer input. Every job except `Quit`
/// produces exactly one event.
pub struct EngineWorker {
    engines: Engines,
    rx: Receiver<Job>,
    events: Sender<Event>,
}

impl EngineWorker {
    pub fn new(engines: Engines, rx: Receiver<Job>, events: Sender<Event>) -> Self {
        Self { engines, rx, events }
    }

    /// Main loop: process jobs until Quit is received.
    pub fn run(mut self) {
        while let Ok(job) = self.rx.recv() {
            let event = match job {
                Job::Enrich { request, limits } => {
                    let result = self
                        .engines
                        .top_moves(&request.position, request.engine, limits);
                    Event::Analysis { request, result }
                }
                Job::Evaluate { request, depth } => {
                    let outcome = if request.is_cancelled() {
                        debug!("Skipping cancelled fetch #{}", request.id);
                        FetchOutcome::Cancelled
                    } else {
                        match self.engines.evaluate_move(
                            &request.position,
                            &request.uci,
                            request.engine,
                            depth,
                        ) {
                            Ok(evaluation) => FetchOutcome::Evaluated(evaluation),
                            Err(e) => FetchOutcome::Failed(e),
                        }
                    };
                    Event::Evaluation(request.complete(outcome))
                }
                Job::Opponent { request, depth } => {
                    let reply = self.engines.opponent_move(
                        &request.position,
                        &request.history,
                        request.engine,
                        depth,
                    );
                    Event::Opponent { request, reply }
                }
                Job::Quit => break,
            };

            if self.events.send(event).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::thread;

    use annotate::services::{EngineId, OpponentReply};
    use annotate::{AnalysisError, CancelToken, PositionKey};

    fn spawn() -> (Sender<Job>, Receiver<Event>, thread::JoinHandle<()>) {
        let (jobs, rx) = mpsc::channel();
        let (events, events_rx) = mpsc::channel();
        let engines = Engines::new(PathBuf::from("/nonexistent/stockfish"), Some(3));
        let handle = thread::spawn(move || EngineWorker::new(engines, rx, events).run());
        (jobs, events_rx, handle)
    }

    fn fetch(uci: &str, engine: EngineId) -> FetchRequest {
        FetchRequest {
            id: 1,
            epoch: 4,
            position: PositionKey::startpos(),
            uci: uci.to_string(),
            engine,
            token: CancelToken::new(),
        }
    }

    #[test]
    fn test_cancelled_fetch_is_skipped() {
        let (jobs, events, handle) = spawn();

        let request = fetch("e2e4", EngineId::Random);
        request.token.cancel();
        jobs.send(Job::Evaluate { request, depth: 8 }).unwrap();

        match events.recv().unwrap() {
            Event::Evaluation(completion) => {
                assert_eq!(completion.epoch, 4);
                assert_eq!(completion.outcome, FetchOutcome::Cancelled);
            }
            _ => panic!("expected an evaluation"),
        }

        jobs.send(Job::Quit).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_jobs_answer_in_order() {
        let (jobs, events, handle) = spawn();

        jobs.send(Job::Evaluate {
            request: fetch("e2e4", EngineId::Random),
            depth: 8,
        })
        .unwrap();
        jobs.send(Job::Evaluate {
            request: fetch("e2e4", EngineId::Stockfish),
            depth: 8,
        })
        .unwrap();
        jobs.send(Job::Opponent {
            request: OpponentRequest {
                epoch: 4,
                position: PositionKey::startpos(),
                history: vec![],
                engine: EngineId::Random,
            },
            depth: 4,
        })
        .unwrap();

        assert!(matches!(
            events.recv().unwrap(),
            Event::Evaluation(completion) if matches!(completion.outcome, FetchOutcome::Evaluated(_))
        ));
        assert!(matches!(
            events.recv().unwrap(),
            Event::Evaluation(completion)
                if matches!(completion.outcome, FetchOutcome::Failed(AnalysisError::ServiceUnavailable(_)))
        ));
        assert!(matches!(
            events.recv().unwrap(),
            Event::Opponent { reply: Ok(OpponentReply::Move(_)), .. }
        ));

        jobs.send(Job::Quit).unwrap();
        handle.join().unwrap();
    }
}

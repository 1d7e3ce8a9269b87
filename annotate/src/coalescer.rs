use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::debug;

use crate::cache::EvaluationCache;
use crate::error::{AnalysisError, Ignored};
use crate::record::{Evaluation, PositionKey, TopMove};
use crate::services::EngineId;

/// Cooperative cancellation flag shared with whoever runs a fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a new target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit(Evaluation),
    /// A fetch fires at `deadline` unless superseded first.
    Scheduled { deadline: u64 },
    /// A fetch for the same move is already running.
    AwaitingInFlight,
}

/// One outbound single-move evaluation.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub id: u64,
    pub epoch: u64,
    pub position: PositionKey,
    pub uci: String,
    pub engine: EngineId,
    pub token: CancelToken,
}

impl FetchRequest {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The completion to report for this request.
    pub fn complete(&self, outcome: FetchOutcome) -> FetchCompletion {
        FetchCompletion {
            id: self.id,
            epoch: self.epoch,
            uci: self.uci.clone(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Evaluated(Evaluation),
    Failed(AnalysisError),
    /// The token was set before the fetch ran.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    pub id: u64,
    pub epoch: u64,
    pub uci: String,
    pub outcome: FetchOutcome,
}

/// What a completion means for the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Cached, and still the current target.
    Current { uci: String, evaluation: Evaluation },
    /// Cached, but the target moved on. The display must not change.
    Cached { uci: String, evaluation: Evaluation },
    /// The current target could not be evaluated. Nothing was cached.
    Failed { uci: String, error: AnalysisError },
    Ignored(Ignored),
}

#[derive(Debug, Clone)]
struct Pending {
    uci: String,
    deadline: u64,
}

#[derive(Debug, Clone)]
struct InFlight {
    id: u64,
    uci: String,
    token: CancelToken,
}

/// Debounced, de-duplicated, cancellable single-move evaluation over an [`EvaluationCache`].
///
/// Time is logical: every call that depends on the clock takes `now` in milliseconds. At most one
/// debounce timer and one in-flight fetch exist at a time. Every context change bumps the epoch,
/// and completions from an older epoch are dropped without touching the cache.
#[derive(Debug)]
pub struct Coalescer {
    cache: EvaluationCache,
    debounce: u64,
    engine: EngineId,
    epoch: u64,
    next_id: u64,
    pending: Option<Pending>,
    in_flight: Option<InFlight>,
}

impl Coalescer {
    pub fn new(debounce: u64, engine: EngineId) -> Self {
        Self {
            cache: EvaluationCache::new(),
            debounce,
            engine,
            epoch: 0,
            next_id: 0,
            pending: None,
            in_flight: None,
        }
    }

    pub fn set_debounce(&mut self, debounce: u64) {
        self.debounce = debounce;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn engine(&self) -> EngineId {
        self.engine
    }

    pub fn position(&self) -> Option<&PositionKey> {
        self.cache.position()
    }

    pub fn cache(&self) -> &EvaluationCache {
        &self.cache
    }

    /// Enters a new context: clears the cache and cancels any pending or in-flight work.
    pub fn reset(&mut self, position: Option<PositionKey>, engine: EngineId) {
        self.abort();
        self.epoch += 1;
        self.engine = engine;
        self.cache.reset(position);
    }

    /// Same context, fresh start.
    pub fn invalidate(&mut self) {
        let position = self.cache.position().cloned();
        self.reset(position, self.engine);
    }

    fn abort(&mut self) {
        self.pending = None;
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.token.cancel();
        }
    }

    /// Stops the debounce timer. A fetch already running is left alone.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Debounce for {} cancelled", pending.uci);
        }
    }

    pub fn lookup(&self, uci: &str) -> Option<Evaluation> {
        self.cache.position().and_then(|position| self.cache.get(position, uci))
    }

    /// Routes a newly targeted move: cache first, otherwise (re)start the debounce for it.
    pub fn request(&mut self, uci: &str, now: u64) -> Lookup {
        if let Some(evaluation) = self.lookup(uci) {
            self.cancel_pending();
            return Lookup::Hit(evaluation);
        }

        if self.in_flight.as_ref().is_some_and(|f| f.uci == uci) {
            self.cancel_pending();
            return Lookup::AwaitingInFlight;
        }

        let deadline = now.saturating_add(self.debounce);
        self.pending = Some(Pending {
            uci: uci.to_string(),
            deadline,
        });
        Lookup::Scheduled { deadline }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Fires the debounce timer if it is due, superseding any fetch still running.
    pub fn poll(&mut self, now: u64) -> Option<FetchRequest> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        let pending = self.pending.take()?;
        if self.lookup(&pending.uci).is_some() {
            debug!("{} was cached while its debounce ran", pending.uci);
            return None;
        }
        let position = self.cache.position()?.clone();

        if let Some(previous) = self.in_flight.take() {
            debug!("Fetch #{} for {} superseded", previous.id, previous.uci);
            previous.token.cancel();
        }

        self.next_id += 1;
        let token = CancelToken::new();
        self.in_flight = Some(InFlight {
            id: self.next_id,
            uci: pending.uci.clone(),
            token: token.clone(),
        });

        Some(FetchRequest {
            id: self.next_id,
            epoch: self.epoch,
            position,
            uci: pending.uci,
            engine: self.engine,
            token,
        })
    }

    /// Folds a finished fetch in. `current` is the move targeted right now, if any.
    pub fn complete(&mut self, completion: FetchCompletion, current: Option<&str>) -> Resolution {
        if completion.epoch != self.epoch {
            debug!(
                "Dropping fetch #{} from epoch {} (now {})",
                completion.id, completion.epoch, self.epoch
            );
            return Resolution::Ignored(Ignored::StaleResponse);
        }

        if self.in_flight.as_ref().is_some_and(|f| f.id == completion.id) {
            self.in_flight = None;
        }

        let is_current = current == Some(completion.uci.as_str());
        let rescheduled = self.pending.as_ref().is_some_and(|p| p.uci == completion.uci);
        let FetchCompletion { uci, outcome, .. } = completion;

        match outcome {
            FetchOutcome::Evaluated(evaluation) => {
                if let Some(position) = self.cache.position().cloned() {
                    self.cache.insert(&position, &uci, evaluation);
                }
                // The answer is in; a timer for the same move has nothing left to fetch
                if rescheduled {
                    self.pending = None;
                }
                if is_current {
                    Resolution::Current { uci, evaluation }
                } else {
                    Resolution::Cached { uci, evaluation }
                }
            }
            // A fresh fetch for the same move is already scheduled, so keep showing it as pending
            FetchOutcome::Failed(error) if is_current && !rescheduled => Resolution::Failed { uci, error },
            FetchOutcome::Failed(_) | FetchOutcome::Cancelled => {
                Resolution::Ignored(Ignored::StaleResponse)
            }
        }
    }

    /// Seeds the cache with a whole analysis of the current position. Returns false if `epoch`
    /// or `position` no longer apply.
    pub fn absorb(&mut self, epoch: u64, position: &PositionKey, top_moves: &[TopMove]) -> bool {
        if epoch != self.epoch || self.cache.position() != Some(position) {
            return false;
        }
        for top in top_moves {
            self.cache.insert(position, &top.uci, top.evaluation);
        }
        true
    }
}

mod cache;
mod coach;
mod coalescer;
mod config;
mod error;
mod gesture;
mod overlay;
mod quality;
mod ranking;
mod record;
mod session;

pub mod engines;
pub mod rules;
pub mod services;
pub mod store;

pub use cache::EvaluationCache;
pub use coach::{Advice, Persona, FALLBACK_DIALOG};
pub use coalescer::{CancelToken, Coalescer, FetchCompletion, FetchOutcome, FetchRequest, Lookup, Resolution};
pub use config::{ConfigParam, HudConfig, ParamKind};
pub use error::{AnalysisError, Ignored, RulesError, StoreError};
pub use gesture::{BoardGeometry, GestureTracker, Targeting, Tracked};
pub use overlay::{format_score, HudPhase, HudView, Overlay, PENDING_MARKER, UNAVAILABLE_MARKER};
pub use quality::{classify, Quality};
pub use ranking::{best_move, compare, priority, sort};
pub use record::{merge, Evaluation, LegalMove, MoveRecord, PositionKey, TopMove};
pub use session::{EnrichRequest, Notice, OpponentRequest, Session};

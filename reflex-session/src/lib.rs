pub mod config;
pub mod evaluation;
pub mod state;
pub mod stats;
pub mod summary;
pub mod trial;

pub use config::{ModeRules, SessionConfig};
pub use evaluation::{Evaluation, classify, classify_composite_score};
pub use state::{SessionEvent, SessionMachine, SessionSignal};
pub use stats::{Consistency, ReactionStats, compute_stats};
pub use summary::{MemoryResult, SessionSummary};

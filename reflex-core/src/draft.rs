use serde::{Deserialize, Serialize};

use crate::Mode;

/// Session result ready to be stored, minus the user, id and timestamp the
/// store fills in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub mode: Mode,
    pub reaction_time_ms: u64,
    pub accuracy_pct: Option<u32>,
    pub score: Option<u32>,
}

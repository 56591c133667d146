use serde::{Deserialize, Serialize};

use crate::Stimulus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrialOutcome {
    Correct,
    Incorrect,
    FalseStart,
    /// Response window closed on a stimulus that asked for a tap.
    Timeout,
}

/// Recorded result per trial. Immutable once appended to a session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub index: usize,
    pub stimulus: Stimulus,
    pub outcome: TrialOutcome,
    pub tapped: bool,
    /// Present only for a correct tap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_time_ms: Option<u64>,
}

impl Trial {
    pub fn is_correct(&self) -> bool {
        self.outcome == TrialOutcome::Correct
    }

    pub fn is_false_start(&self) -> bool {
        self.outcome == TrialOutcome::FalseStart
    }

    /// Reaction time that counts toward session averages.
    pub fn sample(&self) -> Option<u64> {
        if self.is_correct() {
            self.reaction_time_ms
        } else {
            None
        }
    }
}

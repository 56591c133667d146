use anyhow::{Context, Result};
use reflex_core::{Difficulty, Mode, RecordDraft, Trial};
use serde::Serialize;

use crate::stats::{self, ReactionStats};

/// Outcome of the dual-mode recall step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryResult {
    pub digits: Vec<u8>,
    pub true_sum: u32,
    pub recalled_sum: u32,
}

impl MemoryResult {
    pub fn is_exact(&self) -> bool {
        self.true_sum == self.recalled_sum
    }

    pub fn accuracy_pct(&self) -> f64 {
        if self.is_exact() { 100.0 } else { 0.0 }
    }
}

/// Everything derived from a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub mode: Mode,
    pub difficulty: Option<Difficulty>,
    pub trials: Vec<Trial>,
    pub correct_count: usize,
    pub false_starts: usize,
    /// Stats over the reaction times of correct taps.
    pub stats: Option<ReactionStats>,
    /// Representative speed: rounded mean of the timed correct taps.
    pub reaction_time_ms: u64,
    pub accuracy_pct: Option<u32>,
    pub score: Option<u32>,
    pub memory: Option<MemoryResult>,
}

impl SessionSummary {
    pub fn new(
        mode: Mode,
        difficulty: Difficulty,
        trials: Vec<Trial>,
        memory: Option<MemoryResult>,
    ) -> Self {
        let samples: Vec<u64> = trials.iter().filter_map(Trial::sample).collect();
        let avg = stats::mean(&samples);
        let correct_count = trials.iter().filter(|t| t.is_correct()).count();
        let false_starts = trials.iter().filter(|t| t.is_false_start()).count();
        let color_accuracy = stats::accuracy_pct(correct_count, trials.len());

        let (accuracy_pct, score) = match mode {
            Mode::Simple | Mode::Sprint => (None, None),
            Mode::Color => (
                Some(color_accuracy.round() as u32),
                Some(stats::color_score(color_accuracy, avg)),
            ),
            Mode::Dual => {
                let memory_accuracy = memory.as_ref().map_or(0.0, MemoryResult::accuracy_pct);
                (
                    Some(((color_accuracy + memory_accuracy) / 2.0).round() as u32),
                    Some(stats::dual_score(color_accuracy, memory_accuracy, avg)),
                )
            }
        };

        Self {
            mode,
            difficulty: mode.uses_difficulty().then_some(difficulty),
            stats: stats::compute_stats(&samples),
            reaction_time_ms: avg.map_or(0, |a| a.round() as u64),
            correct_count,
            false_starts,
            accuracy_pct,
            score,
            memory,
            trials,
        }
    }

    /// Trials that were not disqualified by an early tap.
    pub fn valid_trials(&self) -> usize {
        self.trials.len() - self.false_starts
    }

    /// Record to persist, or `None` when nothing valid was played.
    pub fn record_draft(&self) -> Option<RecordDraft> {
        let valid = if self.mode.is_speed() {
            self.stats.is_some()
        } else {
            self.valid_trials() > 0
        };
        valid.then(|| RecordDraft {
            mode: self.mode,
            reaction_time_ms: self.reaction_time_ms,
            accuracy_pct: self.accuracy_pct,
            score: self.score,
        })
    }

    /// Trial breakdown for export or debugging.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize session summary")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{Color, Stimulus, TrialOutcome};

    fn speed_trial(index: usize, rt: Option<u64>) -> Trial {
        Trial {
            index,
            stimulus: Stimulus::Cue,
            outcome: if rt.is_some() {
                TrialOutcome::Correct
            } else {
                TrialOutcome::FalseStart
            },
            tapped: true,
            reaction_time_ms: rt,
        }
    }

    fn color_trial(index: usize, color: Color, tapped_after: Option<u64>) -> Trial {
        let (outcome, rt) = match (color.is_go(), tapped_after) {
            (true, Some(rt)) => (TrialOutcome::Correct, Some(rt)),
            (true, None) => (TrialOutcome::Timeout, None),
            (false, Some(_)) => (TrialOutcome::Incorrect, None),
            (false, None) => (TrialOutcome::Correct, None),
        };
        Trial {
            index,
            stimulus: Stimulus::Color { color, digit: None },
            outcome,
            tapped: tapped_after.is_some(),
            reaction_time_ms: rt,
        }
    }

    #[test]
    fn test_speed_summary_uses_valid_trials_only() {
        let trials = vec![
            speed_trial(0, Some(200)),
            speed_trial(1, None),
            speed_trial(2, Some(210)),
            speed_trial(3, Some(190)),
            speed_trial(4, None),
        ];
        let summary = SessionSummary::new(Mode::Simple, Difficulty::Hard, trials, None);
        assert_eq!(summary.reaction_time_ms, 200);
        assert_eq!(summary.false_starts, 2);
        assert_eq!(summary.difficulty, None);

        let draft = summary.record_draft().unwrap();
        assert_eq!(draft.mode, Mode::Simple);
        assert_eq!(draft.reaction_time_ms, 200);
        assert_eq!(draft.accuracy_pct, None);
        assert_eq!(draft.score, None);
    }

    #[test]
    fn test_all_false_starts_yield_no_record() {
        let trials = (0..5).map(|i| speed_trial(i, None)).collect();
        let summary = SessionSummary::new(Mode::Sprint, Difficulty::Easy, trials, None);
        assert_eq!(summary.stats, None);
        assert_eq!(summary.record_draft(), None);
    }

    #[test]
    fn test_color_summary_score() {
        let trials = vec![
            color_trial(0, Color::Green, Some(200)),
            color_trial(1, Color::Red, None),
            color_trial(2, Color::Green, Some(200)),
            color_trial(3, Color::Red, None),
        ];
        let summary = SessionSummary::new(Mode::Color, Difficulty::Easy, trials, None);
        assert_eq!(summary.accuracy_pct, Some(100));
        assert_eq!(summary.score, Some(80));
        assert_eq!(summary.reaction_time_ms, 200);
        assert_eq!(summary.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn test_color_summary_without_taps_still_recorded() {
        let trials = vec![
            color_trial(0, Color::Red, None),
            color_trial(1, Color::Green, None),
        ];
        let summary = SessionSummary::new(Mode::Color, Difficulty::Easy, trials, None);
        assert_eq!(summary.accuracy_pct, Some(50));
        assert_eq!(summary.score, Some(25));
        let draft = summary.record_draft().unwrap();
        assert_eq!(draft.reaction_time_ms, 0);
    }

    #[test]
    fn test_dual_summary_memory_weighting() {
        let trials = vec![
            color_trial(0, Color::Green, Some(250)),
            color_trial(1, Color::Red, Some(300)),
        ];
        let memory = MemoryResult {
            digits: vec![4, 7],
            true_sum: 11,
            recalled_sum: 11,
        };
        let summary = SessionSummary::new(
            Mode::Dual,
            Difficulty::Medium,
            trials.clone(),
            Some(memory.clone()),
        );
        // color 50% -> 25, memory 100% -> 30, speed 20 - 5 -> 15
        assert_eq!(summary.score, Some(70));
        assert_eq!(summary.accuracy_pct, Some(75));

        let wrong = MemoryResult {
            recalled_sum: 12,
            ..memory
        };
        let summary = SessionSummary::new(Mode::Dual, Difficulty::Medium, trials, Some(wrong));
        assert_eq!(summary.score, Some(40));
        assert_eq!(summary.accuracy_pct, Some(25));
    }

    #[test]
    fn test_summary_serializes_breakdown() {
        let trials = vec![speed_trial(0, Some(180))];
        let summary = SessionSummary::new(Mode::Simple, Difficulty::Easy, trials, None);
        let json = summary.to_json_pretty().unwrap();
        assert!(json.contains("\"reactionTimeMs\": 180"));
    }
}

use reflex_core::Mode;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::Record;

pub const RANKING_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeFilter {
    #[default]
    All,
    Only(Mode),
}

impl ModeFilter {
    pub fn matches(&self, mode: Mode) -> bool {
        match self {
            ModeFilter::All => true,
            ModeFilter::Only(m) => *m == mode,
        }
    }
}

impl fmt::Display for ModeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeFilter::All => f.write_str("all"),
            ModeFilter::Only(mode) => write!(f, "{mode}"),
        }
    }
}

impl FromStr for ModeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ModeFilter::All)
        } else {
            s.parse().map(ModeFilter::Only)
        }
    }
}

/// Leaderboard over stored records: fastest reaction first, capped at
/// `RANKING_SIZE`. Equal times keep their stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub filter: ModeFilter,
    entries: Vec<Record>,
}

impl Ranking {
    pub fn build(records: &[Record], filter: ModeFilter) -> Self {
        let mut entries: Vec<Record> = records
            .iter()
            .filter(|r| filter.matches(r.mode))
            .cloned()
            .collect();
        entries.sort_by_key(|r| r.reaction_time_ms);
        entries.truncate(RANKING_SIZE);
        Self { filter, entries }
    }

    /// `(rank, record)` pairs, rank counted from 1.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.entries.iter().enumerate().map(|(i, r)| (i + 1, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank of the user's best listed record, if any made the cut.
    pub fn user_rank(&self, user_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|r| r.user_id == user_id)
            .map(|i| i + 1)
    }

    pub fn user_best(&self, user_id: &str) -> Option<&Record> {
        self.entries.iter().find(|r| r.user_id == user_id)
    }

    pub fn participants(&self) -> usize {
        self.entries
            .iter()
            .map(|r| r.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn average_ms(&self) -> Option<u64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u64 = self.entries.iter().map(|r| r.reaction_time_ms).sum();
        Some((total as f64 / self.entries.len() as f64).round() as u64)
    }

    pub fn best_ms(&self) -> Option<u64> {
        self.entries.first().map(|r| r.reaction_time_ms)
    }
}

/// Medal for the podium, an ordinal for everyone else.
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => {
            let suffix = match (n % 10, n % 100) {
                (_, 11..=13) => "th",
                (1, _) => "st",
                (2, _) => "nd",
                (3, _) => "rd",
                _ => "th",
            };
            format!("{n}{suffix}")
        }
    }
}

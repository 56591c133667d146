use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    Stable,
    Normal,
    Unstable,
}

impl Consistency {
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev < 20.0 {
            Consistency::Stable
        } else if std_dev < 40.0 {
            Consistency::Normal
        } else {
            Consistency::Unstable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Consistency::Stable => "stable",
            Consistency::Normal => "normal",
            Consistency::Unstable => "unstable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStats {
    pub average: u64,
    pub fastest: u64,
    pub slowest: u64,
    pub std_dev: u64,
    pub consistency: Consistency,
}

pub fn mean(times: &[u64]) -> Option<f64> {
    if times.is_empty() {
        return None;
    }
    Some(times.iter().map(|&t| t as f64).sum::<f64>() / times.len() as f64)
}

/// Summary statistics of a set of reaction times, using the population
/// standard deviation. `None` for an empty set.
pub fn compute_stats(times: &[u64]) -> Option<ReactionStats> {
    let avg = mean(times)?;
    let fastest = *times.iter().min()?;
    let slowest = *times.iter().max()?;
    let variance = times
        .iter()
        .map(|&t| (t as f64 - avg).powi(2))
        .sum::<f64>()
        / times.len() as f64;
    let std_dev = variance.sqrt();

    Some(ReactionStats {
        average: avg.round() as u64,
        fastest,
        slowest,
        std_dev: std_dev.round() as u64,
        consistency: Consistency::from_std_dev(std_dev),
    })
}

/// Share of correct trials, 0-100. Zero when there were no trials.
pub fn accuracy_pct(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Color mode: accuracy is worth 50 points, speed up to 50 more. A session
/// with no timed correct tap earns nothing for speed.
pub fn color_score(accuracy_pct: f64, avg_reaction_ms: Option<f64>) -> u32 {
    let speed = avg_reaction_ms.map_or(0.0, |avg| (50.0 - avg / 10.0).max(0.0));
    (accuracy_pct / 100.0 * 50.0 + speed).round() as u32
}

/// Dual mode: color judgment 50, digit recall 30, speed up to 20.
pub fn dual_score(color_accuracy_pct: f64, memory_accuracy_pct: f64, avg_reaction_ms: Option<f64>) -> u32 {
    let color = color_accuracy_pct / 100.0 * 50.0;
    let memory = memory_accuracy_pct / 100.0 * 30.0;
    let speed = avg_reaction_ms.map_or(0.0, |avg| (20.0 - avg / 50.0).max(0.0));
    (color + memory + speed).round() as u32
}

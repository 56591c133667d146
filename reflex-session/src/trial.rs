use rand::Rng;
use reflex_core::{Color, Stimulus};

/// Trial in flight. Becomes a `reflex_core::Trial` once it is resolved.
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub index: usize,
    pub stimulus: Stimulus,
    pub durations: TrialDurations,
    pub timestamps: TrialTimestamps,
}

#[derive(Debug, Clone, Default)]
pub struct TrialDurations {
    /// Sprint "on your marks" hold before the set phase.
    pub ready_ms: Option<u64>,
    pub foreperiod_ms: u64,
    pub response_window_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrialTimestamps {
    pub onset: Option<u64>,
    pub response: Option<u64>,
}

impl ActiveTrial {
    /// Time from the go cue to the tap, once both have happened.
    pub fn reaction_time(&self) -> Option<u64> {
        let TrialTimestamps { onset, response } = self.timestamps;
        Some(response?.saturating_sub(onset?))
    }
}

/// Picks a color from `palette`, never green twice in a row.
pub fn draw_color<R: Rng>(rng: &mut R, palette: &[Color], previous: Option<Color>) -> Color {
    let candidates: Vec<Color> = match previous {
        Some(prev) if prev.is_go() => palette.iter().copied().filter(|c| !c.is_go()).collect(),
        _ => palette.to_vec(),
    };
    // A palette without a no-go color cannot honor the rule; fall back to it.
    let pool = if candidates.is_empty() {
        palette
    } else {
        &candidates[..]
    };
    pool[rng.random_range(0..pool.len())]
}

pub fn draw_digit<R: Rng>(rng: &mut R, chance: Option<f64>, range: (u8, u8)) -> Option<u8> {
    let chance = chance?;
    if rng.random_bool(chance.clamp(0.0, 1.0)) {
        Some(rng.random_range(range.0..=range.1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::palette;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use reflex_core::Difficulty;

    #[test]
    fn test_reaction_time_needs_onset_and_response() {
        let mut trial = ActiveTrial {
            index: 0,
            stimulus: Stimulus::Cue,
            durations: TrialDurations::default(),
            timestamps: TrialTimestamps::default(),
        };
        assert_eq!(trial.reaction_time(), None);
        trial.timestamps.response = Some(1_240);
        assert_eq!(trial.reaction_time(), None);
        trial.timestamps.onset = Some(1_000);
        assert_eq!(trial.reaction_time(), Some(240));
    }

    #[test]
    fn test_green_never_follows_green() {
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in Difficulty::all() {
            let colors = palette(difficulty);
            let mut previous = None;
            for _ in 0..2000 {
                let color = draw_color(&mut rng, &colors, previous);
                assert!(
                    !(color.is_go() && previous.is_some_and(|p: Color| p.is_go())),
                    "green repeated at {difficulty:?}"
                );
                assert!(colors.contains(&color));
                previous = Some(color);
            }
        }
    }

    #[test]
    fn test_every_palette_color_appears() {
        let mut rng = StdRng::seed_from_u64(11);
        let colors = palette(Difficulty::Hard);
        let mut seen = Vec::new();
        let mut previous = None;
        for _ in 0..500 {
            let color = draw_color(&mut rng, &colors, previous);
            if !seen.contains(&color) {
                seen.push(color);
            }
            previous = Some(color);
        }
        assert_eq!(seen.len(), colors.len());
    }

    #[test]
    fn test_digits_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut hits = 0;
        for _ in 0..1000 {
            if let Some(d) = draw_digit(&mut rng, Some(0.3), (1, 9)) {
                assert!((1..=9).contains(&d));
                hits += 1;
            }
        }
        // 30% of 1000 draws, with generous slack
        assert!((200..400).contains(&hits), "hits = {hits}");
        assert_eq!(draw_digit(&mut rng, None, (1, 9)), None);
    }
}

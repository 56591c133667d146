use reflex_core::{Color, Difficulty, Mode};

/// Lead-in before the first trial: `ticks` steps of `interval_ms` each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub ticks: u32,
    pub interval_ms: u64,
}

/// Timing for the pure-speed modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedRules {
    pub trials: usize,
    pub countdown: Countdown,
    /// Fixed "on your marks" hold before the random foreperiod (sprint).
    pub ready_ms: Option<u64>,
    pub foreperiod_range_ms: (u64, u64),
    /// Taps faster than this after the go cue count as false starts.
    pub min_valid_rt_ms: Option<u64>,
    pub false_start_cooldown_ms: u64,
    pub result_cooldown_ms: u64,
}

/// Timing and stimulus rules for the go/no-go color modes.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentRules {
    pub trials: usize,
    pub countdown: Countdown,
    pub palette: Vec<Color>,
    pub response_window_ms: u64,
    /// Chance per trial of attaching a digit to memorize.
    pub digit_chance: Option<f64>,
    pub digit_range: (u8, u8),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeRules {
    Speed(SpeedRules),
    Judgment(JudgmentRules),
}

impl ModeRules {
    pub fn for_mode(mode: Mode, difficulty: Difficulty) -> Self {
        let countdown = Countdown {
            ticks: 3,
            interval_ms: 1000,
        };
        match mode {
            Mode::Simple => ModeRules::Speed(SpeedRules {
                trials: 5,
                countdown,
                ready_ms: None,
                foreperiod_range_ms: (2000, 5000),
                min_valid_rt_ms: None,
                false_start_cooldown_ms: 2000,
                result_cooldown_ms: 2000,
            }),
            Mode::Sprint => ModeRules::Speed(SpeedRules {
                trials: 5,
                countdown: Countdown {
                    ticks: 1,
                    interval_ms: 2000,
                },
                ready_ms: Some(1500),
                foreperiod_range_ms: (1000, 3000),
                min_valid_rt_ms: Some(100),
                false_start_cooldown_ms: 2500,
                result_cooldown_ms: 2000,
            }),
            Mode::Color => ModeRules::Judgment(JudgmentRules {
                trials: 20,
                countdown,
                palette: palette(difficulty),
                response_window_ms: 3000,
                digit_chance: None,
                digit_range: (1, 9),
            }),
            Mode::Dual => ModeRules::Judgment(JudgmentRules {
                trials: match difficulty {
                    Difficulty::Easy => 15,
                    Difficulty::Medium => 20,
                    Difficulty::Hard => 25,
                },
                countdown,
                palette: palette(difficulty),
                response_window_ms: 3000,
                digit_chance: Some(0.3),
                digit_range: (1, 9),
            }),
        }
    }

    pub fn trials(&self) -> usize {
        match self {
            ModeRules::Speed(rules) => rules.trials,
            ModeRules::Judgment(rules) => rules.trials,
        }
    }

    pub fn countdown(&self) -> &Countdown {
        match self {
            ModeRules::Speed(rules) => &rules.countdown,
            ModeRules::Judgment(rules) => &rules.countdown,
        }
    }
}

/// Colors available at a difficulty. Green is always present, and always
/// alongside at least one color that must not be tapped.
pub fn palette(difficulty: Difficulty) -> Vec<Color> {
    let mut colors = vec![Color::Green, Color::Red];
    if matches!(difficulty, Difficulty::Medium | Difficulty::Hard) {
        colors.push(Color::Blue);
    }
    if difficulty == Difficulty::Hard {
        colors.push(Color::Yellow);
    }
    colors
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub rules: ModeRules,
}

impl SessionConfig {
    pub fn new(mode: Mode, difficulty: Difficulty) -> Self {
        Self {
            mode,
            difficulty,
            rules: ModeRules::for_mode(mode, difficulty),
        }
    }
}

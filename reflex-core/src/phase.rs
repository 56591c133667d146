/// Session phases. Not every mode visits every phase:
///
/// * simple: `Intro -> Countdown -> Waiting -> Go -> Result -> ... -> Complete`
/// * sprint: `Intro -> Countdown -> Ready -> Set -> Go -> Result -> ... -> Complete`
/// * color:  `Intro -> Countdown -> Playing -> ... -> Complete`
/// * dual:   `Intro -> Countdown -> Playing -> ... -> NumberEntry -> Complete`
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Intro,
    /// Lead-in before the first trial; `remaining` counts down the ticks.
    Countdown { remaining: u32 },
    /// Sprint "on your marks".
    Ready,
    /// Sprint "set"; the gun fires after a random hold.
    Set,
    /// Simple-mode foreperiod before the go cue.
    Waiting,
    /// Go cue is showing; the next tap is timed.
    Go,
    /// Cooldown after a speed trial.
    Result(ResultKind),
    /// Color/dual stimulus is showing with its response window open.
    Playing,
    /// Dual-mode recall of the memorized digit sum.
    NumberEntry,
    Complete,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    Valid,
    FalseStart,
}

impl Phase {
    pub fn accepts_tap(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Set | Self::Waiting | Self::Go | Self::Playing
        )
    }

    /// Taps here land before the go cue.
    pub fn is_false_start_window(&self) -> bool {
        matches!(self, Self::Ready | Self::Set | Self::Waiting)
    }

    pub fn is_running(&self) -> bool {
        !matches!(self, Self::Intro | Self::Complete)
    }
}

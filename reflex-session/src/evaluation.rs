//! Qualitative feedback for a session result.
//!
//! Every function here is total: any input, including negative or very
//! large values, lands in exactly one tier.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub emoji: &'static str,
    pub label: &'static str,
    pub message: &'static str,
    /// What the result means for a sprint start.
    pub sprint_impact: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTier {
    Superhuman,
    Excellent,
    Good,
    Practicing,
    Beginner,
}

impl ReactionTier {
    pub fn from_reaction_ms(reaction_ms: f64) -> Self {
        if reaction_ms <= 150.0 {
            ReactionTier::Superhuman
        } else if reaction_ms <= 200.0 {
            ReactionTier::Excellent
        } else if reaction_ms <= 250.0 {
            ReactionTier::Good
        } else if reaction_ms <= 300.0 {
            ReactionTier::Practicing
        } else {
            ReactionTier::Beginner
        }
    }

    pub fn evaluation(&self) -> Evaluation {
        match self {
            ReactionTier::Superhuman => Evaluation {
                emoji: "⚡",
                label: "Superhuman!",
                message: "Reaction speed at Olympic level!",
                sprint_impact: "A big advantage out of the blocks!",
            },
            ReactionTier::Excellent => Evaluation {
                emoji: "🔥",
                label: "Excellent!",
                message: "You react like a top athlete!",
                sprint_impact: "An ideal start reaction time",
            },
            ReactionTier::Good => Evaluation {
                emoji: "👍",
                label: "Good!",
                message: "Solid reaction speed. Keep it up!",
                sprint_impact: "A little more polish is worth another 0.1 seconds",
            },
            ReactionTier::Practicing => Evaluation {
                emoji: "💪",
                label: "Practicing!",
                message: "Practice will make you faster!",
                sprint_impact: "Cutting 0.05 seconds of reaction speeds up a 50m dash",
            },
            ReactionTier::Beginner => Evaluation {
                emoji: "🌱",
                label: "Just starting!",
                message: "First, sharpen your focus!",
                sprint_impact: "Relax and keep practicing",
            },
        }
    }
}

pub fn classify(reaction_ms: f64) -> Evaluation {
    ReactionTier::from_reaction_ms(reaction_ms).evaluation()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Master,
    Balanced,
    Growing,
    Challenger,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreTier::Master
        } else if score >= 60.0 {
            ScoreTier::Balanced
        } else if score >= 40.0 {
            ScoreTier::Growing
        } else {
            ScoreTier::Challenger
        }
    }

    pub fn evaluation(&self) -> Evaluation {
        match self {
            ScoreTier::Master => Evaluation {
                emoji: "🧠",
                label: "Multitask master!",
                message: "Perfect judgment even under load!",
                sprint_impact: "Stays calm and decisive when the race gets complicated",
            },
            ScoreTier::Balanced => Evaluation {
                emoji: "🎯",
                label: "Well balanced!",
                message: "You handle both tasks nicely!",
                sprint_impact: "Can keep cadence and form in mind together",
            },
            ScoreTier::Growing => Evaluation {
                emoji: "💪",
                label: "Growing!",
                message: "Let's train that multitasking!",
                sprint_impact: "One thing at a time, then put them together",
            },
            ScoreTier::Challenger => Evaluation {
                emoji: "🌱",
                label: "Challenger!",
                message: "Steady practice will pay off!",
                sprint_impact: "Get comfortable with single tasks first",
            },
        }
    }
}

pub fn classify_composite_score(score: f64) -> Evaluation {
    ScoreTier::from_score(score).evaluation()
}

/// Seconds a reaction costs at the start, and how much of it is above the
/// 150ms ideal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SprintImpact {
    pub start_advantage_s: f64,
    pub improvement_potential_s: f64,
}

const IDEAL_REACTION_MS: f64 = 150.0;

pub fn sprint_impact(reaction_ms: f64) -> SprintImpact {
    let round3 = |v: f64| (v * 1000.0).round() / 1000.0;
    SprintImpact {
        start_advantage_s: round3(reaction_ms / 1000.0),
        improvement_potential_s: round3(((reaction_ms - IDEAL_REACTION_MS) / 1000.0).max(0.0)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccuracyVerdict {
    pub emoji: &'static str,
    pub message: &'static str,
}

/// Headline for color-judgment results.
pub fn accuracy_verdict(accuracy_pct: f64) -> AccuracyVerdict {
    if accuracy_pct >= 90.0 {
        AccuracyVerdict {
            emoji: "🏆",
            message: "Perfect!",
        }
    } else if accuracy_pct >= 70.0 {
        AccuracyVerdict {
            emoji: "🎉",
            message: "Great job!",
        }
    } else {
        AccuracyVerdict {
            emoji: "💪",
            message: "Keep practicing!",
        }
    }
}

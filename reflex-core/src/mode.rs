use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game mode. Serialized lowercase, matching the stored record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simple,
    Sprint,
    Color,
    Dual,
}

impl Mode {
    pub fn all() -> [Mode; 4] {
        [Mode::Simple, Mode::Color, Mode::Sprint, Mode::Dual]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Sprint => "sprint",
            Mode::Color => "color",
            Mode::Dual => "dual",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Simple => "Simple Reaction",
            Mode::Sprint => "Sprint Start",
            Mode::Color => "Color Judgment",
            Mode::Dual => "Dual Task",
        }
    }

    /// Pure-speed modes score every non-false-start tap; the others judge
    /// whether the tap should have happened at all.
    pub fn is_speed(&self) -> bool {
        matches!(self, Mode::Simple | Mode::Sprint)
    }

    pub fn uses_difficulty(&self) -> bool {
        !self.is_speed()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Mode::Simple),
            "sprint" => Ok(Mode::Sprint),
            "color" => Ok(Mode::Color),
            "dual" => Ok(Mode::Dual),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Blue,
    Yellow,
}

impl Color {
    /// Green is the only color that asks for a tap.
    pub fn is_go(&self) -> bool {
        matches!(self, Color::Green)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
        }
    }

    /// RGBA swatch used by front ends.
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            Color::Green => [34, 197, 94, 255],
            Color::Red => [239, 68, 68, 255],
            Color::Blue => [59, 130, 246, 255],
            Color::Yellow => [250, 204, 21, 255],
        }
    }
}

/// What the player reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Stimulus {
    /// Plain go cue of the speed modes.
    Cue,
    Color {
        color: Color,
        /// Dual-mode digit to memorize, shown alongside the color.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        digit: Option<u8>,
    },
}

impl Stimulus {
    pub fn requires_tap(&self) -> bool {
        match self {
            Stimulus::Cue => true,
            Stimulus::Color { color, .. } => color.is_go(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Stimulus::Cue => None,
            Stimulus::Color { color, .. } => Some(*color),
        }
    }

    pub fn digit(&self) -> Option<u8> {
        match self {
            Stimulus::Cue => None,
            Stimulus::Color { digit, .. } => *digit,
        }
    }
}

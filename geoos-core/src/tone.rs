//! Tone evaluation for metric deltas and gaps
//!
//! Global invariants enforced:
//! - Total over all reals (NaN is treated as no change)
//! - Zero is always neutral, in both directions
//! - The arrow follows the sign of the value, the tone follows the direction

use serde::{Deserialize, Serialize};

/// Direction of improvement for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherBetter => "higherBetter",
            Direction::LowerBetter => "lowerBetter",
        }
    }
}

/// Good/bad/neutral classification of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Bad,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Good => "good",
            Tone::Bad => "bad",
            Tone::Neutral => "neutral",
        }
    }
}

/// Arrow indicator shown next to a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Up,
    Down,
    None,
}

impl Arrow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arrow::Up => "up",
            Arrow::Down => "down",
            Arrow::None => "none",
        }
    }

    /// Single-character glyph used in text tables
    pub fn glyph(&self) -> &'static str {
        match self {
            Arrow::Up => "▲",
            Arrow::Down => "▼",
            Arrow::None => "·",
        }
    }
}

/// Result of classifying a signed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneEvaluation {
    pub tone: Tone,
    pub arrow: Arrow,
}

impl ToneEvaluation {
    pub const NEUTRAL: ToneEvaluation = ToneEvaluation {
        tone: Tone::Neutral,
        arrow: Arrow::None,
    };
}

/// Classify a signed delta or gap
///
/// - 0 (or NaN) -> neutral, no arrow
/// - higherBetter: positive is good/up, negative is bad/down
/// - lowerBetter: negative is good/down, positive is bad/up
pub fn evaluate(value: f64, direction: Direction) -> ToneEvaluation {
    evaluate_with_band(value, direction, 0.0)
}

/// Classify a signed value, treating `|value| <= band` as neutral
///
/// A band of 0.0 is identical to [`evaluate`].
pub fn evaluate_with_band(value: f64, direction: Direction, band: f64) -> ToneEvaluation {
    if value.is_nan() || value.abs() <= band {
        return ToneEvaluation::NEUTRAL;
    }

    let arrow = if value > 0.0 { Arrow::Up } else { Arrow::Down };
    let improved = match direction {
        Direction::HigherBetter => value > 0.0,
        Direction::LowerBetter => value < 0.0,
    };
    let tone = if improved { Tone::Good } else { Tone::Bad };

    ToneEvaluation { tone, arrow }
}

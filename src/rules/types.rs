//! Rule types

use serde::{Deserialize, Serialize};

/// Default colours offered to the user, cycled after every added rule
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4285F4", "#34A853", "#EA4335", "#FBBC05", "#9B72F2", "#00BCD4", "#FF6B6B", "#4ECDC4",
];

/// A highlight rule as sent to the matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRule {
    /// CSS hex colour, e.g. `#4285F4`
    pub color: String,
    /// Free-text description of what to highlight
    pub description: String,
}

impl HighlightRule {
    pub fn new(color: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            description: description.into(),
        }
    }
}

/// Colour palette with wrap-around cycling
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColorPalette {
    pub fn first(&self) -> &str {
        &self.colors[0]
    }

    /// Colour following `current`; an unknown colour restarts at the first entry
    pub fn next_after(&self, current: &str) -> &str {
        let next = self
            .colors
            .iter()
            .position(|c| c.eq_ignore_ascii_case(current))
            .map(|i| (i + 1) % self.colors.len())
            .unwrap_or(0);
        &self.colors[next]
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

/// Rule store errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Rule description must not be empty")]
    EmptyDescription,

    #[error("Invalid colour: {0} (expected #RRGGBB or #RGB)")]
    InvalidColor(String),

    #[error("Rule index {index} out of range ({len} rules)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Validate a hex colour and return it trimmed
pub fn normalize_color(color: &str) -> Result<String, RuleError> {
    let trimmed = color.trim();
    let valid = trimmed
        .strip_prefix('#')
        .map(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(RuleError::InvalidColor(color.to_string()))
    }
}

//! Discrete fill tier reported by the LEDs and the status API.

use serde::Serialize;
use smartbin_traits::Led;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusTier {
    #[serde(rename = "OK")]
    Normal,
    #[serde(rename = "WARNING")]
    Warning,
    #[serde(rename = "FULL")]
    Full,
}

impl StatusTier {
    /// `Full` at or above `full`, `Warning` at or above `half`, else `Normal`.
    pub fn classify(fill_pct: f64, half: f64, full: f64) -> Self {
        if fill_pct >= full {
            StatusTier::Full
        } else if fill_pct >= half {
            StatusTier::Warning
        } else {
            StatusTier::Normal
        }
    }

    pub fn led(self) -> Led {
        match self {
            StatusTier::Normal => Led::Green,
            StatusTier::Warning => Led::Yellow,
            StatusTier::Full => Led::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusTier::Normal => "OK",
            StatusTier::Warning => "WARNING",
            StatusTier::Full => "FULL",
        }
    }
}

impl std::fmt::Display for StatusTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Context assembly modes.

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Preset trading context size for latency.
///
/// `Fast` keeps the prompt tiny and skips search; `Precise` searches both
/// memory tiers and includes canonical digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// Minimal context, recency only.
    #[default]
    Fast,
    /// Search-backed context with digests.
    Precise,
}

impl ContextMode {
    /// Returns the mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Precise => "precise",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "precise" => Ok(Self::Precise),
            other => Err(Error::InvalidInput(format!("unknown context mode: {other}"))),
        }
    }
}

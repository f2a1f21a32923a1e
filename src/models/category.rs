//! Memory categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory category a stored item is filed under.
///
/// Each category maps to one subdirectory of the memory root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Facts about who the user is.
    Identity,
    /// Recent, conversational context.
    ShortTerm,
    /// Durable knowledge worth keeping.
    LongTerm,
    /// Items whose classification failed.
    Unclassified,
}

impl Category {
    /// Returns every category, in directory scan order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Identity,
            Self::ShortTerm,
            Self::LongTerm,
            Self::Unclassified,
        ]
    }

    /// Returns the categories a classifier may assign.
    ///
    /// `Unclassified` is only ever forced by the pipeline.
    #[must_use]
    pub const fn assignable() -> &'static [Self] {
        &[Self::Identity, Self::ShortTerm, Self::LongTerm]
    }

    /// Returns the category as its on-disk name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
            Self::Unclassified => "unclassified",
        }
    }

    /// Returns true if a classifier may assign this category.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        !matches!(self, Self::Unclassified)
    }

    /// Parses a category from its on-disk name.
    ///
    /// Accepts the dashed spellings used on the command line.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "identity" => Some(Self::Identity),
            "short_term" | "short-term" | "shortterm" => Some(Self::ShortTerm),
            "long_term" | "long-term" | "longterm" => Some(Self::LongTerm),
            "unclassified" => Some(Self::Unclassified),
            _ => None,
        }
    }

    /// Parses a category a classifier is allowed to return.
    #[must_use]
    pub fn parse_assignable(s: &str) -> Option<Self> {
        Self::parse(s).filter(Self::is_assignable)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::InvalidInput(format!("unknown category: {s}")))
    }
}

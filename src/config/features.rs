//! Feature flags for optional functionality.

/// Feature flags for the optional, backend-assisted parts of the engine.
///
/// Every flag can be turned off to get a fully deterministic pipeline that
/// never contacts the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Ask the backend to split documents before falling back to markers.
    pub llm_splitter: bool,
    /// Ask the backend to classify segments the heuristic does not match.
    pub llm_classifier: bool,
    /// Include canonical digests in assembled context.
    pub canonical: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl FeatureFlags {
    /// Creates feature flags with all features disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            llm_splitter: false,
            llm_classifier: false,
            canonical: false,
        }
    }

    /// Creates feature flags with all features enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            llm_splitter: true,
            llm_classifier: true,
            canonical: true,
        }
    }

    /// Returns true if any feature needs the generation backend.
    #[must_use]
    pub const fn uses_backend(&self) -> bool {
        self.llm_splitter || self.llm_classifier
    }
}

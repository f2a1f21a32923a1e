//! Security features.
//!
//! Memory is untrusted input to the generator: every read path strips lines
//! that look like prompt-injection attempts before the text is indexed,
//! summarized or placed in context.

mod injection;
mod normalize;

pub use injection::{InjectionFilter, sanitize};
pub use normalize::fold_diacritics;

//! # Retry delay policies.
//!
//! - [`BackoffPolicy`] - how retry delays grow with the attempt ordinal
//! - [`JitterPolicy`] - how delays are randomized to spread load

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;

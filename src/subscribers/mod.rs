//! # Event subscribers for scheduler observability.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver lifecycle events to user code (logging,
//! metrics, alerting).
//!
//! ## Architecture
//! ```text
//! Workers / facade ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                       ┌─────────┼─────────┐
//!                                                       ▼         ▼         ▼
//!                                                  [queue S1] [queue S2] [queue SN]
//!                                                       │         │         │
//!                                                  worker S1  worker S2  worker SN
//!                                                       │         │         │
//!                                                  s1.on_event  s2.on_event ...
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;

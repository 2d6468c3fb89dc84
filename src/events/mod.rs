//! # Lifecycle events broadcast by the scheduler.
//!
//! - [`Bus`] - broadcast channel shared by the facade and the workers
//! - [`Event`] / [`EventKind`] - classified events with optional metadata

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

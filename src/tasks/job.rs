//! # Job abstraction.
//!
//! A [`Job`] is an asynchronous, cancelable unit of work. It has a stable
//! [`name`](Job::name) and an async [`run`](Job::run) method that receives
//! a [`CancellationToken`] and may return an optional string payload.
//!
//! Cancellation is cooperative: implementations should check the token at
//! safe points and exit promptly when it is cancelled. The scheduler never
//! forcibly kills a job outside of its configured timeout.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;

/// # Asynchronous, cancelable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{Job, TaskError};
///
/// struct HealthCheck;
///
/// #[async_trait]
/// impl Job for HealthCheck {
///     fn name(&self) -> &str { "health-check" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<Option<String>, TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // probe something...
///         Ok(Some("healthy".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable job name.
    fn name(&self) -> &str;

    /// Executes one attempt until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` at safe points and
    /// return [`TaskError::Canceled`] to acknowledge a cancellation request.
    /// Returning `Ok` carries an optional result payload that is stored in
    /// the task record.
    async fn run(&self, ctx: CancellationToken) -> Result<Option<String>, TaskError>;
}

//! # Function-backed job (`JobFn`)
//!
//! [`JobFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per attempt. Each retry therefore starts from a clean
//! state; if shared state between attempts is needed, capture an
//! `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use taskpool::{JobFn, JobRef, TaskError};
//!
//! let job: JobRef = JobFn::arc("cleanup", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(TaskError::Canceled);
//!     }
//!     // do work...
//!     Ok(None)
//! });
//!
//! assert_eq!(job.name(), "cleanup");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::job::Job;

/// Function-backed job implementation.
///
/// Wraps a closure that *creates* a new future per attempt.
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`](crate::JobRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Option<String>, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<Option<String>, TaskError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_runs_and_returns_payload() {
        let job = JobFn::arc("echo", |_ctx: CancellationToken| async move {
            Ok(Some("pong".to_string()))
        });

        assert_eq!(job.name(), "echo");
        let out = job.run(CancellationToken::new()).await.unwrap();
        assert_eq!(out.as_deref(), Some("pong"));
    }
}

//! # Demo: retry_backoff
//!
//! Demonstrates how the scheduler retries failed attempts according to
//! [`BackoffPolicy`], with a [`LogWriter`] subscriber printing every
//! lifecycle event.
//!
//! The job fails twice before succeeding, so the output shows the growing
//! delays between attempts.
//!
//! ## Run
//! ```bash
//! cargo run --example retry_backoff --features logging
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskpool::{
    BackoffPolicy, JitterPolicy, JobFn, LogWriter, Scheduler, SchedulerConfig, TaskError, TaskSpec,
};
use tokio_util::sync::CancellationToken;

static ATTEMPTS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configure the pool: exponential backoff, 200ms base
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 1;
    cfg.backoff = BackoffPolicy {
        base: Duration::from_millis(200),
        cap: Duration::from_secs(2),
        factor: 2.0,
        jitter: JitterPolicy::Equal,
    };

    // 2. Attach the stdout writer so every event is visible
    let pool = Scheduler::builder(cfg)
        .with_subscriber(Arc::new(LogWriter))
        .build();
    pool.start().await?;

    // 3. A job that fails twice before succeeding
    let flaky = JobFn::arc("flaky", |_ctx: CancellationToken| async move {
        let n = ATTEMPTS.fetch_add(1, Ordering::Relaxed) + 1;
        if n <= 2 {
            println!("[flaky] simulated failure #{n}");
            Err(TaskError::Fail {
                reason: format!("boom #{n}"),
            })
        } else {
            println!("[flaky] success on attempt {n}");
            Ok(Some("recovered".to_string()))
        }
    });

    // 4. Submit with a retry budget covering both failures
    let id = pool.submit(flaky, TaskSpec::default().with_max_retries(3))?;

    loop {
        match pool.get_task_status(id) {
            Some(status) if status.is_terminal() => break,
            _ => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    }

    let snap = pool.get_task(id).expect("task registered");
    println!("[main] final: {:?}, retries: {}", snap.status, snap.retry_count);

    pool.stop().await?;
    Ok(())
}

//! # Demo: cancel
//!
//! Shows both cancellation paths:
//! - a pending task is removed from the queue before it ever runs;
//! - a running task observes its cancellation token and stops cooperatively.
//!
//! ## Run
//! ```bash
//! cargo run --example cancel
//! ```

use std::time::Duration;

use taskpool::{JobFn, Scheduler, SchedulerConfig, TaskError, TaskSpec, TaskStatus};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 1;
    let pool = Scheduler::builder(cfg).build();

    // Cancel while pending: the scheduler is not started yet, so the job
    // cannot have been claimed.
    let parked = pool.submit(
        JobFn::arc("parked", |_ctx: CancellationToken| async {
            println!("[parked] this line never prints");
            Ok(None)
        }),
        TaskSpec::default(),
    )?;
    assert!(pool.cancel_task(parked));
    println!(
        "[main] parked task -> {:?}",
        pool.get_task_status(parked).unwrap()
    );

    pool.start().await?;

    // Cancel while running: the job polls its token and acknowledges.
    let spinner = pool.submit(
        JobFn::arc("spinner", |ctx: CancellationToken| async move {
            loop {
                if ctx.is_cancelled() {
                    println!("[spinner] observed cancellation, stopping");
                    return Err(TaskError::Canceled);
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }),
        TaskSpec::default(),
    )?;

    // Give the worker a moment to claim it, then request cancellation.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(pool.cancel_task(spinner));

    loop {
        match pool.get_task_status(spinner) {
            Some(status) if status.is_terminal() => {
                assert_eq!(status, TaskStatus::Cancelled);
                println!("[main] spinner task -> {status:?}");
                break;
            }
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }

    pool.stop().await?;
    Ok(())
}

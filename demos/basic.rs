//! # Demo: basic
//!
//! Submits a few jobs at different priorities, waits for them to finish,
//! and prints the aggregate counters.
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::time::Duration;

use taskpool::{JobFn, Priority, Scheduler, SchedulerConfig, TaskSpec};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configure the pool: two workers, no queue bound
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 2;

    // 2. Build and start the scheduler
    let pool = Scheduler::builder(cfg.clone()).build();
    pool.start().await?;

    // 3. Submit one job per priority class
    let mut ids = Vec::new();
    for (name, priority) in [
        ("report", Priority::Low),
        ("ingest", Priority::Normal),
        ("alert", Priority::High),
    ] {
        let job = JobFn::arc(name, move |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(taskpool::TaskError::Canceled);
            }
            println!("[{name}] running");
            Ok(Some(format!("{name} finished")))
        });
        let id = pool.submit(job, TaskSpec::with_defaults(&cfg).with_priority(priority))?;
        ids.push(id);
    }

    // 4. Wait until every task reaches a terminal state
    for id in ids {
        loop {
            match pool.get_task_status(id) {
                Some(status) if status.is_terminal() => break,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        let snap = pool.get_task(id).expect("task registered");
        println!(
            "[main] {} -> {:?} ({:?})",
            snap.name,
            snap.status,
            snap.result.and_then(|r| r.data)
        );
    }

    // 5. Print the counters and shut down
    let stats = pool.get_stats();
    println!(
        "[main] submitted={} completed={} queue={}",
        stats.submitted, stats.completed, stats.queue_size
    );
    pool.stop().await?;
    Ok(())
}

//! Simulated workloads for the CLI.
//!
//! Even-numbered tasks stream progress text, odd ones run as a single
//! future. Every `fail_every`-th task retries once and then fails with an
//! error chain.

use std::io;
use std::time::Duration;

use futures::future::join_all;
use futures::{stream, Stream, StreamExt};
use multispin_core::SpinnerOptions;
use multispin_runtime::{SpinnerHandle, Spinners, TaskFailure, TaskOutcome};
use serde_json::json;

use crate::settings::Settings;

const STEP: Duration = Duration::from_millis(350);
const PROGRESS_STEPS: u32 = 5;

/// What the demo runs.
#[derive(Debug, Clone)]
pub struct DemoPlan {
    pub tasks: u32,
    pub fail_every: u32,
    pub step: Duration,
}

impl DemoPlan {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tasks: settings.tasks,
            fail_every: settings.fail_every,
            step: STEP,
        }
    }

    fn fails(&self, index: u32) -> bool {
        self.fail_every > 0 && (index + 1) % self.fail_every == 0
    }
}

/// Run every task of `plan` to completion.
pub async fn run(spinners: &Spinners, plan: &DemoPlan) -> anyhow::Result<()> {
    spinners.configure_status_value(
        "retry",
        &json!({
            "prefix": "↻",
            "prefixColor": "yellow",
            "textColor": "yellow",
            "isDone": false,
            "aliases": ["retrying"],
        }),
    )?;

    let mut jobs = Vec::with_capacity(plan.tasks as usize);
    for index in 0..plan.tasks {
        let name = format!("task-{}", index + 1);
        let handle = spinners.add(&name, SpinnerOptions::new().text(format!("{name}: queued")))?;
        let fails = plan.fails(index);
        // Staggered so the block settles in a visible order.
        let pace = plan.step * (index + 1);

        let job = if index % 2 == 0 {
            handle.bind_stream(progress(name, pace, fails))
        } else {
            handle.bind_future(single_shot(handle.clone(), pace, fails))
        };
        jobs.push(job);
    }

    for job in join_all(jobs).await {
        job?;
    }

    // An animated set is cleared once it finishes.
    let failed = (0..plan.tasks).filter(|index| plan.fails(*index)).count();
    tracing::info!(tasks = plan.tasks, failed, "demo finished");
    spinners.add_log(format!(
        "{} task(s) finished, {failed} failed",
        plan.tasks
    ));
    Ok(())
}

fn progress(
    name: String,
    pace: Duration,
    fails: bool,
) -> impl Stream<Item = Result<String, TaskFailure>> + Send + 'static {
    let tick = pace / PROGRESS_STEPS;
    stream::iter(1..=PROGRESS_STEPS).then(move |step| {
        let name = name.clone();
        async move {
            tokio::time::sleep(tick).await;
            if fails && step == PROGRESS_STEPS {
                return Err(TaskFailure::Message(format!("{name}: checksum mismatch")));
            }
            Ok(format!("{name}: {}%", step * 100 / PROGRESS_STEPS))
        }
    })
}

async fn single_shot(handle: SpinnerHandle, pace: Duration, fails: bool) -> TaskOutcome {
    tokio::time::sleep(pace / 2).await;
    if !fails {
        tokio::time::sleep(pace / 2).await;
        return Ok(Some(format!("{}: done", handle.name())));
    }

    if let Err(err) = handle.call(
        "retrying",
        SpinnerOptions::new().text(format!("{}: retrying", handle.name())),
    ) {
        tracing::debug!(name = handle.name(), error = %err, "retry update dropped");
    }
    tokio::time::sleep(pace / 2).await;

    let err = anyhow::Error::new(io::Error::new(
        io::ErrorKind::TimedOut,
        "upstream did not answer",
    ))
    .context(format!("{}: request failed", handle.name()));
    Err(TaskFailure::from_error(err.as_ref()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use multispin_core::layout::plain_text;
    use multispin_core::SpinnersConfig;
    use multispin_term::MemoryStream;

    fn quick(tasks: u32, fail_every: u32) -> DemoPlan {
        DemoPlan {
            tasks,
            fail_every,
            step: Duration::from_millis(5),
        }
    }

    fn plain_spinners() -> Spinners {
        let stream = MemoryStream::new(80).interactive(false);
        Spinners::with_stream(SpinnersConfig::for_terminal(true), stream)
    }

    #[test]
    fn test_fail_every() {
        let plan = quick(6, 3);
        let failing: Vec<u32> = (0..6).filter(|i| plan.fails(*i)).collect();
        assert_eq!(failing, vec![2, 5]);
        assert!(!(0..6).any(|i| quick(6, 0).fails(i)));
    }

    #[tokio::test]
    async fn test_run_settles_every_task() {
        let spinners = plain_spinners();
        run(&spinners, &quick(4, 2)).await.expect("demo runs");

        let statuses: Vec<String> = spinners
            .names()
            .iter()
            .map(|name| spinners.pick(name).expect("spinner").status)
            .collect();
        assert_eq!(statuses, vec!["success", "fail", "success", "fail"]);
        assert!(!spinners.has_active_spinners());
        assert_eq!(spinners.logs(), vec!["4 task(s) finished, 2 failed".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_future_carries_error_chain() {
        let spinners = plain_spinners();
        run(&spinners, &quick(2, 2)).await.expect("demo runs");

        let failed = spinners.pick("task-2").expect("spinner");
        assert_eq!(
            plain_text(&failed.text),
            "task-2: request failed\ncaused by: upstream did not answer"
        );
    }

    #[tokio::test]
    async fn test_streamed_failure_uses_message() {
        let spinners = plain_spinners();
        run(&spinners, &quick(1, 1)).await.expect("demo runs");

        let failed = spinners.pick("task-1").expect("spinner");
        assert_eq!(failed.status, "fail");
        assert_eq!(failed.text, "task-1: checksum mismatch");
    }

    #[tokio::test]
    async fn test_retry_status_keeps_spinner_active() {
        let spinners = plain_spinners();
        run(&spinners, &quick(1, 0)).await.expect("demo runs");

        spinners
            .add("again", SpinnerOptions::new().status("retrying"))
            .expect("add");
        assert!(spinners.has_active_spinners());
    }
}

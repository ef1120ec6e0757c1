//! Binding async work to a spinner.
//!
//! A bound future settles the spinner into `success` or `fail` when it
//! resolves. A bound stream updates the text on every item and settles the
//! same way when it ends or errors.

use std::error::Error;
use std::fmt;
use std::future::Future;

use futures::{pin_mut, Stream, StreamExt};
use multispin_core::{Color, ColorChoice, SpinnerOptions, StatusRegistry};
use multispin_term::paint;
use tokio::task::JoinHandle;

use crate::orchestrator::SpinnerHandle;
use crate::spinner::Spinner;

/// Why a bound task failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// A plain message, shown as the spinner text.
    Message(String),
    /// An error with a message and a trace (its cause chain).
    Error { message: String, trace: String },
    /// A failure with nothing to show.
    Opaque,
}

impl TaskFailure {
    /// Capture `err` and its source chain.
    ///
    /// An error without sources becomes a [`TaskFailure::Message`].
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let message = err.to_string();
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        if causes.is_empty() {
            TaskFailure::Message(message)
        } else {
            TaskFailure::Error {
                message,
                trace: causes.join("\n"),
            }
        }
    }
}

impl From<String> for TaskFailure {
    fn from(message: String) -> Self {
        TaskFailure::Message(message)
    }
}

impl From<&str> for TaskFailure {
    fn from(message: &str) -> Self {
        TaskFailure::Message(message.to_string())
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Message(message) => f.write_str(message),
            TaskFailure::Error { message, trace } => write!(f, "{message}\n{trace}"),
            TaskFailure::Opaque => f.write_str("task failed"),
        }
    }
}

/// What a bound future resolves to: optional success text, or a failure.
pub type TaskOutcome = Result<Option<String>, TaskFailure>;

// ── settling ──────────────────────────────────────────────────────────────────

/// Move `spinner` into `success` or `fail` according to `outcome`.
pub(crate) fn settle(spinner: &mut Spinner, outcome: TaskOutcome, registry: &StatusRegistry) {
    match outcome {
        Ok(Some(text)) if !text.is_empty() => {
            spinner.update(SpinnerOptions::new().status("success").text(text));
        }
        Ok(_) => spinner.status("success"),
        Err(TaskFailure::Message(message)) => {
            spinner.update(SpinnerOptions::new().status("fail").text(message));
        }
        Err(TaskFailure::Error { message, trace }) => {
            let color = spinner.get_status("fail", registry).text_color;
            let text = format!("{}\n{}", paint(&message, color), paint(&trace, Some(Color::Gray)));
            // The text carries its own colors.
            spinner.override_mut("fail").text_color = Some(ColorChoice::Disabled);
            spinner.update(SpinnerOptions::new().status("fail").text(text));
        }
        Err(TaskFailure::Opaque) => spinner.status("fail"),
    }
}

// ── binding ───────────────────────────────────────────────────────────────────

/// Run `task` on the tokio runtime and settle `handle` with its outcome.
pub fn bind_future<F>(handle: SpinnerHandle, task: F) -> JoinHandle<()>
where
    F: Future<Output = TaskOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = task.await;
        if let Err(err) = handle.settle(outcome) {
            tracing::debug!(name = handle.name(), error = %err, "bound future settled late");
        }
    })
}

/// Feed every item of `stream` into the spinner text, then settle.
///
/// The first error fails the spinner and stops consumption.
pub fn bind_stream<S>(handle: SpinnerHandle, stream: S) -> JoinHandle<()>
where
    S: Stream<Item = Result<String, TaskFailure>> + Send + 'static,
{
    tokio::spawn(async move {
        pin_mut!(stream);
        let mut outcome = Ok(None);
        while let Some(item) = stream.next().await {
            match item {
                Ok(text) => {
                    if let Err(err) = handle.text(text) {
                        tracing::debug!(name = handle.name(), error = %err, "bound stream lost its spinner");
                        return;
                    }
                }
                Err(failure) => {
                    outcome = Err(failure);
                    break;
                }
            }
        }
        if let Err(err) = handle.settle(outcome) {
            tracing::debug!(name = handle.name(), error = %err, "bound stream settled late");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spinner::SharedLogs;
    use multispin_core::layout::plain_text;
    use multispin_core::SpinnersConfig;
    use std::io;

    fn fixture() -> (Spinner, StatusRegistry) {
        let config = SpinnersConfig::for_terminal(true);
        let registry = StatusRegistry::with_builtins(&config);
        let spinner = Spinner::new("job", SpinnerOptions::new(), &config, SharedLogs::default());
        (spinner, registry)
    }

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("upload failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_from_error_without_source_is_message() {
        let err = io::Error::other("disk full");
        assert_eq!(
            TaskFailure::from_error(&err),
            TaskFailure::Message("disk full".into())
        );
    }

    #[test]
    fn test_from_error_collects_source_chain() {
        let err = Wrapped(io::Error::other("connection reset"));
        assert_eq!(
            TaskFailure::from_error(&err),
            TaskFailure::Error {
                message: "upload failed".into(),
                trace: "caused by: connection reset".into(),
            }
        );
    }

    #[test]
    fn test_settle_success_with_text() {
        let (mut spinner, registry) = fixture();
        settle(&mut spinner, Ok(Some("done!".into())), &registry);
        assert_eq!(spinner.current_status(), "success");
        assert_eq!(spinner.current_text(), "done!");
    }

    #[test]
    fn test_settle_success_with_empty_text_keeps_text() {
        let (mut spinner, registry) = fixture();
        settle(&mut spinner, Ok(Some(String::new())), &registry);
        assert_eq!(spinner.current_status(), "success");
        assert_eq!(spinner.current_text(), "job");
    }

    #[test]
    fn test_settle_message_failure() {
        let (mut spinner, registry) = fixture();
        settle(&mut spinner, Err("timeout".into()), &registry);
        assert_eq!(spinner.current_status(), "fail");
        assert_eq!(spinner.current_text(), "timeout");
    }

    #[test]
    fn test_settle_error_failure_paints_trace() {
        let (mut spinner, registry) = fixture();
        let failure = TaskFailure::Error {
            message: "boom".into(),
            trace: "caused by: fuse".into(),
        };
        settle(&mut spinner, Err(failure), &registry);
        assert_eq!(spinner.current_status(), "fail");
        assert_eq!(plain_text(spinner.current_text()), "boom\ncaused by: fuse");
        assert!(spinner.current_text().contains(&paint("caused by: fuse", Some(Color::Gray))));
        assert_eq!(spinner.get_status("fail", &registry).text_color, None);
    }

    #[test]
    fn test_settle_opaque_failure() {
        let (mut spinner, registry) = fixture();
        settle(&mut spinner, Err(TaskFailure::Opaque), &registry);
        assert_eq!(spinner.current_status(), "fail");
        assert_eq!(spinner.current_text(), "job");
    }
}

//! Spinner entities, the spinner set and its repaint loop.
//!
//! The entry point is [`Spinners`]: add named spinners, drive them through
//! [`SpinnerHandle`]s, and the set keeps one block of status lines up to date
//! on its stream.

pub mod dispatch;
pub mod orchestrator;
pub mod spinner;
pub mod task;

pub use orchestrator::{SpinnerHandle, Spinners, STOPPED_STATUS};
pub use spinner::{Spinner, SpinnerEvent, SpinnerState};
pub use task::{TaskFailure, TaskOutcome};

//! Terminal plumbing for multispin.
//!
//! Streams, relative cursor control, color painting, capability detection
//! and exit-time cleanup hooks. Nothing in here knows what a spinner is.

pub mod capabilities;
pub mod cursor;
pub mod exit;
pub mod paint;
pub mod stream;

pub use capabilities::Capabilities;
pub use exit::{on_exit, run_exit_hooks, ExitRegistration};
pub use paint::paint;
pub use stream::{MemoryStream, StderrStream, StdoutStream, TermStream};

//! Process-exit hooks that leave the terminal in a usable state.
//!
//! Rust has no portable "before exit" event, so hooks run from three places:
//! an explicit [`run_exit_hooks`] call (the binary does this on a shutdown
//! signal), the panic hook installed on first registration, and the owner
//! dropping its [`ExitRegistration`] (which only deregisters).
//!
//! Each hook runs at most once. Hooks registered with `always_last` run after
//! every regular hook.
//!
//! Signals are not intercepted here. A program that wants the terminal
//! restored on SIGINT, SIGTERM or SIGHUP must listen for them and call
//! [`run_exit_hooks`] before exiting.

use std::mem;
use std::panic;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

type Hook = Box<dyn FnOnce() + Send>;

struct Entry {
    id: u64,
    always_last: bool,
    hook: Hook,
}

static HOOKS: Mutex<Vec<Entry>> = Mutex::new(Vec::new());
static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Deregistration handle returned by [`on_exit`].
///
/// Dropping it removes the hook without running it.
#[derive(Debug)]
#[must_use = "dropping the registration removes the hook"]
pub struct ExitRegistration {
    id: u64,
}

impl ExitRegistration {
    /// Remove the hook without running it.
    pub fn remove(self) {}
}

impl Drop for ExitRegistration {
    fn drop(&mut self) {
        let mut hooks = HOOKS.lock().unwrap_or_else(PoisonError::into_inner);
        hooks.retain(|entry| entry.id != self.id);
    }
}

/// Register `hook` to run when the process exits or panics.
pub fn on_exit(hook: impl FnOnce() + Send + 'static, always_last: bool) -> ExitRegistration {
    install_exit_panic_hook();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    HOOKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(Entry {
            id,
            always_last,
            hook: Box::new(hook),
        });
    tracing::trace!(id, always_last, "registered exit hook");
    ExitRegistration { id }
}

/// Number of hooks currently registered.
pub fn pending_hooks() -> usize {
    HOOKS.lock().unwrap_or_else(PoisonError::into_inner).len()
}

/// Run and drain every registered hook, regular hooks first.
///
/// The lock is released before any hook runs, so a hook may register or
/// deregister other hooks.
pub fn run_exit_hooks() {
    let entries = mem::take(&mut *HOOKS.lock().unwrap_or_else(PoisonError::into_inner));
    if entries.is_empty() {
        return;
    }
    tracing::debug!(count = entries.len(), "running exit hooks");
    let (last, regular): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|entry| entry.always_last);
    for entry in regular.into_iter().chain(last) {
        (entry.hook)();
    }
}

/// Install a panic hook that runs the exit hooks before delegating.
pub fn install_exit_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            run_exit_hooks();
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Hook) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> Hook {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_always_last_runs_after_regular_hooks() {
        let _guard = test_lock().lock().unwrap();
        let (log, make) = recorder();
        let a = on_exit(make("last"), true);
        let b = on_exit(make("first"), false);
        let c = on_exit(make("second"), false);
        run_exit_hooks();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "last"]);
        drop((a, b, c));
    }

    #[test]
    fn test_hooks_run_once() {
        let _guard = test_lock().lock().unwrap();
        let (log, make) = recorder();
        let reg = on_exit(make("once"), false);
        run_exit_hooks();
        run_exit_hooks();
        assert_eq!(log.lock().unwrap().len(), 1);
        drop(reg);
    }

    #[test]
    fn test_removed_hook_never_runs() {
        let _guard = test_lock().lock().unwrap();
        let (log, make) = recorder();
        let reg = on_exit(make("gone"), false);
        assert!(pending_hooks() >= 1);
        reg.remove();
        run_exit_hooks();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registration_installs_panic_hook() {
        let _guard = test_lock().lock().unwrap();
        let reg = on_exit(|| {}, false);
        assert!(PANIC_HOOK_INSTALLED.get().is_some());
        drop(reg);
        assert_eq!(pending_hooks(), 0);
    }
}

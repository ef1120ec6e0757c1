//! The spinner set and its repaint loop.
//!
//! [`Spinners`] owns every spinner in insertion order, the status registry,
//! the dispatch table and the output stream. All of it lives in one
//! [`Engine`] behind a mutex; public calls, timer ticks and bound tasks each
//! run to completion under that lock.
//!
//! In animated mode a tokio task repaints the whole block every animation
//! interval, moving the cursor back to the top of the block after each pass
//! so the next pass overwrites it in place. Otherwise each change writes one
//! plain line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};
use std::time::Duration;

use futures::Stream;
use multispin_core::animation::AnimationSpec;
use multispin_core::layout::{lines_length, DEFAULT_COLUMNS, EOL};
use multispin_core::{
    Result, SpinnerOptions, SpinnersConfig, SpinnersError, StatusDefinition, StatusRegistry,
    StatusStyle,
};
use multispin_term::cursor::{
    clear_line_right, clear_screen_down, hide_cursor, move_cursor, show_cursor,
};
use multispin_term::{on_exit, Capabilities, ExitRegistration, StderrStream, TermStream};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time;

use crate::dispatch::Dispatch;
use crate::spinner::{SharedLogs, Spinner, SpinnerEvent, SpinnerState};
use crate::task::{self, TaskFailure, TaskOutcome};

/// Status `stop_all` falls back to.
pub const STOPPED_STATUS: &str = "stopped";

// ── Spinners ──────────────────────────────────────────────────────────────────

/// A set of named spinners painted as one block.
///
/// Cloning is cheap; clones share the same set.
#[derive(Clone)]
pub struct Spinners {
    engine: Arc<Mutex<Engine>>,
}

impl Spinners {
    /// A set painting on stderr, animating when stderr is an interactive
    /// terminal outside CI.
    pub fn new(config: SpinnersConfig) -> Self {
        Self::with_stream(config, StderrStream::new())
    }

    /// A set painting on `stream`, with capabilities detected from it.
    pub fn with_stream(config: SpinnersConfig, stream: impl TermStream + 'static) -> Self {
        let caps = Capabilities::detect(&stream, config.disable_spins);
        Self::with_capabilities(config, stream, caps)
    }

    /// A set painting on `stream` with explicit capabilities.
    pub fn with_capabilities(
        config: SpinnersConfig,
        stream: impl TermStream + 'static,
        caps: Capabilities,
    ) -> Self {
        let animate = caps.should_animate() && !config.disable_spins;
        let registry = StatusRegistry::with_builtins(&config);
        let dispatch = Dispatch::new(registry.names());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tracing::debug!(animate, "spinner set created");

        let engine = Arc::new_cyclic(|weak| {
            Mutex::new(Engine {
                config,
                registry,
                dispatch,
                spinners: Vec::new(),
                logs: SharedLogs::default(),
                stream: Box::new(stream),
                animate,
                timer: None,
                frame_index: 0,
                painted_lengths: Vec::new(),
                cursor_hidden: false,
                exit_registration: None,
                warned_no_runtime: false,
                events_tx,
                events_rx,
                weak_self: weak.clone(),
            })
        });
        Self { engine }
    }

    fn engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether state changes are animated rather than written as lines.
    pub fn is_animated(&self) -> bool {
        self.engine().animate
    }

    /// Create a spinner named `name` and paint it.
    pub fn add(&self, name: &str, options: SpinnerOptions) -> Result<SpinnerHandle> {
        let mut engine = self.engine();
        engine.add(name, options)?;
        engine.drain_events()?;
        Ok(self.handle(name))
    }

    /// A handle to the existing spinner `name`.
    pub fn get(&self, name: &str) -> Result<SpinnerHandle> {
        self.engine().find(name)?;
        Ok(self.handle(name))
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut engine = self.engine();
        engine.remove(name)?;
        engine.drain_events()
    }

    /// The current options of spinner `name`.
    pub fn pick(&self, name: &str) -> Result<SpinnerState> {
        Ok(self.engine().find(name)?.options())
    }

    /// Names of all spinners, in paint order.
    pub fn names(&self) -> Vec<String> {
        self.engine()
            .spinners
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Force every unfinished spinner into `new_status` (or `stopped` when
    /// absent or unknown) and finish the set.
    pub fn stop_all(&self, new_status: Option<&str>) -> Result<()> {
        let mut engine = self.engine();
        engine.stop_all(new_status.unwrap_or(STOPPED_STATUS))?;
        engine.drain_events()
    }

    pub fn has_active_spinners(&self) -> bool {
        self.engine().has_active_spinners()
    }

    /// Replace the animation; malformed requests fall back to the platform
    /// default.
    pub fn set_frames(&self, spec: impl Into<AnimationSpec>) -> Result<()> {
        let mut engine = self.engine();
        engine.set_frames(spec.into())?;
        engine.drain_events()
    }

    /// Create or update a status, registering an operation for each name or
    /// alias it introduces. Returns those names.
    pub fn configure_status<S: AsRef<str>>(
        &self,
        name: &str,
        style: &StatusStyle,
        aliases: &[S],
    ) -> Result<Vec<String>> {
        self.engine().configure_status(name, style, aliases)
    }

    /// [`configure_status`](Self::configure_status) from a JSON object such
    /// as `{"prefix": "↻", "isStatic": true, "aliases": ["again"]}`.
    /// Malformed fields are dropped.
    pub fn configure_status_value(&self, name: &str, value: &Value) -> Result<Vec<String>> {
        let mut engine = self.engine();
        let added = engine.registry.configure_status_value(name, value)?;
        engine.register_operations(&added);
        Ok(added)
    }

    /// Run the operation `operation` on spinner `name`.
    pub fn call(&self, operation: &str, name: &str, options: SpinnerOptions) -> Result<()> {
        let mut engine = self.engine();
        engine.call(operation, name, options)?;
        engine.drain_events()
    }

    // ── logs ──────────────────────────────────────────────────────────────

    pub fn add_log(&self, line: impl Into<String>) {
        let logs = Arc::clone(&self.engine().logs);
        logs.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// A snapshot of the shared log.
    pub fn logs(&self) -> Vec<String> {
        let logs = Arc::clone(&self.engine().logs);
        let lines = logs.lock().unwrap_or_else(PoisonError::into_inner).clone();
        lines
    }

    /// Feed every log line to `sink`.
    pub fn log(&self, mut sink: impl FnMut(&str)) {
        for line in self.logs() {
            sink(&line);
        }
    }

    pub fn log_to_stdout(&self) {
        self.log(|line| println!("{line}"));
    }

    fn handle(&self, name: &str) -> SpinnerHandle {
        SpinnerHandle {
            name: name.to_string(),
            engine: Arc::clone(&self.engine),
        }
    }
}

// ── SpinnerHandle ─────────────────────────────────────────────────────────────

/// A reference to one spinner in a [`Spinners`] set.
///
/// Every call fails with [`SpinnersError::UnknownSpinner`] once the spinner
/// has been removed or the set has finished.
#[derive(Clone)]
pub struct SpinnerHandle {
    name: String,
    engine: Arc<Mutex<Engine>>,
}

impl SpinnerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn with_spinner<R>(&self, f: impl FnOnce(&mut Spinner, &StatusRegistry) -> R) -> Result<R> {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let result = engine.with_spinner(&self.name, f)?;
        engine.drain_events()?;
        Ok(result)
    }

    pub fn update(&self, options: SpinnerOptions) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.update(options))
    }

    pub fn status(&self, name: &str) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.status(name))
    }

    pub fn text(&self, text: impl Into<String>) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.text(text))
    }

    pub fn indent(&self, indent: usize) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.indent(indent))
    }

    /// Read or change visibility; see [`Spinner::hidden`].
    pub fn hidden(&self, flag: Option<bool>) -> Result<bool> {
        self.with_spinner(|spinner, _| spinner.hidden(flag))
    }

    pub fn hide(&self) -> Result<bool> {
        self.hidden(Some(true))
    }

    pub fn show(&self) -> Result<bool> {
        self.hidden(Some(false))
    }

    /// Remove this spinner from its set.
    pub fn remove(&self) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.remove())
    }

    pub fn is_active(&self) -> Result<bool> {
        self.with_spinner(|spinner, registry| spinner.is_active(registry))
    }

    /// The effective definition of status `name` for this spinner.
    pub fn get_status(&self, name: &str) -> Result<StatusDefinition> {
        self.with_spinner(|spinner, registry| spinner.get_status(name, registry))
    }

    pub fn options(&self) -> Result<SpinnerState> {
        self.with_spinner(|spinner, _| spinner.options())
    }

    pub fn add_log(&self, line: impl Into<String>) -> Result<()> {
        self.with_spinner(|spinner, _| spinner.add_log(line))
    }

    /// Render with `frame` at the set's current width.
    pub fn render(&self, frame: &str) -> Result<String> {
        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let columns = engine.columns();
        Ok(engine.find(&self.name)?.render(frame, &engine.registry, columns))
    }

    pub fn raw_render(&self) -> Result<String> {
        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let columns = engine.columns();
        Ok(engine.find(&self.name)?.raw_render(&engine.registry, columns))
    }

    /// Run the named operation on this spinner.
    pub fn call(&self, operation: &str, options: SpinnerOptions) -> Result<()> {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.call(operation, &self.name, options)?;
        engine.drain_events()
    }

    pub fn succeed(&self, options: SpinnerOptions) -> Result<()> {
        self.call("success", options)
    }

    pub fn fail(&self, options: SpinnerOptions) -> Result<()> {
        self.call("fail", options)
    }

    pub fn warn(&self, options: SpinnerOptions) -> Result<()> {
        self.call("warn", options)
    }

    pub fn info(&self, options: SpinnerOptions) -> Result<()> {
        self.call("info", options)
    }

    pub fn stop(&self, options: SpinnerOptions) -> Result<()> {
        self.call(STOPPED_STATUS, options)
    }

    pub fn spin(&self, options: SpinnerOptions) -> Result<()> {
        self.call("spinning", options)
    }

    /// Settle into `success` or `fail` from a task outcome.
    pub fn settle(&self, outcome: TaskOutcome) -> Result<()> {
        self.with_spinner(|spinner, registry| task::settle(spinner, outcome, registry))
    }

    /// Settle this spinner when `future` resolves. Needs a tokio runtime.
    pub fn bind_future<F>(&self, future: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = TaskOutcome> + Send + 'static,
    {
        task::bind_future(self.clone(), future)
    }

    /// Follow `stream` with this spinner's text. Needs a tokio runtime.
    pub fn bind_stream<S>(&self, stream: S) -> JoinHandle<()>
    where
        S: Stream<Item = std::result::Result<String, TaskFailure>> + Send + 'static,
    {
        task::bind_stream(self.clone(), stream)
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

struct Engine {
    config: SpinnersConfig,
    registry: StatusRegistry,
    dispatch: Dispatch,
    /// Paint order is insertion order.
    spinners: Vec<Spinner>,
    logs: SharedLogs,
    stream: Box<dyn TermStream>,
    animate: bool,
    timer: Option<JoinHandle<()>>,
    frame_index: usize,
    /// Printable width of every line painted by the last pass.
    painted_lengths: Vec<usize>,
    cursor_hidden: bool,
    exit_registration: Option<ExitRegistration>,
    warned_no_runtime: bool,
    events_tx: UnboundedSender<SpinnerEvent>,
    events_rx: UnboundedReceiver<SpinnerEvent>,
    weak_self: Weak<Mutex<Engine>>,
}

impl Engine {
    fn columns(&self) -> usize {
        self.stream.columns().unwrap_or(DEFAULT_COLUMNS)
    }

    fn find(&self, name: &str) -> Result<&Spinner> {
        if name.is_empty() {
            return Err(SpinnersError::MissingName);
        }
        self.spinners
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SpinnersError::UnknownSpinner(name.to_string()))
    }

    fn with_spinner<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Spinner, &StatusRegistry) -> R,
    ) -> Result<R> {
        if name.is_empty() {
            return Err(SpinnersError::MissingName);
        }
        let registry = &self.registry;
        let spinner = self
            .spinners
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| SpinnersError::UnknownSpinner(name.to_string()))?;
        Ok(f(spinner, registry))
    }

    fn has_active_spinners(&self) -> bool {
        self.spinners.iter().any(|s| s.is_active(&self.registry))
    }

    // ── operations ────────────────────────────────────────────────────────

    fn add(&mut self, name: &str, options: SpinnerOptions) -> Result<()> {
        if name.is_empty() {
            return Err(SpinnersError::MissingName);
        }
        if self.spinners.iter().any(|s| s.name() == name) {
            return Err(SpinnersError::DuplicateName(name.to_string()));
        }

        let mut spinner = Spinner::new(name, options, &self.config, Arc::clone(&self.logs));
        spinner.subscribe(self.events_tx.clone());
        self.spinners.push(spinner);
        tracing::debug!(name, total = self.spinners.len(), "spinner added");

        self.arm_exit_hook();
        self.update_spinner_state(Some(name))
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(SpinnersError::MissingName);
        }
        let index = self
            .spinners
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| SpinnersError::UnknownSpinner(name.to_string()))?;
        let mut spinner = self.spinners.remove(index);
        spinner.unsubscribe();
        tracing::debug!(name, "spinner removed");
        self.update_spinner_state(None)
    }

    fn stop_all(&mut self, new_status: &str) -> Result<()> {
        let status = if self.registry.actual_name(new_status).is_some() {
            new_status
        } else {
            STOPPED_STATUS
        };
        let registry = &self.registry;
        for spinner in self.spinners.iter_mut() {
            if spinner.is_active(registry) {
                spinner.force_status(status);
            }
        }
        tracing::debug!(status, "stopping all spinners");
        self.check_if_active()
    }

    fn set_frames(&mut self, spec: AnimationSpec) -> Result<()> {
        self.config.spinner = spec.resolve(self.config.unicode);
        self.frame_index = 0;
        self.update_spinner_state(None)
    }

    fn configure_status<S: AsRef<str>>(
        &mut self,
        name: &str,
        style: &StatusStyle,
        aliases: &[S],
    ) -> Result<Vec<String>> {
        let added = self.registry.configure_status(name, style, aliases)?;
        self.register_operations(&added);
        Ok(added)
    }

    fn register_operations(&mut self, introduced: &[String]) {
        for name in introduced {
            self.dispatch.register_status(name);
        }
    }

    fn call(&mut self, operation: &str, name: &str, options: SpinnerOptions) -> Result<()> {
        let op = self
            .dispatch
            .get(operation)
            .ok_or_else(|| SpinnersError::UnknownOperation(operation.to_string()))?;
        self.with_spinner(name, |spinner, _| op(spinner, options))
    }

    /// Handle every event spinners emitted since the last drain.
    fn drain_events(&mut self) -> Result<()> {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SpinnerEvent::StateChanged(name) => {
                    if self.spinners.iter().any(|s| s.name() == name) {
                        self.update_spinner_state(Some(&name))?;
                    }
                }
                SpinnerEvent::RemoveRequested(name) => {
                    if self.spinners.iter().any(|s| s.name() == name) {
                        self.remove(&name)?;
                    }
                }
            }
        }
        Ok(())
    }

    // ── repaint ───────────────────────────────────────────────────────────

    /// React to a change of spinner `name` (or of the set when `None`).
    fn update_spinner_state(&mut self, name: Option<&str>) -> Result<()> {
        if self.animate {
            self.schedule();
            if !self.cursor_hidden {
                hide_cursor(&mut *self.stream)?;
                self.stream.flush()?;
                self.cursor_hidden = true;
            }
            return self.check_if_active();
        }

        let Some(name) = name else {
            return Ok(());
        };
        let columns = self.columns();
        let Some(spinner) = self.spinners.iter().find(|s| s.name() == name) else {
            return Ok(());
        };
        if spinner.is_hidden() {
            return Ok(());
        }
        let line = spinner.raw_render(&self.registry, columns);
        write!(self.stream, "{line}{EOL}")?;
        self.stream.flush()?;
        Ok(())
    }

    /// Replace any pending timer with a fresh one.
    fn schedule(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let period = Duration::from_millis(self.config.spinner.interval.max(1));
        match Handle::try_current() {
            Ok(runtime) => {
                let engine = self.weak_self.clone();
                self.timer = Some(runtime.spawn(repaint_loop(engine, period)));
                tracing::trace!(interval_ms = self.config.spinner.interval, "repaint timer armed");
            }
            Err(_) => {
                if !self.warned_no_runtime {
                    tracing::warn!("no tokio runtime; repainting only on changes");
                    self.warned_no_runtime = true;
                }
                self.tick();
            }
        }
    }

    /// One animation pass with the current frame.
    fn tick(&mut self) {
        let frame = self.config.spinner.frame(self.frame_index).to_string();
        if let Err(err) = self.paint(&frame) {
            tracing::warn!(error = %err, "failed to repaint spinners");
        }
        self.frame_index = self.config.spinner.next_index(self.frame_index);
    }

    /// Paint every visible spinner with `frame` and leave the cursor at the
    /// top of the block.
    fn paint(&mut self, frame: &str) -> io::Result<()> {
        let columns = self.columns();
        let active = self.has_active_spinners();
        let mut output = String::new();
        let mut lengths = Vec::new();
        for spinner in self.spinners.iter().filter(|s| !s.is_hidden()) {
            let lines = spinner.render(frame, &self.registry, columns);
            lengths.extend(lines_length(&lines));
            output.push_str(&lines);
            output.push_str(EOL);
        }

        let out = &mut *self.stream;
        if !active {
            clear_screen_down(out)?;
        }
        out.write_all(output.as_bytes())?;
        move_cursor(out, 0, -row_count(&lengths))?;
        if active {
            clean_stream(out, &lengths)?;
        }
        out.flush()?;
        self.painted_lengths = lengths;
        Ok(())
    }

    /// If nothing is active any more: paint a last time, park the cursor
    /// below the block, stop the timer and clear the set.
    fn check_if_active(&mut self) -> Result<()> {
        if self.has_active_spinners() {
            return Ok(());
        }
        if self.animate {
            self.paint("")?;
            if let Some(timer) = self.timer.take() {
                timer.abort();
            }
            self.release_terminal()?;
            tracing::debug!("no active spinners; animation stopped");
        }
        for spinner in self.spinners.iter_mut() {
            spinner.unsubscribe();
        }
        self.spinners.clear();
        self.exit_registration = None;
        Ok(())
    }

    /// Move below the painted block and show the cursor.
    fn release_terminal(&mut self) -> io::Result<()> {
        move_cursor(&mut *self.stream, 0, row_count(&self.painted_lengths))?;
        self.painted_lengths.clear();
        if self.cursor_hidden {
            show_cursor(&mut *self.stream)?;
            self.cursor_hidden = false;
        }
        self.stream.flush()
    }

    fn arm_exit_hook(&mut self) {
        if !self.animate || self.exit_registration.is_some() {
            return;
        }
        let engine = self.weak_self.clone();
        self.exit_registration = Some(on_exit(move || release_on_exit(&engine), true));
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if self.cursor_hidden {
            if let Err(err) = self.release_terminal() {
                tracing::warn!(error = %err, "failed to restore cursor");
            }
        }
    }
}

fn row_count(lengths: &[usize]) -> i64 {
    i64::try_from(lengths.len()).unwrap_or(i64::MAX)
}

/// Erase what the previous pass left to the right of and below the block.
///
/// Starts and ends at the top-left of the block.
fn clean_stream(out: &mut dyn TermStream, lengths: &[usize]) -> io::Result<()> {
    for (row, length) in lengths.iter().enumerate() {
        let dx = i64::try_from(*length).unwrap_or(i64::MAX);
        let dy = i64::try_from(row).unwrap_or(i64::MAX);
        move_cursor(out, dx, dy)?;
        clear_line_right(out)?;
        move_cursor(out, -dx, -dy)?;
    }
    let rows = row_count(lengths);
    move_cursor(out, 0, rows)?;
    clear_screen_down(out)?;
    move_cursor(out, 0, -rows)
}

async fn repaint_loop(engine: Weak<Mutex<Engine>>, period: Duration) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    // The first tick completes immediately, so a change paints right away.
    loop {
        interval.tick().await;
        let Some(strong) = engine.upgrade() else {
            break;
        };
        strong.lock().unwrap_or_else(PoisonError::into_inner).tick();
    }
}

fn release_on_exit(engine: &Weak<Mutex<Engine>>) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    let mut guard = match engine.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => return,
    };
    if let Some(timer) = guard.timer.take() {
        timer.abort();
    }
    if let Err(err) = guard.release_terminal() {
        tracing::warn!(error = %err, "failed to restore terminal on exit");
    }
}

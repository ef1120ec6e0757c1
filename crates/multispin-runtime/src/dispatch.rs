//! Named operations callable on a spinner by string.
//!
//! Every status name and alias gets an operation of the same name that
//! switches the spinner to that status, alongside the built-in setters.

use std::collections::HashMap;
use std::sync::Arc;

use multispin_core::SpinnerOptions;

use crate::spinner::Spinner;

/// An operation over one spinner.
pub type Operation = Arc<dyn Fn(&mut Spinner, SpinnerOptions) + Send + Sync>;

/// Built-in operation names.
pub const BUILTIN_OPERATIONS: [&str; 8] = [
    "update", "status", "text", "indent", "hidden", "hide", "show", "remove",
];

pub struct Dispatch {
    operations: HashMap<String, Operation>,
}

impl Dispatch {
    /// A table holding the built-ins plus one operation per status name.
    pub fn new<S: AsRef<str>>(status_names: &[S]) -> Self {
        let mut dispatch = Self {
            operations: HashMap::new(),
        };
        dispatch.register("update", |spinner, options| spinner.update(options));
        dispatch.register("status", |spinner, options| {
            spinner.status(options.status.unwrap_or_default())
        });
        dispatch.register("text", |spinner, options| {
            if let Some(text) = options.text {
                spinner.text(text);
            }
        });
        dispatch.register("indent", |spinner, options| {
            if let Some(indent) = options.indent {
                spinner.indent(indent);
            }
        });
        dispatch.register("hidden", |spinner, options| {
            spinner.hidden(options.hidden);
        });
        dispatch.register("hide", |spinner, _| {
            spinner.hide();
        });
        dispatch.register("show", |spinner, _| {
            spinner.show();
        });
        dispatch.register("remove", |spinner, _| spinner.remove());

        for name in status_names {
            dispatch.register_status(name.as_ref());
        }
        dispatch
    }

    /// Add `op` under `name`. The first registration of a name wins.
    pub fn register(
        &mut self,
        name: &str,
        op: impl Fn(&mut Spinner, SpinnerOptions) + Send + Sync + 'static,
    ) -> bool {
        if self.operations.contains_key(name) {
            return false;
        }
        self.operations.insert(name.to_string(), Arc::new(op));
        true
    }

    /// Add an operation that updates a spinner into status `name`.
    pub fn register_status(&mut self, name: &str) -> bool {
        let status = name.to_string();
        self.register(name, move |spinner, options| {
            spinner.update(options.status(status.clone()));
        })
    }

    pub fn get(&self, name: &str) -> Option<Operation> {
        self.operations.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }
}

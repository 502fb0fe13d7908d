//! Memory Hooks
//!
//! Optional callbacks run around each [`Memory`](super::Memory) operation by
//! [`HookedMemory`](super::HookedMemory).
//!
//! # Call order
//!
//! `before_*` → operation → `on_error` (only on failure) → `after_*` → return
//!
//! - A `before_*` error aborts the call; the operation, `on_error` and
//!   `after_*` do not run.
//! - `on_error` sees the operation's error and its return value is used
//!   verbatim: `Some(err)` replaces it, `None` suppresses it (the call then
//!   succeeds with an empty result).
//! - `after_*` receives the final result and the final error.
//!
//! # Composition
//!
//! [`compose_hooks`] merges several hook sets:
//!
//! - `before_*` run in order; the first error stops the chain and is returned
//! - `after_*` all run in order
//! - `on_error` runs in order until one returns `Some`; if every hook returns
//!   `None` the original error is kept
//!
//! Note the asymmetry: a single hook returning `None` from `on_error`
//! suppresses the error, but a composed chain never does.
//!
//! # Example
//!
//! ```rust
//! use tiermem_sdk::memory::{compose_hooks, Hooks};
//! use tiermem_sdk::MemoryError;
//!
//! let guard = Hooks::new().before_save(|input, _output| {
//!     if input.text().contains("password") {
//!         return Err(MemoryError::invalid_operation("refusing to store secrets"));
//!     }
//!     Ok(())
//! });
//!
//! let hooks = compose_hooks([guard, Hooks::logging("session-42")]);
//! assert!(hooks.before_save.is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use tiermem_core::{Document, Message};

use crate::{MemoryError, MemoryResult};

// ─────────────────────────────────────────────────────────────────────────────
// Callback Types
// ─────────────────────────────────────────────────────────────────────────────

pub type BeforeSaveFn = Arc<dyn Fn(&Message, &Message) -> MemoryResult<()> + Send + Sync>;
pub type AfterSaveFn = Arc<dyn Fn(&Message, &Message, Option<&MemoryError>) + Send + Sync>;
pub type BeforeLoadFn = Arc<dyn Fn(&str) -> MemoryResult<()> + Send + Sync>;
pub type AfterLoadFn = Arc<dyn Fn(&str, &[Message], Option<&MemoryError>) + Send + Sync>;
pub type BeforeSearchFn = Arc<dyn Fn(&str, usize) -> MemoryResult<()> + Send + Sync>;
pub type AfterSearchFn = Arc<dyn Fn(&str, usize, &[Document], Option<&MemoryError>) + Send + Sync>;
pub type BeforeClearFn = Arc<dyn Fn() -> MemoryResult<()> + Send + Sync>;
pub type AfterClearFn = Arc<dyn Fn(Option<&MemoryError>) + Send + Sync>;
pub type OnErrorFn = Arc<dyn Fn(MemoryError) -> Option<MemoryError> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Callbacks around memory operations. Every field is optional.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_save: Option<BeforeSaveFn>,
    pub after_save: Option<AfterSaveFn>,
    pub before_load: Option<BeforeLoadFn>,
    pub after_load: Option<AfterLoadFn>,
    pub before_search: Option<BeforeSearchFn>,
    pub after_search: Option<AfterSearchFn>,
    pub before_clear: Option<BeforeClearFn>,
    pub after_clear: Option<AfterClearFn>,
    pub on_error: Option<OnErrorFn>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_save", &self.before_save.is_some())
            .field("after_save", &self.after_save.is_some())
            .field("before_load", &self.before_load.is_some())
            .field("after_load", &self.after_load.is_some())
            .field("before_search", &self.before_search.is_some())
            .field("after_search", &self.after_search.is_some())
            .field("before_clear", &self.before_clear.is_some())
            .field("after_clear", &self.after_clear.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_save<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message, &Message) -> MemoryResult<()> + Send + Sync + 'static,
    {
        self.before_save = Some(Arc::new(f));
        self
    }

    pub fn after_save<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message, &Message, Option<&MemoryError>) + Send + Sync + 'static,
    {
        self.after_save = Some(Arc::new(f));
        self
    }

    pub fn before_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> MemoryResult<()> + Send + Sync + 'static,
    {
        self.before_load = Some(Arc::new(f));
        self
    }

    pub fn after_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[Message], Option<&MemoryError>) + Send + Sync + 'static,
    {
        self.after_load = Some(Arc::new(f));
        self
    }

    pub fn before_search<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) -> MemoryResult<()> + Send + Sync + 'static,
    {
        self.before_search = Some(Arc::new(f));
        self
    }

    pub fn after_search<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize, &[Document], Option<&MemoryError>) + Send + Sync + 'static,
    {
        self.after_search = Some(Arc::new(f));
        self
    }

    pub fn before_clear<F>(mut self, f: F) -> Self
    where
        F: Fn() -> MemoryResult<()> + Send + Sync + 'static,
    {
        self.before_clear = Some(Arc::new(f));
        self
    }

    pub fn after_clear<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&MemoryError>) + Send + Sync + 'static,
    {
        self.after_clear = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(MemoryError) -> Option<MemoryError> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Hooks that emit `tracing` events for every operation.
    ///
    /// Starts are logged at debug, completions at info, failures at warn by
    /// the matching `after_*` hook. `on_error` hands the error back unchanged.
    pub fn logging(label: impl Into<String>) -> Self {
        let label: Arc<str> = Arc::from(label.into());

        Self::new()
            .before_save({
                let label = label.clone();
                move |input, output| {
                    tracing::debug!(memory = %label, input_role = %input.role, output_role = %output.role, "memory save");
                    Ok(())
                }
            })
            .after_save({
                let label = label.clone();
                move |_, _, err| match err {
                    Some(err) => tracing::warn!(memory = %label, error = %err, "memory save failed"),
                    None => tracing::info!(memory = %label, "memory saved"),
                }
            })
            .before_load({
                let label = label.clone();
                move |query| {
                    tracing::debug!(memory = %label, query, "memory load");
                    Ok(())
                }
            })
            .after_load({
                let label = label.clone();
                move |_, messages, err| match err {
                    Some(err) => tracing::warn!(memory = %label, error = %err, "memory load failed"),
                    None => tracing::info!(memory = %label, count = messages.len(), "memory loaded"),
                }
            })
            .before_search({
                let label = label.clone();
                move |query, k| {
                    tracing::debug!(memory = %label, query, k, "memory search");
                    Ok(())
                }
            })
            .after_search({
                let label = label.clone();
                move |_, _, docs, err| match err {
                    Some(err) => tracing::warn!(memory = %label, error = %err, "memory search failed"),
                    None => tracing::info!(memory = %label, count = docs.len(), "memory searched"),
                }
            })
            .before_clear({
                let label = label.clone();
                move || {
                    tracing::debug!(memory = %label, "memory clear");
                    Ok(())
                }
            })
            .after_clear(move |err| match err {
                Some(err) => tracing::warn!(memory = %label, error = %err, "memory clear failed"),
                None => tracing::info!(memory = %label, "memory cleared"),
            })
            .on_error(Some)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Composition
// ─────────────────────────────────────────────────────────────────────────────

/// Merge hook sets into one. Every field of the result is set, even when no
/// input hook provides it.
pub fn compose_hooks(hooks: impl IntoIterator<Item = Hooks>) -> Hooks {
    let all: Arc<Vec<Hooks>> = Arc::new(hooks.into_iter().collect());

    Hooks::new()
        .before_save({
            let all = all.clone();
            move |input, output| {
                for f in all.iter().filter_map(|h| h.before_save.as_ref()) {
                    f(input, output)?;
                }
                Ok(())
            }
        })
        .after_save({
            let all = all.clone();
            move |input, output, err| {
                for f in all.iter().filter_map(|h| h.after_save.as_ref()) {
                    f(input, output, err);
                }
            }
        })
        .before_load({
            let all = all.clone();
            move |query| {
                for f in all.iter().filter_map(|h| h.before_load.as_ref()) {
                    f(query)?;
                }
                Ok(())
            }
        })
        .after_load({
            let all = all.clone();
            move |query, messages, err| {
                for f in all.iter().filter_map(|h| h.after_load.as_ref()) {
                    f(query, messages, err);
                }
            }
        })
        .before_search({
            let all = all.clone();
            move |query, k| {
                for f in all.iter().filter_map(|h| h.before_search.as_ref()) {
                    f(query, k)?;
                }
                Ok(())
            }
        })
        .after_search({
            let all = all.clone();
            move |query, k, docs, err| {
                for f in all.iter().filter_map(|h| h.after_search.as_ref()) {
                    f(query, k, docs, err);
                }
            }
        })
        .before_clear({
            let all = all.clone();
            move || {
                for f in all.iter().filter_map(|h| h.before_clear.as_ref()) {
                    f()?;
                }
                Ok(())
            }
        })
        .after_clear({
            let all = all.clone();
            move |err| {
                for f in all.iter().filter_map(|h| h.after_clear.as_ref()) {
                    f(err);
                }
            }
        })
        .on_error(move |err| {
            for f in all.iter().filter_map(|h| h.on_error.as_ref()) {
                if let Some(replaced) = f(err.clone()) {
                    return Some(replaced);
                }
            }
            Some(err)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    fn calls() -> Calls {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push(calls: &Calls, entry: &str) {
        calls.lock().push(entry.to_string());
    }

    /// Hooks recording every callback as "<name>.<Callback>".
    fn recording(name: &'static str, calls: &Calls) -> Hooks {
        let c = calls.clone();
        let mut hooks = Hooks::new();
        let rec = move |cb: &str| push(&c, &format!("{name}.{cb}"));
        let r = rec.clone();
        hooks = hooks.before_save(move |_, _| {
            r("BeforeSave");
            Ok(())
        });
        let r = rec.clone();
        hooks = hooks.after_save(move |_, _, _| r("AfterSave"));
        let r = rec.clone();
        hooks = hooks.before_load(move |_| {
            r("BeforeLoad");
            Ok(())
        });
        let r = rec.clone();
        hooks = hooks.after_load(move |_, _, _| r("AfterLoad"));
        let r = rec.clone();
        hooks = hooks.before_search(move |_, _| {
            r("BeforeSearch");
            Ok(())
        });
        let r = rec.clone();
        hooks = hooks.after_search(move |_, _, _, _| r("AfterSearch"));
        let r = rec.clone();
        hooks = hooks.before_clear(move || {
            r("BeforeClear");
            Ok(())
        });
        hooks.after_clear(move |_| rec("AfterClear"))
    }

    fn run_all(hooks: &Hooks) {
        let (input, output) = (Message::human("input"), Message::ai("output"));
        (hooks.before_save.as_ref().unwrap())(&input, &output).unwrap();
        (hooks.after_save.as_ref().unwrap())(&input, &output, None);
        (hooks.before_load.as_ref().unwrap())("query").unwrap();
        (hooks.after_load.as_ref().unwrap())("query", &[], None);
        (hooks.before_search.as_ref().unwrap())("query", 5).unwrap();
        (hooks.after_search.as_ref().unwrap())("query", 5, &[], None);
        (hooks.before_clear.as_ref().unwrap())().unwrap();
        (hooks.after_clear.as_ref().unwrap())(None);
    }

    #[test]
    fn test_compose_empty_sets_every_field() {
        let composed = compose_hooks(Vec::new());
        run_all(&composed);

        let err = MemoryError::backend("original");
        let out = (composed.on_error.as_ref().unwrap())(err).unwrap();
        assert_eq!(out.to_string(), "backend error: original");
    }

    #[test]
    fn test_compose_partial_hooks_are_callable() {
        let seen = calls();
        let s = seen.clone();
        let composed = compose_hooks([
            Hooks::new().after_load(move |_, _, _| push(&s, "only")),
            Hooks::new(),
        ]);
        run_all(&composed);
        assert_eq!(*seen.lock(), ["only"]);
    }

    #[test]
    fn test_compose_single() {
        let seen = calls();
        let composed = compose_hooks([recording("h", &seen)]);
        run_all(&composed);
        assert_eq!(
            *seen.lock(),
            [
                "h.BeforeSave",
                "h.AfterSave",
                "h.BeforeLoad",
                "h.AfterLoad",
                "h.BeforeSearch",
                "h.AfterSearch",
                "h.BeforeClear",
                "h.AfterClear",
            ]
        );
    }

    #[test]
    fn test_compose_multiple_in_order() {
        let seen = calls();
        let composed = compose_hooks([
            recording("h1", &seen),
            recording("h2", &seen),
            recording("h3", &seen),
        ]);
        let (input, output) = (Message::human("in"), Message::ai("out"));
        (composed.before_save.as_ref().unwrap())(&input, &output).unwrap();
        (composed.after_save.as_ref().unwrap())(&input, &output, None);

        assert_eq!(
            *seen.lock(),
            [
                "h1.BeforeSave",
                "h2.BeforeSave",
                "h3.BeforeSave",
                "h1.AfterSave",
                "h2.AfterSave",
                "h3.AfterSave",
            ]
        );
    }

    #[test]
    fn test_compose_before_error_stops_chain() {
        let seen = calls();
        let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());
        let composed = compose_hooks([
            Hooks::new().before_save(move |_, _| {
                push(&s1, "h1");
                Ok(())
            }),
            Hooks::new().before_save(move |_, _| {
                push(&s2, "h2");
                Err(MemoryError::invalid_operation("h2 rejects"))
            }),
            Hooks::new().before_save(move |_, _| {
                push(&s3, "h3");
                Ok(())
            }),
        ]);

        let err = (composed.before_save.as_ref().unwrap())(&Message::human("a"), &Message::ai("b"))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid operation: h2 rejects");
        assert_eq!(*seen.lock(), ["h1", "h2"]);
    }

    #[test]
    fn test_compose_on_error_first_replacement_wins() {
        let seen = calls();
        let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());
        let composed = compose_hooks([
            Hooks::new().on_error(move |_| {
                push(&s1, "h1");
                None
            }),
            Hooks::new().on_error(move |_| {
                push(&s2, "h2");
                Some(MemoryError::backend("replaced by h2"))
            }),
            Hooks::new().on_error(move |_| {
                push(&s3, "h3");
                Some(MemoryError::backend("replaced by h3"))
            }),
        ]);

        let out = (composed.on_error.as_ref().unwrap())(MemoryError::backend("original")).unwrap();
        assert_eq!(out.to_string(), "backend error: replaced by h2");
        assert_eq!(*seen.lock(), ["h1", "h2"]);
    }

    #[test]
    fn test_compose_on_error_all_none_keeps_original() {
        let composed = compose_hooks([
            Hooks::new().on_error(|_| None),
            Hooks::new().on_error(|_| None),
        ]);
        let out = (composed.on_error.as_ref().unwrap())(MemoryError::backend("original"));
        assert_eq!(out.unwrap().to_string(), "backend error: original");
    }

    #[test]
    fn test_logging_hooks_pass_errors_through() {
        let hooks = Hooks::logging("test");
        run_all(&hooks);
        let out = (hooks.on_error.as_ref().unwrap())(MemoryError::backend("kept"));
        assert_eq!(out.unwrap().to_string(), "backend error: kept");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logging_hooks_log_each_failure_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let hooks = Hooks::logging("once");
        tracing::subscriber::with_default(subscriber, || {
            let err = MemoryError::backend("disk gone");
            let err = (hooks.on_error.as_ref().unwrap())(err).unwrap();
            (hooks.after_clear.as_ref().unwrap())(Some(&err));
        });

        let output = String::from_utf8(logs.0.lock().clone()).unwrap();
        assert_eq!(output.matches("disk gone").count(), 1);
        assert!(output.contains("memory clear failed"));
    }

    #[test]
    fn test_debug_shows_set_fields() {
        let hooks = Hooks::new().on_error(|e| Some(e));
        let rendered = format!("{hooks:?}");
        assert!(rendered.contains("on_error: true"));
        assert!(rendered.contains("before_save: false"));
    }
}

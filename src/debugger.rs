//! Debugger attachment state.
//!
//! Runtime code that wants to behave differently under a debugger (for example, deciding
//! whether a thrown exception should stop execution) asks a [`DebuggerInternal`] view.
//! The state itself lives in a [`DebuggerContext`] that the embedder creates and shares,
//! typically as `Arc<DebuggerContext>`, between the debugger front end and the runtime.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use bytecode_debuginfo::debugger::{DebuggerContext, PauseOnThrowMode};
//!
//! let context = Arc::new(DebuggerContext::new());
//! let internal = context.internal();
//! assert!(!internal.is_debugger_attached());
//!
//! context.attach();
//! context.set_pause_on_throw_mode(PauseOnThrowMode::Uncaught);
//! assert!(internal.is_debugger_attached());
//! assert!(internal.should_pause_on_throw());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use strum::{Display, EnumCount, EnumIter, EnumString};
use tracing::debug;

/// When a thrown exception pauses execution.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum PauseOnThrowMode {
    /// Never pause on a throw.
    #[default]
    None = 0,
    /// Pause only when nothing catches the exception.
    Uncaught = 1,
    /// Pause on every throw.
    All = 2,
}

/// Shared debugger state.
///
/// All accessors take `&self` and use atomics.
#[derive(Debug, Default)]
pub struct DebuggerContext {
    attached: AtomicBool,
    pause_on_throw: AtomicU8,
}

impl DebuggerContext {
    /// Creates a detached context that never pauses on throw.
    #[must_use]
    pub fn new() -> Self {
        DebuggerContext::default()
    }

    /// Marks a debugger as attached.
    pub fn attach(&self) {
        self.attached.store(true, Ordering::Release);
        debug!("Debugger attached");
    }

    /// Marks the debugger as detached.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
        debug!("Debugger detached");
    }

    /// Returns `true` while a debugger is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Sets when thrown exceptions pause execution.
    pub fn set_pause_on_throw_mode(&self, mode: PauseOnThrowMode) {
        self.pause_on_throw.store(mode as u8, Ordering::Release);
        debug!(mode = %mode, "Pause on throw mode changed");
    }

    /// Current pause on throw mode.
    #[must_use]
    pub fn pause_on_throw_mode(&self) -> PauseOnThrowMode {
        match self.pause_on_throw.load(Ordering::Acquire) {
            1 => PauseOnThrowMode::Uncaught,
            2 => PauseOnThrowMode::All,
            _ => PauseOnThrowMode::None,
        }
    }

    /// Read-only view for runtime code.
    #[must_use]
    pub fn internal(&self) -> DebuggerInternal<'_> {
        DebuggerInternal { context: self }
    }
}

/// Read-only introspection of a [`DebuggerContext`].
#[derive(Debug, Clone, Copy)]
pub struct DebuggerInternal<'a> {
    context: &'a DebuggerContext,
}

impl DebuggerInternal<'_> {
    /// Returns `true` while a debugger is attached.
    #[must_use]
    pub fn is_debugger_attached(&self) -> bool {
        self.context.is_attached()
    }

    /// Returns `true` if a throw may pause execution, i.e. the mode is not
    /// [`PauseOnThrowMode::None`].
    #[must_use]
    pub fn should_pause_on_throw(&self) -> bool {
        self.context.pause_on_throw_mode() != PauseOnThrowMode::None
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc, thread};

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn defaults() {
        let context = DebuggerContext::new();
        assert!(!context.is_attached());
        assert_eq!(context.pause_on_throw_mode(), PauseOnThrowMode::None);
        assert!(!context.internal().should_pause_on_throw());
    }

    #[test]
    fn attach_and_detach() {
        let context = DebuggerContext::new();
        context.attach();
        assert!(context.internal().is_debugger_attached());
        context.detach();
        assert!(!context.internal().is_debugger_attached());
    }

    #[test]
    fn pause_on_throw_follows_mode() {
        let context = DebuggerContext::new();
        for mode in PauseOnThrowMode::iter() {
            context.set_pause_on_throw_mode(mode);
            assert_eq!(context.pause_on_throw_mode(), mode);
            assert_eq!(
                context.internal().should_pause_on_throw(),
                mode != PauseOnThrowMode::None
            );
        }
        assert_eq!(PauseOnThrowMode::COUNT, 3);
    }

    #[test]
    fn mode_names() {
        assert_eq!(PauseOnThrowMode::Uncaught.to_string(), "uncaught");
        assert_eq!(PauseOnThrowMode::from_str("all").unwrap(), PauseOnThrowMode::All);
        assert_eq!(PauseOnThrowMode::from_str("none").unwrap(), PauseOnThrowMode::None);
        assert!(PauseOnThrowMode::from_str("sometimes").is_err());
    }

    #[test]
    fn shared_between_threads() {
        let context = Arc::new(DebuggerContext::new());
        let writer = Arc::clone(&context);
        thread::spawn(move || {
            writer.attach();
            writer.set_pause_on_throw_mode(PauseOnThrowMode::All);
        })
        .join()
        .unwrap();

        assert!(context.internal().is_debugger_attached());
        assert!(context.internal().should_pause_on_throw());
    }
}

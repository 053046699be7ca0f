use std::cell::Cell;

use super::statement::EntryPoint;

thread_local! {
    static CURRENT: Cell<Option<EntryPoint>> = const { Cell::new(None) };
}

/// The ambient tag for the current call stack, if a tagged operation is
/// in progress on it.
pub fn current() -> Option<EntryPoint> {
    CURRENT.with(|c| c.get())
}

/// Claims the ambient tag for the current call stack. The outermost
/// claim wins: if a tag is already set, nothing is installed and the
/// guard is inert. Dropping the guard restores the unset state on every
/// exit path, unwinding included.
pub fn enter(entry_point: EntryPoint) -> EntryPointGuard {
    CURRENT.with(|c| {
        if c.get().is_none() {
            c.set(Some(entry_point));
            EntryPointGuard { installed: true }
        } else {
            EntryPointGuard { installed: false }
        }
    })
}

pub struct EntryPointGuard {
    installed: bool,
}

impl Drop for EntryPointGuard {
    fn drop(&mut self) {
        if self.installed {
            CURRENT.with(|c| c.set(None));
        }
    }
}

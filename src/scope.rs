//! Swaps the file system behind the [`ambient`](crate::ambient) functions for a bounded
//! duration.
//!
//! Each thread keeps a stack of active providers, the top one wins. [`activate`] pushes a
//! backend and returns an [`ActiveScope`] guard; dropping the guard removes exactly that
//! entry, wherever it sits in the stack. Because the removal runs in `Drop`, it happens on
//! normal return, early return, `?` propagation and panic unwinding alike, and guards may
//! be dropped in any order: once all of them are gone the thread is back on the host.
//!
//! Code that can take a `&dyn FsBackend` should just be handed the [`MockFS`](crate::MockFS)
//! directly. The slot is for code that calls the ambient functions.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::core::FsBackend;
use crate::vfs::HostFS;

thread_local! {
    static ACTIVE: RefCell<Vec<(u64, Arc<dyn FsBackend>)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Guard returned by [`activate`]. Its provider is deactivated when it is dropped.
#[must_use = "the file system is deactivated as soon as the scope is dropped"]
pub struct ActiveScope {
    id: u64,
    // the stack is per thread, so the guard must be dropped where it was created
    _not_send: PhantomData<*const ()>,
}

impl Drop for ActiveScope {
    fn drop(&mut self) {
        // the stack may already be torn down if the guard outlives its thread's locals
        let removed = ACTIVE.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            let position = stack.iter().rposition(|(id, _)| *id == self.id)?;
            let top = position + 1 == stack.len();
            // drop the provider only after the borrow is released
            Some((stack.remove(position), top))
        });
        if let Ok(Some((_, top))) = removed {
            debug!(id = self.id, top, "file system deactivated");
        }
    }
}

/// Routes the ambient functions of the current thread to `fs` until the returned guard is
/// dropped.
///
/// ```
/// use mock_vfs::{activate, ambient, MockFS};
/// use serde_json::json;
///
/// let fs = MockFS::from_json(json!({ "etc": { "app.json": "{}" } })).unwrap();
/// {
///     let _scope = activate(fs.clone());
///     assert!(ambient::is_file("/etc/app.json"));
///     ambient::write("/etc/app.json", r#"{"the_answer": 42}"#).unwrap();
/// }
/// assert!(!mock_vfs::is_active());
/// assert_eq!(fs.get_content("/etc/app.json").as_deref(), Some(r#"{"the_answer": 42}"#));
/// ```
pub fn activate<B: FsBackend + 'static>(fs: B) -> ActiveScope {
    let fs: Arc<dyn FsBackend> = Arc::new(fs);
    let id = NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    let depth = ACTIVE.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push((id, fs));
        stack.len()
    });
    debug!(id, depth, "file system activated");
    ActiveScope {
        id,
        _not_send: PhantomData,
    }
}

/// Runs `f` with `fs` active, restoring the previous provider afterwards.
pub fn with_fs<B, F, T>(fs: B, f: F) -> T
where
    B: FsBackend + 'static,
    F: FnOnce() -> T,
{
    let _scope = activate(fs);
    f()
}

/// Returns `true` if a provider is installed on the current thread.
pub fn is_active() -> bool {
    ACTIVE.with(|stack| !stack.borrow().is_empty())
}

/// The provider the ambient functions use: the active one, or the host file system.
pub fn current() -> Arc<dyn FsBackend> {
    ACTIVE
        .with(|stack| stack.borrow().last().map(|(_, fs)| fs.clone()))
        .unwrap_or_else(|| Arc::new(HostFS::new()))
}

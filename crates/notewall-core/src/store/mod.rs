//! Document store client
//!
//! [`DocumentStore`] is the capability the board consumes: open a live query,
//! patch a note, delete a note. [`SqliteDocumentStore`] is the bundled
//! implementation backed by a local `SQLite` file.

mod migrations;
mod sqlite;

use std::fmt;

use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch};
use crate::query::NotesQuery;

pub use sqlite::SqliteDocumentStore;

/// Logical collection holding every note document
pub const NOTES_COLLECTION: &str = "notes";

/// Receives each pushed snapshot, in store delivery order
pub type SnapshotCallback = Box<dyn FnMut(Vec<Note>) + Send>;

/// Receives the error that terminated a subscription
pub type ErrorCallback = Box<dyn FnOnce(Error) + Send>;

/// Remote note storage with push-based reads
pub trait DocumentStore: Send + Sync {
    /// Open a live query.
    ///
    /// The current result set is pushed to `on_data` right away and again after
    /// every change. If the query fails, `on_error` is called once and no
    /// further snapshots arrive.
    fn subscribe(
        &self,
        query: NotesQuery,
        on_data: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription>;

    /// Merge `patch` into the stored note. Fails with `NotFound` for unknown ids.
    fn update(&self, id: &NoteId, patch: &NotePatch) -> Result<()>;

    /// Remove a note. Removing an unknown id is a no-op.
    fn delete(&self, id: &NoteId) -> Result<()>;
}

/// Handle to a live query; cancelling it stops further pushes.
///
/// Cancellation runs exactly once: on [`Subscription::unsubscribe`] or on drop,
/// whichever comes first.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop receiving snapshots
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unsubscribe_cancels_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        drop(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! In-crate test doubles

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch};
use crate::query::NotesQuery;
use crate::store::{DocumentStore, ErrorCallback, SnapshotCallback, Subscription};

#[derive(Default)]
struct Recorded {
    listeners: BTreeMap<u64, (SnapshotCallback, ErrorCallback)>,
    next_listener_id: u64,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    max_live: usize,
    queries: Vec<NotesQuery>,
    updates: Vec<(NoteId, NotePatch)>,
    deletes: Vec<NoteId>,
    fail_writes: bool,
}

/// Store double that records every call and lets tests push snapshots by hand
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingStore {
    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap()
    }

    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.recorded().fail_writes = true;
        store
    }

    /// Deliver a snapshot to every live listener
    pub fn push(&self, notes: &[Note]) {
        for (on_data, _) in self.recorded().listeners.values_mut() {
            on_data(notes.to_vec());
        }
    }

    /// Terminate every live listener with an error
    pub fn fail(&self, message: &str) {
        let listeners = std::mem::take(&mut self.recorded().listeners);
        for (_, (_, on_error)) in listeners {
            on_error(Error::Database(message.to_string()));
        }
    }

    pub fn live_count(&self) -> usize {
        self.recorded().listeners.len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.recorded().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.recorded().unsubscribe_calls
    }

    pub fn max_live(&self) -> usize {
        self.recorded().max_live
    }

    pub fn last_query(&self) -> Option<NotesQuery> {
        self.recorded().queries.last().cloned()
    }

    pub fn updates(&self) -> Vec<(NoteId, NotePatch)> {
        self.recorded().updates.clone()
    }

    pub fn deletes(&self) -> Vec<NoteId> {
        self.recorded().deletes.clone()
    }
}

impl DocumentStore for RecordingStore {
    fn subscribe(
        &self,
        query: NotesQuery,
        on_data: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription> {
        let mut recorded = self.recorded();
        let listener_id = recorded.next_listener_id;
        recorded.next_listener_id += 1;
        recorded.subscribe_calls += 1;
        recorded.queries.push(query);
        recorded.listeners.insert(listener_id, (on_data, on_error));
        recorded.max_live = recorded.max_live.max(recorded.listeners.len());

        let inner = Arc::clone(&self.inner);
        Ok(Subscription::new(move || {
            let mut recorded = inner.lock().unwrap();
            recorded.unsubscribe_calls += 1;
            recorded.listeners.remove(&listener_id);
        }))
    }

    fn update(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let mut recorded = self.recorded();
        recorded.updates.push((id.clone(), patch.clone()));
        if recorded.fail_writes {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        let mut recorded = self.recorded();
        recorded.deletes.push(id.clone());
        if recorded.fail_writes {
            return Err(Error::Database("permission denied".to_string()));
        }
        Ok(())
    }
}

//! `SQLite`-backed live document store

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Value};

use super::{
    migrations, DocumentStore, ErrorCallback, SnapshotCallback, Subscription, NOTES_COLLECTION,
};
use crate::error::{Error, Result};
use crate::models::{Note, NoteId, NotePatch};
use crate::query::NotesQuery;

struct Listener {
    query: NotesQuery,
    sink: Arc<Mutex<Sink>>,
}

/// Callback side of a live query, invoked without the store lock held
struct Sink {
    on_data: SnapshotCallback,
    on_error: Option<ErrorCallback>,
    delivered: u64,
}

enum Delivery {
    Snapshot(Vec<Note>),
    Failed(Error),
}

/// A result computed under the store lock, waiting to be handed to its sink
struct Pending {
    sink: Arc<Mutex<Sink>>,
    version: u64,
    delivery: Delivery,
}

impl Pending {
    fn deliver(self) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        // A newer snapshot already reached this listener
        if self.version <= sink.delivered {
            return;
        }
        sink.delivered = self.version;

        match self.delivery {
            Delivery::Snapshot(notes) => (sink.on_data)(notes),
            Delivery::Failed(error) => {
                sink.delivered = u64::MAX;
                if let Some(on_error) = sink.on_error.take() {
                    on_error(error);
                }
            }
        }
    }
}

fn deliver_all(pending: Vec<Pending>) {
    for item in pending {
        item.deliver();
    }
}

struct Inner {
    conn: Connection,
    listeners: BTreeMap<u64, Listener>,
    next_listener_id: u64,
    version: u64,
}

impl Inner {
    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Re-run every live query after a write.
    ///
    /// Failed queries are unregistered here; their sinks get the error once the
    /// caller delivers the batch.
    fn snapshots(&mut self) -> Vec<Pending> {
        let version = self.next_version();
        let Self {
            conn, listeners, ..
        } = self;

        let mut pending = Vec::with_capacity(listeners.len());
        listeners.retain(|listener_id, listener| {
            let delivery = match run_query(conn, &listener.query) {
                Ok(notes) => Delivery::Snapshot(notes),
                Err(error) => {
                    tracing::warn!("Live query {} failed: {}", listener_id, error);
                    Delivery::Failed(error)
                }
            };
            let keep = matches!(delivery, Delivery::Snapshot(_));
            pending.push(Pending {
                sink: Arc::clone(&listener.sink),
                version,
                delivery,
            });
            keep
        });
        pending
    }
}

/// Document store persisting the notes collection in `SQLite`.
///
/// Documents are JSON objects keyed by `(collection, id)`. Live queries are
/// re-evaluated after every committed write. Snapshots are built under the
/// store lock and handed to listeners after it is released, so callbacks may
/// call back into the store. A listener never sees an older snapshot after a
/// newer one.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl SqliteDocumentStore {
    /// Open the store at the given path, creating it if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!("Opening document store at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::run(&conn)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                conn,
                listeners: BTreeMap::new(),
                next_listener_id: 0,
                version: 0,
            })),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Database("document store lock poisoned".to_string()))
    }

    /// Store a new note document under its id
    pub fn insert(&self, note: &Note) -> Result<()> {
        let data = serde_json::to_string(&note.to_document()?)?;
        let pending = {
            let mut inner = self.lock()?;
            inner.conn.execute(
                "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)",
                params![NOTES_COLLECTION, note.id.as_str(), data],
            )?;
            tracing::debug!("Inserted note {}", note.id);
            inner.snapshots()
        };
        deliver_all(pending);
        Ok(())
    }

    /// Fetch a single note by id
    pub fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let inner = self.lock()?;
        load_document(&inner.conn, id)?
            .map(|data| Note::from_document(id.clone(), data))
            .transpose()
    }

    /// Number of live queries currently registered
    pub fn listener_count(&self) -> usize {
        self.lock().map_or(0, |inner| inner.listeners.len())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn subscribe(
        &self,
        query: NotesQuery,
        on_data: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> Result<Subscription> {
        let (listener_id, initial) = {
            let mut inner = self.lock()?;
            let result = run_query(&inner.conn, &query);
            let notes = match result {
                Ok(notes) => notes,
                Err(error) => {
                    drop(inner);
                    tracing::warn!("Live query [{}] failed: {}", query, error);
                    on_error(error);
                    return Ok(Subscription::new(|| {}));
                }
            };

            let listener_id = inner.next_listener_id;
            inner.next_listener_id += 1;
            let version = inner.next_version();
            tracing::debug!("Live query {} opened: {}", listener_id, query);

            let sink = Arc::new(Mutex::new(Sink {
                on_data,
                on_error: Some(on_error),
                delivered: 0,
            }));
            inner.listeners.insert(
                listener_id,
                Listener {
                    query,
                    sink: Arc::clone(&sink),
                },
            );
            (
                listener_id,
                Pending {
                    sink,
                    version,
                    delivery: Delivery::Snapshot(notes),
                },
            )
        };
        initial.deliver();

        let store = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            let Some(store) = store.upgrade() else {
                return;
            };
            if let Ok(mut inner) = store.lock() {
                if inner.listeners.remove(&listener_id).is_some() {
                    tracing::debug!("Live query {} closed", listener_id);
                }
            };
        }))
    }

    fn update(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let pending = {
            let mut inner = self.lock()?;
            let mut document =
                load_document(&inner.conn, id)?.ok_or_else(|| Error::NotFound(id.to_string()))?;
            document.extend(patch.fields());

            inner.conn.execute(
                "UPDATE documents SET data = ?3 WHERE collection = ?1 AND id = ?2",
                params![NOTES_COLLECTION, id.as_str(), serde_json::to_string(&document)?],
            )?;
            tracing::debug!("Updated note {}", id);
            inner.snapshots()
        };
        deliver_all(pending);
        Ok(())
    }

    fn delete(&self, id: &NoteId) -> Result<()> {
        let pending = {
            let mut inner = self.lock()?;
            let removed = inner.conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![NOTES_COLLECTION, id.as_str()],
            )?;

            if removed == 0 {
                tracing::debug!("Delete of {} matched nothing", id);
                return Ok(());
            }
            tracing::debug!("Deleted note {}", id);
            inner.snapshots()
        };
        deliver_all(pending);
        Ok(())
    }
}

fn load_document(conn: &Connection, id: &NoteId) -> Result<Option<Map<String, Value>>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
            params![NOTES_COLLECTION, id.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    data.map(|data| serde_json::from_str(&data).map_err(Error::from))
        .transpose()
}

/// Evaluate a live query; results come back in ascending id order
fn run_query(conn: &Connection, query: &NotesQuery) -> Result<Vec<Note>> {
    let mut sql = String::from("SELECT id, data FROM documents WHERE collection = ?");
    let mut values = vec![SqlValue::Text(NOTES_COLLECTION.to_string())];

    for predicate in query.predicates() {
        sql.push_str(" AND json_extract(data, ?) ");
        sql.push_str(predicate.op.as_sql());
        sql.push_str(" ?");
        values.push(SqlValue::Text(format!("$.{}", predicate.field)));
        values.push(sql_value(&predicate.value)?);
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut notes = Vec::new();
    for row in rows {
        let (id, data) = row?;
        let data: Map<String, Value> = serde_json::from_str(&data)?;
        notes.push(Note::from_document(NoteId::from(id), data)?);
    }
    Ok(notes)
}

fn sql_value(value: &Value) -> Result<SqlValue> {
    match value {
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .ok_or_else(|| Error::InvalidInput(format!("unsupported number: {number}"))),
        other => Err(Error::InvalidInput(format!(
            "unsupported filter value: {other}"
        ))),
    }
}

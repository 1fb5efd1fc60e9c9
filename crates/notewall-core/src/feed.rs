//! Live note feed
//!
//! [`NoteFeed`] keeps one live query open for the signed-in user and publishes
//! the resulting [`FeedState`] through a watch channel. Every snapshot replaces
//! the note list wholesale; nothing is merged or diffed locally.
//!
//! UI code drives a feed through [`FeedHandle`], which runs every activation and
//! release on the blocking pool in the order they were requested.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::auth::IdentityProvider;
use crate::models::Note;
use crate::query::{NoteFilters, NotesQuery};
use crate::store::{DocumentStore, Subscription};

/// Message shown for any subscription failure
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load notes";

/// Observable state of the board's data
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub loading: bool,
    pub error: Option<String>,
    pub notes: Vec<Note>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            notes: Vec::new(),
        }
    }
}

/// What the board should render, in priority order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardView<'a> {
    Loading,
    Error(&'a str),
    Empty,
    Populated(&'a [Note]),
}

impl FeedState {
    /// Resolve the presentation state: loading, then error, then empty, then grid
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        if self.loading {
            BoardView::Loading
        } else if let Some(error) = self.error.as_deref() {
            BoardView::Error(error)
        } else if self.notes.is_empty() {
            BoardView::Empty
        } else {
            BoardView::Populated(&self.notes)
        }
    }
}

/// Subscription manager for one board instance.
///
/// At most one live query is open at a time: activating again always releases
/// the previous subscription first. Dropping the feed releases it too.
pub struct NoteFeed {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<FeedState>>,
    generation: Arc<AtomicU64>,
    terminated: Arc<AtomicBool>,
    subscription: Option<Subscription>,
    filters: Option<NoteFilters>,
}

impl NoteFeed {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            store,
            identity,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            terminated: Arc::new(AtomicBool::new(false)),
            subscription: None,
            filters: None,
        }
    }

    /// Observe state changes
    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Whether a live query is currently open and has not been ended by an error
    pub fn is_live(&self) -> bool {
        self.subscription.is_some() && !self.terminated.load(Ordering::SeqCst)
    }

    /// Activate with `filters` unless already active with this exact filter set.
    ///
    /// Returns `true` when the feed (re)activated.
    pub fn set_filters(&mut self, filters: NoteFilters) -> bool {
        if self.filters.as_ref() == Some(&filters) {
            return false;
        }
        self.activate(filters);
        true
    }

    /// Release any open query, then open a new one for the current user
    pub fn activate(&mut self, filters: NoteFilters) {
        self.deactivate();
        let generation = self.generation.load(Ordering::SeqCst);
        self.terminated.store(false, Ordering::SeqCst);
        self.filters = Some(filters.clone());

        let Some(user) = self.identity.current_user() else {
            tracing::debug!("No signed-in user; showing an empty board");
            self.state.send_replace(FeedState {
                loading: false,
                error: None,
                notes: Vec::new(),
            });
            return;
        };

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let query = NotesQuery::new(&user.email, &filters);
        tracing::debug!("Subscribing to notes: {}", query);

        let on_data = {
            let state = Arc::clone(&self.state);
            let current = Arc::clone(&self.generation);
            Box::new(move |notes: Vec<Note>| {
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                if notes.is_empty() {
                    tracing::debug!("No notes found");
                }
                state.send_modify(|state| {
                    state.notes = notes;
                    state.loading = false;
                });
            })
        };
        let on_error = {
            let state = Arc::clone(&self.state);
            let current = Arc::clone(&self.generation);
            let terminated = Arc::clone(&self.terminated);
            Box::new(move |error: crate::Error| {
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                terminated.store(true, Ordering::SeqCst);
                tracing::error!("Note subscription failed: {}", error);
                publish_failure(&state);
            })
        };

        match self.store.subscribe(query, on_data, on_error) {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(error) => {
                tracing::error!("Failed to open note subscription: {}", error);
                publish_failure(&self.state);
            }
        }
    }

    /// Release the open query, if any. Late pushes from it are ignored.
    pub fn deactivate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.filters = None;
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!("Unsubscribing from notes");
            subscription.unsubscribe();
        }
    }
}

impl Drop for NoteFeed {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl NoteFeed {
    /// Move the feed onto a worker task and return a handle to drive it.
    ///
    /// Must be called within a Tokio runtime. Activations and the final release
    /// run on the blocking pool, one at a time, in request order.
    pub fn spawn(self) -> FeedHandle {
        let state = self.watch();
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_feed(self, receiver));
        FeedHandle {
            commands,
            state,
            worker,
        }
    }
}

/// Non-blocking handle to a feed running on a worker task.
///
/// Dropping the handle releases the feed's subscription in the background.
pub struct FeedHandle {
    commands: mpsc::UnboundedSender<NoteFilters>,
    state: watch::Receiver<FeedState>,
    worker: JoinHandle<()>,
}

impl FeedHandle {
    /// Queue a filter change; identical filter sets are ignored by the worker
    pub fn set_filters(&self, filters: NoteFilters) {
        if self.commands.send(filters).is_err() {
            tracing::warn!("Note feed worker has stopped; filter change dropped");
        }
    }

    /// Observe state changes
    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Release the subscription and wait until the worker has finished
    pub async fn close(self) {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);
        if let Err(error) = worker.await {
            tracing::error!("Note feed worker failed: {}", error);
        }
    }
}

async fn run_feed(mut feed: NoteFeed, mut commands: mpsc::UnboundedReceiver<NoteFilters>) {
    while let Some(filters) = commands.recv().await {
        let task = tokio::task::spawn_blocking(move || {
            feed.set_filters(filters);
            feed
        });
        match task.await {
            Ok(next) => feed = next,
            Err(error) => {
                tracing::error!("Note feed activation failed: {}", error);
                return;
            }
        }
    }

    if let Err(error) = tokio::task::spawn_blocking(move || drop(feed)).await {
        tracing::error!("Note feed release failed: {}", error);
    }
}

fn publish_failure(state: &watch::Sender<FeedState>) {
    state.send_modify(|state| {
        state.loading = false;
        state.error = Some(LOAD_FAILED_MESSAGE.to_string());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticIdentity;
    use crate::models::NotePatch;
    use crate::query::FieldFilter;
    use crate::store::SqliteDocumentStore;
    use crate::testing::RecordingStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn signed_in() -> Arc<StaticIdentity> {
        Arc::new(StaticIdentity::new(Some("ada@example.com".into())))
    }

    fn note(title: &str) -> Note {
        Note::new("ada@example.com", Some(title.to_string()), Some("body".into()))
    }

    fn feed_over(store: &RecordingStore, identity: Arc<StaticIdentity>) -> NoteFeed {
        NoteFeed::new(Arc::new(store.clone()), identity)
    }

    #[test]
    fn test_starts_loading() {
        let store = RecordingStore::default();
        let feed = feed_over(&store, signed_in());
        assert_eq!(feed.snapshot().view(), BoardView::Loading);
    }

    #[test]
    fn test_signed_out_publishes_empty_without_subscribing() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, Arc::new(StaticIdentity::signed_out()));

        feed.activate(NoteFilters::none());

        let state = feed.snapshot();
        assert!(!state.loading);
        assert!(state.notes.is_empty());
        assert_eq!(state.view(), BoardView::Empty);
        assert_eq!(store.subscribe_calls(), 0);
        assert!(!feed.is_live());
    }

    #[test]
    fn test_query_scopes_to_user_and_filters() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        let filters = NoteFilters::new(vec![FieldFilter::eq("noteTitle", "Plans").unwrap()]);

        feed.activate(filters);

        let query = store.last_query().unwrap();
        assert_eq!(query.predicates().len(), 2);
        assert_eq!(query.predicates()[0].value, json!("ada@example.com"));
        assert_eq!(query.predicates()[1].field, "noteTitle");
    }

    #[test]
    fn test_snapshot_is_published_in_delivery_order() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());

        let delivered = vec![note("c"), note("a"), note("b")];
        store.push(&delivered);

        let state = feed.snapshot();
        assert!(!state.loading);
        assert_eq!(state.notes, delivered);
        assert_eq!(state.view(), BoardView::Populated(&delivered));
    }

    #[test]
    fn test_each_snapshot_replaces_the_list() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());

        store.push(&[note("a"), note("b")]);
        store.push(&[note("c")]);
        assert_eq!(feed.snapshot().notes.len(), 1);

        store.push(&[]);
        let state = feed.snapshot();
        assert!(state.notes.is_empty());
        assert!(!state.loading);
        assert_eq!(state.view(), BoardView::Empty);
    }

    #[test]
    fn test_subscription_error_is_generic_and_visible() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());

        store.fail("permission denied on notes");

        let state = feed.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(state.view(), BoardView::Error(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_subscription_error_ends_live_query() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());
        assert!(feed.is_live());

        store.fail("offline");
        assert!(!feed.is_live());

        feed.activate(NoteFilters::none());
        assert!(feed.is_live());
    }

    #[test]
    fn test_filter_change_swaps_exactly_one_subscription() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());

        assert!(feed.set_filters(NoteFilters::none()));
        assert_eq!(store.subscribe_calls(), 1);

        let filters = NoteFilters::new(vec![FieldFilter::eq("noteTitle", "x").unwrap()]);
        assert!(feed.set_filters(filters.clone()));
        assert_eq!(store.subscribe_calls(), 2);
        assert_eq!(store.unsubscribe_calls(), 1);
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.max_live(), 1);

        assert!(!feed.set_filters(filters));
        assert_eq!(store.subscribe_calls(), 2);
    }

    #[test]
    fn test_equal_contents_with_new_identity_resubscribes() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        let filter = FieldFilter::eq("noteTitle", "x").unwrap();

        feed.set_filters(NoteFilters::new(vec![filter.clone()]));
        feed.set_filters(NoteFilters::new(vec![filter]));

        assert_eq!(store.subscribe_calls(), 2);
        assert_eq!(store.max_live(), 1);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());
        assert_eq!(store.live_count(), 1);

        drop(feed);
        assert_eq!(store.live_count(), 0);
        assert_eq!(store.unsubscribe_calls(), 1);
    }

    #[test]
    fn test_resubscribe_clears_previous_error() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        feed.activate(NoteFilters::none());
        store.fail("offline");

        feed.activate(NoteFilters::none());
        assert_eq!(feed.snapshot().view(), BoardView::Loading);

        store.push(&[note("back")]);
        assert_eq!(feed.snapshot().error, None);
        assert_eq!(feed.snapshot().notes.len(), 1);
    }

    #[test]
    fn test_live_store_round_trip() {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        let existing = note("groceries");
        store.insert(&existing).unwrap();
        store
            .insert(&Note::new("bob@example.com", Some("not mine".into()), None))
            .unwrap();

        let mut feed = NoteFeed::new(store.clone(), signed_in());
        feed.activate(NoteFilters::none());
        assert_eq!(feed.snapshot().notes, vec![existing.clone()]);

        store
            .update(
                &existing.id,
                &NotePatch {
                    note_title: "shopping".into(),
                    note_content: "eggs".into(),
                },
            )
            .unwrap();
        let notes = feed.snapshot().notes;
        assert_eq!(notes[0].note_title.as_deref(), Some("shopping"));

        store.delete(&existing.id).unwrap();
        assert_eq!(feed.snapshot().view(), BoardView::Empty);

        feed.set_filters(NoteFilters::new(vec![FieldFilter::eq("noteTitle", "x").unwrap()]));
        assert_eq!(store.listener_count(), 1);
        drop(feed);
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_watchers_see_pushed_snapshots() {
        let store = RecordingStore::default();
        let mut feed = feed_over(&store, signed_in());
        let mut receiver = feed.watch();
        feed.activate(NoteFilters::none());

        store.push(&[note("a")]);

        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow_and_update().notes.len(), 1);
    }

    #[test]
    fn test_activation_is_not_held_up_by_slow_listener() {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        let existing = note("draft");
        store.insert(&existing).unwrap();

        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let mut calls = 0;
        let _slow = store
            .subscribe(
                NotesQuery::new("ada@example.com", &NoteFilters::none()),
                Box::new(move |_: Vec<Note>| {
                    calls += 1;
                    if calls > 1 {
                        entered_tx.send(()).unwrap();
                        std::thread::sleep(Duration::from_millis(400));
                    }
                }),
                Box::new(|_: crate::Error| {}),
            )
            .unwrap();

        let writer = {
            let store = Arc::clone(&store);
            let id = existing.id.clone();
            std::thread::spawn(move || {
                let patch = NotePatch {
                    note_title: "final".into(),
                    note_content: String::new(),
                };
                store.update(&id, &patch).unwrap();
            })
        };
        entered_rx.recv().unwrap();

        let mut feed = NoteFeed::new(store.clone(), signed_in());
        let started = Instant::now();
        feed.activate(NoteFilters::none());
        let waited = started.elapsed();

        assert!(waited < Duration::from_millis(200), "activation waited {waited:?}");
        let notes = feed.snapshot().notes;
        assert_eq!(notes[0].note_title.as_deref(), Some("final"));
        writer.join().unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_handle_applies_filters_in_order_and_releases_on_close() {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        store.insert(&note("groceries")).unwrap();
        store.insert(&note("gym")).unwrap();

        let handle = NoteFeed::new(store.clone(), signed_in()).spawn();
        let mut receiver = handle.watch();
        handle.set_filters(NoteFilters::none());
        handle.set_filters(NoteFilters::new(vec![FieldFilter::eq("noteTitle", "gym").unwrap()]));

        let notes = receiver
            .wait_for(|state| !state.loading && state.notes.len() == 1)
            .await
            .unwrap()
            .notes
            .clone();
        assert_eq!(notes[0].note_title.as_deref(), Some("gym"));
        assert_eq!(store.listener_count(), 1);

        handle.close().await;
        assert_eq!(store.listener_count(), 0);
    }
}

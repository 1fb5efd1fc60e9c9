//! Note store service for the desktop application

use std::sync::Arc;

use notewall_core::auth::{IdentityProvider, StaticIdentity};
use notewall_core::board::{self, EditBuffer};
use notewall_core::config::AppConfig;
use notewall_core::store::SqliteDocumentStore;
use notewall_core::{NoteFeed, NoteId};

/// Service for store operations
///
/// Writes run on the blocking pool, as do feed activations driven through
/// [`notewall_core::FeedHandle`], so the UI thread never waits on `SQLite`.
#[derive(Clone)]
pub struct NotesService {
    store: Arc<SqliteDocumentStore>,
    identity: Arc<StaticIdentity>,
}

impl PartialEq for NotesService {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && Arc::ptr_eq(&self.identity, &other.identity)
    }
}

impl NotesService {
    /// Open the configured store and sign in as the configured user
    pub fn open(config: &AppConfig) -> notewall_core::Result<Self> {
        let store = SqliteDocumentStore::open(&config.database_path)?;
        let identity = StaticIdentity::new(config.user_email.clone());
        match identity.current_user() {
            Some(user) => tracing::info!("Signed in as {}", user.email),
            None => tracing::info!("No signed-in user; the board will stay empty"),
        }

        Ok(Self {
            store: Arc::new(store),
            identity: Arc::new(identity),
        })
    }

    /// A new feed bound to this service's store and identity
    pub fn new_feed(&self) -> NoteFeed {
        NoteFeed::new(self.store.clone(), self.identity.clone())
    }

    /// Email of the signed-in user, if any
    pub fn signed_in_email(&self) -> Option<String> {
        self.identity.current_user().map(|user| user.email)
    }

    /// Save an edit buffer; the error message is meant for the edit dialog
    pub async fn save(&self, buffer: EditBuffer) -> Result<(), String> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || board::save_edit(store.as_ref(), &buffer))
            .await
            .map_err(|error| error.to_string())?
            .map_err(|error| error.to_string())
    }

    /// Delete a note; failures are only logged
    pub async fn delete(&self, id: NoteId) {
        let store = Arc::clone(&self.store);
        if let Err(error) =
            tokio::task::spawn_blocking(move || board::delete_note(store.as_ref(), &id)).await
        {
            tracing::error!("Delete task failed: {}", error);
        }
    }
}

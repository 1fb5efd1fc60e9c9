//! Note model
//!
//! A note is a document in the `notes` collection. The document body uses the
//! camelCase field names the collection was created with (`userEmail`,
//! `noteTitle`, `noteContent`); any other stored fields ride along in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Document field holding the owner's email
pub const OWNER_FIELD: &str = "userEmail";
/// Document field holding the optional title
pub const TITLE_FIELD: &str = "noteTitle";
/// Document field holding the optional body text
pub const CONTENT_FIELD: &str = "noteContent";

/// Opaque document identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh identifier (UUID v7, so ids sort by creation time)
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A note as delivered by a live query: its id plus every stored field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Owner key; immutable from the board
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_content: Option<String>,
    /// Stored fields this model does not name
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteBody {
    user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note_content: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Note {
    /// Create a note owned by `user_email` with a freshly generated id
    #[must_use]
    pub fn new(
        user_email: impl Into<String>,
        title: Option<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            id: NoteId::generate(),
            user_email: user_email.into(),
            note_title: title,
            note_content: content,
            extra: Map::new(),
        }
    }

    /// Build a note from a stored document body.
    ///
    /// Fails when the body is malformed (missing owner, non-string title, ...).
    pub fn from_document(id: NoteId, data: Map<String, Value>) -> Result<Self> {
        let body: NoteBody = serde_json::from_value(Value::Object(data))?;
        Ok(Self {
            id,
            user_email: body.user_email,
            note_title: body.note_title,
            note_content: body.note_content,
            extra: body.extra,
        })
    }

    /// The document body to store (everything except the id).
    ///
    /// Fails when `extra` carries a key that would shadow a named field.
    pub fn to_document(&self) -> Result<Map<String, Value>> {
        if let Some(field) = [OWNER_FIELD, TITLE_FIELD, CONTENT_FIELD]
            .into_iter()
            .find(|field| self.extra.contains_key(*field))
        {
            return Err(Error::InvalidInput(format!(
                "extra field `{field}` collides with a note field"
            )));
        }

        let body = NoteBody {
            user_email: self.user_email.clone(),
            note_title: self.note_title.clone(),
            note_content: self.note_content.clone(),
            extra: self.extra.clone(),
        };
        match serde_json::to_value(body)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::InvalidInput(format!(
                "note body serialized to a non-object: {other}"
            ))),
        }
    }

    /// Title to show on a card; blank titles are hidden
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        self.note_title.as_deref().filter(|title| !title.is_empty())
    }

    /// Body text to show on a card
    #[must_use]
    pub fn display_content(&self) -> &str {
        self.note_content.as_deref().unwrap_or("")
    }
}

/// Partial update applied by the edit dialog.
///
/// Carries exactly the title and content fields; owner and id are never part
/// of a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePatch {
    pub note_title: String,
    pub note_content: String,
}

impl NotePatch {
    /// The fields to merge into the stored document
    #[must_use]
    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(TITLE_FIELD.to_string(), Value::String(self.note_title.clone()));
        fields.insert(
            CONTENT_FIELD.to_string(),
            Value::String(self.note_content.clone()),
        );
        fields
    }
}

//! Live query construction
//!
//! A [`NotesQuery`] is the owner predicate followed by the caller's filters,
//! all ANDed. Filters are field predicates in the style of a hosted document
//! store: a field missing from a document never satisfies a predicate.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::OWNER_FIELD;

/// Upper sentinel used to turn a prefix into a half-open range
const PREFIX_SENTINEL: char = '\u{f8ff}';

/// Comparison applied by a [`FieldFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    /// SQL operator for this comparison
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "==",
            other => other.as_sql(),
        };
        f.write_str(symbol)
    }
}

/// A single `field <op> value` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    /// Build a predicate, validating the field name and value type.
    ///
    /// Field names are identifiers; values must be strings, numbers or bools.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Result<Self> {
        let field = field.into();
        if !field_name_pattern().is_match(&field) {
            return Err(Error::InvalidInput(format!("invalid field name: {field:?}")));
        }
        let value = value.into();
        if !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            return Err(Error::InvalidInput(format!(
                "filter value for {field} must be a string, number or bool"
            )));
        }
        Ok(Self { field, op, value })
    }

    /// Shorthand for an equality predicate
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Match string fields starting with `prefix` (`>= prefix` and `< prefix + U+F8FF`)
    pub fn prefix(field: impl Into<String>, prefix: &str) -> Result<[Self; 2]> {
        let field = field.into();
        let upper = format!("{prefix}{PREFIX_SENTINEL}");
        Ok([
            Self::new(field.clone(), FilterOp::Ge, prefix)?,
            Self::new(field, FilterOp::Lt, upper)?,
        ])
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

fn field_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"))
}

/// Caller-supplied filters, compared by identity.
///
/// Two `NoteFilters` are equal only when they share the same allocation, so a
/// board re-subscribes exactly when its caller hands it a new filter set, even
/// if the contents happen to match.
#[derive(Debug, Clone, Default)]
pub struct NoteFilters(Option<Arc<[FieldFilter]>>);

impl NoteFilters {
    /// No extra filters beyond the owner predicate
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn new(filters: Vec<FieldFilter>) -> Self {
        Self(Some(filters.into()))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FieldFilter] {
        self.0.as_deref().unwrap_or(&[])
    }
}

impl PartialEq for NoteFilters {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for NoteFilters {}

impl Hash for NoteFilters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0
            .as_ref()
            .map(|filters| Arc::as_ptr(filters).cast::<FieldFilter>() as usize)
            .hash(state);
    }
}

/// Live query over the notes collection
#[derive(Debug, Clone, PartialEq)]
pub struct NotesQuery {
    predicates: Vec<FieldFilter>,
}

impl NotesQuery {
    /// `userEmail == owner_email` ANDed with every caller filter, in order
    #[must_use]
    pub fn new(owner_email: &str, filters: &NoteFilters) -> Self {
        let mut predicates = Vec::with_capacity(filters.as_slice().len() + 1);
        predicates.push(FieldFilter {
            field: OWNER_FIELD.to_string(),
            op: FilterOp::Eq,
            value: Value::String(owner_email.to_string()),
        });
        predicates.extend(filters.as_slice().iter().cloned());
        Self { predicates }
    }

    /// All predicates, owner first
    #[must_use]
    pub fn predicates(&self) -> &[FieldFilter] {
        &self.predicates
    }
}

impl fmt::Display for NotesQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, predicate) in self.predicates.iter().enumerate() {
            if index > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_query_puts_owner_first() {
        let filters = NoteFilters::new(vec![FieldFilter::eq("noteTitle", "Plans").unwrap()]);
        let query = NotesQuery::new("ada@example.com", &filters);

        assert_eq!(query.predicates().len(), 2);
        assert_eq!(query.predicates()[0].field, OWNER_FIELD);
        assert_eq!(query.predicates()[0].value, json!("ada@example.com"));
        assert_eq!(query.predicates()[1].field, "noteTitle");
        assert_eq!(
            query.to_string(),
            r#"userEmail == "ada@example.com" AND noteTitle == "Plans""#
        );
    }

    #[test]
    fn test_filters_compare_by_identity() {
        let filter = FieldFilter::eq("noteTitle", "x").unwrap();
        let a = NoteFilters::new(vec![filter.clone()]);
        let b = NoteFilters::new(vec![filter]);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(NoteFilters::none(), NoteFilters::default());
        assert_ne!(NoteFilters::none(), a);
    }

    #[test]
    fn test_rejects_bad_field_names() {
        assert!(FieldFilter::eq("note title", "x").is_err());
        assert!(FieldFilter::eq("1st", "x").is_err());
        assert!(FieldFilter::eq("a')--", "x").is_err());
        assert!(FieldFilter::eq("_private", "x").is_ok());
    }

    #[test]
    fn test_rejects_non_scalar_values() {
        assert!(FieldFilter::eq("tags", json!(["a"])).is_err());
        assert!(FieldFilter::eq("tags", Value::Null).is_err());
        assert!(FieldFilter::eq("count", 3).is_ok());
    }

    #[test]
    fn test_prefix_expands_to_range() {
        let [lower, upper] = FieldFilter::prefix("noteTitle", "gro").unwrap();
        assert_eq!(lower.op, FilterOp::Ge);
        assert_eq!(lower.value, json!("gro"));
        assert_eq!(upper.op, FilterOp::Lt);
        assert_eq!(upper.value, json!("gro\u{f8ff}"));
    }
}

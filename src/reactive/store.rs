//! Typed attribute storage with change batching.
//!
//! A [`StateStore`] is the only mutable state a widget owns. Attributes are
//! declared up front in an [`AttrSchema`]; every write is validated against
//! the declared type, so a typo'd attribute name or a wrong-typed value is a
//! programming error surfaced immediately instead of a silently absorbed
//! property write.

use std::collections::BTreeMap;
use std::fmt;

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Number,
    Text,
    Bool,
    Records,
}

/// A mapped record: one simplified item projected out of a raw API payload.
///
/// Field names are chosen by the widget's payload mapper. Records carry no
/// identity; the whole list is discarded and rebuilt on every successful
/// fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(BTreeMap<String, AttrValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: AttrValue) {
        self.0.insert(field.into(), value);
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: AttrValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.0.get(field)
    }

    /// Text field accessor; `None` if absent or not text.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(AttrValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field) {
            Some(AttrValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Current value of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Records(Vec<Record>),
}

impl AttrValue {
    pub const fn attr_type(&self) -> AttrType {
        match self {
            Self::Number(_) => AttrType::Number,
            Self::Text(_) => AttrType::Text,
            Self::Bool(_) => AttrType::Bool,
            Self::Records(_) => AttrType::Records,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_records(&self) -> Option<&Vec<Record>> {
        match self {
            Self::Records(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Records(r) => write!(f, "[{} records]", r.len()),
        }
    }
}

/// Store access errors. Both variants indicate a defect in the calling code,
/// not bad external data, and must not be swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    #[error("attribute `{name}` is declared {expected:?} but was assigned {actual:?}")]
    TypeMismatch {
        name: String,
        expected: AttrType,
        actual: AttrType,
    },
}

/// Fixed mapping from attribute name to declared type.
#[derive(Debug, Clone, Default)]
pub struct AttrSchema {
    types: BTreeMap<String, AttrType>,
}

impl AttrSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, ty: AttrType) -> Self {
        self.types.insert(name.into(), ty);
        self
    }

    #[must_use]
    pub fn number(self, name: impl Into<String>) -> Self {
        self.attr(name, AttrType::Number)
    }

    #[must_use]
    pub fn text(self, name: impl Into<String>) -> Self {
        self.attr(name, AttrType::Text)
    }

    #[must_use]
    pub fn bool(self, name: impl Into<String>) -> Self {
        self.attr(name, AttrType::Bool)
    }

    #[must_use]
    pub fn records(self, name: impl Into<String>) -> Self {
        self.attr(name, AttrType::Records)
    }

    fn default_value(ty: AttrType) -> AttrValue {
        match ty {
            AttrType::Number => AttrValue::Number(0.0),
            AttrType::Text => AttrValue::Text(String::new()),
            AttrType::Bool => AttrValue::Bool(false),
            AttrType::Records => AttrValue::Records(Vec::new()),
        }
    }
}

/// One attribute mutation inside a batch: previous and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub old: AttrValue,
    pub new: AttrValue,
}

/// All mutations of one batch, keyed by attribute name.
pub type ChangeSet = BTreeMap<String, Change>;

/// Named attribute values for one widget instance.
///
/// Single-threaded cooperative access only: the store lives on the main
/// loop and is never shared across tasks. Async fetches work on a snapshot
/// and report back through a channel.
#[derive(Debug)]
pub struct StateStore {
    schema: AttrSchema,
    values: BTreeMap<String, AttrValue>,
    pending: ChangeSet,
}

impl StateStore {
    /// Create a store with every declared attribute at its type's default.
    pub fn new(schema: AttrSchema) -> Self {
        let values = schema
            .types
            .iter()
            .map(|(name, ty)| (name.clone(), AttrSchema::default_value(*ty)))
            .collect();
        Self {
            schema,
            values,
            pending: ChangeSet::new(),
        }
    }

    /// Read an attribute.
    ///
    /// # Errors
    /// [`StoreError::UnknownAttribute`] if the name is not declared.
    pub fn get(&self, name: &str) -> Result<&AttrValue, StoreError> {
        self.values
            .get(name)
            .ok_or_else(|| StoreError::UnknownAttribute(name.to_string()))
    }

    /// Write an attribute, recording the previous value for the current
    /// mutation batch. The new value replaces the old entirely.
    ///
    /// # Errors
    /// [`StoreError::UnknownAttribute`] for an undeclared name,
    /// [`StoreError::TypeMismatch`] if the value does not match the
    /// declared type.
    pub fn set(&mut self, name: &str, value: AttrValue) -> Result<(), StoreError> {
        let Some(expected) = self.schema.types.get(name).copied() else {
            return Err(StoreError::UnknownAttribute(name.to_string()));
        };
        if value.attr_type() != expected {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual: value.attr_type(),
            });
        }

        let old = self
            .values
            .insert(name.to_string(), value.clone())
            .unwrap_or_else(|| AttrSchema::default_value(expected));

        // Several writes to one attribute within a batch collapse into a
        // single change entry keeping the oldest previous value.
        self.pending
            .entry(name.to_string())
            .and_modify(|c| c.new = value.clone())
            .or_insert(Change { old, new: value });
        Ok(())
    }

    /// Seed an initial value without recording a change. Only meaningful
    /// before the widget mounts.
    ///
    /// # Errors
    /// Same validation as [`Self::set`].
    pub fn seed(&mut self, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.set(name, value)?;
        self.pending.remove(name);
        Ok(())
    }

    /// Drain the current mutation batch.
    pub fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }

    /// Clone of all current attribute values.
    pub fn snapshot(&self) -> BTreeMap<String, AttrValue> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StateStore {
        StateStore::new(
            AttrSchema::new()
                .text("query")
                .number("page")
                .records("images"),
        )
    }

    #[test]
    fn test_declared_attributes_start_at_defaults() {
        let store = store();
        assert_eq!(store.get("query"), Ok(&AttrValue::Text(String::new())));
        assert_eq!(store.get("page"), Ok(&AttrValue::Number(0.0)));
        assert_eq!(store.get("images"), Ok(&AttrValue::Records(vec![])));
    }

    #[test]
    fn test_set_unknown_attribute_fails() {
        let mut store = store();
        assert_eq!(
            store.set("pge", AttrValue::Number(2.0)),
            Err(StoreError::UnknownAttribute("pge".to_string()))
        );
    }

    #[test]
    fn test_set_wrong_type_fails() {
        let mut store = store();
        let err = store.set("page", AttrValue::text("two")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch {
                expected: AttrType::Number,
                actual: AttrType::Text,
                ..
            }
        ));
    }

    #[test]
    fn test_changes_record_old_and_new() {
        let mut store = store();
        store.set("page", AttrValue::Number(2.0)).unwrap();

        let changes = store.take_changes();
        assert_eq!(
            changes.get("page"),
            Some(&Change {
                old: AttrValue::Number(0.0),
                new: AttrValue::Number(2.0),
            })
        );
        // Batch is drained.
        assert!(store.take_changes().is_empty());
    }

    #[test]
    fn test_repeated_writes_collapse_keeping_oldest_previous_value() {
        let mut store = store();
        store.set("page", AttrValue::Number(2.0)).unwrap();
        store.set("page", AttrValue::Number(3.0)).unwrap();

        let changes = store.take_changes();
        assert_eq!(
            changes.get("page"),
            Some(&Change {
                old: AttrValue::Number(0.0),
                new: AttrValue::Number(3.0),
            })
        );
    }

    #[test]
    fn test_seed_does_not_mark_changed() {
        let mut store = store();
        store.seed("query", AttrValue::text("moon land")).unwrap();
        assert!(store.take_changes().is_empty());
        assert_eq!(store.get("query").unwrap().as_text(), Some("moon land"));
    }

    #[test]
    fn test_record_field_access() {
        let record = Record::new()
            .with("title", AttrValue::text("X"))
            .with("score", AttrValue::Number(1.5));
        assert_eq!(record.text("title"), Some("X"));
        assert_eq!(record.number("score"), Some(1.5));
        assert_eq!(record.text("missing"), None);
        assert_eq!(record.text("score"), None);
    }
}

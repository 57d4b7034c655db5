//! The canonical record exchanged between store adapters.

use crate::timestamp::LogicalTimestamp;
use crate::values::{CanonicalValue, ValueKind};
use std::collections::btree_map::{self, BTreeMap};
use thiserror::Error;

/// Name of the cross-store join key.
pub const ID_FIELD: &str = "id";

/// Name of the version / conflict clock field.
pub const TIMESTAMP_FIELD: &str = "tmstmp";

/// Reasons a set of fields cannot form a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}, got {actual}")]
    WrongKind {
        field: &'static str,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("field '{0}' appears more than once")]
    DuplicateField(String),
}

/// An immutable mapping from field name to canonical value.
///
/// A record always has exactly one `id` of kind
/// [`CanonicalValue::Identifier`] and exactly one `tmstmp` of kind
/// [`CanonicalValue::Timestamp`]. Field order is irrelevant; iteration is by
/// field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, CanonicalValue>,
}

impl Record {
    /// Builds a record from name/value pairs, rejecting duplicate names.
    pub fn try_from_fields<I, K>(fields: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, CanonicalValue)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, value) in fields {
            match map.entry(name.into()) {
                btree_map::Entry::Occupied(entry) => {
                    return Err(RecordError::DuplicateField(entry.key().clone()));
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Self::validate(&map)?;
        Ok(Self { fields: map })
    }

    /// Starts a record with its two mandatory fields.
    pub fn builder(id: impl Into<String>, tmstmp: LogicalTimestamp) -> RecordBuilder {
        RecordBuilder::new(id, tmstmp)
    }

    fn validate(fields: &BTreeMap<String, CanonicalValue>) -> Result<(), RecordError> {
        check_kind(fields, ID_FIELD, ValueKind::Identifier)?;
        check_kind(fields, TIMESTAMP_FIELD, ValueKind::Timestamp)?;
        Ok(())
    }

    pub fn id(&self) -> &str {
        match self.fields.get(ID_FIELD) {
            Some(CanonicalValue::Identifier(id)) => id,
            _ => unreachable!("record invariant: id is an identifier"),
        }
    }

    pub fn tmstmp(&self) -> LogicalTimestamp {
        match self.fields.get(TIMESTAMP_FIELD) {
            Some(CanonicalValue::Timestamp(ts)) => *ts,
            _ => unreachable!("record invariant: tmstmp is a timestamp"),
        }
    }

    pub fn get(&self, field: &str) -> Option<&CanonicalValue> {
        self.fields.get(field)
    }

    /// Iterates fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &CanonicalValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn check_kind(
    fields: &BTreeMap<String, CanonicalValue>,
    field: &'static str,
    expected: ValueKind,
) -> Result<(), RecordError> {
    let value = fields.get(field).ok_or(RecordError::MissingField(field))?;
    if value.kind() != expected {
        return Err(RecordError::WrongKind {
            field,
            expected,
            actual: value.kind(),
        });
    }
    Ok(())
}

/// Incremental construction of a [`Record`].
///
/// Later values for the same name replace earlier ones; the mandatory
/// fields cannot be overwritten with a value of another kind.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    fields: BTreeMap<String, CanonicalValue>,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>, tmstmp: LogicalTimestamp) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), CanonicalValue::Identifier(id.into()));
        fields.insert(TIMESTAMP_FIELD.to_string(), CanonicalValue::Timestamp(tmstmp));
        Self { fields }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<CanonicalValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(name, CanonicalValue::Text(value.into()))
    }

    pub fn build(self) -> Result<Record, RecordError> {
        Record::validate(&self.fields)?;
        Ok(Record {
            fields: self.fields,
        })
    }
}

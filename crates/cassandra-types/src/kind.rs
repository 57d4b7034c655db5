//! Column types relevant to conversion.

use scylla::cluster::metadata::{ColumnType, NativeType};

/// The subset of CQL column types the converter distinguishes.
///
/// Anything not listed here is written as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CqlKind {
    Uuid,
    Timeuuid,
    Timestamp,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Counter,
    Float,
    Double,
    Boolean,
    Text,
    Other(String),
}

impl CqlKind {
    /// Whether the column can serve as the `tmstmp` version column.
    pub fn is_version_column(&self) -> bool {
        matches!(self, CqlKind::Timeuuid | CqlKind::Timestamp)
    }
}

impl From<&ColumnType<'_>> for CqlKind {
    fn from(typ: &ColumnType<'_>) -> Self {
        match typ {
            ColumnType::Native(native) => match native {
                NativeType::Uuid => CqlKind::Uuid,
                NativeType::Timeuuid => CqlKind::Timeuuid,
                NativeType::Timestamp => CqlKind::Timestamp,
                NativeType::TinyInt => CqlKind::TinyInt,
                NativeType::SmallInt => CqlKind::SmallInt,
                NativeType::Int => CqlKind::Int,
                NativeType::BigInt => CqlKind::BigInt,
                NativeType::Counter => CqlKind::Counter,
                NativeType::Float => CqlKind::Float,
                NativeType::Double => CqlKind::Double,
                NativeType::Boolean => CqlKind::Boolean,
                NativeType::Text | NativeType::Ascii => CqlKind::Text,
                other => CqlKind::Other(format!("{other:?}")),
            },
            other => CqlKind::Other(format!("{other:?}")),
        }
    }
}

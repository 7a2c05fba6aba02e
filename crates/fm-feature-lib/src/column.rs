//! Per-vertex data columns
//!
//! A [`DataColumn`] stores one value per feature vertex. Columns are homogeneous:
//! every value has the type of the column default.

use crate::{DataError, Result};
use std::fmt;

/// Value types a data column can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    Double,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Double => f.write_str("double"),
            ColumnType::Text => f.write_str("text"),
        }
    }
}

/// A single cell value
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnValue {
    Double(f64),
    Text(String),
}

impl ColumnValue {
    /// Type tag of this value
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValue::Double(_) => ColumnType::Double,
            ColumnValue::Text(_) => ColumnType::Text,
        }
    }

    /// The numeric value, if this is a `Double`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Double(v) => Some(*v),
            ColumnValue::Text(_) => None,
        }
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Double(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

/// Typed storage, one variant per supported value type
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum ColumnData {
    Double { default: f64, values: Vec<f64> },
    Text { default: String, values: Vec<String> },
}

/// Named per-vertex attribute list with a default value and an active flag
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataColumn {
    name: String,
    is_active: bool,
    data: ColumnData,
}

impl DataColumn {
    /// Create an empty, active numeric column
    pub fn double(name: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            data: ColumnData::Double {
                default,
                values: Vec::new(),
            },
        }
    }

    /// Create an empty, active text column
    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_active: true,
            data: ColumnData::Text {
                default: default.into(),
                values: Vec::new(),
            },
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn column_type(&self) -> ColumnType {
        match self.data {
            ColumnData::Double { .. } => ColumnType::Double,
            ColumnData::Text { .. } => ColumnType::Text,
        }
    }

    pub fn default_value(&self) -> ColumnValue {
        match &self.data {
            ColumnData::Double { default, .. } => ColumnValue::Double(*default),
            ColumnData::Text { default, .. } => ColumnValue::Text(default.clone()),
        }
    }

    /// Number of values currently stored
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Double { values, .. } => values.len(),
            ColumnData::Text { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, if in range
    pub fn value(&self, index: usize) -> Option<ColumnValue> {
        match &self.data {
            ColumnData::Double { values, .. } => values.get(index).copied().map(ColumnValue::Double),
            ColumnData::Text { values, .. } => values.get(index).cloned().map(ColumnValue::Text),
        }
    }

    /// All values of a numeric column
    pub fn doubles(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Double { values, .. } => Some(values),
            ColumnData::Text { .. } => None,
        }
    }

    /// All values of a text column
    pub fn texts(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Text { values, .. } => Some(values),
            ColumnData::Double { .. } => None,
        }
    }

    /// Overwrite the value at `index`
    ///
    /// The column length is owned by the feature geometry, so writing past the end is
    /// an error rather than a resize.
    pub fn set_value(&mut self, index: usize, value: impl Into<ColumnValue>) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(DataError::IndexOutOfRange {
                column: self.name.clone(),
                index,
                len,
            });
        }

        let expected = self.column_type();
        match (&mut self.data, value.into()) {
            (ColumnData::Double { values, .. }, ColumnValue::Double(v)) => values[index] = v,
            (ColumnData::Text { values, .. }, ColumnValue::Text(v)) => values[index] = v,
            (_, other) => {
                return Err(DataError::TypeMismatch {
                    column: self.name.clone(),
                    expected,
                    found: other.column_type(),
                });
            }
        }
        Ok(())
    }

    /// Copy `source` positionally into a numeric column
    ///
    /// Values beyond the column length are ignored; positions without a source value
    /// keep what they had. Returns the number of values copied.
    pub fn load_doubles(&mut self, source: &[f64]) -> Result<usize> {
        match &mut self.data {
            ColumnData::Double { values, .. } => {
                let count = source.len().min(values.len());
                values[..count].copy_from_slice(&source[..count]);
                Ok(count)
            }
            ColumnData::Text { .. } => Err(DataError::TypeMismatch {
                column: self.name.clone(),
                expected: ColumnType::Text,
                found: ColumnType::Double,
            }),
        }
    }

    /// Replace all values with `len` copies of the default
    pub(crate) fn fill_default(&mut self, len: usize) {
        match &mut self.data {
            ColumnData::Double { default, values } => {
                values.clear();
                values.resize(len, *default);
            }
            ColumnData::Text { default, values } => {
                values.clear();
                values.resize(len, default.clone());
            }
        }
    }

    /// Rebuild the values at `new_len`, moving old value `i` to `mapping[i]`
    pub(crate) fn remap(&mut self, mapping: &[Option<usize>], new_len: usize) {
        match &mut self.data {
            ColumnData::Double { default, values } => {
                *values = remap_values(values, mapping, new_len, default);
            }
            ColumnData::Text { default, values } => {
                *values = remap_values(values, mapping, new_len, default);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        match &mut self.data {
            ColumnData::Double { values, .. } => values.clear(),
            ColumnData::Text { values, .. } => values.clear(),
        }
    }
}

/// Default-filled list of `new_len` with old values copied to their mapped targets
///
/// When several old indices map to the same target, the highest old index wins.
fn remap_values<T: Clone>(
    old: &[T],
    mapping: &[Option<usize>],
    new_len: usize,
    default: &T,
) -> Vec<T> {
    let mut values = vec![default.clone(); new_len];
    for (value, target) in old.iter().zip(mapping) {
        if let Some(target) = target.filter(|&t| t < new_len) {
            values[target] = value.clone();
        }
    }
    values
}

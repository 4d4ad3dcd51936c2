//! Typed columns
//!
//! A [`Column`] is a named, homogeneous array. Fixed-width element types
//! (`Float64`, `Int64`, `Bool`, `Text`) are *portable*: they can be moved
//! between ranks by the collective layer. `Variant` columns hold dynamically
//! typed [`Value`] cells and must be normalized to `Text` first.
//!
//! Text columns carry a width, the maximum number of characters in any
//! element. Concatenating two text columns widens to the larger width.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Element type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit float
    Float64,
    /// 64-bit signed integer
    Int64,
    /// Boolean
    Bool,
    /// Fixed-width UTF-8 text; `width` is measured in characters
    Text {
        /// Maximum character count of any element
        width: usize,
    },
    /// Dynamically typed cells
    Variant,
}

impl DataType {
    /// True for fixed-width types the collective layer can move
    pub fn is_portable(&self) -> bool {
        !matches!(self, DataType::Variant)
    }

    /// Same element kind, ignoring text width
    pub fn same_kind(&self, other: &DataType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Short name for messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataType::Float64 => "float64",
            DataType::Int64 => "int64",
            DataType::Bool => "bool",
            DataType::Text { .. } => "text",
            DataType::Variant => "variant",
        }
    }
}

/// Fixed-width text storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TextColumnRepr")]
pub struct TextColumn {
    width: usize,
    values: Vec<String>,
}

#[derive(Deserialize)]
struct TextColumnRepr {
    width: usize,
    values: Vec<String>,
}

impl TryFrom<TextColumnRepr> for TextColumn {
    type Error = Error;

    fn try_from(repr: TextColumnRepr) -> Result<Self> {
        TextColumn::with_width(repr.width, repr.values)
    }
}

impl TextColumn {
    /// Build a text column whose width is the longest element
    pub fn new(values: Vec<String>) -> Self {
        let width = values.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        Self { width, values }
    }

    /// Build a text column with an explicit width
    ///
    /// Fails if any element is longer than `width` characters.
    pub fn with_width(width: usize, values: Vec<String>) -> Result<Self> {
        if let Some(long) = values.iter().find(|s| s.chars().count() > width) {
            return Err(Error::invalid_input(format!(
                "text value '{}' exceeds column width {}",
                long, width
            )));
        }
        Ok(Self { width, values })
    }

    /// Character width of the column
    pub fn width(&self) -> usize {
        self.width
    }

    /// Element values
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// 64-bit floats
    Float64(Vec<f64>),
    /// 64-bit signed integers
    Int64(Vec<i64>),
    /// Booleans
    Bool(Vec<bool>),
    /// Fixed-width text
    Text(TextColumn),
    /// Dynamically typed cells
    Variant(Vec<Value>),
}

impl ColumnData {
    /// Build an empty column of the given type
    pub fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Float64 => ColumnData::Float64(Vec::new()),
            DataType::Int64 => ColumnData::Int64(Vec::new()),
            DataType::Bool => ColumnData::Bool(Vec::new()),
            DataType::Text { width } => ColumnData::Text(TextColumn {
                width,
                values: Vec::new(),
            }),
            DataType::Variant => ColumnData::Variant(Vec::new()),
        }
    }

    /// Build a text column from string slices
    pub fn text<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        ColumnData::Text(TextColumn::new(values.into_iter().map(Into::into).collect()))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float64(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(t) => t.len(),
            ColumnData::Variant(v) => v.len(),
        }
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Bool(_) => DataType::Bool,
            ColumnData::Text(t) => DataType::Text { width: t.width },
            ColumnData::Variant(_) => DataType::Variant,
        }
    }

    /// Copy out a contiguous range of elements
    ///
    /// Text width is preserved so every slice of a column keeps the same type.
    pub fn slice(&self, range: Range<usize>) -> ColumnData {
        match self {
            ColumnData::Float64(v) => ColumnData::Float64(v[range].to_vec()),
            ColumnData::Int64(v) => ColumnData::Int64(v[range].to_vec()),
            ColumnData::Bool(v) => ColumnData::Bool(v[range].to_vec()),
            ColumnData::Text(t) => ColumnData::Text(TextColumn {
                width: t.width,
                values: t.values[range].to_vec(),
            }),
            ColumnData::Variant(v) => ColumnData::Variant(v[range].to_vec()),
        }
    }

    /// Copy out the elements at `indices`, in that order
    ///
    /// Panics if an index is out of bounds.
    pub fn take(&self, indices: &[usize]) -> ColumnData {
        fn pick<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| v[i].clone()).collect()
        }
        match self {
            ColumnData::Float64(v) => ColumnData::Float64(pick(v, indices)),
            ColumnData::Int64(v) => ColumnData::Int64(pick(v, indices)),
            ColumnData::Bool(v) => ColumnData::Bool(pick(v, indices)),
            ColumnData::Text(t) => ColumnData::Text(TextColumn {
                width: t.width,
                values: pick(&t.values, indices),
            }),
            ColumnData::Variant(v) => ColumnData::Variant(pick(v, indices)),
        }
    }

    /// Append another column of the same kind
    ///
    /// Text columns widen to the larger of the two widths.
    pub fn append(&mut self, other: &ColumnData) -> Result<()> {
        match (self, other) {
            (ColumnData::Float64(a), ColumnData::Float64(b)) => a.extend_from_slice(b),
            (ColumnData::Int64(a), ColumnData::Int64(b)) => a.extend_from_slice(b),
            (ColumnData::Bool(a), ColumnData::Bool(b)) => a.extend_from_slice(b),
            (ColumnData::Text(a), ColumnData::Text(b)) => {
                a.width = a.width.max(b.width);
                a.values.extend_from_slice(&b.values);
            }
            (ColumnData::Variant(a), ColumnData::Variant(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(Error::schema_mismatch(format!(
                    "cannot append {} column to {} column",
                    b.data_type().kind_name(),
                    a.data_type().kind_name()
                )))
            }
        }
        Ok(())
    }

    /// Replace variant cells with their fixed-width text rendering
    ///
    /// Portable columns are returned unchanged.
    pub fn normalized(self) -> ColumnData {
        match self {
            ColumnData::Variant(cells) => {
                ColumnData::Text(TextColumn::new(cells.iter().map(Value::render).collect()))
            }
            other => other,
        }
    }

    /// Numeric view as f64, if the column is numeric
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            ColumnData::Float64(v) => Some(v.clone()),
            ColumnData::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            _ => None,
        }
    }

    /// Borrow as f64 slice if this is a Float64 column
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow text elements if this is a Text column
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ColumnData::Text(t) => Some(t.values()),
            _ => None,
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column storage
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Consume the column, returning its storage
    pub fn into_data(self) -> ColumnData {
        self.data
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element type
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub(crate) fn append(&mut self, other: &ColumnData) -> Result<()> {
        self.data.append(other)
    }

    pub(crate) fn map_data(self, f: impl FnOnce(ColumnData) -> ColumnData) -> Column {
        Column {
            name: self.name,
            data: f(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_is_longest_element() {
        let t = TextColumn::new(vec!["centrals".into(), "satellites".into()]);
        assert_eq!(t.width(), 10);
    }

    #[test]
    fn test_text_with_width_rejects_overflow() {
        assert!(TextColumn::with_width(3, vec!["abcd".into()]).is_err());
        assert!(TextColumn::with_width(4, vec!["abcd".into()]).is_ok());
    }

    #[test]
    fn test_decoded_text_width_is_checked() {
        let ok: TextColumn = serde_json::from_str(r#"{"width":4,"values":["abcd"]}"#).unwrap();
        assert_eq!(ok.width(), 4);
        let err = serde_json::from_str::<TextColumn>(r#"{"width":2,"values":["abcd"]}"#);
        assert!(err.unwrap_err().to_string().contains("exceeds column width 2"));
    }

    #[test]
    fn test_append_widens_text() {
        let mut a = ColumnData::text(["ab"]);
        a.append(&ColumnData::text(["abcdef"])).unwrap();
        assert_eq!(a.data_type(), DataType::Text { width: 6 });
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_append_kind_mismatch() {
        let mut a = ColumnData::Float64(vec![1.0]);
        let err = a.append(&ColumnData::Int64(vec![1])).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_slice_keeps_text_width() {
        let t = ColumnData::text(["a", "abcdef", "b"]);
        let s = t.slice(2..3);
        assert_eq!(s.data_type(), DataType::Text { width: 6 });
        assert_eq!(s.as_text().unwrap(), &["b".to_string()]);
    }

    #[test]
    fn test_take_reorders() {
        let c = ColumnData::Int64(vec![10, 20, 30]);
        assert_eq!(c.take(&[2, 0, 0]), ColumnData::Int64(vec![30, 10, 10]));
    }

    #[test]
    fn test_normalized_variant_becomes_text() {
        let c = ColumnData::Variant(vec![Value::from("centrals"), Value::Int(3)]);
        let n = c.normalized();
        assert!(n.data_type().is_portable());
        assert_eq!(n.as_text().unwrap(), &["centrals".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_to_f64_numeric_only() {
        assert_eq!(ColumnData::Int64(vec![1, 2]).to_f64(), Some(vec![1.0, 2.0]));
        assert_eq!(ColumnData::text(["a"]).to_f64(), None);
    }

    #[test]
    fn test_empty_of_type() {
        let c = ColumnData::empty(DataType::Text { width: 4 });
        assert!(c.is_empty());
        assert_eq!(c.data_type(), DataType::Text { width: 4 });
    }
}

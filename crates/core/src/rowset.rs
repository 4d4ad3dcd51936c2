//! Column-oriented row sets
//!
//! A [`RowSet`] is the unit the collective layer moves between ranks: an
//! ordered list of uniquely named columns that all have the same length.
//! The row count may be zero. A row set with no columns has zero rows.
//!
//! ## Invariants
//!
//! - All columns have identical length
//! - Column names are unique
//!
//! Both are enforced by [`RowSet::new`] and by deserialization, so a row set
//! received off the wire is as trustworthy as one built locally.

use crate::column::{Column, ColumnData, DataType};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// One named, typed slot in a [`Schema`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name
    pub name: String,
    /// Element type
    pub data_type: DataType,
}

/// Ordered column layout of a row set
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Create a schema from fields
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Fields in column order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Same names in the same order with the same element kinds.
    /// Text widths may differ.
    pub fn is_compatible(&self, other: &Schema) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.data_type.same_kind(&b.data_type))
    }
}

/// Column-oriented table held by one rank
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct RowSet {
    columns: Vec<Column>,
}

impl TryFrom<Vec<Column>> for RowSet {
    type Error = Error;

    fn try_from(columns: Vec<Column>) -> Result<Self> {
        RowSet::new(columns)
    }
}

impl From<RowSet> for Vec<Column> {
    fn from(rows: RowSet) -> Self {
        rows.columns
    }
}

impl RowSet {
    /// Build a row set, checking the length and uniqueness invariants
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(Error::schema_mismatch(format!(
                    "duplicate column '{}'",
                    column.name()
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(Error::schema_mismatch(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name(),
                    bad.len(),
                    expected
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Row set with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-row row set with the given layout
    pub fn with_schema(schema: &Schema) -> Self {
        Self {
            columns: schema
                .fields()
                .iter()
                .map(|f| Column::new(f.name.clone(), ColumnData::empty(f.data_type)))
                .collect(),
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// True if a column with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Layout of this row set
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Field {
                    name: c.name().to_string(),
                    data_type: c.data_type(),
                })
                .collect(),
        )
    }

    /// Append a column; its length must match unless the set has no columns yet
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.contains(column.name()) {
            return Err(Error::schema_mismatch(format!(
                "duplicate column '{}'",
                column.name()
            )));
        }
        if !self.columns.is_empty() && column.len() != self.num_rows() {
            return Err(Error::schema_mismatch(format!(
                "column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                self.num_rows()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove and return a column
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name() == name)?;
        Some(self.columns.remove(idx))
    }

    /// Copy out a contiguous block of rows
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> RowSet {
        RowSet {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name(), c.data().slice(range.clone())))
                .collect(),
        }
    }

    /// Copy out the rows at `indices`, in that order
    ///
    /// Panics if an index is out of bounds.
    pub fn take(&self, indices: &[usize]) -> RowSet {
        RowSet {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name(), c.data().take(indices)))
                .collect(),
        }
    }

    /// Concatenate row sets in order
    ///
    /// Parts with no columns contribute nothing and are skipped, so a rank
    /// that never received a schema does not break the concatenation. All
    /// remaining parts must have compatible schemas.
    pub fn concat(parts: impl IntoIterator<Item = RowSet>) -> Result<RowSet> {
        let mut out: Option<RowSet> = None;
        for part in parts {
            if part.num_columns() == 0 {
                continue;
            }
            match out.as_mut() {
                None => out = Some(part),
                Some(acc) => {
                    if !acc.schema().is_compatible(&part.schema()) {
                        return Err(Error::schema_mismatch(format!(
                            "cannot concatenate columns {:?} with {:?}",
                            acc.column_names(),
                            part.column_names()
                        )));
                    }
                    for (dst, src) in acc.columns.iter_mut().zip(&part.columns) {
                        dst.append(src.data())?;
                    }
                }
            }
        }
        Ok(out.unwrap_or_default())
    }

    /// True if every column has a portable element type
    pub fn is_portable(&self) -> bool {
        self.columns.iter().all(|c| c.data_type().is_portable())
    }

    /// Names of columns holding variant cells
    pub fn variant_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.data_type().is_portable())
            .map(Column::name)
            .collect()
    }

    /// Convert every variant column to fixed-width text
    pub fn normalize_variants(self) -> RowSet {
        RowSet {
            columns: self
                .columns
                .into_iter()
                .map(|c| c.map_data(ColumnData::normalized))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn xyz() -> RowSet {
        RowSet::new(vec![
            Column::new("x", ColumnData::Float64(vec![1.0, 2.0, 3.0])),
            Column::new("id", ColumnData::Int64(vec![7, 8, 9])),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = RowSet::new(vec![
            Column::new("x", ColumnData::Float64(vec![1.0, 2.0])),
            Column::new("y", ColumnData::Float64(vec![1.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = RowSet::new(vec![
            Column::new("x", ColumnData::Float64(vec![1.0])),
            Column::new("x", ColumnData::Float64(vec![2.0])),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column 'x'"));
    }

    #[test]
    fn test_empty_has_zero_rows() {
        let rows = RowSet::empty();
        assert_eq!(rows.num_rows(), 0);
        assert_eq!(rows.num_columns(), 0);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_with_schema_keeps_layout() {
        let rows = xyz();
        let empty = RowSet::with_schema(&rows.schema());
        assert_eq!(empty.num_rows(), 0);
        assert_eq!(empty.schema(), rows.schema());
    }

    #[test]
    fn test_slice_and_concat_restore_order() {
        let rows = xyz();
        let parts = vec![rows.slice(0..1), rows.slice(1..1), rows.slice(1..3)];
        let back = RowSet::concat(parts).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_concat_skips_columnless_parts() {
        let rows = xyz();
        let back = RowSet::concat(vec![RowSet::empty(), rows.clone(), RowSet::empty()]).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_concat_all_empty_is_empty() {
        let back = RowSet::concat(vec![RowSet::empty(), RowSet::empty()]).unwrap();
        assert_eq!(back.num_rows(), 0);
    }

    #[test]
    fn test_concat_rejects_schema_mismatch() {
        let other = RowSet::new(vec![Column::new("y", ColumnData::Float64(vec![1.0]))]).unwrap();
        assert!(RowSet::concat(vec![xyz(), other]).is_err());
    }

    #[test]
    fn test_push_and_remove_column() {
        let mut rows = xyz();
        assert!(rows
            .push_column(Column::new("z", ColumnData::Float64(vec![0.0])))
            .is_err());
        rows.push_column(Column::new("z", ColumnData::Float64(vec![0.0; 3])))
            .unwrap();
        assert!(rows.contains("z"));
        assert!(rows.remove_column("z").is_some());
        assert!(!rows.contains("z"));
        assert!(rows.remove_column("z").is_none());
    }

    #[test]
    fn test_normalize_variants() {
        let rows = RowSet::new(vec![
            Column::new("gal_type", ColumnData::Variant(vec![Value::from("centrals")])),
            Column::new("x", ColumnData::Float64(vec![0.5])),
        ])
        .unwrap();
        assert!(!rows.is_portable());
        assert_eq!(rows.variant_columns(), vec!["gal_type"]);
        let rows = rows.normalize_variants();
        assert!(rows.is_portable());
        assert_eq!(
            rows.column("gal_type").unwrap().data().as_text().unwrap(),
            &["centrals".to_string()]
        );
    }

    #[test]
    fn test_take_rows() {
        let rows = xyz().take(&[2, 0]);
        assert_eq!(
            rows.column("id").unwrap().data(),
            &ColumnData::Int64(vec![9, 7])
        );
    }
}

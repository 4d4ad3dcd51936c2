//! Halo inputs
//!
//! - [`HaloSource`]: the catalog owner. It exposes this rank's halo rows and
//!   the simulation box geometry.
//! - [`HaloCatalog`]: a plain in-memory halo source.
//! - [`HaloTable`]: the model-native view of a consolidated halo row set. It
//!   can only be built from portable columns.

use crate::error::{ModelError, ModelResult};
use hodmock_core::{Error, Result, RowSet};

/// Owner of a rank's halo rows
pub trait HaloSource: Send + Sync {
    /// This rank's halo rows
    fn halos(&self) -> &RowSet;

    /// Periodic box side lengths
    fn box_size(&self) -> [f64; 3];
}

/// In-memory halo source
#[derive(Debug, Clone, PartialEq)]
pub struct HaloCatalog {
    rows: RowSet,
    box_size: [f64; 3],
}

impl HaloCatalog {
    /// Wrap halo rows with a periodic box
    ///
    /// Every box side must be finite and positive.
    pub fn new(rows: RowSet, box_size: [f64; 3]) -> Result<Self> {
        if box_size.iter().any(|l| !l.is_finite() || *l <= 0.0) {
            return Err(Error::invalid_input(format!(
                "box size must be positive and finite, got {:?}",
                box_size
            )));
        }
        Ok(Self { rows, box_size })
    }

    /// Cubic box helper
    pub fn cubic(rows: RowSet, side: f64) -> Result<Self> {
        Self::new(rows, [side; 3])
    }
}

impl HaloSource for HaloCatalog {
    fn halos(&self) -> &RowSet {
        &self.rows
    }

    fn box_size(&self) -> [f64; 3] {
        self.box_size
    }
}

/// Consolidated halo rows as handed to an occupation model
#[derive(Debug, Clone, PartialEq)]
pub struct HaloTable {
    rows: RowSet,
}

impl HaloTable {
    /// Wrap a portable row set
    pub fn new(rows: RowSet) -> ModelResult<Self> {
        let variants = rows.variant_columns();
        if !variants.is_empty() {
            return Err(ModelError::NonPortableHalos {
                columns: variants.into_iter().map(String::from).collect(),
            });
        }
        Ok(Self { rows })
    }

    /// Underlying rows
    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    /// Number of halos
    pub fn len(&self) -> usize {
        self.rows.num_rows()
    }

    /// True if there are no halos
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True if the property column exists
    pub fn has(&self, column: &str) -> bool {
        self.rows.contains(column)
    }

    /// Numeric property as f64
    pub fn property(&self, column: &str) -> ModelResult<Vec<f64>> {
        let col = self
            .rows
            .column(column)
            .ok_or_else(|| ModelError::MissingHaloProperty {
                column: column.to_string(),
            })?;
        col.data()
            .to_f64()
            .ok_or_else(|| ModelError::NonNumericHaloProperty {
                column: column.to_string(),
            })
    }

    /// Numeric property, or `None` if the column is absent
    pub fn optional_property(&self, column: &str) -> ModelResult<Option<Vec<f64>>> {
        if self.has(column) {
            self.property(column).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Release the rows
    pub fn into_rows(self) -> RowSet {
        self.rows
    }
}

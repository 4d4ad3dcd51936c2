//! Composite columns computed on demand
//!
//! Nothing is stored: every call reads the shard it is handed, so a
//! replaced shard can never serve stale vectors.

use hodmock_core::{Error, Result, RowSet};

/// Scalar columns stacked into positions
pub const POSITION_COLUMNS: [&str; 3] = ["x", "y", "z"];
/// Scalar columns stacked into velocities
pub const VELOCITY_COLUMNS: [&str; 3] = ["vx", "vy", "vz"];

/// Stacks scalar columns into row-major 3-vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedColumnEngine;

impl DerivedColumnEngine {
    /// `(x, y, z)` per row
    pub fn position(&self, shard: &RowSet) -> Result<Vec<[f64; 3]>> {
        self.vector3(shard, POSITION_COLUMNS)
    }

    /// `(vx, vy, vz)` per row
    pub fn velocity(&self, shard: &RowSet) -> Result<Vec<[f64; 3]>> {
        self.vector3(shard, VELOCITY_COLUMNS)
    }

    /// Stack any three numeric columns
    ///
    /// # Errors
    ///
    /// `MissingColumn` naming the first absent column, or `SchemaMismatch`
    /// if a column is not numeric.
    pub fn vector3(&self, shard: &RowSet, names: [&str; 3]) -> Result<Vec<[f64; 3]>> {
        let mut components = Vec::with_capacity(3);
        for name in names {
            let column = shard.column(name).ok_or_else(|| Error::missing_column(name))?;
            let values = column.data().to_f64().ok_or_else(|| {
                Error::schema_mismatch(format!(
                    "column '{}' holds {} values, expected numeric",
                    name,
                    column.data_type().kind_name()
                ))
            })?;
            components.push(values);
        }
        let (x, y, z) = (&components[0], &components[1], &components[2]);
        Ok((0..shard.num_rows()).map(|i| [x[i], y[i], z[i]]).collect())
    }
}

//! Catalog generation counter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the currently installed shard of a catalog
///
/// Generation 0 means "never populated". Every successful population cycle
/// moves to the next generation; generations are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// The unpopulated generation
    pub const UNPOPULATED: Generation = Generation(0);

    /// Wrap a raw counter
    pub fn new(value: u64) -> Self {
        Generation(value)
    }

    /// Raw counter value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The generation a successful cycle would install
    pub fn next(&self) -> Generation {
        Generation(self.0 + 1)
    }

    /// True if a shard has been installed
    pub fn is_populated(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

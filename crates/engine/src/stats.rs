//! Summary statistics of a populated catalog
//!
//! Diagnostic only: nothing here can fail a population cycle.

use crate::diagnostics::DiagnosticSink;
use hodmock_core::{ColumnData, RowSet};
use std::sync::Arc;

/// Summary of one transform output
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    /// Total rows
    pub rows: usize,
    /// Fraction of rows in the reported category
    pub category_fraction: Option<f64>,
    /// Mean of log10 of the mass column
    pub mean_log_mass: Option<f64>,
    /// Population standard deviation of log10 of the mass column
    pub std_log_mass: Option<f64>,
}

impl PopulationStats {
    /// Compute statistics, or `None` for an empty row set
    ///
    /// Measures whose columns are absent (or of the wrong kind) are left
    /// as `None`.
    pub fn compute(
        rows: &RowSet,
        category_column: &str,
        category: &str,
        mass_column: &str,
    ) -> Option<Self> {
        let n = rows.num_rows();
        if n == 0 {
            return None;
        }

        let category_fraction = rows
            .column(category_column)
            .and_then(|c| count_category(c.data(), category))
            .map(|hits| hits as f64 / n as f64);

        let log_mass: Option<Vec<f64>> = rows
            .column(mass_column)
            .and_then(|c| c.data().to_f64())
            .map(|m| m.into_iter().map(f64::log10).collect());
        let (mean_log_mass, std_log_mass) = match log_mass {
            Some(values) => {
                let mean = values.iter().sum::<f64>() / n as f64;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
                (Some(mean), Some(var.sqrt()))
            }
            None => (None, None),
        };

        Some(Self {
            rows: n,
            category_fraction,
            mean_log_mass,
            std_log_mass,
        })
    }

    /// Human-readable lines, one per available measure
    pub fn lines(&self, category: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(f) = self.category_fraction {
            lines.push(format!("{} fraction: {:.2}", category, f));
        }
        if let Some(mean) = self.mean_log_mass {
            lines.push(format!("mean log10 halo mass: {:.2}", mean));
        }
        if let Some(std) = self.std_log_mass {
            lines.push(format!("std log10 halo mass: {:.2}", std));
        }
        lines
    }
}

fn count_category(data: &ColumnData, category: &str) -> Option<usize> {
    match data {
        ColumnData::Text(text) => Some(text.values().iter().filter(|v| *v == category).count()),
        ColumnData::Variant(values) => Some(
            values
                .iter()
                .filter(|v| v.as_str() == Some(category))
                .count(),
        ),
        _ => None,
    }
}

/// Computes statistics and hands them to a sink
#[derive(Clone)]
pub struct StatisticsRecorder {
    sink: Arc<dyn DiagnosticSink>,
    category_column: String,
    category: String,
}

impl StatisticsRecorder {
    /// Recorder reporting the fraction of `category` in `category_column`
    pub fn new(
        sink: Arc<dyn DiagnosticSink>,
        category_column: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            category_column: category_column.into(),
            category: category.into(),
        }
    }

    /// Record statistics of `rows`; silent for an empty row set
    pub fn record(&self, rows: &RowSet, mass_column: &str) -> Option<PopulationStats> {
        let stats =
            PopulationStats::compute(rows, &self.category_column, &self.category, mass_column)?;
        for line in stats.lines(&self.category) {
            self.sink.record(&line);
        }
        Some(stats)
    }
}

impl std::fmt::Debug for StatisticsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsRecorder")
            .field("category_column", &self.category_column)
            .field("category", &self.category)
            .finish()
    }
}

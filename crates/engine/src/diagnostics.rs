//! Diagnostic line sinks
//!
//! The population layer only ever asks a sink to record a line. It never
//! reads anything back.

use parking_lot::Mutex;
use tracing::info;

/// Destination for diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    /// Record one line
    fn record(&self, line: &str);
}

/// Forwards lines to `tracing` under the `hodmock::stats` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, line: &str) {
        info!(target: "hodmock::stats", "{}", line);
    }
}

/// Keeps lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded line, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drop recorded lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record("first");
        sink.record("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        sink.clear();
        assert!(sink.lines().is_empty());
    }
}

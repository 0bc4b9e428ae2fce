//! Sink that prints payloads instead of writing them.

use std::cell::Cell;

use super::RecordSink;
use crate::error::SyncError;
use crate::properties::Payload;

/// Prints each payload as JSON and reports success.
#[derive(Debug, Default)]
pub struct DryRunSink {
    printed: Cell<usize>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads printed so far.
    pub fn printed(&self) -> usize {
        self.printed.get()
    }
}

impl RecordSink for DryRunSink {
    fn create_record(&self, database_id: &str, payload: &Payload) -> Result<(), SyncError> {
        let json = serde_json::to_string_pretty(payload).map_err(|e| SyncError::WriteRejected {
            status: None,
            message: e.to_string(),
        })?;
        println!("  [dry-run] {} ←\n{}", database_id, json);
        self.printed.set(self.printed.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dry_run_counts_payloads() {
        let sink = DryRunSink::new();
        let mut payload = Payload::new();
        payload.insert("Stars".into(), json!({ "number": 3 }));

        sink.create_record("db", &payload).unwrap();
        sink.create_record("db", &payload).unwrap();

        assert_eq!(sink.printed(), 2);
    }
}

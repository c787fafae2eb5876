//! Audit sink for pre-rewrite payloads.
//!
//! The sink sees the upstream payload exactly as it arrived, before any
//! rewriting. A sink failure is logged and swallowed; it never changes the
//! rewritten result and never fails the exchange.

use log::info;
use serde_json::Value;

pub trait AuditSink: Send + Sync {
    fn record(&self, payload: &Value) -> Result<(), String>;
}

/// Sink that writes the raw payload to the log at info level.
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, payload: &Value) -> Result<(), String> {
        info!("pre-rewrite payload: {}", payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_sink_accepts_payload() {
        let sink = LogAuditSink;
        assert!(sink.record(&json!({"content": "raw"})).is_ok());
    }
}

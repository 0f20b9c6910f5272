//! Run telemetry: the durable failure log and the per-run counters.
//!
//! Both live in a [`RunContext`] that the orchestrator threads through every
//! component call, so there is no ambient process-wide state. The failure
//! log is the operator-facing artifact for post-run triage; the counters
//! only feed the end-of-run summary.

mod counters;
mod failure_log;

pub use counters::RunCounters;
pub use failure_log::FailureSink;

/// Run-scoped context holding the failure sink and counters.
///
/// Passed `&mut` down the pipeline: the transport layer appends per-attempt
/// records directly to the sink, while [`RunContext::record_failure`] is the
/// single place a slot's final failure is both logged and counted, keeping
/// the "log once, count once" rule in one spot.
#[derive(Debug)]
pub struct RunContext {
    /// Append-only failure log.
    pub sink: FailureSink,
    /// Success/failure/skip tallies for this run.
    pub counters: RunCounters,
}

impl RunContext {
    /// Creates a context around an open failure sink with zeroed counters.
    pub fn new(sink: FailureSink) -> Self {
        Self {
            sink,
            counters: RunCounters::default(),
        }
    }

    /// Records a slot's final failure: one log line, one counter increment.
    pub fn record_failure(&mut self, message: &str) {
        self.sink.record(message);
        self.counters.record_failure();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_failure_logs_and_counts_once() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("failed.txt");
        let sink = FailureSink::create(&log_path).unwrap();
        let mut ctx = RunContext::new(sink);

        ctx.record_failure("slot 3: bad link");
        ctx.record_failure("slot 4: HTTP 404");

        assert_eq!(ctx.counters.failed, 2);
        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("slot 3: bad link"));
    }
}

//! Progress reporting for the statement loop.
//!
//! The ingest run reports one unit of work per statement through
//! [`ProgressCallback`]. The binary draws it as an `indicatif` bar from
//! `dividend_ledger_cli_utils`; library callers and tests pass
//! [`NullProgress`].

/// Receives progress from the statement loop.
pub trait ProgressCallback: Send + Sync {
    /// Number of statements found in the source directory.
    fn set_total(&self, total: u64);

    /// Marks `delta` more statements as visited, extracted or skipped.
    fn inc(&self, delta: u64);

    /// Names the statement currently being read.
    fn set_message(&self, msg: String);

    /// Ends the run with a one-line outcome.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

//! Progress callbacks for long-running generator runs.

use docbundle_shared::SkipReason;

/// Progress callback for reporting generator status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the number of entries to process is known.
    fn start(&self, total: usize);
    /// Called after an entry was appended to the output.
    fn included(&self, name: &str, current: usize, total: usize);
    /// Called when an entry is left out.
    fn skipped(&self, name: &str, reason: &SkipReason);
    /// Called when the run completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn start(&self, _total: usize) {}
    fn included(&self, _name: &str, _current: usize, _total: usize) {}
    fn skipped(&self, _name: &str, _reason: &SkipReason) {}
    fn done(&self) {}
}

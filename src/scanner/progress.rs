/// Minimum wall time between two throttled progress reports.
pub const PROGRESS_INTERVAL_MS: u64 = 100;

/// Forwards running record counts to a caller callback, at most once per
/// [`PROGRESS_INTERVAL_MS`], plus one unconditional final report.
pub struct ProgressThrottle<'a> {
    callback: Option<&'a mut dyn FnMut(usize)>,
    last_report_ms: u64,
}

impl<'a> ProgressThrottle<'a> {
    /// `start_ms` counts as the last report, so the first throttled report
    /// comes one interval into the scan.
    pub fn new(callback: Option<&'a mut dyn FnMut(usize)>, start_ms: u64) -> Self {
        Self {
            callback,
            last_report_ms: start_ms,
        }
    }

    /// Report `count` if the interval has elapsed. Returns whether it reported.
    pub fn tick(&mut self, count: usize, now_ms: u64) -> bool {
        let Some(callback) = self.callback.as_mut() else {
            return false;
        };
        if now_ms.saturating_sub(self.last_report_ms) < PROGRESS_INTERVAL_MS {
            return false;
        }
        self.last_report_ms = now_ms;
        callback(count);
        true
    }

    pub fn finish(&mut self, count: usize) {
        if let Some(callback) = self.callback.as_mut() {
            callback(count);
        }
    }
}

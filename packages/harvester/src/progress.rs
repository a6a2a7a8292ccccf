//! Time-gated progress reporting for long scraping runs.

use std::time::{Duration, Instant};

use tracing::info;

/// Emits a status summary at most once per configured interval.
///
/// Owns the run's two timestamps: start time (for elapsed/ETA math)
/// and the last report time (for gating).
pub struct ProgressReporter {
    started: Instant,
    last_report: Instant,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_report: now,
            interval,
        }
    }

    /// True at most once per interval; advances the gate when true.
    pub fn should_report(&mut self) -> bool {
        self.should_report_at(Instant::now())
    }

    fn should_report_at(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_report) >= self.interval {
            self.last_report = now;
            true
        } else {
            false
        }
    }

    /// Log percent complete, elapsed, linear ETA and success rate.
    /// Division guards: zero items processed or zero attempts so far.
    pub fn report(&self, current: usize, total: usize, success: usize, failed: usize) {
        let elapsed = self.started.elapsed();
        let percent = if total > 0 {
            current as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let remaining = total.saturating_sub(current);
        let eta = if current > 0 {
            elapsed.mul_f64(remaining as f64 / current as f64)
        } else {
            Duration::ZERO
        };
        let attempts = success + failed;
        let success_rate = if attempts > 0 {
            success as f64 / attempts as f64 * 100.0
        } else {
            0.0
        };

        info!(
            progress = format_args!("{current}/{total}"),
            percent = format_args!("{percent:.1}"),
            success = success,
            failed = failed,
            success_rate = format_args!("{success_rate:.1}"),
            elapsed_secs = elapsed.as_secs(),
            eta_secs = eta.as_secs(),
            "progress report"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_at_most_once_per_interval() {
        let mut reporter = ProgressReporter::new(Duration::from_secs(600));
        let base = reporter.last_report;

        assert!(!reporter.should_report_at(base + Duration::from_secs(1)));
        assert!(!reporter.should_report_at(base + Duration::from_secs(599)));
        assert!(reporter.should_report_at(base + Duration::from_secs(600)));
        // Gate advanced: the next window starts at the report time.
        assert!(!reporter.should_report_at(base + Duration::from_secs(601)));
        assert!(reporter.should_report_at(base + Duration::from_secs(1_200)));
    }

    #[test]
    fn test_report_guards_divisions() {
        let reporter = ProgressReporter::new(Duration::from_secs(600));
        // current == 0 and success + failed == 0 must not panic.
        reporter.report(0, 0, 0, 0);
        reporter.report(0, 100, 0, 0);
        reporter.report(50, 100, 30, 20);
    }
}

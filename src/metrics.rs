//! Refresh statistics.
//!
//! Counters accumulated over the process lifetime plus tick timing, logged
//! at `debug` after every tick. Tick time is dominated by network latency,
//! so it is a quick way to spot a slow or timing-out feed.

use core::fmt::Write;
use std::time::{Duration, Instant};

use heapless::String;

use crate::refresh::TickReport;

/// Refresh counters and tick timing.
#[derive(Debug)]
pub struct RefreshMetrics {
    // Counters
    /// Ticks run since startup
    pub total_ticks: u64,
    /// Plants whose bar and label were replaced
    pub updates: u64,
    /// Plants skipped because the fetch failed
    pub fetch_failures: u64,
    /// Replacements that found their old element missing
    pub fallback_inserts: u64,

    // Tick timing (microseconds)
    /// Duration of the most recent tick
    pub last_tick_us: u32,
    /// Longest tick observed
    pub tick_time_max_us: u32,
    /// Rolling average tick time (exponential moving average)
    tick_time_avg_us: f32,

    start_time: Instant,
}

impl RefreshMetrics {
    /// Exponential moving average alpha.
    const EMA_ALPHA: f32 = 0.2;

    /// Create metrics, starting the uptime timer.
    pub fn new() -> Self {
        Self {
            total_ticks: 0,
            updates: 0,
            fetch_failures: 0,
            fallback_inserts: 0,
            last_tick_us: 0,
            tick_time_max_us: 0,
            tick_time_avg_us: 0.0,
            start_time: Instant::now(),
        }
    }

    /// Fold one tick's outcome and duration into the totals.
    pub fn record_tick(
        &mut self,
        report: &TickReport,
        elapsed: Duration,
    ) {
        let tick_us = u32::try_from(elapsed.as_micros()).unwrap_or(u32::MAX);

        self.last_tick_us = tick_us;
        self.tick_time_max_us = self.tick_time_max_us.max(tick_us);
        if self.total_ticks == 0 {
            self.tick_time_avg_us = tick_us as f32;
        } else {
            self.tick_time_avg_us =
                Self::EMA_ALPHA.mul_add(tick_us as f32, (1.0 - Self::EMA_ALPHA) * self.tick_time_avg_us);
        }

        self.total_ticks += 1;
        self.updates += report.updated.len() as u64;
        self.fetch_failures += report.failed.len() as u64;
        self.fallback_inserts += u64::from(report.fallbacks);
    }

    #[inline]
    pub const fn tick_time_avg_us(&self) -> u32 { self.tick_time_avg_us as u32 }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Uptime as `HH:MM:SS`.
    pub fn uptime_string(&self) -> String<12> { format_hms(self.uptime()) }
}

impl Default for RefreshMetrics {
    fn default() -> Self { Self::new() }
}

fn format_hms(duration: Duration) -> String<12> {
    let secs = duration.as_secs();
    let mut s = String::new();
    // At most "99999:59:59" for any realistic uptime
    let _ = write!(s, "{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(
        updated: &[usize],
        failed: &[usize],
        fallbacks: u32,
    ) -> TickReport {
        let mut report = TickReport::default();
        for &slot in updated {
            report.updated.push(slot).unwrap();
        }
        for &slot in failed {
            report.failed.push(slot).unwrap();
        }
        report.fallbacks = fallbacks;
        report
    }

    #[test]
    fn test_counters_accumulate() {
        let mut metrics = RefreshMetrics::new();
        metrics.record_tick(&report(&[0, 1, 2], &[], 0), Duration::from_millis(10));
        metrics.record_tick(&report(&[0, 2], &[1], 1), Duration::from_millis(30));

        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.updates, 5);
        assert_eq!(metrics.fetch_failures, 1);
        assert_eq!(metrics.fallback_inserts, 1);
        assert_eq!(metrics.last_tick_us, 30_000);
        assert_eq!(metrics.tick_time_max_us, 30_000);
    }

    #[test]
    fn test_average_starts_at_first_sample() {
        let mut metrics = RefreshMetrics::new();
        metrics.record_tick(&report(&[], &[], 0), Duration::from_millis(50));
        assert_eq!(metrics.tick_time_avg_us(), 50_000);

        metrics.record_tick(&report(&[], &[], 0), Duration::from_millis(100));
        let avg = metrics.tick_time_avg_us();
        assert!(avg > 50_000 && avg < 100_000, "EMA should move towards new sample: {avg}");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::from_secs(0)).as_str(), "00:00:00");
        assert_eq!(format_hms(Duration::from_secs(3_725)).as_str(), "01:02:05");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)).as_str(), "100:00:00");
    }
}

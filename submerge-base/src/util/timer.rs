//! Monotonic profiling timer: `now()` returns an opaque
//! count; differences between two samples convert to ns/us/ms/seconds.
//! Backed by [`std::time::Instant`], which already reads the host's
//! monotonic clock once and is cheap to sample repeatedly.

use std::time::Instant;

/// An opaque monotonic sample. Only differences between two samples of the
/// same process are meaningful — the host clock frequency is read once at
/// construction, not re-read on every sample.
#[derive(Clone, Copy, Debug)]
pub struct ProfTimer(Instant);

impl ProfTimer {
    pub fn now() -> Self {
        ProfTimer(Instant::now())
    }

    pub fn elapsed_ns(&self, since: ProfTimer) -> u64 {
        self.0.saturating_duration_since(since.0).as_nanos() as u64
    }

    pub fn elapsed_us(&self, since: ProfTimer) -> u64 {
        self.elapsed_ns(since) / 1_000
    }

    pub fn elapsed_ms(&self, since: ProfTimer) -> u64 {
        self.elapsed_ns(since) / 1_000_000
    }

    pub fn elapsed_secs_f64(&self, since: ProfTimer) -> f64 {
        self.0.saturating_duration_since(since.0).as_secs_f64()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_timer_nonnegative_and_ordered() {
        let t0 = ProfTimer::now();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let t1 = ProfTimer::now();
        assert!(t1.elapsed_ns(t0) > 0);
        assert!(t1.elapsed_us(t0) >= 1);
        assert!(t1.elapsed_secs_f64(t0) > 0.0);
    }

    #[test]
    fn test_timer_same_sample_is_zero() {
        let t0 = ProfTimer::now();
        assert_eq!(t0.elapsed_ns(t0), 0);
    }
}

use std::time::{Duration, Instant};

/// Fixed-rate tick scheduler for `ControlFlow::WaitUntil`
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    period: Duration,
    next_tick: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        let period = Duration::from_secs_f64(1.0 / target_fps.max(1) as f64);
        Self {
            start: now,
            period,
            next_tick: now,
            last_tick: now,
        }
    }

    /// True when a tick is due; schedules the following one.
    /// A clock that fell more than a period behind resyncs instead of bursting.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick += self.period;
        if self.next_tick <= now {
            self.next_tick = now + self.period;
        }
        true
    }

    /// Seconds since the previous tick, then marks `now` as the latest tick
    pub fn delta(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        dt
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_once_per_period() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, start);
        assert!(clock.poll(start));
        assert!(!clock.poll(start));
        assert!(!clock.poll(start + clock.period / 2));
        assert!(clock.poll(start + clock.period));
    }

    #[test]
    fn falling_behind_resyncs_instead_of_bursting() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, start);
        assert!(clock.poll(start));
        let late = start + Duration::from_secs(1);
        assert!(clock.poll(late));
        assert!(!clock.poll(late));
        assert_eq!(clock.next_deadline(), late + clock.period);
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        let clock = FrameClock::new(0, Instant::now());
        assert_eq!(clock.period, Duration::from_secs(1));
    }

    #[test]
    fn delta_and_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::new(60, start);
        let later = start + Duration::from_millis(500);
        assert!((clock.delta(later) - 0.5).abs() < 1e-6);
        assert_eq!(clock.delta(later), 0.0);
        assert_eq!(clock.elapsed(later), Duration::from_millis(500));
    }
}

use std::time::{Duration, Instant};

/// Timing of one render-loop frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Clamped seconds since the previous frame.
    pub dt: f32,
    /// Sum of clamped deltas since the clock started or was reset.
    pub elapsed: f64,
    /// 0 for the first frame after a start or reset.
    pub frame_index: u64,
}

/// Clock for one render loop.
///
/// Deltas are clamped, so a stalled loop (debugger, minimized window) never
/// hands a huge step to per-frame callbacks. The first frame after `new`
/// or `reset` reports the minimum delta.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    elapsed: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Deltas clamped to `[0.1ms, 250ms]`.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self { last: None, elapsed: 0.0, frame_index: 0, dt_min, dt_max }
    }

    /// Starts over: the next tick is frame 0 again.
    pub fn reset(&mut self) {
        self.last = None;
        self.elapsed = 0.0;
        self.frame_index = 0;
    }

    /// Number of ticks since the clock started or was reset.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let raw = self.last.map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        let dt = raw.clamp(self.dt_min, self.dt_max);

        self.last = Some(now);
        self.elapsed += dt.as_secs_f64();

        let ft = FrameTime { dt: dt.as_secs_f32(), elapsed: self.elapsed, frame_index: self.frame_index };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn first_frame_reports_minimum_delta() {
        let mut clock = FrameClock::with_clamps(ms(1), ms(100));
        let ft = clock.tick_at(Instant::now());
        assert_eq!(ft.frame_index, 0);
        assert!((ft.dt - 0.001).abs() < 1e-6);
    }

    #[test]
    fn stalls_are_clamped_and_accumulated() {
        let mut clock = FrameClock::with_clamps(ms(1), ms(100));
        let t0 = Instant::now();
        clock.tick_at(t0);

        let stalled = clock.tick_at(t0 + Duration::from_secs(5));
        assert!((stalled.dt - 0.1).abs() < 1e-6);

        let normal = clock.tick_at(t0 + Duration::from_secs(5) + ms(16));
        assert!((normal.dt - 0.016).abs() < 1e-6);
        assert!((normal.elapsed - 0.117).abs() < 1e-9);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn reset_starts_over() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.tick_at(t0 + ms(20));

        clock.reset();
        let ft = clock.tick_at(t0 + ms(40));

        assert_eq!(ft.frame_index, 0);
        assert!(ft.elapsed < 0.001);
    }
}

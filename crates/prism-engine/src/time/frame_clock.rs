use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Produces clamped per-frame delta times.
///
/// The lower clamp keeps animation moving in tight loops; the upper clamp
/// keeps it from jumping after a stall (debugger, minimized window).
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
        }
    }

    /// Restarts the baseline, e.g. after the window was hidden.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        self.tick_at(now)
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponentially smoothed frame time, for display.
#[derive(Debug, Copy, Clone)]
pub struct FrameStats {
    smoothed_dt: f32,
    weight: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self { smoothed_dt: 0.0, weight: 0.1 }
    }
}

impl FrameStats {
    pub fn push(&mut self, dt: f32) {
        if self.smoothed_dt == 0.0 {
            self.smoothed_dt = dt;
        } else {
            self.smoothed_dt += (dt - self.smoothed_dt) * self.weight;
        }
    }

    pub fn fps(&self) -> f32 {
        if self.smoothed_dt > 0.0 { 1.0 / self.smoothed_dt } else { 0.0 }
    }

    pub fn frame_time_ms(&self) -> f32 {
        self.smoothed_dt * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stalls_are_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.frame_index, 0);
        assert_eq!(clock.tick_at(start + Duration::from_secs(5)).frame_index, 1);
    }

    #[test]
    fn zero_dt_is_raised() {
        let mut clock = FrameClock::new();
        let start = clock.last;
        assert!(clock.tick_at(start).dt > 0.0);
    }

    #[test]
    fn stats_start_at_first_sample() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.fps(), 0.0);
        stats.push(0.02);
        assert!((stats.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn stats_converge() {
        let mut stats = FrameStats::default();
        stats.push(0.1);
        for _ in 0..200 {
            stats.push(0.01);
        }
        assert!((stats.frame_time_ms() - 10.0).abs() < 0.01);
    }
}

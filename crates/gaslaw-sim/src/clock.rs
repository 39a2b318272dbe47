use gaslaw_core::SimConfig;

/// Fixed-timestep accumulator.
///
/// Frames feed in wall-clock deltas; the simulation consumes whole ticks of
/// `interval` seconds. The remainder carries over to the next frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    interval: f64,
    max_frame_delta: f64,
    accumulator: f64,
    total_ticks: u64,
}

impl SimulationClock {
    /// `interval` must be positive; a non-positive interval never ticks.
    pub fn new(interval: f64, max_frame_delta: f64) -> Self {
        Self {
            interval,
            max_frame_delta,
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.tick_interval, config.max_frame_delta)
    }

    /// Add a frame delta and return how many ticks are now due.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            log::warn!("ignoring invalid frame delta {frame_dt}");
            return 0;
        }
        if !(self.interval > 0.0) {
            return 0;
        }

        let dt = if frame_dt > self.max_frame_delta {
            log::warn!(
                "frame delta {frame_dt:.3}s clamped to {:.3}s",
                self.max_frame_delta
            );
            self.max_frame_delta
        } else {
            frame_dt
        };

        self.accumulator += dt;
        let mut due = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            due += 1;
        }
        self.total_ticks += u64::from(due);
        due
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Time carried over towards the next tick.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Ticks handed out since creation or the last reset.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Fraction of a tick sitting in the accumulator, for render
    /// interpolation. Always in [0, 1).
    pub fn alpha(&self) -> f64 {
        if self.interval > 0.0 {
            (self.accumulator / self.interval).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.total_ticks = 0;
    }
}

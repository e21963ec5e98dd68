//! Game clock with fixed-timestep accumulator

/// Longest frame the clock accepts, to avoid a spiral of death after a stall
const MAX_FRAME_TIME: f64 = 0.25;

/// Tracks game time and provides a fixed-timestep accumulator for simulation updates
///
/// The clock is fed elapsed frame time by the driver, which keeps it usable
/// both from a windowed loop and from headless tools stepping at a fixed rate.
pub struct GameClock {
    /// Total elapsed game time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Fixed timestep interval (default: 1/60 second)
    pub fixed_timestep: f64,
    /// Accumulated time for fixed-step consumption
    accumulator: f64,
    /// Number of frames advanced
    frame: u64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 60.0,
            accumulator: 0.0,
            frame: 0,
        }
    }
}

impl GameClock {
    /// Create a new game clock with default 60Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game clock with a custom fixed timestep
    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz.max(1.0),
            ..Self::default()
        }
    }

    /// Advance the clock by one frame of `elapsed` seconds. Call once per frame.
    pub fn advance(&mut self, elapsed: f64) {
        self.delta_time = elapsed.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
        self.frame += 1;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        // Tolerate float drift so 1/60 frames fed at 60Hz step exactly once
        self.accumulator + 1e-9 >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator = (self.accumulator - self.fixed_timestep).max(0.0);
    }

    /// Get the interpolation alpha for rendering between fixed steps
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_timestep
    }

    /// Frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = GameClock::new();
        assert!((clock.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame(), 0);
    }

    #[test]
    fn test_custom_timestep() {
        let clock = GameClock::with_fixed_timestep(30.0);
        assert!((clock.fixed_timestep - 1.0 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = GameClock::new();
        clock.advance(3.0);
        assert!((clock.delta_time - MAX_FRAME_TIME).abs() < 1e-10);
        assert!((clock.total_time - MAX_FRAME_TIME).abs() < 1e-10);
    }

    #[test]
    fn test_accumulator_logic() {
        let mut clock = GameClock::new();
        clock.advance(1.0 / 30.0); // Two fixed steps worth

        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(clock.should_fixed_update());
        clock.consume_fixed_step();
        assert!(!clock.should_fixed_update());
    }

    #[test]
    fn test_matching_rate_steps_once_per_frame() {
        let mut clock = GameClock::new();
        for _ in 0..600 {
            clock.advance(1.0 / 60.0);
            let mut steps = 0;
            while clock.should_fixed_update() {
                clock.consume_fixed_step();
                steps += 1;
            }
            assert_eq!(steps, 1);
        }
        assert_eq!(clock.frame(), 600);
    }

    #[test]
    fn test_interpolation_alpha() {
        let mut clock = GameClock::new();
        clock.advance(clock.fixed_timestep * 0.5);
        let alpha = clock.interpolation_alpha();
        assert!((alpha - 0.5).abs() < 1e-10);
    }
}

//! Per-frame simulation context handed to behavior strategies
//!
//! The context is rebuilt every frame from borrowed parts: the global tuning,
//! the driver's random/color hooks and the spawn queue. Strategies never touch
//! the pool directly; every particle they create goes through
//! [`SimContext::spawn`], which is where drain-only mode is enforced and where
//! spawns are counted per origin.

use crate::particle::Particle;
use crate::pool::ParticlePool;
use crate::tuning::Tuning;
use glam::Vec4;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Callbacks supplied by the driver
pub trait SimHooks {
    /// Fully saturated color at `phase` around the hue wheel (wraps every 1.0)
    fn rainbow_color(&mut self, phase: f32) -> Vec4;

    /// A color picked from the driver's palette
    fn random_color(&mut self) -> Vec4;

    /// Uniform integer in `[min, max]`
    fn random_int(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[0, 1)`
    fn random_f32(&mut self) -> f32 {
        const STEPS: i32 = 1 << 24;
        self.random_int(0, STEPS - 1) as f32 / STEPS as f32
    }
}

// Firework chemistry
const PALETTE: [[f32; 4]; 10] = [
    [1.00, 0.12, 0.12, 1.0], // strontium red
    [0.86, 0.20, 0.20, 1.0], // lithium red
    [1.00, 0.55, 0.00, 1.0], // calcium orange
    [1.00, 0.86, 0.00, 1.0], // sodium yellow
    [0.00, 1.00, 0.40, 1.0], // barium green
    [0.24, 0.47, 1.00, 1.0], // copper blue
    [0.40, 0.40, 1.00, 1.0], // caesium indigo
    [0.70, 0.20, 1.00, 1.0], // potassium violet
    [1.00, 0.78, 0.20, 1.0], // charcoal gold
    [1.00, 1.00, 1.00, 1.0], // magnesium white
];

/// Hooks backed by a seedable `SmallRng` and a fixed palette
pub struct DefaultHooks {
    rng: SmallRng,
}

impl DefaultHooks {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic hooks for tests and reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for DefaultHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHooks for DefaultHooks {
    fn rainbow_color(&mut self, phase: f32) -> Vec4 {
        hue_to_rgba(phase.rem_euclid(1.0))
    }

    fn random_color(&mut self) -> Vec4 {
        Vec4::from_array(PALETTE[self.rng.gen_range(0..PALETTE.len())])
    }

    fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn random_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// HSV hue in [0, 1) at full saturation and value
fn hue_to_rgba(hue: f32) -> Vec4 {
    let h = hue * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Vec4::new(r, g, b, 1.0)
}

/// Where a spawn request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnOrigin {
    /// A new shell leaving the ground (top-level)
    Launch,
    /// The primary burst of a shell already in flight
    Burst,
    /// A child burst fired from a still-alive star
    Secondary,
    /// A tail particle left behind a moving star
    Trail,
    /// A crossette star splitting into children
    Split,
}

/// Per-origin counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginCounts {
    pub launch: u64,
    pub burst: u64,
    pub secondary: u64,
    pub trail: u64,
    pub split: u64,
}

impl OriginCounts {
    pub fn get(&self, origin: SpawnOrigin) -> u64 {
        match origin {
            SpawnOrigin::Launch => self.launch,
            SpawnOrigin::Burst => self.burst,
            SpawnOrigin::Secondary => self.secondary,
            SpawnOrigin::Trail => self.trail,
            SpawnOrigin::Split => self.split,
        }
    }

    fn bump(&mut self, origin: SpawnOrigin) {
        let slot = match origin {
            SpawnOrigin::Launch => &mut self.launch,
            SpawnOrigin::Burst => &mut self.burst,
            SpawnOrigin::Secondary => &mut self.secondary,
            SpawnOrigin::Trail => &mut self.trail,
            SpawnOrigin::Split => &mut self.split,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.launch + self.burst + self.secondary + self.trail + self.split
    }
}

/// Cumulative spawn accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpawnStats {
    /// Requests accepted into the queue
    pub accepted: OriginCounts,
    /// Requests refused because the effect was draining
    pub suppressed: OriginCounts,
    /// Accepted particles the pool had no room for
    pub dropped: u64,
}

/// Staging buffer between strategies and the pool
///
/// Strategies run while the pool is being iterated, so new particles wait
/// here until the update pass ends. The buffer is allocated once and never
/// holds more than `limit` particles; anything past that would be dropped by
/// the pool anyway and is counted as dropped immediately.
pub struct SpawnQueue {
    pending: Vec<Particle>,
    limit: usize,
    stats: SpawnStats,
}

impl SpawnQueue {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            pending: Vec::with_capacity(limit),
            limit,
            stats: SpawnStats::default(),
        }
    }

    /// Change the staging limit (tracks pool capacity)
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        if self.pending.capacity() < limit {
            self.pending.reserve(limit - self.pending.len());
        }
    }

    /// Record the outcome of a request that does not carry a particle
    pub fn note(&mut self, origin: SpawnOrigin, accepted: bool) {
        if accepted {
            self.stats.accepted.bump(origin);
        } else {
            self.stats.suppressed.bump(origin);
        }
    }

    fn push(&mut self, particle: Particle, origin: SpawnOrigin) {
        self.stats.accepted.bump(origin);
        if self.pending.len() < self.limit {
            self.pending.push(particle);
        } else {
            self.stats.dropped += 1;
        }
    }

    /// Number of particles waiting for the pool
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move every pending particle into `pool`. Returns how many found a slot.
    pub fn flush_into(&mut self, pool: &mut ParticlePool) -> usize {
        let mut spawned = 0;
        for particle in self.pending.drain(..) {
            if pool.spawn(particle) {
                spawned += 1;
            } else {
                self.stats.dropped += 1;
            }
        }
        spawned
    }

    pub fn stats(&self) -> &SpawnStats {
        &self.stats
    }
}

/// Shared per-frame state for strategy calls
pub struct SimContext<'a> {
    /// Seconds since the effect started
    pub time: f32,
    /// Seconds covered by this frame
    pub dt: f32,
    pub tuning: &'a Tuning,
    /// Set while a style hand-off is draining the pool
    pub drain_only: bool,
    hooks: &'a mut dyn SimHooks,
    queue: &'a mut SpawnQueue,
}

impl<'a> SimContext<'a> {
    pub fn new(
        time: f32,
        dt: f32,
        tuning: &'a Tuning,
        hooks: &'a mut dyn SimHooks,
        queue: &'a mut SpawnQueue,
        drain_only: bool,
    ) -> Self {
        Self {
            time,
            dt,
            tuning,
            drain_only,
            hooks,
            queue,
        }
    }

    /// While draining, only bursts of shells already in flight may spawn
    pub fn allows(&self, origin: SpawnOrigin) -> bool {
        !self.drain_only || origin == SpawnOrigin::Burst
    }

    /// Request a new particle. Returns false if the request was refused;
    /// an accepted particle may still be dropped later by a full pool.
    pub fn spawn(&mut self, particle: Particle, origin: SpawnOrigin) -> bool {
        if !self.allows(origin) {
            self.queue.note(origin, false);
            return false;
        }
        self.queue.push(particle, origin);
        true
    }

    pub fn rainbow_color(&mut self, phase: f32) -> Vec4 {
        self.hooks.rainbow_color(phase)
    }

    pub fn random_color(&mut self) -> Vec4 {
        self.hooks.random_color()
    }

    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        self.hooks.random_int(min, max)
    }

    pub fn random_f32(&mut self) -> f32 {
        self.hooks.random_f32()
    }

    /// Uniform float in `[min, max)`
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.hooks.random_f32() * (max - min)
    }

    /// Random lifespan within the current tuning
    pub fn random_lifespan(&mut self) -> f32 {
        let (min, max) = (self.tuning.lifespan_min, self.tuning.lifespan_max);
        self.random_range(min, max)
    }

    /// Random size within the current tuning
    pub fn random_size(&mut self) -> f32 {
        let (min, max) = (self.tuning.size_min, self.tuning.size_max);
        self.random_range(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn star() -> Particle {
        Particle::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, 1.0)
    }

    #[test]
    fn random_int_is_inclusive_and_bounded() {
        let mut hooks = DefaultHooks::seeded(7);
        let mut seen_max = false;
        for _ in 0..500 {
            let v = hooks.random_int(2, 4);
            assert!((2..=4).contains(&v));
            seen_max |= v == 4;
        }
        assert!(seen_max);
        assert_eq!(hooks.random_int(5, 5), 5);
        assert_eq!(hooks.random_int(9, 1), 9);
    }

    #[test]
    fn rainbow_wraps_and_is_saturated() {
        let mut hooks = DefaultHooks::seeded(1);
        let red = hooks.rainbow_color(0.0);
        assert!((red - Vec4::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5);
        let wrapped = hooks.rainbow_color(1.0);
        assert!((wrapped - red).length() < 1e-5);
        let green = hooks.rainbow_color(1.0 / 3.0);
        assert!(green.y > 0.99 && green.x < 0.01);
    }

    #[test]
    fn drain_only_refuses_everything_but_bursts() {
        let tuning = Tuning::default();
        let mut hooks = DefaultHooks::seeded(3);
        let mut queue = SpawnQueue::with_limit(16);
        {
            let mut ctx = SimContext::new(0.0, 0.016, &tuning, &mut hooks, &mut queue, true);
            assert!(!ctx.spawn(star(), SpawnOrigin::Trail));
            assert!(!ctx.spawn(star(), SpawnOrigin::Secondary));
            assert!(!ctx.spawn(star(), SpawnOrigin::Split));
            assert!(ctx.spawn(star(), SpawnOrigin::Burst));
        }
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.stats().suppressed.total(), 3);
        assert_eq!(queue.stats().accepted.burst, 1);
    }

    #[test]
    fn queue_limit_and_flush_count_drops() {
        let tuning = Tuning::default();
        let mut hooks = DefaultHooks::seeded(3);
        let mut queue = SpawnQueue::with_limit(20);
        {
            let mut ctx = SimContext::new(0.0, 0.016, &tuning, &mut hooks, &mut queue, false);
            for _ in 0..25 {
                ctx.spawn(star(), SpawnOrigin::Trail);
            }
        }
        assert_eq!(queue.pending(), 20);
        assert_eq!(queue.stats().dropped, 5);

        let mut pool = ParticlePool::new(16);
        assert_eq!(queue.flush_into(&mut pool), 16);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.stats().dropped, 9);
        assert_eq!(queue.stats().accepted.trail, 25);
    }

    #[test]
    fn context_ranges_follow_tuning() {
        let tuning = Tuning::default();
        let mut hooks = DefaultHooks::seeded(11);
        let mut queue = SpawnQueue::with_limit(1);
        let mut ctx = SimContext::new(0.0, 0.016, &tuning, &mut hooks, &mut queue, false);
        for _ in 0..200 {
            let life = ctx.random_lifespan();
            assert!(life >= tuning.lifespan_min && life <= tuning.lifespan_max);
            let size = ctx.random_size();
            assert!(size >= tuning.size_min && size <= tuning.size_max);
        }
    }
}

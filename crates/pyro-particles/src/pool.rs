//! Fixed-capacity particle pool with cursor-based slot reuse

use crate::particle::{GpuParticle, Particle};

/// Smallest capacity a pool will accept
pub const MIN_CAPACITY: usize = 16;
/// Largest capacity a pool will accept; bounds the worst-case GPU upload
pub const HARD_LIMIT: usize = 10_000;

/// Fixed-size slot table of particles.
///
/// Dead slots are not compacted; they are overwritten lazily by the next
/// `spawn` whose cursor scan reaches them. A saturated pool drops new
/// particles instead of evicting old ones.
pub struct ParticlePool {
    slots: Vec<Particle>,
    /// Slot the next spawn scan starts from
    cursor: usize,
    /// Live count as of the last spawn/update, used to reject spawns into a
    /// full pool without scanning
    live: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        let capacity = clamp_capacity(capacity);
        Self {
            slots: vec![Particle::dead(); capacity],
            cursor: 0,
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Change the capacity, clamped to `[MIN_CAPACITY, HARD_LIMIT]`.
    /// Live particles in slots beyond the new bound are dropped.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = clamp_capacity(capacity);
        if capacity == self.slots.len() {
            return;
        }
        tracing::debug!("particle pool resize {} -> {capacity}", self.slots.len());
        self.slots.resize(capacity, Particle::dead());
        if self.cursor >= capacity {
            self.cursor = 0;
        }
        self.live = self.count_alive();
    }

    /// Copy `particle` into the next free slot.
    /// Returns false (and drops the particle) if every slot is live.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if !particle.is_alive() || self.live >= self.slots.len() {
            return false;
        }
        let len = self.slots.len();
        for step in 0..len {
            let idx = (self.cursor + step) % len;
            if !self.slots[idx].is_alive() {
                self.slots[idx] = particle;
                self.cursor = (idx + 1) % len;
                self.live += 1;
                return true;
            }
        }
        self.live = len;
        false
    }

    /// Age every live particle by `dt`. Particles whose age reaches zero are
    /// marked dead (age clamped to 0, nothing else touched); the rest are
    /// handed to `apply`. Returns how many particles remain alive.
    pub fn update<F>(&mut self, dt: f32, mut apply: F) -> usize
    where
        F: FnMut(&mut Particle),
    {
        let mut alive = 0;
        for p in self.slots.iter_mut() {
            if !p.is_alive() {
                continue;
            }
            p.age -= dt;
            if p.age <= 0.0 {
                p.age = 0.0;
                continue;
            }
            apply(p);
            if p.is_alive() {
                alive += 1;
            } else {
                p.age = 0.0;
            }
        }
        self.live = alive;
        alive
    }

    /// Full scan for live particles
    pub fn count_alive(&self) -> usize {
        self.slots.iter().filter(|p| p.is_alive()).count()
    }

    /// Pack live particles, in slot order, into `dest` using `encode`.
    /// Writes at most `min(max_count, dest.len())` entries and returns the
    /// number written.
    pub fn copy_to_snapshot<F>(&self, dest: &mut [GpuParticle], max_count: usize, mut encode: F) -> usize
    where
        F: FnMut(&Particle) -> GpuParticle,
    {
        let limit = max_count.min(dest.len());
        let mut written = 0;
        for p in self.slots.iter().filter(|p| p.is_alive()) {
            if written >= limit {
                break;
            }
            dest[written] = encode(p);
            written += 1;
        }
        written
    }

    /// Iterate live particles in slot order
    pub fn iter_alive(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.is_alive())
    }

    /// Kill every particle
    pub fn clear(&mut self) {
        for p in self.slots.iter_mut() {
            p.age = 0.0;
        }
        self.cursor = 0;
        self.live = 0;
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(MIN_CAPACITY, HARD_LIMIT)
}

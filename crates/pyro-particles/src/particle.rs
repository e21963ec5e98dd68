//! Particle types: CPU simulation state and GPU instance data

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

/// Number of opaque per-style floats carried by every particle
pub const BEHAVIOR_DATA_LEN: usize = 4;

/// CPU-side particle state
///
/// `age` counts down from `max_age`; the particle is live iff `age > 0`.
/// `behavior_data` and `behavior_flags` belong to the active style and are
/// never read by the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Vec4,
    pub size: f32,
    pub age: f32,
    pub max_age: f32,
    pub behavior_data: [f32; BEHAVIOR_DATA_LEN],
    pub behavior_flags: u32,
    pub can_spawn_child: bool,
    pub has_spawned_child: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            color: Vec4::ZERO,
            size: 0.0,
            age: 0.0,
            max_age: 0.0,
            behavior_data: [0.0; BEHAVIOR_DATA_LEN],
            behavior_flags: 0,
            can_spawn_child: false,
            has_spawned_child: false,
        }
    }

    /// A fresh particle with full life remaining
    pub fn new(position: Vec2, velocity: Vec2, color: Vec4, size: f32, life: f32) -> Self {
        Self {
            position,
            velocity,
            color,
            size,
            age: life,
            max_age: life,
            ..Self::dead()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.age > 0.0
    }

    /// Remaining life in [0, 1]: 1 when spawned, 0 when dead
    pub fn life_ratio(&self) -> f32 {
        if self.max_age <= 0.0 {
            0.0
        } else {
            (self.age / self.max_age).clamp(0.0, 1.0)
        }
    }

    /// Seconds since spawn
    pub fn elapsed(&self) -> f32 {
        (self.max_age - self.age).max(0.0)
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::dead()
    }
}

/// GPU instance data, matching the WGSL `Particle` struct in `particle.wgsl`.
///
/// 64 bytes, a multiple of the 16-byte device alignment:
///
/// | field | bytes | offset |
/// |---|---|---|
/// | position | 8 | 0 |
/// | velocity | 8 | 8 |
/// | color | 16 | 16 |
/// | size | 4 | 32 |
/// | age | 4 | 36 |
/// | max_age | 4 | 40 |
/// | behavior_data | 16 | 44 |
/// | flags | 4 | 60 |
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuParticle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub color: [f32; 4],
    pub size: f32,
    pub age: f32,
    pub max_age: f32,
    pub behavior_data: [f32; BEHAVIOR_DATA_LEN],
    pub flags: u32,
}

impl GpuParticle {
    /// Byte stride of one instance in the upload buffer
    pub const STRIDE: usize = std::mem::size_of::<GpuParticle>();

    pub fn from_particle(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            velocity: p.velocity.to_array(),
            color: p.color.to_array(),
            size: p.size,
            age: p.age,
            max_age: p.max_age,
            behavior_data: p.behavior_data,
            flags: p.behavior_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_is_alive_with_full_life() {
        let p = Particle::new(Vec2::ZERO, Vec2::X, Vec4::ONE, 2.0, 1.5);
        assert!(p.is_alive());
        assert!((p.life_ratio() - 1.0).abs() < 1e-6);
        assert!(p.elapsed().abs() < 1e-6);
        assert!(!Particle::dead().is_alive());
    }

    #[test]
    fn life_ratio_tracks_age() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 1.0, 2.0);
        p.age = 0.5;
        assert!((p.life_ratio() - 0.25).abs() < 1e-6);
        assert!((p.elapsed() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn gpu_particle_layout() {
        assert_eq!(GpuParticle::STRIDE, 64);
        assert_eq!(GpuParticle::STRIDE % 16, 0);
        assert_eq!(std::mem::align_of::<GpuParticle>(), 4);
        assert_eq!(std::mem::offset_of!(GpuParticle, color), 16);
        assert_eq!(std::mem::offset_of!(GpuParticle, size), 32);
        assert_eq!(std::mem::offset_of!(GpuParticle, behavior_data), 44);
        assert_eq!(std::mem::offset_of!(GpuParticle, flags), 60);
    }

    #[test]
    fn gpu_particle_copies_fields() {
        let mut p = Particle::new(
            Vec2::new(1.0, 2.0),
            Vec2::new(3.0, 4.0),
            Vec4::new(0.1, 0.2, 0.3, 0.4),
            5.0,
            6.0,
        );
        p.behavior_data = [7.0, 8.0, 9.0, 10.0];
        p.behavior_flags = 0b101;
        let gpu = GpuParticle::from_particle(&p);
        assert_eq!(gpu.position, [1.0, 2.0]);
        assert_eq!(gpu.velocity, [3.0, 4.0]);
        assert_eq!(gpu.color, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(gpu.behavior_data, [7.0, 8.0, 9.0, 10.0]);
        assert_eq!(gpu.flags, 0b101);
    }
}

//! Crossette: a few heavy stars that each split into a cross of four
//!
//! `behavior_data[0]`: generation (0 = original star, 1 = split child),
//! `behavior_data[1]`: life ratio at which the star splits,
//! `behavior_data[2]`: tail timer

use super::{radial_burst, trail_tick, Behavior, BurstShape, SplitBehavior, SPLIT_COUNT};
use crate::context::SimContext;
use crate::particle::Particle;
use crate::tuning::TuningDefaults;
use glam::{Vec2, Vec4};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

pub struct Crossette;

/// Set once a star has split
const SPLIT_DONE: u32 = 1 << 0;
const CROSSETTE_TRAIL_INTERVAL: f32 = 0.04;

impl Crossette {
    pub fn generation(p: &Particle) -> u32 {
        p.behavior_data[0] as u32
    }

    pub fn has_split(p: &Particle) -> bool {
        p.behavior_flags & SPLIT_DONE != 0
    }
}

impl Behavior for Crossette {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 80.0,
            drag: 0.8,
            lifespan_min: 1.4,
            lifespan_max: 2.0,
            spread_angle: 360.0,
            force: 240.0,
            secondary_enabled: false,
        }
    }

    fn spawn_explosion(
        &self,
        ctx: &mut SimContext<'_>,
        origin: Vec2,
        force: f32,
        base_color: Vec4,
        count: usize,
        is_secondary: bool,
    ) {
        let stars = (count / 10).clamp(4, 10);
        let shape = BurstShape {
            speed_jitter: 0.15,
            angle_jitter: 0.1,
            size_scale: 1.5,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, stars, is_secondary, shape, |p, ctx, _| {
            p.behavior_data[1] = ctx.random_range(0.45, 0.6);
        });
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(&mut p.behavior_data[2], dt, CROSSETTE_TRAIL_INTERVAL)
    }

    fn splitter(&self) -> Option<&dyn SplitBehavior> {
        Some(self)
    }
}

impl SplitBehavior for Crossette {
    fn should_split(&self, p: &mut Particle) -> bool {
        if Self::generation(p) != 0 || Self::has_split(p) || p.life_ratio() > p.behavior_data[1] {
            return false;
        }
        p.behavior_flags |= SPLIT_DONE;
        true
    }

    fn create_split_star(&self, p: &Particle, ctx: &mut SimContext<'_>, split_index: usize) -> Particle {
        let heading = p.velocity.to_angle();
        let angle = heading + FRAC_PI_4 + split_index as f32 * FRAC_PI_2;
        let speed = p.velocity.length().max(ctx.tuning.force * 0.35) * 0.8;
        let mut child = Particle::new(
            p.position,
            Vec2::from_angle(angle) * speed,
            p.color,
            p.size * 0.8,
            p.age,
        );
        child.behavior_data[0] = 1.0;
        child.behavior_data[2] = ctx.random_range(0.0, CROSSETTE_TRAIL_INTERVAL);
        child
    }
}

// Keeps the cross layout in step with the split count
const _: () = assert!(SPLIT_COUNT == 4);

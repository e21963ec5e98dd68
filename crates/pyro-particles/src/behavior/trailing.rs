//! Tailed styles: willow, palm, brocade, comet, tail
//!
//! All of these keep their tail timer in `behavior_data[0]`.

use super::{dim, radial_burst, trail_from, trail_tick, Behavior, BurstShape};
use crate::context::SimContext;
use crate::particle::{GpuParticle, Particle};
use crate::tuning::TuningDefaults;
use glam::{Vec2, Vec4};
use std::f32::consts::FRAC_PI_2;

const GOLD: Vec4 = Vec4::new(0.95, 0.75, 0.30, 1.0);

fn trail_timer(p: &mut Particle) -> &mut f32 {
    &mut p.behavior_data[0]
}

/// Heavy gold stars that droop and leave long hanging tails
pub struct Willow;

const WILLOW_TRAIL_INTERVAL: f32 = 0.06;

impl Behavior for Willow {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 150.0,
            drag: 2.2,
            lifespan_min: 2.6,
            lifespan_max: 3.6,
            spread_angle: 360.0,
            force: 200.0,
            secondary_enabled: false,
        }
    }

    fn spawn_explosion(
        &self,
        ctx: &mut SimContext<'_>,
        origin: Vec2,
        force: f32,
        _base_color: Vec4,
        count: usize,
        is_secondary: bool,
    ) {
        let shape = BurstShape {
            speed_jitter: 0.25,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, GOLD, count, is_secondary, shape, |_, _, _| {});
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(trail_timer(p), dt, WILLOW_TRAIL_INTERVAL)
    }

    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let life = ctx.random_range(0.8, 1.2);
        trail_from(p, Vec2::ZERO, dim(GOLD, 0.5), p.size * 0.7, life)
    }
}

/// A few thick, fast stars with bright tails, like palm fronds
pub struct Palm;

const PALM_TRAIL_INTERVAL: f32 = 0.03;

impl Behavior for Palm {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 110.0,
            drag: 0.8,
            lifespan_min: 1.4,
            lifespan_max: 2.0,
            spread_angle: 360.0,
            force: 280.0,
            secondary_enabled: true,
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
        let fronds = (count / 5).max(6);
        let shape = BurstShape {
            speed_jitter: 0.1,
            angle_jitter: 0.08,
            size_scale: 1.8,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, fronds, is_secondary, shape, |_, _, _| {});
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(trail_timer(p), dt, PALM_TRAIL_INTERVAL)
    }
}

/// Stars that shift toward gold as they age and shed glittering tails.
///
/// `behavior_data[1]`: gold mix in [0, 1], applied at encode time
pub struct Brocade;

const BROCADE_TRAIL_INTERVAL: f32 = 0.045;

impl Brocade {
    pub fn gold_mix(p: &Particle) -> f32 {
        p.behavior_data[1]
    }
}

impl Behavior for Brocade {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 100.0,
            drag: 1.6,
            lifespan_min: 2.0,
            lifespan_max: 2.8,
            spread_angle: 360.0,
            force: 210.0,
            secondary_enabled: false,
        }
    }

    fn update_particle(&self, p: &mut Particle, _dt: f32, _total_time: f32) {
        p.behavior_data[1] = 1.0 - p.life_ratio();
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(trail_timer(p), dt, BROCADE_TRAIL_INTERVAL)
    }

    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let life = ctx.random_range(0.3, 0.6);
        let color = p.color.lerp(GOLD, Self::gold_mix(p));
        trail_from(p, p.velocity * 0.05, dim(color, 0.55), p.size * 0.5, life)
    }

    fn encode_gpu(&self, p: &Particle) -> GpuParticle {
        let mut gpu = GpuParticle::from_particle(p);
        gpu.color = p.color.lerp(GOLD, Self::gold_mix(p)).to_array();
        gpu
    }
}

/// Stars thrown in one direction with high speed variance
pub struct Comet;

const COMET_TRAIL_INTERVAL: f32 = 0.02;
const COMET_CONE: f32 = 0.2;

impl Behavior for Comet {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 60.0,
            drag: 0.6,
            lifespan_min: 1.0,
            lifespan_max: 1.8,
            spread_angle: 120.0,
            force: 300.0,
            secondary_enabled: true,
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
        let half = ctx.tuning.spread_angle.to_radians() * 0.5;
        let heading = -FRAC_PI_2 + ctx.random_range(-half, half);
        let stars = (count / 2).max(1);
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            stars,
            is_secondary,
            BurstShape::default(),
            |p, ctx, _| {
                let angle = heading + ctx.random_range(-COMET_CONE, COMET_CONE);
                let speed = force * ctx.random_range(0.3, 1.3);
                p.velocity = Vec2::from_angle(angle) * speed;
            },
        );
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(trail_timer(p), dt, COMET_TRAIL_INTERVAL)
    }
}

/// Few stars dragging long tails that keep part of their momentum
pub struct Tail;

const TAIL_TRAIL_INTERVAL: f32 = 0.025;

impl Behavior for Tail {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 120.0,
            drag: 0.7,
            lifespan_min: 1.6,
            lifespan_max: 2.4,
            spread_angle: 360.0,
            force: 260.0,
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
        let stars = (count / 4).clamp(1, 8);
        let shape = BurstShape {
            speed_jitter: 0.2,
            angle_jitter: 0.2,
            size_scale: 1.4,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, stars, is_secondary, shape, |_, _, _| {});
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(trail_timer(p), dt, TAIL_TRAIL_INTERVAL)
    }

    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let life = ctx.random_range(0.5, 0.9);
        trail_from(p, p.velocity * 0.4, dim(p.color, 0.7), p.size * 0.8, life)
    }
}

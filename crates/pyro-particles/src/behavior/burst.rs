//! Round bursts: classic, peony, chrysanthemum, pistil, stars, pearls

use super::{dim, radial_burst, trail_tick, Behavior, BurstShape};
use crate::context::SimContext;
use crate::particle::Particle;
use crate::tuning::TuningDefaults;
use glam::{Vec2, Vec4};
use std::f32::consts::TAU;

/// Even sphere with moderate speed variance
pub struct Classic;

impl Behavior for Classic {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults::default()
    }
}

/// Tight, uniform circle with almost no speed variance
pub struct Peony;

impl Behavior for Peony {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 80.0,
            drag: 1.1,
            lifespan_min: 1.0,
            lifespan_max: 1.6,
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
        let shape = BurstShape {
            speed_jitter: 0.06,
            angle_jitter: 0.0,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, count, is_secondary, shape, |_, _, _| {});
    }
}

/// Peony whose stars leave short tails.
///
/// `behavior_data[0]`: seconds until the next tail particle
pub struct Chrysanthemum;

const CHRYSANTHEMUM_TRAIL_INTERVAL: f32 = 0.05;

impl Behavior for Chrysanthemum {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 70.0,
            drag: 1.2,
            lifespan_min: 1.4,
            lifespan_max: 2.2,
            spread_angle: 360.0,
            force: 230.0,
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
        let shape = BurstShape {
            speed_jitter: 0.1,
            angle_jitter: 0.02,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, count, is_secondary, shape, |p, ctx, _| {
            // Stagger tails so a burst does not emit in lockstep
            p.behavior_data[0] = ctx.random_range(0.0, CHRYSANTHEMUM_TRAIL_INTERVAL);
        });
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(&mut p.behavior_data[0], dt, CHRYSANTHEMUM_TRAIL_INTERVAL)
    }
}

/// Outer ring around a slower core of a contrasting color.
///
/// `behavior_data[0]`: layer, 0 = ring, 1 = core
pub struct Pistil;

impl Pistil {
    pub fn layer(p: &Particle) -> f32 {
        p.behavior_data[0]
    }
}

impl Behavior for Pistil {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 85.0,
            drag: 1.0,
            lifespan_min: 1.2,
            lifespan_max: 1.8,
            spread_angle: 360.0,
            force: 250.0,
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
        let core = count / 3;
        let ring = count - core;
        let shape = BurstShape {
            speed_jitter: 0.08,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, ring, is_secondary, shape, |_, _, _| {});

        let core_color = ctx.random_color();
        let core_shape = BurstShape {
            speed_jitter: 0.2,
            size_scale: 1.3,
            life_scale: 0.8,
            ..BurstShape::default()
        };
        radial_burst(
            ctx,
            origin,
            force * 0.45,
            core_color,
            core,
            is_secondary,
            core_shape,
            |p, _, _| p.behavior_data[0] = 1.0,
        );
    }
}

/// Small slow stars that twinkle.
///
/// `behavior_data[0]`: twinkle phase (radians),
/// `behavior_data[1]`: twinkle rate (radians/s)
pub struct Stars;

impl Stars {
    pub fn twinkle_phase(p: &Particle) -> f32 {
        p.behavior_data[0]
    }

    pub fn twinkle_rate(p: &Particle) -> f32 {
        p.behavior_data[1]
    }
}

impl Behavior for Stars {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 40.0,
            drag: 1.4,
            lifespan_min: 1.6,
            lifespan_max: 2.6,
            spread_angle: 360.0,
            force: 160.0,
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
        let shape = BurstShape {
            speed_jitter: 0.6,
            angle_jitter: 0.3,
            size_scale: 0.7,
            ..BurstShape::default()
        };
        radial_burst(ctx, origin, force, base_color, count, is_secondary, shape, |p, ctx, _| {
            p.behavior_data[0] = ctx.random_range(0.0, TAU);
            p.behavior_data[1] = ctx.random_range(6.0, 14.0) * TAU;
        });
    }

    fn update_particle(&self, p: &mut Particle, dt: f32, _total_time: f32) {
        p.behavior_data[0] = (p.behavior_data[0] + p.behavior_data[1] * dt).rem_euclid(TAU);
    }
}

/// A handful of large, nearly weightless stars that stop quickly
pub struct Pearls;

impl Behavior for Pearls {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 8.0,
            drag: 2.6,
            lifespan_min: 1.8,
            lifespan_max: 2.6,
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
        base_color: Vec4,
        count: usize,
        is_secondary: bool,
    ) {
        let shape = BurstShape {
            speed_jitter: 0.02,
            angle_jitter: 0.0,
            size_scale: 2.2,
            ..BurstShape::default()
        };
        let pearls = (count / 3).max(6);
        let color = dim(base_color, 1.2);
        radial_burst(ctx, origin, force, color, pearls, is_secondary, shape, |_, _, _| {});
    }
}

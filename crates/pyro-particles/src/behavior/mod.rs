//! Behavior strategies: per-style motion and spawn rules
//!
//! A style is a static strategy object reached through [`Style::behavior`].
//! Every capability has a provided default, so a style only implements what
//! makes it different. The pool and the effect never branch on style; they
//! call these capabilities and push [`Behavior::defaults`] into the global
//! tuning when a style becomes active.
//!
//! `Particle::behavior_data` is reused with a different meaning per style;
//! each style module documents its layout next to its accessors. The top flag
//! bit, [`FLAG_TRAIL`], is shared: it marks tail particles so they never emit
//! tails, bursts or splits of their own.

mod burst;
mod crossette;
mod sparkle;
mod style;
mod trailing;

pub use burst::{Chrysanthemum, Classic, Pearls, Peony, Pistil, Stars};
pub use crossette::Crossette;
pub use sparkle::{Crackling, Fish, Glitter, Spinner, Strobe, STROBE_LIT};
pub use style::Style;
pub use trailing::{Brocade, Comet, Palm, Tail, Willow};

use crate::context::{SimContext, SpawnOrigin};
use crate::particle::{GpuParticle, Particle};
use crate::tuning::TuningDefaults;
use glam::{Vec2, Vec4};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Set on every tail particle
pub const FLAG_TRAIL: u32 = 1 << 31;

/// Children produced by one split
pub const SPLIT_COUNT: usize = 4;

/// One primary star in this many carries a secondary burst
const SECONDARY_CARRIER_STRIDE: usize = 6;

/// Per-style rules
pub trait Behavior: Send + Sync {
    /// The style's physics envelope
    fn defaults(&self) -> TuningDefaults;

    /// Style-specific motion for one tick. Generic gravity, drag and
    /// integration have already been applied; this must not touch `age`.
    fn update_particle(&self, _p: &mut Particle, _dt: f32, _total_time: f32) {}

    /// Request `count` stars around `origin`
    fn spawn_explosion(
        &self,
        ctx: &mut SimContext<'_>,
        origin: Vec2,
        force: f32,
        base_color: Vec4,
        count: usize,
        is_secondary: bool,
    ) {
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            count,
            is_secondary,
            BurstShape::default(),
            |_, _, _| {},
        );
    }

    /// Fire this star's child burst once its delay has passed.
    /// `has_spawned_child` latches before the burst so it can never repeat.
    fn spawn_secondary(&self, p: &mut Particle, ctx: &mut SimContext<'_>) {
        if !p.can_spawn_child
            || p.has_spawned_child
            || !ctx.tuning.secondary_active()
            || !ctx.allows(SpawnOrigin::Secondary)
            || p.elapsed() < ctx.tuning.secondary.delay
        {
            return;
        }
        p.has_spawned_child = true;
        let force = ctx.tuning.secondary.force;
        let count = ctx.tuning.secondary.count;
        self.spawn_explosion(ctx, p.position, force, p.color, count, true);
    }

    fn has_trail_particles(&self) -> bool {
        false
    }

    /// Whether `p` leaves a tail particle this tick. Implementations throttle
    /// themselves; at most one tail per star per tick.
    fn should_spawn_trail(&self, _p: &mut Particle, _dt: f32) -> bool {
        false
    }

    /// A dim, short-lived particle left where `p` is now
    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let life = ctx.random_range(0.25, 0.45);
        trail_from(p, p.velocity * 0.1, dim(p.color, 0.6), p.size * 0.6, life)
    }

    /// The split capability, for styles that create stars from stars
    fn splitter(&self) -> Option<&dyn SplitBehavior> {
        None
    }

    /// Pack a particle for the GPU
    fn encode_gpu(&self, p: &Particle) -> GpuParticle {
        GpuParticle::from_particle(p)
    }
}

/// Stars that split into [`SPLIT_COUNT`] children partway through their life
pub trait SplitBehavior {
    /// Called once per tick; returns true exactly once per splitting star
    fn should_split(&self, p: &mut Particle) -> bool;

    /// Child `split_index` of `p`. Children share the parent's remaining life.
    fn create_split_star(&self, p: &Particle, ctx: &mut SimContext<'_>, split_index: usize) -> Particle;
}

/// Angular and speed distribution of a radial burst
#[derive(Debug, Clone, Copy)]
pub(crate) struct BurstShape {
    /// Fraction of `force` a star may randomly lose
    pub speed_jitter: f32,
    /// Random angular offset per star, radians
    pub angle_jitter: f32,
    pub size_scale: f32,
    pub life_scale: f32,
}

impl Default for BurstShape {
    fn default() -> Self {
        Self {
            speed_jitter: 0.35,
            angle_jitter: 0.05,
            size_scale: 1.0,
            life_scale: 1.0,
        }
    }
}

/// Spread `count` stars over the configured arc around screen-up.
/// `init` runs on each star before it is queued.
#[allow(clippy::too_many_arguments)]
pub(crate) fn radial_burst<F>(
    ctx: &mut SimContext<'_>,
    origin: Vec2,
    force: f32,
    color: Vec4,
    count: usize,
    is_secondary: bool,
    shape: BurstShape,
    mut init: F,
) where
    F: FnMut(&mut Particle, &mut SimContext<'_>, usize),
{
    if count == 0 {
        return;
    }
    let spawn_origin = if is_secondary {
        SpawnOrigin::Secondary
    } else {
        SpawnOrigin::Burst
    };
    let spread = ctx.tuning.spread_angle.to_radians();
    let full_circle = spread >= TAU - 1e-3;
    let carriers = !is_secondary && ctx.tuning.secondary_active();
    let (life_scale, size_scale) = if is_secondary {
        (shape.life_scale * 0.5, shape.size_scale * 0.7)
    } else {
        (shape.life_scale, shape.size_scale)
    };

    for i in 0..count {
        let base_angle = if full_circle {
            i as f32 / count as f32 * TAU
        } else {
            let t = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.5
            };
            -FRAC_PI_2 - spread * 0.5 + spread * t
        };
        let angle = base_angle + ctx.random_range(-shape.angle_jitter, shape.angle_jitter);
        let speed = force * (1.0 - shape.speed_jitter * ctx.random_f32());
        let size = ctx.random_size() * size_scale;
        let life = ctx.random_lifespan() * life_scale;

        let mut p = Particle::new(origin, Vec2::from_angle(angle) * speed, color, size, life);
        p.can_spawn_child = carriers && i % SECONDARY_CARRIER_STRIDE == 0;
        init(&mut p, ctx, i);
        ctx.spawn(p, spawn_origin);
    }
}

/// Count down a trail timer stored in behavior data; true when it fires
pub(crate) fn trail_tick(timer: &mut f32, dt: f32, interval: f32) -> bool {
    *timer -= dt;
    if *timer <= 0.0 {
        *timer = interval;
        true
    } else {
        false
    }
}

/// A tail particle at `p`'s position
pub(crate) fn trail_from(p: &Particle, velocity: Vec2, color: Vec4, size: f32, life: f32) -> Particle {
    let mut trail = Particle::new(p.position, velocity, color, size, life);
    trail.behavior_flags = FLAG_TRAIL;
    trail
}

pub(crate) fn is_trail(p: &Particle) -> bool {
    p.behavior_flags & FLAG_TRAIL != 0
}

/// Scale rgb by `factor`, leaving alpha
pub(crate) fn dim(color: Vec4, factor: f32) -> Vec4 {
    Vec4::new(color.x * factor, color.y * factor, color.z * factor, color.w)
}

/// Rotate a velocity by `angle` radians
pub(crate) fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

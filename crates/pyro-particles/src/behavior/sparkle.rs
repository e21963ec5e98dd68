//! Sparkling and moving styles: crackling, strobe, glitter, spinner, fish

use super::{dim, radial_burst, rotate, trail_from, trail_tick, Behavior, BurstShape};
use crate::context::SimContext;
use crate::particle::{GpuParticle, Particle};
use crate::tuning::TuningDefaults;
use glam::{Vec2, Vec4};
use std::f32::consts::TAU;

/// Stars that start popping with small white-gold crackles late in life.
///
/// `behavior_data[0]`: seconds until the next pop,
/// `behavior_data[1]`: this star's pop interval
pub struct Crackling;

const CRACKLE_COLOR: Vec4 = Vec4::new(1.0, 0.92, 0.6, 1.0);
/// Pops start once a star has burned through this much of its life
const CRACKLE_START_RATIO: f32 = 0.6;

impl Behavior for Crackling {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 90.0,
            drag: 1.3,
            lifespan_min: 1.2,
            lifespan_max: 1.8,
            spread_angle: 360.0,
            force: 210.0,
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
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            count,
            is_secondary,
            BurstShape::default(),
            |p, ctx, _| {
                let interval = ctx.random_range(0.05, 0.15);
                p.behavior_data[0] = interval;
                p.behavior_data[1] = interval;
            },
        );
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        if p.life_ratio() >= CRACKLE_START_RATIO {
            return false;
        }
        let interval = p.behavior_data[1];
        trail_tick(&mut p.behavior_data[0], dt, interval)
    }

    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let dir = Vec2::from_angle(ctx.random_range(0.0, TAU));
        let life = ctx.random_range(0.1, 0.2);
        trail_from(p, dir * 40.0, CRACKLE_COLOR, p.size * 0.5, life)
    }
}

/// Stars that blink on and off.
///
/// `behavior_data[0]`: blink phase in cycles,
/// `behavior_data[1]`: blink frequency (Hz)
pub struct Strobe;

/// Set while a strobe star is in the lit half of its cycle
pub const STROBE_LIT: u32 = 1 << 0;

impl Strobe {
    pub fn is_lit(p: &Particle) -> bool {
        p.behavior_flags & STROBE_LIT != 0
    }
}

impl Behavior for Strobe {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 70.0,
            drag: 1.5,
            lifespan_min: 2.0,
            lifespan_max: 3.0,
            spread_angle: 360.0,
            force: 190.0,
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
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            count,
            is_secondary,
            BurstShape::default(),
            |p, ctx, _| {
                p.behavior_data[0] = ctx.random_f32();
                p.behavior_data[1] = ctx.random_range(8.0, 16.0);
                p.behavior_flags |= STROBE_LIT;
            },
        );
    }

    fn update_particle(&self, p: &mut Particle, dt: f32, _total_time: f32) {
        let phase = (p.behavior_data[0] + p.behavior_data[1] * dt).fract();
        p.behavior_data[0] = phase;
        if phase < 0.5 {
            p.behavior_flags |= STROBE_LIT;
        } else {
            p.behavior_flags &= !STROBE_LIT;
        }
    }

    fn encode_gpu(&self, p: &Particle) -> GpuParticle {
        let mut gpu = GpuParticle::from_particle(p);
        if !Self::is_lit(p) {
            gpu.color = dim(p.color, 0.15).to_array();
        }
        gpu
    }
}

/// Stars shedding white sparks that fall away slowly
pub struct Glitter;

const GLITTER_TRAIL_INTERVAL: f32 = 0.04;

impl Behavior for Glitter {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 100.0,
            drag: 1.4,
            lifespan_min: 1.4,
            lifespan_max: 2.0,
            spread_angle: 360.0,
            force: 200.0,
            secondary_enabled: false,
        }
    }

    fn has_trail_particles(&self) -> bool {
        true
    }

    fn should_spawn_trail(&self, p: &mut Particle, dt: f32) -> bool {
        trail_tick(&mut p.behavior_data[0], dt, GLITTER_TRAIL_INTERVAL)
    }

    fn create_trail_particle(&self, p: &Particle, ctx: &mut SimContext<'_>) -> Particle {
        let life = ctx.random_range(0.3, 0.6);
        trail_from(p, Vec2::new(0.0, 20.0), Vec4::ONE, p.size * 0.4, life)
    }
}

/// Stars whose heading keeps turning, tracing spirals.
///
/// `behavior_data[0]`: turn rate (radians/s, signed),
/// `behavior_data[1]`: accumulated turn (radians)
pub struct Spinner;

impl Behavior for Spinner {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 50.0,
            drag: 1.0,
            lifespan_min: 1.2,
            lifespan_max: 1.8,
            spread_angle: 360.0,
            force: 180.0,
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
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            count,
            is_secondary,
            BurstShape::default(),
            |p, ctx, _| {
                let rate = ctx.random_range(3.0, 6.0);
                p.behavior_data[0] = if ctx.random_int(0, 1) == 0 { rate } else { -rate };
            },
        );
    }

    fn update_particle(&self, p: &mut Particle, dt: f32, _total_time: f32) {
        let turn = p.behavior_data[0] * dt;
        p.velocity = rotate(p.velocity, turn);
        p.behavior_data[1] = (p.behavior_data[1] + turn).rem_euclid(TAU);
    }
}

/// Stars that wriggle side to side as they swim outward.
///
/// `behavior_data[0]`: phase offset, `[1]`: frequency (radians/s),
/// `[2]`: amplitude (radians/s of turn)
pub struct Fish;

impl Behavior for Fish {
    fn defaults(&self) -> TuningDefaults {
        TuningDefaults {
            gravity: 40.0,
            drag: 0.8,
            lifespan_min: 1.6,
            lifespan_max: 2.4,
            spread_angle: 360.0,
            force: 170.0,
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
        radial_burst(
            ctx,
            origin,
            force,
            base_color,
            count,
            is_secondary,
            BurstShape::default(),
            |p, ctx, _| {
                p.behavior_data[0] = ctx.random_range(0.0, TAU);
                p.behavior_data[1] = ctx.random_range(6.0, 10.0);
                p.behavior_data[2] = ctx.random_range(2.0, 4.0);
            },
        );
    }

    fn update_particle(&self, p: &mut Particle, dt: f32, total_time: f32) {
        let [phase, freq, amp, _] = p.behavior_data;
        let turn = amp * (total_time * freq + phase).sin() * dt;
        p.velocity = rotate(p.velocity, turn);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use super::super::{is_trail, Style};
    use super::*;

    fn one(style: Style) -> Particle {
        let mut h = Harness::new(77);
        h.tuning.apply_defaults(&style.behavior().defaults());
        style
            .behavior()
            .spawn_explosion(&mut h.ctx(false), Vec2::ZERO, 200.0, Vec4::ONE, 1, false);
        h.drain()[0]
    }

    #[test]
    fn crackling_waits_until_late_in_life() {
        let mut p = one(Style::Crackling);
        assert!((0.05..0.15).contains(&p.behavior_data[1]));
        for _ in 0..50 {
            assert!(!Crackling.should_spawn_trail(&mut p, 0.05));
        }
        p.age = p.max_age * 0.5;
        let pops = (0..20).filter(|_| Crackling.should_spawn_trail(&mut p, 0.05)).count();
        assert!(pops >= 5, "pops {pops}");
    }

    #[test]
    fn crackle_pops_are_short_and_flagged() {
        let mut h = Harness::new(8);
        let star = Particle::new(Vec2::ZERO, Vec2::ZERO, Vec4::ONE, 2.0, 1.0);
        let pop = Crackling.create_trail_particle(&star, &mut h.ctx(false));
        assert!(is_trail(&pop));
        assert!(pop.max_age <= 0.2);
        assert!((pop.velocity.length() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn strobe_blinks() {
        let mut p = one(Style::Strobe);
        p.behavior_data[0] = 0.0;
        p.behavior_data[1] = 10.0;
        Strobe.update_particle(&mut p, 0.02, 0.0);
        assert!(Strobe::is_lit(&p));
        Strobe.update_particle(&mut p, 0.04, 0.0);
        assert!(!Strobe::is_lit(&p));
        let gpu = Strobe.encode_gpu(&p);
        assert!(gpu.color[0] < p.color.x);
        assert_eq!(gpu.flags & STROBE_LIT, 0);
    }

    #[test]
    fn spinner_turns_without_changing_speed() {
        let mut p = one(Style::Spinner);
        let rate = p.behavior_data[0];
        assert!((3.0..6.0).contains(&rate.abs()));
        let speed = p.velocity.length();
        let before = p.velocity;
        Spinner.update_particle(&mut p, 0.1, 0.0);
        assert!((p.velocity.length() - speed).abs() < 1e-2);
        let turned = before.angle_to(p.velocity);
        assert!((turned - rate * 0.1).abs() < 1e-3);
    }

    #[test]
    fn fish_wiggles_both_ways() {
        let mut p = one(Style::Fish);
        let mut left = false;
        let mut right = false;
        for i in 0..200 {
            let before = p.velocity;
            Fish.update_particle(&mut p, 0.01, i as f32 * 0.01);
            let turn = before.angle_to(p.velocity);
            left |= turn > 0.0;
            right |= turn < 0.0;
        }
        assert!(left && right);
    }

    #[test]
    fn glitter_sparks_fall() {
        let mut h = Harness::new(2);
        let star = Particle::new(Vec2::ZERO, Vec2::new(0.0, -100.0), Vec4::ONE, 2.0, 1.0);
        let spark = Glitter.create_trail_particle(&star, &mut h.ctx(false));
        assert!(spark.velocity.y > 0.0);
        assert_eq!(spark.color, Vec4::ONE);
    }
}

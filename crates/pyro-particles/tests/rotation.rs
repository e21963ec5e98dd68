use glam::{Vec2, Vec4};
use pyro_core::ConfigSnapshot;
use pyro_particles::sequencer::SequencerState;
use pyro_particles::{FireworksEffect, Particle, Style};
use std::collections::HashSet;

fn long_lived() -> Particle {
    Particle::new(Vec2::new(640.0, 360.0), Vec2::ZERO, Vec4::ONE, 2.0, 100.0)
}

#[test]
fn swap_waits_for_long_lived_particles() {
    let mut fx = FireworksEffect::with_seed(11);
    fx.apply_config(
        &ConfigSnapshot::new()
            .with("launch.auto", false)
            .with("style", "peony")
            .with("wave.enabled", true)
            .with("wave.duration", 2.0f32)
            .with("wave.styles", "peony, willow"),
    );
    assert_eq!(fx.active_style(), Style::Peony);

    // Wave runs out around tick 20 while particles keep coming
    for _ in 0..21 {
        fx.pool_mut().spawn(long_lived());
        fx.step(0.1, 0.0, &[]);
        assert_eq!(fx.active_style(), Style::Peony);
    }
    assert!(fx.is_transitioning());
    assert_eq!(fx.sequencer().map(|s| s.state()), Some(SequencerState::Transitioning(1)));

    for _ in 0..30 {
        fx.pool_mut().spawn(long_lived());
        fx.step(0.1, 0.0, &[]);
        assert!(fx.is_transitioning());
        assert_eq!(fx.active_style(), Style::Peony);
    }

    // Spawning stops; the swap happens only once everything has drained
    let mut swapped = false;
    for _ in 0..100 {
        fx.step(2.0, 0.0, &[]);
        if fx.active_style() == Style::Willow {
            assert_eq!(fx.pool().count_alive(), 0);
            swapped = true;
            break;
        }
        assert!(fx.pool().count_alive() > 0);
    }
    assert!(swapped);
    assert!(!fx.is_transitioning());
    let diagnostics = fx.sequencer().map(|s| *s.diagnostics()).unwrap_or_default();
    assert_eq!(diagnostics.transitions, 1);
    assert!(diagnostics.stall_ticks > 30);
}

#[test]
fn manual_bursts_are_refused_while_draining() {
    let mut fx = FireworksEffect::with_seed(13);
    fx.apply_config(
        &ConfigSnapshot::new()
            .with("launch.auto", false)
            .with("style", "peony")
            .with("wave.enabled", true)
            .with("wave.duration", 0.5f32)
            .with("wave.styles", "peony, palm"),
    );
    fx.pool_mut().spawn(long_lived());
    for _ in 0..6 {
        fx.step(0.1, 0.0, &[]);
    }
    assert!(fx.is_transitioning());

    let alive = fx.pool().count_alive();
    let accepted = fx.spawn_stats().accepted.burst;
    assert!(!fx.burst_at(Vec2::new(400.0, 300.0)));
    fx.step(0.1, 0.0, &[]);

    assert_eq!(fx.pool().count_alive(), alive);
    assert_eq!(fx.spawn_stats().accepted.burst, accepted);
    assert_eq!(fx.spawn_stats().suppressed.burst, 1);

    // Once steady again, manual bursts go through
    fx.pool_mut().clear();
    fx.step(0.1, 0.0, &[]);
    assert_eq!(fx.active_style(), Style::Palm);
    assert!(fx.burst_at(Vec2::new(400.0, 300.0)));
    fx.step(0.0, 0.0, &[]);
    assert!(fx.pool().count_alive() > 0);
}

#[test]
fn nothing_but_shell_bursts_spawn_while_draining() {
    let mut fx = FireworksEffect::with_seed(5);
    fx.apply_config(
        &ConfigSnapshot::new()
            .with("style", "chrysanthemum")
            .with("launch.interval", 0.2f32)
            .with("secondary.delay", 0.2f32)
            .with("wave.enabled", true)
            .with("wave.duration", 2.0f32)
            .with("wave.styles", "chrysanthemum, crossette, glitter"),
    );

    let dt = 1.0 / 60.0;
    let mut draining_ticks = 0;
    let mut swaps = 0;
    let mut style = fx.active_style();
    for frame in 0..(60 * 40) {
        let draining = fx.is_transitioning();
        let before = *fx.spawn_stats();
        fx.step(dt, frame as f32 * dt, &[]);
        let after = *fx.spawn_stats();

        if draining {
            draining_ticks += 1;
            assert_eq!(after.accepted.trail, before.accepted.trail);
            assert_eq!(after.accepted.secondary, before.accepted.secondary);
            assert_eq!(after.accepted.split, before.accepted.split);
            assert_eq!(after.accepted.launch, before.accepted.launch);
        }
        if fx.active_style() != style {
            assert_eq!(fx.pool().count_alive(), 0);
            assert_eq!(fx.in_flight(), 0);
            style = fx.active_style();
            swaps += 1;
        }
    }
    assert!(swaps >= 2, "swaps {swaps}");
    assert!(draining_ticks > 0);

    let stats = fx.spawn_stats();
    assert!(stats.accepted.trail > 0);
    assert!(stats.suppressed.total() > 0);
}

#[test]
fn empty_effect_cycles_through_every_style() {
    let mut fx = FireworksEffect::with_seed(8);
    fx.apply_config(
        &ConfigSnapshot::new()
            .with("launch.auto", false)
            .with("wave.enabled", true)
            .with("wave.duration", 0.2f32),
    );

    let n = Style::ALL.len();
    let mut shown = vec![fx.active_style()];
    let mut ticks = 0;
    while shown.len() < n && ticks < 10_000 {
        fx.step(0.25, 0.0, &[]);
        if fx.active_style() != shown[shown.len() - 1] {
            shown.push(fx.active_style());
        }
        ticks += 1;
    }
    let unique: HashSet<Style> = shown.iter().copied().collect();
    assert_eq!(unique.len(), n);
}

#[test]
fn disabling_rotation_keeps_current_style() {
    let mut fx = FireworksEffect::with_seed(2);
    fx.apply_config(
        &ConfigSnapshot::new()
            .with("launch.auto", false)
            .with("wave.enabled", true)
            .with("wave.duration", 0.1f32),
    );
    for _ in 0..10 {
        fx.step(0.2, 0.0, &[]);
    }
    let current = fx.active_style();
    fx.apply_config(&ConfigSnapshot::new().with("wave.enabled", false));
    assert!(fx.sequencer().is_none());
    for _ in 0..10 {
        fx.step(0.2, 0.0, &[]);
    }
    assert_eq!(fx.active_style(), current);
}

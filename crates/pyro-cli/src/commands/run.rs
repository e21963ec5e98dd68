//! Run command: drive the fireworks effect against a headless device

use anyhow::{Context, Result};
use pyro_core::ConfigSnapshot;
use pyro_particles::sequencer::SequencerDiagnostics;
use pyro_particles::{keys, FireworksEffect, SpawnStats, Style};
use pyro_runtime::{EffectSystem, GameClock, HeadlessRenderContext, InputEvent, InputQueue};
use serde::Serialize;

pub struct RunArgs {
    pub config: Option<String>,
    pub frames: u64,
    pub fps: f64,
    pub sim_hz: f64,
    pub seed: Option<u64>,
    pub style: Option<String>,
    pub click_interval: Option<f64>,
    pub json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    frames: u64,
    sim_steps: u64,
    seconds: f64,
    final_style: Style,
    styles_shown: Vec<Style>,
    peak_alive: usize,
    final_alive: usize,
    draw_calls: usize,
    bytes_uploaded: u64,
    spawns: SpawnStats,
    rotation: Option<SequencerDiagnostics>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ConfigSnapshot::load(path).with_context(|| format!("Failed to load config '{path}'"))?,
        None => ConfigSnapshot::new(),
    };
    if let Some(name) = &args.style {
        let style: Style = name.parse().context("Invalid --style")?;
        config.set("style", style.name());
    }
    for key in keys::unknown_keys(&config) {
        tracing::warn!("ignoring unknown config key '{key}'");
    }

    let mut effect = match args.seed {
        Some(seed) => FireworksEffect::with_seed(seed),
        None => FireworksEffect::new(),
    };
    effect.initialize(&config).context("Failed to initialize effect")?;

    let mut device = HeadlessRenderContext::new();
    let mut clock = GameClock::with_fixed_timestep(args.sim_hz);
    let mut input = InputQueue::new();
    let frame_time = 1.0 / args.fps.max(1.0);
    let mut next_click = args.click_interval.map(|interval| interval.max(0.01));
    let mut clicks = 0u32;

    let mut sim_steps = 0u64;
    let mut sim_time = 0.0f64;
    let mut peak_alive = 0;
    let mut draw_calls = 0;
    let mut styles_shown = vec![effect.active_style()];

    for _ in 0..args.frames {
        clock.advance(frame_time);

        if let (Some(at), Some(interval)) = (next_click, args.click_interval) {
            if clock.total_time >= at {
                let [width, height] = effect.tuning().viewport;
                // Golden-ratio spacing spreads clicks across the screen
                let t = (clicks as f32 * 0.618_034).fract();
                input.push(InputEvent::Click {
                    x: width * (0.15 + 0.7 * t),
                    y: height * 0.3,
                });
                clicks += 1;
                next_click = Some(at + interval.max(0.01));
            }
        }

        let mut events = step_input(&clock, &mut input);
        while clock.should_fixed_update() {
            sim_time += clock.fixed_timestep;
            effect.update(clock.fixed_timestep, sim_time, &events)?;
            events.clear();
            clock.consume_fixed_step();
            sim_steps += 1;

            let style = effect.active_style();
            if styles_shown.last() != Some(&style) {
                styles_shown.push(style);
            }
        }

        effect.render(&mut device).context("Render failed")?;
        peak_alive = peak_alive.max(effect.frame_stats().alive);
        draw_calls += device.draw_calls().len();
        device.clear_draw_calls();
    }

    let summary = RunSummary {
        frames: args.frames,
        sim_steps,
        seconds: sim_time,
        final_style: effect.active_style(),
        styles_shown,
        peak_alive,
        final_alive: effect.pool().count_alive(),
        draw_calls,
        bytes_uploaded: device.bytes_uploaded(),
        spawns: *effect.spawn_stats(),
        rotation: effect.sequencer().map(|s| *s.diagnostics()),
    };
    effect.shutdown()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Input for this frame's simulation steps. A frame that runs no step
/// leaves its events queued for the next one.
fn step_input(clock: &GameClock, input: &mut InputQueue) -> Vec<InputEvent> {
    if clock.should_fixed_update() {
        input.drain()
    } else {
        Vec::new()
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Ran {} frames ({} simulation steps, {:.2}s)",
        summary.frames, summary.sim_steps, summary.seconds
    );
    let shown: Vec<&str> = summary.styles_shown.iter().map(|s| s.name()).collect();
    println!("Styles shown: {}", shown.join(" -> "));
    println!("Final style: {}", summary.final_style);
    println!("Particles: peak {}, final {}", summary.peak_alive, summary.final_alive);
    println!("Uploaded: {} bytes", summary.bytes_uploaded);

    let spawns = &summary.spawns;
    println!();
    println!("Spawns (accepted / suppressed):");
    println!("  launch     {:>8} / {}", spawns.accepted.launch, spawns.suppressed.launch);
    println!("  burst      {:>8} / {}", spawns.accepted.burst, spawns.suppressed.burst);
    println!("  secondary  {:>8} / {}", spawns.accepted.secondary, spawns.suppressed.secondary);
    println!("  trail      {:>8} / {}", spawns.accepted.trail, spawns.suppressed.trail);
    println!("  split      {:>8} / {}", spawns.accepted.split, spawns.suppressed.split);
    println!("  dropped    {:>8}", spawns.dropped);

    if let Some(rotation) = &summary.rotation {
        println!();
        println!(
            "Rotation: {} transitions, {} cycles, {} drain ticks",
            rotation.transitions, rotation.cycles, rotation.stall_ticks
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_wait_for_a_simulation_step() {
        let mut clock = GameClock::with_fixed_timestep(60.0);
        let mut input = InputQueue::new();

        // Render at 120 Hz: the first frame runs no step
        clock.advance(1.0 / 120.0);
        input.push(InputEvent::Click { x: 10.0, y: 20.0 });
        assert!(step_input(&clock, &mut input).is_empty());
        assert_eq!(input.len(), 1);

        clock.advance(1.0 / 120.0 + 1e-6);
        let events = step_input(&clock, &mut input);
        assert_eq!(events.len(), 1);
        assert!(input.is_empty());
    }
}

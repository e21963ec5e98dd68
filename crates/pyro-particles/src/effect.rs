//! The fireworks effect: one pool, one active style, optional rotation

use crate::behavior::{is_trail, Style, FLAG_TRAIL, SPLIT_COUNT};
use crate::context::{DefaultHooks, SimContext, SimHooks, SpawnOrigin, SpawnQueue, SpawnStats};
use crate::particle::GpuParticle;
use crate::pool::ParticlePool;
use crate::sequencer::{Population, StyleSequencer};
use crate::tuning::{StyleOverrides, Tuning, WaveConfig};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use pyro_core::{ConfigSnapshot, Result};
use pyro_runtime::{BufferHandle, EffectSystem, InputEvent, RenderContext, ShaderHandle};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Pool capacity used until configuration says otherwise
pub const DEFAULT_CAPACITY: usize = 4096;
/// Shells that may be in the air at once
pub const MAX_LAUNCHES: usize = 32;
/// Set on the GPU record of a rising shell
pub const FLAG_SHELL: u32 = 1 << 30;

const VERTICES_PER_PARTICLE: u32 = 6;
const SHELL_SIZE: f32 = 2.5;
const PARTICLE_SHADER: &str = include_str!("particle.wgsl");

/// A shell on its way up. It bursts with the active style when it reaches
/// `target_y`.
#[derive(Debug, Clone, Copy)]
struct Launch {
    position: Vec2,
    velocity: Vec2,
    target_y: f32,
    color: Vec4,
}

impl Launch {
    fn encode(&self) -> GpuParticle {
        GpuParticle {
            position: self.position.to_array(),
            velocity: self.velocity.to_array(),
            color: self.color.to_array(),
            size: SHELL_SIZE,
            age: 1.0,
            max_age: 1.0,
            behavior_data: [0.0; 4],
            flags: FLAG_SHELL,
        }
    }
}

/// Uniforms shared by every instance
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GpuGlobals {
    viewport: [f32; 2],
    time: f32,
    _pad: f32,
}

#[derive(Debug, Clone, Copy)]
struct GpuResources {
    shader: ShaderHandle,
    globals: BufferHandle,
    instances: BufferHandle,
    /// Instances the buffer was sized for
    capacity: usize,
}

/// Summary of the last frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameStats {
    pub alive: usize,
    pub in_flight: usize,
    pub spawned: usize,
    pub drawn: usize,
}

pub struct FireworksEffect {
    pool: ParticlePool,
    style: Style,
    tuning: Tuning,
    overrides: StyleOverrides,
    wave: WaveConfig,
    sequencer: Option<StyleSequencer>,
    launches: Vec<Launch>,
    launch_timer: f32,
    queue: SpawnQueue,
    hooks: Box<dyn SimHooks + Send>,
    rng: SmallRng,
    snapshot: Vec<GpuParticle>,
    gpu: Option<GpuResources>,
    time: f32,
    frame: FrameStats,
}

impl FireworksEffect {
    pub fn new() -> Self {
        Self::with_hooks(Box::new(DefaultHooks::new()), SmallRng::from_entropy())
    }

    /// Fully deterministic effect for tests and reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_hooks(
            Box::new(DefaultHooks::seeded(seed)),
            SmallRng::seed_from_u64(seed.wrapping_add(1)),
        )
    }

    /// Effect using driver-supplied color and random hooks
    pub fn with_hooks(hooks: Box<dyn SimHooks + Send>, rng: SmallRng) -> Self {
        let style = Style::DEFAULT;
        let overrides = StyleOverrides::new();
        let mut tuning = Tuning::default();
        tuning.apply_defaults(&overrides.resolve(style));
        let pool = ParticlePool::new(DEFAULT_CAPACITY);
        let queue = SpawnQueue::with_limit(pool.capacity());
        Self {
            pool,
            style,
            tuning,
            overrides,
            wave: WaveConfig::default(),
            sequencer: None,
            launches: Vec::with_capacity(MAX_LAUNCHES),
            launch_timer: 0.0,
            queue,
            hooks,
            rng,
            snapshot: Vec::new(),
            gpu: None,
            time: 0.0,
            frame: FrameStats::default(),
        }
    }

    /// Re-apply a settings snapshot. Missing keys keep their current values.
    pub fn apply_config(&mut self, config: &ConfigSnapshot) {
        if let Some(capacity) = config.get_usize("pool.capacity") {
            self.pool.resize(capacity);
            self.queue.set_limit(self.pool.capacity());
        }

        self.tuning.apply_config(config);
        self.overrides.apply_config(config);

        if let Some(name) = config.get_str("style") {
            let style = Style::resolve(name);
            if self.sequencer.is_some() {
                tracing::debug!("style '{style}' ignored while rotation is on");
            } else if style != self.style {
                self.activate(style);
            }
        }
        // Overrides for the active style may have changed
        self.tuning.apply_defaults(&self.overrides.resolve(self.style));

        let previous = self.wave.clone();
        self.wave.apply_config(config);
        match (previous.enabled, self.wave.enabled) {
            (_, true) if !previous.enabled || previous.styles != self.wave.styles => {
                self.start_rotation();
            }
            (true, false) => {
                tracing::debug!("style rotation off");
                self.sequencer = None;
            }
            _ => {}
        }
    }

    fn start_rotation(&mut self) {
        let styles = self.wave.rotation();
        self.sequencer = Some(StyleSequencer::new(&styles, self.style, &self.wave, &mut self.rng));
    }

    /// Switch style immediately. With rotation on, the rotation restarts from
    /// this style.
    pub fn set_style(&mut self, style: Style) {
        self.activate(style);
        if self.sequencer.is_some() {
            self.start_rotation();
        }
    }

    fn activate(&mut self, style: Style) {
        tracing::info!("style {} -> {}", self.style, style);
        self.style = style;
        self.tuning.apply_defaults(&self.overrides.resolve(style));
    }

    /// Send a shell from `from` up to the height of `target`. Refused while a
    /// style hand-off is draining or when `MAX_LAUNCHES` shells are airborne.
    pub fn launch(&mut self, from: Vec2, target: Vec2) -> bool {
        if self.is_transitioning() {
            self.queue.note(SpawnOrigin::Launch, false);
            return false;
        }
        if self.launches.len() >= MAX_LAUNCHES {
            return false;
        }
        let rise = (from.y - target.y).max(1.0);
        let flight_time = rise / self.tuning.launch.speed;
        let velocity = Vec2::new((target.x - from.x) / flight_time, -self.tuning.launch.speed);
        let color = self.hooks.random_color();
        self.launches.push(Launch {
            position: from,
            velocity,
            target_y: target.y,
            color,
        });
        self.queue.note(SpawnOrigin::Launch, true);
        true
    }

    /// Burst the active style at `position` right away, as if a shell had
    /// reached it. Particles arrive in the pool on the next `update`.
    /// Refused while a style hand-off is draining.
    pub fn burst_at(&mut self, position: Vec2) -> bool {
        if self.is_transitioning() {
            self.queue.note(SpawnOrigin::Burst, false);
            return false;
        }
        let color = self.hooks.random_color();
        let (force, count) = (self.tuning.force, self.tuning.burst_count);
        let mut ctx = SimContext::new(self.time, 0.0, &self.tuning, self.hooks.as_mut(), &mut self.queue, false);
        self.style
            .behavior()
            .spawn_explosion(&mut ctx, position, force, color, count, false);
        true
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32, total_time: f32, input: &[InputEvent]) {
        self.time = total_time;
        for event in input {
            match *event {
                InputEvent::Click { x, y } => {
                    let from = Vec2::new(x, self.tuning.viewport[1]);
                    self.launch(from, Vec2::new(x, y));
                }
                InputEvent::Resize { width, height } => {
                    self.tuning.viewport = [width.max(1.0), height.max(1.0)];
                }
            }
        }
        self.auto_launch(dt);

        let draining = self.is_transitioning();
        let behavior = self.style.behavior();
        let (gravity, drag) = (self.tuning.gravity, self.tuning.drag);
        let (force, count) = (self.tuning.force, self.tuning.burst_count);
        let mut ctx = SimContext::new(
            total_time,
            dt,
            &self.tuning,
            self.hooks.as_mut(),
            &mut self.queue,
            draining,
        );

        // Shells already in the air still burst in their own style
        self.launches.retain_mut(|shell| {
            shell.position += shell.velocity * dt;
            if shell.position.y > shell.target_y {
                return true;
            }
            behavior.spawn_explosion(&mut ctx, shell.position, force, shell.color, count, false);
            false
        });

        let damping = (1.0 - drag * dt).max(0.0);
        self.pool.update(dt, |p| {
            p.velocity.y += gravity * dt;
            p.velocity *= damping;
            p.position += p.velocity * dt;
            if is_trail(p) {
                return;
            }
            behavior.update_particle(p, dt, total_time);
            if draining {
                return;
            }

            behavior.spawn_secondary(p, &mut ctx);
            if behavior.has_trail_particles() && behavior.should_spawn_trail(p, dt) {
                let trail = behavior.create_trail_particle(p, &mut ctx);
                ctx.spawn(trail, SpawnOrigin::Trail);
            }
            if let Some(splitter) = behavior.splitter() {
                if splitter.should_split(p) {
                    for i in 0..SPLIT_COUNT {
                        let child = splitter.create_split_star(p, &mut ctx, i);
                        ctx.spawn(child, SpawnOrigin::Split);
                    }
                    // Children carry the rest of the parent's life
                    p.age = 0.0;
                }
            }
        });
        drop(ctx);

        let spawned = self.queue.flush_into(&mut self.pool);
        self.frame.spawned = spawned;
        self.frame.in_flight = self.launches.len();

        let next = match self.sequencer.as_mut() {
            Some(sequencer) => {
                let pool = &self.pool;
                let in_flight = self.launches.len();
                let population = || Population {
                    alive: pool.count_alive(),
                    in_flight,
                };
                sequencer.tick(dt, population, &self.wave, &mut self.rng)
            }
            None => None,
        };
        if let Some(style) = next {
            self.activate(style);
        }
    }

    fn auto_launch(&mut self, dt: f32) {
        if !self.tuning.launch.auto || self.is_transitioning() {
            return;
        }
        self.launch_timer -= dt;
        if self.launch_timer > 0.0 {
            return;
        }
        self.launch_timer = self.tuning.launch.interval;
        let [width, height] = self.tuning.viewport;
        let x = width * (0.1 + 0.8 * self.hooks.random_f32());
        let target_y = height * (0.15 + 0.3 * self.hooks.random_f32());
        self.launch(Vec2::new(x, height), Vec2::new(x, target_y));
    }

    /// Upload live particles and in-flight shells and draw them
    pub fn draw(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        let capacity = self.pool.capacity() + MAX_LAUNCHES;
        let gpu = self.ensure_gpu(ctx, capacity)?;
        if self.snapshot.len() != capacity {
            self.snapshot.resize(capacity, GpuParticle::zeroed());
        }

        let behavior = self.style.behavior();
        let mut count = self.pool.copy_to_snapshot(&mut self.snapshot, capacity, |p| {
            if is_trail(p) {
                GpuParticle::from_particle(p)
            } else {
                behavior.encode_gpu(p)
            }
        });
        for shell in &self.launches {
            if count >= capacity {
                break;
            }
            self.snapshot[count] = shell.encode();
            count += 1;
        }

        self.frame.alive = self.pool.count_alive();
        self.frame.drawn = count;
        let globals = GpuGlobals {
            viewport: self.tuning.viewport,
            time: self.time,
            _pad: 0.0,
        };
        ctx.update_buffer(gpu.globals, bytemuck::bytes_of(&globals))?;
        if count == 0 {
            return Ok(());
        }
        ctx.update_buffer(gpu.instances, bytemuck::cast_slice(&self.snapshot[..count]))?;
        ctx.draw_instanced(gpu.shader, gpu.instances, VERTICES_PER_PARTICLE, count as u32)
    }

    fn ensure_gpu(&mut self, ctx: &mut dyn RenderContext, capacity: usize) -> Result<GpuResources> {
        if let Some(gpu) = self.gpu {
            if gpu.capacity == capacity {
                return Ok(gpu);
            }
        }
        let (shader, globals) = match self.gpu {
            Some(gpu) => (gpu.shader, gpu.globals),
            None => {
                let shader = ctx.compile_shader("fireworks", PARTICLE_SHADER)?;
                let globals = ctx.create_buffer("fireworks.globals", std::mem::size_of::<GpuGlobals>())?;
                (shader, globals)
            }
        };
        let instances = ctx.create_buffer("fireworks.instances", capacity * GpuParticle::STRIDE)?;
        tracing::debug!("instance buffer sized for {capacity} particles");
        let gpu = GpuResources {
            shader,
            globals,
            instances,
            capacity,
        };
        self.gpu = Some(gpu);
        Ok(gpu)
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    pub fn active_style(&self) -> Style {
        self.style
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn wave(&self) -> &WaveConfig {
        &self.wave
    }

    pub fn sequencer(&self) -> Option<&StyleSequencer> {
        self.sequencer.as_ref()
    }

    /// True while a style hand-off is waiting for the pool to drain
    pub fn is_transitioning(&self) -> bool {
        self.sequencer.as_ref().is_some_and(StyleSequencer::is_transitioning)
    }

    pub fn in_flight(&self) -> usize {
        self.launches.len()
    }

    pub fn spawn_stats(&self) -> &SpawnStats {
        self.queue.stats()
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.frame
    }
}

impl Default for FireworksEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectSystem for FireworksEffect {
    fn initialize(&mut self, config: &ConfigSnapshot) -> Result<()> {
        self.apply_config(config);
        tracing::info!(
            "fireworks ready: style {}, pool {}, rotation {}",
            self.style,
            self.pool.capacity(),
            if self.sequencer.is_some() { "on" } else { "off" }
        );
        Ok(())
    }

    fn update(&mut self, dt: f64, total_time: f64, input: &[InputEvent]) -> Result<()> {
        self.step(dt as f32, total_time as f32, input);
        Ok(())
    }

    fn render(&mut self, ctx: &mut dyn RenderContext) -> Result<()> {
        self.draw(ctx)
    }

    fn apply_config(&mut self, config: &ConfigSnapshot) {
        FireworksEffect::apply_config(self, config);
    }

    fn shutdown(&mut self) -> Result<()> {
        self.pool.clear();
        self.launches.clear();
        self.gpu = None;
        tracing::info!("fireworks shut down");
        Ok(())
    }

    fn name(&self) -> &str {
        "fireworks"
    }
}

// Trail and shell markers must not collide with style flag bits
const _: () = assert!(FLAG_TRAIL & FLAG_SHELL == 0);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use pyro_runtime::HeadlessRenderContext;

    fn quiet() -> FireworksEffect {
        let mut fx = FireworksEffect::with_seed(42);
        fx.apply_config(&ConfigSnapshot::new().with("launch.auto", false));
        fx
    }

    #[test]
    fn click_launches_a_shell_that_bursts() {
        let mut fx = quiet();
        fx.step(0.0, 0.0, &[InputEvent::Click { x: 300.0, y: 200.0 }]);
        assert_eq!(fx.in_flight(), 1);
        assert_eq!(fx.pool().count_alive(), 0);

        let mut t = 0.0;
        while fx.in_flight() > 0 && t < 5.0 {
            t += 0.016;
            fx.step(0.016, t, &[]);
        }
        assert_eq!(fx.in_flight(), 0);
        let burst = fx.tuning().burst_count;
        assert!(fx.pool().count_alive() >= burst);
        assert_eq!(fx.spawn_stats().accepted.launch, 1);
    }

    #[test]
    fn launches_are_bounded() {
        let mut fx = quiet();
        for i in 0..(MAX_LAUNCHES + 5) {
            let x = i as f32 * 10.0;
            fx.launch(Vec2::new(x, 700.0), Vec2::new(x, 100.0));
        }
        assert_eq!(fx.in_flight(), MAX_LAUNCHES);
    }

    #[test]
    fn auto_launch_fires_on_interval() {
        let mut fx = FireworksEffect::with_seed(3);
        fx.apply_config(&ConfigSnapshot::new().with("launch.interval", 0.5f32));
        fx.step(0.1, 0.1, &[]);
        assert_eq!(fx.in_flight(), 1);
        fx.step(0.1, 0.2, &[]);
        assert_eq!(fx.spawn_stats().accepted.launch, 1);
        for i in 0..5 {
            fx.step(0.1, 0.3 + i as f32 * 0.1, &[]);
        }
        assert_eq!(fx.spawn_stats().accepted.launch, 2);
    }

    #[test]
    fn config_sets_style_capacity_and_overrides() {
        let mut fx = quiet();
        fx.apply_config(
            &ConfigSnapshot::new()
                .with("style", "Willow")
                .with("pool.capacity", 0)
                .with("willow.gravity", 333.0f32),
        );
        assert_eq!(fx.active_style(), Style::Willow);
        assert_eq!(fx.pool().capacity(), crate::pool::MIN_CAPACITY);
        assert!((fx.tuning().gravity - 333.0).abs() < 1e-6);

        fx.apply_config(&ConfigSnapshot::new().with("style", "nope"));
        assert_eq!(fx.active_style(), Style::DEFAULT);
    }

    #[test]
    fn wave_toggle_builds_and_tears_down_sequencer() {
        let mut fx = quiet();
        fx.apply_config(&ConfigSnapshot::new().with("wave.enabled", true));
        assert!(fx.sequencer().is_some());
        assert_eq!(fx.sequencer().map(|s| s.order()[0]), Some(Style::DEFAULT));
        assert!(!fx.is_transitioning());

        fx.apply_config(&ConfigSnapshot::new().with("wave.enabled", false));
        assert!(fx.sequencer().is_none());
    }

    #[test]
    fn crossette_stars_split_into_four() {
        let mut fx = quiet();
        fx.set_style(Style::Crossette);
        fx.burst_at(Vec2::new(400.0, 300.0));
        fx.step(0.0, 0.0, &[]);
        let stars = fx.pool().count_alive();
        assert!(stars >= 4);

        let mut t = 0.0;
        while fx.spawn_stats().accepted.split == 0 && t < 3.0 {
            t += 0.02;
            fx.step(0.02, t, &[]);
        }
        let splits = fx.spawn_stats().accepted.split;
        assert!(splits > 0);
        assert_eq!(splits % SPLIT_COUNT as u64, 0);
    }

    #[test]
    fn oversized_burst_is_bounded_by_hard_limit() {
        let mut fx = quiet();
        fx.apply_config(&ConfigSnapshot::new().with("burst.count", 20_000_000i64));
        fx.set_style(Style::Peony);
        assert!(fx.burst_at(Vec2::new(400.0, 300.0)));
        fx.step(0.0, 0.0, &[]);
        let stats = fx.spawn_stats();
        assert!(stats.accepted.burst <= crate::pool::HARD_LIMIT as u64);
        assert_eq!(fx.pool().count_alive(), fx.pool().capacity());
    }

    #[test]
    fn trail_particles_never_emit() {
        let mut fx = quiet();
        fx.set_style(Style::Willow);
        let mut trail = Particle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec4::ONE, 1.0, 5.0);
        trail.behavior_flags = FLAG_TRAIL;
        for _ in 0..10 {
            fx.pool_mut().spawn(trail);
        }
        for i in 0..30 {
            fx.step(0.05, i as f32 * 0.05, &[]);
        }
        assert_eq!(fx.spawn_stats().accepted.trail, 0);
        assert_eq!(fx.pool().count_alive(), 10);
    }

    #[test]
    fn render_uploads_live_particles_and_shells() {
        let mut fx = quiet();
        let mut device = HeadlessRenderContext::new();
        fx.burst_at(Vec2::new(200.0, 200.0));
        fx.step(0.0, 0.0, &[]);
        fx.launch(Vec2::new(50.0, 700.0), Vec2::new(50.0, 100.0));
        fx.draw(&mut device).unwrap();

        let alive = fx.pool().count_alive();
        let calls = device.draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].vertices_per_instance, 6);
        assert_eq!(calls[0].instance_count as usize, alive + 1);
        let upload = device.last_upload(calls[0].buffer).unwrap();
        assert_eq!(upload.len(), (alive + 1) * GpuParticle::STRIDE);

        let records: Vec<GpuParticle> = upload
            .chunks_exact(GpuParticle::STRIDE)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert!(records.iter().all(|r| r.age > 0.0));
        assert_eq!(records[alive].flags, FLAG_SHELL);
        assert_eq!(device.shader_labels(), ["fireworks".to_string()]);
    }

    #[test]
    fn buffer_is_recreated_after_resize() {
        let mut fx = quiet();
        let mut device = HeadlessRenderContext::new();
        fx.draw(&mut device).unwrap();
        let before = device.buffer_count();
        fx.draw(&mut device).unwrap();
        assert_eq!(device.buffer_count(), before);

        fx.apply_config(&ConfigSnapshot::new().with("pool.capacity", 64));
        fx.draw(&mut device).unwrap();
        assert_eq!(device.buffer_count(), before + 1);
        assert_eq!(device.shader_labels().len(), 1);
    }
}

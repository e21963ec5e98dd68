//! Global tuning, per-style overrides and wave settings
//!
//! Everything here is read from a `ConfigSnapshot` with the same rule: a
//! missing key leaves the current value alone, and a bad value is clamped to
//! something safe instead of being rejected.

use crate::behavior::Style;
use crate::pool::HARD_LIMIT;
use pyro_core::ConfigSnapshot;
use serde::Serialize;
use std::collections::HashMap;

/// Shortest lifespan a particle may be given, in seconds
pub const MIN_LIFESPAN: f32 = 0.05;
/// Shortest wave a rotation may use, in seconds
pub const MIN_WAVE_DURATION: f32 = 0.1;
/// Longest wave a rotation may use, in seconds
pub const MAX_WAVE_DURATION: f32 = 3600.0;

/// A style's characteristic physics envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningDefaults {
    /// Downward acceleration in px/s²
    pub gravity: f32,
    /// Linear velocity damping per second
    pub drag: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
    /// Burst arc in degrees (360 = full circle)
    pub spread_angle: f32,
    /// Initial burst speed in px/s
    pub force: f32,
    pub secondary_enabled: bool,
}

impl Default for TuningDefaults {
    fn default() -> Self {
        Self {
            gravity: 90.0,
            drag: 0.9,
            lifespan_min: 1.2,
            lifespan_max: 2.0,
            spread_angle: 360.0,
            force: 220.0,
            secondary_enabled: true,
        }
    }
}

/// Child bursts fired from still-alive stars
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondaryTuning {
    /// Configuration switch; the active style must also allow secondaries
    pub enabled: bool,
    /// Seconds after spawn before a star may burst
    pub delay: f32,
    /// Stars per child burst
    pub count: usize,
    /// Child burst speed in px/s
    pub force: f32,
}

impl Default for SecondaryTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: 0.6,
            count: 12,
            force: 90.0,
        }
    }
}

/// Shell launching
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaunchTuning {
    /// Launch shells on a timer without input
    pub auto: bool,
    /// Seconds between automatic launches
    pub interval: f32,
    /// Upward shell speed in px/s
    pub speed: f32,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            auto: true,
            interval: 0.8,
            speed: 520.0,
        }
    }
}

/// Global tuning shared by the pool's generic physics step and every strategy call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tuning {
    pub size_min: f32,
    pub size_max: f32,
    pub lifespan_min: f32,
    pub lifespan_max: f32,
    pub spread_angle: f32,
    pub gravity: f32,
    pub drag: f32,
    pub force: f32,
    /// Stars per primary burst
    pub burst_count: usize,
    pub secondary: SecondaryTuning,
    /// Whether the active style allows secondary bursts
    pub style_secondary: bool,
    pub launch: LaunchTuning,
    /// Screen size in pixels
    pub viewport: [f32; 2],
}

impl Default for Tuning {
    fn default() -> Self {
        let mut tuning = Self {
            size_min: 1.5,
            size_max: 3.5,
            lifespan_min: 0.0,
            lifespan_max: 0.0,
            spread_angle: 0.0,
            gravity: 0.0,
            drag: 0.0,
            force: 0.0,
            burst_count: 120,
            secondary: SecondaryTuning::default(),
            style_secondary: false,
            launch: LaunchTuning::default(),
            viewport: [1280.0, 720.0],
        };
        tuning.apply_defaults(&TuningDefaults::default());
        tuning
    }
}

impl Tuning {
    /// Push a style's envelope into the global tuning
    pub fn apply_defaults(&mut self, defaults: &TuningDefaults) {
        self.gravity = defaults.gravity;
        self.drag = defaults.drag.max(0.0);
        self.lifespan_min = defaults.lifespan_min;
        self.lifespan_max = defaults.lifespan_max;
        self.spread_angle = defaults.spread_angle;
        self.force = defaults.force.max(0.0);
        self.style_secondary = defaults.secondary_enabled;
        self.sanitize();
    }

    /// Secondary bursts are on only when both the setting and the style allow them
    pub fn secondary_active(&self) -> bool {
        self.secondary.enabled && self.style_secondary
    }

    /// Read the global (non per-style) keys
    pub fn apply_config(&mut self, config: &ConfigSnapshot) {
        if let Some(v) = config.get_f32("size.min") {
            self.size_min = v;
        }
        if let Some(v) = config.get_f32("size.max") {
            self.size_max = v;
        }
        if let Some(v) = config.get_usize("burst.count") {
            self.burst_count = v;
        }
        if let Some(v) = config.get_bool("secondary.enabled") {
            self.secondary.enabled = v;
        }
        if let Some(v) = config.get_f32("secondary.delay") {
            self.secondary.delay = v;
        }
        if let Some(v) = config.get_usize("secondary.count") {
            self.secondary.count = v;
        }
        if let Some(v) = config.get_f32("secondary.force") {
            self.secondary.force = v;
        }
        if let Some(v) = config.get_bool("launch.auto") {
            self.launch.auto = v;
        }
        if let Some(v) = config.get_f32("launch.interval") {
            self.launch.interval = v;
        }
        if let Some(v) = config.get_f32("launch.speed") {
            self.launch.speed = v;
        }
        if let Some(v) = config.get_vec2("viewport") {
            self.viewport = v;
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        let fallback = TuningDefaults::default();
        self.size_min = finite_or(self.size_min, 1.5).max(0.1);
        self.size_max = finite_or(self.size_max, 3.5).max(0.1);
        order_pair(&mut self.size_min, &mut self.size_max);
        self.lifespan_min = finite_or(self.lifespan_min, fallback.lifespan_min).max(MIN_LIFESPAN);
        self.lifespan_max = finite_or(self.lifespan_max, fallback.lifespan_max).max(MIN_LIFESPAN);
        order_pair(&mut self.lifespan_min, &mut self.lifespan_max);
        self.spread_angle = finite_or(self.spread_angle, fallback.spread_angle).clamp(0.0, 360.0);
        self.gravity = finite_or(self.gravity, fallback.gravity);
        self.drag = finite_or(self.drag, fallback.drag);
        self.force = finite_or(self.force, fallback.force);
        // Bursts larger than the pool would only be dropped
        self.burst_count = self.burst_count.clamp(1, HARD_LIMIT);
        self.secondary.delay = finite_or(self.secondary.delay, 0.6).max(0.0);
        self.secondary.count = self.secondary.count.clamp(1, HARD_LIMIT);
        self.secondary.force = finite_or(self.secondary.force, 90.0).max(0.0);
        self.launch.interval = finite_or(self.launch.interval, 0.8).max(0.05);
        self.launch.speed = finite_or(self.launch.speed, 520.0).max(1.0);
        self.viewport = [
            finite_or(self.viewport[0], 1280.0).max(1.0),
            finite_or(self.viewport[1], 720.0).max(1.0),
        ];
    }
}

/// Per-style partial override of `TuningDefaults`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TuningOverride {
    pub gravity: Option<f32>,
    pub drag: Option<f32>,
    pub lifespan_min: Option<f32>,
    pub lifespan_max: Option<f32>,
    pub spread_angle: Option<f32>,
    pub force: Option<f32>,
}

impl TuningOverride {
    pub fn apply(&self, defaults: &mut TuningDefaults) {
        if let Some(v) = self.gravity {
            defaults.gravity = v;
        }
        if let Some(v) = self.drag {
            defaults.drag = v;
        }
        if let Some(v) = self.lifespan_min {
            defaults.lifespan_min = v;
        }
        if let Some(v) = self.lifespan_max {
            defaults.lifespan_max = v;
        }
        if let Some(v) = self.spread_angle {
            defaults.spread_angle = v;
        }
        if let Some(v) = self.force {
            defaults.force = v;
        }
    }
}

/// Style-keyed overrides read from `<style>.gravity`, `<style>.drag`, ...
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides {
    overrides: HashMap<Style, TuningOverride>,
}

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, style: Style, value: TuningOverride) {
        self.overrides.insert(style, value);
    }

    pub fn get(&self, style: Style) -> Option<&TuningOverride> {
        self.overrides.get(&style)
    }

    /// Read every `<style>.<field>` key. Fields already overridden keep their
    /// value unless the snapshot names them again.
    pub fn apply_config(&mut self, config: &ConfigSnapshot) {
        for style in Style::ALL {
            let name = style.name();
            let key = |field: &str| format!("{name}.{field}");
            let entry = self.overrides.entry(style).or_default();
            if let Some(v) = config.get_f32(&key("gravity")) {
                entry.gravity = Some(v);
            }
            if let Some(v) = config.get_f32(&key("drag")) {
                entry.drag = Some(v);
            }
            if let Some(v) = config.get_f32(&key("lifespan_min")) {
                entry.lifespan_min = Some(v);
            }
            if let Some(v) = config.get_f32(&key("lifespan_max")) {
                entry.lifespan_max = Some(v);
            }
            if let Some(v) = config.get_f32(&key("spread_angle")) {
                entry.spread_angle = Some(v);
            }
            if let Some(v) = config.get_f32(&key("force")) {
                entry.force = Some(v);
            }
        }
        self.overrides.retain(|_, o| *o != TuningOverride::default());
    }

    /// A style's defaults with any configured overrides layered on top
    pub fn resolve(&self, style: Style) -> TuningDefaults {
        let mut defaults = style.behavior().defaults();
        if let Some(o) = self.overrides.get(&style) {
            o.apply(&mut defaults);
        }
        defaults
    }
}

/// Style rotation ("random wave") settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveConfig {
    pub enabled: bool,
    /// Pick each wave's length uniformly from `[duration_min, duration_max]`
    pub randomize: bool,
    pub duration: f32,
    pub duration_min: f32,
    pub duration_max: f32,
    /// Styles in rotation; empty means all of them
    pub styles: Vec<Style>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            randomize: false,
            duration: 20.0,
            duration_min: 10.0,
            duration_max: 30.0,
            styles: Vec::new(),
        }
    }
}

impl WaveConfig {
    pub fn apply_config(&mut self, config: &ConfigSnapshot) {
        if let Some(v) = config.get_bool("wave.enabled") {
            self.enabled = v;
        }
        if let Some(v) = config.get_bool("wave.randomize") {
            self.randomize = v;
        }
        if let Some(v) = config.get_f32("wave.duration") {
            self.duration = v;
        }
        if let Some(v) = config.get_f32("wave.duration_min") {
            self.duration_min = v;
        }
        if let Some(v) = config.get_f32("wave.duration_max") {
            self.duration_max = v;
        }
        if let Some(list) = config.get_str("wave.styles") {
            self.styles.clear();
            for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match name.parse::<Style>() {
                    Ok(style) if !self.styles.contains(&style) => self.styles.push(style),
                    Ok(_) => {}
                    Err(_) => tracing::warn!("wave.styles: skipping unknown style '{name}'"),
                }
            }
        }
        self.sanitize();
    }

    /// Styles taking part in the rotation
    pub fn rotation(&self) -> Vec<Style> {
        if self.styles.is_empty() {
            Style::ALL.to_vec()
        } else {
            self.styles.clone()
        }
    }

    fn sanitize(&mut self) {
        let clamp = |v: f32, fallback: f32| finite_or(v, fallback).clamp(MIN_WAVE_DURATION, MAX_WAVE_DURATION);
        self.duration = clamp(self.duration, 20.0);
        self.duration_min = clamp(self.duration_min, 10.0);
        self.duration_max = clamp(self.duration_max, 30.0);
        order_pair(&mut self.duration_min, &mut self.duration_max);
    }
}

fn order_pair(min: &mut f32, max: &mut f32) {
    if *min > *max {
        std::mem::swap(min, max);
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

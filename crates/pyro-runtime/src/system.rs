//! Effect system trait

use crate::input::InputEvent;
use crate::render::RenderContext;
use pyro_core::{ConfigSnapshot, Result};

/// An effect that can be driven by the game loop
///
/// The driver calls `update` then `render` exactly once each per frame, in
/// that order, on a single thread. Settings changes arrive through
/// `apply_config` between frames.
pub trait EffectSystem {
    /// Called once before the first frame
    fn initialize(&mut self, config: &ConfigSnapshot) -> Result<()>;

    /// Advance the simulation by `dt` seconds
    fn update(&mut self, dt: f64, total_time: f64, input: &[InputEvent]) -> Result<()>;

    /// Upload and draw the current frame
    fn render(&mut self, ctx: &mut dyn RenderContext) -> Result<()>;

    /// Re-apply a settings snapshot. Missing keys keep their current values.
    fn apply_config(&mut self, config: &ConfigSnapshot);

    /// Called when the effect is being stopped
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this effect
    fn name(&self) -> &str;
}

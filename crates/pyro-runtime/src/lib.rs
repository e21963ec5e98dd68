//! Pyro Runtime - Driver-facing boundary
//!
//! Provides the pieces a game loop needs to host an effect:
//! - `GameClock`: frame time tracking with a fixed-timestep accumulator
//! - `InputEvent` / `InputQueue`: per-frame input handed to `update`
//! - `RenderContext`: the graphics-device boundary effects draw through
//! - `HeadlessRenderContext`: a recording render context for tools and tests
//! - `EffectSystem`: trait for effects ticked by the driver

mod clock;
mod headless;
mod input;
mod render;
mod system;

pub use clock::GameClock;
pub use headless::{DrawCall, HeadlessRenderContext};
pub use input::{InputEvent, InputQueue};
pub use render::{BufferHandle, RenderContext, ShaderHandle};
pub use system::EffectSystem;

//! Pyro Particles - pooled firework simulation
//!
//! Provides the simulation core behind the fireworks effect:
//! - Fixed-capacity particle pool with cursor-based slot reuse
//! - Seventeen firework styles as static behavior strategies
//! - Per-frame simulation context with drain-aware spawn accounting
//! - Style rotation gated on the pool draining between styles
//! - GPU snapshot packing for a single instanced draw

pub mod behavior;
pub mod context;
pub mod effect;
pub mod keys;
pub mod particle;
pub mod pool;
pub mod sequencer;
pub mod tuning;

pub use behavior::{Behavior, SplitBehavior, Style};
pub use context::{DefaultHooks, SimContext, SimHooks, SpawnOrigin, SpawnStats};
pub use effect::{FireworksEffect, FrameStats};
pub use particle::{GpuParticle, Particle};
pub use pool::ParticlePool;
pub use sequencer::{SequencerState, StyleSequencer};
pub use tuning::{Tuning, TuningDefaults, WaveConfig};

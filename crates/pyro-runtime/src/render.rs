//! Graphics-device boundary
//!
//! Effects never talk to a GPU API directly. They compile one shader, own one
//! instance buffer, upload a packed snapshot of live particles each frame and
//! issue a single instanced draw.

use pyro_core::Result;

/// Opaque handle to a compiled shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Opaque handle to a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Minimal render-device interface consumed by effects
pub trait RenderContext {
    /// Compile a WGSL shader module
    fn compile_shader(&mut self, label: &str, source: &str) -> Result<ShaderHandle>;

    /// Create a buffer of `size` bytes
    fn create_buffer(&mut self, label: &str, size: usize) -> Result<BufferHandle>;

    /// Upload `data` to the start of `buffer`
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<()>;

    /// Draw `instance_count` instances of `vertices_per_instance` vertices,
    /// reading per-instance data from `buffer`
    fn draw_instanced(
        &mut self,
        shader: ShaderHandle,
        buffer: BufferHandle,
        vertices_per_instance: u32,
        instance_count: u32,
    ) -> Result<()>;
}

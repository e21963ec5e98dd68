//! Headless render context that records device calls instead of issuing them

use crate::render::{BufferHandle, RenderContext, ShaderHandle};
use pyro_core::{PyroError, Result};

/// One recorded `draw_instanced` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub shader: ShaderHandle,
    pub buffer: BufferHandle,
    pub vertices_per_instance: u32,
    pub instance_count: u32,
}

struct RecordedBuffer {
    label: String,
    data: Vec<u8>,
    bytes_used: usize,
}

/// Render context with no device behind it
///
/// Keeps the contents of every buffer and a log of draw calls so tools and
/// tests can inspect exactly what an effect would have sent to the GPU.
/// Uploads larger than the buffer they target are rejected, like a real device.
#[derive(Default)]
pub struct HeadlessRenderContext {
    shaders: Vec<String>,
    buffers: Vec<RecordedBuffer>,
    draw_calls: Vec<DrawCall>,
    bytes_uploaded: u64,
}

impl HeadlessRenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of every compiled shader, in compile order
    pub fn shader_labels(&self) -> &[String] {
        &self.shaders
    }

    /// Number of buffers created so far
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Label of a buffer
    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(buffer.0 as usize).map(|b| b.label.as_str())
    }

    /// Allocated size of a buffer in bytes
    pub fn buffer_size(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(buffer.0 as usize).map(|b| b.data.len())
    }

    /// Bytes written by the most recent upload to `buffer`
    pub fn last_upload(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers
            .get(buffer.0 as usize)
            .map(|b| &b.data[..b.bytes_used])
    }

    /// Every draw call recorded since the last `clear_draw_calls`
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Forget recorded draw calls (call between frames)
    pub fn clear_draw_calls(&mut self) {
        self.draw_calls.clear();
    }

    /// Total bytes uploaded over the lifetime of this context
    pub fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }
}

impl RenderContext for HeadlessRenderContext {
    fn compile_shader(&mut self, label: &str, source: &str) -> Result<ShaderHandle> {
        if source.trim().is_empty() {
            return Err(PyroError::Render(format!("shader '{label}' has no source")));
        }
        self.shaders.push(label.to_string());
        Ok(ShaderHandle(self.shaders.len() as u32 - 1))
    }

    fn create_buffer(&mut self, label: &str, size: usize) -> Result<BufferHandle> {
        tracing::debug!("headless buffer '{label}' ({size} bytes)");
        self.buffers.push(RecordedBuffer {
            label: label.to_string(),
            data: vec![0; size],
            bytes_used: 0,
        });
        Ok(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) -> Result<()> {
        let target = self
            .buffers
            .get_mut(buffer.0 as usize)
            .ok_or_else(|| PyroError::Render(format!("unknown buffer {}", buffer.0)))?;
        if data.len() > target.data.len() {
            return Err(PyroError::Render(format!(
                "upload of {} bytes overflows buffer '{}' ({} bytes)",
                data.len(),
                target.label,
                target.data.len()
            )));
        }
        target.data[..data.len()].copy_from_slice(data);
        target.bytes_used = data.len();
        self.bytes_uploaded += data.len() as u64;
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        shader: ShaderHandle,
        buffer: BufferHandle,
        vertices_per_instance: u32,
        instance_count: u32,
    ) -> Result<()> {
        if shader.0 as usize >= self.shaders.len() {
            return Err(PyroError::Render(format!("unknown shader {}", shader.0)));
        }
        if buffer.0 as usize >= self.buffers.len() {
            return Err(PyroError::Render(format!("unknown buffer {}", buffer.0)));
        }
        self.draw_calls.push(DrawCall {
            shader,
            buffer,
            vertices_per_instance,
            instance_count,
        });
        Ok(())
    }
}

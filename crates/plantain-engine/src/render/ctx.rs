use crate::device::Gpu;

use super::Vertex;

/// Device handles the renderer's `ensure_*` helpers work with.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(gpu: &'a Gpu<'_>) -> Self {
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            surface_format: gpu.surface_format(),
        }
    }

    /// Largest texture edge the device accepts.
    #[inline]
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Most vertices one buffer can hold on this device.
    #[inline]
    pub fn max_vertices(&self) -> usize {
        max_vertices_for(self.device.limits().max_buffer_size)
    }
}

pub(crate) fn max_vertices_for(max_buffer_size: u64) -> usize {
    let per_vertex = std::mem::size_of::<Vertex>() as u64;
    usize::try_from(max_buffer_size / per_vertex).unwrap_or(usize::MAX)
}

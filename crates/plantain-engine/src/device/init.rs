/// Adapter and surface preferences used by `Gpu::new`.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when the surface offers one.
    ///
    /// Off by default: [`Color`](crate::paint::Color) channels and uploaded
    /// images are sRGB-encoded and written to the target unchanged, so an
    /// sRGB surface would brighten everything.
    pub prefer_srgb: bool,

    /// Swap behavior. `Fifo` is supported everywhere and caps the frame rate
    /// at the display refresh.
    pub present_mode: wgpu::PresentMode,

    /// Preferred alpha mode; an unsupported choice falls back to the first
    /// mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Hint for how many frames may be queued ahead of presentation.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_not_srgb() {
        assert!(!GpuInit::default().prefer_srgb);
    }
}

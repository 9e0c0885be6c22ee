//! GPU device and window surface.
//!
//! - [`Gpu`]: instance/adapter/device/queue plus the configured surface
//! - [`GpuInit`]: adapter and surface preferences
//! - [`GpuFrame`]: one acquired swapchain image with its encoder

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;

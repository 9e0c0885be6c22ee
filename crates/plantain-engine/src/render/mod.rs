//! Batched immediate-mode renderer.
//!
//! - [`Canvas`]: CPU frame recorder; expands shapes, text and textures into
//!   [`Vertex`] batches per render target and orders them into passes
//! - [`Renderer`]: wgpu resources; one vertex upload and one draw per pass
//! - [`Framebuffer`]: off-screen targets sampled like textures
//!
//! Convention:
//! - CPU geometry is in pixels of the bound target (top-left origin, +Y down).
//! - Vertices carry clip-space positions; the shader does no transform.

mod batch;
mod canvas;
mod ctx;
mod framebuffer;
mod options;
mod quad;
mod renderer;
mod vertex;

pub use batch::{CapacityError, VertexBatch, INITIAL_VERTEX_CAPACITY};
pub use canvas::{Canvas, FontId, FramePlan, Pass, PassTarget, TargetDesc, DEFAULT_VERTEX_LIMIT};
pub use ctx::RenderCtx;
pub use framebuffer::{
    Framebuffer, FramebufferError, FramebufferId, MAX_FRAMEBUFFERS, MAX_FRAMEBUFFER_DIMENSION,
};
pub use options::{TextOptions, TextureOptions};
pub use renderer::{DrawStats, Renderer};
pub use vertex::{OpCode, Vertex};

//! Rendering backend for glasspane.
//!
//! This crate provides the wgpu-based half of the planar-reflection
//! renderer:
//! - GPU resource management (buffers, textures, the offscreen reflection
//!   target)
//! - Shader compilation and management (WGSL)
//! - The [`ReflectionPass`] (mirrored camera into the offscreen target) and
//!   [`CompositePass`] (opaque scene plus Fresnel-blended glass)
//! - The [`Renderer`] frame loop with frame-boundary resize handling
//!
//! Windowing, input, and UI stay outside; the caller owns the device, queue,
//! and surface and hands in a texture view per frame.

// Pass entry points legitimately take the full frame's resources
#![allow(clippy::too_many_arguments)]

pub mod buffer;
pub mod composite_pass;
pub mod error;
pub mod mesh;
pub mod reflection_pass;
pub mod renderer;
pub mod shader;
pub mod target;
pub mod texture;
pub mod uniforms;

pub use composite_pass::CompositePass;
pub use error::{RenderError, RenderResult};
pub use mesh::{DrawableGpu, Vertex};
pub use reflection_pass::ReflectionPass;
pub use renderer::Renderer;
pub use shader::{ShaderBuilder, ShaderProgram};
pub use target::{ReflectionTarget, DEPTH_FORMAT, REFLECTION_COLOR_FORMAT};
pub use texture::{BaseTexture, Checkerboard, TextureSource};
pub use uniforms::{FrameUniforms, GlassUniforms, ModelUniforms};

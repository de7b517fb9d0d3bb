//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
///
/// Resource-creation failures are fatal to setup: a program that failed to
/// compile or a render target that failed its completeness check must never
/// be bound for drawing.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Shader stage compilation failed; carries the diagnostic.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Pipeline creation (the link step) failed; carries the diagnostic.
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),

    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// Offscreen target attachments disagree in size; rendering into the
    /// target must not proceed.
    #[error(
        "framebuffer incomplete: color attachment is {color_width}x{color_height}, \
         depth attachment is {depth_width}x{depth_height}"
    )]
    FramebufferIncomplete {
        /// Color attachment width.
        color_width: u32,
        /// Color attachment height.
        color_height: u32,
        /// Depth attachment width.
        depth_width: u32,
        /// Depth attachment height.
        depth_height: u32,
    },
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

//! Shader management.
//!
//! A program here is one WGSL module with a vertex and a fragment entry
//! point. [`ShaderBuilder`] validates the sources before the module is
//! handed to the device; a builder that returns `Err` has produced nothing
//! bindable, so a failed program can never reach a draw call. Pipeline
//! creation is the link step and runs inside a device error scope, so a
//! descriptor the device rejects surfaces as
//! [`RenderError::PipelineCreationFailed`] instead of an uncaptured error.

use pollster::FutureExt;

use crate::error::{RenderError, RenderResult};

/// Builder for creating shader programs from two stage sources.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    vertex_entry: String,
    fragment_entry: String,
    label: Option<String>,
}

/// A compiled shader module together with the entry-point names the
/// pipelines bind.
pub struct ShaderProgram {
    module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
}

impl ShaderProgram {
    /// The compiled WGSL module.
    #[must_use]
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    /// Entry point for the vertex stage, as configured on the builder.
    #[must_use]
    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    /// Entry point for the fragment stage, as configured on the builder.
    #[must_use]
    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            label: None,
        }
    }

    /// Sets the vertex shader source (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the vertex shader entry point.
    #[must_use]
    pub fn with_vertex_entry(mut self, entry: impl Into<String>) -> Self {
        self.vertex_entry = entry.into();
        self
    }

    /// Sets the fragment shader entry point.
    #[must_use]
    pub fn with_fragment_entry(mut self, entry: impl Into<String>) -> Self {
        self.fragment_entry = entry.into();
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader program.
    ///
    /// # Errors
    /// [`RenderError::ShaderCompilationFailed`] when a stage source is
    /// missing or a declared entry point does not appear in the source.
    pub fn build(self, device: &wgpu::Device) -> RenderResult<ShaderProgram> {
        let source = self.validated_source()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(ShaderProgram {
            module,
            vertex_entry: self.vertex_entry,
            fragment_entry: self.fragment_entry,
        })
    }

    /// Combines the stage sources and checks that both configured entry
    /// points appear in the result.
    fn validated_source(&self) -> RenderResult<String> {
        let source = self.combined_source()?;

        for entry in [&self.vertex_entry, &self.fragment_entry] {
            if !source.contains(&format!("fn {entry}")) {
                return Err(RenderError::ShaderCompilationFailed(format!(
                    "entry point '{entry}' not found in shader source"
                )));
            }
        }

        Ok(source)
    }

    fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;

        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;

        // Both stages usually live in one WGSL file
        if vertex == fragment {
            return Ok(vertex.clone());
        }

        Ok(format!("{vertex}\n\n{fragment}"))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a render pipeline inside a validation error scope.
///
/// # Errors
/// [`RenderError::PipelineCreationFailed`] carrying the device's diagnostic
/// when the descriptor fails validation (the link-stage failure). A pipeline
/// that failed to link is never returned to the caller.
pub fn create_pipeline(
    device: &wgpu::Device,
    desc: &wgpu::RenderPipelineDescriptor<'_>,
) -> RenderResult<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(desc);
    if let Some(error) = device.pop_error_scope().block_on() {
        return Err(RenderError::PipelineCreationFailed(error.to_string()));
    }
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vertex_source_is_compile_error() {
        let err = ShaderBuilder::new()
            .with_fragment("fn fs_main() {}")
            .validated_source()
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompilationFailed(_)));
    }

    #[test]
    fn test_identical_sources_not_duplicated() {
        let src = "fn vs_main() {} fn fs_main() {}";
        let combined = ShaderBuilder::new()
            .with_vertex(src)
            .with_fragment(src)
            .validated_source()
            .unwrap();
        assert_eq!(combined, src);
    }

    #[test]
    fn test_distinct_sources_combined() {
        let combined = ShaderBuilder::new()
            .with_vertex("fn vs_main() {}")
            .with_fragment("fn fs_main() {}")
            .validated_source()
            .unwrap();
        assert!(combined.contains("vs_main"));
        assert!(combined.contains("fs_main"));
    }

    #[test]
    fn test_configured_entry_points_are_checked() {
        let src = "fn vs_sky() {} fn fs_sky() {}";
        let err = ShaderBuilder::new()
            .with_vertex(src)
            .with_fragment(src)
            .with_vertex_entry("vs_sky")
            .with_fragment_entry("fs_clouds")
            .validated_source()
            .unwrap_err();
        assert!(err.to_string().contains("fs_clouds"));

        assert!(ShaderBuilder::new()
            .with_vertex(src)
            .with_fragment(src)
            .with_vertex_entry("vs_sky")
            .with_fragment_entry("fs_sky")
            .validated_source()
            .is_ok());
    }

    #[test]
    fn test_default_entry_points_required() {
        let err = ShaderBuilder::new()
            .with_vertex("fn vertex() {}")
            .with_fragment("fn fragment() {}")
            .validated_source()
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompilationFailed(_)));
    }
}

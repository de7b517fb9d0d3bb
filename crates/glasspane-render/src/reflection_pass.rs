//! The reflection pass: renders the opaque scene from the mirrored camera
//! into the offscreen reflection target.
//!
//! The camera is reflected across the glass plane on the CPU and the view is
//! rebuilt with look-at, which keeps the basis right-handed; the pipeline
//! therefore uses the same front-face winding as the composite pass. The
//! *original* plane equation rides along as the clip uniform so geometry on
//! the wrong side of the glass never appears in the mirror image.

use glam::Mat4;
use glasspane_core::FrameContext;

use crate::buffer;
use crate::error::RenderResult;
use crate::mesh::{DrawableGpu, Vertex};
use crate::shader::{self, ShaderBuilder};
use crate::target::{ReflectionTarget, DEPTH_FORMAT, REFLECTION_COLOR_FORMAT};
use crate::uniforms::FrameUniforms;

/// Reflection pass resources: the offscreen target, its frame uniforms, and
/// the clip-enabled opaque pipeline.
pub struct ReflectionPass {
    target: ReflectionTarget,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl ReflectionPass {
    /// Creates the pass and its target at the given viewport size.
    ///
    /// # Errors
    /// Shader or pipeline creation failures; the pass is unusable and setup
    /// must abort.
    pub fn new(
        device: &wgpu::Device,
        frame_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        let target = ReflectionTarget::new(device, width, height);

        let frame_buffer = buffer::create_uniform_buffer(
            device,
            &FrameUniforms::default(),
            Some("Reflection Frame Uniforms"),
        );

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Reflection Frame Bind Group"),
            layout: frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let shader_source = include_str!("shaders/scene.wgsl");
        let shader = ShaderBuilder::new()
            .with_vertex(shader_source)
            .with_fragment(shader_source)
            .with_label("Reflection Scene Shader")
            .build(device)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Reflection Pipeline Layout"),
            bind_group_layouts: &[frame_layout, model_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = shader::create_pipeline(device, &wgpu::RenderPipelineDescriptor {
            label: Some("Reflection Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader.module(),
                entry_point: Some(shader.vertex_entry()),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader.module(),
                entry_point: Some(shader.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: REFLECTION_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Same winding/cull as the composite pass: the mirrored view
                // is a right-handed look-at basis, not an axis negation
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            target,
            frame_buffer,
            frame_bind_group,
            pipeline,
            sampler,
        })
    }

    /// Rebuilds the offscreen target at a new viewport size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.target.resize(device, width, height);
    }

    /// Renders all opaque drawables from the mirrored camera.
    ///
    /// Returns the mirrored view-projection matrix the composite pass needs
    /// for screen-space reprojection.
    ///
    /// # Errors
    /// [`crate::error::RenderError::FramebufferIncomplete`] if the target
    /// fails its completeness check; nothing is drawn in that case.
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &FrameContext,
        drawables: &[DrawableGpu],
        texture_bind_group: &wgpu::BindGroup,
    ) -> RenderResult<Mat4> {
        self.target.validate()?;

        let mirrored = ctx.camera.mirrored_across(&ctx.plane);
        let proj = ctx.camera.projection_matrix();

        buffer::update_buffer(
            queue,
            &self.frame_buffer,
            &FrameUniforms::new(
                mirrored.view,
                proj,
                ctx.plane.as_clip_vec4(),
                mirrored.position,
            ),
        );

        {
            let mut pass = self.target.begin_pass(encoder, ctx.clear_color);
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_bind_group(2, texture_bind_group, &[]);
            for drawable in drawables.iter().filter(|d| d.surface.is_opaque()) {
                drawable.draw(&mut pass);
            }
        }

        Ok(proj * mirrored.view)
    }

    /// The color view holding the mirrored-scene image.
    #[must_use]
    pub fn color_view(&self) -> &wgpu::TextureView {
        self.target.color_view()
    }

    /// The sampler used when the composite pass reads the reflection.
    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Current target width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.target.width()
    }

    /// Current target height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.target.height()
    }
}

//! The composite pass: opaque geometry from the real camera, then the glass
//! surface with Fresnel blending over the reflection buffer.
//!
//! The glass pipeline blends `SrcAlpha / OneMinusSrcAlpha` with depth writes
//! disabled, so the pane depth-tests against the opaque scene without
//! occluding anything drawn after it. Pipeline state is immutable in wgpu,
//! so neither the blend nor the disabled depth write can leak into later
//! passes.

use glam::Mat4;
use glasspane_core::FrameContext;

use crate::buffer;
use crate::error::RenderResult;
use crate::mesh::{DrawableGpu, Vertex};
use crate::shader::{self, ShaderBuilder};
use crate::target::DEPTH_FORMAT;
use crate::uniforms::{create_glass_bind_group_layout, FrameUniforms, GlassUniforms};

/// Composite pass resources: frame uniforms for the real camera, the
/// unclipped opaque pipeline, and the blended glass pipeline.
pub struct CompositePass {
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    opaque_pipeline: wgpu::RenderPipeline,
    glass_pipeline: wgpu::RenderPipeline,
    glass_buffer: wgpu::Buffer,
    glass_layout: wgpu::BindGroupLayout,
}

impl CompositePass {
    /// Creates both composite pipelines against the visible surface format.
    ///
    /// # Errors
    /// Shader or pipeline creation failures; setup must abort.
    pub fn new(
        device: &wgpu::Device,
        frame_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> RenderResult<Self> {
        let frame_buffer = buffer::create_uniform_buffer(
            device,
            &FrameUniforms::default(),
            Some("Composite Frame Uniforms"),
        );

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Frame Bind Group"),
            layout: frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let scene_source = include_str!("shaders/scene.wgsl");
        let scene_shader = ShaderBuilder::new()
            .with_vertex(scene_source)
            .with_fragment(scene_source)
            .with_label("Composite Scene Shader")
            .build(device)?;

        let opaque_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Composite Opaque Pipeline Layout"),
            bind_group_layouts: &[frame_layout, model_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let opaque_pipeline = shader::create_pipeline(device, &wgpu::RenderPipelineDescriptor {
            label: Some("Composite Opaque Pipeline"),
            layout: Some(&opaque_layout),
            vertex: wgpu::VertexState {
                module: scene_shader.module(),
                entry_point: Some(scene_shader.vertex_entry()),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: scene_shader.module(),
                entry_point: Some(scene_shader.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
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

        let glass_source = include_str!("shaders/glass.wgsl");
        let glass_shader = ShaderBuilder::new()
            .with_vertex(glass_source)
            .with_fragment(glass_source)
            .with_label("Glass Shader")
            .build(device)?;

        let glass_layout = create_glass_bind_group_layout(device);

        let glass_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Glass Pipeline Layout"),
                bind_group_layouts: &[frame_layout, model_layout, texture_layout, &glass_layout],
                push_constant_ranges: &[],
            });

        let glass_pipeline = shader::create_pipeline(device, &wgpu::RenderPipelineDescriptor {
            label: Some("Glass Pipeline"),
            layout: Some(&glass_pipeline_layout),
            vertex: wgpu::VertexState {
                module: glass_shader.module(),
                entry_point: Some(glass_shader.vertex_entry()),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: glass_shader.module(),
                entry_point: Some(glass_shader.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Both faces of the pane are visible
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                // Depth-test against the opaque scene, never occlude later
                // fragments at equal depth
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })?;

        let glass_buffer = buffer::create_uniform_buffer(
            device,
            &GlassUniforms::new(Mat4::IDENTITY, 0.0),
            Some("Glass Uniforms"),
        );

        Ok(Self {
            frame_buffer,
            frame_bind_group,
            opaque_pipeline,
            glass_pipeline,
            glass_buffer,
            glass_layout,
        })
    }

    /// Renders the visible frame: opaque drawables with the real camera and
    /// a disabled clip plane, then the glass drawables sampling the
    /// reflection buffer.
    ///
    /// `mirror_view_proj` and the reflection view/sampler come from the
    /// reflection pass that ran earlier in the same frame.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &FrameContext,
        drawables: &[DrawableGpu],
        texture_bind_group: &wgpu::BindGroup,
        mirror_view_proj: Mat4,
        reflection_view: &wgpu::TextureView,
        reflection_sampler: &wgpu::Sampler,
        surface_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) -> RenderResult<()> {
        buffer::update_buffer(
            queue,
            &self.frame_buffer,
            &FrameUniforms::new(
                ctx.camera.view_matrix(),
                ctx.camera.projection_matrix(),
                glasspane_core::GlassPlane::DISABLED_CLIP,
                ctx.camera.position,
            ),
        );
        buffer::update_buffer(
            queue,
            &self.glass_buffer,
            &GlassUniforms::new(mirror_view_proj, ctx.transparency),
        );

        let glass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glass Bind Group"),
            layout: &self.glass_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.glass_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(reflection_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(reflection_sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: ctx.clear_color[0],
                        g: ctx.clear_color[1],
                        b: ctx.clear_color[2],
                        a: ctx.clear_color[3],
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(2, texture_bind_group, &[]);

        pass.set_pipeline(&self.opaque_pipeline);
        for drawable in drawables.iter().filter(|d| d.surface.is_opaque()) {
            drawable.draw(&mut pass);
        }

        // Glass last, so it blends over (and depth-tests against) the
        // completed opaque scene
        pass.set_pipeline(&self.glass_pipeline);
        pass.set_bind_group(3, &glass_bind_group, &[]);
        for drawable in drawables.iter().filter(|d| !d.surface.is_opaque()) {
            drawable.draw(&mut pass);
        }

        Ok(())
    }
}

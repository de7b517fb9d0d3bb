//! The frame-loop orchestrator: owns pipelines, passes, and scene GPU data,
//! and runs the two passes in order each frame.
//!
//! Resize requests queue here and apply only at a frame boundary, before the
//! reflection pass begins. Both passes submit through one command encoder in
//! a single queue submission, so the composite pass always samples a
//! completed reflection image.

use glasspane_core::scene::Drawable;
use glasspane_core::FrameContext;

use crate::composite_pass::CompositePass;
use crate::error::RenderResult;
use crate::mesh::DrawableGpu;
use crate::reflection_pass::ReflectionPass;
use crate::target::DEPTH_FORMAT;
use crate::texture::{BaseTexture, TextureSource};
use crate::uniforms::{
    create_frame_bind_group_layout, create_model_bind_group_layout,
    create_texture_bind_group_layout,
};

/// The glasspane renderer.
pub struct Renderer {
    width: u32,
    height: u32,
    pending_resize: Option<(u32, u32)>,
    model_layout: wgpu::BindGroupLayout,
    base_texture: BaseTexture,
    texture_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    reflection: ReflectionPass,
    composite: CompositePass,
    drawables: Vec<DrawableGpu>,
}

impl Renderer {
    /// Creates the renderer against an externally owned device/queue and the
    /// visible surface's format.
    ///
    /// # Errors
    /// Shader, pipeline, or texture creation failures abort setup; nothing
    /// partially constructed is usable afterwards.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        texture_source: &dyn TextureSource,
    ) -> RenderResult<Self> {
        let frame_layout = create_frame_bind_group_layout(device);
        let model_layout = create_model_bind_group_layout(device);
        let texture_layout = create_texture_bind_group_layout(device);

        let base_texture = BaseTexture::from_source(
            device,
            queue,
            texture_source,
            wgpu::FilterMode::Linear,
            wgpu::AddressMode::Repeat,
        )?;

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Base Texture Bind Group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&base_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&base_texture.sampler),
                },
            ],
        });

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);

        let reflection = ReflectionPass::new(
            device,
            &frame_layout,
            &model_layout,
            &texture_layout,
            width,
            height,
        )?;

        let composite = CompositePass::new(
            device,
            &frame_layout,
            &model_layout,
            &texture_layout,
            surface_format,
        )?;

        Ok(Self {
            width,
            height,
            pending_resize: None,
            model_layout,
            base_texture,
            texture_bind_group,
            depth_texture,
            depth_view,
            reflection,
            composite,
            drawables: Vec::new(),
        })
    }

    /// Uploads the scene's drawables, replacing any previous set.
    pub fn set_scene(&mut self, device: &wgpu::Device, drawables: &[Drawable]) {
        self.drawables = drawables
            .iter()
            .map(|d| DrawableGpu::new(device, &self.model_layout, d))
            .collect();
    }

    /// Updates one drawable's placement (per-frame object motion from the
    /// UI collaborator).
    pub fn update_drawable_model(
        &self,
        queue: &wgpu::Queue,
        name: &str,
        model: glam::Mat4,
        tint: glam::Vec3,
    ) {
        if let Some(drawable) = self.drawables.iter().find(|d| d.name == name) {
            drawable.update_model(queue, model, tint);
        } else {
            log::warn!("update for unknown drawable '{name}' ignored");
        }
    }

    /// Queues a viewport resize. Applied at the next frame boundary, before
    /// the reflection pass; never mid-frame.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width.max(1), height.max(1)));
    }

    /// Renders one frame: reflection pass into the offscreen target, then
    /// the composite pass into `surface_view`. Single encoder, single
    /// submission.
    ///
    /// # Errors
    /// Propagates resource failures from the passes (e.g. an incomplete
    /// reflection target). No retry; the caller decides whether to tear
    /// down.
    pub fn render_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        ctx: &FrameContext,
        surface_view: &wgpu::TextureView,
    ) -> RenderResult<()> {
        if let Some((width, height)) = self.pending_resize.take() {
            log::debug!("applying queued resize to {width}x{height}");
            self.width = width;
            self.height = height;
            self.reflection.resize(device, width, height);
            let (depth_texture, depth_view) = create_depth_texture(device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        let mirror_view_proj = self.reflection.render(
            queue,
            &mut encoder,
            ctx,
            &self.drawables,
            &self.texture_bind_group,
        )?;

        self.composite.render(
            device,
            queue,
            &mut encoder,
            ctx,
            &self.drawables,
            &self.texture_bind_group,
            mirror_view_proj,
            self.reflection.color_view(),
            self.reflection.sampler(),
            surface_view,
            &self.depth_view,
        )?;

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Current viewport width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current viewport height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions of the reflection buffer; equal to the viewport after any
    /// applied resize.
    #[must_use]
    pub fn reflection_size(&self) -> (u32, u32) {
        (self.reflection.width(), self.reflection.height())
    }

    /// Number of uploaded drawables.
    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Main Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

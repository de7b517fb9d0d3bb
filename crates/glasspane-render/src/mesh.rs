//! GPU-side drawable data: vertex/index buffers and per-drawable uniforms.

use glasspane_core::scene::{Drawable, Surface};

use crate::buffer;
use crate::uniforms::ModelUniforms;

/// Interleaved vertex as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position.
    pub position: [f32; 3],
    /// Normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    /// Vertex buffer layout shared by every pipeline in this crate.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// GPU resources for one drawable.
pub struct DrawableGpu {
    /// Diagnostic name, carried over from the scene drawable.
    pub name: String,
    /// Interleaved vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Triangle index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub num_indices: u32,
    /// Model/normal/tint uniform buffer.
    pub uniform_buffer: wgpu::Buffer,
    /// Bind group over the uniform buffer (group 1).
    pub bind_group: wgpu::BindGroup,
    /// Opaque or glass.
    pub surface: Surface,
}

impl DrawableGpu {
    /// Uploads a validated drawable's geometry and placement.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        model_bind_group_layout: &wgpu::BindGroupLayout,
        drawable: &Drawable,
    ) -> Self {
        let vertices: Vec<Vertex> = drawable
            .mesh
            .positions
            .iter()
            .zip(&drawable.mesh.normals)
            .zip(&drawable.mesh.uvs)
            .map(|((p, n), uv)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
            })
            .collect();

        let label = drawable.name.as_str();
        let vertex_buffer = buffer::create_vertex_buffer(device, &vertices, Some(label));
        let index_buffer = buffer::create_index_buffer(device, &drawable.mesh.indices, Some(label));

        let uniforms = ModelUniforms::new(drawable.model, drawable.tint);
        let uniform_buffer = buffer::create_uniform_buffer(device, &uniforms, Some(label));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            name: drawable.name.clone(),
            vertex_buffer,
            index_buffer,
            num_indices: drawable.mesh.indices.len() as u32,
            uniform_buffer,
            bind_group,
            surface: drawable.surface,
        }
    }

    /// Rewrites the placement uniforms (per-frame model transform updates
    /// from the UI collaborator land here).
    pub fn update_model(
        &self,
        queue: &wgpu::Queue,
        model: glam::Mat4,
        tint: glam::Vec3,
    ) {
        buffer::update_buffer(queue, &self.uniform_buffer, &ModelUniforms::new(model, tint));
    }

    /// Binds this drawable's buffers and issues its indexed draw call.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

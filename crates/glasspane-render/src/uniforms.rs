//! GPU uniform layouts and their bind group layouts.
//!
//! Layouts must match the WGSL structs byte for byte; WGSL `vec3<f32>` has
//! 16-byte alignment, hence the explicit padding. Each struct has a size
//! assertion test.

use glam::{Mat4, Vec3, Vec4};
use glasspane_core::math;

/// Per-pass uniforms: camera matrices plus the clip-plane equation.
///
/// The reflection pass uploads the mirrored view and the *original* plane as
/// the clip vector; the composite pass uploads the real view and the
/// disabled plane `(0,0,0,1)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// View matrix (real or mirrored, per pass).
    pub view: [[f32; 4]; 4],
    /// Projection matrix; identical in both passes.
    pub proj: [[f32; 4]; 4],
    /// Clip plane `(nx, ny, nz, d)`, tested as `dot(n, p) + d >= 0` keeps.
    pub clip_plane: [f32; 4],
    /// Eye position in world space, w unused.
    pub eye_pos: [f32; 4],
}

impl FrameUniforms {
    /// Assembles frame uniforms from matrices and the clip vector.
    #[must_use]
    pub fn new(view: Mat4, proj: Mat4, clip_plane: Vec4, eye: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            clip_plane: clip_plane.to_array(),
            eye_pos: eye.extend(0.0).to_array(),
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec4::W, Vec3::ZERO)
    }
}

/// Per-drawable uniforms: placement and tint.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model transform.
    pub model: [[f32; 4]; 4],
    /// Normal matrix (transpose of checked inverse of model).
    pub normal: [[f32; 4]; 4],
    /// Material tint, w unused.
    pub tint: [f32; 4],
}

impl ModelUniforms {
    /// Derives the normal matrix from the model transform. Singular models
    /// degrade to an identity normal matrix.
    #[must_use]
    pub fn new(model: Mat4, tint: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: math::normal_matrix(model).to_cols_array_2d(),
            tint: tint.extend(1.0).to_array(),
        }
    }
}

/// Glass-draw uniforms: the mirrored reprojection matrix and the
/// transparency control.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlassUniforms {
    /// Projection * mirrored view, used to reproject glass fragments into
    /// the reflection buffer.
    pub mirror_view_proj: [[f32; 4]; 4],
    /// Transparency slider value in [0, 1].
    pub transparency: f32,
    /// Padding to 16-byte struct alignment.
    pub _padding: [f32; 3],
}

impl GlassUniforms {
    /// Assembles glass uniforms for one composite pass.
    #[must_use]
    pub fn new(mirror_view_proj: Mat4, transparency: f32) -> Self {
        Self {
            mirror_view_proj: mirror_view_proj.to_cols_array_2d(),
            transparency: transparency.clamp(0.0, 1.0),
            _padding: [0.0; 3],
        }
    }
}

/// Bind group layout for [`FrameUniforms`] (group 0 in both shaders).
pub fn create_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Frame Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<FrameUniforms>() as u64
                ),
            },
            count: None,
        }],
    })
}

/// Bind group layout for [`ModelUniforms`] (group 1 in both shaders).
pub fn create_model_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Model Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<ModelUniforms>() as u64
                ),
            },
            count: None,
        }],
    })
}

/// Bind group layout for the shared base texture (group 2 in both shaders).
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Base Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Bind group layout for the glass draw (group 3): glass uniforms plus the
/// reflection buffer's color texture.
pub fn create_glass_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Glass Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<GlassUniforms>() as u64,
                    ),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uniforms_size() {
        // Two mat4 + two vec4, matching the WGSL struct
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 64 + 64 + 16 + 16);
    }

    #[test]
    fn test_model_uniforms_size() {
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 64 + 64 + 16);
    }

    #[test]
    fn test_glass_uniforms_size() {
        assert_eq!(std::mem::size_of::<GlassUniforms>(), 64 + 16);
    }

    #[test]
    fn test_glass_uniforms_clamp_transparency() {
        assert_eq!(GlassUniforms::new(Mat4::IDENTITY, 2.0).transparency, 1.0);
    }

    #[test]
    fn test_normal_matrix_of_singular_model_is_identity() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        let uniforms = ModelUniforms::new(flat, Vec3::ONE);
        assert_eq!(uniforms.normal, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_default_frame_uniforms_clip_disabled() {
        // dot((0,0,0), p) + 1 >= 0 always keeps
        assert_eq!(FrameUniforms::default().clip_plane, [0.0, 0.0, 0.0, 1.0]);
    }
}

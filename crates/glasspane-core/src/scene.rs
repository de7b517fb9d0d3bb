//! Scene description: meshes, drawables, and the per-frame context.
//!
//! Geometry comes from an external mesh-generation collaborator; this module
//! only validates and carries it. The [`FrameContext`] is the explicit,
//! by-reference input to both render passes, replacing any notion of global
//! scene state.

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::error::{GlasspaneError, Result};
use crate::plane::GlassPlane;

/// CPU-side mesh data as supplied by the mesh collaborator.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, same length as positions.
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates, same length as positions.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle index list, length a multiple of 3.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Validates attribute counts and index bounds.
    ///
    /// # Errors
    /// [`GlasspaneError::SizeMismatch`] when normals/uvs disagree with
    /// positions or an index is out of range, [`GlasspaneError::EmptyMesh`]
    /// when there is nothing to draw.
    pub fn validate(&self, name: &str) -> Result<()> {
        let n = self.positions.len();
        if n == 0 || self.indices.is_empty() {
            return Err(GlasspaneError::EmptyMesh(name.to_string()));
        }
        if self.normals.len() != n {
            return Err(GlasspaneError::SizeMismatch {
                attribute: "normals",
                expected: n,
                actual: self.normals.len(),
            });
        }
        if self.uvs.len() != n {
            return Err(GlasspaneError::SizeMismatch {
                attribute: "uvs",
                expected: n,
                actual: self.uvs.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(GlasspaneError::SizeMismatch {
                attribute: "indices",
                expected: self.indices.len() / 3 * 3,
                actual: self.indices.len(),
            });
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(GlasspaneError::SizeMismatch {
                attribute: "indices",
                expected: n,
                actual: bad as usize,
            });
        }
        Ok(())
    }
}

/// Which pipeline a drawable renders through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// Drawn in both passes, clipped in the reflection pass.
    #[default]
    Opaque,
    /// Drawn last in the composite pass only, with Fresnel blending.
    Glass,
}

impl Surface {
    /// Whether this surface belongs to the opaque set.
    #[must_use]
    pub fn is_opaque(self) -> bool {
        self == Surface::Opaque
    }
}

/// A mesh with its placement and material tint.
#[derive(Debug, Clone)]
pub struct Drawable {
    /// Name used in diagnostics.
    pub name: String,
    /// The mesh geometry.
    pub mesh: Mesh,
    /// Model transform.
    pub model: Mat4,
    /// Material tint multiplied into the shared base texture.
    pub tint: Vec3,
    /// Opaque or glass.
    pub surface: Surface,
}

impl Drawable {
    /// Creates a validated drawable.
    ///
    /// # Errors
    /// Mesh validation errors, or [`GlasspaneError::NonFiniteTransform`] for
    /// a NaN/infinite model matrix.
    pub fn new(
        name: impl Into<String>,
        mesh: Mesh,
        model: Mat4,
        tint: Vec3,
        surface: Surface,
    ) -> Result<Self> {
        let name = name.into();
        mesh.validate(&name)?;
        if !model.is_finite() {
            return Err(GlasspaneError::NonFiniteTransform(name));
        }
        Ok(Self {
            name,
            mesh,
            model,
            tint,
            surface,
        })
    }

    /// Whether this drawable belongs to the opaque set.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.surface.is_opaque()
    }
}

/// Everything the two render passes read for one frame.
///
/// Built fresh each frame and passed by reference into each pass; the passes
/// never mutate it.
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// The real (unmirrored) camera.
    pub camera: Camera,
    /// The glass plane: clip test and mirror for the reflection pass.
    pub plane: GlassPlane,
    /// Glass transparency control, clamped to [0, 1].
    pub transparency: f32,
    /// Background clear color (also what clipped reflection regions show).
    pub clear_color: [f64; 4],
}

impl FrameContext {
    /// Creates a frame context, clamping the transparency parameter.
    #[must_use]
    pub fn new(camera: Camera, plane: GlassPlane, transparency: f32) -> Self {
        Self {
            camera,
            plane,
            transparency: transparency.clamp(0.0, 1.0),
            clear_color: [0.05, 0.05, 0.08, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn test_valid_mesh_passes() {
        assert!(quad_mesh().validate("quad").is_ok());
    }

    #[test]
    fn test_normal_count_mismatch() {
        let mut mesh = quad_mesh();
        mesh.normals.pop();
        let err = mesh.validate("quad").unwrap_err();
        assert!(matches!(
            err,
            GlasspaneError::SizeMismatch {
                attribute: "normals",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut mesh = quad_mesh();
        mesh.indices[0] = 99;
        assert!(mesh.validate("quad").is_err());
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = Mesh {
            positions: vec![],
            normals: vec![],
            uvs: vec![],
            indices: vec![],
        };
        assert!(matches!(
            mesh.validate("empty").unwrap_err(),
            GlasspaneError::EmptyMesh(_)
        ));
    }

    #[test]
    fn test_non_finite_transform_rejected() {
        let err = Drawable::new(
            "bad",
            quad_mesh(),
            Mat4::from_translation(Vec3::splat(f32::NAN)),
            Vec3::ONE,
            Surface::Opaque,
        )
        .unwrap_err();
        assert!(matches!(err, GlasspaneError::NonFiniteTransform(_)));
    }

    #[test]
    fn test_frame_context_clamps_transparency() {
        let ctx = FrameContext::new(Camera::default(), GlassPlane::default(), 1.7);
        assert_eq!(ctx.transparency, 1.0);
        let ctx = FrameContext::new(Camera::default(), GlassPlane::default(), -0.5);
        assert_eq!(ctx.transparency, 0.0);
    }
}

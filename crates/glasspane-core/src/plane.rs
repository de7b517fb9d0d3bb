//! The glass plane: one equation driving both the clip test and the mirror.
//!
//! The plane is expressed as `dot(normal, p) + d = 0`. Fragments with a
//! negative signed distance are on the discarded side during the reflection
//! pass, and the same equation reflected the camera that rendered them.

use glam::{Mat4, Vec3, Vec4};

use crate::math;

/// A plane equation `dot(normal, p) + d = 0` with unit normal.
///
/// Constant for the session in the reference scene; both render passes read
/// it, neither mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlassPlane {
    /// Unit normal, pointing toward the kept half-space.
    normal: Vec3,
    /// Signed distance term.
    d: f32,
}

impl GlassPlane {
    /// Creates a plane from a normal (normalized here) and distance term.
    #[must_use]
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self {
            normal: normal.normalize(),
            d,
        }
    }

    /// Creates a plane from its unit normal and a point on the plane.
    #[must_use]
    pub fn from_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the distance term.
    #[must_use]
    pub fn d(&self) -> f32 {
        self.d
    }

    /// Signed distance from a point; negative means the discarded side.
    #[must_use]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Whether a point survives the clip test (`dot(n, p) + d >= 0`).
    #[must_use]
    pub fn is_kept(&self, p: Vec3) -> bool {
        self.signed_distance(p) >= 0.0
    }

    /// Reflects a point across this plane.
    #[must_use]
    pub fn reflect_point(&self, p: Vec3) -> Vec3 {
        math::reflect_point(p, self.normal, self.d)
    }

    /// Reflects a direction across this plane.
    #[must_use]
    pub fn reflect_direction(&self, v: Vec3) -> Vec3 {
        math::reflect_direction(v, self.normal)
    }

    /// Returns the Householder mirror transform for this plane.
    #[must_use]
    pub fn mirror_matrix(&self) -> Mat4 {
        math::reflection_matrix(self.normal, self.d)
    }

    /// The `(nx, ny, nz, d)` form uploaded as the clip-plane uniform.
    #[must_use]
    pub fn as_clip_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// The clip vector that keeps everything: `dot((0,0,0), p) + 1 >= 0`.
    ///
    /// Uploaded for the composite pass so opaque geometry is never clipped
    /// in the final image.
    pub const DISABLED_CLIP: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
}

impl Default for GlassPlane {
    /// The reference scene's pane: normal +Z through the origin.
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            d: 0.0,
        }
    }
}

//! First-person camera and its per-frame mirrored derivation.

use glam::{Mat4, Vec3};

use crate::math;
use crate::plane::GlassPlane;

/// World up. The real camera always uses this; only the mirrored camera
/// carries a reflected up vector.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// A first-person camera: position plus yaw/pitch orientation.
///
/// Mutated once per frame by the input collaborator; the render passes only
/// read it.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Position in world space.
    pub position: Vec3,
    /// Heading around +Y, radians. 0 looks down -Z.
    pub yaw: f32,
    /// Elevation, radians, clamped shy of straight up/down.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Viewport width / height.
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

/// Pitch limit keeping the look-at basis away from up‖forward collapse.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl Camera {
    /// Creates a camera at the given position looking down -Z.
    #[must_use]
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Sets the aspect ratio (called on viewport resize).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the unit forward direction derived from yaw/pitch.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(WORLD_UP).normalize()
    }

    /// Returns the view matrix (right-handed look-at).
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(self.position, self.position + self.forward(), WORLD_UP)
    }

    /// Returns the perspective projection matrix.
    ///
    /// The reflection pass reuses this exact matrix, which is what makes
    /// screen-space reprojection of the reflection buffer line up.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotates the view by mouse-style deltas.
    pub fn look(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves along the ground plane relative to the current heading.
    pub fn walk(&mut self, forward_amount: f32, strafe_amount: f32) {
        let flat_forward = {
            let f = self.forward();
            Vec3::new(f.x, 0.0, f.z).normalize_or_zero()
        };
        self.position += flat_forward * forward_amount + self.right() * strafe_amount;
    }

    /// Derives the mirrored camera for the reflection pass.
    ///
    /// Position reflects as a point; forward and up reflect as directions.
    /// The mirrored view is rebuilt via look-at rather than by negating an
    /// axis of the real view, so the basis stays right-handed and front-face
    /// winding must not be flipped when rendering with it.
    #[must_use]
    pub fn mirrored_across(&self, plane: &GlassPlane) -> MirroredCamera {
        let position = plane.reflect_point(self.position);
        let forward = plane.reflect_direction(self.forward());
        let up = plane.reflect_direction(WORLD_UP);
        MirroredCamera {
            position,
            forward,
            view: math::look_at(position, position + forward, up),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 16.0 / 9.0)
    }
}

/// The transient camera pose used by the reflection pass.
///
/// Recomputed every frame from [`Camera`] and [`GlassPlane`]; never stored
/// across frames.
#[derive(Debug, Clone, Copy)]
pub struct MirroredCamera {
    /// Mirrored eye position.
    pub position: Vec3,
    /// Mirrored unit forward direction.
    pub forward: Vec3,
    /// View matrix built from the mirrored basis.
    pub view: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_forward_default_is_neg_z() {
        let camera = Camera::default();
        assert!((camera.forward() - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn test_forward_yaw_quarter_turn() {
        let mut camera = Camera::default();
        camera.look(std::f32::consts::FRAC_PI_2, 0.0);
        assert!((camera.forward() - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = Camera::default();
        camera.look(0.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        // The clamped pose must still yield a usable view basis.
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_mirrored_camera_reference_scenario() {
        // Plane (0,0,1,0); camera at (0,0,5) looking toward -Z. The mirrored
        // camera must sit at (0,0,-5) looking toward +Z.
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let mirrored = camera.mirrored_across(&GlassPlane::default());

        assert!((mirrored.position - Vec3::new(0.0, 0.0, -5.0)).length() < EPS);
        assert!((mirrored.forward - Vec3::Z).length() < EPS);
    }

    #[test]
    fn test_mirrored_view_sees_reflected_geometry() {
        // An object at z=+2 should appear to the mirrored camera where its
        // mirror image (z=-2) appears to the real camera.
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let plane = GlassPlane::default();
        let mirrored = camera.mirrored_across(&plane);

        let object = Vec3::new(0.5, 0.3, 2.0);
        let in_mirrored_view = mirrored.view.transform_point3(object);
        let mirror_image_in_real_view = camera
            .view_matrix()
            .transform_point3(plane.reflect_point(object));

        // Same depth and height; x flips with the handedness of the mirror.
        assert!((in_mirrored_view.z - mirror_image_in_real_view.z).abs() < EPS);
        assert!((in_mirrored_view.y - mirror_image_in_real_view.y).abs() < EPS);
        assert!((in_mirrored_view.x + mirror_image_in_real_view.x).abs() < EPS);
    }

    #[test]
    fn test_mirrored_basis_stays_right_handed() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 5.0), 1.0);
        let mirrored = camera.mirrored_across(&GlassPlane::default());
        // A right-handed view matrix has determinant +1; a winding flip
        // would show up as -1 here.
        assert!((mirrored.view.determinant() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_reflection_reprojection_alignment() {
        // The glass fragment where the camera's sight ray to an object's
        // mirror image crosses the plane must reproject (through the
        // mirrored view-projection) to the same screen location the object
        // itself was rendered at in the reflection pass. This is the
        // property that makes screen-space sampling line up.
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let plane = GlassPlane::default();
        let mirrored = camera.mirrored_across(&plane);
        let mirror_vp = camera.projection_matrix() * mirrored.view;

        let object = Vec3::new(1.0, 0.5, 2.0);
        let mirror_image = plane.reflect_point(object);
        // Sight ray camera -> mirror image, intersected with z = 0
        let dir = mirror_image - camera.position;
        let t = -camera.position.z / dir.z;
        let glass_point = camera.position + dir * t;
        assert!(glass_point.z.abs() < EPS);

        let ndc = |p: Vec3| {
            let clip = mirror_vp * p.extend(1.0);
            glam::Vec2::new(clip.x / clip.w, clip.y / clip.w)
        };
        assert!((ndc(glass_point) - ndc(object)).length() < 1e-3);
    }

    #[test]
    fn test_walk_stays_level() {
        let mut camera = Camera::default();
        camera.look(0.3, 0.5);
        let y_before = camera.position.y;
        camera.walk(2.0, -1.0);
        assert!((camera.position.y - y_before).abs() < EPS);
    }
}

//! Matrix and plane-reflection math shared by both render passes.
//!
//! All matrices are [`glam::Mat4`], stored column-major (element `[row + col*4]`
//! in `to_cols_array` order). Every consumer in this workspace relies on that
//! layout; it is asserted by `test_column_major_layout` below. Conversion to a
//! row-major API, if ever needed, belongs at that API's boundary, not here.

use glam::{Mat4, Vec3, Vec4};

/// Inverts a matrix, degrading to identity instead of producing NaN.
///
/// A zero determinant means the matrix is singular and has no inverse; the
/// render loop must stay live, so this logs and substitutes [`Mat4::IDENTITY`]
/// rather than dividing by zero. Output will be visibly wrong for that frame
/// but finite.
#[must_use]
pub fn checked_invert(m: Mat4) -> Mat4 {
    let det = m.determinant();
    if det == 0.0 {
        log::warn!("singular matrix, substituting identity");
        return Mat4::IDENTITY;
    }
    m.inverse()
}

/// Returns the normal matrix for a model transform.
///
/// Transpose of the inverse, so normals stay perpendicular under non-uniform
/// scale. Singular models degrade to identity via [`checked_invert`].
#[must_use]
pub fn normal_matrix(model: Mat4) -> Mat4 {
    checked_invert(model).transpose()
}

/// Reflects a point across the plane `dot(n, p) + d = 0`.
///
/// `n` must be unit length. `reflect_point(reflect_point(p)) == p`.
#[must_use]
pub fn reflect_point(p: Vec3, n: Vec3, d: f32) -> Vec3 {
    p - 2.0 * (n.dot(p) + d) * n
}

/// Reflects a direction across a plane with unit normal `n`.
///
/// Directions have no position, so the plane offset does not appear.
#[must_use]
pub fn reflect_direction(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * n.dot(v) * n
}

/// Builds the Householder reflection matrix for the plane `dot(n, p) + d = 0`.
///
/// Applying this matrix to a homogeneous point is equivalent to
/// [`reflect_point`]; it exists for callers that need the reflection as a
/// composable transform.
#[must_use]
pub fn reflection_matrix(n: Vec3, d: f32) -> Mat4 {
    let n = n.normalize();

    Mat4::from_cols(
        Vec4::new(
            1.0 - 2.0 * n.x * n.x,
            -2.0 * n.x * n.y,
            -2.0 * n.x * n.z,
            0.0,
        ),
        Vec4::new(
            -2.0 * n.x * n.y,
            1.0 - 2.0 * n.y * n.y,
            -2.0 * n.y * n.z,
            0.0,
        ),
        Vec4::new(
            -2.0 * n.x * n.z,
            -2.0 * n.y * n.z,
            1.0 - 2.0 * n.z * n.z,
            0.0,
        ),
        Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
    )
}

/// Builds a right-handed view matrix, guarding against a degenerate basis.
///
/// When `up` is parallel to the eye→target axis the look-at basis collapses;
/// this substitutes world +Y (or +X if the axis itself is vertical) and logs,
/// so a momentary degenerate pose never aborts the frame.
#[must_use]
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let forward = (target - eye).normalize_or_zero();
    let up = if forward.cross(up).length_squared() < 1e-8 {
        log::warn!("degenerate look-at up vector, substituting world axis");
        if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::X
        } else {
            Vec3::Y
        }
    } else {
        up
    };
    Mat4::look_at_rh(eye, target, up)
}

/// View-angle-dependent reflection weight: `(1 - max(dot(n, v), 0))^3`.
///
/// Head-on viewing gives 0 (no reflection), grazing gives 1. A cheap
/// Schlick-like approximation; both vectors must be unit length.
#[must_use]
pub fn fresnel(n: Vec3, v: Vec3) -> f32 {
    let facing = n.dot(v).max(0.0);
    (1.0 - facing).powi(3).clamp(0.0, 1.0)
}

/// Glass fragment alpha: `(1 - transparency) * (0.2 + 0.8 * fresnel)`.
///
/// The 0.2 floor keeps the pane faintly visible even head-on at full
/// transparency slider; grazing angles boost opacity toward the full
/// `1 - transparency`.
#[must_use]
pub fn glass_alpha(transparency: f32, fresnel: f32) -> f32 {
    (1.0 - transparency.clamp(0.0, 1.0)) * 0.8f32.mul_add(fresnel, 0.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn mat4_approx_eq(a: Mat4, b: Mat4, eps: f32) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn test_column_major_layout() {
        // Translation lands in the fourth column (elements 12..15), the
        // layout every shader uniform in this workspace assumes.
        let m = Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0));
        let a = m.to_cols_array();
        assert_eq!(a[12], 7.0);
        assert_eq!(a[13], 8.0);
        assert_eq!(a[14], 9.0);
        assert_eq!(a[0], 1.0);
    }

    #[test]
    fn test_checked_invert_singular_is_identity() {
        let singular = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(singular.determinant(), 0.0);
        assert_eq!(checked_invert(singular), Mat4::IDENTITY);
    }

    #[test]
    fn test_look_at_invert_round_trip() {
        let view = look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
        );
        let round_trip = view * checked_invert(view);
        assert!(mat4_approx_eq(round_trip, Mat4::IDENTITY, EPS));
    }

    #[test]
    fn test_look_at_degenerate_up_recovers() {
        // Looking straight down +Y with +Y up: basis would collapse.
        let view = look_at(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(view.is_finite());
        assert!(view.determinant().abs() > 1e-6);
    }

    #[test]
    fn test_reflect_point_matches_matrix() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let d = -1.5;
        let p = Vec3::new(0.3, -2.0, 4.0);
        let via_fn = reflect_point(p, n, d);
        let via_mat = reflection_matrix(n, d).transform_point3(p);
        assert!((via_fn - via_mat).length() < EPS);
    }

    #[test]
    fn test_reflect_direction_no_translation() {
        // A direction parallel to the plane is unchanged regardless of d.
        let n = Vec3::Z;
        let v = Vec3::new(1.0, 2.0, 0.0);
        assert!((reflect_direction(v, n) - v).length() < EPS);
        // A direction along the normal flips.
        assert!((reflect_direction(Vec3::Z, n) - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn test_fresnel_head_on_is_zero() {
        assert_eq!(fresnel(Vec3::Z, Vec3::Z), 0.0);
    }

    #[test]
    fn test_fresnel_grazing_is_one() {
        assert!((fresnel(Vec3::Z, Vec3::X) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_glass_alpha_fully_transparent_head_on() {
        assert_eq!(glass_alpha(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_glass_alpha_opacity_floor() {
        assert!((glass_alpha(0.0, 0.0) - 0.2).abs() < EPS);
    }

    #[test]
    fn test_glass_alpha_grazing_ceiling() {
        assert!((glass_alpha(0.0, 1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_normal_matrix_uniform_scale() {
        // For pure rotation the normal matrix equals the rotation itself.
        let rot = Mat4::from_rotation_y(0.7);
        assert!(mat4_approx_eq(normal_matrix(rot), rot, EPS));
    }

    proptest! {
        #[test]
        fn prop_reflect_point_is_involution(
            px in -100.0f32..100.0,
            py in -100.0f32..100.0,
            pz in -100.0f32..100.0,
            nx in -1.0f32..1.0,
            ny in -1.0f32..1.0,
            nz in -1.0f32..1.0,
            d in -10.0f32..10.0,
        ) {
            let n = Vec3::new(nx, ny, nz);
            prop_assume!(n.length() > 0.1);
            let n = n.normalize();
            let p = Vec3::new(px, py, pz);
            let twice = reflect_point(reflect_point(p, n, d), n, d);
            prop_assert!((twice - p).length() < 1e-2);
        }

        #[test]
        fn prop_invert_round_trip(
            tx in -10.0f32..10.0,
            ty in -10.0f32..10.0,
            tz in -10.0f32..10.0,
            angle in -3.0f32..3.0,
            scale in 0.2f32..5.0,
        ) {
            // Non-singular by construction: TRS with nonzero scale.
            let m = Mat4::from_translation(Vec3::new(tx, ty, tz))
                * Mat4::from_rotation_y(angle)
                * Mat4::from_scale(Vec3::splat(scale));
            let round_trip = m * checked_invert(m);
            prop_assert!(mat4_approx_eq(round_trip, Mat4::IDENTITY, 1e-3));
        }
    }
}

//! Shared math helpers for constraint evaluation.

use glam::{Quat, Vec3};

/// Clamp to [0, 1].
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Linear interpolation of scalars (unclamped).
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation of `degrees` around `axis`. The axis is normalized first.
#[inline]
pub fn angle_axis_degrees(degrees: f32, axis: Vec3) -> Quat {
    Quat::from_axis_angle(axis.normalize(), degrees.to_radians())
}

/// Euler angles in degrees, applied Z first, then X, then Y.
#[inline]
pub fn euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_rotation_y(y.to_radians())
        * Quat::from_rotation_x(x.to_radians())
        * Quat::from_rotation_z(z.to_radians())
}

/// Rotate a world-space pose about `pivot` by `rotation`.
#[inline]
pub fn rotate_about_pivot(
    position: Vec3,
    orientation: Quat,
    pivot: Vec3,
    rotation: Quat,
) -> (Vec3, Quat) {
    (pivot + rotation * (position - pivot), rotation * orientation)
}

/// Rotate a single point about `pivot` by `rotation`.
#[inline]
pub fn rotate_point_about_pivot(point: Vec3, pivot: Vec3, rotation: Quat) -> Vec3 {
    pivot + rotation * (point - pivot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_vec(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "left={a:?} right={b:?}");
    }

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
    }

    #[test]
    fn euler_applies_z_then_x_then_y() {
        let q = euler_degrees(90.0, 90.0, 90.0);
        let expected = Quat::from_rotation_y(FRAC_PI_2)
            * Quat::from_rotation_x(FRAC_PI_2)
            * Quat::from_rotation_z(FRAC_PI_2);
        assert!(q.dot(expected).abs() > 1.0 - 1e-6);

        // Pure Z: +X goes to +Y.
        approx_vec(euler_degrees(0.0, 0.0, 90.0) * Vec3::X, Vec3::Y);
    }

    #[test]
    fn pivot_rotation_moves_position_around_pivot() {
        let q = angle_axis_degrees(180.0, Vec3::Z);
        let (p, r) = rotate_about_pivot(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::X, q);
        approx_vec(p, Vec3::ZERO);
        assert!(r.dot(q).abs() > 1.0 - 1e-6);
    }
}

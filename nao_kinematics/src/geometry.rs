// Homogeneous transform helpers used by the leg chain and the solver.

use nalgebra::{Matrix4, Rotation3, Vector3};

use crate::types::{Orientation, Pose};

/// 4x4 homogeneous transform. The bottom row is always `[0, 0, 0, 1]`.
pub type Transform = Matrix4<f64>;

/// Create a 4x4 homogeneous transformation matrix from standard
/// Denavit-Hartenberg parameters.
///
/// # Arguments
/// * `a` - Link length
/// * `alpha` - Link twist
/// * `d` - Link offset
/// * `theta` - Joint angle
pub fn dh(a: f64, alpha: f64, d: f64, theta: f64) -> Transform {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();

    Matrix4::new(
        ct, -st, 0.0, a,
        st * ca, ct * ca, -sa, -d * sa,
        st * sa, ct * sa, ca, d * ca,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation-only transform from Euler angles, ZYX intrinsic:
/// `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn orientation_to_transform(roll: f64, pitch: f64, yaw: f64) -> Transform {
    Rotation3::from_euler_angles(roll, pitch, yaw).to_homogeneous()
}

/// Extract Euler angles from the rotation block of a transform.
/// Inverse of [`orientation_to_transform`] away from pitch = ±90°.
pub fn orientation_from_transform(t: &Transform) -> Orientation {
    let roll = t[(2, 1)].atan2(t[(2, 2)]);
    let pitch = (-t[(2, 0)]).atan2((t[(2, 1)].powi(2) + t[(2, 2)].powi(2)).sqrt());
    let yaw = t[(1, 0)].atan2(t[(0, 0)]);
    Orientation::new(roll, pitch, yaw)
}

pub fn transform_from_position_and_orientation(
    position: &Vector3<f64>,
    orientation: &Orientation,
) -> Transform {
    let mut t = orientation_to_transform(orientation.roll, orientation.pitch, orientation.yaw);
    t[(0, 3)] = position.x;
    t[(1, 3)] = position.y;
    t[(2, 3)] = position.z;
    t
}

pub fn transform_from_pose(pose: &Pose) -> Transform {
    transform_from_position_and_orientation(&pose.position(), &pose.orientation())
}

pub fn pose_from_transform(t: &Transform) -> Pose {
    Pose::from_parts(translation_of(t), orientation_from_transform(t))
}

/// Pure translation.
pub fn translation(x: f64, y: f64, z: f64) -> Transform {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

pub fn translation_of(t: &Transform) -> Vector3<f64> {
    Vector3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)])
}

/// Inverse of a rigid transform: `[R^T, -R^T p]`.
///
/// Exact for transforms with an orthonormal rotation block, which is every
/// transform built in this crate.
pub fn rigid_inverse(t: &Transform) -> Transform {
    let mut inv = Transform::identity();
    for row in 0..3 {
        for col in 0..3 {
            inv[(row, col)] = t[(col, row)];
        }
    }
    for row in 0..3 {
        inv[(row, 3)] =
            -(t[(0, row)] * t[(0, 3)] + t[(1, row)] * t[(1, 3)] + t[(2, row)] * t[(2, 3)]);
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn dh_zero_is_identity() {
        assert_relative_eq!(dh(0.0, 0.0, 0.0, 0.0), Transform::identity(), epsilon = 1e-12);
    }

    #[test]
    fn dh_link_length_translates_along_x() {
        let t = dh(-100.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(translation_of(&t), Vector3::new(-100.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn dh_twist_and_offset() {
        // alpha = 90° moves the offset d onto -Y and rotates Z onto -Y.
        let t = dh(0.0, FRAC_PI_2, 10.0, 0.0);
        assert_relative_eq!(t[(1, 3)], -10.0, epsilon = 1e-12);
        assert_relative_eq!(t[(2, 3)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(t[(1, 2)], -1.0, epsilon = 1e-12);
        assert_eq!(t.row(3).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn orientation_roundtrip() {
        let orientation = Orientation::new(0.3, -0.4, 1.2);
        let t = orientation_to_transform(orientation.roll, orientation.pitch, orientation.yaw);
        let back = orientation_from_transform(&t);
        assert_relative_eq!(back.roll, 0.3, epsilon = 1e-12);
        assert_relative_eq!(back.pitch, -0.4, epsilon = 1e-12);
        assert_relative_eq!(back.yaw, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn orientation_is_zyx_intrinsic() {
        // Yaw applied last: the X axis is first pitched down, then swung about Z.
        let t = orientation_to_transform(0.0, FRAC_PI_2, PI / 2.0);
        let x_axis = t.fixed_view::<3, 1>(0, 0).into_owned();
        assert_relative_eq!(x_axis, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        let y_axis = t.fixed_view::<3, 1>(0, 1).into_owned();
        assert_relative_eq!(y_axis, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn rigid_inverse_matches_general_inverse() {
        let t = transform_from_position_and_orientation(
            &Vector3::new(12.0, -50.0, -300.0),
            &Orientation::new(0.2, -0.1, 0.7),
        ) * dh(-100.0, FRAC_PI_2, 5.0, 0.4);
        let general = t.try_inverse().unwrap();
        assert_relative_eq!(rigid_inverse(&t), general, epsilon = 1e-9);
        assert_relative_eq!(rigid_inverse(&t) * t, Transform::identity(), epsilon = 1e-9);
    }

    #[test]
    fn pose_transform_roundtrip() {
        let pose = Pose::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let back = pose_from_transform(&transform_from_pose(&pose));
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(back.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(back.z, 3.0, epsilon = 1e-12);
        assert_relative_eq!(back.roll, 0.1, epsilon = 1e-12);
        assert_relative_eq!(back.pitch, 0.2, epsilon = 1e-12);
        assert_relative_eq!(back.yaw, 0.3, epsilon = 1e-12);
    }
}

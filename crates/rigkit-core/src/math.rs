//! Bone frame math
//!
//! A joint's orientation is fully described by its head, tail and roll.
//! The zero-roll frame is the shortest-arc rotation taking +Y onto the
//! joint direction; roll then spins that frame about the direction.

use glam::{Mat3, Quat, Vec3};

use crate::constants::DEGENERATE_EPSILON;

/// Zero-roll orientation for a unit direction
fn rest_alignment(direction: Vec3) -> Quat {
    Quat::from_rotation_arc(Vec3::Y, direction)
}

/// Orientation of a joint as a rotation (columns are the joint X, Y, Z axes)
///
/// Returns `None` for zero-length joints.
pub fn joint_rotation(head: Vec3, tail: Vec3, roll: f32) -> Option<Quat> {
    let direction = (tail - head).try_normalize()?;
    Some(Quat::from_axis_angle(direction, roll) * rest_alignment(direction))
}

/// Orientation of a joint as a 3x3 basis
pub fn joint_basis(head: Vec3, tail: Vec3, roll: f32) -> Option<Mat3> {
    joint_rotation(head, tail, roll).map(Mat3::from_quat)
}

/// Roll that makes the joint's local `axis` point as close as possible to `reference`
///
/// `reference` is projected onto the plane perpendicular to `direction` first.
/// Returns `None` when the direction is zero or the projection is degenerate.
pub fn roll_aligning_axis(direction: Vec3, reference: Vec3, axis: Vec3) -> Option<f32> {
    let direction = direction.try_normalize()?;
    let target = project_onto_plane(reference, direction)?;
    let base = rest_alignment(direction) * axis;
    let sin = direction.dot(base.cross(target));
    let cos = base.dot(target);
    Some(sin.atan2(cos))
}

/// Roll that points the joint's local Z axis towards `reference`
pub fn roll_aligning_z(direction: Vec3, reference: Vec3) -> Option<f32> {
    roll_aligning_axis(direction, reference, Vec3::Z)
}

/// Roll that points the joint's local X axis towards `reference`
pub fn roll_aligning_x(direction: Vec3, reference: Vec3) -> Option<f32> {
    roll_aligning_axis(direction, reference, Vec3::X)
}

/// Remove the component of `v` along unit `normal` and normalize
///
/// Returns `None` if what remains is shorter than [`DEGENERATE_EPSILON`].
pub fn project_onto_plane(v: Vec3, normal: Vec3) -> Option<Vec3> {
    let projected = v - normal * v.dot(normal);
    if projected.length() < DEGENERATE_EPSILON {
        None
    } else {
        Some(projected.normalize())
    }
}

/// Orthonormal frame owned by `direction` (Y): `perpendicular` supplies X, Z = X x Y
pub fn orientation_frame(direction: Vec3, perpendicular: Vec3) -> Option<Mat3> {
    let y = direction.try_normalize()?;
    let x = perpendicular.try_normalize()?;
    let z = x.cross(y).try_normalize()?;
    Some(Mat3::from_cols(x, y, z))
}

/// Rotation carrying frame `from` onto frame `to`
pub fn change_of_basis(from: Mat3, to: Mat3) -> Mat3 {
    to * from.inverse()
}

/// Arithmetic mean of a set of points
pub fn average(points: impl IntoIterator<Item = Vec3>) -> Option<Vec3> {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f32)
}

/// Area, unit normal and centroid of a planar polygon (Newell's method)
///
/// The normal is `Vec3::ZERO` for degenerate polygons.
pub fn polygon_area_normal(points: &[Vec3]) -> (f32, Vec3, Vec3) {
    let centroid = average(points.iter().copied()).unwrap_or(Vec3::ZERO);
    if points.len() < 3 {
        return (0.0, Vec3::ZERO, centroid);
    }
    let mut cross_sum = Vec3::ZERO;
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        cross_sum += p.cross(q);
    }
    let area = cross_sum.length() * 0.5;
    (area, cross_sum.normalize_or_zero(), centroid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_zero_roll_frame_for_y_joint() {
        let basis = joint_basis(Vec3::ZERO, Vec3::Y, 0.0).unwrap();
        assert!(basis.x_axis.abs_diff_eq(Vec3::X, 1e-6));
        assert!(basis.y_axis.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(basis.z_axis.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_roll_spins_about_direction() {
        let basis = joint_basis(Vec3::ZERO, Vec3::Y, FRAC_PI_2).unwrap();
        assert!(basis.y_axis.abs_diff_eq(Vec3::Y, 1e-6));
        // Positive roll is counter-clockwise about +Y: X goes to -Z
        assert!(basis.x_axis.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_roll_alignment_recovers_roll() {
        let head = Vec3::new(0.2, -1.0, 0.5);
        let tail = Vec3::new(1.0, 0.3, 2.0);
        for roll in [-2.5f32, -0.7, 0.0, 0.4, 1.9, 3.0] {
            let basis = joint_basis(head, tail, roll).unwrap();
            let recovered_z = roll_aligning_z(tail - head, basis.z_axis).unwrap();
            let recovered_x = roll_aligning_x(tail - head, basis.x_axis).unwrap();
            assert_abs_diff_eq!(recovered_z, roll, epsilon = 1e-4);
            assert_abs_diff_eq!(recovered_x, roll, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_degenerate_projection() {
        assert!(project_onto_plane(Vec3::Y * 2.0, Vec3::Y).is_none());
        assert!(roll_aligning_z(Vec3::Z, Vec3::Z).is_none());
        assert!(joint_basis(Vec3::ONE, Vec3::ONE, 0.0).is_none());
    }

    #[test]
    fn test_change_of_basis_maps_frames() {
        let from = orientation_frame(Vec3::Y, Vec3::X).unwrap();
        let to = orientation_frame(Vec3::X, Vec3::NEG_Y).unwrap();
        let r = change_of_basis(from, to);
        assert!((r * Vec3::Y).abs_diff_eq(Vec3::X, 1e-6));
        assert!((r * Vec3::X).abs_diff_eq(Vec3::NEG_Y, 1e-6));
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_polygon_area_normal() {
        let quad = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        ];
        let (area, normal, centroid) = polygon_area_normal(&quad);
        assert_abs_diff_eq!(area, 6.0, epsilon = 1e-5);
        assert!(normal.abs_diff_eq(Vec3::Z, 1e-6));
        assert!(centroid.abs_diff_eq(Vec3::new(1.0, 1.5, 0.0), 1e-6));
    }

    #[test]
    fn test_average_empty() {
        assert!(average(std::iter::empty()).is_none());
        let avg = average([Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)]).unwrap();
        assert_eq!(avg, Vec3::new(1.0, 2.0, 3.0));
    }
}

// Affine helpers on top of glam::Mat4.
//
// glam already provides transform_point3(), transform_vector3() and
// inverse(); placed geometry also needs normals and a few constructors.

use glam::{Mat4, Vec3};

/// Extension trait for Mat4 used when placing geometry in the world.
pub trait Mat4Ext {
    /// Transform a normal with the inverse transpose so it stays perpendicular
    /// to the transformed surface. The result is normalized.
    fn transform_normal3(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_normal3(&self, normal: Vec3) -> Vec3 {
        self.inverse().transpose().transform_vector3(normal).normalize_or_zero()
    }
}

/// Rotation about +Y given in degrees.
pub fn rotate_y(degrees: f32) -> Mat4 {
    Mat4::from_rotation_y(degrees.to_radians())
}

/// Translation by `offset`.
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_ignores_translation() {
        let mat = translate(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(mat.transform_normal3(Vec3::Y), Vec3::Y);
        assert_eq!(mat.transform_point3(Vec3::ZERO), Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let v = rotate_y(90.0).transform_vector3(Vec3::X);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_normal_under_non_uniform_scale() {
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        // Plane x + y = 0 has normal (1,1,0)/sqrt2; stretched along x it tilts toward y.
        let n = mat.transform_normal3(Vec3::new(1.0, 1.0, 0.0).normalize());
        let tangent = mat.transform_vector3(Vec3::new(1.0, -1.0, 0.0));

        assert!(n.dot(tangent).abs() < 1e-5);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }
}

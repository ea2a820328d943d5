//! Orthonormal shading frame around a surface normal.

use umbra_math::Vec3;

/// Local frame with `z` along the shading normal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Frame {
    /// Build a frame from a unit normal.
    pub fn from_normal(normal: Vec3) -> Self {
        let z = normal;
        let helper = if z.x.abs() > 0.99 { Vec3::Y } else { Vec3::X };
        let x = helper.cross(z).normalize();
        let y = z.cross(x);
        Self { x, y, z }
    }

    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.x), v.dot(self.y), v.dot(self.z))
    }

    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_orthonormal_and_invertible() {
        let normals = [
            Vec3::X,
            -Vec3::Y,
            Vec3::Z,
            Vec3::new(0.3, -0.8, 0.52).normalize(),
        ];
        for n in normals {
            let frame = Frame::from_normal(n);
            assert!(frame.x.dot(frame.y).abs() < 1e-5);
            assert!(frame.x.dot(frame.z).abs() < 1e-5);
            assert!((frame.x.length() - 1.0).abs() < 1e-5);
            assert!((frame.y.length() - 1.0).abs() < 1e-5);

            let v = Vec3::new(0.2, 0.5, -0.7);
            let back = frame.to_world(frame.to_local(v));
            assert!((back - v).length() < 1e-5);
            assert!((frame.to_local(n) - Vec3::Z).length() < 1e-5);
        }
    }
}

use crate::Vec3;

/// A ray with origin, direction, and a time stamp.
///
/// The direction is not required to be normalized. `time` lies in [0, 1]
/// over the shutter interval and drives moving primitives (motion blur).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    time: f32,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, time: f32) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    /// Create a ray at time 0.
    #[inline]
    pub fn new_simple(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, 0.0)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Point along the ray: origin + t * direction.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Spawn a ray from `origin` towards `direction` that keeps this ray's time.
    #[inline]
    pub fn spawn(&self, origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction, self.time)
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), 0.0);

        assert_eq!(ray.at(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(1.5), Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn test_spawn_keeps_time() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.25);
        let child = ray.spawn(Vec3::ONE, Vec3::Y);

        assert_eq!(child.time(), 0.25);
        assert_eq!(child.origin(), Vec3::ONE);
        assert_eq!(child.direction(), Vec3::Y);
    }
}

use std::ops::Index;

use crate::{Interval, Ray, Vec3};

/// Minimum slab width; thinner axes are padded so planar primitives keep a
/// non-zero measure in the slab test.
pub const MIN_AXIS_WIDTH: f32 = 1e-4;

/// Axis-aligned bounding box made of three independent intervals.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals, padding degenerate axes.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points given in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. A zero direction component yields infinite slab times,
    /// and the NaN produced when the origin sits exactly on that slab fails
    /// both comparisons, so the interval is left untouched for that axis.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        let origin = ray.origin();
        let direction = ray.direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / direction[axis];

            let mut t0 = (slab.min - origin[axis]) * adinv;
            let mut t1 = (slab.max - origin[axis]) * adinv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > ray_t.min {
                ray_t.min = t0;
            }
            if t1 < ray_t.max {
                ray_t.max = t1;
            }
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_AXIS_WIDTH {
            self.x = self.x.expand(MIN_AXIS_WIDTH);
        }
        if self.y.size() < MIN_AXIS_WIDTH {
            self.y = self.y.expand(MIN_AXIS_WIDTH);
        }
        if self.z.size() < MIN_AXIS_WIDTH {
            self.z = self.z.expand(MIN_AXIS_WIDTH);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size {
            if x_size > z_size {
                0
            } else {
                2
            }
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.centroid(), self.y.centroid(), self.z.centroid())
    }

    pub fn surface_area(&self) -> f32 {
        let (dx, dy, dz) = (self.x.size(), self.y.size(), self.z.size());
        2.0 * (dx * dy + dx * dz + dy * dz)
    }

    /// True if `other` lies entirely inside this box.
    pub fn encloses(&self, other: &Aabb) -> bool {
        self.x.encloses(&other.x) && self.y.encloses(&other.y) && self.z.encloses(&other.z)
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Index<usize> for Aabb {
    type Output = Interval;

    fn index(&self, axis: usize) -> &Interval {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

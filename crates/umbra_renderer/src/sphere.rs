//! Sphere primitive, optionally moving linearly over the shutter interval.

use std::f32::consts::PI;

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{Hittable, ShapeSample, SurfaceHit};
use crate::sampling::{gen_vec2, uniform_sphere};

/// Smallest radius a sphere is allowed to have.
pub const MIN_RADIUS: f32 = 1e-8;

/// Quadratic discriminants below this count as a miss.
const DISCRIMINANT_EPSILON: f32 = 1e-8;

/// A sphere primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Vec3,
    /// Displacement of the centre between time 0 and time 1
    motion: Vec3,
    radius: f32,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self::moving(center, center, radius)
    }

    /// Create a sphere whose centre moves from `center0` at time 0 to
    /// `center1` at time 1.
    pub fn moving(center0: Vec3, center1: Vec3, radius: f32) -> Self {
        let radius = radius.max(MIN_RADIUS);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Self {
            center: center0,
            motion: center1 - center0,
            radius,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_moving(&self) -> bool {
        self.motion != Vec3::ZERO
    }

    /// Centre position at `time`.
    #[inline]
    pub fn center_at(&self, time: f32) -> Vec3 {
        self.center + time * self.motion
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle up from -Y, phi: angle around Y from -X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let center = self.center_at(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < DISCRIMINANT_EPSILON {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        let (u, v) = Self::get_sphere_uv(outward_normal);
        Some(SurfaceHit::facing(ray, root, outward_normal, u, v))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, time: f32, rng: &mut dyn RngCore) -> Option<ShapeSample> {
        let direction = uniform_sphere(gen_vec2(rng));
        Some(ShapeSample {
            point: self.center_at(time) + self.radius * direction,
            normal: direction,
            pdf: 1.0 / self.area(),
        })
    }
}

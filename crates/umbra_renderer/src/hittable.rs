//! Hittable trait and the records produced by ray-object intersection.

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray, Vec3};

/// Index of a primitive in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub usize);

/// Index of a material in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Geometric part of an intersection, as reported by a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal; faces the incoming ray unless the shape has a fixed normal
    pub normal: Vec3,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Surface coordinates
    pub u: f32,
    pub v: f32,
    /// Whether the ray arrived on the side the outward normal points to
    pub front_face: bool,
}

impl SurfaceHit {
    /// Build a hit whose stored normal points against the ray.
    pub fn facing(ray: &Ray, t: f32, outward_normal: Vec3, u: f32, v: f32) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p: ray.at(t),
            normal,
            t,
            u,
            v,
            front_face,
        }
    }
}

/// Full intersection record handed to materials and the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub p: Vec3,
    pub normal: Vec3,
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub front_face: bool,
    pub material: MaterialId,
    pub primitive: PrimitiveId,
}

impl HitRecord {
    pub fn new(surface: SurfaceHit, material: MaterialId, primitive: PrimitiveId) -> Self {
        Self {
            p: surface.p,
            normal: surface.normal,
            t: surface.t,
            u: surface.u,
            v: surface.v,
            front_face: surface.front_face,
            material,
            primitive,
        }
    }
}

/// Point drawn uniformly over a shape's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSample {
    pub point: Vec3,
    /// Unit normal at `point`
    pub normal: Vec3,
    /// Density with respect to surface area
    pub pdf: f32,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, or `None`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Surface area.
    fn area(&self) -> f32;

    /// Sample a point uniformly by area at the given ray time.
    fn sample(&self, time: f32, rng: &mut dyn RngCore) -> Option<ShapeSample>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_flips_normal_for_back_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, 0.0);

        let front = SurfaceHit::facing(&ray, 5.0, Vec3::Z, 0.0, 0.0);
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);

        let back = SurfaceHit::facing(&ray, 5.0, -Vec3::Z, 0.0, 0.0);
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
        assert_eq!(back.p, Vec3::ZERO);
    }
}

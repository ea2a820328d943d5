//! Scene primitives: a shape paired with the material it is made of.

use rand::RngCore;
use umbra_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable, MaterialId, PrimitiveId, ShapeSample, SurfaceHit};
use crate::quad::Quad;
use crate::sphere::Sphere;

/// Closed set of geometric shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Quad(Quad),
}

impl Hittable for Shape {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        match self {
            Shape::Sphere(sphere) => sphere.hit(ray, ray_t),
            Shape::Quad(quad) => quad.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(sphere) => sphere.bounding_box(),
            Shape::Quad(quad) => quad.bounding_box(),
        }
    }

    fn area(&self) -> f32 {
        match self {
            Shape::Sphere(sphere) => sphere.area(),
            Shape::Quad(quad) => quad.area(),
        }
    }

    fn sample(&self, time: f32, rng: &mut dyn RngCore) -> Option<ShapeSample> {
        match self {
            Shape::Sphere(sphere) => sphere.sample(time, rng),
            Shape::Quad(quad) => quad.sample(time, rng),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Quad> for Shape {
    fn from(quad: Quad) -> Self {
        Shape::Quad(quad)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub material: MaterialId,
}

impl Primitive {
    pub fn new(shape: impl Into<Shape>, material: MaterialId) -> Self {
        Self {
            shape: shape.into(),
            material,
        }
    }

    /// Intersect and tag the result with this primitive's handles.
    #[inline]
    pub fn hit(&self, id: PrimitiveId, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.shape
            .hit(ray, ray_t)
            .map(|surface| HitRecord::new(surface, self.material, id))
    }

    #[inline]
    pub fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.shape.area()
    }

    pub fn sample(&self, time: f32, rng: &mut dyn RngCore) -> Option<ShapeSample> {
        self.shape.sample(time, rng)
    }
}

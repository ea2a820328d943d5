//! Scene container: primitive and material arenas plus the light list.
//!
//! Built single-threaded, then shared immutably by every render thread.

use rand::RngCore;
use thiserror::Error;
use umbra_math::{Aabb, Interval, Ray, Vec3};

use crate::bvh::Bvh;
use crate::hittable::{HitRecord, MaterialId, PrimitiveId};
use crate::material::Material;
use crate::primitive::{Primitive, Shape};
use crate::sampling::gen_f32;

/// Scene construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown material id {id} ({count} materials registered)")]
    UnknownMaterial { id: usize, count: usize },
}

/// A point sampled on an emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub primitive: PrimitiveId,
    pub point: Vec3,
    pub normal: Vec3,
    /// Density with respect to total light area
    pub pdf_area: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    lights: Vec<PrimitiveId>,
    total_light_area: f32,
    bbox: Aabb,
    bvh: Option<Bvh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Insert a primitive. Emissive primitives join the light list.
    /// Invalidates any previously built BVH.
    pub fn add(&mut self, primitive: Primitive) -> Result<PrimitiveId, SceneError> {
        let material = self
            .materials
            .get(primitive.material.0)
            .ok_or(SceneError::UnknownMaterial {
                id: primitive.material.0,
                count: self.materials.len(),
            })?;

        let id = PrimitiveId(self.primitives.len());
        if material.shines() {
            self.lights.push(id);
            self.total_light_area += primitive.area();
        }

        self.bbox = Aabb::surrounding(&self.bbox, &primitive.bounding_box());
        self.primitives.push(primitive);
        self.bvh = None;
        Ok(id)
    }

    /// Insert several primitives sharing one material.
    pub fn add_all<S, I>(&mut self, shapes: I, material: MaterialId) -> Result<Vec<PrimitiveId>, SceneError>
    where
        S: Into<Shape>,
        I: IntoIterator<Item = S>,
    {
        shapes
            .into_iter()
            .map(|shape| self.add(Primitive::new(shape, material)))
            .collect()
    }

    /// Build the acceleration structure. Call after the last `add`.
    pub fn build_bvh(&mut self) {
        let bvh = Bvh::build(&self.primitives);
        log::info!(
            "Scene: {} primitives, {} materials, {} lights, BVH {} nodes (depth {})",
            self.primitives.len(),
            self.materials.len(),
            self.lights.len(),
            bvh.node_count(),
            bvh.depth()
        );
        self.bvh = Some(bvh);
    }

    /// Nearest hit within `ray_t`, through the BVH when one is built.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match &self.bvh {
            Some(bvh) => bvh.hit(&self.primitives, ray, ray_t),
            None => self.hit_linear(ray, ray_t),
        }
    }

    /// Brute-force nearest hit over every primitive.
    pub fn hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest = None;
        let mut closest_so_far = ray_t.max;

        for (index, primitive) in self.primitives.iter().enumerate() {
            if let Some(rec) = primitive.hit(PrimitiveId(index), ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn primitive(&self, id: PrimitiveId) -> &Primitive {
        &self.primitives[id.0]
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[PrimitiveId] {
        &self.lights
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty() && self.total_light_area > 0.0
    }

    pub fn total_light_area(&self) -> f32 {
        self.total_light_area
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Pick a light with probability proportional to its area and sample a
    /// point on it.
    pub fn sample_light(&self, time: f32, rng: &mut dyn RngCore) -> Option<LightSample> {
        if !self.has_lights() {
            return None;
        }

        let target = gen_f32(rng) * self.total_light_area;
        let mut accumulated = 0.0;
        let mut chosen = self.lights[self.lights.len() - 1];
        for &id in &self.lights {
            accumulated += self.primitives[id.0].area();
            if target < accumulated {
                chosen = id;
                break;
            }
        }

        let sample = self.primitives[chosen.0].sample(time, rng)?;
        Some(LightSample {
            primitive: chosen,
            point: sample.point,
            normal: sample.normal,
            pdf_area: 1.0 / self.total_light_area,
        })
    }

    /// Solid-angle density with which `sample_light` would have produced
    /// the point in `rec` as seen from `origin`.
    pub fn light_pdf(&self, origin: Vec3, rec: &HitRecord) -> f32 {
        if !self.has_lights() || !self.material(rec.material).shines() {
            return 0.0;
        }

        let to_light = rec.p - origin;
        let dist2 = to_light.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let cos_light = rec.normal.dot(to_light / dist2.sqrt()).abs();
        if cos_light < 1e-8 {
            return 0.0;
        }

        dist2 / (cos_light * self.total_light_area)
    }
}

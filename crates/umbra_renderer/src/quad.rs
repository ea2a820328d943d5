//! Planar parallelogram primitive and the box built from six of them.

use rand::RngCore;
use umbra_math::{Aabb, Interval, Mat4, Mat4Ext, Ray, Vec3};

use crate::hittable::{Hittable, ShapeSample, SurfaceHit};
use crate::sampling::gen_f32;

/// Rays closer to parallel with the plane than this are treated as misses.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Parallelogram spanned by edges `u` and `v` from corner `q`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// n / (n . n), used to recover planar coordinates
    w: Vec3,
    normal: Vec3,
    /// Plane constant: normal . x = d
    d: f32,
    area: f32,
    bbox: Aabb,
    /// Report `normal` as-is instead of facing it towards the ray
    fixed_normal: bool,
    back_culling: bool,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3) -> Self {
        let n = u.cross(v);
        let normal = n.normalize_or_zero();
        let n_len_sq = n.length_squared();
        let w = if n_len_sq > 0.0 { n / n_len_sq } else { Vec3::ZERO };

        let diagonal0 = Aabb::from_points(q, q + u + v);
        let diagonal1 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w,
            normal,
            d: normal.dot(q),
            area: n.length(),
            bbox: Aabb::surrounding(&diagonal0, &diagonal1),
            fixed_normal: false,
            back_culling: false,
        }
    }

    /// Quad given in object space and placed with an affine transform.
    pub fn transformed(q: Vec3, u: Vec3, v: Vec3, transform: &Mat4) -> Self {
        Self::new(
            transform.transform_point3(q),
            transform.transform_vector3(u),
            transform.transform_vector3(v),
        )
    }

    /// One-sided quad reporting `normal` (object space) regardless of the
    /// side the ray arrives from. Rays travelling along the normal are culled.
    pub fn with_normal(q: Vec3, u: Vec3, v: Vec3, normal: Vec3, transform: &Mat4) -> Self {
        let mut quad = Self::transformed(q, u, v, transform);
        quad.normal = transform.transform_normal3(normal);
        quad.d = quad.normal.dot(quad.q);
        quad.fixed_normal = true;
        quad.back_culling = true;
        quad
    }

    /// Enable or disable back-face culling.
    pub fn culled(mut self, back_culling: bool) -> Self {
        self.back_culling = back_culling;
        self
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn corner(&self) -> Vec3 {
        self.q
    }

    /// Whether planar coordinates (alpha, beta) fall inside the unit square.
    fn is_interior(alpha: f32, beta: f32) -> bool {
        Interval::UNIT.contains(alpha) && Interval::UNIT.contains(beta)
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let denom = self.normal.dot(ray.direction());
        if self.back_culling && denom > 0.0 {
            return None;
        }
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let planar = ray.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !Self::is_interior(alpha, beta) {
            return None;
        }

        let mut hit = SurfaceHit::facing(ray, t, self.normal, alpha, beta);
        if self.fixed_normal {
            hit.normal = self.normal;
        }
        Some(hit)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, _time: f32, rng: &mut dyn RngCore) -> Option<ShapeSample> {
        if self.area <= 0.0 {
            return None;
        }

        let s = gen_f32(rng);
        let t = gen_f32(rng);
        Some(ShapeSample {
            point: self.q + s * self.u + t * self.v,
            normal: self.normal,
            pdf: 1.0 / self.area,
        })
    }
}

/// Six quads enclosing the box with opposite corners `a` and `b`, placed
/// with `transform`. Face normals point outwards.
pub fn make_box(a: Vec3, b: Vec3, transform: &Mat4) -> Vec<Quad> {
    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    vec![
        // front (+z)
        Quad::transformed(Vec3::new(min.x, min.y, max.z), dx, dy, transform),
        // right (+x)
        Quad::transformed(Vec3::new(max.x, min.y, max.z), -dz, dy, transform),
        // back (-z)
        Quad::transformed(Vec3::new(max.x, min.y, min.z), -dx, dy, transform),
        // left (-x)
        Quad::transformed(Vec3::new(min.x, min.y, min.z), dz, dy, transform),
        // top (+y)
        Quad::transformed(Vec3::new(min.x, max.y, max.z), dx, -dz, transform),
        // bottom (-y)
        Quad::transformed(Vec3::new(min.x, min.y, min.z), dx, dz, transform),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use umbra_math::{rotate_y, translate};

    fn unit_quad() -> Quad {
        Quad::new(Vec3::ZERO, Vec3::X, Vec3::Y)
    }

    #[test]
    fn test_interior_and_exterior() {
        let quad = unit_quad();
        let t = Interval::new(0.001, f32::INFINITY);

        let inside = Ray::new(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z, 0.0);
        let hit = quad.hit(&inside, t).expect("centre should hit");
        assert!((hit.u - 0.5).abs() < 1e-5);
        assert!((hit.v - 0.5).abs() < 1e-5);
        assert!((hit.t - 1.0).abs() < 1e-5);

        let outside = Ray::new(Vec3::new(1.5, 0.2, 1.0), -Vec3::Z, 0.0);
        assert!(quad.hit(&outside, t).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let quad = unit_quad();
        let ray = Ray::new(Vec3::new(-1.0, 0.5, 0.0), Vec3::X, 0.0);
        assert!(quad.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_normal_faces_ray_from_either_side() {
        let quad = unit_quad();
        let t = Interval::new(0.001, f32::INFINITY);

        let from_front = Ray::new(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z, 0.0);
        let from_back = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::Z, 0.0);

        let front = quad.hit(&from_front, t).expect("front hit");
        let back = quad.hit(&from_back, t).expect("back hit");
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);
        assert!(!back.front_face);
        assert_eq!(back.normal, -Vec3::Z);
    }

    #[test]
    fn test_fixed_normal_culls_back_side() {
        let quad = Quad::with_normal(Vec3::ZERO, Vec3::X, Vec3::Y, -Vec3::Z, &Mat4::IDENTITY);
        let t = Interval::new(0.001, f32::INFINITY);

        // Travelling against the normal: visible, normal reported unchanged.
        let visible = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::Z, 0.0);
        let hit = quad.hit(&visible, t).expect("front side hit");
        assert_eq!(hit.normal, -Vec3::Z);

        let culled = Ray::new(Vec3::new(0.5, 0.5, 1.0), -Vec3::Z, 0.0);
        assert!(quad.hit(&culled, t).is_none());

        let two_sided = quad.culled(false);
        let hit = two_sided.hit(&culled, t).expect("culling disabled");
        assert_eq!(hit.normal, -Vec3::Z);
    }

    #[test]
    fn test_transformed_quad() {
        let transform = translate(Vec3::new(0.0, 0.0, -3.0)) * rotate_y(90.0);
        let quad = Quad::transformed(Vec3::ZERO, Vec3::X, Vec3::Y, &transform);

        // +X edge rotated to -Z, so the +Z plane normal now lies along +X.
        assert!((quad.normal() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((quad.corner() - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
        assert!((quad.area() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_normal_survives_non_uniform_scale() {
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let transform = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let quad = Quad::with_normal(Vec3::ZERO, Vec3::new(1.0, -1.0, 0.0), Vec3::Z, normal, &transform);

        assert!(quad.normal().dot(quad.u).abs() < 1e-5);
        assert!(quad.normal().dot(quad.v).abs() < 1e-5);
        assert!((quad.normal().length() - 1.0).abs() < 1e-5);
        assert!(quad.normal().dot(normal) > 0.0);

        let ray = Ray::new(Vec3::new(2.0, 0.5, 0.5), Vec3::new(-1.0, -1.0, 0.0), 0.0);
        let hit = quad.hit(&ray, Interval::new(0.001, f32::INFINITY)).expect("hits the front side");
        assert_eq!(hit.normal, quad.normal());
    }

    #[test]
    fn test_bounding_box_is_padded_and_encloses() {
        let quad = Quad::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0));
        let bbox = quad.bounding_box();
        assert!(bbox.y.size() > 0.0);
        assert!(bbox.x.contains(-1.0) && bbox.x.contains(1.0));
    }

    #[test]
    fn test_sample_within_quad() {
        let quad = Quad::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let s = quad.sample(0.0, &mut rng).expect("non-degenerate quad");
            assert!(s.point.x >= 1.0 && s.point.x <= 3.0);
            assert!(s.point.y >= 0.0 && s.point.y <= 3.0);
            assert_eq!(s.point.z, 0.0);
            assert!((s.pdf - 1.0 / 6.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_box_faces_point_outwards() {
        let faces = make_box(Vec3::ZERO, Vec3::ONE, &Mat4::IDENTITY);
        assert_eq!(faces.len(), 6);

        let center = Vec3::splat(0.5);
        for face in &faces {
            let face_center = face.corner() + 0.5 * (face.u + face.v);
            assert!(face.normal().dot(face_center - center) > 0.0);
            assert!((face.area() - 1.0).abs() < 1e-6);
        }
    }
}

//! Material system for path tracing.
//!
//! A closed set of BSDFs. `scatter` draws one direction and returns a
//! [`ScatterRecord`] describing the choice it made; `pdf` and `response`
//! take that record back so stochastic lobe selection never has to be
//! remembered on the material itself. Materials are immutable and shared
//! across render threads.
//!
//! Direction conventions for `pdf` and `response`: `wi` is the scattered
//! (light-facing) direction, `wo` points back towards the viewer, and
//! `normal` is the hit normal, which faces `wo`.

use std::f32::consts::PI;
use std::sync::Arc;

use rand::RngCore;
use umbra_core::Texture;
use umbra_math::{Color, Ray, Vec3};

use crate::frame::Frame;
use crate::hittable::HitRecord;
use crate::microfacet::{fresnel_dielectric, fresnel_schlick, reflect, refract, Ggx};
use crate::sampling::{cosine_hemisphere, cosine_hemisphere_pdf, gen_f32, gen_vec2};

/// Roughness at or below which a lobe is treated as a perfect mirror.
pub const MIRROR_ALPHA: f32 = 0.001;

/// Roughness below which a conductor is too sharp for light sampling.
pub const GLOSSY_ALPHA: f32 = 0.1;

/// Normal-incidence reflectance of a non-metal.
pub const DIELECTRIC_F0: f32 = 0.4;

/// Default ceiling on a dielectric's reflect/transmit selection probability.
pub const DEFAULT_SELECTION_CLAMP: f32 = 1.0 - 1e-4;

/// Cosines below this make a BSDF evaluate to zero.
const COS_EPSILON: f32 = 1e-6;

/// Which lobe produced a scattered direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterKind {
    Diffuse,
    Reflection,
    Transmission,
}

/// Outcome of sampling a material at one hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRecord {
    pub kind: ScatterKind,
    /// Texture-driven colour (albedo, or f0 for conductors)
    pub attenuation: Color,
    /// Continuation ray leaving the hit point
    pub ray: Ray,
    /// Probability of having chosen the reflection lobe
    pub pdf_reflect: f32,
    /// Probability of having chosen the transmission lobe
    pub pdf_transmit: f32,
    /// Relative index of refraction n_t / n_i seen by this sample
    pub eta: f32,
}

/// Diffuse reflector.
#[derive(Debug, Clone)]
pub struct Lambertian {
    pub albedo: Arc<Texture>,
}

/// Metal-like reflector with anisotropic GGX roughness.
#[derive(Debug, Clone)]
pub struct Conductor {
    /// Base reflectance, blended with [`DIELECTRIC_F0`] by `metalness`
    pub base: Arc<Texture>,
    pub metalness: f32,
    pub ggx: Ggx,
}

/// Glass-like interface that reflects and refracts.
///
/// The lobe is picked with the macro-normal Fresnel term. When a rough
/// sample picks transmission but the microfacet totally internally
/// reflects, the path ends, so rough glass loses energy in a white
/// furnace (about a quarter at alpha 0.3).
#[derive(Debug, Clone)]
pub struct Dielectric {
    pub ior: f32,
    pub ggx: Ggx,
    /// Upper bound on either lobe's selection probability
    pub selection_clamp: f32,
}

/// Area light.
#[derive(Debug, Clone)]
pub struct Emissive {
    pub emit: Arc<Texture>,
}

#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Conductor(Conductor),
    Dielectric(Dielectric),
    Emissive(Emissive),
}

impl Material {
    pub fn lambertian(albedo: Color) -> Self {
        Self::lambertian_texture(Texture::Solid(albedo))
    }

    pub fn lambertian_texture(albedo: Texture) -> Self {
        Material::Lambertian(Lambertian {
            albedo: Arc::new(albedo),
        })
    }

    /// Conductor with a solid base colour.
    pub fn conductor(base: Color, alpha_x: f32, alpha_y: f32, metalness: f32) -> Self {
        Self::conductor_texture(Texture::Solid(base), alpha_x, alpha_y, metalness)
    }

    pub fn conductor_texture(base: Texture, alpha_x: f32, alpha_y: f32, metalness: f32) -> Self {
        Material::Conductor(Conductor {
            base: Arc::new(base),
            metalness: metalness.clamp(0.0, 1.0),
            ggx: Ggx::new(alpha_x, alpha_y),
        })
    }

    /// Smooth glass.
    pub fn dielectric(ior: f32) -> Self {
        Self::rough_dielectric(ior, 0.0, 0.0)
    }

    pub fn rough_dielectric(ior: f32, alpha_x: f32, alpha_y: f32) -> Self {
        Material::Dielectric(Dielectric {
            ior,
            ggx: Ggx::new(alpha_x, alpha_y),
            selection_clamp: DEFAULT_SELECTION_CLAMP,
        })
    }

    pub fn emissive(color: Color) -> Self {
        Self::emissive_texture(Texture::Solid(color))
    }

    pub fn emissive_texture(emit: Texture) -> Self {
        Material::Emissive(Emissive {
            emit: Arc::new(emit),
        })
    }

    /// Draw a continuation direction. `None` means the path ends here
    /// (absorption, emission, or a failed sample).
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Conductor(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
            Material::Emissive(_) => None,
        }
    }

    /// Emitted radiance.
    pub fn emission(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::Emissive(m) => m.emit.value(u, v, p),
            _ => Color::ZERO,
        }
    }

    /// Solid-angle density of sampling `wi`. Delta lobes report their
    /// selection probability instead.
    pub fn pdf(&self, wi: Vec3, wo: Vec3, normal: Vec3, record: &ScatterRecord) -> f32 {
        match self {
            Material::Lambertian(_) => cosine_hemisphere_pdf(wi.dot(normal)),
            Material::Conductor(m) => m.pdf(wi, wo, normal),
            Material::Dielectric(m) => m.pdf(wi, wo, normal, record),
            Material::Emissive(_) => 0.0,
        }
    }

    /// BSDF value for the pair (`wi`, `wo`).
    pub fn response(&self, wi: Vec3, wo: Vec3, normal: Vec3, record: &ScatterRecord) -> Color {
        match self {
            Material::Lambertian(_) => {
                if wi.dot(normal) <= 0.0 {
                    Color::ZERO
                } else {
                    record.attenuation / PI
                }
            }
            Material::Conductor(m) => m.response(wi, wo, normal, record.attenuation),
            Material::Dielectric(m) => m.response(wi, wo, normal, record),
            Material::Emissive(_) => Color::ZERO,
        }
    }

    /// Whether this material emits light.
    pub fn shines(&self) -> bool {
        matches!(self, Material::Emissive(_))
    }

    /// Whether the lobe is too sharp for light sampling to help.
    pub fn glossy(&self) -> bool {
        match self {
            Material::Lambertian(_) | Material::Emissive(_) => false,
            Material::Conductor(m) => m.ggx.max_alpha() < GLOSSY_ALPHA,
            Material::Dielectric(_) => true,
        }
    }
}

impl Lambertian {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let frame = Frame::from_normal(rec.normal);
        let wi = frame.to_world(cosine_hemisphere(gen_vec2(rng)));

        Some(ScatterRecord {
            kind: ScatterKind::Diffuse,
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            ray: ray_in.spawn(rec.p, wi),
            pdf_reflect: 1.0,
            pdf_transmit: 0.0,
            eta: 1.0,
        })
    }
}

impl Conductor {
    pub fn is_mirror(&self) -> bool {
        self.ggx.max_alpha() <= MIRROR_ALPHA
    }

    /// Normal-incidence reflectance at a surface point.
    pub fn f0(&self, u: f32, v: f32, p: Vec3) -> Color {
        Color::splat(DIELECTRIC_F0).lerp(self.base.value(u, v, p), self.metalness)
    }

    /// A GGX sample below the horizon still yields a record. Its `pdf` is
    /// zero, so the walk ends after light sampling at this vertex.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let frame = Frame::from_normal(rec.normal);
        let wo = frame.to_local(-ray_in.direction().normalize());
        if wo.z <= 0.0 {
            return None;
        }

        let wi = if self.is_mirror() {
            Vec3::new(-wo.x, -wo.y, wo.z)
        } else {
            reflect(wo, self.ggx.sample_wm(wo, gen_vec2(rng)))
        };

        Some(ScatterRecord {
            kind: ScatterKind::Reflection,
            attenuation: self.f0(rec.u, rec.v, rec.p),
            ray: ray_in.spawn(rec.p, frame.to_world(wi)),
            pdf_reflect: 1.0,
            pdf_transmit: 0.0,
            eta: 1.0,
        })
    }

    fn pdf(&self, wi: Vec3, wo: Vec3, normal: Vec3) -> f32 {
        if self.is_mirror() {
            return 1.0;
        }

        let frame = Frame::from_normal(normal);
        let wi = frame.to_local(wi);
        let wo = frame.to_local(wo);
        if wi.z <= 0.0 || wo.z <= 0.0 {
            return 0.0;
        }

        let wm = wi + wo;
        if wm.length_squared() == 0.0 {
            return 0.0;
        }
        let wm = wm.normalize();

        self.ggx.d_visible(wo, wm) / (4.0 * wo.dot(wm).abs())
    }

    fn response(&self, wi: Vec3, wo: Vec3, normal: Vec3, f0: Color) -> Color {
        let frame = Frame::from_normal(normal);
        let wi = frame.to_local(wi);

        if self.is_mirror() {
            let cos_i = wi.z.abs();
            if cos_i < COS_EPSILON {
                return Color::ZERO;
            }
            return fresnel_schlick(cos_i, f0) / cos_i;
        }

        let wo = frame.to_local(wo);
        let (cos_i, cos_o) = (wi.z, wo.z);
        if cos_i < COS_EPSILON || cos_o < COS_EPSILON {
            return Color::ZERO;
        }

        let wm = wi + wo;
        if wm.length_squared() == 0.0 {
            return Color::ZERO;
        }
        let wm = wm.normalize();

        let fresnel = fresnel_schlick(wi.dot(wm).abs(), f0);
        fresnel * self.ggx.d(wm) * self.ggx.g(wo, wi) / (4.0 * cos_i * cos_o)
    }
}

impl Dielectric {
    pub fn is_smooth(&self) -> bool {
        self.ggx.max_alpha() <= MIRROR_ALPHA
    }

    pub fn with_selection_clamp(mut self, clamp: f32) -> Self {
        self.selection_clamp = clamp;
        self
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let frame = Frame::from_normal(rec.normal);
        let wo = frame.to_local(-ray_in.direction().normalize());
        if wo.z <= 0.0 {
            return None;
        }

        let eta = if rec.front_face { self.ior } else { 1.0 / self.ior };
        let pr = fresnel_dielectric(wo.z, eta);
        let pt = 1.0 - pr;
        let pdf_reflect = (pr / (pr + pt)).min(self.selection_clamp);
        let pdf_transmit = (pt / (pr + pt)).min(self.selection_clamp);

        let choose_reflect = gen_f32(rng) <= pdf_reflect;
        let wm = if self.is_smooth() {
            Vec3::Z
        } else {
            self.ggx.sample_wm(wo, gen_vec2(rng))
        };

        let (kind, wi) = if choose_reflect {
            let wi = reflect(wo, wm);
            if wi.z <= 0.0 {
                return None;
            }
            (ScatterKind::Reflection, wi)
        } else {
            let (wi, _) = refract(wo, wm, eta)?;
            if wi.z >= 0.0 {
                return None;
            }
            (ScatterKind::Transmission, wi)
        };

        Some(ScatterRecord {
            kind,
            attenuation: Color::ONE,
            ray: ray_in.spawn(rec.p, frame.to_world(wi)),
            pdf_reflect,
            pdf_transmit,
            eta,
        })
    }

    fn selection(record: &ScatterRecord, is_reflection: bool) -> f32 {
        if is_reflection {
            record.pdf_reflect
        } else {
            record.pdf_transmit
        }
    }

    /// Generalized half vector for the pair, oriented into the upper
    /// hemisphere, or `None` for degenerate or back-facing configurations.
    fn half_vector(wi: Vec3, wo: Vec3, etap: f32) -> Option<Vec3> {
        let wm = wi * etap + wo;
        if wm.length_squared() == 0.0 {
            return None;
        }
        let mut wm = wm.normalize();
        if wm.z < 0.0 {
            wm = -wm;
        }
        if wm.dot(wi) * wi.z < 0.0 || wm.dot(wo) * wo.z < 0.0 {
            return None;
        }
        Some(wm)
    }

    fn pdf(&self, wi: Vec3, wo: Vec3, normal: Vec3, record: &ScatterRecord) -> f32 {
        if self.is_smooth() {
            return match record.kind {
                ScatterKind::Reflection => record.pdf_reflect,
                ScatterKind::Transmission => record.pdf_transmit,
                ScatterKind::Diffuse => 0.0,
            };
        }

        let frame = Frame::from_normal(normal);
        let wi = frame.to_local(wi);
        let wo = frame.to_local(wo);
        if wi.z.abs() < COS_EPSILON || wo.z.abs() < COS_EPSILON {
            return 0.0;
        }

        let is_reflection = wi.z * wo.z > 0.0;
        let etap = if is_reflection { 1.0 } else { record.eta };
        let Some(wm) = Self::half_vector(wi, wo, etap) else {
            return 0.0;
        };

        let selection = Self::selection(record, is_reflection);
        let pdf_wm = self.ggx.d_visible(wo, wm);

        if is_reflection {
            pdf_wm / (4.0 * wo.dot(wm).abs()) * selection
        } else {
            let denom = (wi.dot(wm) + wo.dot(wm) / etap).powi(2);
            if denom == 0.0 {
                return 0.0;
            }
            pdf_wm * wi.dot(wm).abs() / denom * selection
        }
    }

    fn response(&self, wi: Vec3, wo: Vec3, normal: Vec3, record: &ScatterRecord) -> Color {
        let cos_i = wi.dot(normal).abs();
        if cos_i < COS_EPSILON {
            return Color::ZERO;
        }

        if self.is_smooth() {
            let value = match record.kind {
                ScatterKind::Reflection => record.pdf_reflect / cos_i,
                ScatterKind::Transmission => {
                    record.pdf_transmit / cos_i / (record.eta * record.eta)
                }
                ScatterKind::Diffuse => 0.0,
            };
            return Color::splat(value);
        }

        let frame = Frame::from_normal(normal);
        let wi = frame.to_local(wi);
        let wo = frame.to_local(wo);
        let cos_o = wo.z.abs();
        if cos_o < COS_EPSILON {
            return Color::ZERO;
        }

        let is_reflection = wi.z * wo.z > 0.0;
        let etap = if is_reflection { 1.0 } else { record.eta };
        let Some(wm) = Self::half_vector(wi, wo, etap) else {
            return Color::ZERO;
        };

        let selection = Self::selection(record, is_reflection);
        let dg = self.ggx.d(wm) * self.ggx.g(wo, wi);

        let value = if is_reflection {
            selection * dg / (4.0 * cos_i * cos_o)
        } else {
            let denom = (wi.dot(wm) + wo.dot(wm) / etap).powi(2) * cos_i * cos_o;
            if denom == 0.0 {
                return Color::ZERO;
            }
            selection * dg * (wi.dot(wm) * wo.dot(wm) / denom).abs() / (etap * etap)
        };
        Color::splat(value)
    }
}

//! Anisotropic GGX microfacet distribution and Fresnel terms.
//!
//! All directions are in the local shading frame (+z is the normal).

use std::f32::consts::PI;

use glam::Vec2;
use umbra_math::{Color, Vec3};

use crate::sampling::uniform_disk_polar;

#[inline]
fn cos2_theta(w: Vec3) -> f32 {
    w.z * w.z
}

#[inline]
fn sin2_theta(w: Vec3) -> f32 {
    (1.0 - cos2_theta(w)).max(0.0)
}

#[inline]
fn tan2_theta(w: Vec3) -> f32 {
    sin2_theta(w) / cos2_theta(w)
}

#[inline]
fn cos_phi(w: Vec3) -> f32 {
    let sin_theta = sin2_theta(w).sqrt();
    if sin_theta == 0.0 {
        1.0
    } else {
        (w.x / sin_theta).clamp(-1.0, 1.0)
    }
}

#[inline]
fn sin_phi(w: Vec3) -> f32 {
    let sin_theta = sin2_theta(w).sqrt();
    if sin_theta == 0.0 {
        0.0
    } else {
        (w.y / sin_theta).clamp(-1.0, 1.0)
    }
}

/// Trowbridge-Reitz (GGX) distribution with separate roughness along x and y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ggx {
    pub alpha_x: f32,
    pub alpha_y: f32,
}

impl Ggx {
    pub fn new(alpha_x: f32, alpha_y: f32) -> Self {
        Self { alpha_x, alpha_y }
    }

    pub fn max_alpha(&self) -> f32 {
        self.alpha_x.max(self.alpha_y)
    }

    /// Microfacet normal density D(wm).
    pub fn d(&self, wm: Vec3) -> f32 {
        let tan2 = tan2_theta(wm);
        if !tan2.is_finite() {
            return 0.0;
        }
        let cos4 = cos2_theta(wm) * cos2_theta(wm);
        if cos4 < 1e-16 {
            return 0.0;
        }
        let e = tan2
            * ((cos_phi(wm) / self.alpha_x).powi(2) + (sin_phi(wm) / self.alpha_y).powi(2));
        1.0 / (PI * self.alpha_x * self.alpha_y * cos4 * (1.0 + e) * (1.0 + e))
    }

    /// Smith auxiliary function.
    pub fn lambda(&self, w: Vec3) -> f32 {
        let tan2 = tan2_theta(w);
        if !tan2.is_finite() {
            return 0.0;
        }
        let alpha2 = (self.alpha_x * cos_phi(w)).powi(2) + (self.alpha_y * sin_phi(w)).powi(2);
        ((1.0 + alpha2 * tan2).sqrt() - 1.0) / 2.0
    }

    /// Masking function G1.
    pub fn g1(&self, w: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Height-correlated masking-shadowing G.
    pub fn g(&self, wo: Vec3, wi: Vec3) -> f32 {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Distribution of normals visible from `w`; the density of
    /// [`Ggx::sample_wm`].
    pub fn d_visible(&self, w: Vec3, wm: Vec3) -> f32 {
        let cos_theta = w.z.abs();
        if cos_theta < 1e-8 {
            return 0.0;
        }
        self.g1(w) / cos_theta * self.d(wm) * w.dot(wm).abs()
    }

    /// Sample a visible microfacet normal from direction `w` using the
    /// polar mapping of the projected hemisphere.
    pub fn sample_wm(&self, w: Vec3, u: Vec2) -> Vec3 {
        let mut wh = Vec3::new(self.alpha_x * w.x, self.alpha_y * w.y, w.z).normalize();
        if wh.z < 0.0 {
            wh = -wh;
        }

        let t1 = if wh.z < 0.99999 {
            Vec3::Z.cross(wh).normalize()
        } else {
            Vec3::X
        };
        let t2 = wh.cross(t1);

        let mut p = uniform_disk_polar(u);
        let h = (1.0 - p.x * p.x).max(0.0).sqrt();
        let s = (1.0 + wh.z) / 2.0;
        p.y = (1.0 - s) * h + s * p.y;

        let pz = (1.0 - p.length_squared()).max(0.0).sqrt();
        let nh = p.x * t1 + p.y * t2 + pz * wh;

        Vec3::new(self.alpha_x * nh.x, self.alpha_y * nh.y, nh.z.max(1e-6)).normalize()
    }
}

/// Mirror `wo` about `n`.
#[inline]
pub fn reflect(wo: Vec3, n: Vec3) -> Vec3 {
    -wo + 2.0 * wo.dot(n) * n
}

/// Refract `wi` through the interface with normal `n` and relative index
/// `eta = n_t / n_i`. Handles `wi` on either side of `n`; returns the
/// transmitted direction and the index actually used, or `None` on total
/// internal reflection.
pub fn refract(wi: Vec3, n: Vec3, eta: f32) -> Option<(Vec3, f32)> {
    let mut cos_i = n.dot(wi);
    let mut eta = eta;
    let mut n = n;
    if cos_i < 0.0 {
        eta = 1.0 / eta;
        cos_i = -cos_i;
        n = -n;
    }

    let sin2_i = (1.0 - cos_i * cos_i).max(0.0);
    let sin2_t = sin2_i / (eta * eta);
    if sin2_t >= 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin2_t).sqrt();
    Some((-wi / eta + (cos_i / eta - cos_t) * n, eta))
}

/// Unpolarised Fresnel reflectance of a dielectric interface.
/// `eta = n_t / n_i`; a negative `cos_i` means the ray arrives from inside.
pub fn fresnel_dielectric(cos_i: f32, eta: f32) -> f32 {
    let mut cos_i = cos_i.clamp(-1.0, 1.0);
    let mut eta = eta;
    if cos_i < 0.0 {
        eta = 1.0 / eta;
        cos_i = -cos_i;
    }

    let sin2_i = 1.0 - cos_i * cos_i;
    let sin2_t = sin2_i / (eta * eta);
    if sin2_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin2_t).max(1e-16).sqrt();

    let r_parl = (eta * cos_i - cos_t) / (eta * cos_i + cos_t);
    let r_perp = (cos_i - eta * cos_t) / (cos_i + eta * cos_t);
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Schlick's approximation with per-channel normal-incidence reflectance.
#[inline]
pub fn fresnel_schlick(cos_theta: f32, f0: Color) -> Color {
    let m = (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5);
    f0 + (Color::ONE - f0) * m
}

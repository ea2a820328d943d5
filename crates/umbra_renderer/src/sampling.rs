//! Random number helpers and warps from the unit square.
//!
//! Everything takes `&mut dyn RngCore` so materials, shapes and the camera
//! can share one per-pixel generator without generics leaking into traits.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, RngCore};
use umbra_math::Vec3;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Two independent uniforms in [0, 1).
#[inline]
pub fn gen_vec2(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(gen_f32(rng), gen_f32(rng))
}

/// Uniform direction on the unit sphere.
pub fn uniform_sphere(u: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TAU * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction on the +z hemisphere; pdf `1 / 2pi`.
pub fn uniform_hemisphere(u: Vec2) -> Vec3 {
    let z = u.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TAU * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_hemisphere_pdf() -> f32 {
    0.5 / PI
}

/// Uniform point in the unit disk, polar mapping.
pub fn uniform_disk_polar(u: Vec2) -> Vec2 {
    let r = u.x.sqrt();
    let theta = TAU * u.y;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Uniform point in the unit disk, concentric mapping (less distortion).
pub fn uniform_disk_concentric(u: Vec2) -> Vec2 {
    let offset = 2.0 * u - Vec2::ONE;
    if offset.x == 0.0 && offset.y == 0.0 {
        return Vec2::ZERO;
    }

    let (r, theta) = if offset.x.abs() > offset.y.abs() {
        (offset.x, (PI / 4.0) * (offset.y / offset.x))
    } else {
        (offset.y, PI / 2.0 - (PI / 4.0) * (offset.x / offset.y))
    };

    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Cosine-weighted direction on the +z hemisphere.
pub fn cosine_hemisphere(u: Vec2) -> Vec3 {
    let d = uniform_disk_concentric(u);
    let z = (1.0 - d.length_squared()).max(0.0).sqrt();
    Vec3::new(d.x, d.y, z)
}

#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: f32) -> f32 {
    cos_theta.max(0.0) / PI
}

/// Balance heuristic weight of strategy `a` against `b`.
#[inline]
pub fn balance_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let sum = pdf_a + pdf_b;
    if sum > 0.0 {
        pdf_a / sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_warps_stay_on_domain() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let u = gen_vec2(&mut rng);

            assert!((uniform_sphere(u).length() - 1.0).abs() < 1e-4);
            assert!(uniform_hemisphere(u).z >= 0.0);
            assert!(uniform_disk_polar(u).length() <= 1.0 + 1e-5);
            assert!(uniform_disk_concentric(u).length() <= 1.0 + 1e-5);

            let w = cosine_hemisphere(u);
            assert!(w.z >= 0.0);
            assert!((w.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cosine_hemisphere_mean_z() {
        // E[cos] under the cos/pi density is 2/3.
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mean: f32 = (0..n)
            .map(|_| cosine_hemisphere(gen_vec2(&mut rng)).z)
            .sum::<f32>()
            / n as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean cos {}", mean);
    }

    #[test]
    fn test_uniform_hemisphere_integrates_cosine() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let integral: f32 = (0..n)
            .map(|_| uniform_hemisphere(gen_vec2(&mut rng)).z / uniform_hemisphere_pdf())
            .sum::<f32>()
            / n as f32;
        assert!((integral - PI).abs() < 0.05, "cosine integral {}", integral);
    }

    #[test]
    fn test_balance_heuristic() {
        assert_eq!(balance_heuristic(1.0, 3.0), 0.25);
        assert_eq!(balance_heuristic(0.0, 0.0), 0.0);
        assert!((balance_heuristic(2.0, 5.0) + balance_heuristic(5.0, 2.0) - 1.0).abs() < 1e-6);
    }
}

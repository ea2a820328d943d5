//! Statistical checks on the path tracing estimator.
//!
//! A floor lit by a unit square emitter one unit above it. For a diffuse
//! floor the radiance reflected from the point right below the emitter's
//! centre is albedo * F, where F is the point-to-square form factor. Rough
//! metal floors have no closed form, so their estimators are compared.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;
use umbra_renderer::{ray_color, Color, Material, Primitive, Quad, Ray, RenderConfig, Scene, Vec3};

const ALBEDO: f32 = 0.5;

/// Form factor from a point to a square of half-width 0.5 at height 1,
/// centred above it: four corner rectangles with X = Y = 0.5.
fn form_factor() -> f32 {
    let x: f32 = 0.5;
    let s = (1.0 + x * x).sqrt();
    let corner = (2.0 * (x / s) * (x / s).atan()) / (2.0 * PI);
    4.0 * corner
}

fn floor_and_light() -> Scene {
    lit_floor(
        Material::lambertian(Color::splat(ALBEDO)),
        Vec3::new(100.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 100.0),
    )
}

/// A 100x100 floor spanned by edges `u` and `v`, whose order sets the
/// geometric normal, under the unit square emitter.
fn lit_floor(floor: Material, u: Vec3, v: Vec3) -> Scene {
    let mut scene = Scene::new();
    let floor = scene.add_material(floor);
    let light = scene.add_material(Material::emissive(Color::ONE));

    scene
        .add(Primitive::new(Quad::new(Vec3::new(-50.0, 0.0, -50.0), u, v), floor))
        .unwrap();
    scene
        .add(Primitive::new(
            Quad::new(Vec3::new(-0.5, 1.0, -0.5), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            light,
        ))
        .unwrap();
    scene.build_bvh();
    scene
}

fn rough_metal() -> Material {
    Material::conductor(Color::ONE, 0.3, 0.3, 1.0)
}

fn estimate(scene: &Scene, config: &RenderConfig, samples: u32, seed: u64) -> f32 {
    // Grazing view onto the floor point at the origin.
    let ray = Ray::new_simple(Vec3::new(-3.0, 0.5, 0.0), Vec3::new(3.0, -0.5, 0.0));
    estimate_along(&ray, scene, config, samples, seed)
}

fn estimate_along(ray: &Ray, scene: &Scene, config: &RenderConfig, samples: u32, seed: u64) -> f32 {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut sum = 0.0f64;
    for _ in 0..samples {
        sum += ray_color(ray, scene, config, &mut rng).x as f64;
    }
    (sum / samples as f64) as f32
}

/// 45 degree view onto the floor point at the origin.
fn oblique_view() -> Ray {
    Ray::new_simple(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0))
}

fn assert_close(estimate: f32, expected: f32, tolerance: f32, what: &str) {
    let relative = (estimate - expected).abs() / expected;
    assert!(
        relative < tolerance,
        "{}: estimate {} vs expected {} ({:.2}% off)",
        what,
        estimate,
        expected,
        100.0 * relative
    );
}

#[test]
fn closed_form_sanity() {
    assert!((ALBEDO * form_factor() - 0.1197).abs() < 1e-3);
}

#[test]
fn mis_converges_to_closed_form() {
    let scene = floor_and_light();
    let expected = ALBEDO * form_factor();
    let config = RenderConfig {
        roulette: 1.0,
        ..RenderConfig::default()
    };
    assert_close(estimate(&scene, &config, 40_000, 1), expected, 0.04, "nee + mis");
}

#[test]
fn bsdf_sampling_alone_converges_to_closed_form() {
    let scene = floor_and_light();
    let expected = ALBEDO * form_factor();
    let config = RenderConfig {
        roulette: 1.0,
        light_sampling: false,
        ..RenderConfig::default()
    };
    assert_close(estimate(&scene, &config, 40_000, 2), expected, 0.04, "bsdf only");
}

#[test]
fn roulette_is_unbiased() {
    let scene = floor_and_light();
    let expected = ALBEDO * form_factor();

    let always = RenderConfig {
        roulette: 1.0,
        max_radiance: 1000.0,
        ..RenderConfig::default()
    };
    let half = RenderConfig {
        roulette: 0.5,
        ..always.clone()
    };

    let full = estimate(&scene, &always, 80_000, 3);
    let culled = estimate(&scene, &half, 80_000, 4);
    assert_close(full, expected, 0.05, "roulette 1.0");
    assert_close(culled, expected, 0.05, "roulette 0.5");
}

#[test]
fn dark_scene_stays_dark() {
    let mut scene = Scene::new();
    let floor = scene.add_material(Material::lambertian(Color::splat(0.9)));
    scene
        .add(Primitive::new(
            Quad::new(Vec3::new(-5.0, 0.0, -5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0)),
            floor,
        ))
        .unwrap();

    let config = RenderConfig::default();
    assert_eq!(estimate(&scene, &config, 256, 5), 0.0);
}

#[test]
fn rough_conductor_ignores_quad_winding() {
    let x = Vec3::new(100.0, 0.0, 0.0);
    let z = Vec3::new(0.0, 0.0, 100.0);
    let up = lit_floor(rough_metal(), z, x);
    let down = lit_floor(rough_metal(), x, z);
    let config = RenderConfig {
        roulette: 1.0,
        ..RenderConfig::default()
    };

    let a = estimate_along(&oblique_view(), &up, &config, 20_000, 6);
    let b = estimate_along(&oblique_view(), &down, &config, 20_000, 6);
    assert!(a > 0.05, "metal floor seen from above is lit: {}", a);
    assert_close(b, a, 0.01, "flipped winding");
}

#[test]
fn rough_conductor_light_sampling_matches_bsdf_sampling() {
    let scene = lit_floor(rough_metal(), Vec3::new(0.0, 0.0, 100.0), Vec3::new(100.0, 0.0, 0.0));
    let mis = RenderConfig {
        roulette: 1.0,
        max_radiance: 1000.0,
        ..RenderConfig::default()
    };
    let bsdf = RenderConfig {
        light_sampling: false,
        ..mis.clone()
    };

    let with_nee = estimate_along(&oblique_view(), &scene, &mis, 200_000, 7);
    let without_nee = estimate_along(&oblique_view(), &scene, &bsdf, 200_000, 8);
    assert_close(with_nee, without_nee, 0.03, "rough conductor nee + mis");
}

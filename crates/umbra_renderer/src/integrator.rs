//! Unidirectional path tracing estimator.
//!
//! Walks one camera path iteratively, combining BSDF sampling with next
//! event estimation through the balance heuristic, and ends paths with
//! Russian roulette or at `max_depth`.

use rand::RngCore;
use umbra_math::{Color, Interval, Ray};

use crate::renderer::RenderConfig;
use crate::sampling::{balance_heuristic, gen_f32};
use crate::scene::Scene;

/// Closest accepted hit distance; keeps secondary rays off their origin surface.
pub const T_MIN: f32 = 1e-4;

/// Relative distance tolerance when deciding a shadow ray reached the light.
pub const SHADOW_TOLERANCE: f32 = 1e-3;

/// Densities below this end the path.
const PDF_EPSILON: f32 = 1e-8;

/// Radiance carried back along `ray`.
pub fn ray_color(ray: &Ray, scene: &Scene, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    // BSDF density of the previous bounce, set when that bounce also did NEE.
    let mut nee_bsdf_pdf: Option<f32> = None;

    for _ in 0..config.max_depth {
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            radiance += throughput * config.background;
            break;
        };

        let material = scene.material(rec.material);
        let Some(record) = material.scatter(&ray, &rec, rng) else {
            let emitted = material.emission(rec.u, rec.v, rec.p);
            let weight = match nee_bsdf_pdf {
                Some(pdf_bsdf) => balance_heuristic(pdf_bsdf, scene.light_pdf(ray.origin(), &rec)),
                None => 1.0,
            };
            radiance += throughput * emitted * weight;
            break;
        };

        if gen_f32(rng) >= config.roulette {
            break;
        }
        throughput /= config.roulette;

        let wo = -ray.direction().normalize();
        let normal = rec.normal;

        let do_nee = config.light_sampling && !material.glossy() && scene.has_lights();
        if do_nee {
            if let Some(light) = scene.sample_light(ray.time(), rng) {
                let to_light = light.point - rec.p;
                let dist = to_light.length();
                if dist > 0.0 {
                    let wi = to_light / dist;
                    let cos_light = light.normal.dot(wi).abs();
                    let f = material.response(wi, wo, normal, &record);

                    if cos_light > PDF_EPSILON && f != Color::ZERO {
                        let shadow = ray.spawn(rec.p, wi);
                        let reach = Interval::new(T_MIN, dist * (1.0 + SHADOW_TOLERANCE));

                        if let Some(probe) = scene.hit(&shadow, reach) {
                            if (dist - probe.t).abs() <= SHADOW_TOLERANCE * dist {
                                let le = scene.material(probe.material).emission(probe.u, probe.v, probe.p);
                                let pdf_light = light.pdf_area * dist * dist / cos_light;
                                let pdf_bsdf = material.pdf(wi, wo, normal, &record);
                                let w_light = balance_heuristic(pdf_light, pdf_bsdf);
                                radiance += throughput * f * le * wi.dot(normal).abs() / pdf_light * w_light;
                            }
                        }
                    }
                }
            }
        }

        let wi = record.ray.direction().normalize();
        let pdf = material.pdf(wi, wo, normal, &record);
        if pdf < PDF_EPSILON {
            break;
        }
        let f = material.response(wi, wo, normal, &record);
        throughput *= f * wi.dot(normal).abs() / pdf;
        if throughput == Color::ZERO {
            break;
        }

        nee_bsdf_pdf = do_nee.then_some(pdf);
        ray = record.ray;
    }

    if !radiance.is_finite() {
        return Color::ZERO;
    }
    radiance.clamp(Color::ZERO, Color::splat(config.max_radiance))
}

//! Umbra - CPU Monte Carlo path tracer.
//!
//! Spheres and quads indexed by a BVH, a closed family of physically based
//! materials (diffuse, GGX conductor, dielectric, emitter) and an iterative
//! integrator with next event estimation, multiple importance sampling and
//! Russian roulette.

mod bucket;
mod bvh;
mod camera;
mod frame;
mod hittable;
mod integrator;
mod material;
mod microfacet;
mod primitive;
mod quad;
mod renderer;
mod sampling;
mod scene;
mod sphere;

pub use bucket::{generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode};
pub use camera::Camera;
pub use frame::Frame;
pub use hittable::{HitRecord, Hittable, MaterialId, PrimitiveId, ShapeSample, SurfaceHit};
pub use integrator::{ray_color, SHADOW_TOLERANCE, T_MIN};
pub use material::{
    Conductor, Dielectric, Emissive, Lambertian, Material, ScatterKind, ScatterRecord, DEFAULT_SELECTION_CLAMP,
    DIELECTRIC_F0, GLOSSY_ALPHA, MIRROR_ALPHA,
};
pub use microfacet::{fresnel_dielectric, fresnel_schlick, reflect, refract, Ggx};
pub use primitive::{Primitive, Shape};
pub use quad::{make_box, Quad};
pub use renderer::{
    color_to_rgba, linear_to_gamma, pixel_rng, render, render_pixel, ConfigError, ImageBuffer, RenderConfig,
};
pub use sampling::{
    balance_heuristic, cosine_hemisphere, cosine_hemisphere_pdf, gen_f32, gen_vec2, uniform_disk_concentric,
    uniform_disk_polar, uniform_hemisphere, uniform_hemisphere_pdf, uniform_sphere,
};
pub use scene::{LightSample, Scene, SceneError};
pub use sphere::Sphere;

/// Re-export math and texture types so scenes need only this crate
pub use umbra_core::{ImageTexture, Perlin, Texture, TextureCache};
pub use umbra_math::{rotate_y, translate, Aabb, Color, Interval, Mat4, Ray, Vec3};

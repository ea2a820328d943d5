//! Camera for ray generation.

use rand::RngCore;
use umbra_math::{Ray, Vec3};

use crate::sampling::{gen_f32, gen_vec2, uniform_disk_concentric};

/// Pinhole or thin-lens camera with a shutter open over time [0, 1).
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,          // Vertical field of view in degrees
    defocus_angle: f32, // Variation angle of rays through each pixel
    focus_dist: f32,    // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Keep the width and derive the height from an aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        let height = (self.image_width as f32 / aspect_ratio) as u32;
        self.image_height = height.max(1);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Image rows run top to bottom
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;
    }

    /// Ray through pixel (i, j) for sample `sample_index` of `spp`.
    ///
    /// The first `n * n` samples (n = floor(sqrt(spp))) each jitter inside
    /// their own cell of an n x n grid over the pixel; any remainder is
    /// uniform over the whole pixel.
    pub fn get_ray(&self, i: u32, j: u32, sample_index: u32, spp: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = stratified_offset(sample_index, spp, rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = uniform_disk_concentric(gen_vec2(rng));
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sub-pixel offset in [-0.5, 0.5)^2.
fn stratified_offset(sample_index: u32, spp: u32, rng: &mut dyn RngCore) -> Vec3 {
    let n = (spp as f32).sqrt() as u32;
    if n == 0 || sample_index >= n * n {
        return Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0);
    }

    let cell = 1.0 / n as f32;
    let sx = (sample_index % n) as f32;
    let sy = (sample_index / n) as f32;
    Vec3::new(
        (sx + gen_f32(rng)) * cell - 0.5,
        (sy + gen_f32(rng)) * cell - 0.5,
        0.0,
    )
}

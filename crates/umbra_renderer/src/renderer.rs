//! Render configuration, per-pixel sampling and the framebuffer.
//!
//! Implements:
//! - Stratified multi-sampling with a per-pixel seeded RNG
//! - Gamma correction and 8-bit quantisation
//! - PPM and PNG output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_math::Color;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::camera::Camera;
use crate::integrator::ray_color;
use crate::scene::Scene;

/// Errors from loading a render configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid render config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance of rays that leave the scene
    pub background: Color,
    /// Russian roulette continuation probability
    pub roulette: f32,
    /// Per-path radiance ceiling
    pub max_radiance: f32,
    /// Next event estimation on non-glossy surfaces
    pub light_sampling: bool,
    /// Base seed; each pixel derives its own stream from it
    pub seed: u64,
    /// Bucket edge length for parallel rendering
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_depth: 32,
            background: Color::ZERO,
            roulette: 0.8,
            max_radiance: 5.0,
            light_sampling: true,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded render config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Gamma-encode and quantise one channel to 0..=255.
#[inline]
fn quantize(linear: f32) -> u8 {
    (256.0 * linear_to_gamma(linear).clamp(0.0, 0.999)) as u8
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// Deterministic RNG for pixel (x, y).
pub fn pixel_rng(config: &RenderConfig, width: u32, x: u32, y: u32) -> StdRng {
    let index = y as u64 * width as u64 + x as u64;
    StdRng::seed_from_u64(config.seed.wrapping_add(index))
}

/// Render a single pixel with stratified multi-sampling.
pub fn render_pixel(camera: &Camera, scene: &Scene, x: u32, y: u32, config: &RenderConfig) -> Color {
    let spp = config.samples_per_pixel.max(1);
    let mut rng = pixel_rng(config, camera.image_width, x, y);
    let mut pixel_color = Color::ZERO;

    for sample in 0..spp {
        let ray = camera.get_ray(x, y, sample, spp, &mut rng);
        pixel_color += ray_color(&ray, scene, config, &mut rng);
    }

    pixel_color / spp as f32
}

/// Linear RGB framebuffer, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Plain-text PPM: header, then one `r g b` line per pixel.
    pub fn write_ppm<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "P3\n{} {}\n255\n", self.width, self.height)?;
        for color in &self.pixels {
            let [r, g, b, _] = color_to_rgba(*color);
            writeln!(writer, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    pub fn save_ppm(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut writer)?;
        writer.flush()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let rgba = image::RgbaImage::from_raw(self.width, self.height, self.to_rgba()).ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;
        rgba.save(path)
    }
}

/// Render the entire scene on the calling thread.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            image.set(x, y, render_pixel(camera, scene, x, y, config));
        }
    }

    image
}

//! Textures evaluated at a surface point.
//!
//! A texture maps surface coordinates `(u, v)` and the world-space hit point
//! `p` to a linear RGB colour. Materials hold textures behind `Arc` so one
//! texture can be shared by several materials.

use std::sync::Arc;

use thiserror::Error;
use umbra_math::{Color, Vec3};

use crate::image_texture::ImageTexture;
use crate::perlin::Perlin;

/// Errors that can occur while loading image textures.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture not found in any search path: {0}")]
    NotFound(String),

    #[error("Texture has no pixels: {0}")]
    EmptyImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Octaves summed by the marble-like noise texture.
pub const NOISE_TURBULENCE_DEPTH: u32 = 7;

#[derive(Clone, Debug)]
pub enum Texture {
    /// Constant colour.
    Solid(Color),

    /// 3-D checkerboard alternating between two textures in cells of
    /// edge length `1 / inv_scale`.
    Checker {
        inv_scale: f32,
        even: Arc<Texture>,
        odd: Arc<Texture>,
    },

    /// Lookup into a decoded image by `(u, v)`.
    Image(Arc<ImageTexture>),

    /// Marble pattern from Perlin turbulence.
    Noise { scale: f32, perlin: Arc<Perlin> },
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    pub fn checker(scale: f32, even: Texture, odd: Texture) -> Self {
        Texture::Checker {
            inv_scale: 1.0 / scale,
            even: Arc::new(even),
            odd: Arc::new(odd),
        }
    }

    /// Checkerboard of two solid colours.
    pub fn checker_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::checker(scale, Texture::Solid(even), Texture::Solid(odd))
    }

    /// Image texture found through the usual search paths; cyan if missing.
    pub fn image(name: &str) -> Self {
        Texture::Image(Arc::new(ImageTexture::open(name)))
    }

    pub fn noise(scale: f32, perlin: Perlin) -> Self {
        Texture::Noise {
            scale,
            perlin: Arc::new(perlin),
        }
    }

    /// Colour at surface coordinates `(u, v)` and point `p`.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let cell = (p * *inv_scale).floor();
                let parity = (cell.x as i64 + cell.y as i64 + cell.z as i64).rem_euclid(2);
                if parity == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Texture::Image(image) => image.sample(u, v),
            Texture::Noise { scale, perlin } => {
                let phase = scale * p.z + 10.0 * perlin.turbulence(p, NOISE_TURBULENCE_DEPTH);
                Color::splat(0.5 * (1.0 + phase.sin()))
            }
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Texture::Solid(Color::splat(0.5))
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_ignores_coordinates() {
        let tex = Texture::solid(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.1, 0.9, Vec3::new(5.0, -3.0, 2.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates_across_cells() {
        let white = Color::ONE;
        let black = Color::ZERO;
        let tex = Texture::checker_colors(0.5, white, black);

        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.1, 0.1, 0.1)), white);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.6, 0.1, 0.1)), black);
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(0.6, 0.6, 0.1)), white);
        // Negative side continues the pattern instead of mirroring it.
        assert_eq!(tex.value(0.0, 0.0, Vec3::new(-0.1, 0.1, 0.1)), black);
    }

    #[test]
    fn test_missing_image_texture_is_cyan() {
        let tex = Texture::image("no-such-image-for-tests.jpg");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let tex = Texture::noise(4.0, Perlin::new(&mut StdRng::seed_from_u64(42)));
        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, i as f32 * 0.23);
            let c = tex.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }
}

//! Image textures and the cache that finds and loads them.
//!
//! Pixels are decoded once through the `image` crate and stored as linear
//! RGB floats. A lookup on an image that failed to load returns cyan so the
//! surface is easy to spot in a render.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use umbra_math::{Color, Interval};

use crate::texture::{TextureError, TextureResult};

/// Environment variable naming an extra directory to search for images.
pub const TEXTURE_IMAGES_ENV: &str = "TEXTURE_IMAGES";

/// Colour returned by lookups on an image without pixel data.
pub const MISSING_IMAGE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Decoded image in linear RGB, row-major with row 0 at the top.
#[derive(Clone, Debug, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    path: String,
}

impl ImageTexture {
    /// Create an image from linear pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// An image with no pixels; every lookup yields [`MISSING_IMAGE_COLOR`].
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Decode the file at exactly `path`.
    pub fn load(path: &Path) -> TextureResult<Self> {
        let bytes = std::fs::read(path)?;
        let img = ::image::load_from_memory(&bytes)?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyImage(path.display().to_string()));
        }

        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        Ok(Self::new(width, height, pixels, path.to_string_lossy()))
    }

    /// Search the usual image locations for `name` and decode the first hit.
    ///
    /// Never fails: when nothing loads, a warning is logged and the returned
    /// image renders as cyan.
    pub fn open(name: &str) -> Self {
        match Self::load_from_search_paths(name) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Could not load image file '{}': {}", name, err);
                Self::missing(name)
            }
        }
    }

    /// Try each candidate from [`search_paths`] in order.
    pub fn load_from_search_paths(name: &str) -> TextureResult<Self> {
        let candidates = search_paths(name);
        let mut last_error = TextureError::NotFound(name.to_string());

        for candidate in &candidates {
            if !candidate.is_file() {
                continue;
            }
            match Self::load(candidate) {
                Ok(image) => {
                    log::debug!(
                        "Loaded image: {} ({}x{})",
                        candidate.display(),
                        image.width,
                        image.height
                    );
                    return Ok(image);
                }
                Err(err) => last_error = err,
            }
        }

        Err(last_error)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        !self.pixels.is_empty()
    }

    /// Nearest-pixel lookup. `u` and `v` are clamped to [0, 1]; `v = 1` is
    /// the top row.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if !self.is_loaded() {
            return MISSING_IMAGE_COLOR;
        }

        let u = Interval::UNIT.clamp(u);
        let v = 1.0 - Interval::UNIT.clamp(v);

        let i = (u * (self.width - 1) as f32) as u32;
        let j = (v * (self.height - 1) as f32) as u32;

        self.pixel(i, j)
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(MISSING_IMAGE_COLOR)
    }
}

/// Candidate locations for an image, in lookup order: the directory named by
/// `TEXTURE_IMAGES`, the name itself, `images/`, then `../images/`.
pub fn search_paths(name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(4);
    if let Ok(dir) = env::var(TEXTURE_IMAGES_ENV) {
        paths.push(Path::new(&dir).join(name));
    }
    paths.push(PathBuf::from(name));
    paths.push(Path::new("images").join(name));
    paths.push(Path::new("../images").join(name));
    paths
}

/// Cache of loaded images keyed by the name they were requested with.
#[derive(Default)]
pub struct TextureCache {
    images: HashMap<String, Arc<ImageTexture>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an image, reusing an earlier load of the same name.
    pub fn load(&mut self, name: &str) -> TextureResult<Arc<ImageTexture>> {
        if let Some(image) = self.images.get(name) {
            return Ok(image.clone());
        }

        let image = Arc::new(ImageTexture::load_from_search_paths(name)?);
        self.images.insert(name.to_string(), image.clone());
        Ok(image)
    }

    /// Like [`TextureCache::load`], but falls back to a cyan placeholder.
    pub fn load_or_missing(&mut self, name: &str) -> Arc<ImageTexture> {
        match self.load(name) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("Could not load image file '{}': {}", name, err);
                let image = Arc::new(ImageTexture::missing(name));
                self.images.insert(name.to_string(), image.clone());
                image
            }
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Convert an sRGB byte to a linear float.
pub fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> ImageTexture {
        // top-left red, top-right green, bottom-left blue, bottom-right white
        ImageTexture::new(
            2,
            2,
            vec![
                Color::new(1.0, 0.0, 0.0),
                Color::new(0.0, 1.0, 0.0),
                Color::new(0.0, 0.0, 1.0),
                Color::ONE,
            ],
            "<memory>",
        )
    }

    #[test]
    fn test_missing_image_is_cyan() {
        let image = ImageTexture::missing("nowhere.png");
        assert!(!image.is_loaded());
        assert_eq!(image.sample(0.3, 0.7), MISSING_IMAGE_COLOR);
    }

    #[test]
    fn test_open_unknown_file_falls_back() {
        let _ = env_logger::builder().is_test(true).try_init();
        let image = ImageTexture::open("definitely-not-a-real-image-7f3a.png");
        assert_eq!(image.sample(0.5, 0.5), Color::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_load_reports_io_and_decode_errors() {
        let missing = env::temp_dir().join("umbra-no-such-image-5c1e.png");
        assert!(matches!(ImageTexture::load(&missing), Err(TextureError::Io(_))));

        let garbage = env::temp_dir().join(format!("umbra-garbage-{}.png", std::process::id()));
        std::fs::write(&garbage, b"not an image at all").unwrap();
        let result = ImageTexture::load(&garbage);
        std::fs::remove_file(&garbage).unwrap();
        assert!(matches!(result, Err(TextureError::ImageError(_))));
    }

    #[test]
    fn test_sample_flips_v_and_clamps() {
        let image = two_by_two();

        assert_eq!(image.sample(0.0, 1.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(image.sample(1.0, 1.0), Color::new(0.0, 1.0, 0.0));
        assert_eq!(image.sample(0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        assert_eq!(image.sample(5.0, -3.0), Color::ONE);
    }

    #[test]
    fn test_search_path_order() {
        let paths = search_paths("earth.jpg");
        let n = paths.len();
        assert_eq!(paths[n - 3], PathBuf::from("earth.jpg"));
        assert_eq!(paths[n - 2], PathBuf::from("images/earth.jpg"));
        assert_eq!(paths[n - 1], PathBuf::from("../images/earth.jpg"));
    }

    #[test]
    fn test_cache_reuses_placeholder() {
        let mut cache = TextureCache::new();
        assert!(cache.is_empty());

        let a = cache.load_or_missing("missing-cache-test.png");
        let b = cache.load_or_missing("missing-cache-test.png");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(cache.load("another-missing-file.png").is_err());
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}

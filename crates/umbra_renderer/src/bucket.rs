//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon, then stitched into one framebuffer.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use umbra_math::Color;

use crate::camera::Camera;
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig};
use crate::scene::Scene;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket. Returns pixels in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, camera: &Camera, scene: &Scene, config: &RenderConfig) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(render_pixel(camera, scene, bucket.x + local_x, bucket.y + local_y, config));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket's pixels into the framebuffer.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let mut pixels = self.pixels.iter();
        for local_y in 0..self.bucket.height {
            for local_x in 0..self.bucket.width {
                if let Some(color) = pixels.next() {
                    image.set(self.bucket.x + local_x, self.bucket.y + local_y, *color);
                }
            }
        }
    }
}

/// Render every bucket on the rayon pool and assemble the framebuffer.
/// Output is identical to the serial [`render`](crate::renderer::render)
/// because each pixel seeds its own generator.
pub fn render_parallel(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    let total = buckets.len();
    let completed = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} @ {} spp in {} buckets",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        total
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let pixels = render_bucket(bucket, camera, scene, config);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {} done ({}/{})", bucket.index, done, total);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        result.write_into(&mut image);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_write_into_places_pixels() {
        let mut image = ImageBuffer::new(4, 4);
        let bucket = Bucket::new(2, 1, 2, 2, 0);
        let pixels = (0..4).map(|i| Color::splat(i as f32)).collect();
        BucketResult::new(bucket, pixels).write_into(&mut image);

        assert_eq!(image.get(2, 1), Color::splat(0.0));
        assert_eq!(image.get(3, 1), Color::splat(1.0));
        assert_eq!(image.get(2, 2), Color::splat(2.0));
        assert_eq!(image.get(3, 2), Color::splat(3.0));
        assert_eq!(image.get(0, 0), Color::ZERO);
    }
}

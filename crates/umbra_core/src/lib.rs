//! Umbra Core - textures and image assets for the path tracer.
//!
//! This crate provides:
//!
//! - **Texture**: solid, checker, image and Perlin-noise colour sources
//! - **ImageTexture / TextureCache**: image decode with search paths
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::Texture;
//! use umbra_math::{Color, Vec3};
//!
//! let floor = Texture::checker_colors(0.32, Color::splat(0.1), Color::splat(0.9));
//! let albedo = floor.value(0.0, 0.0, Vec3::new(1.0, 0.0, 2.0));
//! ```

pub mod image_texture;
pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use image_texture::{srgb_to_linear, ImageTexture, TextureCache};
pub use perlin::Perlin;
pub use texture::{Texture, TextureError, TextureResult};

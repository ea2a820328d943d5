//! Umbra math: vectors (re-exported from glam), intervals, rays,
//! bounding boxes, and affine helpers shared by the renderer crates.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::{Aabb, MIN_AXIS_WIDTH};
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{rotate_y, translate, Mat4Ext};

/// RGB color in linear space.
pub type Color = Vec3;

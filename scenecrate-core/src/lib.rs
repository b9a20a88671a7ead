//! Core data structures and traits for scenecrate
//!
//! This crate provides the math kernel, affine transforms, drawable primitives,
//! line rasterization and the cameras that map world space onto image space.

pub mod box_shape;
pub mod camera;
pub mod error;
pub mod math;
pub mod pixel;
pub mod primitive;
pub mod raster;
pub mod transform;

pub use box_shape::*;
pub use camera::*;
pub use error::*;
pub use math::*;
pub use pixel::*;
pub use primitive::*;
pub use raster::*;
pub use transform::*;

//! I/O operations for scenecrate
//!
//! This crate decodes ASCII PLY geometry into the polygon primitives drawn by
//! the scene graph, and writes polygons back out in the same subset.

pub mod error;
pub mod ply;

pub use error::*;
pub use ply::{
    parse_mesh, parse_polygons, read_polygons, read_polygons_file, write_polygons, write_polygons_file, PlyMesh,
    PlyReadOptions, PlyWriteOptions,
};

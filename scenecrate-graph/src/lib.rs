//! Scene graph, renderer and frame loop for scenecrate
//!
//! Nodes live in an arena keyed by [`NodeId`]. The [`Renderer`] walks the tree
//! from the root, composing each node's transform with its parent's, and lets
//! every primitive draw itself through a camera onto a pixel sink.

pub mod error;
pub mod graph;
pub mod input;
pub mod renderer;

pub use error::*;
pub use graph::*;
pub use input::*;
pub use renderer::*;

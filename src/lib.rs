//! # scenecrate
//!
//! A software-rendered 3D scene graph for teaching computer graphics.
//!
//! This is the umbrella crate that re-exports the workspace crates in one place.
//! Use the individual crates when you want finer control over dependencies.
//!
//! ## Features
//!
//! - **Core**: math kernel, transforms, primitives, rasterization and cameras
//! - **I/O**: ASCII PLY polygon parsing and writing
//! - **Graph**: the arena scene graph, the renderer driver and the frame loop
//!
//! ## Quick Start
//!
//! ```rust
//! use scenecrate::prelude::*;
//!
//! let mut graph = SceneGraph::new("root").unwrap();
//! let root = graph.root();
//! graph
//!     .add_primitive(root, Line::new(Vector3d::new(0.0, 0.0, 0.0), Vector3d::new(10.0, 0.0, 0.0)))
//!     .unwrap();
//!
//! let mut camera = OrthographicCamera::new(
//!     Vector3d::new(0.0, 0.0, 10.0),
//!     Vector3d::new(0.0, 1.0, 0.0),
//!     Vector3d::new(0.0, 0.0, 0.0),
//! );
//! let mut surface = Framebuffer::new(64, 64);
//!
//! let stats = Renderer::default().render(&graph, &mut camera, &mut surface).unwrap();
//! assert_eq!(stats.pixels, 11);
//! ```
//!
//! ## Errors
//!
//! Graph, PLY and camera errors all convert into [`Error`], so one `?` chain
//! can cross every layer:
//!
//! ```rust
//! use scenecrate::prelude::*;
//!
//! fn load(source: &str) -> scenecrate::Result<SceneGraph> {
//!     let mut graph = SceneGraph::new("world")?;
//!     let mesh = graph.create_child(graph.root(), "mesh")?;
//!     for polygon in parse_polygons(source, &PlyReadOptions::default())? {
//!         graph.add_primitive(mesh, polygon)?;
//!     }
//!     Ok(graph)
//! }
//!
//! assert!(matches!(load("ply\n"), Err(Error::Parse(_))));
//! assert!(matches!(SceneGraph::new("").map_err(Error::from), Err(Error::Graph(_))));
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io and graph
//! - `io`: PLY support
//! - `graph`: scene graph and renderer
//! - `all`: Enables all features

// Re-export core functionality
pub use scenecrate_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use scenecrate_io as io;

#[cfg(feature = "graph")]
pub use scenecrate_graph as graph;

/// Convenient imports for common use cases
pub mod prelude {
    pub use scenecrate_core::*;

    #[cfg(feature = "io")]
    pub use scenecrate_io::*;

    #[cfg(feature = "graph")]
    pub use scenecrate_graph::*;
}

//! One scene built from every layer, with their errors meeting in the core `Error`

use scenecrate_core::{
    Camera, Color, Error, Framebuffer, MathError, OrthographicCamera, Result, Transform, Vector3d,
};
use scenecrate_graph::*;
use scenecrate_io::{parse_polygons, PlyReadOptions};

const TRIANGLE: &str = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";

/// Build and render a one-mesh scene, mixing graph, parse and math errors
fn render_mesh(source: &str, camera: &mut dyn Camera, surface: &mut Framebuffer) -> Result<FrameStats> {
    let mut graph = SceneGraph::new("world")?;
    let root = graph.root();
    let mesh = graph.create_child(root, "mesh")?;
    graph.set_transform(mesh, Transform::uniform_scale(8.0))?;
    for polygon in parse_polygons(source, &PlyReadOptions::default())? {
        graph.add_primitive(mesh, polygon)?;
    }
    let stats = Renderer::default().render(&graph, camera, surface)?;
    Ok(stats)
}

fn front_ortho() -> OrthographicCamera {
    OrthographicCamera::new(
        Vector3d::new(0.0, 0.0, 10.0),
        Vector3d::new(0.0, 1.0, 0.0),
        Vector3d::new(0.0, 0.0, 0.0),
    )
}

#[test]
fn every_layer_feeds_one_frame() -> anyhow::Result<()> {
    let mut surface = Framebuffer::new(16, 16);
    let stats = render_mesh(TRIANGLE, &mut front_ortho(), &mut surface)?;

    assert_eq!(stats.nodes, 2);
    assert_eq!(stats.primitives, 1);
    for corner in [(0, 0), (8, 0), (0, 8)] {
        assert_eq!(surface.get(corner.0, corner.1), Some(Color::WHITE));
    }
    Ok(())
}

#[test]
fn layer_errors_share_one_type() {
    let mut surface = Framebuffer::new(16, 16);

    let truncated = TRIANGLE.replace("3 0 1 2\n", "");
    let err = render_mesh(&truncated, &mut front_ortho(), &mut surface).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));

    let binary = TRIANGLE.replace("ascii", "binary_little_endian");
    let err = render_mesh(&binary, &mut front_ortho(), &mut surface).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));

    let eye = Vector3d::new(0.0, 0.0, 10.0);
    let mut stuck = OrthographicCamera::new(eye, Vector3d::y(), eye);
    let err = render_mesh(TRIANGLE, &mut stuck, &mut surface).unwrap_err();
    assert!(matches!(err, Error::Math(MathError::DegenerateCamera(_))));

    let graph_err: Error = GraphError::EmptyLabel.into();
    assert!(graph_err.to_string().contains("empty"));
}

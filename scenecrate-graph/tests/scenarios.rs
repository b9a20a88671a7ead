//! End-to-end rendering tests for the scene graph
//!
//! These build small scenes, render them through the real cameras and check the
//! pixels (or projected points) that come out.

use std::cell::RefCell;

use approx::assert_relative_eq;
use scenecrate_core::{
    Camera, Color, Framebuffer, ImagePoint, Line, MathError, Matrix4d, OrthographicCamera, PerspectiveCamera,
    Pixel, PixelSink, Point2d, Transform, Vector3d,
};
use scenecrate_graph::*;

/// Identity projection that remembers every world-space point it was asked to project
struct RecordingCamera {
    projection: Matrix4d,
    seen: RefCell<Vec<Vector3d>>,
}

impl RecordingCamera {
    fn new() -> Self {
        Self {
            projection: Matrix4d::identity(),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<Vector3d> {
        self.seen.borrow().clone()
    }
}

impl Camera for RecordingCamera {
    fn update(&mut self) -> Result<(), MathError> {
        Ok(())
    }

    fn projection_matrix(&self) -> Option<&Matrix4d> {
        Some(&self.projection)
    }

    fn project(&self, point: &Vector3d) -> Result<ImagePoint, MathError> {
        self.seen.borrow_mut().push(*point);
        Ok(ImagePoint::new(point.x, point.y))
    }
}

/// Unbounded sink keeping the raw pixels
#[derive(Default)]
struct PixelLog {
    pixels: Vec<Pixel>,
}

impl PixelSink for PixelLog {
    fn put(&mut self, pixel: Pixel) {
        self.pixels.push(pixel);
    }

    fn width(&self) -> u32 {
        1024
    }

    fn height(&self) -> u32 {
        1024
    }

    fn clear(&mut self, _color: Color) {
        self.pixels.clear();
    }
}

fn v(x: f64, y: f64, z: f64) -> Vector3d {
    Vector3d::new(x, y, z)
}

fn front_ortho() -> OrthographicCamera {
    OrthographicCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0))
}

/// (label, parent label) for every node in pre-order
fn snapshot(graph: &SceneGraph) -> Vec<(String, Option<String>)> {
    let mut out = Vec::new();
    graph.accept(&mut |_: NodeId, node: &Node| {
        let parent = node.parent().and_then(|p| graph.label(p)).map(str::to_string);
        out.push((node.label().to_string(), parent));
    });
    out
}

#[test]
fn single_line_through_orthographic_camera() {
    let mut graph = SceneGraph::new("root").unwrap();
    let root = graph.root();
    graph.add_primitive(root, Line::new(v(0.0, 0.0, 0.0), v(10.0, 0.0, 0.0))).unwrap();

    let mut camera = front_ortho();
    let mut surface = Framebuffer::new(64, 64);
    let stats = Renderer::default().render(&graph, &mut camera, &mut surface).unwrap();

    let expected: Vec<(u32, u32)> = (0..=10).map(|x| (x, 0)).collect();
    assert_eq!(surface.lit_pixels(), expected);
    assert_eq!(stats, FrameStats { nodes: 1, primitives: 1, pixels: 11 });
}

#[test]
fn perspective_foreshortens_distant_lines() {
    let render_line = |z: f64| {
        let mut graph = SceneGraph::new("root").unwrap();
        let root = graph.root();
        graph.add_primitive(root, Line::new(v(0.0, 0.0, z), v(30.0, 0.0, z))).unwrap();

        let mut camera = PerspectiveCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), 10.0);
        let mut log = PixelLog::default();
        Renderer::default().render(&graph, &mut camera, &mut log).unwrap();

        let xs = log.pixels.iter().map(|p| p.x);
        let extent = xs.clone().fold(f64::MIN, f64::max) - xs.fold(f64::MAX, f64::min);
        (extent, log.pixels.len())
    };

    let (far_extent, far_pixels) = render_line(0.0);
    let (near_extent, near_pixels) = render_line(5.0);

    assert_relative_eq!(far_extent, 15.0, epsilon = 1e-9);
    assert_relative_eq!(near_extent, 20.0, epsilon = 1e-9);
    assert!(near_extent > far_extent);
    assert!(near_pixels > far_pixels);
}

#[test]
fn nested_translations_compose() {
    let mut graph = SceneGraph::new("root").unwrap();
    let root = graph.root();
    graph.set_transform(root, Transform::translate(1.0, 0.0, 0.0)).unwrap();
    let child = graph.create_child(root, "child").unwrap();
    graph.set_transform(child, Transform::translate(2.0, 0.0, 0.0)).unwrap();
    graph.add_primitive(child, Point2d::new(0.0, 0.0)).unwrap();

    let mut camera = RecordingCamera::new();
    let mut log = PixelLog::default();
    let stats = Renderer::default().render(&graph, &mut camera, &mut log).unwrap();

    assert_eq!(stats.nodes, 2);
    assert_eq!(camera.seen(), vec![v(3.0, 0.0, -1.0)]);
    assert_eq!(log.pixels.len(), 1);
}

#[test]
fn composed_matrix_is_child_first() {
    let mut graph = SceneGraph::new("a").unwrap();
    let a = graph.root();
    let b = graph.create_child(a, "b").unwrap();
    let c = graph.create_child(b, "c").unwrap();

    let ta = Transform::RotateZ(std::f64::consts::FRAC_PI_2);
    let tb = Transform::translate(4.0, -1.0, 2.0);
    let tc = Transform::scale(2.0, 3.0, 0.5);
    graph.set_transform(a, ta).unwrap();
    graph.set_transform(b, tb).unwrap();
    graph.set_transform(c, tc).unwrap();

    let expected = tc.matrix() * tb.matrix() * ta.matrix();
    assert_relative_eq!(graph.composed_matrix(c).unwrap(), expected, epsilon = 1e-12);

    // the renderer carries the same product down the stack
    graph.add_primitive(c, Point2d::new(1.0, 1.0)).unwrap();
    let mut camera = RecordingCamera::new();
    Renderer::default().render(&graph, &mut camera, &mut PixelLog::default()).unwrap();

    let want = (expected * v(1.0, 1.0, -1.0).push(1.0)).xyz();
    let seen = camera.seen();
    assert_eq!(seen.len(), 1);
    assert_relative_eq!(seen[0], want, epsilon = 1e-12);
}

#[test]
fn primitives_render_before_children_in_pre_order() {
    let mut graph = SceneGraph::new("root").unwrap();
    let root = graph.root();
    let a = graph.create_child(root, "a").unwrap();
    let a1 = graph.create_child(a, "a1").unwrap();
    let b = graph.create_child(root, "b").unwrap();

    // insertion order of primitives differs from tree order on purpose
    graph.add_primitive(b, Point2d::new(4.0, 0.0)).unwrap();
    graph.add_primitive(a1, Point2d::new(3.0, 0.0)).unwrap();
    graph.add_primitive(a, Point2d::new(1.0, 0.0)).unwrap();
    graph.add_primitive(a, Point2d::new(2.0, 0.0)).unwrap();
    graph.add_primitive(root, Point2d::new(0.0, 0.0)).unwrap();

    let mut camera = RecordingCamera::new();
    let stats = Renderer::default().render(&graph, &mut camera, &mut PixelLog::default()).unwrap();

    let order: Vec<f64> = camera.seen().iter().map(|p| p.x).collect();
    assert_eq!(order, [0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(stats, FrameStats { nodes: 4, primitives: 5, pixels: 5 });
}

#[test]
fn cycle_rejection_leaves_the_graph_unchanged() {
    let mut graph = SceneGraph::new("root").unwrap();
    let root = graph.root();
    let a = graph.create_child(root, "a").unwrap();
    let b = graph.create_child(a, "b").unwrap();

    let before = snapshot(&graph);
    let err = graph.add_child(b, root).unwrap_err();
    assert_eq!(err, GraphError::Cycle { parent: b, child: root });
    assert_eq!(snapshot(&graph), before);

    // any ancestor, not just the root
    assert!(matches!(graph.add_child(b, a), Err(GraphError::Cycle { .. })));
    assert_eq!(snapshot(&graph), before);
    assert_eq!(graph.node_count(), 3);
}

#[test]
fn detached_nodes_are_not_rendered() {
    let mut graph = SceneGraph::new("root").unwrap();
    let loose = graph.create_node("loose").unwrap();
    graph.add_primitive(loose, Point2d::new(1.0, 1.0)).unwrap();

    let mut camera = RecordingCamera::new();
    let stats = Renderer::default().render(&graph, &mut camera, &mut PixelLog::default()).unwrap();
    assert_eq!(stats.nodes, 1);
    assert!(camera.seen().is_empty());

    graph.add_child(graph.root(), loose).unwrap();
    let stats = Renderer::default().render(&graph, &mut camera, &mut PixelLog::default()).unwrap();
    assert_eq!(stats.pixels, 1);
}

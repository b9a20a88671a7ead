//! Drawable primitives
//!
//! A primitive receives the composed model-to-world matrix through a
//! [`RenderContext`], projects its points with the active [`Camera`] and writes
//! pixels to a [`PixelSink`]. Primitives never pre-clip: the sink drops anything
//! outside its bounds. Points that cannot be projected (a zero `w` during a
//! perspective divide) make the affected primitive emit fewer pixels instead of
//! failing the frame.

use std::fmt;

use tracing::trace;

use crate::camera::{Camera, ImagePoint};
use crate::math::{perspective_divide, transform_point, Matrix4d, Vector3d};
use crate::pixel::{Color, Pixel, PixelSink};
use crate::raster::plot_line;

/// Default upper bound on DDA steps for a single line
pub const DEFAULT_MAX_LINE_STEPS: usize = 1 << 16;

/// State handed down the traversal to every primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// The composed model-to-world matrix of the node being drawn
    pub transform: Matrix4d,
    /// Color imposed by an enclosing group, overriding the primitive's own color
    pub inherited_color: Option<Color>,
    /// Lines needing more DDA steps than this are skipped
    pub max_line_steps: usize,
}

impl RenderContext {
    pub fn new(transform: Matrix4d) -> Self {
        Self {
            transform,
            inherited_color: None,
            max_line_steps: DEFAULT_MAX_LINE_STEPS,
        }
    }

    /// A copy of this context with a group color imposed on everything below it
    pub fn with_color(&self, color: Color) -> Self {
        Self {
            inherited_color: Some(color),
            ..self.clone()
        }
    }

    pub fn with_max_line_steps(mut self, max_line_steps: usize) -> Self {
        self.max_line_steps = max_line_steps;
        self
    }

    /// The color a primitive whose own color is `own` should draw with
    pub fn color_for(&self, own: Color) -> Color {
        self.inherited_color.unwrap_or(own)
    }

    /// Map a model-space point to image space, `None` if it cannot be projected
    pub fn project(&self, camera: &dyn Camera, point: &Vector3d) -> Option<ImagePoint> {
        let projected = perspective_divide(&transform_point(&self.transform, point))
            .and_then(|world| camera.project(&world));
        match projected {
            Ok(p) => Some(p),
            Err(err) => {
                trace!(?point, %err, "dropping unprojectable point");
                None
            }
        }
    }

    /// Project and plot the segment `a -> b`
    fn draw_segment(&self, a: ImagePoint, b: ImagePoint, color: Color, sink: &mut dyn PixelSink) {
        match plot_line(a, b, self.max_line_steps) {
            Some(samples) => {
                for p in samples {
                    sink.put(Pixel::new(p.x, p.y, color));
                }
            }
            None => trace!(?a, ?b, "skipping degenerate or oversized line"),
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Matrix4d::identity())
    }
}

/// Anything that can be drawn by the renderer.
///
/// The set of primitives is open: implement this trait to plug in new shapes.
pub trait Primitive: fmt::Debug {
    /// Emit the pixels of this primitive for the given context and camera
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink);

    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);
}

impl<P: Primitive + ?Sized> Primitive for Box<P> {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        (**self).render(ctx, camera, sink)
    }

    fn color(&self) -> Color {
        (**self).color()
    }

    fn set_color(&mut self, color: Color) {
        (**self).set_color(color)
    }
}

/// A point in the plane `z = -1` of its node's model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

impl Point2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            color: Color::default(),
        }
    }

    /// The model-space position this point is drawn at
    pub fn position(&self) -> Vector3d {
        Vector3d::new(self.x, self.y, -1.0)
    }
}

impl Primitive for Point2d {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        if let Some(p) = ctx.project(camera, &self.position()) {
            sink.put(Pixel::new(p.x, p.y, ctx.color_for(self.color)));
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A straight segment between two model-space points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: Vector3d,
    pub b: Vector3d,
    pub color: Color,
}

impl Line {
    pub fn new(a: Vector3d, b: Vector3d) -> Self {
        Self {
            a,
            b,
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Primitive for Line {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        let (Some(a), Some(b)) = (ctx.project(camera, &self.a), ctx.project(camera, &self.b)) else {
            return;
        };
        ctx.draw_segment(a, b, ctx.color_for(self.color), sink);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A closed outline through the given vertices. No fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vector3d>,
    pub color: Color,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector3d>) -> Self {
        Self {
            vertices,
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The `n` edges `(v[i], v[(i + 1) % n])` of the outline
    pub fn edges(&self) -> impl Iterator<Item = (Vector3d, Vector3d)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl Primitive for Polygon {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        let n = self.vertices.len();
        if n == 0 {
            return;
        }
        let color = ctx.color_for(self.color);
        let projected: Vec<Option<ImagePoint>> = self
            .vertices
            .iter()
            .map(|v| ctx.project(camera, v))
            .collect();

        for i in 0..n {
            if let (Some(a), Some(b)) = (projected[i], projected[(i + 1) % n]) {
                ctx.draw_segment(a, b, color, sink);
            }
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// An ordered group of primitives drawn in insertion order with the group's color
#[derive(Debug, Default)]
pub struct CompositeShape {
    children: Vec<Box<dyn Primitive>>,
    pub color: Color,
}

impl CompositeShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn add(&mut self, primitive: impl Primitive + 'static) {
        self.children.push(Box::new(primitive));
    }

    pub fn push(&mut self, primitive: Box<dyn Primitive>) {
        self.children.push(primitive);
    }

    pub fn children(&self) -> &[Box<dyn Primitive>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }
}

impl Primitive for CompositeShape {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        let group_ctx = ctx.with_color(ctx.color_for(self.color));
        for child in &self.children {
            child.render(&group_ctx, camera, sink);
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

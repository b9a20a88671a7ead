//! Wireframe box

use crate::camera::Camera;
use crate::math::Vector3d;
use crate::pixel::{Color, PixelSink};
use crate::primitive::{CompositeShape, Line, Primitive, RenderContext};

/// An axis-aligned wireframe box.
///
/// The box spans `width` along +x and `height` along +y from `origin`, and
/// `depth` along -z. Its 12 edges are kept as a [`CompositeShape`] that is
/// rebuilt whenever the position or a dimension changes.
#[derive(Debug)]
pub struct BoxShape {
    origin: Vector3d,
    width: f64,
    height: f64,
    depth: f64,
    color: Color,
    edges: CompositeShape,
}

impl BoxShape {
    pub fn new(origin: Vector3d, width: f64, height: f64, depth: f64) -> Self {
        let mut shape = Self {
            origin,
            width,
            height,
            depth,
            color: Color::default(),
            edges: CompositeShape::new(),
        };
        shape.rebuild();
        shape
    }

    fn rebuild(&mut self) {
        let o = self.origin;
        let (w, h, d) = (self.width, self.height, self.depth);
        let corner = |dx: f64, dy: f64, dz: f64| Vector3d::new(o.x + dx, o.y + dy, o.z - dz);

        let edges = [
            // front face
            (corner(0.0, 0.0, 0.0), corner(w, 0.0, 0.0)),
            (corner(0.0, 0.0, 0.0), corner(0.0, h, 0.0)),
            (corner(0.0, h, 0.0), corner(w, h, 0.0)),
            (corner(w, 0.0, 0.0), corner(w, h, 0.0)),
            // connecting edges
            (corner(0.0, 0.0, 0.0), corner(0.0, 0.0, d)),
            (corner(0.0, h, 0.0), corner(0.0, h, d)),
            (corner(w, h, 0.0), corner(w, h, d)),
            (corner(w, 0.0, 0.0), corner(w, 0.0, d)),
            // back face
            (corner(0.0, 0.0, d), corner(w, 0.0, d)),
            (corner(0.0, 0.0, d), corner(0.0, h, d)),
            (corner(0.0, h, d), corner(w, h, d)),
            (corner(w, 0.0, d), corner(w, h, d)),
        ];

        self.edges.clear();
        for (a, b) in edges {
            self.edges.add(Line::new(a, b));
        }
    }

    pub fn origin(&self) -> Vector3d {
        self.origin
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// The 12 edge lines
    pub fn edges(&self) -> &CompositeShape {
        &self.edges
    }

    pub fn set_origin(&mut self, origin: Vector3d) {
        self.origin = origin;
        self.rebuild();
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.rebuild();
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.rebuild();
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
        self.rebuild();
    }
}

impl Primitive for BoxShape {
    fn render(&self, ctx: &RenderContext, camera: &dyn Camera, sink: &mut dyn PixelSink) {
        self.edges
            .render(&ctx.with_color(ctx.color_for(self.color)), camera, sink);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrthographicCamera;
    use crate::pixel::Framebuffer;

    #[test]
    fn box_has_twelve_edges_after_every_mutation() {
        let mut shape = BoxShape::new(Vector3d::zeros(), 1.0, 2.0, 3.0);
        assert_eq!(shape.edges().len(), 12);

        shape.set_width(4.0);
        shape.set_depth(1.0);
        shape.set_origin(Vector3d::new(1.0, 1.0, 1.0));
        assert_eq!(shape.edges().len(), 12);
        assert_eq!(shape.width(), 4.0);
    }

    #[test]
    fn front_view_draws_the_outline() {
        let mut camera = OrthographicCamera::new(
            Vector3d::new(0.0, 0.0, 10.0),
            Vector3d::new(0.0, 1.0, 0.0),
            Vector3d::zeros(),
        );
        camera.update().unwrap();

        let mut shape = BoxShape::new(Vector3d::new(1.0, 1.0, 0.0), 4.0, 3.0, 2.0);
        shape.set_color(Color::GREEN);

        let mut fb = Framebuffer::new(8, 8);
        shape.render(&RenderContext::default(), &camera, &mut fb);

        // front and back faces coincide under a parallel projection: a 5x4 ring of cells
        let lit = fb.lit_pixels();
        assert_eq!(lit.len(), 14);
        assert_eq!(fb.get(1, 1), Some(Color::GREEN));
        assert_eq!(fb.get(5, 4), Some(Color::GREEN));
        assert_eq!(fb.get(3, 2), Some(Color::TRANSPARENT));
    }
}

//! Frame rendering
//!
//! The renderer walks the graph in pre-order, carrying the composed matrix of
//! every pending node on an explicit stack, and lets each primitive draw itself
//! before the node's children are visited.

use scenecrate_core::{
    Camera, Color, Matrix4d, MathError, Pixel, PixelSink, RenderContext, DEFAULT_MAX_LINE_STEPS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::graph::{NodeId, SceneGraph};

/// Configuration for [`Renderer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Clear the sink with this color before drawing, or draw over whatever is there
    pub clear_color: Option<Color>,
    /// Lines needing more DDA steps than this are skipped
    pub max_line_steps: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: Some(Color::BLACK),
            max_line_steps: DEFAULT_MAX_LINE_STEPS,
        }
    }
}

/// What a single frame touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes reached from the root
    pub nodes: usize,
    /// Primitives asked to render, top-level only
    pub primitives: usize,
    /// Pixels handed to the sink, including those it dropped as out of bounds
    pub pixels: usize,
}

/// Wraps a sink and counts every pixel passing through it
struct CountingSink<'a> {
    inner: &'a mut dyn PixelSink,
    pixels: usize,
}

impl PixelSink for CountingSink<'_> {
    fn put(&mut self, pixel: Pixel) {
        self.pixels += 1;
        self.inner.put(pixel);
    }

    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn clear(&mut self, color: Color) {
        self.inner.clear(color);
    }
}

/// Draws a [`SceneGraph`] through a [`Camera`] onto a [`PixelSink`]
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one frame.
    ///
    /// The camera is updated first; if its frame is degenerate the error is
    /// returned before the sink is touched. Otherwise the graph is only read.
    pub fn render(
        &self,
        graph: &SceneGraph,
        camera: &mut dyn Camera,
        sink: &mut dyn PixelSink,
    ) -> Result<FrameStats, MathError> {
        let span = debug_span!("frame", width = sink.width(), height = sink.height());
        let _enter = span.enter();

        camera.update()?;
        if let Some(color) = self.config.clear_color {
            sink.clear(color);
        }

        let camera: &dyn Camera = camera;
        let mut counting = CountingSink { inner: sink, pixels: 0 };
        let mut stats = FrameStats::default();

        let root = graph.root();
        let mut stack: Vec<(NodeId, Matrix4d)> = Vec::new();
        if let Some(node) = graph.node(root) {
            stack.push((root, node.transform().matrix()));
        }

        while let Some((id, composed)) = stack.pop() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            stats.nodes += 1;

            let ctx = RenderContext::new(composed).with_max_line_steps(self.config.max_line_steps);
            for primitive in node.primitives() {
                primitive.render(&ctx, camera, &mut counting);
                stats.primitives += 1;
            }

            // reversed so the first child is popped first
            for &child in node.children().iter().rev() {
                if let Some(child_node) = graph.node(child) {
                    stack.push((child, child_node.transform().matrix() * composed));
                }
            }
        }

        stats.pixels = counting.pixels;
        debug!(
            nodes = stats.nodes,
            primitives = stats.primitives,
            pixels = stats.pixels,
            "frame rendered"
        );
        Ok(stats)
    }
}

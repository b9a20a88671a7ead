//! Input events and the frame loop
//!
//! A host (a window, a test script) produces [`InputEvent`]s. The
//! [`FrameLoop`] drains them one at a time, hands each to its subscribers, and
//! renders a frame whenever a [`InputEvent::Tick`] arrives. Everything runs on
//! one thread, so mutations made by subscribers between two ticks are all
//! visible to the next frame.

use scenecrate_core::{Camera, MathError, OrthographicCamera, PerspectiveCamera, PixelSink, Vector3d};
use tracing::{debug, trace};

use crate::graph::SceneGraph;
use crate::renderer::{FrameStats, Renderer};

/// Pointer buttons a host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Events delivered by an [`InputHost`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Time to draw the next frame
    Tick,
    /// The pointer moved to `(x, y)` in surface pixels
    PointerMoved { x: f64, y: f64 },
    PointerPressed { button: PointerButton },
    PointerReleased { button: PointerButton },
}

/// A source of input events; `None` ends the loop
pub trait InputHost {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// Replays a fixed list of events
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost {
    events: std::collections::VecDeque<InputEvent>,
}

impl ScriptedHost {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputHost for ScriptedHost {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

/// The state subscribers are allowed to change between frames
#[derive(Debug)]
pub struct Scene<C> {
    pub graph: SceneGraph,
    pub camera: C,
    /// Size of the surface the scene is drawn on
    pub viewport: (u32, u32),
}

/// Reacts to input by mutating the scene
pub trait EventSubscriber<C> {
    fn on_event(&mut self, scene: &mut Scene<C>, event: &InputEvent);
}

impl<C, F: FnMut(&mut Scene<C>, &InputEvent)> EventSubscriber<C> for F {
    fn on_event(&mut self, scene: &mut Scene<C>, event: &InputEvent) {
        self(scene, event)
    }
}

/// Cameras whose world-space target can be moved
pub trait Aimable {
    fn target(&self) -> Vector3d;
    fn retarget(&mut self, target: Vector3d);
}

impl Aimable for PerspectiveCamera {
    fn target(&self) -> Vector3d {
        self.direction()
    }

    fn retarget(&mut self, target: Vector3d) {
        self.aim_at(target);
    }
}

impl Aimable for OrthographicCamera {
    fn target(&self) -> Vector3d {
        self.direction()
    }

    fn retarget(&mut self, target: Vector3d) {
        self.aim_at(target);
    }
}

/// Steers the camera target with the pointer.
///
/// The pointer position is normalized by the viewport size and written into the
/// target's `x` and `y`; the target's depth is kept.
#[derive(Debug, Clone, Default)]
pub struct PointerAim {
    only_while_pressed: bool,
    pressed: bool,
}

impl PointerAim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only follow the pointer while the primary button is held
    pub fn while_pressed() -> Self {
        Self {
            only_while_pressed: true,
            pressed: false,
        }
    }
}

impl<C: Aimable> EventSubscriber<C> for PointerAim {
    fn on_event(&mut self, scene: &mut Scene<C>, event: &InputEvent) {
        match *event {
            InputEvent::PointerPressed {
                button: PointerButton::Primary,
            } => self.pressed = true,
            InputEvent::PointerReleased {
                button: PointerButton::Primary,
            } => self.pressed = false,
            InputEvent::PointerMoved { x, y } => {
                if self.only_while_pressed && !self.pressed {
                    return;
                }
                let (width, height) = scene.viewport;
                if width == 0 || height == 0 {
                    return;
                }
                let depth = scene.camera.target().z;
                let target = Vector3d::new(x / f64::from(width), y / f64::from(height), depth);
                trace!(?target, "pointer aim");
                scene.camera.retarget(target);
            }
            _ => {}
        }
    }
}

/// Owns a scene, its surface and the renderer, and drives frames from input
pub struct FrameLoop<C, S> {
    scene: Scene<C>,
    sink: S,
    renderer: Renderer,
    subscribers: Vec<Box<dyn EventSubscriber<C>>>,
    frames: u64,
}

impl<C: Camera, S: PixelSink> FrameLoop<C, S> {
    pub fn new(graph: SceneGraph, camera: C, sink: S, renderer: Renderer) -> Self {
        let viewport = (sink.width(), sink.height());
        Self {
            scene: Scene {
                graph,
                camera,
                viewport,
            },
            sink,
            renderer,
            subscribers: Vec::new(),
            frames: 0,
        }
    }

    pub fn subscribe(&mut self, subscriber: impl EventSubscriber<C> + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn scene(&self) -> &Scene<C> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene<C> {
        &mut self.scene
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Handle one event; renders and returns the frame stats on [`InputEvent::Tick`]
    pub fn dispatch(&mut self, event: InputEvent) -> Result<Option<FrameStats>, MathError> {
        for subscriber in &mut self.subscribers {
            subscriber.on_event(&mut self.scene, &event);
        }
        match event {
            InputEvent::Tick => self.render_frame().map(Some),
            _ => Ok(None),
        }
    }

    pub fn render_frame(&mut self) -> Result<FrameStats, MathError> {
        let stats = self
            .renderer
            .render(&self.scene.graph, &mut self.scene.camera, &mut self.sink)?;
        self.frames += 1;
        Ok(stats)
    }

    /// Drain the host until it runs dry, returning the number of frames rendered
    pub fn run(&mut self, host: &mut dyn InputHost) -> Result<u64, MathError> {
        let start = self.frames;
        while let Some(event) = host.next_event() {
            self.dispatch(event)?;
        }
        let rendered = self.frames - start;
        debug!(frames = rendered, "input host finished");
        Ok(rendered)
    }
}

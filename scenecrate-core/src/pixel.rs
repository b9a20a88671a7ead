//! Colors, pixels and the surfaces they are written to

use serde::{Deserialize, Serialize};

/// An RGBA color with 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Color::rgba(r, g, b, a)
    }
}

/// A colored sample in image space.
///
/// Coordinates are not yet discretized; turning them into a cell is up to the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

impl Pixel {
    pub fn new(x: f64, y: f64, color: Color) -> Self {
        Self { x, y, color }
    }

    /// The integer cell this pixel falls into (`floor` of both coordinates)
    pub fn cell(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}

/// The pixel surface back end a frame is drawn onto.
///
/// Image space has its origin at the top-left corner, x grows right and y grows
/// down. Pixels outside `width x height` are dropped silently by the sink.
pub trait PixelSink {
    fn put(&mut self, pixel: Pixel);

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn clear(&mut self, color: Color);
}

/// An in-memory RGBA surface
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    background: Color,
    cells: Vec<Color>,
}

impl Framebuffer {
    /// Create a surface cleared to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::TRANSPARENT,
            cells: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// The color at cell `(x, y)`, or `None` outside the surface
    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Cells whose color differs from the last clear color, in row-major order
    pub fn lit_pixels(&self) -> Vec<(u32, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != self.background)
            .map(|(i, _)| ((i % self.width as usize) as u32, (i / self.width as usize) as u32))
            .collect()
    }

    /// Raw cell storage in row-major order
    pub fn as_slice(&self) -> &[Color] {
        &self.cells
    }
}

impl PixelSink for Framebuffer {
    fn put(&mut self, pixel: Pixel) {
        if !pixel.x.is_finite() || !pixel.y.is_finite() {
            return;
        }
        let (x, y) = pixel.cell();
        if let Some(i) = self.index(x, y) {
            self.cells[i] = pixel.color;
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.background = color;
        self.cells.fill(color);
    }
}

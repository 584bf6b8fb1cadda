use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Detector box in capture pixels, `(x, y, width, height)`.
///
/// Serialized as a four element array so replay files stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// Corner form `(x1, y1, x2, y2)` in overlay pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x2 - self.x1) / 2. + self.x1,
            (self.y2 - self.y1) / 2. + self.y1,
        )
    }
}

/// Per-axis factors taking capture coordinates to overlay coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub sx: f64,
    pub sy: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { sx: 1., sy: 1. };

    pub fn between(capture: Size, overlay: Size) -> Self {
        Self {
            sx: overlay.width as f64 / capture.width as f64,
            sy: overlay.height as f64 / capture.height as f64,
        }
    }

    pub fn transform(&self, b: &BoundingBox) -> Rect {
        let (x, y) = (b.x as f64, b.y as f64);
        Rect::new(
            self.sx * x,
            self.sy * y,
            self.sx * (x + b.width as f64),
            self.sy * (y + b.height as f64),
        )
    }

    /// Where the label text for `b` is anchored: its scaled top-left corner.
    pub fn origin(&self, b: &BoundingBox) -> Point {
        Point::new(self.sx * b.x as f64, self.sy * b.y as f64)
    }
}

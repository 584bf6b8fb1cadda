use crate::geometry::{Point, Rect};
use crate::labels::Color;

/// Annotation layer drawn over the camera preview, in overlay pixels.
pub trait Overlay {
    fn clear(&mut self) -> crate::Result<()>;

    fn bounding_box(&mut self, rect: Rect, fill: Option<Color>, outline: Color)
        -> crate::Result<()>;

    fn text(&mut self, position: Point, text: &str, color: Color) -> crate::Result<()>;

    /// Presents everything drawn since the last `clear`.
    fn update(&mut self) -> crate::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Box {
        rect: Rect,
        fill: Option<Color>,
        outline: Color,
    },
    Text {
        position: Point,
        text: String,
        color: Color,
    },
}

/// Keeps the current frame's drawing in memory and traces it on `update`.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    ops: Vec<DrawOp>,
    presented: Vec<DrawOp>,
    updates: u64,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the last `update` put on screen.
    pub fn presented(&self) -> &[DrawOp] {
        &self.presented
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.presented.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Box { .. } => None,
        })
    }
}

impl Overlay for RecordingOverlay {
    fn clear(&mut self) -> crate::Result<()> {
        self.ops.clear();
        Ok(())
    }

    fn bounding_box(
        &mut self,
        rect: Rect,
        fill: Option<Color>,
        outline: Color,
    ) -> crate::Result<()> {
        self.ops.push(DrawOp::Box {
            rect,
            fill,
            outline,
        });
        Ok(())
    }

    fn text(&mut self, position: Point, text: &str, color: Color) -> crate::Result<()> {
        self.ops.push(DrawOp::Text {
            position,
            text: text.to_string(),
            color,
        });
        Ok(())
    }

    fn update(&mut self) -> crate::Result<()> {
        for op in &self.ops {
            log::trace!("overlay: {op:?}");
        }
        self.presented = std::mem::take(&mut self.ops);
        self.updates += 1;
        Ok(())
    }
}

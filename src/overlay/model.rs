use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Brush,
    Highlight,
    Line,
    Rect,
    Ellipse,
    Arrow,
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushStyle {
    pub width: u32,
    pub color: Color,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            width: 5,
            color: Color::rgba(52, 152, 219, 255),
        }
    }
}

/// Geometry in surface pixels. Shapes with two corners are normalised at
/// render time, so `start`/`end` may arrive in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Path { points: Vec<(i32, i32)> },
    Line { start: (i32, i32), end: (i32, i32) },
    Rect { start: (i32, i32), end: (i32, i32) },
    Ellipse { start: (i32, i32), end: (i32, i32) },
    Arrow { start: (i32, i32), end: (i32, i32) },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub tool: Tool,
    pub style: BrushStyle,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanvasModel {
    pub strokes: Vec<Stroke>,
}

use crate::overlay::model::{BrushStyle, CanvasModel, Color, Shape, Stroke, Tool};
use crate::overlay::raster::PixelBuffer;

const HIGHLIGHT_WIDTH_FACTOR: u32 = 3;
const HIGHLIGHT_ALPHA: f32 = 0.4;
const ARROW_HEAD_FACTOR: f32 = 3.0;

pub fn render_canvas(canvas: &CanvasModel, buffer: &mut PixelBuffer) {
    for stroke in &canvas.strokes {
        render_stroke(stroke, buffer);
    }
}

pub fn render_stroke(stroke: &Stroke, buffer: &mut PixelBuffer) {
    let style = effective_style(stroke);
    let erase = stroke.tool == Tool::Eraser;
    match &stroke.shape {
        Shape::Path { points } => stamp_polyline(points, style, erase, buffer),
        Shape::Line { start, end } => stamp_segment(*start, *end, style, erase, buffer),
        Shape::Rect { start, end } => {
            let (x0, y0) = (start.0.min(end.0), start.1.min(end.1));
            let (x1, y1) = (start.0.max(end.0), start.1.max(end.1));
            stamp_segment((x0, y0), (x1, y0), style, erase, buffer);
            stamp_segment((x1, y0), (x1, y1), style, erase, buffer);
            stamp_segment((x1, y1), (x0, y1), style, erase, buffer);
            stamp_segment((x0, y1), (x0, y0), style, erase, buffer);
        }
        Shape::Ellipse { start, end } => stamp_ellipse(*start, *end, style, erase, buffer),
        Shape::Arrow { start, end } => {
            stamp_segment(*start, *end, style, erase, buffer);
            let angle = ((end.1 - start.1) as f32).atan2((end.0 - start.0) as f32);
            let head = (style.width as f32 * ARROW_HEAD_FACTOR).max(4.0);
            for offset in [-std::f32::consts::FRAC_PI_6, std::f32::consts::FRAC_PI_6] {
                let tip = (
                    (end.0 as f32 - head * (angle + offset).cos()).round() as i32,
                    (end.1 as f32 - head * (angle + offset).sin()).round() as i32,
                );
                stamp_segment(*end, tip, style, erase, buffer);
            }
        }
    }
}

/// The highlighter is a wide brush at reduced opacity; every other tool
/// draws with its style untouched.
fn effective_style(stroke: &Stroke) -> BrushStyle {
    let mut style = stroke.style;
    if stroke.tool == Tool::Highlight {
        style.width = style.width.saturating_mul(HIGHLIGHT_WIDTH_FACTOR);
        style.color.a = (style.color.a as f32 * HIGHLIGHT_ALPHA).round() as u8;
    }
    style
}

fn stamp_polyline(points: &[(i32, i32)], style: BrushStyle, erase: bool, buffer: &mut PixelBuffer) {
    match points {
        [] => {}
        [only] => stamp_disc(*only, style, erase, buffer),
        _ => {
            for pair in points.windows(2) {
                stamp_segment(pair[0], pair[1], style, erase, buffer);
            }
        }
    }
}

fn stamp_segment(a: (i32, i32), b: (i32, i32), style: BrushStyle, erase: bool, buffer: &mut PixelBuffer) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let steps = dx.abs().max(dy.abs()).max(1);
    for i in 0..=steps {
        let x = a.0 + dx * i / steps;
        let y = a.1 + dy * i / steps;
        stamp_disc((x, y), style, erase, buffer);
    }
}

fn stamp_ellipse(start: (i32, i32), end: (i32, i32), style: BrushStyle, erase: bool, buffer: &mut PixelBuffer) {
    let cx = (start.0 + end.0) as f32 / 2.0;
    let cy = (start.1 + end.1) as f32 / 2.0;
    let rx = (end.0 - start.0).abs() as f32 / 2.0;
    let ry = (end.1 - start.1).abs() as f32 / 2.0;
    let steps = ((rx.max(ry) * std::f32::consts::TAU).ceil() as i32).max(8);
    for i in 0..steps {
        let t = i as f32 / steps as f32 * std::f32::consts::TAU;
        let point = (
            (cx + rx * t.cos()).round() as i32,
            (cy + ry * t.sin()).round() as i32,
        );
        stamp_disc(point, style, erase, buffer);
    }
}

fn stamp_disc(center: (i32, i32), style: BrushStyle, erase: bool, buffer: &mut PixelBuffer) {
    let radius = (style.width / 2) as i32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let x = center.0 + dx;
            let y = center.1 + dy;
            if x < 0 || y < 0 || x >= buffer.width as i32 || y >= buffer.height as i32 {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            if erase {
                buffer.set_pixel(x, y, Color::TRANSPARENT);
            } else {
                let blended = blend_pixel(buffer.pixel(x, y), style.color);
                buffer.set_pixel(x, y, blended);
            }
        }
    }
}

fn blend_pixel(bottom: Color, top: Color) -> Color {
    let sa = top.a as f32 / 255.0;
    let da = bottom.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    if out_a <= f32::EPSILON {
        return Color::TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Color {
        r: blend(top.r, bottom.r),
        g: blend(top.g, bottom.g),
        b: blend(top.b, bottom.b),
        a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}

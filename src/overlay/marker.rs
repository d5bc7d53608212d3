use crate::overlay::window::SketchWindow;

/// Seek-bar marker for one stored sketch, expressed as fractions of the
/// video duration so the host can position it on any progress bar width.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMarker {
    pub anchor: u32,
    pub left: f64,
    pub width: f64,
    pub label: String,
}

pub fn markers_for(windows: &[&SketchWindow], duration: f64) -> Vec<TimelineMarker> {
    if !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }
    windows
        .iter()
        .map(|window| {
            let left = (window.start as f64 / duration).clamp(0.0, 1.0);
            let span = (window.end.saturating_sub(window.start)) as f64 / duration;
            TimelineMarker {
                anchor: window.anchor,
                left,
                width: span.min(1.0 - left),
                label: format_timestamp(window.anchor),
            }
        })
        .collect()
}

pub fn format_timestamp(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

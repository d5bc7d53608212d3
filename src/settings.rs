use crate::overlay::model::{BrushStyle, Color};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENGINE_SETTINGS_FILE: &str = "vidink_settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    /// When enabled the host initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Seconds a sketch stays eligible *before* its anchor second.
    #[serde(default = "default_window_lead")]
    pub window_lead_seconds: u32,
    /// Seconds a sketch stays eligible *after* its anchor second.
    #[serde(default = "default_window_tail")]
    pub window_tail_seconds: u32,
    /// Proximity used when deleting the sketch nearest to the playhead.
    #[serde(default = "default_delete_tolerance")]
    pub delete_tolerance_seconds: u32,
    /// Settle delay after a fullscreen transition before viewport sizes are
    /// trusted; browsers report intermediate sizes during the animation.
    #[serde(default = "default_resize_settle_ms")]
    pub resize_settle_ms: u64,
    /// Last brush width picked by the user.
    #[serde(default = "default_brush_width")]
    pub last_width: u32,
    /// Last brush color picked by the user.
    #[serde(default = "default_brush_color")]
    pub last_color: Color,
}

fn default_window_lead() -> u32 {
    1
}

fn default_window_tail() -> u32 {
    5
}

fn default_delete_tolerance() -> u32 {
    5
}

fn default_resize_settle_ms() -> u64 {
    300
}

fn default_brush_width() -> u32 {
    5
}

fn default_brush_color() -> Color {
    Color::rgba(52, 152, 219, 255)
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            window_lead_seconds: default_window_lead(),
            window_tail_seconds: default_window_tail(),
            delete_tolerance_seconds: default_delete_tolerance(),
            resize_settle_ms: default_resize_settle_ms(),
            last_width: default_brush_width(),
            last_color: default_brush_color(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Interval claimed by a sketch anchored at `anchor`, clamped to the
    /// video duration once it is known.
    pub fn window_interval(&self, anchor: u32, duration: Option<f64>) -> (u32, u32) {
        let start = anchor.saturating_sub(self.window_lead_seconds);
        let mut end = anchor.saturating_add(self.window_tail_seconds);
        if let Some(duration) = duration {
            if duration.is_finite() && duration >= 0.0 {
                end = end.min(duration.floor() as u32).max(anchor);
            }
        }
        (start, end)
    }

    pub fn resize_settle(&self) -> Duration {
        Duration::from_millis(self.resize_settle_ms)
    }

    pub fn brush(&self) -> BrushStyle {
        BrushStyle {
            width: self.last_width,
            color: self.last_color,
        }
    }
}

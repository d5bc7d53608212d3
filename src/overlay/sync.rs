use crate::overlay::model::CanvasModel;
use crate::overlay::raster::{self, PixelBuffer};
use crate::overlay::surface::DrawSurface;
use crate::overlay::window::{SketchWindow, WindowIndex};
use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Idle,
    Editing,
    Displaying,
}

pub fn can_transition(from: SyncMode, to: SyncMode) -> bool {
    matches!(
        (from, to),
        (SyncMode::Idle, SyncMode::Displaying)
            | (SyncMode::Displaying, SyncMode::Idle)
            | (SyncMode::Idle, SyncMode::Editing)
            | (SyncMode::Displaying, SyncMode::Editing)
            | (SyncMode::Editing, SyncMode::Idle)
    ) || from == to
}

/// What a single tick did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// An edit is in progress; clock-driven updates are suspended.
    Suspended,
    /// A window became active and its raster was decoded and presented.
    Shown(u32),
    /// The active window is unchanged; nothing was decoded or redrawn.
    AlreadyShown(u32),
    /// Playback left the active window's interval; the surface was cleared.
    Cleared,
    /// No window is active and none was shown.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStats {
    pub presents: u64,
    pub redundant_ticks: u64,
    pub clears: u64,
}

/// Per-video playback synchronisation state. Driven purely by delivered
/// ticks; ticks may skip arbitrarily (seeking), so every tick re-evaluates
/// the index from scratch.
#[derive(Debug)]
pub struct PlaybackSync {
    mode: SyncMode,
    last_shown_anchor: Option<u32>,
    stats: SyncStats,
}

impl Default for PlaybackSync {
    fn default() -> Self {
        Self {
            mode: SyncMode::Idle,
            last_shown_anchor: None,
            stats: SyncStats::default(),
        }
    }
}

impl PlaybackSync {
    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn shown_anchor(&self) -> Option<u32> {
        self.last_shown_anchor
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    fn transition(&mut self, to: SyncMode) -> Result<()> {
        if !can_transition(self.mode, to) {
            return Err(anyhow!(
                "invalid sync transition {:?} -> {:?}",
                self.mode,
                to
            ));
        }
        self.mode = to;
        Ok(())
    }

    /// Evaluate one delivery of the playback clock.
    ///
    /// Presenting is gated on the active anchor changing: ticks arrive far
    /// more often than the multi-second windows change, and redecoding an
    /// unchanged snapshot every tick would flicker and waste work. A decode
    /// failure is logged and the window treated as absent; the tick loop
    /// never propagates it.
    pub fn tick(
        &mut self,
        index: &WindowIndex,
        video_id: &str,
        time: f64,
        surface: &mut DrawSurface,
    ) -> TickOutcome {
        if self.mode == SyncMode::Editing {
            return TickOutcome::Suspended;
        }

        match index.query_at(video_id, time) {
            Some(window) => {
                if self.last_shown_anchor == Some(window.anchor) {
                    self.stats.redundant_ticks += 1;
                    return TickOutcome::AlreadyShown(window.anchor);
                }
                match surface.present_raster(&window.raster) {
                    Ok(()) => {
                        self.last_shown_anchor = Some(window.anchor);
                        self.mode = SyncMode::Displaying;
                        self.stats.presents += 1;
                        TickOutcome::Shown(window.anchor)
                    }
                    Err(err) => {
                        tracing::warn!(
                            ?err,
                            anchor = window.anchor,
                            video = %video_id,
                            "sketch raster failed to decode; treating window as absent"
                        );
                        self.clear_if_shown(surface)
                    }
                }
            }
            None => self.clear_if_shown(surface),
        }
    }

    fn clear_if_shown(&mut self, surface: &mut DrawSurface) -> TickOutcome {
        self.mode = SyncMode::Idle;
        if self.last_shown_anchor.take().is_some() {
            surface.clear();
            self.stats.clears += 1;
            TickOutcome::Cleared
        } else {
            TickOutcome::Empty
        }
    }

    /// Enter editing. The surface is cleared for a fresh sketch, or seeded
    /// with an existing window's raster when the user chose to edit it; the
    /// decoded, surface-sized base layer is returned so callers can compose
    /// strokes over it.
    pub fn begin_edit(
        &mut self,
        surface: &mut DrawSurface,
        preload: Option<&SketchWindow>,
    ) -> Result<Option<PixelBuffer>> {
        let base = match preload {
            Some(window) => {
                let decoded = raster::decode(&window.raster)?;
                let scaled = raster::present(&decoded, surface.width(), surface.height())?;
                Some(scaled)
            }
            None => None,
        };
        self.transition(SyncMode::Editing)?;
        self.last_shown_anchor = None;
        match &base {
            Some(scaled) => surface.compose(Some(scaled), &CanvasModel::default())?,
            None => surface.clear(),
        }
        Ok(base)
    }

    /// Leave editing after a save or cancel. The caller re-runs a tick at
    /// the current time to decide what to show next.
    pub fn finish_edit(&mut self) -> Result<()> {
        self.transition(SyncMode::Idle)?;
        self.last_shown_anchor = None;
        Ok(())
    }

    /// Forget the displayed window without touching the surface; used after
    /// the shown window is deleted out from under the synchroniser.
    pub fn reset_display(&mut self) {
        self.last_shown_anchor = None;
        self.mode = SyncMode::Idle;
    }
}

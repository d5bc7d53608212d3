use crate::overlay::history::SketchHistory;
use crate::overlay::marker::{self, TimelineMarker};
use crate::overlay::model::Stroke;
use crate::overlay::raster::{self, PixelBuffer, Raster};
use crate::overlay::resize::ResizeDebouncer;
use crate::overlay::surface::DrawSurface;
use crate::overlay::sync::{PlaybackSync, SyncMode, SyncStats, TickOutcome};
use crate::overlay::window::{SketchWindow, WindowIndex};
use crate::settings::EngineSettings;
use crate::storage::{self, LoadTicket};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Sketch stored in memory and flushed to the persistent store.
    Saved { anchor: u32 },
    /// Persistence failed; the in-memory copy stays authoritative so the
    /// work is not lost, and the host should surface a transient notice.
    SavedMemoryOnly { anchor: u32 },
    /// The surface had no visible pixels; nothing was stored or written.
    EmptyCanvas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCommit {
    Applied { windows: usize },
    /// The viewer navigated away while the load was in flight; the result
    /// was discarded without touching any state.
    Stale,
}

struct EditState {
    /// Snapshot being edited, when the user picked an existing sketch.
    source: Option<Raster>,
    /// `source` decoded at the current surface size; strokes compose over it.
    base: Option<PixelBuffer>,
    history: SketchHistory,
}

struct ActiveVideo {
    video_id: String,
    duration: Option<f64>,
    last_tick_time: f64,
    sync: PlaybackSync,
    surface: DrawSurface,
    debouncer: ResizeDebouncer,
    edit: Option<EditState>,
}

/// The owning coordinator. Holds the engine settings, the multi-video
/// window index, and the state of the currently-attached video; every
/// external signal and operation goes through here, and attaching a new
/// video swaps the per-video state without dropping other videos' windows.
pub struct OverlayEngine {
    settings: EngineSettings,
    store_path: PathBuf,
    index: WindowIndex,
    active: Option<ActiveVideo>,
}

impl OverlayEngine {
    pub fn new(settings: EngineSettings, store_path: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            store_path: store_path.into(),
            index: WindowIndex::default(),
            active: None,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn active_video(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.video_id.as_str())
    }

    pub fn mode(&self) -> SyncMode {
        self.active
            .as_ref()
            .map_or(SyncMode::Idle, |active| active.sync.mode())
    }

    pub fn shown_anchor(&self) -> Option<u32> {
        self.active.as_ref().and_then(|active| active.sync.shown_anchor())
    }

    pub fn sync_stats(&self) -> SyncStats {
        self.active
            .as_ref()
            .map_or_else(SyncStats::default, |active| active.sync.stats())
    }

    pub fn surface(&self) -> Option<&DrawSurface> {
        self.active.as_ref().map(|active| &active.surface)
    }

    /// Attach the drawing surface to a video. Attaching the video that is
    /// already active is a no-op; a different video replaces the per-video
    /// state (synchroniser, surface, pending edit) wholesale.
    pub fn attach(&mut self, video_id: &str, width: u32, height: u32) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.video_id == video_id)
        {
            return;
        }
        self.active = Some(ActiveVideo {
            video_id: video_id.to_string(),
            duration: None,
            last_tick_time: 0.0,
            sync: PlaybackSync::default(),
            surface: DrawSurface::new(width, height),
            debouncer: ResizeDebouncer::new(self.settings.resize_settle()),
            edit: None,
        });
    }

    pub fn detach(&mut self) {
        self.active = None;
    }

    /// Start loading a video's stored sketches. The returned ticket carries
    /// the video it was issued for and must be passed to [`commit_load`];
    /// the split lets a navigation happen between the two calls.
    ///
    /// [`commit_load`]: OverlayEngine::commit_load
    pub fn begin_load(&self, video_id: &str) -> Result<LoadTicket> {
        storage::begin_load(&self.store_path, video_id)
    }

    /// Commit a finished load, unless the viewer has navigated away since
    /// the ticket was issued; a stale result is dropped on the floor.
    pub fn commit_load(&mut self, ticket: LoadTicket) -> LoadCommit {
        match self.active.as_ref() {
            Some(active) if active.video_id == ticket.video_id => {
                let windows = ticket.windows.len();
                self.index.replace_video(&ticket.video_id, ticket.windows);
                LoadCommit::Applied { windows }
            }
            _ => {
                tracing::debug!(video = %ticket.video_id, "discarding stale sketch load result");
                LoadCommit::Stale
            }
        }
    }

    pub fn duration_known(&mut self, seconds: f64) {
        if let Some(active) = self.active.as_mut() {
            if seconds.is_finite() && seconds >= 0.0 {
                active.duration = Some(seconds);
            }
        }
    }

    /// One delivery of the playback clock. The time is recorded even while
    /// an edit suspends display updates, since saves anchor to it.
    pub fn time_tick(&mut self, seconds: f64) -> TickOutcome {
        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Empty;
        };
        active.last_tick_time = seconds;
        active
            .sync
            .tick(&self.index, &active.video_id, seconds, &mut active.surface)
    }

    pub fn viewport_resized(&mut self, width: u32, height: u32, now: Instant) -> bool {
        let size = match self.active.as_mut() {
            Some(active) => active.debouncer.offer(width, height, now),
            None => return false,
        };
        match size {
            Some((width, height)) => self.apply_surface_size(width, height),
            None => false,
        }
    }

    pub fn fullscreen_changed(&mut self, now: Instant) {
        if let Some(active) = self.active.as_mut() {
            active.debouncer.note_fullscreen_change(now);
        }
    }

    /// Apply a viewport size that was deferred during a fullscreen settle
    /// window. Returns whether the surface changed.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        let size = match self.active.as_mut() {
            Some(active) => active.debouncer.poll(now),
            None => return false,
        };
        match size {
            Some((width, height)) => self.apply_surface_size(width, height),
            None => false,
        }
    }

    fn apply_surface_size(&mut self, width: u32, height: u32) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.surface.width() == width && active.surface.height() == height {
            return false;
        }
        active.surface.resize(width, height);

        if let Some(edit) = active.edit.as_mut() {
            edit.base = edit.source.as_ref().and_then(|snapshot| {
                match raster::decode(snapshot)
                    .and_then(|pixels| raster::present(&pixels, width, height))
                {
                    Ok(buffer) => Some(buffer),
                    Err(err) => {
                        tracing::warn!(?err, "could not rescale edit base after resize");
                        None
                    }
                }
            });
            let canvas = edit.history.canvas();
            if let Err(err) = active.surface.compose(edit.base.as_ref(), &canvas) {
                tracing::warn!(?err, "could not recompose edit surface after resize");
            }
        } else if let Some(anchor) = active.sync.shown_anchor() {
            match self.index.get(&active.video_id, anchor) {
                Some(window) => {
                    if let Err(err) = active.surface.present_raster(&window.raster) {
                        tracing::warn!(?err, anchor, "could not re-present sketch after resize");
                        active.surface.clear();
                        active.sync.reset_display();
                    }
                }
                None => {
                    active.surface.clear();
                    active.sync.reset_display();
                }
            }
        }
        true
    }

    /// Enter editing, optionally seeding the surface with an existing
    /// sketch's raster (the edit-existing flow).
    pub fn begin_edit(&mut self, at_existing: Option<u32>) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        if active.edit.is_some() {
            bail!("an edit is already in progress");
        }
        let preload = match at_existing {
            Some(anchor) => Some(
                self.index
                    .get(&active.video_id, anchor)
                    .ok_or_else(|| anyhow!("no sketch stored at {anchor}s"))?,
            ),
            None => None,
        };
        let source = preload.map(|window| window.raster.clone());
        let base = active.sync.begin_edit(&mut active.surface, preload)?;
        active.edit = Some(EditState {
            source,
            base,
            history: SketchHistory::default(),
        });
        Ok(())
    }

    pub fn add_stroke(&mut self, stroke: Stroke) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        let Some(edit) = active.edit.as_mut() else {
            bail!("not editing");
        };
        edit.history.commit(stroke);
        let canvas = edit.history.canvas();
        active.surface.compose(edit.base.as_ref(), &canvas)
    }

    pub fn undo_stroke(&mut self) -> Result<bool> {
        self.rewind_history(|history| history.undo().is_some())
    }

    pub fn redo_stroke(&mut self) -> Result<bool> {
        self.rewind_history(|history| history.redo().is_some())
    }

    fn rewind_history(&mut self, step: impl FnOnce(&mut SketchHistory) -> bool) -> Result<bool> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        let Some(edit) = active.edit.as_mut() else {
            bail!("not editing");
        };
        if !step(&mut edit.history) {
            return Ok(false);
        }
        let canvas = edit.history.canvas();
        active.surface.compose(edit.base.as_ref(), &canvas)?;
        Ok(true)
    }

    /// Capture the edited surface as a new window anchored at the current
    /// playback second, evicting every overlapping window, and flush the
    /// video's sketches to the store. A blank surface is rejected locally
    /// and the edit stays open.
    pub fn save_current_edit(&mut self) -> Result<SaveOutcome> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        if active.edit.is_none() {
            bail!("not editing");
        }
        if active.surface.is_blank() {
            return Ok(SaveOutcome::EmptyCanvas);
        }

        let snapshot = active.surface.capture().context("capture sketch snapshot")?;
        let anchor = active.last_tick_time.max(0.0).floor() as u32;
        let (start, end) = self.settings.window_interval(anchor, active.duration);
        let window = SketchWindow {
            anchor,
            start,
            end,
            raster: snapshot,
            created_at: Some(Local::now().to_rfc3339()),
        };

        let evicted = self.index.insert(&active.video_id, window);
        if !evicted.is_empty() {
            tracing::debug!(?evicted, anchor, video = %active.video_id, "replaced overlapping sketches");
        }

        active.edit = None;
        active.sync.finish_edit()?;
        let video_id = active.video_id.clone();
        let time = active.last_tick_time;

        let windows: Vec<SketchWindow> = self
            .index
            .entries_for(&video_id)
            .into_iter()
            .cloned()
            .collect();
        let outcome = match storage::save_video(&self.store_path, &video_id, &windows) {
            Ok(()) => SaveOutcome::Saved { anchor },
            Err(err) => {
                tracing::error!(?err, video = %video_id, "failed to persist sketches; in-memory copy kept");
                SaveOutcome::SavedMemoryOnly { anchor }
            }
        };

        // Re-evaluate the clock so the freshly saved window (or whichever
        // one claims the current second) is shown immediately.
        self.time_tick(time);
        Ok(outcome)
    }

    /// Abandon the edit and re-evaluate the clock at the current time.
    pub fn cancel_edit(&mut self) -> Result<TickOutcome> {
        let time = {
            let Some(active) = self.active.as_mut() else {
                bail!("no video attached");
            };
            if active.edit.take().is_none() {
                bail!("not editing");
            }
            active.sync.finish_edit()?;
            active.surface.clear();
            active.last_tick_time
        };
        Ok(self.time_tick(time))
    }

    /// Delete the sketch nearest to `time` within `tolerance` seconds.
    /// Memory is updated first; a failing flush surfaces as an error while
    /// the in-memory state stays authoritative.
    pub fn delete_near(&mut self, time: f64, tolerance: u32) -> Result<Option<u32>> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        let anchor = match self.index.query_nearest(&active.video_id, time, tolerance) {
            Some(window) => window.anchor,
            None => return Ok(None),
        };
        self.index.delete(&active.video_id, anchor);
        if active.sync.shown_anchor() == Some(anchor) {
            active.surface.clear();
            active.sync.reset_display();
        }
        let video_id = active.video_id.clone();
        let windows: Vec<SketchWindow> = self
            .index
            .entries_for(&video_id)
            .into_iter()
            .cloned()
            .collect();
        storage::save_video(&self.store_path, &video_id, &windows)
            .with_context(|| format!("persist sketch deletion for video {video_id}"))?;
        Ok(Some(anchor))
    }

    pub fn delete_all_for_video(&mut self) -> Result<usize> {
        let Some(active) = self.active.as_mut() else {
            bail!("no video attached");
        };
        let removed = self.index.delete_all(&active.video_id);
        active.surface.clear();
        active.sync.reset_display();
        let video_id = active.video_id.clone();
        storage::save_video(&self.store_path, &video_id, &[])
            .with_context(|| format!("persist sketch wipe for video {video_id}"))?;
        Ok(removed)
    }

    /// All windows for a video, ordered by anchor.
    pub fn list_windows(&self, video_id: &str) -> Vec<&SketchWindow> {
        self.index.entries_for(video_id)
    }

    /// Seek-bar markers for the attached video; empty until the duration is
    /// known.
    pub fn timeline_markers(&self) -> Vec<TimelineMarker> {
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };
        let Some(duration) = active.duration else {
            return Vec::new();
        };
        marker::markers_for(&self.index.entries_for(&active.video_id), duration)
    }

    /// Anchor of the sketch nearest to `time` within the configured delete
    /// tolerance; feeds the edit-existing and delete flows.
    pub fn nearest_anchor(&self, time: f64) -> Option<u32> {
        let active = self.active.as_ref()?;
        self.index
            .query_nearest(
                &active.video_id,
                time,
                self.settings.delete_tolerance_seconds,
            )
            .map(|window| window.anchor)
    }
}

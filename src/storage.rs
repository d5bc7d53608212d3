use crate::overlay::raster::{self, Raster};
use crate::overlay::window::SketchWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SKETCH_STORE_FILE: &str = "video_sketches.json";

/// On-disk document holding every video's sketches. Field names follow the
/// host-facing record format, hence the camelCase renames.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SketchStore {
    pub version: u32,
    #[serde(default)]
    pub videos: BTreeMap<String, Vec<StoredWindow>>,
}

impl Default for SketchStore {
    fn default() -> Self {
        Self {
            version: 1,
            videos: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredWindow {
    pub anchor_time: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub raster: Raster,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&SketchWindow> for StoredWindow {
    fn from(window: &SketchWindow) -> Self {
        Self {
            anchor_time: window.anchor,
            start_time: window.start,
            end_time: window.end,
            raster: window.raster.clone(),
            created_at: window.created_at.clone(),
        }
    }
}

impl From<StoredWindow> for SketchWindow {
    fn from(stored: StoredWindow) -> Self {
        Self {
            anchor: stored.anchor_time,
            start: stored.start_time,
            end: stored.end_time,
            raster: stored.raster,
            created_at: stored.created_at,
        }
    }
}

/// Completion token for a load. Image decoding is not guaranteed to finish
/// before the viewer navigates away, so the result carries the video it was
/// issued for and is only committed if that video is still the active one.
#[derive(Debug)]
pub struct LoadTicket {
    pub(crate) video_id: String,
    pub(crate) windows: Vec<SketchWindow>,
}

impl LoadTicket {
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

pub fn load_store(path: impl AsRef<Path>) -> anyhow::Result<SketchStore> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(SketchStore::default());
    }
    let mut store: SketchStore = serde_json::from_str(&content)?;
    if store.version == 0 {
        store.version = 1;
    }
    Ok(store)
}

pub fn save_store(path: impl AsRef<Path>, store: &SketchStore) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(store)?;
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Write-through for one video: replace its entry in the document without
/// disturbing any other video's sketches. An empty window list removes the
/// entry entirely.
pub fn save_video(
    path: impl AsRef<Path>,
    video_id: &str,
    windows: &[SketchWindow],
) -> anyhow::Result<()> {
    let mut store = match load_store(&path) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(?err, "sketch store unreadable; starting a fresh document");
            SketchStore::default()
        }
    };
    if windows.is_empty() {
        store.videos.remove(video_id);
    } else {
        store.videos.insert(
            video_id.to_string(),
            windows.iter().map(StoredWindow::from).collect(),
        );
    }
    save_store(path, &store)
}

/// Start loading one video's sketches. Records whose raster fails to decode
/// are skipped with a warning; a malformed snapshot must not take the rest
/// of the video's sketches down with it.
pub fn begin_load(path: impl AsRef<Path>, video_id: &str) -> anyhow::Result<LoadTicket> {
    let store = load_store(path)?;
    let mut windows = Vec::new();
    for stored in store.videos.get(video_id).cloned().unwrap_or_default() {
        if let Err(err) = raster::decode(&stored.raster) {
            tracing::warn!(
                ?err,
                anchor = stored.anchor_time,
                video = %video_id,
                "skipping sketch with undecodable raster"
            );
            continue;
        }
        windows.push(SketchWindow::from(stored));
    }
    Ok(LoadTicket {
        video_id: video_id.to_string(),
        windows,
    })
}

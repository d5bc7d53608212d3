use crate::overlay::raster::Raster;
use std::collections::{BTreeMap, HashMap};

/// A stored sketch plus the playback interval during which it is eligible
/// for display. `anchor` is the floored playback second at save time and the
/// unique key within one video's index.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchWindow {
    pub anchor: u32,
    pub start: u32,
    pub end: u32,
    pub raster: Raster,
    pub created_at: Option<String>,
}

impl SketchWindow {
    /// Inclusive containment test against a floored playback second.
    pub fn contains(&self, second: u32) -> bool {
        self.start <= second && second <= self.end
    }

    /// Inclusive interval intersection test.
    pub fn intersects(&self, start: u32, end: u32) -> bool {
        self.start <= end && start <= self.end
    }
}

/// Ordered per-video mapping from anchor second to sketch window.
///
/// Windows only enter through [`WindowIndex::insert`], which evicts every
/// intersecting window first, so the set of intervals for a video is always
/// pairwise disjoint and a point query is unambiguous.
#[derive(Debug, Default)]
pub struct WindowIndex {
    videos: HashMap<String, BTreeMap<u32, SketchWindow>>,
}

impl WindowIndex {
    /// Insert a window, evicting every existing window for the same video
    /// whose interval intersects it. Returns the evicted anchors.
    pub fn insert(&mut self, video_id: &str, window: SketchWindow) -> Vec<u32> {
        let windows = self.videos.entry(video_id.to_string()).or_default();
        let evicted: Vec<u32> = windows
            .values()
            .filter(|existing| existing.intersects(window.start, window.end))
            .map(|existing| existing.anchor)
            .collect();
        for anchor in &evicted {
            windows.remove(anchor);
        }
        windows.insert(window.anchor, window);
        evicted
    }

    pub fn get(&self, video_id: &str, anchor: u32) -> Option<&SketchWindow> {
        self.videos.get(video_id)?.get(&anchor)
    }

    /// The window whose interval contains `time` (floored to a second).
    /// Should imported data ever violate disjointness, the smallest anchor
    /// wins, which the ascending map order gives us for free.
    pub fn query_at(&self, video_id: &str, time: f64) -> Option<&SketchWindow> {
        let second = time.max(0.0).floor() as u32;
        self.videos
            .get(video_id)?
            .values()
            .find(|window| window.contains(second))
    }

    /// The window minimising `|anchor - time|` within `tolerance` seconds.
    /// Ties break on the smaller difference first, then the smaller anchor.
    pub fn query_nearest(
        &self,
        video_id: &str,
        time: f64,
        tolerance: u32,
    ) -> Option<&SketchWindow> {
        let windows = self.videos.get(video_id)?;
        let mut best: Option<(f64, &SketchWindow)> = None;
        for window in windows.values() {
            let diff = (window.anchor as f64 - time).abs();
            if diff > tolerance as f64 {
                continue;
            }
            // Ascending anchor iteration means a strictly smaller diff is
            // required to displace the current best.
            if best.map_or(true, |(best_diff, _)| diff < best_diff) {
                best = Some((diff, window));
            }
        }
        best.map(|(_, window)| window)
    }

    pub fn delete(&mut self, video_id: &str, anchor: u32) -> bool {
        self.videos
            .get_mut(video_id)
            .map_or(false, |windows| windows.remove(&anchor).is_some())
    }

    pub fn delete_all(&mut self, video_id: &str) -> usize {
        self.videos
            .remove(video_id)
            .map_or(0, |windows| windows.len())
    }

    /// All windows for a video, ordered by anchor; feeds timeline markers.
    pub fn entries_for(&self, video_id: &str) -> Vec<&SketchWindow> {
        self.videos
            .get(video_id)
            .map(|windows| windows.values().collect())
            .unwrap_or_default()
    }

    /// Replace one video's windows wholesale (used when committing a load),
    /// leaving every other video untouched.
    pub fn replace_video(&mut self, video_id: &str, windows: Vec<SketchWindow>) {
        let map: BTreeMap<u32, SketchWindow> = windows
            .into_iter()
            .map(|window| (window.anchor, window))
            .collect();
        self.videos.insert(video_id.to_string(), map);
    }
}

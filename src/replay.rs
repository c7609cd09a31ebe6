//! Offline runs over recorded landmark frames, e.g. for checking a new
//! calibration against a known set of repetitions.

use std::fs;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};

use crate::{
    landmark_source::{LandmarkSource, RecordedSource},
    systems::Systems,
    tether_interface::process_frame,
    tracking::LandmarkSet,
};

/// A JSON array of frames, each an array of `{ "id", "x", "y" }` landmarks.
/// An empty frame means nobody was detected.
pub fn load_recording(path: &str) -> Result<Vec<LandmarkSet>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read recording {}", path))?;
    let frames: Vec<LandmarkSet> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse recording {}", path))?;
    info!("Loaded {} frames from \"{}\"", frames.len(), path);
    Ok(frames)
}

#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub frames_without_body: usize,
    /// Final count per tracker, in tracker order
    pub counts: IndexMap<String, f32>,
}

/// Feed every frame through the trackers, in order, until the recording runs out.
pub fn replay_frames(systems: &mut Systems, frames: &[LandmarkSet]) -> ReplaySummary {
    let mut source = RecordedSource;
    let mut summary = ReplaySummary::default();

    for (i, frame) in frames.iter().enumerate() {
        summary.frames += 1;
        match source.detect(frame) {
            Some(landmarks) => {
                process_frame(systems, &landmarks);
            }
            None => {
                debug!("Frame {}: no body detected", i);
                summary.frames_without_body += 1;
            }
        }
    }

    summary.counts = systems
        .rep_trackers
        .iter()
        .map(|(name, limb)| (name.clone(), limb.rep_tracker.state().count()))
        .collect();
    summary
}

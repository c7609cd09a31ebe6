pub mod frame_rate;
pub mod rep_counting;

use frame_rate::FrameRateMeter;
use indexmap::IndexMap;
use log::{debug, info};
use rep_counting::RepTracker;

use crate::{
    backend_config::{BackendConfig, LandmarkTriple},
    geometry_utils::joint_angle,
    landmark_source::{BodyFrameSource, PoseLandmarksSource},
    tracking::{LandmarkSet, RepUpdate},
    Point2D,
};

/// A rep tracker together with the joints it reads from each frame
pub struct TrackedLimb {
    pub landmarks: LandmarkTriple,
    pub rep_tracker: RepTracker,
}

pub type RepTrackerMap = IndexMap<String, TrackedLimb>;

/// The Tether input a landmark frame arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    PoseLandmarks,
    BodyFrames,
}

pub struct Systems {
    pub pose_landmarks_source: PoseLandmarksSource,
    pub body_frame_source: BodyFrameSource,
    pub rep_trackers: RepTrackerMap,
    pose_landmarks_rate: FrameRateMeter,
    body_frames_rate: FrameRateMeter,
}

impl Systems {
    pub fn new(config: &BackendConfig) -> Systems {
        let mut systems = Systems {
            pose_landmarks_source: PoseLandmarksSource,
            body_frame_source: BodyFrameSource::new(config.body_frames_flip_y),
            rep_trackers: IndexMap::new(),
            pose_landmarks_rate: FrameRateMeter::new(),
            body_frames_rate: FrameRateMeter::new(),
        };
        systems.apply_config(config);
        systems
    }

    /// (Re)build the trackers from config. Trackers that keep their name keep
    /// their current count; removed or disabled ones are dropped.
    pub fn apply_config(&mut self, config: &BackendConfig) {
        self.body_frame_source.set_flip_y(config.body_frames_flip_y);

        let mut previous = std::mem::take(&mut self.rep_trackers);

        for limb in config.enabled_trackers() {
            let tracked = match previous.shift_remove(&limb.name) {
                Some(mut existing) => {
                    existing
                        .rep_tracker
                        .recalibrate(limb.calibration, config.extreme_tolerance);
                    existing.landmarks = limb.landmarks;
                    existing
                }
                None => {
                    info!(
                        "New rep tracker \"{}\" on landmarks {:?}",
                        limb.name, limb.landmarks
                    );
                    TrackedLimb {
                        landmarks: limb.landmarks,
                        rep_tracker: RepTracker::new(
                            limb.calibration,
                            limb.starting_direction,
                            config.extreme_tolerance,
                        ),
                    }
                }
            };
            self.rep_trackers.insert(limb.name.clone(), tracked);
        }

        for name in previous.keys() {
            info!("Dropped rep tracker \"{}\"", name);
        }
    }

    /// Mark a frame arriving on the given feed; each feed keeps its own rate
    pub fn tick_frame_rate(&mut self, feed: Feed) -> Option<f32> {
        match feed {
            Feed::PoseLandmarks => self.pose_landmarks_rate.tick(),
            Feed::BodyFrames => self.body_frames_rate.tick(),
        }
    }

    /// Run one frame's landmarks through every tracker. Trackers whose joints
    /// are not all present in this frame are left untouched.
    pub fn process_landmarks(&mut self, landmarks: &LandmarkSet) -> Vec<RepUpdate> {
        self.rep_trackers
            .iter_mut()
            .filter_map(|(name, limb)| {
                let joints = match select_joints(landmarks, &limb.landmarks) {
                    Some(joints) => joints,
                    None => {
                        debug!(
                            "Landmarks {:?} not all present for \"{}\"; skip",
                            limb.landmarks, name
                        );
                        return None;
                    }
                };
                let [proximal, vertex, distal] = joints;
                let angle = joint_angle(proximal, vertex, distal);
                let progress = limb.rep_tracker.update(angle);
                let state = limb.rep_tracker.state();

                Some(RepUpdate {
                    tracker: name.clone(),
                    joints,
                    angle,
                    percent: progress.percent,
                    bar: progress.bar,
                    count: state.count(),
                    direction: state.direction,
                    at_extreme: progress.at_extreme,
                })
            })
            .collect()
    }

    /// Reset one named tracker, or all of them. Returns how many were reset.
    pub fn reset_reps(&mut self, tracker: Option<&str>) -> usize {
        match tracker {
            Some(name) => match self.rep_trackers.get_mut(name) {
                Some(limb) => {
                    limb.rep_tracker.reset();
                    1
                }
                None => 0,
            },
            None => {
                for limb in self.rep_trackers.values_mut() {
                    limb.rep_tracker.reset();
                }
                self.rep_trackers.len()
            }
        }
    }
}

fn select_joints(landmarks: &LandmarkSet, triple: &LandmarkTriple) -> Option<[Point2D; 3]> {
    let LandmarkTriple {
        proximal,
        vertex,
        distal,
    } = *triple;
    Some([
        landmarks.get(proximal)?.position(),
        landmarks.get(vertex)?.position(),
        landmarks.get(distal)?.position(),
    ])
}

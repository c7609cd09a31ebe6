use log::{debug, error, info, warn};
use std::{fs, io::ErrorKind};
use tether_agent::{ChannelDefinition, TetherAgent};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::systems::rep_counting::{Calibration, Direction, EXTREME_TOLERANCE_LIMIT};

/// Landmark indices for the three joints of one limb, as numbered by
/// the pose detector (BlazePose / MediaPipe body landmarks).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkTriple {
    /// e.g. shoulder or hip
    pub proximal: usize,
    /// e.g. elbow or knee; the angle is measured here
    pub vertex: usize,
    /// e.g. wrist or ankle
    pub distal: usize,
}

impl LandmarkTriple {
    pub const RIGHT_ARM: LandmarkTriple = LandmarkTriple {
        proximal: 12,
        vertex: 14,
        distal: 16,
    };
    pub const LEFT_ARM: LandmarkTriple = LandmarkTriple {
        proximal: 11,
        vertex: 13,
        distal: 15,
    };
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimbTracker {
    pub name: String,
    pub enabled: bool,
    pub colour: String,
    pub landmarks: LandmarkTriple,
    pub calibration: Calibration,
    pub starting_direction: Direction,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
    pub trackers: Vec<LimbTracker>,

    /// How many percentage points short of 0% / 100% still count as reaching
    /// the extreme. Zero means the percent must be exactly 0 or 100.
    pub extreme_tolerance: f32,

    /// BlazePose world coordinates are y-up; flip them so that angles
    /// match those measured on (y-down) image landmarks
    pub body_frames_flip_y: bool,

    /// Publish the measured frame rate on its own channel
    pub publish_frame_rate: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            trackers: vec![
                LimbTracker {
                    name: String::from("rightArm"),
                    enabled: true,
                    colour: pick_from_palette(0),
                    landmarks: LandmarkTriple::RIGHT_ARM,
                    calibration: Calibration::default(),
                    starting_direction: Direction::Extending,
                },
                LimbTracker {
                    name: String::from("leftArm"),
                    enabled: false,
                    colour: pick_from_palette(1),
                    landmarks: LandmarkTriple::LEFT_ARM,
                    calibration: Calibration::default(),
                    starting_direction: Direction::Extending,
                },
            ],
            extreme_tolerance: 0.,
            body_frames_flip_y: true,
            publish_frame_rate: true,
        }
    }
}

impl BackendConfig {
    pub fn parse_remote_config(&mut self, payload: &[u8]) -> Result<()> {
        match rmp_serde::from_slice::<BackendConfig>(payload) {
            Ok(config) => {
                config.validate()?;
                *self = config;
                Ok(())
            }
            Err(e) => Err(anyhow!("Failed to parse Config from message: {}", e)),
        }
    }

    /// Tracker names must be unique, since they key the rep state, and the
    /// extreme tolerance must leave a gap between the two extremes
    pub fn validate(&self) -> Result<()> {
        if !(0. ..EXTREME_TOLERANCE_LIMIT).contains(&self.extreme_tolerance) {
            return Err(anyhow!(
                "extremeTolerance {} must be at least 0 and below {}",
                self.extreme_tolerance,
                EXTREME_TOLERANCE_LIMIT
            ));
        }
        for (i, tracker) in self.trackers.iter().enumerate() {
            if self.trackers[..i].iter().any(|t| t.name == tracker.name) {
                return Err(anyhow!("Duplicate tracker name \"{}\"", tracker.name));
            }
            let Calibration {
                angle_low,
                angle_high,
                ..
            } = tracker.calibration;
            if angle_low >= angle_high {
                warn!(
                    "Tracker \"{}\" has angleLow {} >= angleHigh {}; percent will only ever be 0 or 100",
                    tracker.name, angle_low, angle_high
                );
            }
        }
        Ok(())
    }

    pub fn write_config_to_file(&self, config_file_path: &str) -> Result<()> {
        debug!("Current state of config: {:?}", self);
        let text = serde_json::to_string_pretty(self)?;
        match fs::write(config_file_path, text) {
            Ok(()) => {
                info!("Wrote config to file: {:?}", config_file_path);
                Ok(())
            }
            Err(e) => {
                error!("Error writing config to file: {:?}", e);
                Err(anyhow!("Failed to write {}: {}", config_file_path, e))
            }
        }
    }

    pub fn get_tracker(&self, name: &str) -> Option<&LimbTracker> {
        self.trackers.iter().find(|&t| t.name.eq(name))
    }

    pub fn trackers(&self) -> &[LimbTracker] {
        &self.trackers
    }

    pub fn enabled_trackers(&self) -> impl Iterator<Item = &LimbTracker> {
        self.trackers.iter().filter(|t| t.enabled)
    }

    /// Apply a percent-mapping range to every tracker, e.g. from the command line
    pub fn override_angle_range(&mut self, angle_low: Option<f32>, angle_high: Option<f32>) {
        for tracker in self.trackers.iter_mut() {
            if let Some(low) = angle_low {
                tracker.calibration.angle_low = low;
            }
            if let Some(high) = angle_high {
                tracker.calibration.angle_high = high;
            }
        }
    }

    pub fn save_and_republish(
        &self,
        tether_agent: &TetherAgent,
        config_output: &ChannelDefinition,
        config_file_path: &str,
    ) -> Result<()> {
        info!("Saving config to disk and re-publishing via Tether...");
        self.write_config_to_file(config_file_path)?;
        self.publish(tether_agent, config_output)
    }

    pub fn publish(
        &self,
        tether_agent: &TetherAgent,
        config_output: &ChannelDefinition,
    ) -> Result<()> {
        let payload = rmp_serde::to_vec_named(self)?;
        tether_agent.send(config_output, Some(&payload))?;
        Ok(())
    }
}

// Right arm yellow, left arm cyan, anything after that magenta
const PALETTE: &[&str] = &["#ffff00", "#00ffff", "#ff00ff"];

fn pick_from_palette(index: usize) -> String {
    let c = PALETTE[index % PALETTE.len()];
    String::from(c)
}

pub fn load_config_from_file(config_file_path: &str) -> Result<BackendConfig> {
    match fs::read_to_string(config_file_path) {
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                warn!(
                    "Rep Counter Config file not found, will use defaults and create one at {}",
                    &config_file_path
                );
                let config = BackendConfig::default();
                debug!("Created init config object {:?}", config);
                config.write_config_to_file(config_file_path)?;
                Ok(config)
            } else {
                Err(anyhow!(
                    "Failed to load Rep Counter Config from disk; error: {:?}",
                    e
                ))
            }
        }
        Ok(s) => {
            info!("Loaded Rep Counter config OK from \"{}\"", config_file_path);
            match serde_json::from_str::<BackendConfig>(&s) {
                Ok(loaded_config) => {
                    debug!("Config parsed data from file: {:?}", &loaded_config);
                    loaded_config.validate()?;
                    Ok(loaded_config)
                }
                Err(e) => Err(anyhow!("Failed to parse config data: {}", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_track_right_arm_only() {
        let config = BackendConfig::default();
        let enabled: Vec<&str> = config.enabled_trackers().map(|t| t.name.as_str()).collect();
        assert_eq!(enabled, vec!["rightArm"]);
        assert_eq!(
            config.get_tracker("leftArm").map(|t| t.landmarks),
            Some(LandmarkTriple::LEFT_ARM)
        );
        assert_eq!(config.extreme_tolerance, 0.);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r##"{
            "trackers": [{
                "name": "rightKnee",
                "enabled": true,
                "colour": "#ff0000",
                "landmarks": { "proximal": 24, "vertex": 26, "distal": 28 },
                "calibration": {
                    "angleLow": 190, "angleHigh": 280,
                    "barAngleLow": 190, "barAngleHigh": 280,
                    "barDisplayLow": 650, "barDisplayHigh": 100
                },
                "startingDirection": "Extending"
            }]
        }"##;
        let config: BackendConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.trackers.len(), 1);
        assert_eq!(config.trackers[0].landmarks.vertex, 26);
        assert_eq!(config.trackers[0].calibration.angle_high, 280.);
        assert!(config.body_frames_flip_y);
        assert!(config.publish_frame_rate);
    }

    #[test]
    fn test_duplicate_tracker_names_rejected() {
        let mut config = BackendConfig::default();
        config.trackers[1].name = String::from("rightArm");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extreme_tolerance_out_of_range_rejected() {
        for tolerance in [50., 60., -1., f32::NAN] {
            let config = BackendConfig {
                extreme_tolerance: tolerance,
                ..BackendConfig::default()
            };
            assert!(config.validate().is_err(), "{tolerance}");
        }
        let config = BackendConfig {
            extreme_tolerance: 49.5,
            ..BackendConfig::default()
        };
        assert!(config.validate().is_ok());

        let mut current = BackendConfig::default();
        let remote = BackendConfig {
            extreme_tolerance: 60.,
            ..BackendConfig::default()
        };
        let payload = rmp_serde::to_vec_named(&remote).unwrap();
        assert!(current.parse_remote_config(&payload).is_err());
        assert_eq!(current.extreme_tolerance, 0.);
    }

    #[test]
    fn test_remote_config_replaces_only_when_valid() {
        let mut config = BackendConfig::default();

        let mut remote = BackendConfig::default();
        remote.extreme_tolerance = 1.5;
        let payload = rmp_serde::to_vec_named(&remote).unwrap();
        config.parse_remote_config(&payload).unwrap();
        assert_eq!(config.extreme_tolerance, 1.5);

        assert!(config.parse_remote_config(&[0xc1, 0x00]).is_err());
        assert_eq!(config.extreme_tolerance, 1.5);
    }

    #[test]
    fn test_override_angle_range() {
        let mut config = BackendConfig::default();
        config.override_angle_range(Some(200.), None);
        for t in config.trackers() {
            assert_eq!(t.calibration.angle_low, 200.);
            assert_eq!(t.calibration.angle_high, 310.);
        }
    }

    #[test]
    fn test_missing_file_creates_defaults() {
        let path = std::env::temp_dir().join(format!("reps-config-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        let _ = fs::remove_file(path);

        let config = load_config_from_file(path).unwrap();
        assert_eq!(config, BackendConfig::default());

        let reloaded = load_config_from_file(path).unwrap();
        assert_eq!(reloaded, config);
        fs::remove_file(path).unwrap();
    }
}

use anyhow::Result;
use log::{debug, error, info, warn};
use tether_agent::{ChannelDefinition, ChannelOptionsBuilder, TetherAgent};

use crate::{
    backend_config::BackendConfig,
    systems::{Feed, Systems},
    tracking::{LandmarkSet, RepUpdate, ResetRepsMessage},
};

pub struct Outputs {
    pub config_output: ChannelDefinition,
    pub rep_state_output: ChannelDefinition,
    pub frame_rate_output: ChannelDefinition,
}

impl Outputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Result<Outputs> {
        let config_output = ChannelOptionsBuilder::create_sender("provideRepCounterConfig")
            .qos(Some(2))
            .retain(Some(true))
            .build(tether_agent)?;

        // One message per tracker per processed frame
        let rep_state_output = ChannelOptionsBuilder::create_sender("repState")
            .qos(Some(0))
            .build(tether_agent)?;

        let frame_rate_output = ChannelOptionsBuilder::create_sender("frameRate")
            .qos(Some(0))
            .build(tether_agent)?;

        Ok(Outputs {
            config_output,
            rep_state_output,
            frame_rate_output,
        })
    }
}

pub struct Inputs {
    pub pose_landmarks_input: ChannelDefinition,
    pub body_frames_input: ChannelDefinition,
    pub save_config_input: ChannelDefinition,
    pub reset_reps_input: ChannelDefinition,
}

impl Inputs {
    pub fn new(tether_agent: &mut TetherAgent) -> Result<Inputs> {
        let pose_landmarks_input = ChannelOptionsBuilder::create_receiver("poseLandmarks")
            .qos(Some(0))
            .build(tether_agent)?;
        let body_frames_input = ChannelOptionsBuilder::create_receiver("bodyFrames")
            .qos(Some(0))
            .build(tether_agent)?;
        let save_config_input = ChannelOptionsBuilder::create_receiver("saveRepCounterConfig")
            .qos(Some(2))
            .build(tether_agent)?;
        let reset_reps_input = ChannelOptionsBuilder::create_receiver("resetReps")
            .qos(Some(2))
            .build(tether_agent)?;

        Ok(Inputs {
            pose_landmarks_input,
            body_frames_input,
            save_config_input,
            reset_reps_input,
        })
    }
}

/// Count one incoming frame on its feed and, if a body was detected in it,
/// run it through the rep trackers and publish the results.
pub fn handle_landmarks_message(
    feed: Feed,
    detected: Option<LandmarkSet>,
    config: &BackendConfig,
    tether_agent: &TetherAgent,
    systems: &mut Systems,
    outputs: &Outputs,
) {
    let Outputs {
        rep_state_output,
        frame_rate_output,
        ..
    } = outputs;

    let fps = systems.tick_frame_rate(feed);
    if config.publish_frame_rate {
        if let Some(fps) = fps {
            publish(tether_agent, frame_rate_output, &fps);
        }
    }

    if let Some(landmarks) = detected {
        for update in process_frame(systems, &landmarks) {
            publish(tether_agent, rep_state_output, &update);
        }
    }
}

/// The per-frame pipeline shared by the live loop and replays
pub fn process_frame(systems: &mut Systems, landmarks: &LandmarkSet) -> Vec<RepUpdate> {
    let updates = systems.process_landmarks(landmarks);
    for update in updates.iter() {
        debug!(
            "{}: {:.0} deg, {:.0}%, count {}",
            update.tracker, update.angle, update.percent, update.count
        );
    }
    updates
}

pub fn handle_save_message(
    payload: &[u8],
    config: &mut BackendConfig,
    tether_agent: &TetherAgent,
    systems: &mut Systems,
    outputs: &Outputs,
    config_file_path: &str,
) -> Result<()> {
    config.parse_remote_config(payload)?;
    info!("Remote-provided config parsed OK; update trackers, save to disk and (re) publish");
    systems.apply_config(config);
    config.save_and_republish(tether_agent, &outputs.config_output, config_file_path)
}

pub fn handle_reset_message(payload: &[u8], systems: &mut Systems) {
    // An empty payload is a plain "reset everything"
    let command = if payload.is_empty() {
        ResetRepsMessage::default()
    } else {
        match rmp_serde::from_slice::<ResetRepsMessage>(payload) {
            Ok(command) => command,
            Err(e) => {
                error!("Failed to parse reset command: {}", e);
                return;
            }
        }
    };

    let reset_count = systems.reset_reps(command.tracker.as_deref());
    if reset_count == 0 {
        warn!("Reset requested for unknown tracker {:?}", command.tracker);
    } else {
        info!("Reset {} rep tracker(s)", reset_count);
    }
}

fn publish<T: serde::Serialize>(
    tether_agent: &TetherAgent,
    channel: &ChannelDefinition,
    value: &T,
) {
    match rmp_serde::to_vec_named(value) {
        Ok(payload) => {
            if let Err(e) = tether_agent.send(channel, Some(&payload)) {
                error!("Failed to publish: {}", e);
            }
        }
        Err(e) => error!("Failed to encode message: {}", e),
    }
}

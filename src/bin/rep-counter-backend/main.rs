use anyhow::Result;
use clap::Parser;
use cli::Cli;

use env_logger::Env;
use log::{debug, error, info};
use std::thread;
use std::time::Duration;
use tether_agent::TetherAgentOptionsBuilder;

use tether_rep_counter::backend_config::{load_config_from_file, BackendConfig};
use tether_rep_counter::landmark_source::LandmarkSource;
use tether_rep_counter::replay::{load_recording, replay_frames};
use tether_rep_counter::systems::{Feed, Systems};
use tether_rep_counter::tether_interface::{
    handle_landmarks_message, handle_reset_message, handle_save_message, Inputs, Outputs,
};

mod cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("tether_agent", log::LevelFilter::Warn)
        .filter_module("rumqttc", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let mut config = load_config_from_file(&cli.config_path)?;

    if cli.angle_low.is_some() || cli.angle_high.is_some() {
        info!(
            "Angle range override from command line: low {:?}, high {:?}",
            cli.angle_low, cli.angle_high
        );
        config.override_angle_range(cli.angle_low, cli.angle_high);
        config.validate()?;
    }

    let mut systems = Systems::new(&config);
    info!(
        "Tracking {} limb(s): {:?}",
        systems.rep_trackers.len(),
        systems.rep_trackers.keys().collect::<Vec<_>>()
    );

    match &cli.replay_path {
        Some(path) => run_replay(path, &mut systems),
        None => run_tether(&cli, config, systems),
    }
}

fn run_replay(path: &str, systems: &mut Systems) -> Result<()> {
    let frames = load_recording(path)?;
    let summary = replay_frames(systems, &frames);

    info!(
        "Replayed {} frames ({} without a body)",
        summary.frames, summary.frames_without_body
    );
    for (tracker, count) in summary.counts.iter() {
        info!("{}: {} reps (count {})", tracker, count.floor(), count);
    }
    Ok(())
}

fn run_tether(cli: &Cli, mut config: BackendConfig, mut systems: Systems) -> Result<()> {
    let mut tether_agent = TetherAgentOptionsBuilder::new(&cli.agent_role)
        .id(Some(&cli.agent_group))
        .host(Some(&cli.tether_host.to_string()))
        .username(cli.tether_username.as_deref())
        .password(cli.tether_password.as_deref())
        .build()?;

    let inputs = Inputs::new(&mut tether_agent)?;
    let outputs = Outputs::new(&mut tether_agent)?;

    // Always publish on first start/load...
    config.publish(&tether_agent, &outputs.config_output)?;

    loop {
        let mut work_done = false;

        if let Some((topic, payload)) = tether_agent.check_messages() {
            work_done = true;

            if inputs.pose_landmarks_input.matches(&topic) {
                let detected = systems.pose_landmarks_source.detect(&payload);
                handle_landmarks_message(
                    Feed::PoseLandmarks,
                    detected,
                    &config,
                    &tether_agent,
                    &mut systems,
                    &outputs,
                );
            }

            if inputs.body_frames_input.matches(&topic) {
                let detected = systems.body_frame_source.detect(&payload);
                handle_landmarks_message(
                    Feed::BodyFrames,
                    detected,
                    &config,
                    &tether_agent,
                    &mut systems,
                    &outputs,
                );
            }

            if inputs.save_config_input.matches(&topic) {
                if let Err(e) = handle_save_message(
                    &payload,
                    &mut config,
                    &tether_agent,
                    &mut systems,
                    &outputs,
                    &cli.config_path,
                ) {
                    error!("Remote config was not applied: {}", e);
                }
            }

            if inputs.reset_reps_input.matches(&topic) {
                handle_reset_message(&payload, &mut systems);
            }
        }

        if !work_done {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

//! # Rep Counter Frontend
//!
//! A viewer for the rep counter backend. It does no pose or angle processing of its own: it
//! subscribes to the `repState` messages the backend publishes and draws, per tracked limb, the
//! three joints with their angle, the completion bar and percent, and the rep count.
//!
//! Both processes share the message types from the library, so the two ends stay in sync.
//!
use anyhow::anyhow;
use clap::Parser;

use cli::Cli;
use env_logger::Env;
use log::debug;
use model::Model;

mod cli;
mod model;
mod ui;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize the logger from the environment

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("tether_agent", log::LevelFilter::Warn)
        .filter_module("rumqttc", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .init();

    debug!("Started; args: {:?}", cli);

    let model = Model::new(&cli)?;

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 960.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Tether Rep Counter",
        options,
        Box::new(move |_cc| Box::new(model)),
    )
    .map_err(|e| anyhow!("Rep Counter Frontend exited with error: {}", e))
}

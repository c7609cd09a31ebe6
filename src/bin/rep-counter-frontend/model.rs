use anyhow::Result;
use indexmap::IndexMap;
use log::{error, info, warn};
use tether_agent::{
    ChannelDefinition, ChannelOptionsBuilder, TetherAgent, TetherAgentOptionsBuilder,
};
use tether_rep_counter::{
    backend_config::BackendConfig,
    tracking::{RepUpdate, ResetRepsMessage},
};

use crate::{cli::Cli, ui::render_ui};

pub struct Inputs {
    pub config_input: ChannelDefinition,
    pub rep_state_input: ChannelDefinition,
    pub frame_rate_input: ChannelDefinition,
}

pub struct Outputs {
    pub reset_reps: ChannelDefinition,
}

pub struct Model {
    pub tether_agent: TetherAgent,
    pub inputs: Inputs,
    pub outputs: Outputs,
    pub backend_config: Option<BackendConfig>,
    /// Latest update per tracker, in the order they first appeared
    pub rep_updates: IndexMap<String, RepUpdate>,
    pub frame_rate: Option<f32>,
    pub point_size: f32,
    pub show_graph_labels: bool,
}

impl Model {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut tether_agent = TetherAgentOptionsBuilder::new("repCounterFrontend")
            .host(Some(&cli.tether_host.to_string()))
            .username(cli.tether_username.as_deref())
            .password(cli.tether_password.as_deref())
            .build()?;

        let inputs = Inputs {
            config_input: ChannelOptionsBuilder::create_receiver("provideRepCounterConfig")
                .qos(Some(2))
                .build(&mut tether_agent)?,
            rep_state_input: ChannelOptionsBuilder::create_receiver("repState")
                .qos(Some(0))
                .build(&mut tether_agent)?,
            frame_rate_input: ChannelOptionsBuilder::create_receiver("frameRate")
                .qos(Some(0))
                .build(&mut tether_agent)?,
        };

        let outputs = Outputs {
            reset_reps: ChannelOptionsBuilder::create_sender("resetReps")
                .qos(Some(2))
                .build(&mut tether_agent)?,
        };

        info!("Rep Counter Frontend started OK");

        Ok(Model {
            tether_agent,
            inputs,
            outputs,
            backend_config: None,
            rep_updates: IndexMap::new(),
            frame_rate: None,
            point_size: 8.0,
            show_graph_labels: true,
        })
    }

    pub fn check_messages(&mut self) {
        while let Some((topic, payload)) = self.tether_agent.check_messages() {
            if self.inputs.config_input.matches(&topic) {
                match rmp_serde::from_slice::<BackendConfig>(&payload) {
                    Ok(config) => {
                        info!("Received backend config");
                        // Forget limbs that are no longer tracked
                        self.rep_updates
                            .retain(|name, _| config.enabled_trackers().any(|t| &t.name == name));
                        self.backend_config = Some(config);
                    }
                    Err(e) => error!("Failed to parse backend config: {}", e),
                }
            }

            if self.inputs.rep_state_input.matches(&topic) {
                match rmp_serde::from_slice::<RepUpdate>(&payload) {
                    Ok(update) => {
                        self.rep_updates.insert(update.tracker.clone(), update);
                    }
                    Err(e) => warn!("Failed to parse rep state: {}", e),
                }
            }

            if self.inputs.frame_rate_input.matches(&topic) {
                if let Ok(fps) = rmp_serde::from_slice::<f32>(&payload) {
                    self.frame_rate = Some(fps);
                }
            }
        }
    }

    /// Ask the backend to reset one tracker, or all of them
    pub fn request_reset(&self, tracker: Option<&str>) {
        let command = ResetRepsMessage {
            tracker: tracker.map(String::from),
        };
        match rmp_serde::to_vec_named(&command) {
            Ok(payload) => {
                if let Err(e) = self
                    .tether_agent
                    .send(&self.outputs.reset_reps, Some(&payload))
                {
                    error!("Failed to send reset request: {}", e);
                }
            }
            Err(e) => error!("Failed to encode reset request: {}", e),
        }
    }
}

impl eframe::App for Model {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_messages();
        render_ui(ctx, self);
        ctx.request_repaint();
    }
}

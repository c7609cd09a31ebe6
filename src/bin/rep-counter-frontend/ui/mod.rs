mod info;
mod limb_graph;
mod rep_bar;
mod vis_settings;

use colorsys::Rgb;
use egui::Color32;

use info::render_info;
use limb_graph::render_limb_graph;
use rep_bar::render_rep_bar;
use vis_settings::render_vis_settings;

use crate::model::Model;

pub const SPACING_AMOUNT: f32 = 16.0;

pub fn render_ui(ctx: &egui::Context, model: &mut Model) {
    egui::SidePanel::left("settings").show(ctx, |ui| {
        ui.add_space(SPACING_AMOUNT);
        render_vis_settings(model, ui);

        ui.separator();
        render_info(model, ui);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        let model: &Model = model;
        if model.rep_updates.is_empty() {
            ui.heading("Waiting for pose landmarks...");
            return;
        }
        for update in model.rep_updates.values() {
            ui.heading(&update.tracker);
            ui.horizontal(|ui| {
                render_limb_graph(model, update, ui);
                ui.add_space(SPACING_AMOUNT);
                render_rep_bar(model, update, ui);
            });
            ui.separator();
        }
    });
}

/// The tracker's configured colour, or grey until the config arrives
pub fn tracker_colour(model: &Model, tracker: &str) -> Color32 {
    model
        .backend_config
        .as_ref()
        .and_then(|config| config.get_tracker(tracker))
        .and_then(|t| Rgb::from_hex_str(&t.colour).ok())
        .map(|rgb| {
            let [r, g, b]: [u8; 3] = rgb.into();
            Color32::from_rgb(r, g, b)
        })
        .unwrap_or(Color32::LIGHT_GRAY)
}

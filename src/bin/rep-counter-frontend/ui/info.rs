use egui::{Grid, RichText, Ui};

use crate::model::Model;

pub fn render_info(model: &mut Model, ui: &mut Ui) {
    ui.heading("Session");

    ui.horizontal(|ui| {
        ui.label("Frame rate:");
        match model.frame_rate {
            Some(fps) => ui.label(format!("{:.0} fps", fps)),
            None => ui.label("-"),
        };
    });

    match &model.backend_config {
        None => {
            ui.label("No config received (yet)");
        }
        Some(config) => {
            ui.label(format!(
                "Extremes must be reached {}",
                if config.extreme_tolerance > 0. {
                    format!("within {:.1}%", config.extreme_tolerance)
                } else {
                    String::from("exactly")
                }
            ));
        }
    }

    ui.separator();

    let mut reset_request: Option<Option<String>> = None;

    Grid::new("reps_grid").show(ui, |ui| {
        for (name, update) in model.rep_updates.iter() {
            ui.label(RichText::new(name).strong());
            ui.label(format!("{} reps", update.count));
            ui.label(format!("{:?}", update.direction));
            if ui.button("Reset").clicked() {
                reset_request = Some(Some(name.clone()));
            }
            ui.end_row();
        }
    });

    if !model.rep_updates.is_empty() && ui.button("Reset all").clicked() {
        reset_request = Some(None);
    }

    if let Some(tracker) = reset_request {
        model.request_reset(tracker.as_deref());
    }
}

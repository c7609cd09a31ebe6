use egui::{
    plot::{Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text},
    Color32, Ui,
};
use tether_rep_counter::tracking::RepUpdate;

use crate::model::Model;

use super::tracker_colour;

pub fn render_limb_graph(model: &Model, update: &RepUpdate, ui: &mut Ui) {
    let limb_plot = Plot::new(format!("limb_{}", update.tracker))
        .data_aspect(1.0)
        .width(480.)
        .height(360.)
        .include_x(0.)
        .include_y(0.);

    // Landmarks are in image coordinates (y-down); plots are y-up
    let joints: Vec<[f64; 2]> = update
        .joints
        .iter()
        .map(|(x, y)| [*x as f64, -*y as f64])
        .collect();
    let [_proximal, (vertex_x, vertex_y), _distal] = update.joints;

    let colour = tracker_colour(model, &update.tracker);

    limb_plot.show(ui, |plot_ui| {
        plot_ui.line(
            Line::new(PlotPoints::new(joints.clone()))
                .color(colour)
                .width(3.0),
        );
        plot_ui.points(
            Points::new(PlotPoints::new(joints))
                .filled(true)
                .radius(model.point_size)
                .shape(MarkerShape::Circle)
                .color(Color32::RED),
        );
        if model.show_graph_labels {
            plot_ui.text(
                Text::new(
                    PlotPoint::new(vertex_x, -vertex_y),
                    format!("{:.0}°", update.angle),
                )
                .color(Color32::WHITE),
            );
        }
    });
}

use egui::{pos2, vec2, Color32, Rect, RichText, Sense, Stroke, Ui, Vec2};
use tether_rep_counter::{systems::rep_counting::Calibration, tracking::RepUpdate};

use crate::model::Model;

const BAR_SIZE: Vec2 = vec2(75., 300.);
const IN_PROGRESS_COLOUR: Color32 = Color32::from_rgb(255, 0, 255);

pub fn render_rep_bar(model: &Model, update: &RepUpdate, ui: &mut Ui) {
    let colour = if update.at_extreme {
        Color32::GREEN
    } else {
        IN_PROGRESS_COLOUR
    };
    let calibration = model
        .backend_config
        .as_ref()
        .and_then(|config| config.get_tracker(&update.tracker))
        .map(|t| &t.calibration);
    let fill = bar_fill_fraction(calibration, update);

    ui.vertical(|ui| {
        ui.label(
            RichText::new(format!("{} %", update.percent as i32))
                .size(32.)
                .color(colour),
        );

        let (rect, _response) = ui.allocate_exact_size(BAR_SIZE, Sense::hover());
        let painter = ui.painter();
        painter.rect_stroke(rect, 0., Stroke::new(3., colour));
        let top = rect.bottom() - rect.height() * fill;
        painter.rect_filled(
            Rect::from_min_max(pos2(rect.left(), top), rect.max),
            0.,
            colour,
        );

        // Whole reps only; the half-rep shows up as the bar colour
        ui.label(
            RichText::new(format!("{}", update.count as u32))
                .size(96.)
                .color(Color32::LIGHT_BLUE),
        );
    });
}

/// How much of the bar to fill (0..1), taken from the bar level and the
/// tracker's bar display range. Without a config, fall back to the percent.
fn bar_fill_fraction(calibration: Option<&Calibration>, update: &RepUpdate) -> f32 {
    match calibration {
        Some(c) if c.bar_display_low != c.bar_display_high => ((update.bar - c.bar_display_low)
            / (c.bar_display_high - c.bar_display_low))
            .clamp(0., 1.),
        _ => (update.percent / 100.).clamp(0., 1.),
    }
}

#[cfg(test)]
mod tests {
    use tether_rep_counter::systems::rep_counting::Direction;

    use super::*;

    fn update_with(percent: f32, bar: f32) -> RepUpdate {
        RepUpdate {
            tracker: String::from("rightArm"),
            joints: [(0., 0.), (1., 0.), (2., 0.)],
            angle: 180.,
            percent,
            bar,
            count: 0.,
            direction: Direction::Extending,
            at_extreme: false,
        }
    }

    #[test]
    fn test_inverted_display_range_fills_upwards() {
        let calibration = Calibration::default();
        assert_eq!(bar_fill_fraction(Some(&calibration), &update_with(0., 650.)), 0.);
        assert_eq!(bar_fill_fraction(Some(&calibration), &update_with(100., 100.)), 1.);
        let half = bar_fill_fraction(Some(&calibration), &update_with(50., 375.));
        assert!((half - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_falls_back_to_percent() {
        assert_eq!(bar_fill_fraction(None, &update_with(25., 0.)), 0.25);
    }
}

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::geometry_utils::interp_clamped;

/// Which extreme of the movement was most recently confirmed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Last confirmed at 0%; waiting for the limb to reach 100%
    #[default]
    Extending,
    /// Last confirmed at 100%; waiting for the limb to return to 0%
    Flexing,
}

/// Angle ranges used to turn a joint angle into a completion percentage
/// and a (presentational) bar level.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    /// Angle (degrees) that maps to 0%
    pub angle_low: f32,
    /// Angle (degrees) that maps to 100%
    pub angle_high: f32,
    pub bar_angle_low: f32,
    pub bar_angle_high: f32,
    /// Bar level at `bar_angle_low`; may be greater than `bar_display_high`
    pub bar_display_low: f32,
    pub bar_display_high: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            angle_low: 210.,
            angle_high: 310.,
            bar_angle_low: 220.,
            bar_angle_high: 310.,
            bar_display_low: 650.,
            bar_display_high: 100.,
        }
    }
}

impl Calibration {
    pub fn percent(&self, angle: f32) -> f32 {
        interp_clamped(angle, (self.angle_low, self.angle_high), (0., 100.))
    }

    pub fn bar(&self, angle: f32) -> f32 {
        interp_clamped(
            angle,
            (self.bar_angle_low, self.bar_angle_high),
            (self.bar_display_low, self.bar_display_high),
        )
    }
}

/// Tolerances at or above this would let a single percent sit at both
/// extremes at once, flipping direction (and counting) on every frame.
pub const EXTREME_TOLERANCE_LIMIT: f32 = 50.;

/// Keep a tolerance inside `[0, EXTREME_TOLERANCE_LIMIT)`
pub fn clamp_extreme_tolerance(extreme_tolerance: f32) -> f32 {
    if extreme_tolerance >= EXTREME_TOLERANCE_LIMIT {
        warn!(
            "Extreme tolerance {} is too wide; using {}",
            extreme_tolerance,
            EXTREME_TOLERANCE_LIMIT - 1.
        );
        EXTREME_TOLERANCE_LIMIT - 1.
    } else {
        // also maps NaN to 0
        extreme_tolerance.max(0.)
    }
}

/// Direction flag plus count, stored as whole half-reps so that the
/// 0.5 increments stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepState {
    pub direction: Direction,
    half_reps: u32,
}

impl RepState {
    pub fn new(direction: Direction) -> Self {
        RepState {
            direction,
            half_reps: 0,
        }
    }

    pub fn count(&self) -> f32 {
        self.half_reps as f32 / 2.
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub percent: f32,
    pub bar: f32,
    /// The limb is at a calibrated extreme this frame, whether or not
    /// that extreme was counted
    pub at_extreme: bool,
}

/// Advance the rep state by one frame.
///
/// With `extreme_tolerance` at 0 the percent must hit exactly 0 or 100 (which
/// the clamped interpolation guarantees past the calibrated range) for a
/// half-rep to count. A positive tolerance widens both extremes by that
/// many percentage points.
pub fn update(
    state: &RepState,
    angle: f32,
    calibration: &Calibration,
    extreme_tolerance: f32,
) -> (RepState, Progress) {
    let percent = calibration.percent(angle);
    let bar = calibration.bar(angle);

    let at_full = percent >= 100. - extreme_tolerance;
    let at_zero = percent <= extreme_tolerance;

    let mut next = *state;
    match state.direction {
        Direction::Extending if at_full => {
            next.direction = Direction::Flexing;
            next.half_reps += 1;
        }
        Direction::Flexing if at_zero => {
            next.direction = Direction::Extending;
            next.half_reps += 1;
        }
        _ => {}
    }

    (
        next,
        Progress {
            percent,
            bar,
            at_extreme: at_full || at_zero,
        },
    )
}

/// Owns the rep state for one limb, for the lifetime of the session.
pub struct RepTracker {
    calibration: Calibration,
    extreme_tolerance: f32,
    starting_direction: Direction,
    state: RepState,
}

impl RepTracker {
    pub fn new(
        calibration: Calibration,
        starting_direction: Direction,
        extreme_tolerance: f32,
    ) -> Self {
        RepTracker {
            calibration,
            extreme_tolerance: clamp_extreme_tolerance(extreme_tolerance),
            starting_direction,
            state: RepState::new(starting_direction),
        }
    }

    pub fn update(&mut self, angle: f32) -> Progress {
        let (next, progress) = update(
            &self.state,
            angle,
            &self.calibration,
            self.extreme_tolerance,
        );
        if next != self.state {
            debug!(
                "Half-rep confirmed at {:.0}%; now {:?}, count {}",
                progress.percent,
                next.direction,
                next.count()
            );
        }
        self.state = next;
        progress
    }

    pub fn reset(&mut self) {
        info!("Reset rep count (was {})", self.state.count());
        self.state = RepState::new(self.starting_direction);
    }

    pub fn state(&self) -> &RepState {
        &self.state
    }

    /// Swap in new settings while keeping the current count and direction
    pub fn recalibrate(&mut self, calibration: Calibration, extreme_tolerance: f32) {
        self.calibration = calibration;
        self.extreme_tolerance = clamp_extreme_tolerance(extreme_tolerance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Angle that maps to the given percent under the default calibration
    fn angle_for(percent: f32) -> f32 {
        210. + percent
    }

    #[test]
    fn test_full_cycle() {
        let calibration = Calibration::default();
        let mut state = RepState::new(Direction::Extending);
        let mut counts = Vec::new();

        for p in [0., 50., 100., 50., 0.] {
            let (next, progress) = update(&state, angle_for(p), &calibration, 0.);
            assert_eq!(progress.percent, p);
            state = next;
            counts.push(state.count());
        }

        assert_eq!(counts, vec![0., 0., 0.5, 0.5, 1.0]);
        assert_eq!(state.direction, Direction::Extending);
    }

    #[test]
    fn test_near_extremes_do_not_count() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        for _ in 0..20 {
            for p in [95., 99., 97., 99.9, 95.] {
                tracker.update(angle_for(p));
            }
        }
        assert_eq!(tracker.state().count(), 0.);
        assert_eq!(tracker.state().direction, Direction::Extending);
    }

    #[test]
    fn test_count_never_decreases_and_steps_by_half() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        let angles = [
            0., 215., 400., 310., 311., 180., 209., 250., 359., 90., 320., 100., 205.,
        ];
        let mut previous = tracker.state().count();
        for angle in angles {
            tracker.update(angle);
            let count = tracker.state().count();
            assert!(count == previous || count == previous + 0.5);
            previous = count;
        }
        assert_eq!(previous, 3.0);
    }

    #[test]
    fn test_repeated_extreme_counts_once() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        for _ in 0..10 {
            tracker.update(330.);
        }
        assert_eq!(tracker.state().count(), 0.5);
        assert_eq!(tracker.state().direction, Direction::Flexing);
    }

    #[test]
    fn test_out_of_calibration_clamps() {
        let calibration = Calibration::default();
        let (state, progress) = update(
            &RepState::default(),
            calibration.angle_low - 50.,
            &calibration,
            0.,
        );
        assert_eq!(progress.percent, 0.);
        assert_eq!(progress.bar, 650.);
        assert!(progress.at_extreme);
        // Starting Extending, reaching 0% is not a transition
        assert_eq!(state.count(), 0.);

        let (_, progress) = update(&state, calibration.angle_high + 50., &calibration, 0.);
        assert_eq!(progress.percent, 100.);
        assert_eq!(progress.bar, 100.);
    }

    #[test]
    fn test_starting_flexed() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Flexing, 0.);
        tracker.update(angle_for(100.));
        assert_eq!(tracker.state().count(), 0.);
        tracker.update(angle_for(0.));
        assert_eq!(tracker.state().count(), 0.5);
        assert_eq!(tracker.state().direction, Direction::Extending);
    }

    #[test]
    fn test_tolerance_band() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 2.);
        tracker.update(angle_for(97.));
        assert_eq!(tracker.state().count(), 0.);
        tracker.update(angle_for(98.5));
        assert_eq!(tracker.state().count(), 0.5);
        tracker.update(angle_for(1.5));
        assert_eq!(tracker.state().count(), 1.0);
    }

    #[test]
    fn test_wide_tolerance_never_counts_while_held_midway() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 60.);
        for _ in 0..4 {
            tracker.update(angle_for(50.));
        }
        assert_eq!(tracker.state().count(), 0.);
        assert_eq!(tracker.state().direction, Direction::Extending);

        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        tracker.recalibrate(Calibration::default(), 50.);
        for _ in 0..4 {
            tracker.update(angle_for(50.));
        }
        assert_eq!(tracker.state().count(), 0.);
    }

    #[test]
    fn test_clamp_extreme_tolerance() {
        assert_eq!(clamp_extreme_tolerance(-3.), 0.);
        assert_eq!(clamp_extreme_tolerance(f32::NAN), 0.);
        assert_eq!(clamp_extreme_tolerance(2.5), 2.5);
        assert!(clamp_extreme_tolerance(50.) < EXTREME_TOLERANCE_LIMIT);
        assert!(clamp_extreme_tolerance(1000.) < EXTREME_TOLERANCE_LIMIT);
    }

    #[test]
    fn test_reset_restores_starting_direction() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        tracker.update(angle_for(100.));
        assert_eq!(tracker.state().direction, Direction::Flexing);
        tracker.reset();
        assert_eq!(tracker.state(), &RepState::new(Direction::Extending));
    }

    #[test]
    fn test_recalibrate_keeps_count() {
        let mut tracker = RepTracker::new(Calibration::default(), Direction::Extending, 0.);
        tracker.update(angle_for(100.));
        tracker.recalibrate(
            Calibration {
                angle_low: 50.,
                angle_high: 150.,
                ..Calibration::default()
            },
            0.,
        );
        assert_eq!(tracker.state().count(), 0.5);
        tracker.update(40.);
        assert_eq!(tracker.state().count(), 1.0);
    }
}

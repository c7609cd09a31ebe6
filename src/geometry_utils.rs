use map_range::MapRange;

use crate::Point2D;

/// Return the angle (in degrees) swept at the `vertex` from the ray
/// vertex->`proximal` to the ray vertex->`distal`, always in the range [0,360).
///
/// This is a signed sweep, not the interior angle: swapping `proximal` and
/// `distal` gives `360 - angle` (mod 360). Collinear or coincident points are
/// not rejected; they produce 0 or 180.
pub fn joint_angle(proximal: Point2D, vertex: Point2D, distal: Point2D) -> f32 {
    let (x1, y1) = proximal;
    let (x2, y2) = vertex;
    let (x3, y3) = distal;

    let angle_rad = (y3 - y2).atan2(x3 - x2) - (y1 - y2).atan2(x1 - x2);

    normalise_degrees(angle_rad.to_degrees())
}

/// Wrap an angle in the range [-360,360] into [0,360).
///
/// In f32, a tiny negative angle plus 360 rounds to exactly 360.0,
/// so that case has to be folded back to zero as well.
fn normalise_degrees(angle_deg: f32) -> f32 {
    let wrapped = if angle_deg < 0. {
        angle_deg + 360.
    } else {
        angle_deg
    };
    if wrapped >= 360. {
        wrapped - 360.
    } else {
        wrapped
    }
}

/// Linear interpolation of `value` from the `from` range (low, high) into the
/// `to` range (low, high), clamped at both ends: anything at or below `from.0`
/// gives exactly `to.0`, anything at or above `from.1` gives exactly `to.1`.
///
/// The output range may be inverted (e.g. 650 -> 100 for a bar drawn in screen
/// coordinates).
pub fn interp_clamped(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (from_low, from_high) = from;
    let (to_low, to_high) = to;

    if value <= from_low {
        to_low
    } else if value >= from_high {
        to_high
    } else {
        value.map_range(from_low..from_high, to_low..to_high)
    }
}

use serde::{Deserialize, Serialize};

use crate::{systems::rep_counting::Direction, Point2D};

/// A single body joint position in frame pixel coordinates.
///
/// MessagePack encodes this as the array `[id, x, y]`, which is the same
/// shape as the landmark lists produced by common pose detectors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub id: usize,
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(id: usize, x: f32, y: f32) -> Self {
        Landmark { id, x, y }
    }

    pub fn position(&self) -> Point2D {
        (self.x, self.y)
    }
}

/// All landmarks detected in one frame. Empty if no body was found.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        LandmarkSet { landmarks }
    }

    pub fn get(&self, id: usize) -> Option<&Landmark> {
        // Detectors normally emit landmarks in index order, so try that first
        match self.landmarks.get(id) {
            Some(lm) if lm.id == id => Some(lm),
            _ => self.landmarks.iter().find(|lm| lm.id == id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Keypoint3D {
    pub i: usize,
    pub xyz: (f32, f32, f32),
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
/// As per tether-oakd-blazepose tracking
pub struct Body3D {
    pub body_xyz: (f32, f32, f32),
    pub kp: Vec<Keypoint3D>,
}

/// As per tether-oakd-blazepose tracking
pub type BodyFrame3D = Vec<Body3D>;

/// Everything a display needs to draw one tracked limb for one frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepUpdate {
    pub tracker: String,
    /// Proximal, vertex, distal
    pub joints: [Point2D; 3],
    pub angle: f32,
    pub percent: f32,
    pub bar: f32,
    pub count: f32,
    pub direction: Direction,
    pub at_extreme: bool,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ResetRepsMessage {
    /// Reset only the named tracker; all of them if omitted
    pub tracker: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_id_in_order() {
        let set = LandmarkSet::new((0..33).map(|i| Landmark::new(i, i as f32, 0.)).collect());
        assert_eq!(set.get(14).map(|lm| lm.x), Some(14.));
        assert!(set.get(33).is_none());
    }

    #[test]
    fn test_get_by_id_sparse() {
        let set = LandmarkSet::new(vec![
            Landmark::new(16, 3., 3.),
            Landmark::new(12, 1., 1.),
            Landmark::new(14, 2., 2.),
        ]);
        assert_eq!(set.get(12).map(|lm| lm.position()), Some((1., 1.)));
        assert_eq!(set.get(16).map(|lm| lm.position()), Some((3., 3.)));
        assert!(set.get(0).is_none());
    }

    #[test]
    fn test_landmark_msgpack_is_array() {
        let payload = rmp_serde::to_vec(&Landmark::new(12, 640., 360.)).unwrap();
        let as_tuple: (usize, f32, f32) = rmp_serde::from_slice(&payload).unwrap();
        assert_eq!(as_tuple, (12, 640., 360.));
    }
}

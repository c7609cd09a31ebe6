//! Anything that can turn a frame into body landmarks.
//!
//! The rep counting itself never looks at frames; it only needs a
//! [`LandmarkSet`] with stable ids for the joints it tracks. Each pose
//! backend is wrapped in its own [`LandmarkSource`].

use log::warn;

use crate::tracking::{BodyFrame3D, Landmark, LandmarkSet};

pub trait LandmarkSource {
    type Frame: ?Sized;

    /// `None` if nothing usable came out of this frame; an empty set is
    /// never returned.
    fn detect(&mut self, frame: &Self::Frame) -> Option<LandmarkSet>;
}

/// Decodes MessagePack lists of image-space landmarks, each encoded as
/// `[id, x, y]` (or as a map with those keys).
#[derive(Default)]
pub struct PoseLandmarksSource;

impl LandmarkSource for PoseLandmarksSource {
    type Frame = [u8];

    fn detect(&mut self, frame: &[u8]) -> Option<LandmarkSet> {
        match rmp_serde::from_slice::<Vec<Landmark>>(frame) {
            Ok(landmarks) => non_empty(LandmarkSet::new(landmarks)),
            Err(e) => {
                warn!("Failed to decode pose landmarks: {}", e);
                None
            }
        }
    }
}

/// Decodes tether-oakd-blazepose body frames, using the first body only and
/// projecting each keypoint onto the x/y plane.
pub struct BodyFrameSource {
    flip_y: bool,
}

impl BodyFrameSource {
    pub fn new(flip_y: bool) -> Self {
        BodyFrameSource { flip_y }
    }

    pub fn set_flip_y(&mut self, flip_y: bool) {
        self.flip_y = flip_y;
    }
}

impl LandmarkSource for BodyFrameSource {
    type Frame = [u8];

    fn detect(&mut self, frame: &[u8]) -> Option<LandmarkSet> {
        let bodies: BodyFrame3D = match rmp_serde::from_slice(frame) {
            Ok(bodies) => bodies,
            Err(e) => {
                warn!("Failed to decode body frame: {}", e);
                return None;
            }
        };
        let y_sign = if self.flip_y { -1. } else { 1. };
        let body = bodies.first()?;
        non_empty(LandmarkSet::new(
            body.kp
                .iter()
                .map(|kp| {
                    let (x, y, _z) = kp.xyz;
                    Landmark::new(kp.i, x, y * y_sign)
                })
                .collect(),
        ))
    }
}

/// Already-decoded landmarks, e.g. frames loaded from a recording.
#[derive(Default)]
pub struct RecordedSource;

impl LandmarkSource for RecordedSource {
    type Frame = LandmarkSet;

    fn detect(&mut self, frame: &LandmarkSet) -> Option<LandmarkSet> {
        non_empty(frame.clone())
    }
}

fn non_empty(set: LandmarkSet) -> Option<LandmarkSet> {
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

#[cfg(test)]
mod tests {
    use crate::tracking::{Body3D, Keypoint3D};

    use super::*;

    #[test]
    fn test_pose_landmarks_from_triples() {
        let triples: Vec<(usize, f32, f32)> = vec![(12, 600., 200.), (14, 620., 400.)];
        let payload = rmp_serde::to_vec(&triples).unwrap();

        let set = PoseLandmarksSource.detect(&payload).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(14), Some(&Landmark::new(14, 620., 400.)));
    }

    #[test]
    fn test_pose_landmarks_from_named_fields() {
        let landmarks = vec![Landmark::new(0, 1., 2.)];
        let payload = rmp_serde::to_vec_named(&landmarks).unwrap();
        let set = PoseLandmarksSource.detect(&payload).unwrap();
        assert_eq!(set.get(0).map(|lm| lm.position()), Some((1., 2.)));
    }

    #[test]
    fn test_no_detection() {
        let empty: Vec<Landmark> = Vec::new();
        let payload = rmp_serde::to_vec(&empty).unwrap();
        assert!(PoseLandmarksSource.detect(&payload).is_none());

        let no_bodies: BodyFrame3D = Vec::new();
        let payload = rmp_serde::to_vec(&no_bodies).unwrap();
        assert!(BodyFrameSource::new(true).detect(&payload).is_none());

        assert!(RecordedSource.detect(&LandmarkSet::default()).is_none());
    }

    #[test]
    fn test_garbage_is_skipped() {
        assert!(PoseLandmarksSource.detect(&[0xc1, 0xff, 0x00]).is_none());
        assert!(BodyFrameSource::new(false).detect(&[0x93]).is_none());
    }

    #[test]
    fn test_body_frame_uses_first_body() {
        let bodies: BodyFrame3D = vec![
            Body3D {
                body_xyz: (0., 0., 1000.),
                kp: vec![
                    Keypoint3D {
                        i: 12,
                        xyz: (100., 300., 1000.),
                    },
                    Keypoint3D {
                        i: 14,
                        xyz: (120., 50., 990.),
                    },
                ],
            },
            Body3D {
                body_xyz: (500., 0., 2000.),
                kp: vec![Keypoint3D {
                    i: 12,
                    xyz: (-1., -1., -1.),
                }],
            },
        ];
        let payload = rmp_serde::to_vec_named(&bodies).unwrap();

        let flipped = BodyFrameSource::new(true).detect(&payload).unwrap();
        assert_eq!(flipped.get(12).map(|lm| lm.position()), Some((100., -300.)));

        let raw = BodyFrameSource::new(false).detect(&payload).unwrap();
        assert_eq!(raw.get(14).map(|lm| lm.position()), Some((120., 50.)));
    }
}

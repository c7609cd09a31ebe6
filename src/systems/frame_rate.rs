use std::time::{Duration, SystemTime};

/// Frames-per-second from the wall time between consecutive processed frames.
pub struct FrameRateMeter {
    last_frame: Option<SystemTime>,
}

impl FrameRateMeter {
    pub fn new() -> Self {
        FrameRateMeter { last_frame: None }
    }

    /// Mark a new frame. Returns `None` for the very first frame, or if no
    /// measurable time has passed since the previous one.
    pub fn tick(&mut self) -> Option<f32> {
        let now = SystemTime::now();
        let elapsed = self
            .last_frame
            .replace(now)
            .map(|previous| now.duration_since(previous).unwrap_or_default());
        elapsed.and_then(fps_from_elapsed)
    }
}

fn fps_from_elapsed(elapsed: Duration) -> Option<f32> {
    if elapsed.is_zero() {
        None
    } else {
        Some(1.0 / elapsed.as_secs_f32())
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        FrameRateMeter::new()
    }
}

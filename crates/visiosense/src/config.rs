//! Tunable thresholds of the gesture state machine.

use std::time::Duration;

/// Thresholds and timings used by gesture classification and the [`GestureController`].
///
/// Distances are in normalized image coordinates (`[0, 1]` spans the full image width/height).
/// The [`Default`] values are tuned for a 640x480 webcam at arm's length.
///
/// [`GestureController`]: crate::controller::GestureController
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Thumb tip to index tip distance below which the hand counts as pinching.
    pub pinch_distance: f32,
    /// Index tip to middle tip distance below which two raised fingers are a scroll gesture
    /// rather than a peace sign.
    pub scroll_pair_distance: f32,
    /// Wrist to wrist distance below which two hands are pressed together.
    pub namaskar_distance: f32,
    /// Number of consecutive namaskar frames that have to be *exceeded* to close the app.
    pub namaskar_frames: u32,
    /// Length of the gesture history the majority filter votes over.
    pub history_len: usize,
    /// Minimum time between two synthesized clicks.
    pub click_interval: Duration,
    /// How long a pinch has to be held before it turns into a drag.
    pub drag_hold: Duration,
    /// Weight of the newest cursor position in the exponential moving average.
    pub cursor_smoothing: f32,
    /// Fraction of the camera image cut off on every side before mapping to the screen.
    pub screen_margin: f32,
    /// Scroll clicks per unit of normalized vertical finger travel.
    pub scroll_gain: f32,
    /// Accumulated scroll amount that has to be exceeded before a scroll is emitted.
    pub scroll_step: f32,
    /// Minimum time between two whiteboard clears.
    pub clear_interval: Duration,
    /// Whiteboard stroke width, in pixels.
    pub stroke_width: u32,
    /// Head angles (in degrees, absolute) below which a head movement is counted.
    pub head_angle_limit: f32,
    /// Window in which consecutive head movements are counted together.
    pub head_movement_window: Duration,
    /// Number of head movements that has to be *exceeded* to raise an alert.
    pub head_movement_count: u32,
    /// Lip-to-mouth-corner height above which the expression counts as happy.
    pub happy_mouth_height: f32,
    /// Lip-to-mouth-corner height below which the expression counts as sad.
    pub sad_mouth_height: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pinch_distance: 0.04,
            scroll_pair_distance: 0.08,
            namaskar_distance: 0.15,
            namaskar_frames: 20,
            history_len: 8,
            click_interval: Duration::from_millis(300),
            drag_hold: Duration::from_millis(600),
            cursor_smoothing: 0.4,
            screen_margin: 0.15,
            scroll_gain: 1000.0,
            scroll_step: 50.0,
            clear_interval: Duration::from_secs(1),
            stroke_width: 8,
            head_angle_limit: 20.0,
            head_movement_window: Duration::from_secs(5),
            head_movement_count: 2,
            happy_mouth_height: 0.02,
            sad_mouth_height: 0.005,
        }
    }
}

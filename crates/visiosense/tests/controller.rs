//! Gesture controller scenarios driven by synthetic hands and an injected clock.

use std::time::{Duration, Instant};

use anyhow::bail;
use visiosense::{
    config::Thresholds,
    controller::{Feedback, FrameReport, GestureController, Mode},
    face::Expression,
    hand::Gesture,
    image::Resolution,
    landmark::{FaceLandmarks, HandLandmarks, Handedness, Landmark, LandmarkIdx},
    perception::Perception,
    pointer::Pointer,
};

const SCREEN: Resolution = Resolution::new(1000, 1000);
const FRAME: Resolution = Resolution::RES_VGA;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Move(i32, i32),
    Click,
    Press,
    Release,
    Scroll(i32),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    fail_press: bool,
}

impl Recorder {
    /// Recorded events other than pointer moves.
    fn actions(&self) -> Vec<Event> {
        self.events
            .iter()
            .copied()
            .filter(|e| !matches!(e, Event::Move(..)))
            .collect()
    }

    fn last_move(&self) -> Option<(i32, i32)> {
        self.events.iter().rev().find_map(|e| match *e {
            Event::Move(x, y) => Some((x, y)),
            _ => None,
        })
    }
}

impl Pointer for Recorder {
    fn screen_size(&self) -> Resolution {
        SCREEN
    }

    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        self.events.push(Event::Move(x, y));
        Ok(())
    }

    fn click(&mut self) -> anyhow::Result<()> {
        self.events.push(Event::Click);
        Ok(())
    }

    fn press(&mut self) -> anyhow::Result<()> {
        if self.fail_press {
            bail!("press rejected");
        }
        self.events.push(Event::Press);
        Ok(())
    }

    fn release(&mut self) -> anyhow::Result<()> {
        self.events.push(Event::Release);
        Ok(())
    }

    fn scroll(&mut self, clicks: i32) -> anyhow::Result<()> {
        self.events.push(Event::Scroll(clicks));
        Ok(())
    }
}

/// An upright right hand around `(cx, cy)`. Extended fingers point up, curled ones end below
/// their PIP joint. The index tip sits at `(cx - 0.03, cy - 0.12)` when extended and at
/// `(cx - 0.03, cy)` when curled.
fn hand(extended: [bool; 5], cx: f32, cy: f32) -> HandLandmarks {
    use LandmarkIdx::*;

    let mut lms = [Landmark::new(cx, cy, 0.0); HandLandmarks::NUM_LANDMARKS];
    let mut set = |idx: LandmarkIdx, x: f32, y: f32| {
        lms[idx as usize] = Landmark::new(cx + x, cy + y, 0.0);
    };
    set(Wrist, 0.0, 0.15);
    set(ThumbIp, -0.08, 0.05);
    set(ThumbTip, if extended[0] { -0.13 } else { -0.03 }, 0.08);
    let fingers = [
        (IndexFingerPip, IndexFingerTip, -0.03),
        (MiddleFingerPip, MiddleFingerTip, 0.0),
        (RingFingerPip, RingFingerTip, 0.03),
        (PinkyPip, PinkyTip, 0.06),
    ];
    for (i, (pip, tip, x)) in fingers.into_iter().enumerate() {
        set(pip, x, -0.05);
        set(tip, x, if extended[i + 1] { -0.12 } else { 0.0 });
    }
    HandLandmarks::new(lms, Handedness::Right)
}

/// Moves the thumb tip onto the index tip.
fn pinched(mut hand: HandLandmarks) -> HandLandmarks {
    let index_tip = hand[LandmarkIdx::IndexFingerTip];
    hand.landmarks_mut()[LandmarkIdx::ThumbTip as usize] = index_tip;
    hand
}

fn fist() -> HandLandmarks {
    hand([false; 5], 0.5, 0.5)
}

fn pinched_fist() -> HandLandmarks {
    pinched(fist())
}

fn pointing(cx: f32, cy: f32) -> HandLandmarks {
    hand([false, true, false, false, false], cx, cy)
}

fn two_fingers(cy: f32) -> HandLandmarks {
    hand([false, true, true, false, false], 0.5, cy)
}

fn open_hand() -> HandLandmarks {
    hand([true; 5], 0.5, 0.5)
}

fn hands(hands: impl IntoIterator<Item = HandLandmarks>) -> Perception {
    Perception {
        hands: hands.into_iter().collect(),
        ..Default::default()
    }
}

struct Harness {
    ctrl: GestureController,
    pointer: Recorder,
    t0: Instant,
}

impl Harness {
    fn new() -> Self {
        Self::with(Thresholds::default())
    }

    /// A controller without gesture smoothing, so that every frame's gesture takes effect.
    fn unsmoothed() -> Self {
        Self::with(Thresholds {
            history_len: 1,
            ..Thresholds::default()
        })
    }

    fn with(thresholds: Thresholds) -> Self {
        Self {
            ctrl: GestureController::new(thresholds, SCREEN),
            pointer: Recorder::default(),
            t0: Instant::now(),
        }
    }

    /// Feeds a frame captured `ms` milliseconds after the start of the scenario.
    fn at(&mut self, ms: u64, perception: Perception) -> FrameReport {
        let now = self.t0 + Duration::from_millis(ms);
        self.ctrl.update(&perception, FRAME, now, &mut self.pointer)
    }
}

#[test]
fn starts_in_whiteboard_mode() {
    let mut h = Harness::new();
    assert_eq!(h.ctrl.mode(), Mode::Whiteboard);

    let report = h.at(0, Perception::default());
    assert_eq!(report.mode, Mode::Whiteboard);
    assert_eq!(report.gesture, None);
    assert_eq!(report.feedback, None);
    assert!(h.pointer.events.is_empty());
}

#[test]
fn majority_vote_delays_mode_switch() {
    let mut h = Harness::new();

    let report = h.at(0, hands([fist()]));
    assert_eq!(report.mode, Mode::Mouse);
    assert_eq!(report.gesture, Some(Gesture::Fist));

    // One open-hand frame ties with the fist, and the older label wins.
    let report = h.at(33, hands([open_hand()]));
    assert_eq!(report.gesture, Some(Gesture::Fist));
    assert_eq!(report.mode, Mode::Mouse);
    assert_eq!(report.fingers, 5);

    let report = h.at(66, hands([open_hand()]));
    assert_eq!(report.gesture, Some(Gesture::OpenHand));
    assert_eq!(report.mode, Mode::Whiteboard);

    // The mode persists without hands.
    let report = h.at(100, Perception::default());
    assert_eq!(report.mode, Mode::Whiteboard);
}

#[test]
fn losing_hands_clears_history() {
    let mut h = Harness::new();
    for i in 0..3 {
        h.at(i * 33, hands([fist()]));
    }
    assert_eq!(h.ctrl.mode(), Mode::Mouse);

    h.at(100, Perception::default());
    let report = h.at(133, hands([open_hand()]));
    assert_eq!(report.gesture, Some(Gesture::OpenHand));
    assert_eq!(report.mode, Mode::Whiteboard);
}

#[test]
fn cursor_is_smoothed_from_screen_center() {
    let mut h = Harness::new();

    // Index tip at (0.5, 0.5) maps to the screen center.
    h.at(0, hands([hand([false; 5], 0.53, 0.5)]));
    assert_eq!(h.pointer.last_move(), Some((500, 500)));

    // Index tip deep in the right margin maps to the right edge.
    h.at(33, hands([hand([false; 5], 0.98, 0.5)]));
    assert_eq!(h.pointer.last_move(), Some((700, 500)));
    h.at(66, hands([hand([false; 5], 0.98, 0.5)]));
    assert_eq!(h.pointer.last_move(), Some((820, 500)));
}

#[test]
fn pinch_release_clicks_with_debounce() {
    let mut h = Harness::new();
    h.at(0, hands([fist()]));

    let report = h.at(100, hands([pinched_fist()]));
    assert_eq!(
        report.feedback,
        Some(Feedback::Cursor {
            at: (300, 240),
            pinching: true,
            dragging: false,
        })
    );
    h.at(200, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Click]);

    // Too soon after the previous click.
    h.at(250, hands([pinched_fist()]));
    h.at(350, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Click]);

    h.at(400, hands([pinched_fist()]));
    h.at(600, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Click, Event::Click]);
}

#[test]
fn long_pinch_drags() {
    let mut h = Harness::new();
    h.at(0, hands([fist()]));
    h.at(100, hands([pinched_fist()]));
    h.at(400, hands([pinched_fist()]));
    assert!(h.pointer.actions().is_empty());

    let report = h.at(800, hands([pinched_fist()]));
    assert!(h.ctrl.is_dragging());
    assert!(matches!(
        report.feedback,
        Some(Feedback::Cursor { dragging: true, .. })
    ));
    h.at(900, hands([pinched_fist()]));
    assert_eq!(h.pointer.actions(), [Event::Press]);

    // Releasing a drag does not click.
    h.at(1000, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Press, Event::Release]);
    assert!(!h.ctrl.is_dragging());
}

#[test]
fn failed_press_does_not_start_drag() {
    let mut h = Harness::new();
    h.pointer.fail_press = true;
    h.at(0, hands([fist()]));
    h.at(100, hands([pinched_fist()]));
    h.at(800, hands([pinched_fist()]));
    assert!(!h.ctrl.is_dragging());

    h.at(900, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Click]);
}

#[test]
fn losing_hands_releases_drag() {
    let mut h = Harness::new();
    h.at(0, hands([fist()]));
    h.at(100, hands([pinched_fist()]));
    h.at(800, hands([pinched_fist()]));
    assert!(h.ctrl.is_dragging());

    h.at(833, Perception::default());
    assert!(!h.ctrl.is_dragging());
    assert_eq!(h.pointer.actions(), [Event::Press, Event::Release]);

    // The pinch was forgotten too, so returning with an open pinch does not click.
    h.at(866, hands([fist()]));
    assert_eq!(h.pointer.actions(), [Event::Press, Event::Release]);
}

#[test]
fn two_finger_scroll() {
    let mut h = Harness::new();

    let report = h.at(0, hands([two_fingers(0.5)]));
    assert_eq!(report.gesture, Some(Gesture::TwoFingerScroll));
    assert_eq!(report.feedback, Some(Feedback::Scrolling));

    // Moving up by 0.03 accumulates 30, below the step.
    h.at(33, hands([two_fingers(0.47)]));
    assert!(h.pointer.actions().is_empty());

    h.at(66, hands([two_fingers(0.44)]));
    h.at(100, hands([two_fingers(0.5)]));
    let scrolls = h.pointer.actions();
    assert_eq!(scrolls.len(), 2, "{scrolls:?}");
    assert!(matches!(scrolls[0], Event::Scroll(n) if (59..=60).contains(&n)), "{scrolls:?}");
    assert!(matches!(scrolls[1], Event::Scroll(n) if (-60..=-59).contains(&n)), "{scrolls:?}");
}

#[test]
fn scroll_anchor_resets_on_other_gestures() {
    let mut h = Harness::unsmoothed();
    h.at(0, hands([two_fingers(0.5)]));
    h.at(33, hands([open_hand()]));
    h.at(66, hands([two_fingers(0.3)]));
    assert!(h.pointer.actions().is_empty());
}

#[test]
fn two_finger_pinch_clicks() {
    let mut h = Harness::new();
    let report = h.at(0, hands([pinched(two_fingers(0.5))]));
    assert_eq!(report.gesture, Some(Gesture::TwoFingerScroll));
    h.at(100, hands([pinched(two_fingers(0.5))]));
    assert_eq!(h.pointer.actions(), [Event::Click]);

    h.at(500, hands([pinched(two_fingers(0.5))]));
    assert_eq!(h.pointer.actions(), [Event::Click, Event::Click]);
}

#[test]
fn drawing_and_clearing() {
    let mut h = Harness::unsmoothed();
    assert!(h.ctrl.whiteboard().is_blank());

    let report = h.at(0, hands([pointing(0.5, 0.5)]));
    assert!(matches!(report.feedback, Some(Feedback::Drawing { .. })));
    h.at(33, hands([pointing(0.6, 0.5)]));
    assert!(!h.ctrl.whiteboard().is_blank());

    h.at(200, hands([open_hand()]));
    assert!(h.ctrl.whiteboard().is_blank());

    // Clearing is debounced.
    h.at(400, hands([pointing(0.5, 0.5)]));
    h.at(600, hands([open_hand()]));
    assert!(!h.ctrl.whiteboard().is_blank());
    h.at(1300, hands([open_hand()]));
    assert!(h.ctrl.whiteboard().is_blank());

    // Drawing never moves the pointer.
    assert!(h.pointer.events.is_empty());
}

#[test]
fn namaskar_requests_close() {
    let mut h = Harness::new();
    let pair = || hands([open_hand(), hand([true; 5], 0.6, 0.5)]);

    for i in 0..15 {
        h.at(i * 33, pair());
    }
    // Breaking the gesture restarts the count.
    let report = h.at(500, hands([open_hand()]));
    assert_eq!(report.namaskar_frames, 0);

    for i in 1..=20 {
        let report = h.at(500 + i * 33, pair());
        assert_eq!(report.namaskar_frames, i as u32);
        assert!(!report.close_requested);
    }
    let report = h.at(1200, pair());
    assert_eq!(report.total_fingers, 10);
    assert!(report.close_requested);

    // Closing stays requested.
    let report = h.at(1233, Perception::default());
    assert!(report.close_requested);
}

#[test]
fn face_analysis_is_reported() {
    let mut h = Harness::new();
    let face = FaceLandmarks::new(vec![
        Landmark::new(0.5, 0.5, 0.0);
        FaceLandmarks::NUM_LANDMARKS
    ])
    .unwrap();
    let perception = Perception {
        face: Some(face),
        ..Default::default()
    };

    let cheating = [0, 1000, 2000]
        .map(|ms| h.at(ms, perception.clone()).face.unwrap())
        .map(|face| {
            assert_eq!(face.expression, Expression::Sad);
            face.cheating
        });
    assert_eq!(cheating, [false, false, true]);
}

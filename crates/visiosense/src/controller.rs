//! The per-frame gesture state machine.
//!
//! [`GestureController::update`] is fed one [`Perception`] per camera frame. It classifies the
//! primary hand, smooths the classification over a short history, and turns the resulting stable
//! gesture into pointer actions (in [`Mode::Mouse`]) or whiteboard strokes (in
//! [`Mode::Whiteboard`]).
//!
//! The controller never reads the clock itself; callers pass the frame time in, which keeps the
//! debouncing logic testable.

use std::fmt;
use std::time::{Duration, Instant};

use visiosense_image::Resolution;

use crate::{
    config::Thresholds,
    face::{head_angle, Expression, HeadMovementMonitor},
    filter::{Ema, Filter, Majority},
    hand::{is_namaskar, FingerStates, Gesture},
    landmark::{HandLandmarks, LandmarkIdx},
    perception::Perception,
    pointer::Pointer,
    whiteboard::Whiteboard,
};

/// What the primary hand controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The index fingertip steers the system pointer; pinching clicks and drags.
    Mouse,
    /// Index pointing draws, two fingers scroll, an open hand wipes the canvas.
    Whiteboard,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Mouse => "Mouse Mode",
            Mode::Whiteboard => "Whiteboard Mode",
        })
    }
}

/// Visual feedback for the action performed in a frame. Positions are in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The fingertip is steering the pointer.
    Cursor {
        at: (i32, i32),
        pinching: bool,
        dragging: bool,
    },
    Scrolling,
    Drawing {
        at: (i32, i32),
    },
}

/// Face analysis results of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceReport {
    pub expression: Expression,
    /// Head angle in degrees.
    pub head_angle: f32,
    /// Whether the head-movement monitor raised an alert this frame.
    pub cheating: bool,
}

/// The outcome of one [`GestureController::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub mode: Mode,
    /// Majority vote over the recent gestures of the primary hand; `None` without hands.
    pub gesture: Option<Gesture>,
    /// Extended fingers of the primary hand.
    pub fingers: u32,
    /// Extended fingers across all hands.
    pub total_fingers: u32,
    /// Consecutive frames both hands have been pressed together.
    pub namaskar_frames: u32,
    /// Set once the namaskar gesture has been held long enough; stays set afterwards.
    pub close_requested: bool,
    pub feedback: Option<Feedback>,
    pub face: Option<FaceReport>,
}

/// Turns hand landmarks into pointer actions and whiteboard strokes.
pub struct GestureController {
    t: Thresholds,
    screen: Resolution,
    mode: Mode,
    history: Majority<Gesture>,

    cursor_x: Ema,
    cursor_y: Ema,
    /// When the current pinch started, if the thumb and index tips are touching.
    pinch_start: Option<Instant>,
    dragging: bool,
    last_click: Option<Instant>,

    prev_mid_y: Option<f32>,
    scroll_accum: f32,
    last_draw: Option<(i32, i32)>,
    last_clear: Option<Instant>,
    whiteboard: Whiteboard,

    namaskar_frames: u32,
    close_requested: bool,
    head_monitor: HeadMovementMonitor,
}

impl GestureController {
    /// Creates a controller for a pointer moving on a screen of the given size.
    ///
    /// The controller starts out in [`Mode::Whiteboard`] with the cursor at the screen center.
    pub fn new(thresholds: Thresholds, screen: Resolution) -> Self {
        let alpha = thresholds.cursor_smoothing;
        Self {
            history: Majority::new(thresholds.history_len),
            cursor_x: Ema::starting_at(alpha, screen.width() as f32 / 2.0),
            cursor_y: Ema::starting_at(alpha, screen.height() as f32 / 2.0),
            whiteboard: Whiteboard::new(thresholds.stroke_width),
            head_monitor: HeadMovementMonitor::new(&thresholds),
            t: thresholds,
            screen,
            mode: Mode::Whiteboard,
            pinch_start: None,
            dragging: false,
            last_click: None,
            prev_mid_y: None,
            scroll_accum: 0.0,
            last_draw: None,
            last_clear: None,
            namaskar_frames: 0,
            close_requested: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[inline]
    pub fn whiteboard(&self) -> &Whiteboard {
        &self.whiteboard
    }

    #[inline]
    pub fn whiteboard_mut(&mut self) -> &mut Whiteboard {
        &mut self.whiteboard
    }

    /// Processes the perception results of one frame.
    ///
    /// `frame_res` is the resolution of the camera frame the landmarks were detected in; drawing
    /// happens in its pixel space. `now` is the capture time of the frame.
    ///
    /// Pointer failures are logged and otherwise ignored.
    pub fn update(
        &mut self,
        perception: &Perception,
        frame_res: Resolution,
        now: Instant,
        pointer: &mut dyn Pointer,
    ) -> FrameReport {
        let face = perception.face.as_ref().map(|face| {
            let angle = head_angle(face);
            let cheating = self.head_monitor.update(angle, now);
            if cheating {
                log::debug!("head moved {} times in a row", self.head_monitor.count());
            }
            FaceReport {
                expression: Expression::of(face, &self.t),
                head_angle: angle,
                cheating,
            }
        });

        let hands = &perception.hands;
        let Some(primary) = hands.first() else {
            self.hands_lost(pointer);
            return FrameReport {
                mode: self.mode,
                gesture: None,
                fingers: 0,
                total_fingers: 0,
                namaskar_frames: 0,
                close_requested: self.close_requested,
                feedback: None,
                face,
            };
        };

        if hands.len() == 2 && is_namaskar(&hands[0], &hands[1], &self.t) {
            self.namaskar_frames += 1;
            if self.namaskar_frames > self.t.namaskar_frames && !self.close_requested {
                log::info!("namaskar held for {} frames, closing", self.namaskar_frames);
                self.close_requested = true;
            }
        } else {
            self.namaskar_frames = 0;
        }

        let fingers = FingerStates::of(primary);
        let total_fingers = hands.iter().map(|h| FingerStates::of(h).count()).sum();
        let gesture = self
            .history
            .push(Gesture::classify(fingers, primary, &self.t));

        let mode = if gesture == Gesture::Fist {
            Mode::Mouse
        } else {
            Mode::Whiteboard
        };
        if mode != self.mode {
            self.switch_mode(mode, pointer);
        }

        let feedback = match self.mode {
            Mode::Mouse => Some(self.update_mouse(primary, frame_res, now, pointer)),
            Mode::Whiteboard => self.update_whiteboard(primary, gesture, frame_res, now, pointer),
        };

        FrameReport {
            mode: self.mode,
            gesture: Some(gesture),
            fingers: fingers.count(),
            total_fingers,
            namaskar_frames: self.namaskar_frames,
            close_requested: self.close_requested,
            feedback,
            face,
        }
    }

    fn switch_mode(&mut self, mode: Mode, pointer: &mut dyn Pointer) {
        log::debug!("switching from {} to {}", self.mode, mode);
        match mode {
            Mode::Mouse => self.end_strokes(),
            Mode::Whiteboard => self.end_pinch(pointer),
        }
        self.mode = mode;
    }

    fn hands_lost(&mut self, pointer: &mut dyn Pointer) {
        if !self.history.is_empty() {
            log::trace!("hands lost");
        }
        self.history.reset();
        self.namaskar_frames = 0;
        self.end_strokes();
        self.end_pinch(pointer);
    }

    /// Forgets the scroll anchor and the last drawing position.
    fn end_strokes(&mut self) {
        self.prev_mid_y = None;
        self.scroll_accum = 0.0;
        self.last_draw = None;
    }

    /// Releases an active drag and forgets the current pinch.
    fn end_pinch(&mut self, pointer: &mut dyn Pointer) {
        if self.dragging {
            swallow("release", pointer.release());
            self.dragging = false;
        }
        self.pinch_start = None;
    }

    fn update_mouse(
        &mut self,
        hand: &HandLandmarks,
        frame_res: Resolution,
        now: Instant,
        pointer: &mut dyn Pointer,
    ) -> Feedback {
        let tip = hand[LandmarkIdx::IndexFingerTip];
        let margin = self.t.screen_margin;
        let x = self
            .cursor_x
            .push(map_to_screen(tip.x, margin, self.screen.width()));
        let y = self
            .cursor_y
            .push(map_to_screen(tip.y, margin, self.screen.height()));
        swallow("move", pointer.move_to(x.round() as i32, y.round() as i32));

        let pinching = hand[LandmarkIdx::ThumbTip].distance(&tip) < self.t.pinch_distance;
        match (pinching, self.pinch_start) {
            (true, None) => self.pinch_start = Some(now),
            (false, Some(_)) => {
                if self.dragging {
                    swallow("release", pointer.release());
                    self.dragging = false;
                } else {
                    self.click(now, pointer);
                }
                self.pinch_start = None;
            }
            _ => {}
        }

        if let Some(start) = self.pinch_start {
            if !self.dragging && now.saturating_duration_since(start) > self.t.drag_hold {
                self.dragging = swallow("press", pointer.press());
            }
        }

        Feedback::Cursor {
            at: tip.to_pixel(frame_res),
            pinching: self.pinch_start.is_some(),
            dragging: self.dragging,
        }
    }

    fn update_whiteboard(
        &mut self,
        hand: &HandLandmarks,
        gesture: Gesture,
        frame_res: Resolution,
        now: Instant,
        pointer: &mut dyn Pointer,
    ) -> Option<Feedback> {
        let index_tip = hand[LandmarkIdx::IndexFingerTip];
        let mut feedback = None;

        if gesture == Gesture::TwoFingerScroll {
            let mid_y = (index_tip.y + hand[LandmarkIdx::MiddleFingerTip].y) / 2.0;
            if let Some(prev) = self.prev_mid_y {
                self.scroll_accum += (prev - mid_y) * self.t.scroll_gain;
                if self.scroll_accum.abs() > self.t.scroll_step {
                    swallow("scroll", pointer.scroll(self.scroll_accum as i32));
                    self.scroll_accum = 0.0;
                }
            }
            self.prev_mid_y = Some(mid_y);

            if hand[LandmarkIdx::ThumbTip].distance(&index_tip) < self.t.pinch_distance {
                self.click(now, pointer);
            }
            feedback = Some(Feedback::Scrolling);
        } else {
            self.prev_mid_y = None;
            self.scroll_accum = 0.0;
        }

        if gesture == Gesture::IndexPointing {
            let at = index_tip.to_pixel(frame_res);
            let from = self.last_draw.unwrap_or(at);
            self.whiteboard.stroke(frame_res, from, at);
            self.last_draw = Some(at);
            feedback = Some(Feedback::Drawing { at });
        } else {
            self.last_draw = None;
        }

        if gesture == Gesture::OpenHand && elapsed_since(self.last_clear, now) > self.t.clear_interval
        {
            log::debug!("clearing whiteboard");
            self.whiteboard.clear();
            self.last_clear = Some(now);
        }

        feedback
    }

    /// Clicks, unless the previous click was too recent.
    fn click(&mut self, now: Instant, pointer: &mut dyn Pointer) {
        if elapsed_since(self.last_click, now) > self.t.click_interval {
            swallow("click", pointer.click());
            self.last_click = Some(now);
        }
    }
}

/// Maps a normalized coordinate to screen pixels, treating `margin` on both sides as dead zones
/// that pin the result to the screen edge.
fn map_to_screen(t: f32, margin: f32, extent: u32) -> f32 {
    let span = 1.0 - 2.0 * margin;
    ((t - margin) / span).clamp(0.0, 1.0) * extent as f32
}

/// Time since `then`; infinite if it never happened.
fn elapsed_since(then: Option<Instant>, now: Instant) -> Duration {
    match then {
        Some(then) => now.saturating_duration_since(then),
        None => Duration::MAX,
    }
}

/// Logs a failed pointer operation. Returns whether it succeeded.
fn swallow(op: &str, result: anyhow::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::trace!("pointer {op} failed: {e:#}");
            false
        }
    }
}

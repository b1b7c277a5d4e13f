//! Hand pose classification.
//!
//! Everything in here operates on a single frame's [`HandLandmarks`]. Temporal smoothing of the
//! resulting [`Gesture`]s is done by [`crate::filter::Majority`].

use std::fmt;

use crate::config::Thresholds;
use crate::landmark::{HandLandmarks, Handedness, LandmarkIdx};

/// Extension state of the five fingers of a hand, thumb first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub const THUMB: usize = 0;
    pub const INDEX: usize = 1;
    pub const MIDDLE: usize = 2;
    pub const RING: usize = 3;
    pub const PINKY: usize = 4;

    #[inline]
    pub const fn new(extended: [bool; 5]) -> Self {
        Self(extended)
    }

    /// Determines which fingers of `hand` are extended.
    ///
    /// The thumb is extended when its tip lies further out sideways than its IP joint; which side
    /// counts as "out" depends on the handedness. The other fingers are extended when their tip is
    /// above their PIP joint.
    pub fn of(hand: &HandLandmarks) -> Self {
        use LandmarkIdx::*;

        let thumb_tip = hand[ThumbTip].x;
        let thumb_ip = hand[ThumbIp].x;
        let thumb = match hand.handedness() {
            Handedness::Right => thumb_tip < thumb_ip,
            Handedness::Left => thumb_tip > thumb_ip,
        };

        let raised = |tip: LandmarkIdx, pip: LandmarkIdx| hand[tip].y < hand[pip].y;
        Self([
            thumb,
            raised(IndexFingerTip, IndexFingerPip),
            raised(MiddleFingerTip, MiddleFingerPip),
            raised(RingFingerTip, RingFingerPip),
            raised(PinkyTip, PinkyPip),
        ])
    }

    #[inline]
    pub fn is_extended(&self, finger: usize) -> bool {
        self.0[finger]
    }

    /// Returns the number of extended fingers.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.iter().filter(|&&ext| ext).count() as u32
    }

    #[inline]
    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}

/// A named hand pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Fist,
    Pinch,
    IndexPointing,
    TwoFingerScroll,
    Peace,
    OpenHand,
    /// Any other combination of extended fingers; holds the number of extended fingers.
    Fingers(u32),
}

impl Gesture {
    /// Classifies a hand pose. The first matching rule wins:
    ///
    /// 1. no extended finger: [`Gesture::Fist`]
    /// 2. thumb and index tips touching while middle, ring and pinky are curled:
    ///    [`Gesture::Pinch`]
    /// 3. only the index finger: [`Gesture::IndexPointing`]
    /// 4. only index and middle finger: [`Gesture::TwoFingerScroll`] when their tips are close
    ///    together, [`Gesture::Peace`] otherwise
    /// 5. all five fingers: [`Gesture::OpenHand`]
    /// 6. anything else: [`Gesture::Fingers`]
    pub fn classify(fingers: FingerStates, hand: &HandLandmarks, thresholds: &Thresholds) -> Self {
        use LandmarkIdx::*;

        let total = fingers.count();
        let thumb_index = hand[ThumbTip].distance(&hand[IndexFingerTip]);
        let others_curled = !fingers.is_extended(FingerStates::MIDDLE)
            && !fingers.is_extended(FingerStates::RING)
            && !fingers.is_extended(FingerStates::PINKY);

        if total == 0 {
            Self::Fist
        } else if thumb_index < thresholds.pinch_distance && others_curled {
            Self::Pinch
        } else if total == 1 && fingers.is_extended(FingerStates::INDEX) {
            Self::IndexPointing
        } else if total == 2
            && fingers.is_extended(FingerStates::INDEX)
            && fingers.is_extended(FingerStates::MIDDLE)
        {
            let index_middle = hand[IndexFingerTip].distance(&hand[MiddleFingerTip]);
            if index_middle < thresholds.scroll_pair_distance {
                Self::TwoFingerScroll
            } else {
                Self::Peace
            }
        } else if total == 5 {
            Self::OpenHand
        } else {
            Self::Fingers(total)
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fist => f.write_str("Fist"),
            Self::Pinch => f.write_str("Pinch"),
            Self::IndexPointing => f.write_str("Index Pointing"),
            Self::TwoFingerScroll => f.write_str("Two-Finger Scroll"),
            Self::Peace => f.write_str("Peace"),
            Self::OpenHand => f.write_str("Open Hand"),
            Self::Fingers(n) => write!(f, "{n} Fingers"),
        }
    }
}

/// Returns whether two hands are pressed together (a namaskar), judged by their wrist distance.
pub fn is_namaskar(a: &HandLandmarks, b: &HandLandmarks, thresholds: &Thresholds) -> bool {
    a[LandmarkIdx::Wrist].distance(&b[LandmarkIdx::Wrist]) < thresholds.namaskar_distance
}

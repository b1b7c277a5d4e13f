//! Hand and face landmark types.
//!
//! Landmarks are produced by an external pose-estimation program (see [`crate::perception`]) and
//! use normalized image coordinates: `x` and `y` lie in `[0, 1]` for points inside the image, with
//! `y` pointing *down*. `z` is a relative depth estimate and is not used for classification.

use std::ops::Index;

use nalgebra::Point2;
use visiosense_image::{draw, Color, Image, Resolution};

/// A single landmark in normalized image coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the 2-D position of this landmark, dropping the depth estimate.
    #[inline]
    pub fn xy(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    /// Computes the 2-D Euclidean distance between `self` and `other`.
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        nalgebra::distance(&self.xy(), &other.xy())
    }

    /// Converts this landmark to pixel coordinates in an image of the given resolution.
    #[inline]
    pub fn to_pixel(&self, res: Resolution) -> (i32, i32) {
        res.to_pixel(self.x, self.y)
    }
}

/// Which hand a set of [`HandLandmarks`] belongs to, as reported by the landmark estimator.
///
/// The label refers to the (mirrored) camera image the estimator was given.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    /// Used when the estimator does not report handedness.
    #[default]
    Right,
}

impl Handedness {
    /// Parses an estimator handedness label, falling back to [`Handedness::Right`] for anything
    /// that isn't `"Left"`.
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("left") {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: Carpometacarpal joint, the lowest joint of the thumb, located near the wrist.
/// - **MCP**: Metacarpophalangeal joint, the lower joint forming the knuckles near the palm of
///   the hand.
/// - **IP**: Interphalangeal joint of the thumb.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Surround the palm:
        (Wrist, ThumbCmc),
        (ThumbCmc, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// The 21 landmarks of a single detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    landmarks: [Landmark; Self::NUM_LANDMARKS],
    handedness: Handedness,
}

impl HandLandmarks {
    pub const NUM_LANDMARKS: usize = 21;

    pub fn new(landmarks: [Landmark; Self::NUM_LANDMARKS], handedness: Handedness) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }

    #[inline]
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    #[inline]
    pub fn landmarks(&self) -> &[Landmark; Self::NUM_LANDMARKS] {
        &self.landmarks
    }

    #[inline]
    pub fn landmarks_mut(&mut self) -> &mut [Landmark; Self::NUM_LANDMARKS] {
        &mut self.landmarks
    }

    /// Draws the hand skeleton onto `target`: green bones and blue joints.
    pub fn draw(&self, target: &mut Image) {
        let res = target.resolution();
        for (a, b) in CONNECTIVITY {
            let a = self[*a].to_pixel(res);
            let b = self[*b].to_pixel(res);
            draw::line(target, a, b).color(Color::GREEN).stroke_width(2);
        }
        for lm in &self.landmarks {
            let (x, y) = lm.to_pixel(res);
            draw::circle(target, x, y, 2).color(Color::BLUE).filled();
        }
    }
}

impl Index<LandmarkIdx> for HandLandmarks {
    type Output = Landmark;

    #[inline]
    fn index(&self, index: LandmarkIdx) -> &Landmark {
        &self.landmarks[index as usize]
    }
}

/// Face mesh landmarks.
///
/// The mesh is expected to follow the 468-point MediaPipe topology (478 when iris refinement is
/// enabled). Only a handful of points are consulted; see the associated constants.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    landmarks: Vec<Landmark>,
}

impl FaceLandmarks {
    pub const NUM_LANDMARKS: usize = 468;

    pub const NOSE_TIP: usize = 1;
    pub const UPPER_LIP_INNER: usize = 13;
    pub const MOUTH_LEFT: usize = 61;
    pub const LEFT_CHEEK_EDGE: usize = 234;
    pub const MOUTH_RIGHT: usize = 291;
    pub const RIGHT_CHEEK_EDGE: usize = 454;

    /// Wraps a face mesh.
    ///
    /// Returns `None` if `landmarks` contains fewer than [`FaceLandmarks::NUM_LANDMARKS`] points.
    pub fn new(landmarks: Vec<Landmark>) -> Option<Self> {
        if landmarks.len() < Self::NUM_LANDMARKS {
            return None;
        }
        Some(Self { landmarks })
    }

    #[inline]
    pub fn get(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

//! Face mesh analysis: head angle, facial expression, and head-movement monitoring.

use std::fmt;
use std::time::{Duration, Instant};

use nalgebra::Vector2;

use crate::config::Thresholds;
use crate::landmark::FaceLandmarks;

/// Computes the head angle in degrees.
///
/// This is the angle of the vector from the midpoint between the two cheek edges to the nose tip,
/// measured in image coordinates (so positive angles point downward).
pub fn head_angle(face: &FaceLandmarks) -> f32 {
    let nose = face.get(FaceLandmarks::NOSE_TIP).xy();
    let left = face.get(FaceLandmarks::LEFT_CHEEK_EDGE).xy();
    let right = face.get(FaceLandmarks::RIGHT_CHEEK_EDGE).xy();

    let center = nalgebra::center(&left, &right);
    let dir: Vector2<f32> = nose - center;
    dir.y.atan2(dir.x).to_degrees()
}

/// A coarse facial expression derived from the mouth shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Happy,
    Normal,
    Sad,
}

impl Expression {
    /// Classifies the expression by how far the inner upper lip sits from the line between the
    /// mouth corners.
    pub fn of(face: &FaceLandmarks, thresholds: &Thresholds) -> Self {
        let lip = face.get(FaceLandmarks::UPPER_LIP_INNER);
        let left = face.get(FaceLandmarks::MOUTH_LEFT);
        let right = face.get(FaceLandmarks::MOUTH_RIGHT);

        let mouth_height = (lip.y - (left.y + right.y) / 2.0).abs();
        if mouth_height > thresholds.happy_mouth_height {
            Self::Happy
        } else if mouth_height < thresholds.sad_mouth_height {
            Self::Sad
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Happy => "Happy",
            Self::Normal => "Normal",
            Self::Sad => "Sad",
        })
    }
}

/// Counts head movements and raises an alert when too many happen in quick succession.
///
/// A frame counts as a head movement when the absolute head angle is below the configured limit.
/// Movements less than the configured window apart are counted together; a longer pause restarts
/// the count.
#[derive(Debug, Clone)]
pub struct HeadMovementMonitor {
    angle_limit: f32,
    window: Duration,
    max_count: u32,
    count: u32,
    last_movement: Option<Instant>,
}

impl HeadMovementMonitor {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            angle_limit: thresholds.head_angle_limit,
            window: thresholds.head_movement_window,
            max_count: thresholds.head_movement_count,
            count: 0,
            last_movement: None,
        }
    }

    /// Records the head angle of the current frame.
    ///
    /// Returns `true` if this frame pushed the movement count over the limit.
    pub fn update(&mut self, head_angle: f32, now: Instant) -> bool {
        if head_angle.abs() >= self.angle_limit {
            return false;
        }

        self.count = match self.last_movement {
            Some(last) if now.saturating_duration_since(last) < self.window => self.count + 1,
            _ => 1,
        };
        self.last_movement = Some(now);

        self.count > self.max_count
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }
}

//! Landmark estimation delegated to an external helper process.
//!
//! The helper is started once and then serves one frame at a time over its standard streams:
//!
//! 1. After start-up it prints a single `READY` line.
//! 2. For every frame, it reads a 12-byte header (`width`, `height` and `channels` as
//!    little-endian `u32`s) followed by `width * height * channels` bytes of RGB pixel data.
//! 3. It answers with one line of JSON:
//!
//! ```json
//! {
//!   "hands": [{"handedness": "Left", "score": 0.93, "landmarks": [{"x": 0.4, "y": 0.5, "z": 0.0}]}],
//!   "faces": [{"landmarks": [{"x": 0.5, "y": 0.4, "z": 0.0}]}],
//!   "objects": [{"name": "cup", "confidence": 0.8, "bbox": [10, 20, 60, 90]}],
//!   "error": null
//! }
//! ```
//!
//! `faces` and `objects` may be omitted. Landmark coordinates are normalized to the frame size.

use std::{
    ffi::OsStr,
    io::{BufRead, BufReader, BufWriter, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use anyhow::{bail, Context};
use serde::Deserialize;
use visiosense_image::Image;

use crate::{
    landmark::{FaceLandmarks, HandLandmarks, Handedness, Landmark},
    objects::DetectedObject,
};

/// Minimum score a hand needs to be passed on.
pub const MIN_HAND_SCORE: f32 = 0.7;
/// Maximum number of hands passed on per frame.
pub const MAX_HANDS: usize = 2;

/// Everything the helper found in one frame.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    /// Detected hands. The first one is the primary hand.
    pub hands: Vec<HandLandmarks>,
    pub face: Option<FaceLandmarks>,
    pub objects: Vec<DetectedObject>,
}

impl Perception {
    /// Returns whether any hand was detected.
    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// A source of landmarks for camera frames.
pub trait Perceiver {
    fn perceive(&mut self, frame: &Image) -> anyhow::Result<Perception>;
}

#[derive(Deserialize)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

impl From<LandmarkJson> for Landmark {
    fn from(lm: LandmarkJson) -> Self {
        Landmark::new(lm.x, lm.y, lm.z)
    }
}

#[derive(Deserialize)]
struct HandJson {
    #[serde(default)]
    handedness: Option<String>,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize)]
struct FaceJson {
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize)]
struct Response {
    hands: Vec<HandJson>,
    #[serde(default)]
    faces: Vec<FaceJson>,
    #[serde(default)]
    objects: Vec<DetectedObject>,
    #[serde(default)]
    error: Option<String>,
}

/// Parses one response line of the helper protocol.
///
/// Hands scoring below `min_score` or carrying the wrong number of landmarks are skipped, at
/// most [`MAX_HANDS`] are kept. Only the first complete face is kept. An `error` reported by the
/// helper results in an empty [`Perception`].
pub fn parse_response(line: &str, min_score: f32) -> anyhow::Result<Perception> {
    let response: Response = serde_json::from_str(line)
        .with_context(|| format!("malformed perception response: {}", line.trim()))?;

    if let Some(error) = response.error {
        log::warn!("perception helper reported an error: {error}");
        return Ok(Perception::default());
    }

    let mut hands = Vec::with_capacity(MAX_HANDS);
    for hand in response.hands {
        if hand.score < min_score {
            continue;
        }
        let count = hand.landmarks.len();
        let landmarks: [Landmark; HandLandmarks::NUM_LANDMARKS] =
            match hand.landmarks.into_iter().map(Landmark::from).collect::<Vec<_>>().try_into() {
                Ok(landmarks) => landmarks,
                Err(_) => {
                    log::warn!(
                        "expected {} hand landmarks, got {count}",
                        HandLandmarks::NUM_LANDMARKS
                    );
                    continue;
                }
            };
        let handedness = hand
            .handedness
            .as_deref()
            .map(Handedness::from_label)
            .unwrap_or_default();
        hands.push(HandLandmarks::new(landmarks, handedness));
        if hands.len() == MAX_HANDS {
            break;
        }
    }

    let face = response.faces.into_iter().find_map(|face| {
        let count = face.landmarks.len();
        let face = FaceLandmarks::new(face.landmarks.into_iter().map(Landmark::from).collect());
        if face.is_none() {
            log::warn!(
                "expected at least {} face landmarks, got {count}",
                FaceLandmarks::NUM_LANDMARKS
            );
        }
        face
    });

    Ok(Perception {
        hands,
        face,
        objects: response.objects,
    })
}

/// Runs landmark estimation in a helper process speaking the line protocol described in the
/// [module documentation](self).
pub struct SubprocessPerceiver {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    min_score: f32,
    line: String,
}

impl SubprocessPerceiver {
    /// Starts the helper and waits until it reports that it is ready.
    pub fn spawn<P, A, S>(program: P, args: A) -> anyhow::Result<Self>
    where
        P: AsRef<OsStr>,
        A: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        log::info!("starting perception helper {:?}", program);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start perception helper {:?}", program))?;

        let stdin = child.stdin.take().context("helper stdin not captured")?;
        let stdout = child.stdout.take().context("helper stdout not captured")?;
        let mut this = Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            min_score: MIN_HAND_SCORE,
            line: String::new(),
        };

        this.read_line()?;
        if this.line.trim() != "READY" {
            bail!(
                "perception helper did not signal readiness, got {:?}",
                this.line.trim()
            );
        }
        log::info!("perception helper ready");

        Ok(this)
    }

    /// Sets the minimum score a hand needs to be reported.
    pub fn set_min_score(&mut self, min_score: f32) {
        self.min_score = min_score.clamp(0.0, 1.0);
    }

    fn read_line(&mut self) -> anyhow::Result<()> {
        self.line.clear();
        let n = self
            .stdout
            .read_line(&mut self.line)
            .context("failed to read from perception helper")?;
        if n == 0 {
            bail!("perception helper exited");
        }
        Ok(())
    }
}

impl Perceiver for SubprocessPerceiver {
    fn perceive(&mut self, frame: &Image) -> anyhow::Result<Perception> {
        const CHANNELS: u32 = 3;

        let rgb = frame.to_rgb8();
        for v in [frame.width(), frame.height(), CHANNELS] {
            self.stdin.write_all(&v.to_le_bytes())?;
        }
        self.stdin.write_all(&rgb)?;
        self.stdin
            .flush()
            .context("failed to send frame to perception helper")?;

        self.read_line()?;
        parse_response(&self.line, self.min_score)
    }
}

impl Drop for SubprocessPerceiver {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("failed to kill perception helper: {e}");
        }
        self.child.wait().ok();
    }
}

//! The capture, perception, control and display loop.

use std::time::Instant;

use visiosense_image::Image;

use crate::{
    config::Thresholds,
    controller::{FrameReport, GestureController},
    overlay,
    perception::Perceiver,
    pointer::Pointer,
    preview::Preview,
    timer::{FpsCounter, Timer},
    webcam::Webcam,
};

const GESTURE_GUIDE: &[(&str, &str)] = &[
    ("Fist", "mouse mode, the index fingertip moves the cursor"),
    ("Pinch (mouse mode)", "click, hold to drag"),
    ("Index Pointing", "draw on the whiteboard"),
    ("Two-Finger Scroll", "scroll, pinch the thumb to click"),
    ("Open Hand", "clear the whiteboard"),
    ("Namaskar (both hands)", "close VisioSense"),
    ("Q / Escape", "close VisioSense"),
];

/// Owns everything that happens to a frame after it was captured.
pub struct App {
    perceiver: Box<dyn Perceiver>,
    pointer: Box<dyn Pointer>,
    controller: GestureController,
    preview: Option<Preview>,
    t_perceive: Timer,
    t_render: Timer,
}

impl App {
    pub fn new(
        thresholds: Thresholds,
        perceiver: Box<dyn Perceiver>,
        pointer: Box<dyn Pointer>,
    ) -> Self {
        let screen = pointer.screen_size();
        Self {
            perceiver,
            pointer,
            controller: GestureController::new(thresholds, screen),
            preview: None,
            t_perceive: Timer::new("perceive"),
            t_render: Timer::new("render"),
        }
    }

    /// Shows annotated frames in `preview` while running.
    pub fn with_preview(self, preview: Preview) -> Self {
        Self {
            preview: Some(preview),
            ..self
        }
    }

    #[inline]
    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    /// Runs one camera frame through the pipeline.
    ///
    /// The frame is mirrored, so that moving a hand to the right moves the cursor to the right,
    /// and returned with the whiteboard and all annotations drawn onto it.
    pub fn process(&mut self, mut frame: Image, now: Instant) -> anyhow::Result<(Image, FrameReport)> {
        frame.flip_horizontal_in_place();
        let perception = self.t_perceive.time(|| self.perceiver.perceive(&frame))?;
        let report = self.controller.update(
            &perception,
            frame.resolution(),
            now,
            &mut *self.pointer,
        );

        self.t_render.time(|| {
            self.controller
                .whiteboard_mut()
                .composite_onto(&mut frame);
            overlay::draw(&mut frame, &perception, &report);
        });

        Ok((frame, report))
    }

    /// Processes frames from `webcam` until the user asks to quit or the camera fails.
    ///
    /// Failing to read a frame ends the loop without an error. Perception and preview failures
    /// are returned.
    pub fn run(&mut self, webcam: &mut Webcam) -> anyhow::Result<()> {
        log::info!("VisioSense is running, make gestures in front of the camera:");
        for (gesture, action) in GESTURE_GUIDE {
            log::info!("  {gesture}: {action}");
        }

        let mut fps = FpsCounter::new("visiosense");
        loop {
            let frame = match webcam.read() {
                Ok(frame) => frame,
                Err(e) => {
                    log::error!("failed to read frame from camera: {e:#}");
                    break;
                }
            };

            let (frame, report) = self.process(frame, Instant::now())?;

            if let Some(preview) = &mut self.preview {
                preview.show(&frame)?;
                if preview.should_close() {
                    break;
                }
            }
            if report.close_requested {
                break;
            }

            fps.tick_with(
                webcam
                    .timers()
                    .chain([&self.t_perceive, &self.t_render]),
            );
        }

        log::info!("VisioSense closed");
        Ok(())
    }
}

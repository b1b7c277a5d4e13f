//! VisioSense: webcam hand-gesture control.
//!
//! Hand landmarks are obtained from an external estimator (see [`perception`]), classified into
//! named [`Gesture`]s, smoothed over a short history and fed through the
//! [`GestureController`], which moves, clicks and scrolls the system pointer or draws onto a
//! whiteboard overlaid on the camera image.
//!
//! # Environment Variables
//!
//! * `VISIOSENSE_WEBCAM_NAME`: Forces the camera to use for [`Webcam`]s opened without an explicit
//!   device name. If unset, the first camera that supports a compatible image format is used.
//! * `RUST_LOG`: Overrides the log filter set up by [`init_logger!`].
//!
//! [`Gesture`]: hand::Gesture
//! [`GestureController`]: controller::GestureController
//! [`Webcam`]: webcam::Webcam

use log::LevelFilter;

pub mod app;
pub mod config;
pub mod controller;
pub mod face;
pub mod filter;
pub mod hand;
pub mod landmark;
pub mod objects;
pub mod overlay;
pub mod perception;
pub mod pointer;
pub mod preview;
pub mod timer;
pub mod voice;
pub mod webcam;
pub mod whiteboard;

pub use visiosense_image as image;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and VisioSense log at *debug* level, everything else only if enabled via
/// `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}

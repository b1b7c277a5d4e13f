//! Owned RGBA images and overlay drawing for VisioSense.
//!
//! # Overview
//!
//! [`Image`] is an owned 8-bit sRGB image with alpha channel. Camera frames are decoded into it,
//! the whiteboard canvas is one, and the preview window displays one.
//!
//! A few primitive drawing operations are available in the [`draw`] module. They exist to
//! annotate camera frames (landmark skeletons, status text, object boxes) and to paint whiteboard
//! strokes, and are not meant to be exhaustive.
//!
//! The whiteboard is composited onto frames with [`Image::add_from`].

pub mod draw;

mod blend;
mod color;
mod image;
mod resolution;

#[cfg(test)]
mod tests;

pub use color::Color;
pub use image::Image;
pub use resolution::Resolution;

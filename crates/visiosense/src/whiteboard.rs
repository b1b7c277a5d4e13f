//! The drawing canvas of whiteboard mode.

use visiosense_image::{draw, Color, Image, Resolution};

const STROKE_COLOR: Color = Color::RED;

/// A black canvas the size of the camera frame that strokes are drawn onto.
///
/// The canvas is created lazily on first use. It is composited onto each frame additively, so
/// black areas leave the frame untouched.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    canvas: Option<Image>,
    stroke_width: u32,
}

impl Whiteboard {
    pub fn new(stroke_width: u32) -> Self {
        Self {
            canvas: None,
            stroke_width,
        }
    }

    /// Returns the canvas, (re)creating it if its resolution does not match `res`.
    fn canvas(&mut self, res: Resolution) -> &mut Image {
        if self.canvas.as_ref().map_or(false, |c| c.resolution() != res) {
            self.canvas = None;
        }
        self.canvas
            .get_or_insert_with(|| Image::filled(res, Color::BLACK))
    }

    /// Draws a stroke segment between two pixel positions of a frame of resolution `res`.
    pub fn stroke(&mut self, res: Resolution, from: (i32, i32), to: (i32, i32)) {
        let width = self.stroke_width;
        draw::line(self.canvas(res), from, to)
            .color(STROKE_COLOR)
            .stroke_width(width);
    }

    /// Erases all strokes.
    pub fn clear(&mut self) {
        if let Some(canvas) = &mut self.canvas {
            canvas.clear(Color::BLACK);
        }
    }

    /// Returns whether anything has been drawn since creation.
    pub fn is_blank(&self) -> bool {
        match &self.canvas {
            Some(canvas) => canvas.data().chunks_exact(4).all(|px| px[..3] == [0, 0, 0]),
            None => true,
        }
    }

    /// Adds the canvas onto `frame`, saturating each channel.
    pub fn composite_onto(&mut self, frame: &mut Image) {
        let canvas = self.canvas(frame.resolution());
        frame.add_from(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strokes_are_added_to_frame() {
        let res = Resolution::new(32, 32);
        let mut board = Whiteboard::new(4);
        assert!(board.is_blank());

        board.stroke(res, (4, 16), (28, 16));
        assert!(!board.is_blank());

        let mut frame = Image::filled(res, Color::from_rgb8(10, 200, 10));
        board.composite_onto(&mut frame);
        assert_eq!(frame.get(16, 16), Color::from_rgb8(255, 200, 10));
        assert_eq!(frame.get(16, 2), Color::from_rgb8(10, 200, 10));

        board.clear();
        assert!(board.is_blank());
    }

    #[test]
    fn canvas_follows_frame_resolution() {
        let mut board = Whiteboard::new(2);
        board.stroke(Resolution::new(16, 16), (0, 0), (15, 15));

        let mut frame = Image::filled(Resolution::new(8, 8), Color::BLACK);
        board.composite_onto(&mut frame);
        assert!(board.is_blank());
        assert_eq!(frame.get(4, 4), Color::BLACK);
    }
}

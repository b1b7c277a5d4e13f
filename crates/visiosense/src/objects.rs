//! Objects reported by an external detector.

use serde::Deserialize;
use visiosense_image::{draw, Color, Image, Resolution};

const BOX_COLOR: Color = Color::CYAN;

/// How far a box edge may lie outside of the frame before it is pulled in.
const CLAMP_MARGIN: f32 = 4.0;

/// A labeled bounding box, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]`, top-left and bottom-right corner.
    pub bbox: [f32; 4],
}

impl DetectedObject {
    pub fn label(&self) -> String {
        format!("{}: {:.2}", self.name, self.confidence)
    }

    /// Returns the bounding box corners, truncated to whole pixels and clamped to just outside
    /// a frame of resolution `res`.
    ///
    /// Non-finite coordinates end up at 0.
    pub fn corners(&self, res: Resolution) -> ((i32, i32), (i32, i32)) {
        let clamp = |v: f32, max: u32| {
            if v.is_finite() {
                v.clamp(-CLAMP_MARGIN, max as f32 + CLAMP_MARGIN) as i32
            } else {
                0
            }
        };
        let [x1, y1, x2, y2] = self.bbox;
        let (w, h) = (res.width(), res.height());
        ((clamp(x1, w), clamp(y1, h)), (clamp(x2, w), clamp(y2, h)))
    }

    /// Returns the y coordinate of the label's bottom edge.
    ///
    /// Labels go above the box, unless that would push them off the top of the frame, in which
    /// case they are placed inside the box.
    fn label_y(y1: i32) -> i32 {
        if y1 - 10 > 20 {
            y1 - 10
        } else {
            y1 + 25
        }
    }

    /// Draws the bounding box and a label on a filled background.
    pub fn draw(&self, target: &mut Image) {
        let ((x1, y1), (x2, y2)) = self.corners(target.resolution());
        draw::rect(target, (x1, y1), (x2, y2))
            .color(BOX_COLOR)
            .stroke_width(2);

        let label = self.label();
        let (w, h) = draw::text_size(&label);
        let label_y = Self::label_y(y1);
        draw::rect(target, (x1, label_y - h as i32 - 4), (x1 + w as i32 + 4, label_y + 4))
            .color(BOX_COLOR)
            .filled();
        draw::text(target, x1 + 2, label_y, &label)
            .color(Color::BLACK)
            .align_left()
            .align_bottom();
    }
}

#[cfg(test)]
mod tests {
    use visiosense_image::Resolution;

    use super::*;

    fn object(bbox: [f32; 4]) -> DetectedObject {
        DetectedObject {
            name: "cup".into(),
            confidence: 0.876,
            bbox,
        }
    }

    #[test]
    fn label_text() {
        assert_eq!(object([0.0; 4]).label(), "cup: 0.88");
    }

    #[test]
    fn label_moves_inside_near_top() {
        assert_eq!(DetectedObject::label_y(100), 90);
        assert_eq!(DetectedObject::label_y(25), 50);
    }

    #[test]
    fn corners_are_clamped_to_frame() {
        let res = Resolution::new(64, 48);
        assert_eq!(
            object([10.0, 5.0, 30.0, 40.0]).corners(res),
            ((10, 5), (30, 40))
        );
        assert_eq!(
            object([-1e12, -1e12, 1e12, 1e12]).corners(res),
            ((-4, -4), (68, 52))
        );
        assert_eq!(
            object([f32::NAN, f32::NEG_INFINITY, f32::INFINITY, 20.0]).corners(res),
            ((0, 0), (0, 20))
        );
    }

    #[test]
    fn oversized_box_is_drawn_along_frame_edges() {
        let mut image = Image::filled(Resolution::new(64, 64), Color::BLACK);
        object([-1e12, -1e12, 1e12, 1e12]).draw(&mut image);
        assert_eq!(image.get(32, 63), Color::BLACK);
        assert_eq!(image.get(32, 32), Color::BLACK);
    }

    #[test]
    fn draws_box_outline() {
        let mut image = Image::filled(Resolution::new(200, 200), Color::BLACK);
        object([20.0, 100.0, 120.0, 180.0]).draw(&mut image);
        assert_eq!(image.get(70, 180), BOX_COLOR);
        assert_eq!(image.get(70, 140), Color::BLACK);
    }
}

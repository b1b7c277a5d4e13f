//! Annotations drawn onto the preview frame.

use visiosense_image::{draw, Color, Image};

use crate::{
    controller::{Feedback, FrameReport, Mode},
    face::Expression,
    perception::Perception,
};

const LINE_X: i32 = 10;
const RIGHT_MARGIN: i32 = 10;
const STATUS_COLOR: Color = Color::CYAN;

/// Draws detected objects, hand skeletons, action feedback and the status HUD onto `frame`.
pub fn draw(frame: &mut Image, perception: &Perception, report: &FrameReport) {
    for object in &perception.objects {
        object.draw(frame);
    }
    for hand in &perception.hands {
        hand.draw(frame);
    }
    if let Some(feedback) = &report.feedback {
        draw_feedback(frame, feedback);
    }
    draw_status(frame, report);
}

fn draw_feedback(frame: &mut Image, feedback: &Feedback) {
    match *feedback {
        Feedback::Cursor {
            at: (x, y),
            pinching: true,
            dragging,
        } => {
            let color = if dragging { Color::RED } else { Color::YELLOW };
            draw::circle(frame, x, y, 20).color(color).stroke_width(3);
            if dragging {
                draw::text(frame, x + 25, y, "DRAGGING")
                    .color(color)
                    .align_left();
            }
        }
        Feedback::Cursor { at: (x, y), .. } => {
            draw::circle(frame, x, y, 10).color(Color::MAGENTA).filled();
        }
        Feedback::Scrolling => {
            draw::text(frame, LINE_X, 150, "SCROLLING & CLICKING")
                .color(Color::YELLOW)
                .align_left()
                .align_bottom();
        }
        Feedback::Drawing { at: (x, y) } => {
            draw::circle(frame, x, y, 12).color(Color::RED).filled();
            draw::text(frame, LINE_X, 150, "DRAWING")
                .color(Color::RED)
                .align_left()
                .align_bottom();
        }
    }
}

fn draw_status(frame: &mut Image, report: &FrameReport) {
    let mode_color = match report.mode {
        Mode::Mouse => Color::GREEN,
        Mode::Whiteboard => Color::MAGENTA,
    };
    status_line(frame, 30, &format!("Mode: {}", report.mode), mode_color);

    let gesture = match &report.gesture {
        Some(gesture) => gesture.to_string(),
        None => "None".to_string(),
    };
    status_line(frame, 60, &format!("Gesture: {gesture}"), STATUS_COLOR);
    status_line(frame, 90, &format!("Fingers: {}", report.fingers), STATUS_COLOR);
    if report.total_fingers > 0 {
        let text = format!("Total Fingers: {}/10", report.total_fingers);
        status_line(frame, 120, &text, Color::YELLOW);
    }

    let right = frame.width() as i32 - RIGHT_MARGIN;
    let head_angle = match &report.face {
        Some(face) => {
            let color = match face.expression {
                Expression::Happy => Color::GREEN,
                Expression::Sad => Color::RED,
                Expression::Normal => Color::WHITE,
            };
            draw::text(frame, right, 30, &format!("Expression: {}", face.expression))
                .color(color)
                .align_right()
                .align_bottom();
            face.head_angle
        }
        None => 0.0,
    };
    draw::text(frame, right, 60, &format!("Head Angle: {head_angle:.1} deg"))
        .color(Color::WHITE)
        .align_right()
        .align_bottom();

    let (cx, cy) = (frame.width() as i32 / 2, frame.height() as i32 / 2);
    if report.face.map_or(false, |face| face.cheating) {
        draw::text(frame, cx, cy - 50, "CHEATING DETECTED!").color(Color::RED);
        draw::rect(frame, (cx - 200, cy - 80), (cx + 200, cy + 20))
            .color(Color::RED)
            .stroke_width(3);
    }
    if report.namaskar_frames > 1 {
        draw::text(frame, cx, cy, "Namaskar detected - Closing...").color(Color::RED);
    }
}

fn status_line(frame: &mut Image, y: i32, text: &str, color: Color) {
    draw::text(frame, LINE_X, y, text)
        .color(color)
        .align_left()
        .align_bottom();
}

#[cfg(test)]
mod tests {
    use visiosense_image::Resolution;

    use super::*;
    use crate::controller::FaceReport;
    use crate::hand::Gesture;

    fn report() -> FrameReport {
        FrameReport {
            mode: Mode::Whiteboard,
            gesture: Some(Gesture::IndexPointing),
            fingers: 1,
            total_fingers: 1,
            namaskar_frames: 0,
            close_requested: false,
            feedback: Some(Feedback::Drawing { at: (320, 300) }),
            face: None,
        }
    }

    #[test]
    fn drawing_feedback_marks_fingertip() {
        let mut frame = Image::filled(Resolution::RES_VGA, Color::BLACK);
        draw(&mut frame, &Perception::default(), &report());
        assert_eq!(frame.get(320, 300), Color::RED);
        assert_eq!(frame.get(320, 400), Color::BLACK);
    }

    #[test]
    fn cheating_alert_frames_center() {
        let mut frame = Image::filled(Resolution::RES_VGA, Color::BLACK);
        let report = FrameReport {
            feedback: None,
            face: Some(FaceReport {
                expression: Expression::Normal,
                head_angle: 3.0,
                cheating: true,
            }),
            ..report()
        };
        draw(&mut frame, &Perception::default(), &report);
        assert_eq!(frame.get(320 - 200, 240), Color::RED);
        assert_eq!(frame.get(320, 240 + 19), Color::RED);
    }

    fn count_in_band(frame: &Image, color: Color) -> usize {
        let mut count = 0;
        for y in 225..255 {
            for x in 160..480 {
                if frame.get(x, y) == color {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn closing_message_after_two_namaskar_frames() {
        for (frames, shown) in [(0, false), (1, false), (2, true), (20, true)] {
            let mut frame = Image::filled(Resolution::RES_VGA, Color::BLACK);
            let report = FrameReport {
                feedback: None,
                namaskar_frames: frames,
                ..report()
            };
            draw(&mut frame, &Perception::default(), &report);
            assert_eq!(count_in_band(&frame, Color::RED) > 0, shown, "{frames} frames");
        }
    }
}

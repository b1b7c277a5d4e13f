//! Drawing primitives.
//!
//! Every function here returns a guard that performs the drawing operation when dropped, which
//! allows customizing it first:
//!
//! ```
//! # use visiosense_image::{draw, Color, Image};
//! let mut image = Image::new(64, 64);
//! draw::line(&mut image, (0, 0), (63, 63)).color(Color::RED).stroke_width(3);
//! draw::text(&mut image, 32, 32, "hi").align_top();
//! ```
//!
//! Anything drawn outside of the image bounds is clipped. Coordinates are clamped to
//! `±COORD_LIMIT` first, so arbitrarily far-off points never overflow the rasterizer.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoFont, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{self, Text, TextStyleBuilder},
};

use crate::{Color, Image};

const FONT: &MonoFont<'static> = &FONT_10X20;

/// Largest coordinate magnitude passed on to `embedded-graphics`.
pub const COORD_LIMIT: i32 = 1 << 14;

fn point(x: i32, y: i32) -> Point {
    Point::new(
        x.clamp(-COORD_LIMIT, COORD_LIMIT),
        y.clamp(-COORD_LIMIT, COORD_LIMIT),
    )
}

/// Returns the size in pixels that `text` occupies when drawn with [`text`].
pub fn text_size(text: &str) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    let width = FONT.character_size.width * chars + FONT.character_spacing * chars.saturating_sub(1);
    (width, FONT.character_size.height)
}

/// Guard returned by [`line`]; draws the line when dropped and allows customization.
pub struct DrawLine<'a> {
    image: &'a mut Image,
    start: Point,
    end: Point,
    color: Color,
    stroke_width: u32,
}

impl DrawLine<'_> {
    /// Sets the line's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the line's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawLine<'_> {
    fn drop(&mut self) {
        let style = PrimitiveStyle::with_stroke(self.color, self.stroke_width);
        if self.start == self.end {
            // A zero-length line would not produce any pixels; draw a dot of the stroke width
            // instead so that single-point strokes stay visible.
            let dot = Circle::with_center(self.start, self.stroke_width.max(1));
            match dot
                .into_styled(PrimitiveStyle::with_fill(self.color))
                .draw(&mut Target(self.image))
            {
                Ok(()) => {}
                Err(infallible) => match infallible {},
            }
            return;
        }
        match Line::new(self.start, self.end)
            .into_styled(style)
            .draw(&mut Target(self.image))
        {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`circle`]; draws the circle when dropped and allows customization.
pub struct DrawCircle<'a> {
    image: &'a mut Image,
    center: Point,
    radius: u32,
    color: Color,
    stroke_width: u32,
    filled: bool,
}

impl DrawCircle<'_> {
    /// Sets the circle's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the stroke width of the circle's outline.
    ///
    /// By default, a stroke width of 1 is used. Has no effect on filled circles.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    /// Fills the circle instead of drawing its outline.
    pub fn filled(&mut self) -> &mut Self {
        self.filled = true;
        self
    }
}

impl Drop for DrawCircle<'_> {
    fn drop(&mut self) {
        let style = if self.filled {
            PrimitiveStyle::with_fill(self.color)
        } else {
            PrimitiveStyle::with_stroke(self.color, self.stroke_width)
        };
        match Circle::with_center(self.center, self.radius * 2 + 1)
            .into_styled(style)
            .draw(&mut Target(self.image))
        {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`rect`]; draws the rectangle when dropped and allows customization.
pub struct DrawRect<'a> {
    image: &'a mut Image,
    top_left: Point,
    bottom_right: Point,
    color: Color,
    stroke_width: u32,
    filled: bool,
}

impl DrawRect<'_> {
    /// Sets the rectangle's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the rectangle's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    /// Fills the rectangle instead of drawing its outline.
    pub fn filled(&mut self) -> &mut Self {
        self.filled = true;
        self
    }
}

impl Drop for DrawRect<'_> {
    fn drop(&mut self) {
        let style = if self.filled {
            PrimitiveStyle::with_fill(self.color)
        } else {
            PrimitiveStyle::with_stroke(self.color, self.stroke_width)
        };
        match Rectangle::with_corners(self.top_left, self.bottom_right)
            .into_styled(style)
            .draw(&mut Target(self.image))
        {
            Ok(()) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`text`]; draws the text when dropped and allows customization.
pub struct DrawText<'a> {
    image: &'a mut Image,
    x: i32,
    y: i32,
    text: &'a str,
    color: Color,
    alignment: text::Alignment,
    baseline: text::Baseline,
}

impl DrawText<'_> {
    /// Sets the text color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Aligns the top of the text with the `y` coordinate.
    pub fn align_top(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Top;
        self
    }

    /// Aligns the bottom of the text with the `y` coordinate.
    pub fn align_bottom(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Bottom;
        self
    }

    /// Aligns the left side of the text with the `x` coordinate.
    pub fn align_left(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Left;
        self
    }

    /// Aligns the right side of the text with the `x` coordinate.
    pub fn align_right(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Right;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        // FIXME: e-g's fonts lack some common glyphs (like `°`)
        let character_style = MonoTextStyle::new(FONT, self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(self.baseline)
            .build();
        match Text::with_text_style(
            self.text,
            point(self.x, self.y),
            character_style,
            text_style,
        )
        .draw(&mut Target(self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws a line onto an image.
pub fn line(image: &mut Image, start: (i32, i32), end: (i32, i32)) -> DrawLine<'_> {
    DrawLine {
        image,
        start: point(start.0, start.1),
        end: point(end.0, end.1),
        color: Color::BLUE,
        stroke_width: 1,
    }
}

/// Draws a circle of the given radius, centered at `(x, y)`.
pub fn circle(image: &mut Image, x: i32, y: i32, radius: u32) -> DrawCircle<'_> {
    DrawCircle {
        image,
        center: point(x, y),
        radius,
        color: Color::RED,
        stroke_width: 1,
        filled: false,
    }
}

/// Draws an axis-aligned rectangle spanning two (inclusive) corner points.
pub fn rect(image: &mut Image, top_left: (i32, i32), bottom_right: (i32, i32)) -> DrawRect<'_> {
    DrawRect {
        image,
        top_left: point(top_left.0, top_left.1),
        bottom_right: point(bottom_right.0, bottom_right.1),
        color: Color::RED,
        stroke_width: 1,
        filled: false,
    }
}

/// Draws a text string onto an image.
///
/// By default, the text is drawn centered horizontally and vertically around `x` and `y`.
pub fn text<'a>(image: &'a mut Image, x: i32, y: i32, text: &'a str) -> DrawText<'a> {
    DrawText {
        image,
        x,
        y,
        text,
        color: Color::RED,
        alignment: text::Alignment::Center,
        baseline: text::Baseline::Middle,
    }
}

struct Target<'a>(&'a mut Image);

impl OriginDimensions for Target<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(pos, color) in pixels {
            if pos.x >= 0
                && (pos.x as u32) < self.0.width()
                && pos.y >= 0
                && (pos.y as u32) < self.0.height()
            {
                self.0.set(pos.x as u32, pos.y as u32, color);
            }
        }

        Ok(())
    }
}

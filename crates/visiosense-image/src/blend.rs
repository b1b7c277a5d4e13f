use crate::{Color, Image};

/// Adds the color channels of `src` onto `dest`, saturating at 255.
///
/// Only the area covered by both images is affected. Black source pixels leave the destination
/// untouched. Destination alpha is preserved.
pub(crate) fn add(dest: &mut Image, src: &Image) {
    let width = dest.width().min(src.width());
    let height = dest.height().min(src.height());
    for y in 0..height {
        for x in 0..width {
            let result = add_pixel(dest.get(x, y), src.get(x, y));
            dest.set(x, y, result);
        }
    }
}

fn add_pixel(dest: Color, src: Color) -> Color {
    Color([
        dest.r().saturating_add(src.r()),
        dest.g().saturating_add(src.g()),
        dest.b().saturating_add(src.b()),
        dest.a(),
    ])
}

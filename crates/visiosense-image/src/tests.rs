use super::*;
use Color as C;

fn mkimage<const W: usize, const H: usize>(data: [[Color; W]; H]) -> Image {
    let mut image = Image::new(W as u32, H as u32);
    for (y, row) in data.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            image.set(x as u32, y as u32, *color);
        }
    }
    image
}

#[test]
fn blend_add_saturates() {
    let mut image = mkimage([[C::from_rgb8(200, 10, 0), C::from_rgb8(1, 2, 3)]]);
    let canvas = mkimage([[C::from_rgb8(100, 10, 0), C::BLACK]]);
    image.add_from(&canvas);
    assert_eq!(image.get(0, 0), C::from_rgb8(255, 20, 0));
    assert_eq!(image.get(1, 0), C::from_rgb8(1, 2, 3));
}

#[test]
fn blend_size_mismatch_uses_overlap() {
    let mut image = mkimage([[C::BLACK, C::BLACK]]);
    let small = mkimage([[C::WHITE]]);
    image.add_from(&small);
    assert_eq!(image.get(0, 0), C::WHITE);
    assert_eq!(image.get(1, 0), C::BLACK);
}

#[test]
fn flip() {
    let mut image = mkimage([[C::RED, C::GREEN]]);
    image.flip_horizontal_in_place();
    assert_eq!(image.get(0, 0), C::GREEN);
    assert_eq!(image.get(1, 0), C::RED);
}

#[test]
fn rgb_and_framebuffer_conversion() {
    let image = mkimage([[C::from_rgba8(1, 2, 3, 4), C::from_rgb8(0xAA, 0xBB, 0xCC)]]);
    assert_eq!(image.to_rgb8(), [1, 2, 3, 0xAA, 0xBB, 0xCC]);

    let mut fb = vec![0; 7];
    image.write_0rgb(&mut fb);
    assert_eq!(fb, [0x010203, 0xAABBCC]);
}

#[test]
fn draw_clips_to_bounds() {
    let mut image = Image::filled(Resolution::new(4, 4), C::BLACK);
    draw::line(&mut image, (-10, 1), (10, 1)).color(C::WHITE);
    for x in 0..4 {
        assert_eq!(image.get(x, 1), C::WHITE);
        assert_eq!(image.get(x, 0), C::BLACK);
    }
}

#[test]
fn draw_degenerate_line_leaves_dot() {
    let mut image = Image::filled(Resolution::new(9, 9), C::BLACK);
    draw::line(&mut image, (4, 4), (4, 4))
        .color(C::RED)
        .stroke_width(3);
    assert_eq!(image.get(4, 4), C::RED);
    assert_eq!(image.get(0, 0), C::BLACK);
}

#[test]
fn draw_filled_circle() {
    let mut image = Image::filled(Resolution::new(21, 21), C::BLACK);
    draw::circle(&mut image, 10, 10, 5).color(C::MAGENTA).filled();
    assert_eq!(image.get(10, 10), C::MAGENTA);
    assert_eq!(image.get(12, 10), C::MAGENTA);
    assert_eq!(image.get(0, 0), C::BLACK);
    assert_eq!(image.get(10, 18), C::BLACK);
}

#[test]
fn text_size_matches_font() {
    assert_eq!(draw::text_size(""), (0, 20));
    assert_eq!(draw::text_size("abc"), (30, 20));
}

#[test]
fn draw_far_off_coordinates() {
    let mut image = Image::filled(Resolution::new(8, 8), C::BLACK);
    draw::rect(&mut image, (i32::MIN, i32::MIN), (i32::MAX, i32::MAX)).color(C::WHITE);
    draw::line(&mut image, (i32::MIN, 3), (i32::MAX, 3)).color(C::RED);
    draw::circle(&mut image, i32::MAX, i32::MAX, 3);
    assert_eq!(image.get(4, 3), C::RED);
    assert_eq!(image.get(4, 5), C::BLACK);
}

//! Pixel drawing primitives
//!
//! Software rasterization helpers shared by the annotation renderer.
//! Every primitive blends with straight-alpha source-over and clips
//! itself to the target image, so coordinates may extend past the
//! edges. Fractional coordinates are fine; coverage is decided per
//! pixel without antialiasing.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

/// Edge length of one glyph cell in the embedded 8x8 bitmap font.
pub const GLYPH_SIZE: u32 = 8;

/// Source-over blend of `src` onto `dst` with straight alpha.
pub fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f64::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let r = (f64::from(dst[0]) * inv + f64::from(src[0]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let g = (f64::from(dst[1]) * inv + f64::from(src[1]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let b = (f64::from(dst[2]) * inv + f64::from(src[2]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) + f64::from(src[3]) * inv)
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([r, g, b, out_a])
}

fn clamp_i32(value: i32, min_value: i32, max_value: i32) -> i32 {
    value.max(min_value).min(max_value)
}

fn blend_at(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let dst = *img.get_pixel(x as u32, y as u32);
    img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
}

/// Draw a filled disc centered at (`cx`, `cy`).
pub fn draw_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    if radius <= 0.1 {
        blend_at(img, cx.round() as i32, cy.round() as i32, color);
        return;
    }
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let min_x = clamp_i32((cx - radius).floor() as i32, 0, img.width() as i32 - 1);
    let max_x = clamp_i32((cx + radius).ceil() as i32, 0, img.width() as i32 - 1);
    let min_y = clamp_i32((cy - radius).floor() as i32, 0, img.height() as i32 - 1);
    let max_y = clamp_i32((cy + radius).ceil() as i32, 0, img.height() as i32 - 1);
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            if dx * dx + dy * dy <= r2 {
                let dst = *img.get_pixel(x as u32, y as u32);
                img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
            }
        }
    }
}

/// Draw a stroked segment with round caps by sweeping a disc along it.
pub fn draw_thick_line(
    img: &mut RgbaImage,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    width: f64,
    color: Rgba<u8>,
) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let distance = (dx * dx + dy * dy).sqrt();
    let steps = distance.max(1.0).ceil() as i32;
    let radius = (width.max(1.0) / 2.0).max(0.6);
    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps.max(1));
        draw_disc(img, x1 + dx * t, y1 + dy * t, radius, color);
    }
}

/// Draw a stroked segment with flat caps.
///
/// A pixel is covered when its center projects onto the segment between
/// the two endpoints and lies within half the stroke width of it. Unlike
/// [`draw_thick_line`] the stroke ends exactly at the endpoints, and no
/// pixel is blended twice.
pub fn draw_flat_segment(
    img: &mut RgbaImage,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    width: f64,
    color: Rgba<u8>,
) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return;
    }
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let half = (width.max(1.0) / 2.0).max(0.6);
    let min_x = clamp_i32(
        (x1.min(x2) - half).floor() as i32,
        0,
        img.width() as i32 - 1,
    );
    let max_x = clamp_i32(
        (x1.max(x2) + half).ceil() as i32,
        0,
        img.width() as i32 - 1,
    );
    let min_y = clamp_i32(
        (y1.min(y2) - half).floor() as i32,
        0,
        img.height() as i32 - 1,
    );
    let max_y = clamp_i32(
        (y1.max(y2) + half).ceil() as i32,
        0,
        img.height() as i32 - 1,
    );
    let half2 = half * half;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            let t = ((px - x1) * dx + (py - y1) * dy) / len2;
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let ox = px - (x1 + t * dx);
            let oy = py - (y1 + t * dy);
            if ox * ox + oy * oy <= half2 {
                let dst = *img.get_pixel(x as u32, y as u32);
                img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
            }
        }
    }
}

fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    ((a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1)).abs()) / 2.0
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64), eps: f64) -> bool {
    let total = triangle_area(a, b, c);
    if total <= eps {
        return false;
    }
    let a1 = triangle_area(p, b, c);
    let a2 = triangle_area(a, p, c);
    let a3 = triangle_area(a, b, p);
    (a1 + a2 + a3 - total).abs() <= eps
}

/// Fill a triangle given by three corner points.
pub fn fill_triangle(
    img: &mut RgbaImage,
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    color: Rgba<u8>,
) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let min_x = clamp_i32(
        a.0.min(b.0).min(c.0).floor() as i32,
        0,
        img.width() as i32 - 1,
    );
    let max_x = clamp_i32(
        a.0.max(b.0).max(c.0).ceil() as i32,
        0,
        img.width() as i32 - 1,
    );
    let min_y = clamp_i32(
        a.1.min(b.1).min(c.1).floor() as i32,
        0,
        img.height() as i32 - 1,
    );
    let max_y = clamp_i32(
        a.1.max(b.1).max(c.1).ceil() as i32,
        0,
        img.height() as i32 - 1,
    );
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            if point_in_triangle(p, a, b, c, 0.8) {
                let dst = *img.get_pixel(x as u32, y as u32);
                img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
            }
        }
    }
}

/// Fill the axis-aligned rectangle spanning (`x0`, `y0`) to (`x1`, `y1`).
///
/// A pixel is covered when its center lies inside the half-open span
/// `[min, max)` on both axes, so rectangles that share an edge tile
/// without blending any pixel twice.
pub fn fill_rect(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
    let (min_x, max_x) = (x0.min(x1), x0.max(x1));
    let (min_y, max_y) = (y0.min(y1), y0.max(y1));
    let px0 = ((min_x - 0.5).ceil() as i32).max(0);
    let px1 = ((max_x - 0.5).ceil() as i32 - 1).min(img.width() as i32 - 1);
    let py0 = ((min_y - 0.5).ceil() as i32).max(0);
    let py1 = ((max_y - 0.5).ceil() as i32 - 1).min(img.height() as i32 - 1);
    for y in py0..=py1 {
        for x in px0..=px1 {
            let dst = *img.get_pixel(x as u32, y as u32);
            img.put_pixel(x as u32, y as u32, blend_pixel(dst, color));
        }
    }
}

/// Stroke the outline of the rectangle spanning (`x0`, `y0`) to (`x1`, `y1`).
///
/// The stroke is centered on the rectangle edges. The border is built
/// from four disjoint strips, so translucent colors blend exactly once
/// per pixel. A rectangle thinner than the stroke is filled solid.
pub fn stroke_rect(
    img: &mut RgbaImage,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    width: f64,
    color: Rgba<u8>,
) {
    let (left, right) = (x0.min(x1), x0.max(x1));
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    let half = width.max(1.0) / 2.0;

    let outer_left = left - half;
    let outer_right = right + half;
    let outer_top = top - half;
    let outer_bottom = bottom + half;
    let inner_left = left + half;
    let inner_right = right - half;
    let inner_top = top + half;
    let inner_bottom = bottom - half;

    if inner_left >= inner_right || inner_top >= inner_bottom {
        fill_rect(img, outer_left, outer_top, outer_right, outer_bottom, color);
        return;
    }
    fill_rect(img, outer_left, outer_top, outer_right, inner_top, color);
    fill_rect(img, outer_left, inner_bottom, outer_right, outer_bottom, color);
    fill_rect(img, outer_left, inner_top, inner_left, inner_bottom, color);
    fill_rect(img, inner_right, inner_top, outer_right, inner_bottom, color);
}

/// Integer scale factor that renders the 8x8 font closest to `font_size`.
pub fn text_scale(font_size: f64) -> u32 {
    (font_size / f64::from(GLYPH_SIZE)).round().max(1.0) as u32
}

/// Draw text with the embedded 8x8 bitmap font.
///
/// (`x`, `y`) is the top-left corner of the first glyph cell. Newlines
/// start a fresh line one glyph row further down. Characters outside the
/// font fall back to `?`.
pub fn draw_bitmap_text(
    img: &mut RgbaImage,
    x: i32,
    y: i32,
    text: &str,
    scale: u32,
    color: Rgba<u8>,
) {
    let scale_i = scale.max(1) as i32;
    let step = GLYPH_SIZE as i32 * scale_i;
    let mut cursor_x = x;
    let mut cursor_y = y;
    for ch in text.chars() {
        if ch == '\n' {
            cursor_x = x;
            cursor_y += step;
            continue;
        }
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += step;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            let row_bits = *row;
            for col_idx in 0..8i32 {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale_i;
                let py = cursor_y + row_idx as i32 * scale_i;
                for sy in 0..scale_i {
                    for sx in 0..scale_i {
                        blend_at(img, px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += step;
    }
}

/// Blend `layer` over `dst`, scaling every layer alpha by `alpha / 255`.
///
/// Drawing a stroke into a transparent layer at full opacity and
/// compositing it through this keeps self-overlapping strokes a single
/// uniform tint instead of darkening where segments cross.
pub fn overlay_scaled_alpha(dst: &mut RgbaImage, layer: &RgbaImage, alpha: u8) {
    let width = dst.width().min(layer.width());
    let height = dst.height().min(layer.height());
    for y in 0..height {
        for x in 0..width {
            let src = *layer.get_pixel(x, y);
            if src[3] == 0 {
                continue;
            }
            let scaled = (u16::from(src[3]) * u16::from(alpha) / 255) as u8;
            if scaled == 0 {
                continue;
            }
            let dst_px = *dst.get_pixel(x, y);
            dst.put_pixel(x, y, blend_pixel(dst_px, Rgba([src[0], src[1], src[2], scaled])));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn white_canvas(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, WHITE)
    }

    #[test]
    fn test_blend_pixel_opaque_source_replaces_destination() {
        assert_eq!(blend_pixel(WHITE, RED), RED);
    }

    #[test]
    fn test_blend_pixel_transparent_source_keeps_destination() {
        assert_eq!(blend_pixel(RED, Rgba([0, 255, 0, 0])), RED);
    }

    #[test]
    fn test_blend_pixel_half_alpha_mixes_channels() {
        let out = blend_pixel(WHITE, Rgba([255, 0, 0, 127]));
        assert_eq!(out, Rgba([255, 128, 128, 255]));
    }

    #[test]
    fn test_draw_disc_covers_radius() {
        let mut img = white_canvas(20, 20);
        draw_disc(&mut img, 10.0, 10.0, 3.0, RED);

        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(13, 10), RED);
        assert_eq!(*img.get_pixel(14, 10), WHITE);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_draw_disc_clips_to_image() {
        let mut img = white_canvas(10, 10);
        draw_disc(&mut img, 0.0, 0.0, 4.0, RED);

        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(9, 9), WHITE);
    }

    #[test]
    fn test_draw_thick_line_has_round_caps() {
        let mut img = white_canvas(30, 20);
        draw_thick_line(&mut img, 5.0, 10.0, 15.0, 10.0, 4.0, RED);

        assert_eq!(*img.get_pixel(10, 10), RED);
        // cap extends half a width past the endpoint
        assert_eq!(*img.get_pixel(3, 10), RED);
        assert_eq!(*img.get_pixel(2, 10), WHITE);
        assert_eq!(*img.get_pixel(10, 8), RED);
        assert_eq!(*img.get_pixel(10, 6), WHITE);
    }

    #[test]
    fn test_draw_thick_line_zero_length_draws_dot() {
        let mut img = white_canvas(10, 10);
        draw_thick_line(&mut img, 5.0, 5.0, 5.0, 5.0, 3.0, RED);

        assert_eq!(*img.get_pixel(5, 5), RED);
    }

    #[test]
    fn test_draw_flat_segment_cuts_at_endpoints() {
        let mut img = white_canvas(30, 20);
        draw_flat_segment(&mut img, 5.0, 10.0, 15.0, 10.0, 4.0, RED);

        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(5, 11), RED);
        assert_eq!(*img.get_pixel(14, 10), RED);
        // no round overhang before the start or past the end
        assert_eq!(*img.get_pixel(3, 10), WHITE);
        assert_eq!(*img.get_pixel(16, 10), WHITE);
        // perpendicular reach is half the width
        assert_eq!(*img.get_pixel(10, 13), WHITE);
    }

    #[test]
    fn test_fill_triangle_covers_interior_only() {
        let mut img = white_canvas(20, 20);
        fill_triangle(&mut img, (2.0, 2.0), (18.0, 2.0), (2.0, 18.0), RED);

        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(17, 17), WHITE);
    }

    #[test]
    fn test_fill_rect_half_open_span() {
        let mut img = white_canvas(10, 10);
        fill_rect(&mut img, 2.0, 2.0, 5.0, 4.0, RED);

        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(4, 3), RED);
        assert_eq!(*img.get_pixel(5, 2), WHITE);
        assert_eq!(*img.get_pixel(2, 4), WHITE);
    }

    #[test]
    fn test_stroke_rect_leaves_interior_untouched() {
        let mut img = white_canvas(120, 100);
        stroke_rect(&mut img, 10.0, 10.0, 100.0, 80.0, 3.0, RED);

        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_eq!(*img.get_pixel(55, 9), RED);
        assert_eq!(*img.get_pixel(100, 80), RED);
        assert_eq!(*img.get_pixel(9, 45), RED);
        assert_eq!(*img.get_pixel(55, 45), WHITE);
        assert_eq!(*img.get_pixel(13, 13), WHITE);
    }

    #[test]
    fn test_stroke_rect_translucent_blends_once_per_pixel() {
        let mut img = white_canvas(40, 40);
        stroke_rect(&mut img, 10.0, 10.0, 30.0, 30.0, 4.0, Rgba([255, 0, 0, 127]));

        let expected = blend_pixel(WHITE, Rgba([255, 0, 0, 127]));
        // corner pixels sit where two strips could meet
        assert_eq!(*img.get_pixel(10, 10), expected);
        assert_eq!(*img.get_pixel(30, 30), expected);
        assert_eq!(*img.get_pixel(20, 10), expected);
    }

    #[test]
    fn test_stroke_rect_thinner_than_stroke_fills_solid() {
        let mut img = white_canvas(40, 40);
        stroke_rect(&mut img, 10.0, 10.0, 13.0, 30.0, 8.0, RED);

        assert_eq!(*img.get_pixel(11, 20), RED);
    }

    #[test]
    fn test_draw_bitmap_text_stays_in_glyph_cell() {
        let mut img = white_canvas(20, 20);
        draw_bitmap_text(&mut img, 2, 2, "A", 1, Rgba([0, 0, 0, 255]));

        let mut drawn = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if *px != WHITE {
                drawn += 1;
                assert!((2..10).contains(&x), "pixel outside glyph cell at {x},{y}");
                assert!((2..10).contains(&y), "pixel outside glyph cell at {x},{y}");
            }
        }
        assert!(drawn > 0);
    }

    #[test]
    fn test_draw_bitmap_text_newline_advances_row() {
        let mut img = white_canvas(20, 30);
        draw_bitmap_text(&mut img, 0, 0, "A\nA", 1, Rgba([0, 0, 0, 255]));

        let mut first_line = 0;
        let mut second_line = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if *px == WHITE {
                continue;
            }
            assert!(x < 8, "second line must restart at the left edge");
            if y < 8 {
                first_line += 1;
            } else if y < 16 {
                second_line += 1;
            } else {
                panic!("pixel drawn below the second line at {x},{y}");
            }
        }
        assert!(first_line > 0);
        assert!(second_line > 0);
    }

    #[test]
    fn test_draw_bitmap_text_scales_glyphs() {
        let mut img = white_canvas(40, 40);
        draw_bitmap_text(&mut img, 0, 0, "A", 2, Rgba([0, 0, 0, 255]));

        let mut max_x = 0;
        for (x, _, px) in img.enumerate_pixels() {
            if *px != WHITE && x > max_x {
                max_x = x;
            }
        }
        assert!(max_x >= 8, "scaled glyph should span more than one cell");
        assert!(max_x < 16);
    }

    #[test]
    fn test_text_scale_snaps_to_integer_multiples() {
        assert_eq!(text_scale(16.0), 2);
        assert_eq!(text_scale(8.0), 1);
        assert_eq!(text_scale(20.0), 3);
        assert_eq!(text_scale(1.0), 1);
    }

    #[test]
    fn test_overlay_scaled_alpha_uniform_tint() {
        let mut img = white_canvas(10, 10);
        let mut layer = RgbaImage::new(10, 10);
        // overlapping opaque strokes stay opaque inside the layer
        draw_disc(&mut layer, 4.0, 4.0, 2.0, RED);
        draw_disc(&mut layer, 5.0, 4.0, 2.0, RED);
        overlay_scaled_alpha(&mut img, &layer, 127);

        let expected = blend_pixel(WHITE, Rgba([255, 0, 0, 127]));
        assert_eq!(*img.get_pixel(4, 4), expected);
        assert_eq!(*img.get_pixel(5, 4), expected);
        assert_eq!(*img.get_pixel(9, 9), WHITE);
    }
}

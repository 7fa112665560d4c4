//! Annotation rasterization
//!
//! Turns the annotation shape model into pixels on top of a cropped
//! capture. Shape coordinates live in full-capture space; callers pass
//! the offset that shifts them into the target image's local space.
//! Rendering never mutates the annotation.

use std::f64::consts::FRAC_PI_2;

use image::{Rgba, RgbaImage};
use snipmark_core::{
    Annotation, AnnotationShape, Color, Point, ARROW_HEAD_HALF_ANGLE_DEG, ARROW_HEAD_LENGTH,
};

use crate::raster;

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// Render one annotation into `img`, shifted by (`dx`, `dy`).
///
/// Live previews render exactly like committed annotations; whether a
/// preview is included at all is the caller's call.
pub fn render_annotation(img: &mut RgbaImage, annotation: &Annotation, dx: f64, dy: f64) {
    let style = annotation.style();
    let color = to_rgba(style.stroke_color);
    match annotation.shape() {
        AnnotationShape::Freehand { points } => {
            render_path(img, points, dx, dy, style.stroke_width, color);
        }
        AnnotationShape::Line { start, end } => {
            raster::draw_thick_line(
                img,
                start.x + dx,
                start.y + dy,
                end.x + dx,
                end.y + dy,
                style.stroke_width,
                color,
            );
        }
        AnnotationShape::Arrow { start, end } => {
            render_arrow(img, *start, *end, dx, dy, style.stroke_width, color);
        }
        AnnotationShape::Rectangle { start, end } => {
            raster::stroke_rect(
                img,
                start.x + dx,
                start.y + dy,
                end.x + dx,
                end.y + dy,
                style.stroke_width,
                color,
            );
        }
        AnnotationShape::Highlighter { points } => {
            render_highlight(img, points, dx, dy, style.stroke_width, style.stroke_color);
        }
        AnnotationShape::Text { position, content } => {
            raster::draw_bitmap_text(
                img,
                (position.x + dx).round() as i32,
                (position.y + dy).round() as i32,
                content,
                raster::text_scale(style.font_size),
                color,
            );
        }
    }
}

/// Polyline with round caps and joins. A single point renders as a dot.
fn render_path(
    img: &mut RgbaImage,
    points: &[Point],
    dx: f64,
    dy: f64,
    width: f64,
    color: Rgba<u8>,
) {
    if points.len() == 1 {
        let p = points[0];
        raster::draw_thick_line(img, p.x + dx, p.y + dy, p.x + dx, p.y + dy, width, color);
        return;
    }
    for pair in points.windows(2) {
        raster::draw_thick_line(
            img,
            pair[0].x + dx,
            pair[0].y + dy,
            pair[1].x + dx,
            pair[1].y + dy,
            width,
            color,
        );
    }
}

/// Marker stroke: flat caps, round joins, composited at half the stored
/// alpha.
///
/// The whole path is drawn opaque into a scratch layer first and the
/// layer is blended down once, so a path crossing itself keeps one
/// uniform tint.
fn render_highlight(
    img: &mut RgbaImage,
    points: &[Point],
    dx: f64,
    dy: f64,
    width: f64,
    color: Color,
) {
    if points.is_empty() {
        return;
    }
    let mut layer = RgbaImage::new(img.width(), img.height());
    let opaque = Rgba([color.r, color.g, color.b, 255]);
    let half = (width.max(1.0) / 2.0).max(0.6);
    if points.len() == 1 {
        raster::draw_disc(&mut layer, points[0].x + dx, points[0].y + dy, half, opaque);
    } else {
        for pair in points.windows(2) {
            raster::draw_flat_segment(
                &mut layer,
                pair[0].x + dx,
                pair[0].y + dy,
                pair[1].x + dx,
                pair[1].y + dy,
                width,
                opaque,
            );
        }
        for joint in &points[1..points.len() - 1] {
            raster::draw_disc(&mut layer, joint.x + dx, joint.y + dy, half, opaque);
        }
    }
    raster::overlay_scaled_alpha(img, &layer, color.a / 2);
}

/// Shaft plus a filled triangular head at the end point.
fn render_arrow(
    img: &mut RgbaImage,
    start: Point,
    end: Point,
    dx: f64,
    dy: f64,
    width: f64,
    color: Rgba<u8>,
) {
    let x1 = start.x + dx;
    let y1 = start.y + dy;
    let x2 = end.x + dx;
    let y2 = end.y + dy;
    if (x2 - x1).abs() < f64::EPSILON && (y2 - y1).abs() < f64::EPSILON {
        return;
    }
    let angle = (y2 - y1).atan2(x2 - x1);
    let back_x = x2 - ARROW_HEAD_LENGTH * angle.cos();
    let back_y = y2 - ARROW_HEAD_LENGTH * angle.sin();
    raster::draw_thick_line(img, x1, y1, back_x, back_y, width, color);

    let half_width = ARROW_HEAD_LENGTH * ARROW_HEAD_HALF_ANGLE_DEG.to_radians().tan();
    let left_angle = angle + FRAC_PI_2;
    let right_angle = angle - FRAC_PI_2;
    let left = (
        back_x + half_width * left_angle.cos(),
        back_y + half_width * left_angle.sin(),
    );
    let right = (
        back_x + half_width * right_angle.cos(),
        back_y + half_width * right_angle.sin(),
    );
    raster::fill_triangle(img, (x2, y2), left, right, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipmark_core::AnnotationStyle;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(100, 100, WHITE)
    }

    fn style(width: f64) -> AnnotationStyle {
        AnnotationStyle::new(Color::RED, width)
    }

    #[test]
    fn test_line_renders_along_path() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Line {
                start: Point::new(10.0, 50.0),
                end: Point::new(90.0, 50.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert_eq!(*img.get_pixel(50, 50), RED);
        assert_eq!(*img.get_pixel(50, 60), WHITE);
    }

    #[test]
    fn test_freehand_connects_points() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Freehand {
                points: vec![
                    Point::new(10.0, 10.0),
                    Point::new(50.0, 10.0),
                    Point::new(50.0, 50.0),
                ],
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert_eq!(*img.get_pixel(30, 10), RED);
        assert_eq!(*img.get_pixel(50, 30), RED);
        assert_eq!(*img.get_pixel(30, 30), WHITE);
    }

    #[test]
    fn test_freehand_single_point_draws_dot() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Freehand {
                points: vec![Point::new(20.0, 20.0)],
            },
            style(4.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert_eq!(*img.get_pixel(20, 20), RED);
    }

    #[test]
    fn test_rectangle_strokes_outline_only() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Rectangle {
                start: Point::new(10.0, 10.0),
                end: Point::new(60.0, 40.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert_eq!(*img.get_pixel(35, 10), RED);
        assert_eq!(*img.get_pixel(10, 25), RED);
        assert_eq!(*img.get_pixel(35, 25), WHITE);
    }

    #[test]
    fn test_arrow_draws_shaft_and_head() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Arrow {
                start: Point::new(10.0, 50.0),
                end: Point::new(90.0, 50.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        // shaft
        assert_eq!(*img.get_pixel(40, 50), RED);
        // inside the head triangle, behind the tip
        assert_eq!(*img.get_pixel(85, 50), RED);
        // beside the head, outside the triangle
        assert_eq!(*img.get_pixel(85, 60), WHITE);
    }

    #[test]
    fn test_arrow_without_direction_renders_nothing() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Arrow {
                start: Point::new(50.0, 50.0),
                end: Point::new(50.0, 50.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert!(img.pixels().all(|px| *px == WHITE));
    }

    #[test]
    fn test_highlighter_composites_at_half_alpha() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Highlighter {
                points: vec![Point::new(10.0, 50.0), Point::new(90.0, 50.0)],
            },
            AnnotationStyle::new(Color::YELLOW, 20.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        let expected = raster::blend_pixel(WHITE, Rgba([255, 255, 0, 127]));
        assert_eq!(*img.get_pixel(50, 50), expected);
        // flat cap: nothing before the start point
        assert_eq!(*img.get_pixel(5, 50), WHITE);
    }

    #[test]
    fn test_highlighter_self_overlap_stays_uniform() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Highlighter {
                points: vec![
                    Point::new(20.0, 50.0),
                    Point::new(80.0, 50.0),
                    Point::new(20.0, 50.0),
                ],
            },
            AnnotationStyle::new(Color::RED, 20.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        let expected = raster::blend_pixel(WHITE, Rgba([255, 0, 0, 127]));
        // the doubled-back stretch must not darken
        assert_eq!(*img.get_pixel(50, 50), expected);
        assert_eq!(*img.get_pixel(50, 45), expected);
    }

    #[test]
    fn test_text_renders_within_glyph_band() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Text {
                position: Point::new(10.0, 10.0),
                content: String::from("Hi"),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        let mut drawn = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if *px != WHITE {
                drawn += 1;
                assert!((10..42).contains(&x), "glyph pixel out of band at {x},{y}");
                assert!((10..26).contains(&y), "glyph pixel out of band at {x},{y}");
            }
        }
        assert!(drawn > 0);
    }

    #[test]
    fn test_offset_shifts_into_local_space() {
        let mut img = canvas();
        let ann = Annotation::new(
            AnnotationShape::Line {
                start: Point::new(120.0, 80.0),
                end: Point::new(120.0, 80.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, -100.0, -50.0);

        assert_eq!(*img.get_pixel(20, 30), RED);
    }

    #[test]
    fn test_preview_renders_like_committed() {
        let mut img = canvas();
        let ann = Annotation::preview(
            AnnotationShape::Line {
                start: Point::new(10.0, 20.0),
                end: Point::new(60.0, 20.0),
            },
            style(3.0),
        );
        render_annotation(&mut img, &ann, 0.0, 0.0);

        assert_eq!(*img.get_pixel(30, 20), RED);
    }
}

//! Capture compositing
//!
//! Crops the captured raster to the confirmed region and flattens the
//! annotation list on top in insertion order. The capture is never
//! modified; every flatten starts from a fresh crop, so undoing an
//! annotation and exporting again produces a clean result.

use image::imageops;
use image::RgbaImage;
use snipmark_core::{Annotation, AnnotationCollection, Rect};
use thiserror::Error;

use crate::annotations::render_annotation;

/// Compositing failure
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The requested region missed the raster entirely
    #[error(
        "crop region ({x}, {y}) {width}x{height} does not intersect the {raster_width}x{raster_height} capture"
    )]
    CropFailed {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        raster_width: u32,
        raster_height: u32,
    },
}

/// Pixel-snap `region` and intersect it with the raster bounds.
///
/// Returns `(x, y, width, height)` of the crop window, or the error when
/// less than a full pixel survives the intersection.
fn crop_bounds(raster: &RgbaImage, region: &Rect) -> Result<(u32, u32, u32, u32), CompositeError> {
    let (raster_width, raster_height) = raster.dimensions();
    let left = region.left().round().max(0.0);
    let top = region.top().round().max(0.0);
    let right = region.right().round().min(f64::from(raster_width));
    let bottom = region.bottom().round().min(f64::from(raster_height));
    if right - left < 1.0 || bottom - top < 1.0 {
        return Err(CompositeError::CropFailed {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            raster_width,
            raster_height,
        });
    }
    Ok((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Crop `raster` to `region`, clamped to the raster bounds.
pub fn crop_region(raster: &RgbaImage, region: &Rect) -> Result<RgbaImage, CompositeError> {
    let (x, y, width, height) = crop_bounds(raster, region)?;
    Ok(imageops::crop_imm(raster, x, y, width, height).to_image())
}

/// Crop to `region` and rasterize the annotations over it.
///
/// Committed annotations draw in insertion order; the live `preview`
/// draws last when present. Annotation coordinates are full-capture
/// coordinates and shift by the crop origin.
pub fn flatten(
    raster: &RgbaImage,
    region: &Rect,
    annotations: &AnnotationCollection,
    preview: Option<&Annotation>,
) -> Result<RgbaImage, CompositeError> {
    let (x, y, width, height) = crop_bounds(raster, region)?;
    let mut output = imageops::crop_imm(raster, x, y, width, height).to_image();
    let dx = -f64::from(x);
    let dy = -f64::from(y);
    for annotation in annotations.iter() {
        render_annotation(&mut output, annotation, dx, dy);
    }
    if let Some(preview) = preview {
        render_annotation(&mut output, preview, dx, dy);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use snipmark_core::{AnnotationShape, AnnotationStyle, Color, Point};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn gradient_raster(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        })
    }

    #[test]
    fn test_crop_region_extracts_window() {
        let raster = gradient_raster(100, 80);
        let out = crop_region(&raster, &Rect::new(10.0, 5.0, 30.0, 20.0)).unwrap();

        assert_eq!(out.dimensions(), (30, 20));
        assert_eq!(*out.get_pixel(0, 0), *raster.get_pixel(10, 5));
        assert_eq!(*out.get_pixel(29, 19), *raster.get_pixel(39, 24));
    }

    #[test]
    fn test_crop_region_clamps_to_raster() {
        let raster = gradient_raster(200, 100);
        let out = crop_region(&raster, &Rect::new(190.0, 90.0, 50.0, 50.0)).unwrap();

        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(*out.get_pixel(0, 0), *raster.get_pixel(190, 90));
    }

    #[test]
    fn test_crop_region_outside_raster_fails() {
        let raster = gradient_raster(200, 100);

        match crop_region(&raster, &Rect::new(500.0, 500.0, 50.0, 50.0)) {
            Err(CompositeError::CropFailed { raster_width, .. }) => {
                assert_eq!(raster_width, 200);
            }
            Ok(_) => panic!("expected crop failure"),
        }
    }

    #[test]
    fn test_crop_region_zero_size_fails() {
        let raster = gradient_raster(200, 100);

        assert!(crop_region(&raster, &Rect::new(50.0, 50.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_flatten_without_annotations_equals_crop() {
        let raster = gradient_raster(100, 80);
        let region = Rect::new(10.0, 5.0, 30.0, 20.0);
        let crop = crop_region(&raster, &region).unwrap();
        let flat = flatten(&raster, &region, &AnnotationCollection::new(), None).unwrap();

        assert_eq!(flat, crop);
    }

    #[test]
    fn test_flatten_translates_annotations_into_crop_space() {
        let raster = RgbaImage::from_pixel(400, 300, WHITE);
        let region = Rect::new(100.0, 50.0, 200.0, 200.0);
        let mut annotations = AnnotationCollection::new();
        annotations.push(Annotation::new(
            AnnotationShape::Line {
                start: Point::new(120.0, 80.0),
                end: Point::new(120.0, 80.0),
            },
            AnnotationStyle::default(),
        ));

        let out = flatten(&raster, &region, &annotations, None).unwrap();

        assert_eq!(out.dimensions(), (200, 200));
        assert_eq!(*out.get_pixel(20, 30), RED);
    }

    #[test]
    fn test_flatten_keeps_raster_untouched() {
        let raster = RgbaImage::from_pixel(100, 100, WHITE);
        let before = raster.clone();
        let mut annotations = AnnotationCollection::new();
        annotations.push(Annotation::new(
            AnnotationShape::Line {
                start: Point::new(10.0, 10.0),
                end: Point::new(90.0, 90.0),
            },
            AnnotationStyle::default(),
        ));

        flatten(&raster, &Rect::new(0.0, 0.0, 100.0, 100.0), &annotations, None).unwrap();

        assert_eq!(raster, before);
    }

    #[test]
    fn test_flatten_draws_preview_last() {
        let raster = RgbaImage::from_pixel(100, 100, WHITE);
        let mut annotations = AnnotationCollection::new();
        annotations.push(Annotation::new(
            AnnotationShape::Line {
                start: Point::new(50.0, 20.0),
                end: Point::new(50.0, 20.0),
            },
            AnnotationStyle::new(Color::BLUE, 3.0),
        ));
        let preview = Annotation::preview(
            AnnotationShape::Line {
                start: Point::new(50.0, 20.0),
                end: Point::new(50.0, 20.0),
            },
            AnnotationStyle::new(Color::RED, 3.0),
        );

        let out = flatten(
            &raster,
            &Rect::new(0.0, 0.0, 100.0, 100.0),
            &annotations,
            Some(&preview),
        )
        .unwrap();

        // preview covers the committed stroke at the same spot
        assert_eq!(*out.get_pixel(50, 20), RED);
    }

    #[test]
    fn test_flatten_is_repeatable_after_undo() {
        let raster = RgbaImage::from_pixel(100, 100, WHITE);
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut annotations = AnnotationCollection::new();
        annotations.push(Annotation::new(
            AnnotationShape::Line {
                start: Point::new(10.0, 50.0),
                end: Point::new(90.0, 50.0),
            },
            AnnotationStyle::default(),
        ));

        let with_line = flatten(&raster, &region, &annotations, None).unwrap();
        assert_eq!(*with_line.get_pixel(50, 50), RED);

        // dropping the annotation and flattening again starts clean
        annotations.clear();
        let clean = flatten(&raster, &region, &annotations, None).unwrap();
        assert_eq!(*clean.get_pixel(50, 50), WHITE);
    }
}

//! Annotation data model
//!
//! Shape variants with immutable style for markups drawn over a captured
//! raster. All coordinates are stored in full-capture coordinate space;
//! the compositor translates them into crop-local space at flatten time.

use std::sync::Arc;

use crate::geometry::{Point, Rect};

/// Unique identifier for an annotation
///
/// Generated using UUID v4 for guaranteed uniqueness within a session.
pub type AnnotationId = uuid::Uuid;

/// Length of the filled arrow head, in device-independent pixels
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Half-angle of the arrow head in degrees, measured from the shaft
pub const ARROW_HEAD_HALF_ANGLE_DEG: f64 = 25.0;

/// Maximum number of characters accepted for a text annotation
pub const MAX_TEXT_LEN: usize = 500;

/// Default font size for text annotations
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Return the same color with a replaced alpha channel
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }
}

/// Annotation palette
impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const YELLOW: Color = Color { r: 255, g: 255, b: 0, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
}

/// Visual styling applied when an annotation is rasterized
///
/// Immutable once the annotation is committed. Changing the session's
/// current color or width affects the next annotation, never this one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStyle {
    /// Stroke color for lines and outlines
    pub stroke_color: Color,

    /// Stroke width in device-independent pixels
    pub stroke_width: f64,

    /// Font size for text annotations
    pub font_size: f64,
}

impl AnnotationStyle {
    /// Create a style with the given stroke color and width
    pub fn new(stroke_color: Color, stroke_width: f64) -> Self {
        Self {
            stroke_color,
            stroke_width,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Replace the font size
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self::new(Color::RED, 3.0)
    }
}

/// Shape variant geometry
///
/// Line, Arrow and Rectangle are direction-agnostic: start and end are
/// whichever corners the drag produced. Freehand and Highlighter keep the
/// raw point trail; a single-point trail renders as a dot.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationShape {
    /// Freehand drawing path
    Freehand { points: Vec<Point> },

    /// Line segment from start to end point
    Line { start: Point, end: Point },

    /// Line segment with a filled triangular head at the end point
    Arrow { start: Point, end: Point },

    /// Stroke-only axis-aligned box between two corners
    Rectangle { start: Point, end: Point },

    /// Marker-style path, rendered wide and translucent
    Highlighter { points: Vec<Point> },

    /// Text at an insertion position
    Text { position: Point, content: String },
}

impl AnnotationShape {
    /// Get the bounding box for this shape
    ///
    /// For arrows the box is inflated by [`ARROW_HEAD_LENGTH`] on every side
    /// so the head triangle can never escape it. Text extent approximates the
    /// bitmap-font cell metrics used by the rasterizer.
    pub fn bounding_box(&self, font_size: f64) -> Rect {
        match self {
            AnnotationShape::Freehand { points } | AnnotationShape::Highlighter { points } => {
                points_bounding_box(points)
            }
            AnnotationShape::Line { start, end } | AnnotationShape::Rectangle { start, end } => {
                Rect::from_corners(*start, *end)
            }
            AnnotationShape::Arrow { start, end } => {
                let line = Rect::from_corners(*start, *end);
                Rect::new(
                    line.x - ARROW_HEAD_LENGTH,
                    line.y - ARROW_HEAD_LENGTH,
                    line.width + 2.0 * ARROW_HEAD_LENGTH,
                    line.height + 2.0 * ARROW_HEAD_LENGTH,
                )
            }
            AnnotationShape::Text { position, content } => {
                let columns = content
                    .lines()
                    .map(|line| line.chars().count())
                    .max()
                    .unwrap_or(0);
                let rows = content.lines().count().max(1);
                Rect::new(
                    position.x,
                    position.y,
                    columns as f64 * font_size,
                    rows as f64 * font_size,
                )
            }
        }
    }
}

fn points_bounding_box(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };

    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;

    for point in &points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Complete annotation with identity, shape and style
///
/// The shape is only mutated while the annotation is the live preview of an
/// in-progress drag. Once committed and pushed through a command it is never
/// changed in place, only removed and re-added by undo/redo.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Stable unique identifier
    id: AnnotationId,

    /// Shape variant and geometry
    shape: Arc<AnnotationShape>,

    /// Visual style
    style: Arc<AnnotationStyle>,

    /// Creation timestamp (Unix timestamp in seconds)
    created_at: i64,

    /// True while the annotation is being drawn and not yet committed
    preview: bool,
}

impl Annotation {
    /// Create a committed annotation
    pub fn new(shape: AnnotationShape, style: AnnotationStyle) -> Self {
        Self {
            id: AnnotationId::new_v4(),
            shape: Arc::new(shape),
            style: Arc::new(style),
            created_at: unix_timestamp(),
            preview: false,
        }
    }

    /// Create a live-preview annotation for an in-progress drag
    pub fn preview(shape: AnnotationShape, style: AnnotationStyle) -> Self {
        Self {
            preview: true,
            ..Self::new(shape, style)
        }
    }

    /// Get the annotation ID
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Get the shape (immutable reference)
    pub fn shape(&self) -> &AnnotationShape {
        &self.shape
    }

    /// Get the style (immutable reference)
    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    /// Get the creation timestamp (Unix seconds)
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Whether this annotation is still a live preview
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// Get the bounding box in full-capture coordinates
    pub fn bounding_box(&self) -> Rect {
        self.shape.bounding_box(self.style.font_size)
    }

    /// Mutable shape access for extending the live preview
    pub(crate) fn shape_mut(&mut self) -> &mut AnnotationShape {
        Arc::make_mut(&mut self.shape)
    }

    /// Mark the preview as finished
    pub(crate) fn commit(&mut self) {
        self.preview = false;
    }
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

//! Snipmark Core Library
//!
//! Selection and annotation editing engine for the screen capture tool.
//! Host-agnostic: consumes a normalized pointer/keyboard event stream and
//! never talks to the OS, the raster or any sink directly.

pub mod annotation;
pub mod collection;
pub mod command;
pub mod geometry;
pub mod input;
pub mod selection;
pub mod session;
pub mod tools;

pub use annotation::{
    Annotation, AnnotationId, AnnotationShape, AnnotationStyle, Color, ARROW_HEAD_HALF_ANGLE_DEG,
    ARROW_HEAD_LENGTH, DEFAULT_FONT_SIZE, MAX_TEXT_LEN,
};
pub use collection::AnnotationCollection;
pub use command::{CommandHistory, EditorCommand};
pub use geometry::{Point, Rect};
pub use input::{Key, Modifiers};
pub use selection::{
    DragOutcome, Handle, RegionSelector, SelectionState, HANDLE_HIT_RADIUS, MIN_SELECTION_SIZE,
    NUDGE_STEP, NUDGE_STEP_LARGE,
};
pub use session::{EditorSession, SessionConfig, SessionEvent};
pub use tools::Tool;

//! Editor session controller
//!
//! Routes the normalized input stream between the region selector, the
//! drawing tools and inline text entry, and owns the annotation collection
//! plus its undo history. One session per capture; the host creates it with
//! the capture dimensions and destroys it on cancel or after export.

use crate::annotation::{
    Annotation, AnnotationShape, AnnotationStyle, Color, DEFAULT_FONT_SIZE, MAX_TEXT_LEN,
};
use crate::collection::AnnotationCollection;
use crate::command::{CommandHistory, EditorCommand};
use crate::geometry::{Point, Rect};
use crate::input::{Key, Modifiers};
use crate::selection::{DragOutcome, RegionSelector, SelectionState, NUDGE_STEP, NUDGE_STEP_LARGE};
use crate::tools::Tool;

/// Session-scoped defaults handed in by the host
///
/// The engine never reads ambient settings; everything it needs arrives
/// through this struct at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Stroke color applied to the next constructed annotation
    pub color: Color,

    /// Explicit stroke width override; None uses the active tool's default
    pub stroke_width: Option<f64>,

    /// Font size for text annotations
    pub font_size: f64,

    /// Tool active when the session opens
    pub tool: Tool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            color: Color::RED,
            stroke_width: None,
            font_size: DEFAULT_FONT_SIZE,
            tool: Tool::None,
        }
    }
}

/// Lifecycle signal emitted by the session, at most one per input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// A new selection was committed
    SelectionConfirmed(Rect),

    /// The session was cancelled; the host should destroy it
    SelectionCancelled,

    /// The user asked to export the current selection
    ExportRequested,
}

/// Inline text entry opened by the Text tool
#[derive(Debug, Clone)]
struct TextEntry {
    position: Point,
    buffer: String,
}

/// The selection-and-annotation editing engine for one capture
#[derive(Debug)]
pub struct EditorSession {
    selector: RegionSelector,
    annotations: AnnotationCollection,
    history: CommandHistory,
    tool: Tool,
    color: Color,
    stroke_width: Option<f64>,
    font_size: f64,
    preview: Option<Annotation>,
    text_entry: Option<TextEntry>,
    cancelled: bool,
}

impl EditorSession {
    /// Create a session over a capture of the given pixel dimensions
    pub fn new(capture_width: u32, capture_height: u32, config: SessionConfig) -> Self {
        let bounds = Rect::from_size(f64::from(capture_width), f64::from(capture_height));
        Self {
            selector: RegionSelector::new(bounds),
            annotations: AnnotationCollection::new(),
            history: CommandHistory::new(),
            tool: config.tool,
            color: config.color,
            stroke_width: config.stroke_width,
            font_size: config.font_size,
            preview: None,
            text_entry: None,
            cancelled: false,
        }
    }

    /// The region selector (selection rect, handles, dim overlay)
    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    /// The committed annotations in z-order
    pub fn annotations(&self) -> &AnnotationCollection {
        &self.annotations
    }

    /// The in-progress annotation, rendered live but not yet committed
    pub fn preview(&self) -> Option<&Annotation> {
        self.preview.as_ref()
    }

    /// The confirmed selection region, if any
    pub fn region(&self) -> Option<Rect> {
        self.selector.region()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch the active tool
    ///
    /// An open text entry commits first (the tool change takes focus); an
    /// in-progress drag preview is dropped without being committed.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.text_entry.is_some() {
            self.commit_text_entry();
        }
        self.preview = None;
        self.tool = tool;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the color applied to subsequently constructed annotations
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn stroke_width(&self) -> Option<f64> {
        self.stroke_width
    }

    /// Override the stroke width for subsequent annotations (None restores
    /// per-tool defaults)
    pub fn set_stroke_width(&mut self, width: Option<f64>) {
        self.stroke_width = width;
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.font_size = font_size;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the most recent committed annotation change
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.annotations)
    }

    /// Redo the most recently undone change
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.annotations)
    }

    /// Install the change hook fired on every collection mutation
    pub fn set_on_change(&mut self, hook: impl FnMut() + 'static) {
        self.history.set_on_change(hook);
    }

    /// Whether an inline text entry is open
    pub fn text_entry_active(&self) -> bool {
        self.text_entry.is_some()
    }

    /// Contents of the open text entry, for the host to render
    pub fn text_entry_content(&self) -> Option<&str> {
        self.text_entry.as_ref().map(|entry| entry.buffer.as_str())
    }

    /// Whether the session was cancelled and should be destroyed
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Handle a pointer press
    pub fn pointer_down(&mut self, point: Point) {
        if self.cancelled {
            return;
        }
        if self.text_entry.is_some() {
            // Clicking anywhere else takes focus away from the entry
            self.commit_text_entry();
        }

        match self.selector.state() {
            SelectionState::Idle => self.selector.begin_drag(point),
            SelectionState::Confirmed => {
                if let Some(handle) = self.selector.handle_at(&point) {
                    self.selector.begin_resize(handle, point);
                } else if self.region_contains(&point) {
                    match self.tool {
                        Tool::None => self.selector.begin_move(point),
                        Tool::Text => self.open_text_entry(point),
                        _ => self.start_preview(point),
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle a pointer move
    pub fn pointer_move(&mut self, point: Point) {
        if self.cancelled {
            return;
        }
        if self.preview.is_some() {
            self.extend_preview(point);
        } else {
            self.selector.pointer_moved(point);
        }
    }

    /// Handle a pointer release
    pub fn pointer_up(&mut self, point: Point) -> Option<SessionEvent> {
        if self.cancelled {
            return None;
        }
        if self.preview.is_some() {
            self.extend_preview(point);
            self.commit_preview();
            return None;
        }

        match self.selector.pointer_released(point) {
            DragOutcome::Selected(rect) => Some(SessionEvent::SelectionConfirmed(rect)),
            _ => None,
        }
    }

    /// Handle a key press
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Option<SessionEvent> {
        if self.cancelled {
            return None;
        }
        if self.text_entry.is_some() {
            self.text_entry_key(key, modifiers);
            return None;
        }

        match key {
            Key::Escape => {
                self.cancel();
                Some(SessionEvent::SelectionCancelled)
            }
            Key::Enter if self.selector.state() == SelectionState::Confirmed => {
                Some(SessionEvent::ExportRequested)
            }
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                let step = if modifiers.shift {
                    NUDGE_STEP_LARGE
                } else {
                    NUDGE_STEP
                };
                let (dx, dy) = match key {
                    Key::ArrowLeft => (-step, 0.0),
                    Key::ArrowRight => (step, 0.0),
                    Key::ArrowUp => (0.0, -step),
                    _ => (0.0, step),
                };
                self.selector.nudge(dx, dy);
                None
            }
            Key::Char(c) if modifiers.ctrl => {
                match c.to_ascii_lowercase() {
                    'z' => {
                        self.undo();
                    }
                    'y' => {
                        self.redo();
                    }
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    /// The host lost input focus; an open text entry finalizes
    pub fn focus_lost(&mut self) {
        if self.cancelled {
            return;
        }
        self.commit_text_entry();
    }

    fn region_contains(&self, point: &Point) -> bool {
        self.selector
            .region()
            .map(|region| region.contains(point))
            .unwrap_or(false)
    }

    fn current_style(&self, tool: Tool) -> AnnotationStyle {
        let width = self
            .stroke_width
            .unwrap_or_else(|| tool.default_stroke_width());
        AnnotationStyle::new(self.color, width).with_font_size(self.font_size)
    }

    fn start_preview(&mut self, point: Point) {
        let shape = match self.tool {
            Tool::Freehand => AnnotationShape::Freehand {
                points: vec![point],
            },
            Tool::Highlighter => AnnotationShape::Highlighter {
                points: vec![point],
            },
            Tool::Line => AnnotationShape::Line {
                start: point,
                end: point,
            },
            Tool::Arrow => AnnotationShape::Arrow {
                start: point,
                end: point,
            },
            Tool::Rectangle => AnnotationShape::Rectangle {
                start: point,
                end: point,
            },
            Tool::None | Tool::Text => return,
        };
        self.preview = Some(Annotation::preview(shape, self.current_style(self.tool)));
    }

    fn extend_preview(&mut self, point: Point) {
        let Some(region) = self.selector.region() else {
            return;
        };
        let point = point.clamped_to(&region);

        if let Some(preview) = self.preview.as_mut() {
            match preview.shape_mut() {
                AnnotationShape::Freehand { points } | AnnotationShape::Highlighter { points } => {
                    points.push(point);
                }
                AnnotationShape::Line { end, .. }
                | AnnotationShape::Arrow { end, .. }
                | AnnotationShape::Rectangle { end, .. } => {
                    *end = point;
                }
                AnnotationShape::Text { .. } => {}
            }
        }
    }

    fn commit_preview(&mut self) {
        let Some(mut annotation) = self.preview.take() else {
            return;
        };
        annotation.commit();
        self.history
            .execute(&mut self.annotations, EditorCommand::AddAnnotation { annotation });
    }

    fn open_text_entry(&mut self, point: Point) {
        self.text_entry = Some(TextEntry {
            position: point,
            buffer: String::new(),
        });
    }

    fn text_entry_key(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::Enter if modifiers.shift => self.text_push('\n'),
            Key::Enter => self.commit_text_entry(),
            Key::Escape => self.text_entry = None,
            Key::Backspace => {
                if let Some(entry) = self.text_entry.as_mut() {
                    entry.buffer.pop();
                }
            }
            Key::Char(c) if !modifiers.ctrl => self.text_push(c),
            _ => {}
        }
    }

    fn text_push(&mut self, c: char) {
        if let Some(entry) = self.text_entry.as_mut() {
            if entry.buffer.chars().count() < MAX_TEXT_LEN {
                entry.buffer.push(c);
            }
        }
    }

    fn commit_text_entry(&mut self) {
        let Some(entry) = self.text_entry.take() else {
            return;
        };
        if entry.buffer.trim().is_empty() {
            return;
        }

        let annotation = Annotation::new(
            AnnotationShape::Text {
                position: entry.position,
                content: entry.buffer,
            },
            self.current_style(Tool::Text),
        );
        self.history
            .execute(&mut self.annotations, EditorCommand::AddAnnotation { annotation });
    }

    /// Tear the session down with no partial side effects
    fn cancel(&mut self) {
        self.preview = None;
        self.text_entry = None;
        self.annotations.clear();
        self.history.clear();
        self.selector = RegionSelector::new(self.selector.bounds());
        self.cancelled = true;
    }
}

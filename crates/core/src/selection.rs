//! Region selection state machine
//!
//! Drag-to-create, 8-handle resize, move and keyboard nudge for the capture
//! region. The selector is host-agnostic: it consumes already-normalized
//! pointer positions and never touches the raster itself.

use crate::geometry::{Point, Rect};

/// Minimum width and height of a confirmed selection
pub const MIN_SELECTION_SIZE: f64 = 10.0;

/// Hit radius around a handle center, in device-independent pixels
pub const HANDLE_HIT_RADIUS: f64 = 6.0;

/// Arrow-key nudge distance
pub const NUDGE_STEP: f64 = 1.0;

/// Arrow-key nudge distance with Shift held
pub const NUDGE_STEP_LARGE: f64 = 10.0;

/// Resize handle on the selection border
///
/// Corner handles own two edges, edge-midpoint handles own one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    /// All 8 handles, corners first so corner hits win where hit zones overlap
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Top,
        Handle::Bottom,
        Handle::Left,
        Handle::Right,
    ];

    /// Position of this handle on the border of `rect`
    pub fn position(&self, rect: &Rect) -> Point {
        let center = rect.center();
        match self {
            Handle::TopLeft => Point::new(rect.left(), rect.top()),
            Handle::TopRight => Point::new(rect.right(), rect.top()),
            Handle::BottomLeft => Point::new(rect.left(), rect.bottom()),
            Handle::BottomRight => Point::new(rect.right(), rect.bottom()),
            Handle::Top => Point::new(center.x, rect.top()),
            Handle::Bottom => Point::new(center.x, rect.bottom()),
            Handle::Left => Point::new(rect.left(), center.y),
            Handle::Right => Point::new(rect.right(), center.y),
        }
    }

    fn moves_left(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft | Handle::Left)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight | Handle::Right)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight | Handle::Top)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight | Handle::Bottom)
    }
}

/// Observable selector state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    /// No selection yet
    Idle,
    /// A new selection is being dragged out
    Dragging,
    /// A selection exists and no pointer interaction is in flight
    Confirmed,
    /// The selection is being resized via one handle
    Resizing(Handle),
    /// The selection is being dragged to a new position
    Moving,
}

/// Result of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// No drag was in progress
    Idle,
    /// A new selection was committed
    Selected(Rect),
    /// The drag stayed below the minimum size and was discarded
    Discarded,
    /// An existing selection finished a resize or move
    Adjusted(Rect),
}

#[derive(Debug, Clone)]
enum DragState {
    Creating {
        anchor: Point,
        current: Point,
    },
    Resizing {
        handle: Handle,
        origin: Rect,
        anchor: Point,
    },
    Moving {
        origin: Rect,
        anchor: Point,
    },
}

/// Interactive region selector over a fixed capture bounds
///
/// All positions handed in are clamped to the capture bounds; a confirmed
/// region always satisfies the minimum size and lies fully inside the
/// bounds. Calls that do not apply to the current state are no-ops.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    /// Capture bounds; selections never escape these
    bounds: Rect,

    /// The committed region, live-updated during resize and move
    region: Option<Rect>,

    /// Pointer interaction in flight
    drag: Option<DragState>,
}

impl RegionSelector {
    /// Create a selector for a capture of the given bounds
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            region: None,
            drag: None,
        }
    }

    /// The capture bounds this selector operates in
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current state of the selector
    pub fn state(&self) -> SelectionState {
        match (&self.drag, &self.region) {
            (Some(DragState::Creating { .. }), _) => SelectionState::Dragging,
            (Some(DragState::Resizing { handle, .. }), _) => SelectionState::Resizing(*handle),
            (Some(DragState::Moving { .. }), _) => SelectionState::Moving,
            (None, Some(_)) => SelectionState::Confirmed,
            (None, None) => SelectionState::Idle,
        }
    }

    /// The committed region, if any (live during resize and move)
    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// The rectangle to visualize right now
    ///
    /// During a creating drag this is the in-progress rubber band, which may
    /// be below the minimum size; otherwise it is the committed region.
    pub fn selection_rect(&self) -> Option<Rect> {
        match &self.drag {
            Some(DragState::Creating { anchor, current }) => {
                Some(Rect::from_corners(*anchor, *current))
            }
            _ => self.region,
        }
    }

    /// The handle under `point`, when a confirmed selection is idle
    pub fn handle_at(&self, point: &Point) -> Option<Handle> {
        if self.drag.is_some() {
            return None;
        }
        let region = self.region?;
        Handle::ALL
            .into_iter()
            .find(|handle| handle.position(&region).distance_to(point) <= HANDLE_HIT_RADIUS)
    }

    /// Start dragging out a new selection
    pub fn begin_drag(&mut self, point: Point) {
        if self.drag.is_some() || self.region.is_some() {
            return;
        }
        let anchor = point.clamped_to(&self.bounds);
        self.drag = Some(DragState::Creating {
            anchor,
            current: anchor,
        });
    }

    /// Start resizing the confirmed selection via `handle`
    pub fn begin_resize(&mut self, handle: Handle, point: Point) {
        if self.drag.is_some() {
            return;
        }
        let Some(origin) = self.region else {
            return;
        };
        self.drag = Some(DragState::Resizing {
            handle,
            origin,
            anchor: point,
        });
    }

    /// Start moving the confirmed selection
    pub fn begin_move(&mut self, point: Point) {
        if self.drag.is_some() {
            return;
        }
        let Some(origin) = self.region else {
            return;
        };
        self.drag = Some(DragState::Moving {
            origin,
            anchor: point,
        });
    }

    /// Feed a pointer position into the drag in flight
    pub fn pointer_moved(&mut self, point: Point) {
        match self.drag.clone() {
            Some(DragState::Creating { anchor, .. }) => {
                self.drag = Some(DragState::Creating {
                    anchor,
                    current: point.clamped_to(&self.bounds),
                });
            }
            Some(DragState::Resizing {
                handle,
                origin,
                anchor,
            }) => {
                self.region = Some(self.resized_rect(handle, &origin, &anchor, &point));
            }
            Some(DragState::Moving { origin, anchor }) => {
                let moved = origin.translated(point.x - anchor.x, point.y - anchor.y);
                self.region = Some(moved.clamped_within(&self.bounds));
            }
            None => {}
        }
    }

    /// Finish the drag in flight
    pub fn pointer_released(&mut self, point: Point) -> DragOutcome {
        if self.drag.is_none() {
            return DragOutcome::Idle;
        }
        self.pointer_moved(point);

        match self.drag.take() {
            Some(DragState::Creating { anchor, current }) => {
                let rect = Rect::from_corners(anchor, current);
                if rect.width >= MIN_SELECTION_SIZE && rect.height >= MIN_SELECTION_SIZE {
                    self.region = Some(rect);
                    DragOutcome::Selected(rect)
                } else {
                    self.region = None;
                    DragOutcome::Discarded
                }
            }
            Some(_) => match self.region {
                Some(rect) => DragOutcome::Adjusted(rect),
                None => DragOutcome::Idle,
            },
            None => DragOutcome::Idle,
        }
    }

    /// Translate the confirmed selection by (dx, dy), clamped to bounds
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        if self.drag.is_some() {
            return;
        }
        if let Some(region) = self.region {
            self.region = Some(region.translated(dx, dy).clamped_within(&self.bounds));
        }
    }

    /// Rectangles covering the capture outside the selection
    ///
    /// The host dims these. With no selection the whole capture is dimmed;
    /// zero-area strips are omitted.
    pub fn dim_overlay(&self) -> Vec<Rect> {
        let Some(rect) = self.selection_rect() else {
            return vec![self.bounds];
        };
        let b = &self.bounds;
        [
            Rect::new(b.left(), b.top(), b.width, rect.top() - b.top()),
            Rect::new(b.left(), rect.bottom(), b.width, b.bottom() - rect.bottom()),
            Rect::new(b.left(), rect.top(), rect.left() - b.left(), rect.height),
            Rect::new(rect.right(), rect.top(), b.right() - rect.right(), rect.height),
        ]
        .into_iter()
        .filter(|strip| !strip.is_empty())
        .collect()
    }

    /// Adjust only the edges owned by `handle`, clamped per edge
    ///
    /// A dragged edge that would push a dimension below the minimum clamps
    /// that dimension to exactly the minimum while the opposite edge stays
    /// fixed; dragged edges also stop at the capture bounds.
    fn resized_rect(&self, handle: Handle, origin: &Rect, anchor: &Point, current: &Point) -> Rect {
        let delta_x = current.x - anchor.x;
        let delta_y = current.y - anchor.y;

        let mut left = origin.left();
        let mut right = origin.right();
        let mut top = origin.top();
        let mut bottom = origin.bottom();

        if handle.moves_left() {
            left = (left + delta_x).clamp(self.bounds.left(), right - MIN_SELECTION_SIZE);
        }
        if handle.moves_right() {
            right = (right + delta_x).clamp(left + MIN_SELECTION_SIZE, self.bounds.right());
        }
        if handle.moves_top() {
            top = (top + delta_y).clamp(self.bounds.top(), bottom - MIN_SELECTION_SIZE);
        }
        if handle.moves_bottom() {
            bottom = (bottom + delta_y).clamp(top + MIN_SELECTION_SIZE, self.bounds.bottom());
        }

        Rect::new(left, top, right - left, bottom - top)
    }
}

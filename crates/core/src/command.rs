//! Reversible editing commands and undo/redo history
//!
//! Commands own the annotation they add or remove, so undo/redo never
//! dangles. Apply and revert are exact inverses; a removal remembers the
//! z-order index it vacated and restores it on revert.

use std::fmt;

use crate::annotation::Annotation;
use crate::collection::AnnotationCollection;

/// A reversible mutation of an annotation collection
#[derive(Debug, Clone)]
pub enum EditorCommand {
    /// An annotation was added at the top of the z-order
    AddAnnotation { annotation: Annotation },

    /// An annotation was removed from the given z-order index
    RemoveAnnotation {
        annotation: Annotation,
        index: usize,
    },
}

impl EditorCommand {
    /// Forward effect of the command
    fn apply(&self, collection: &mut AnnotationCollection) {
        match self {
            EditorCommand::AddAnnotation { annotation } => {
                collection.push(annotation.clone());
            }
            EditorCommand::RemoveAnnotation { annotation, .. } => {
                collection.remove(annotation.id());
            }
        }
    }

    /// Inverse effect of the command
    fn revert(&self, collection: &mut AnnotationCollection) {
        match self {
            EditorCommand::AddAnnotation { annotation } => {
                collection.remove(annotation.id());
            }
            EditorCommand::RemoveAnnotation { annotation, index } => {
                collection.insert(*index, annotation.clone());
            }
        }
    }
}

/// Undo/redo history over an annotation collection
///
/// Two unbounded stacks. Executing a new command clears the redo stack;
/// undo and redo are no-ops when their stack is empty. Every mutation fires
/// the change notification hook.
pub struct CommandHistory {
    undo_stack: Vec<EditorCommand>,
    redo_stack: Vec<EditorCommand>,
    on_change: Option<Box<dyn FnMut()>>,
}

impl CommandHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            on_change: None,
        }
    }

    /// Execute a command against the collection and record it
    pub fn execute(&mut self, collection: &mut AnnotationCollection, command: EditorCommand) {
        command.apply(collection);
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.notify();
    }

    /// Revert the most recent command
    ///
    /// Returns false (and does nothing) when the undo stack is empty.
    pub fn undo(&mut self, collection: &mut AnnotationCollection) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        command.revert(collection);
        self.redo_stack.push(command);
        self.notify();
        true
    }

    /// Re-apply the most recently undone command
    ///
    /// Returns false (and does nothing) when the redo stack is empty.
    pub fn redo(&mut self, collection: &mut AnnotationCollection) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        command.apply(collection);
        self.undo_stack.push(command);
        self.notify();
        true
    }

    /// Whether an undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of commands on the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of commands on the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks (used when a fresh selection starts)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    /// Install the change notification hook
    ///
    /// Fired after every execute, undo, redo and clear.
    pub fn set_on_change(&mut self, hook: impl FnMut() + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    fn notify(&mut self) {
        if let Some(hook) = self.on_change.as_mut() {
            hook();
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo_stack", &self.undo_stack)
            .field("redo_stack", &self.redo_stack)
            .field("on_change", &self.on_change.as_ref().map(|_| "FnMut"))
            .finish()
    }
}

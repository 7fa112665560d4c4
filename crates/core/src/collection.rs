//! Ordered annotation container
//!
//! Insertion order is z-order: later annotations render on top. The editor
//! session owns exactly one collection and routes every mutation through
//! commands so each change stays reversible.

use crate::annotation::{Annotation, AnnotationId};

/// Insertion-ordered collection of committed annotations
#[derive(Debug, Clone, Default)]
pub struct AnnotationCollection {
    annotations: Vec<Annotation>,
}

impl AnnotationCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of annotations in the collection
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Append an annotation at the top of the z-order
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Insert an annotation at a specific z-order index
    ///
    /// Indices past the end append; undo of a removal uses this to restore
    /// the original stacking position.
    pub fn insert(&mut self, index: usize, annotation: Annotation) {
        let index = index.min(self.annotations.len());
        self.annotations.insert(index, annotation);
    }

    /// Remove an annotation by ID
    ///
    /// Returns the removed annotation together with the z-order index it
    /// occupied, or None if the ID is not present.
    pub fn remove(&mut self, id: AnnotationId) -> Option<(usize, Annotation)> {
        let index = self.annotations.iter().position(|a| a.id() == id)?;
        Some((index, self.annotations.remove(index)))
    }

    /// Look up an annotation by ID
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Iterate annotations in z-order (bottom first)
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// The most recently added annotation
    pub fn last(&self) -> Option<&Annotation> {
        self.annotations.last()
    }

    /// Remove every annotation
    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

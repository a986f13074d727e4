use crate::dom::{ElementId, SharedDocument, lock_document};
use crate::services::FocusVisible;
use std::sync::Mutex;

/// Class carried by elements that were focused programmatically.
pub const FOCUSED_CLASS: &str = "ion-focused";

/// Moves [`FOCUSED_CLASS`] onto whichever elements were focused last.
#[derive(Debug)]
pub struct FocusVisibleTracker {
    document: SharedDocument,
    current: Mutex<Vec<ElementId>>,
}

impl FocusVisibleTracker {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document,
            current: Mutex::new(Vec::new()),
        }
    }

    pub fn focused(&self) -> Vec<ElementId> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl FocusVisible for FocusVisibleTracker {
    fn set_focus(&self, elements: &[ElementId]) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let mut doc = lock_document(&self.document);
        for id in current.drain(..) {
            doc.toggle_class(id, FOCUSED_CLASS, false);
        }
        for id in elements {
            doc.toggle_class(*id, FOCUSED_CLASS, true);
        }
        current.extend_from_slice(elements);
    }
}

//! Tab bar keyboard compatibility.
//!
//! Hiding the bar is the stylesheet's job. The bar still tracks the keyboard
//! on its own so it can keep emitting the deprecated `tab-bar-hidden` class
//! that older stylesheets select on.

use crate::coordinator::KeyboardVisibilityCoordinator;
use crate::dom::{Document, ElementId, SharedDocument, lock_document};
use crate::root::spawn_render_loop;
use crate::state::VisibilityState;
use crate::watcher::PlatformKeyboardWatcher;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Deprecated: select on the root's `keyboard-is-open` instead.
pub const TAB_BAR_HIDDEN_CLASS: &str = "tab-bar-hidden";

#[derive(Debug)]
pub struct TabBar {
    document: SharedDocument,
    element: ElementId,
    coordinator: KeyboardVisibilityCoordinator,
    render_task: Mutex<Option<JoinHandle<()>>>,
}

fn render(doc: &mut Document, element: ElementId, state: VisibilityState) {
    let in_top_slot = doc.slot(element) == Some("top");
    doc.toggle_class(
        element,
        TAB_BAR_HIDDEN_CLASS,
        state.is_keyboard_visible && !in_top_slot,
    );
}

impl TabBar {
    pub fn new(
        document: SharedDocument,
        element: ElementId,
        watcher: Arc<dyn PlatformKeyboardWatcher>,
    ) -> Self {
        Self {
            document,
            element,
            coordinator: KeyboardVisibilityCoordinator::new(watcher),
            render_task: Mutex::new(None),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn coordinator(&self) -> &KeyboardVisibilityCoordinator {
        &self.coordinator
    }

    pub fn connected(&self) {
        self.coordinator.mount();
        let mut rx = self.coordinator.subscribe();
        let element = self.element;
        render(
            &mut lock_document(&self.document),
            element,
            *rx.borrow_and_update(),
        );
        let task = spawn_render_loop(rx, self.document.clone(), move |doc, state| {
            render(doc, element, state)
        });
        let mut slot = self.render_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.replace(task) {
            old.abort();
        }
    }

    pub fn disconnected(&self) {
        self.coordinator.unmount();
        let mut slot = self.render_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

impl Drop for TabBar {
    fn drop(&mut self) {
        self.disconnected();
    }
}

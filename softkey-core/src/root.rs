//! The root container element.
//!
//! The root is the only consumer of the coordinator's state. It turns that
//! state into the `keyboard-is-open` class; everything below it reacts to the
//! class structurally (see [`crate::style`]).

use crate::config::{AppConfig, Mode};
use crate::coordinator::KeyboardVisibilityCoordinator;
use crate::dom::{Document, ElementId, SharedDocument, lock_document};
use crate::idle::IdleTask;
use crate::platform::Platform;
use crate::services::PlatformServices;
use crate::startup::{self, FocusSlot, StartupPlan};
use crate::state::VisibilityState;
use crate::watcher::PlatformKeyboardWatcher;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const KEYBOARD_OPEN_CLASS: &str = "keyboard-is-open";
pub const PAGE_CLASS: &str = "ion-page";
pub const STATUSBAR_PADDING_CLASS: &str = "force-statusbar-padding";

/// Re-render on every committed state change until the state owner goes away.
pub(crate) fn spawn_render_loop<R>(
    mut rx: watch::Receiver<VisibilityState>,
    document: SharedDocument,
    render: R,
) -> JoinHandle<()>
where
    R: Fn(&mut Document, VisibilityState) + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            render(&mut lock_document(&document), state);
        }
    })
}

fn lock_slot<T>(slot: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Classes the root always carries, plus the keyboard class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostClasses {
    pub mode: Mode,
    pub statusbar_padding: bool,
}

impl HostClasses {
    pub fn classes(&self, state: VisibilityState) -> [(&'static str, bool); 4] {
        [
            (self.mode.as_class(), true),
            (PAGE_CLASS, true),
            (STATUSBAR_PADDING_CLASS, self.statusbar_padding),
            (KEYBOARD_OPEN_CLASS, state.is_keyboard_visible),
        ]
    }

    pub fn apply(&self, doc: &mut Document, id: ElementId, state: VisibilityState) {
        for (class, on) in self.classes(state) {
            doc.toggle_class(id, class, on);
        }
    }
}

pub struct RootContainer {
    document: SharedDocument,
    element: ElementId,
    config: Arc<AppConfig>,
    platform: Platform,
    services: Arc<dyn PlatformServices>,
    coordinator: KeyboardVisibilityCoordinator,
    focus: FocusSlot,
    idle: Mutex<Option<IdleTask>>,
    render_task: Mutex<Option<JoinHandle<()>>>,
}

impl RootContainer {
    pub fn new(
        document: SharedDocument,
        element: ElementId,
        config: AppConfig,
        platform: Platform,
        watcher: Arc<dyn PlatformKeyboardWatcher>,
        services: Arc<dyn PlatformServices>,
    ) -> Self {
        Self {
            document,
            element,
            config: Arc::new(config),
            platform,
            services,
            coordinator: KeyboardVisibilityCoordinator::new(watcher),
            focus: Arc::new(OnceLock::new()),
            idle: Mutex::new(None),
            render_task: Mutex::new(None),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn coordinator(&self) -> &KeyboardVisibilityCoordinator {
        &self.coordinator
    }

    pub fn mode(&self) -> Mode {
        self.config.mode.unwrap_or_else(|| self.platform.default_mode())
    }

    pub fn host_classes(&self) -> HostClasses {
        HostClasses {
            mode: self.mode(),
            statusbar_padding: self.config.force_statusbar_padding(),
        }
    }

    /// Attach to the document: start tracking the keyboard and render.
    pub fn connected(&self) {
        self.coordinator.mount();

        let mut rx = self.coordinator.subscribe();
        let host = self.host_classes();
        let element = self.element;
        host.apply(
            &mut lock_document(&self.document),
            element,
            *rx.borrow_and_update(),
        );

        let task = spawn_render_loop(rx, self.document.clone(), move |doc, state| {
            host.apply(doc, element, state);
        });
        if let Some(old) = lock_slot(&self.render_task).replace(task) {
            old.abort();
        }
    }

    /// First render has landed: schedule the platform shims for idle time.
    pub fn did_load(&self) {
        let plan = StartupPlan::resolve(&self.config, &self.platform);
        tracing::debug!(?plan, "scheduling deferred startup");

        let config = self.config.clone();
        let services = self.services.clone();
        let focus = self.focus.clone();
        let task = IdleTask::schedule(self.config.idle_delay(), async move {
            startup::run(plan, &config, services.as_ref(), &focus).await;
        });
        // A previous, still pending task is cancelled when dropped here.
        *lock_slot(&self.idle) = Some(task);
    }

    /// Detach from the document. Safe to call more than once.
    pub fn disconnected(&self) {
        if let Some(idle) = lock_slot(&self.idle).take() {
            idle.cancel();
        }
        self.coordinator.unmount();
        if let Some(task) = lock_slot(&self.render_task).take() {
            task.abort();
        }
    }

    /// Programmatically focus `elements`. Does nothing until the
    /// focus-visible utility has loaded.
    pub fn set_focus(&self, elements: &[ElementId]) {
        if let Some(utility) = self.focus.get() {
            utility.set_focus(elements);
        }
    }

    pub fn is_focus_visible_loaded(&self) -> bool {
        self.focus.get().is_some()
    }

    pub fn is_keyboard_open(&self) -> bool {
        lock_document(&self.document).has_class(self.element, KEYBOARD_OPEN_CLASS)
    }
}

impl Drop for RootContainer {
    fn drop(&mut self) {
        self.disconnected();
    }
}

impl fmt::Debug for RootContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootContainer")
            .field("element", &self.element)
            .field("mode", &self.mode())
            .field("phase", &self.coordinator.phase())
            .finish()
    }
}

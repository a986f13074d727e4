//! Keyboard visibility coordinator.
//!
//! Owns at most one [`ControllerHandle`] per mount cycle and the single
//! [`VisibilityState`] the renderer reads.
//!
//! Acquiring a controller is asynchronous and cannot be aborted once the
//! platform has been asked, so every mount and unmount bumps a generation
//! number. Anything that completes later (an acquisition, a deferred hide)
//! compares the generation it captured with the current one before touching
//! shared state; a mismatch means it was superseded.
//!
//! ```text
//! Unmounted --mount--> Acquiring --resolved--> Active
//!     ^                    |                     |
//!     +------unmount-------+---------------------+
//! ```

use crate::controller::{ControllerHandle, KeyboardChangeCallback, KeyboardControllerFactory};
use crate::state::{VisibilityCell, VisibilityState};
use crate::watcher::PlatformKeyboardWatcher;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Where the coordinator is in its mount cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    Unmounted,
    /// A controller has been requested and has not resolved yet.
    Acquiring,
    /// A controller is held. It may be inert if the platform has no keyboard.
    Active,
}

/// Token for an in-flight acquisition.
#[derive(Debug)]
struct PendingAcquisition {
    generation: u64,
    _task: JoinHandle<()>,
}

#[derive(Debug)]
struct Shared {
    generation: u64,
    mounted: bool,
    pending: Option<PendingAcquisition>,
    handle: Option<ControllerHandle>,
    /// Bumped on every keyboard transition of the current mount.
    event_seq: u64,
    /// Hide transitions waiting on a resize.
    deferred: Vec<JoinHandle<()>>,
    visibility: VisibilityCell,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.mounted && self.generation == generation
    }

    fn commit(&self, visible: bool) {
        if self.visibility.set_visible(visible) {
            tracing::debug!(visible, "keyboard visibility committed");
        }
    }
}

type SharedRef = Arc<Mutex<Shared>>;

fn lock(shared: &SharedRef) -> MutexGuard<'_, Shared> {
    // Nothing in `Shared` is left half-updated across a panic.
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Tracks software keyboard visibility for one mounted component.
#[derive(Debug)]
pub struct KeyboardVisibilityCoordinator {
    factory: KeyboardControllerFactory,
    shared: SharedRef,
}

impl KeyboardVisibilityCoordinator {
    pub fn new(watcher: Arc<dyn PlatformKeyboardWatcher>) -> Self {
        Self::with_factory(KeyboardControllerFactory::new(watcher))
    }

    pub fn with_factory(factory: KeyboardControllerFactory) -> Self {
        Self {
            factory,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                mounted: false,
                pending: None,
                handle: None,
                event_seq: 0,
                deferred: Vec::new(),
                visibility: VisibilityCell::new(),
            })),
        }
    }

    /// Begin a mount cycle and start acquiring a controller.
    ///
    /// Must be called from within a tokio runtime. Mounting while already
    /// mounted supersedes the previous cycle.
    pub fn mount(&self) {
        let mut s = lock(&self.shared);
        s.generation += 1;
        s.mounted = true;
        s.event_seq = 0;
        s.visibility.set_visible(false);
        if s.pending.take().is_some() {
            tracing::debug!("keyboard controller acquisition superseded by remount");
        }
        let generation = s.generation;
        let superseded = s.handle.take();
        let deferred = std::mem::take(&mut s.deferred);

        // The token is recorded under the same lock as the generation bump,
        // so a concurrent unmount sees either neither or both.
        let acquisition = self.factory.acquire(self.change_callback(generation));
        let shared = self.shared.clone();
        let task = tokio::spawn(async move {
            let mut handle = acquisition.await;
            let mut s = lock(&shared);
            let still_current = s.is_current(generation)
                && s
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.generation == generation);
            if still_current {
                s.pending = None;
                s.handle = Some(handle);
                tracing::debug!(generation, "keyboard controller active");
            } else {
                drop(s);
                tracing::debug!(generation, "discarding superseded keyboard controller");
                handle.destroy();
            }
        });
        s.pending = Some(PendingAcquisition {
            generation,
            _task: task,
        });
        drop(s);

        cancel(deferred);
        if let Some(mut handle) = superseded {
            handle.destroy();
        }
        tracing::info!(generation, "keyboard coordinator mounted");
    }

    /// End the mount cycle. Never blocks: an acquisition still in flight
    /// destroys its own handle when it resolves.
    pub fn unmount(&self) {
        let (handle, deferred) = {
            let mut s = lock(&self.shared);
            if !s.mounted {
                return;
            }
            s.mounted = false;
            s.generation += 1;
            if s.pending.take().is_some() {
                tracing::debug!("unmounted while keyboard controller was still acquiring");
            }
            (s.handle.take(), std::mem::take(&mut s.deferred))
        };
        cancel(deferred);
        if let Some(mut handle) = handle {
            handle.destroy();
        }
        tracing::info!("keyboard coordinator unmounted");
    }

    pub fn phase(&self) -> CoordinatorPhase {
        let s = lock(&self.shared);
        if !s.mounted {
            CoordinatorPhase::Unmounted
        } else if s.pending.is_some() {
            CoordinatorPhase::Acquiring
        } else {
            CoordinatorPhase::Active
        }
    }

    pub fn state(&self) -> VisibilityState {
        lock(&self.shared).visibility.get()
    }

    pub fn is_keyboard_visible(&self) -> bool {
        self.state().is_keyboard_visible
    }

    /// Read-only view for the renderer; changes wake the receiver.
    pub fn subscribe(&self) -> watch::Receiver<VisibilityState> {
        lock(&self.shared).visibility.subscribe()
    }

    /// Whether the active controller is subscribed to a real source.
    pub fn has_live_controller(&self) -> bool {
        lock(&self.shared)
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_inert())
    }

    fn change_callback(&self, generation: u64) -> KeyboardChangeCallback {
        let shared = Arc::downgrade(&self.shared);
        Arc::new(move |visible, resize_wait| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut s = lock(&shared);
            if !s.is_current(generation) {
                return;
            }
            s.event_seq += 1;
            let seq = s.event_seq;

            let wait = match resize_wait {
                Some(wait) if !visible => wait,
                _ => {
                    s.commit(visible);
                    return;
                }
            };

            // Hold "hidden" back until the viewport has finished resizing,
            // otherwise content keyed on the class reflows too early.
            let task_shared = shared.clone();
            let task = tokio::spawn(async move {
                wait.await;
                let s = lock(&task_shared);
                if s.is_current(generation) && s.event_seq == seq {
                    s.commit(false);
                }
            });
            s.deferred.retain(|t| !t.is_finished());
            s.deferred.push(task);
        })
    }
}

impl Drop for KeyboardVisibilityCoordinator {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn cancel(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        task.abort();
    }
}

//! A scripted app: an `ion-app` root with content and two tab bars, wired to
//! an in-process keyboard source.

use crate::script::Command;
use anyhow::Result;
use softkey_core::config::AppConfig;
use softkey_core::dom::{Document, ElementId, SharedDocument, lock_document};
use softkey_core::platform::Platform;
use softkey_core::services::LoggingServices;
use softkey_core::style::StyleSheet;
use softkey_core::tab_bar::TabBar;
use softkey_core::watcher::EventBusWatcher;
use softkey_core::{KeyboardSignal, ResizeMode, RootContainer};
use std::sync::Arc;
use std::time::Duration;

/// Viewport height before any keyboard opens.
pub const FULL_HEIGHT: u32 = 800;

/// Gives spawned work a chance to run before the next command.
const SETTLE: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    bus: Arc<EventBusWatcher>,
    document: SharedDocument,
    root: RootContainer,
    tab_bar: TabBar,
    top_bar: ElementId,
    sheet: StyleSheet,
    resize_mode: ResizeMode,
}

impl Session {
    pub fn new(config: AppConfig, platform: Platform, resize_mode: ResizeMode) -> Self {
        let bus = Arc::new(EventBusWatcher::new(Some(resize_mode)));
        bus.set_container_height(resize_mode, FULL_HEIGHT);

        let mut doc = Document::new("ion-app");
        let app = doc.root();
        let top_bar = doc.append(app, "ion-tab-bar");
        doc.set_slot(top_bar, Some("top"));
        let tabs = doc.append(app, "ion-tabs");
        doc.append(tabs, "ion-content");
        let bottom_bar = doc.append(tabs, "ion-tab-bar");
        doc.append(bottom_bar, "ion-tab-button");
        doc.append(bottom_bar, "ion-tab-button");
        let document = doc.into_shared();

        let services = Arc::new(LoggingServices::new(document.clone()));
        let root = RootContainer::new(
            document.clone(),
            app,
            config,
            platform,
            bus.clone(),
            services,
        );
        let tab_bar = TabBar::new(document.clone(), bottom_bar, bus.clone());

        Self {
            bus,
            document,
            root,
            tab_bar,
            top_bar,
            sheet: StyleSheet::keyboard_defaults(),
            resize_mode,
        }
    }

    /// Attach everything, as a page load would.
    pub fn start(&self) {
        self.root.connected();
        self.root.did_load();
        self.tab_bar.connected();
    }

    pub fn stop(&self) {
        self.tab_bar.disconnected();
        self.root.disconnected();
    }

    pub fn root(&self) -> &RootContainer {
        &self.root
    }

    pub fn bus(&self) -> &Arc<EventBusWatcher> {
        &self.bus
    }

    /// Run one command; the returned text, if any, is meant for stdout.
    pub async fn apply(&self, command: Command) -> Result<(Flow, Option<String>)> {
        let render = matches!(command, Command::Render);
        match command {
            Command::Show(height) => {
                self.bus.dispatch(KeyboardSignal::WillShow {
                    keyboard_height: height,
                });
                if let Some(height) = height {
                    // The viewport shrinks after the keyboard announces itself.
                    tokio::time::sleep(SETTLE).await;
                    self.bus
                        .set_container_height(self.resize_mode, FULL_HEIGHT.saturating_sub(height));
                }
            }
            Command::Hide => {
                self.bus.dispatch(KeyboardSignal::WillHide);
            }
            Command::Resize(height) => self.bus.set_container_height(self.resize_mode, height),
            Command::Hold => self.bus.hold_acquisitions(),
            Command::Release => self.bus.release_acquisitions(),
            Command::Mount => self.root.connected(),
            Command::Unmount => self.root.disconnected(),
            Command::Focus(indices) => {
                let ids = {
                    let doc = lock_document(&self.document);
                    indices
                        .iter()
                        .map(|i| {
                            doc.get(*i)
                                .ok_or_else(|| anyhow::anyhow!("no element at index {}", i))
                        })
                        .collect::<Result<Vec<_>>>()?
                };
                self.root.set_focus(&ids);
            }
            Command::Render => {}
            Command::Wait(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Command::Quit => return Ok((Flow::Quit, None)),
        }

        tokio::time::sleep(SETTLE).await;
        let output = render.then(|| self.report());
        Ok((Flow::Continue, output))
    }

    /// Current markup plus the computed visibility of each tab bar.
    pub fn report(&self) -> String {
        let doc = lock_document(&self.document);
        let mut out = doc.to_string();
        for (label, id) in [("top", self.top_bar), ("bottom", self.tab_bar.element())] {
            let state = if self.sheet.is_hidden(&doc, id) {
                "hidden"
            } else {
                "visible"
            };
            out.push_str(&format!("{} tab bar: {}\n", label, state));
        }
        out
    }
}

//! Egui-based UI for the App Multi-Opener.
//!
//! This module defines the application state, the eframe App implementation,
//! and wires UI actions to the registry and to launch tasks in ui::tasks.
//! All state lives on the UI thread; workers only talk back through channels.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use eframe::{App, egui};

use crate::config::AppConfig;
use crate::core::{LaunchChain, Registry, Scanner};
use crate::favorites::{Favorites, JsonFileStore};
use crate::style::set_appkit_style;
use crate::types::{AppDescriptor, LaunchReport};

pub mod list;
pub mod panels;
pub mod tasks;

const MAX_STATUS_MSGS: usize = 50;

/// UI state, owned by the UI thread.
pub struct GuiState {
    pub registry: Registry,
    pub favorites: Favorites,
    pub favorites_only: bool,
    /// Ids checked for batch launch.
    pub selected: BTreeSet<u64>,
    /// App shown in the details panel.
    pub focused: Option<u64>,

    pub launch_tx: Sender<LaunchReport>,
    pub launch_rx: Receiver<LaunchReport>,
    pub launches_in_flight: usize,

    pub icons: HashMap<u64, egui::TextureHandle>,

    // status log
    pub status_msgs: Vec<String>,
}

impl GuiState {
    pub fn new(registry: Registry, favorites: Favorites) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            registry,
            favorites,
            favorites_only: false,
            selected: BTreeSet::new(),
            focused: None,
            launch_tx: tx,
            launch_rx: rx,
            launches_in_flight: 0,
            icons: HashMap::new(),
            status_msgs: Vec::new(),
        }
    }

    /// Apps to list: registry filter, then the favorites toggle.
    pub fn visible_apps(&self) -> Vec<AppDescriptor> {
        let apps = self.registry.filtered();
        if self.favorites_only {
            self.favorites.retain_favorites(apps)
        } else {
            apps
        }
    }

    pub fn push_status(&mut self, msg: impl Into<String>) {
        self.status_msgs.push(msg.into());
        if self.status_msgs.len() > MAX_STATUS_MSGS {
            let excess = self.status_msgs.len() - MAX_STATUS_MSGS;
            self.status_msgs.drain(..excess);
        }
    }

    /// Install finished scans and launch reports.
    pub fn pump(&mut self) {
        if self.registry.poll() {
            // Ids are per scan; anything keyed by them is stale now.
            self.icons.clear();
            self.selected.clear();
            self.focused = None;
            let count = self.registry.applications().len();
            self.push_status(format!("Found {} applications", count));
        }
        while let Ok(report) = self.launch_rx.try_recv() {
            self.launches_in_flight = self.launches_in_flight.saturating_sub(1);
            self.push_status(report.summary());
        }
    }

    pub fn icon_texture(
        &mut self,
        ctx: &egui::Context,
        app: &AppDescriptor,
    ) -> Option<egui::TextureHandle> {
        if let Some(tex) = self.icons.get(&app.id) {
            return Some(tex.clone());
        }
        let icon = app.icon.as_ref()?;
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [icon.width as usize, icon.height as usize],
            &icon.rgba,
        );
        let tex = ctx.load_texture(
            format!("app-icon-{}", app.id),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.icons.insert(app.id, tex.clone());
        Some(tex)
    }
}

/// Main eframe application that renders and controls the UI.
pub struct MultiOpenerApp {
    pub state: GuiState,
    pub chain: LaunchChain,
}

impl MultiOpenerApp {
    /// Build from configuration and immediately trigger an apps refresh.
    pub fn new(cfg: &AppConfig) -> Self {
        let scanner = Scanner::from_config(cfg);
        let registry = Registry::new(Arc::new(scanner));
        let store = JsonFileStore::open(cfg.resolved_store_path());
        log::debug!("Favorites store at {:?}", store.path());
        let favorites = Favorites::load(Box::new(store));

        let mut state = GuiState::new(registry, favorites);
        state.registry.refresh();
        Self {
            state,
            chain: LaunchChain::system(),
        }
    }
}

/// Egui frame update: handles theme, background results, and UI layout.
impl App for MultiOpenerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        set_appkit_style(ctx);

        self.state.pump();

        panels::top::show(ctx, &mut self.state);
        panels::bottom::show(ctx, &self.state);
        panels::side::show(ctx, &mut self.state);
        panels::central::show(ctx, &mut self.state, &self.chain);

        if self.state.registry.is_loading() || self.state.launches_in_flight > 0 {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::AppSource;
    use crate::favorites::KeyValueStore;

    struct Fixed(Vec<AppDescriptor>);

    impl AppSource for Fixed {
        fn scan(&self) -> Vec<AppDescriptor> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct NullStore;

    impl KeyValueStore for NullStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: String) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn state_with(apps: Vec<AppDescriptor>) -> GuiState {
        let mut registry = Registry::new(Arc::new(Fixed(apps)));
        registry.refresh();
        assert!(registry.wait_idle(Duration::from_secs(5)));
        GuiState::new(registry, Favorites::load(Box::new(NullStore)))
    }

    fn names(apps: &[AppDescriptor]) -> Vec<&str> {
        apps.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn favorites_toggle_narrows_filtered_view() {
        let mut state = state_with(vec![
            AppDescriptor::new("Safari", "com.apple.Safari", "/Applications/Safari.app", None, None),
            AppDescriptor::new("Terminal", "com.apple.Terminal", "/Applications/Terminal.app", None, None),
            AppDescriptor::new("TextEdit", "com.apple.TextEdit", "/Applications/TextEdit.app", None, None),
        ]);
        state.favorites.toggle("com.apple.TextEdit").unwrap();
        state.favorites.toggle("com.apple.Safari").unwrap();

        state.registry.set_filter("te");
        assert_eq!(names(&state.visible_apps()), vec!["Terminal", "TextEdit"]);

        state.favorites_only = true;
        assert_eq!(names(&state.visible_apps()), vec!["TextEdit"]);
    }

    #[test]
    fn launch_reports_end_up_in_status() {
        let mut state = state_with(Vec::new());
        state.launches_in_flight = 1;
        state
            .launch_tx
            .send(LaunchReport {
                app_name: "Notes".into(),
                result: crate::types::LaunchResult::Success {
                    mechanism: crate::types::LaunchMechanism::OpenCommandNewInstance,
                    attempted: vec![crate::types::LaunchMechanism::OpenCommandNewInstance],
                },
            })
            .unwrap();

        state.pump();
        assert_eq!(state.launches_in_flight, 0);
        assert_eq!(
            state.status_msgs.last().map(String::as_str),
            Some("Launched Notes (/usr/bin/open -n)")
        );
    }

    #[test]
    fn status_log_is_bounded() {
        let mut state = state_with(Vec::new());
        for i in 0..(MAX_STATUS_MSGS + 10) {
            state.push_status(format!("msg {i}"));
        }
        assert_eq!(state.status_msgs.len(), MAX_STATUS_MSGS);
        assert_eq!(state.status_msgs[0], "msg 10");
    }
}

//! In-memory application registry.
//!
//! Owned by the interactive (UI) thread, which is the only writer. Scans run
//! on worker threads and hand their results back over a channel; `poll`
//! installs them. Every `refresh` gets a new generation and only the result of
//! the latest generation is installed, so an older scan finishing late can
//! never overwrite a newer one.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::scanner::AppSource;
use crate::types::AppDescriptor;

struct ScanResult {
    generation: u64,
    apps: Vec<AppDescriptor>,
}

pub struct Registry {
    source: Arc<dyn AppSource>,
    applications: Vec<AppDescriptor>,
    filter_text: String,
    requested: u64,
    installed: u64,
    tx: Sender<ScanResult>,
    rx: Receiver<ScanResult>,
}

impl Registry {
    pub fn new(source: Arc<dyn AppSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            applications: Vec::new(),
            filter_text: String::new(),
            requested: 0,
            installed: 0,
            tx,
            rx,
        }
    }

    /// Start a background scan and return immediately.
    pub fn refresh(&mut self) {
        self.requested += 1;
        let generation = self.requested;
        let source = self.source.clone();
        let tx = self.tx.clone();
        log::debug!("Starting scan #{}", generation);

        let spawned = thread::Builder::new()
            .name(format!("app-scan-{}", generation))
            .spawn(move || {
                let apps = source.scan();
                // The registry may be gone already; nothing to do then.
                let _ = tx.send(ScanResult { generation, apps });
            });
        if let Err(e) = spawned {
            log::error!("Could not start scan thread: {}", e);
            self.installed = self.requested;
        }
    }

    /// Install finished scans. Returns true when the list changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(res) = self.rx.try_recv() {
            changed |= self.accept(res);
        }
        changed
    }

    /// Block until the latest refresh is installed or `timeout` passes.
    /// Returns true when idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(res) => {
                    self.accept(res);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    fn accept(&mut self, res: ScanResult) -> bool {
        if res.generation != self.requested {
            log::debug!(
                "Discarding stale scan #{} (latest is #{})",
                res.generation,
                self.requested
            );
            return false;
        }
        log::info!(
            "Installed scan #{} with {} applications",
            res.generation,
            res.apps.len()
        );
        self.applications = res.apps;
        self.installed = res.generation;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.installed < self.requested
    }

    pub fn applications(&self) -> &[AppDescriptor] {
        &self.applications
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }

    /// Current list narrowed by the stored filter text.
    pub fn filtered(&self) -> Vec<AppDescriptor> {
        filter_apps(&self.applications, &self.filter_text)
    }

    /// Current list narrowed by `filter`, leaving the stored filter alone.
    pub fn list_applications(&self, filter: &str) -> Vec<AppDescriptor> {
        filter_apps(&self.applications, filter)
    }

    pub fn find(&self, id: u64) -> Option<&AppDescriptor> {
        self.applications.iter().find(|a| a.id == id)
    }
}

/// Case-insensitive substring match on name or bundle id. Keeps the input
/// order; an empty filter returns everything.
pub fn filter_apps(apps: &[AppDescriptor], filter: &str) -> Vec<AppDescriptor> {
    if filter.is_empty() {
        return apps.to_vec();
    }
    let needle = filter.to_lowercase();
    apps.iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle)
                || a.bundle_id.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

//! Running-instance detection by exact bundle identifier.
//!
//! The answer is a point-in-time snapshot: an application may start or quit
//! between the check and whatever the caller does with the result.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysinfo::System;

use crate::core::scanner::read_info_from_app;
use crate::types::APP_SUFFIX;

/// Live list of bundle identifiers of running applications.
pub trait RunningApps: Send + Sync {
    fn bundle_ids(&self) -> Vec<String>;
}

/// `NSWorkspace.runningApplications`.
#[cfg(target_os = "macos")]
pub struct WorkspaceApps;

#[cfg(target_os = "macos")]
impl RunningApps for WorkspaceApps {
    fn bundle_ids(&self) -> Vec<String> {
        crate::osx::running_bundle_ids()
    }
}

/// Process table snapshot via sysinfo; each executable is mapped to its
/// enclosing `.app` bundle and that bundle's `CFBundleIdentifier`.
#[cfg_attr(target_os = "macos", allow(dead_code))]
pub struct ProcessTable;

impl RunningApps for ProcessTable {
    fn bundle_ids(&self) -> Vec<String> {
        let mut sys = System::new_all();
        sys.refresh_all();

        bundle_ids_of_executables(sys.processes().values().filter_map(|p| p.exe()))
    }
}

/// Bundle identifiers of the `.app` bundles enclosing `exes`, one per bundle.
/// Executables outside any bundle, or bundles without an identifier, are skipped.
pub fn bundle_ids_of_executables<'a>(exes: impl Iterator<Item = &'a Path>) -> Vec<String> {
    let bundles: HashSet<PathBuf> = exes.filter_map(enclosing_bundle).collect();
    bundles
        .iter()
        .filter_map(|b| read_info_from_app(b).ok())
        .filter_map(|info| info.bundle_id)
        .collect()
}

/// Innermost ancestor of `exe` whose name ends in `.app`.
pub fn enclosing_bundle(exe: &Path) -> Option<PathBuf> {
    exe.ancestors()
        .skip(1)
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(APP_SUFFIX))
        })
        .map(Path::to_path_buf)
}

#[derive(Clone)]
pub struct Detector {
    source: Arc<dyn RunningApps>,
}

impl Detector {
    pub fn new(source: Arc<dyn RunningApps>) -> Self {
        Self { source }
    }

    /// Workspace list on macOS, process table elsewhere.
    pub fn system() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::new(Arc::new(WorkspaceApps))
        }
        #[cfg(not(target_os = "macos"))]
        {
            Self::new(Arc::new(ProcessTable))
        }
    }

    /// Exact, case-sensitive match. An empty identifier never matches.
    pub fn is_running(&self, bundle_id: &str) -> bool {
        if bundle_id.trim().is_empty() {
            return false;
        }
        self.source.bundle_ids().iter().any(|r| r == bundle_id)
    }
}

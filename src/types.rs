//! Core data types shared across the application.

use anyhow::{Result, bail};
use egui::Color32;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Package suffix of macOS application bundles.
pub const APP_SUFFIX: &str = ".app";

static NEXT_APP_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded application icon, straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppIcon {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Discovered application bundle with basic metadata.
///
/// Descriptors are created in bulk by the scanner and never mutated afterwards;
/// a refresh replaces the whole list.
#[derive(Clone, Debug)]
pub struct AppDescriptor {
    /// Process-local id, not stable across scans.
    pub id: u64,
    pub name: String,
    /// `CFBundleIdentifier`, empty when the bundle does not declare one.
    pub bundle_id: String,
    pub path: PathBuf,
    pub icon: Option<Arc<AppIcon>>,
    pub version: Option<String>,
}

impl AppDescriptor {
    pub fn new(
        name: impl Into<String>,
        bundle_id: impl Into<String>,
        path: impl Into<PathBuf>,
        icon: Option<Arc<AppIcon>>,
        version: Option<String>,
    ) -> Self {
        let path = path.into();
        let name = name.into();
        let name = if name.trim().is_empty() {
            name_from_bundle_path(&path)
        } else {
            name
        };
        Self {
            id: NEXT_APP_ID.fetch_add(1, Ordering::Relaxed),
            name,
            bundle_id: bundle_id.into(),
            path,
            icon,
            version,
        }
    }

    /// Expected executable inside the bundle: `<path>/Contents/MacOS/<name>`.
    ///
    /// The name comes from bundle metadata, so it must be a single plain file
    /// name. Separators, `..` or an absolute name would point outside the bundle.
    pub fn executable_path(&self) -> Result<PathBuf> {
        let mut components = Path::new(&self.name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => {
                Ok(self.path.join("Contents").join("MacOS").join(file))
            }
            _ => bail!("Name {:?} is not a plain executable file name", self.name),
        }
    }
}

/// Display name derived from the bundle's file name with the `.app` suffix stripped.
/// Falls back to the full file name when stripping would leave nothing.
pub fn name_from_bundle_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    match file_name.strip_suffix(APP_SUFFIX) {
        Some(stem) if !stem.trim().is_empty() => stem.to_string(),
        _ => file_name,
    }
}

/// OS-level technique for starting an application instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaunchMechanism {
    /// Spawn `Contents/MacOS/<name>` after checking it exists.
    DirectExecutable,
    /// `open -n` through `/bin/bash -c`.
    ShellOpenNewInstance,
    /// `NSWorkspace` launch with the new-instance option.
    WorkspaceNewInstance,
    /// `/usr/bin/open -n` without a shell.
    OpenCommandNewInstance,
    /// Spawn the executable path with no existence check.
    DirectExecutableUnchecked,
}

impl LaunchMechanism {
    pub fn label(self) -> &'static str {
        match self {
            LaunchMechanism::DirectExecutable => "direct launch",
            LaunchMechanism::ShellOpenNewInstance => "open -n via shell",
            LaunchMechanism::WorkspaceNewInstance => "NSWorkspace new instance",
            LaunchMechanism::OpenCommandNewInstance => "/usr/bin/open -n",
            LaunchMechanism::DirectExecutableUnchecked => "direct launch, unchecked",
        }
    }
}

impl fmt::Display for LaunchMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one full pass through the launch chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchResult {
    Success {
        mechanism: LaunchMechanism,
        attempted: Vec<LaunchMechanism>,
    },
    AllMechanismsFailed {
        attempted: Vec<LaunchMechanism>,
        last_error: String,
    },
}

impl LaunchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, LaunchResult::Success { .. })
    }

    pub fn attempted(&self) -> &[LaunchMechanism] {
        match self {
            LaunchResult::Success { attempted, .. } => attempted,
            LaunchResult::AllMechanismsFailed { attempted, .. } => attempted,
        }
    }
}

/// Message sent from launch workers back to the UI.
#[derive(Clone, Debug)]
pub struct LaunchReport {
    pub app_name: String,
    pub result: LaunchResult,
}

impl LaunchReport {
    /// Human friendly one-liner for the status bar.
    pub fn summary(&self) -> String {
        match &self.result {
            LaunchResult::Success { mechanism, .. } => {
                format!("Launched {} ({})", self.app_name, mechanism)
            }
            LaunchResult::AllMechanismsFailed {
                attempted,
                last_error,
            } => format!(
                "Could not launch {} after {} attempts: {}",
                self.app_name,
                attempted.len(),
                last_error
            ),
        }
    }
}

pub struct StateColors {
    pub default: Color32,
    pub hover: Color32,
    pub selected: Option<Color32>, // None = use default theme color
}

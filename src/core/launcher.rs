//! Launch strategy chain.
//!
//! macOS prefers focusing a running instance over starting a new one, and how
//! well each "new instance" switch works depends on the app and OS version. So
//! we try an ordered list of mechanisms and stop at the first that starts a
//! process. Each mechanism is attempted at most once per launch: none of them
//! are idempotent.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use crate::core::detector::Detector;
use crate::types::{AppDescriptor, LaunchMechanism, LaunchResult};

/// Every mechanism, in fallback order.
pub const FULL_CHAIN: [LaunchMechanism; 5] = [
    LaunchMechanism::DirectExecutable,
    LaunchMechanism::ShellOpenNewInstance,
    LaunchMechanism::WorkspaceNewInstance,
    LaunchMechanism::OpenCommandNewInstance,
    LaunchMechanism::DirectExecutableUnchecked,
];

/// OS side effects used by the mechanisms.
pub trait LaunchBackend: Send + Sync {
    fn file_exists(&self, path: &Path) -> bool;
    /// Start `exe` with no arguments.
    fn spawn_executable(&self, exe: &Path) -> Result<()>;
    /// Run `script` with `/bin/bash -c`.
    fn run_shell(&self, script: &str) -> Result<()>;
    fn workspace_open_new(&self, bundle: &Path) -> Result<()>;
    /// `/usr/bin/open -n <bundle>`
    fn open_command_new(&self, bundle: &Path) -> Result<()>;
}

pub struct SystemBackend;

impl LaunchBackend for SystemBackend {
    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn spawn_executable(&self, exe: &Path) -> Result<()> {
        spawn_detached(Command::new(exe)).with_context(|| format!("Failed to start {:?}", exe))
    }

    fn run_shell(&self, script: &str) -> Result<()> {
        let mut cmd = Command::new("/bin/bash");
        cmd.arg("-c").arg(script);
        spawn_detached(cmd).context("Failed to start /bin/bash")
    }

    fn workspace_open_new(&self, bundle: &Path) -> Result<()> {
        crate::osx::open_new_instance(bundle)
    }

    fn open_command_new(&self, bundle: &Path) -> Result<()> {
        let mut cmd = Command::new("/usr/bin/open");
        cmd.arg("-n").arg(bundle);
        spawn_detached(cmd).context("Failed to start /usr/bin/open")
    }
}

/// Start the child and reap it on a detached thread; the child is not supervised.
fn spawn_detached(mut cmd: Command) -> Result<()> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();
    thread::spawn(move || {
        if let Err(e) = child.wait() {
            log::debug!("Could not reap child {}: {}", pid, e);
        }
    });
    Ok(())
}

/// Shell script for the forced-new-instance `open` call, with the path quoted.
pub fn shell_open_script(bundle: &Path) -> Result<String> {
    let raw = bundle
        .to_str()
        .with_context(|| format!("Bundle path is not UTF-8: {:?}", bundle))?;
    let quoted = shlex::try_quote(raw).with_context(|| format!("Cannot quote {:?}", bundle))?;
    Ok(format!("open -n {} 2>/dev/null", quoted))
}

/// Mechanisms to try: a running app skips the plain direct launch.
pub fn plan(already_running: bool) -> Vec<LaunchMechanism> {
    FULL_CHAIN
        .iter()
        .copied()
        .filter(|m| !(already_running && *m == LaunchMechanism::DirectExecutable))
        .collect()
}

#[derive(Clone)]
pub struct LaunchChain {
    detector: Detector,
    backend: Arc<dyn LaunchBackend>,
}

impl LaunchChain {
    pub fn new(detector: Detector, backend: Arc<dyn LaunchBackend>) -> Self {
        Self { detector, backend }
    }

    pub fn system() -> Self {
        Self::new(Detector::system(), Arc::new(SystemBackend))
    }

    /// Start one more instance of `app`.
    ///
    /// The running check and the launch are not atomic: the app may start or
    /// quit in between. That only changes which mechanism goes first.
    pub fn launch(&self, app: &AppDescriptor) -> LaunchResult {
        log::info!(
            "Launching {} at {:?} (bundle id {:?})",
            app.name,
            app.path,
            app.bundle_id
        );
        let running = self.detector.is_running(&app.bundle_id);
        if running {
            log::info!("{} is already running, forcing a new instance", app.name);
        }
        self.run_plan(app, &plan(running))
    }

    /// Try each mechanism once, in order, until one succeeds.
    pub fn run_plan(&self, app: &AppDescriptor, plan: &[LaunchMechanism]) -> LaunchResult {
        let mut attempted = Vec::with_capacity(plan.len());
        let mut last_error = String::from("no launch mechanism to try");

        for &mechanism in plan {
            attempted.push(mechanism);
            match self.attempt(mechanism, app) {
                Ok(()) => {
                    log::info!("Started {} via {}", app.name, mechanism);
                    return LaunchResult::Success {
                        mechanism,
                        attempted,
                    };
                }
                Err(e) => {
                    log::warn!("{} failed for {}: {:#}", mechanism, app.name, e);
                    last_error = format!("{:#}", e);
                }
            }
        }

        log::error!(
            "Could not launch {} after {} mechanisms: {}",
            app.name,
            attempted.len(),
            last_error
        );
        LaunchResult::AllMechanismsFailed {
            attempted,
            last_error,
        }
    }

    fn attempt(&self, mechanism: LaunchMechanism, app: &AppDescriptor) -> Result<()> {
        match mechanism {
            LaunchMechanism::DirectExecutable => {
                let exe = app.executable_path()?;
                if !self.backend.file_exists(&exe) {
                    bail!("Executable not found: {:?}", exe);
                }
                self.backend.spawn_executable(&exe)
            }
            LaunchMechanism::ShellOpenNewInstance => {
                let script = shell_open_script(&app.path)?;
                self.backend.run_shell(&script)
            }
            LaunchMechanism::WorkspaceNewInstance => self.backend.workspace_open_new(&app.path),
            LaunchMechanism::OpenCommandNewInstance => self.backend.open_command_new(&app.path),
            LaunchMechanism::DirectExecutableUnchecked => {
                self.backend.spawn_executable(&app.executable_path()?)
            }
        }
    }
}

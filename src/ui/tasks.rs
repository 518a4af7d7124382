//! Background launch tasks, so the UI thread never waits on process creation
//! or NSWorkspace.

use std::thread;

use crate::core::LaunchChain;
use crate::types::{AppDescriptor, LaunchReport};

use super::GuiState;

/// Launch `app` on a worker thread; the result comes back on `state.launch_rx`.
pub fn spawn_launch(state: &mut GuiState, chain: &LaunchChain, app: AppDescriptor) {
    let tx = state.launch_tx.clone();
    let chain = chain.clone();
    state.launches_in_flight += 1;
    state.push_status(format!("Launching {}...", app.name));

    let spawned = thread::Builder::new()
        .name(format!("launch-{}", app.id))
        .spawn(move || {
            let result = chain.launch(&app);
            let _ = tx.send(LaunchReport {
                app_name: app.name,
                result,
            });
        });
    if let Err(e) = spawned {
        log::error!("Could not start launch thread: {}", e);
        state.launches_in_flight -= 1;
        state.push_status(format!("Launch failed: {}", e));
    }
}

/// Launch every checked app, each on its own worker.
pub fn spawn_launch_selected(state: &mut GuiState, chain: &LaunchChain) {
    let apps: Vec<AppDescriptor> = state
        .selected
        .iter()
        .filter_map(|id| state.registry.find(*id).cloned())
        .collect();
    for app in apps {
        spawn_launch(state, chain, app);
    }
    state.selected.clear();
}

//! Report or install the shadcn components a site depends on.

use std::path::Path;

use anyhow::Result;
use trellis_compiler::PluginManager;

use crate::error::CliError;
use crate::installer::{self, ProcessRunner};

/// Run the components command.
pub fn run(config_path: &Path, frontend: &Path, install: bool) -> Result<()> {
    let config = super::load_config(config_path, &PluginManager::new())?;
    let required = config
        .dependencies
        .map(|deps| deps.shadcn)
        .unwrap_or_default();

    if required.is_empty() {
        tracing::info!("No shadcn components listed under dependencies.shadcn");
        return Ok(());
    }

    let missing = installer::missing_components(&required, frontend);
    for name in &required {
        let state = if missing.contains(&name.as_str()) {
            "missing"
        } else {
            "installed"
        };
        println!("{:<20} {}", name, state);
    }

    if !install || missing.is_empty() {
        return Ok(());
    }

    let (installed, failed) =
        installer::ensure_components(&ProcessRunner::default(), &required, frontend);
    tracing::info!("Installed {} component(s)", installed);

    if installed > 0 {
        match installer::update_component_exports(frontend) {
            Ok(added) if added > 0 => tracing::info!("Added {} component export(s)", added),
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not update components/index.ts: {}", e),
        }
    }

    if failed > 0 {
        return Err(CliError::InstallFailed(failed).into());
    }

    Ok(())
}

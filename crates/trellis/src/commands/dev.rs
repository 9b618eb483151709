//! Build, serve and rebuild on change.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use trellis_compiler::ThemeCache;
use trellis_server::{
    rebuild_on_change, FileWatcher, RebuildFn, ServerError, StaticServer, StaticServerConfig,
};

use super::BuildOptions;

/// Run the dev command.
pub async fn run(
    config: PathBuf,
    output: PathBuf,
    port: u16,
    open: bool,
    frontend: Option<PathBuf>,
    themes: ThemeCache,
) -> Result<()> {
    let options = BuildOptions {
        config,
        output: output.clone(),
        minify: false,
        frontend,
    };
    let themes = Arc::new(themes);

    let rebuild: RebuildFn = {
        let options = options.clone();
        let themes = Arc::clone(&themes);
        Arc::new(move || build_logged(&options, &themes))
    };

    tracing::info!("Building {}...", options.config.display());
    tokio::task::spawn_blocking({
        let rebuild = Arc::clone(&rebuild);
        move || rebuild()
    })
    .await?;

    let base = super::base_path(&options.config);
    let base = base.canonicalize().unwrap_or(base);
    let ignore = vec![output.clone(), base.join(".git"), base.join("node_modules")];

    let (_watcher, events) = FileWatcher::new(&[base.clone()], &ignore)
        .map_err(|e| ServerError::WatchError(e.to_string()))?;
    tracing::info!("Watching {} for changes", base.display());

    tokio::spawn(rebuild_on_change(events, rebuild));

    let server = StaticServer::new(StaticServerConfig {
        root: output,
        port,
        open,
        ..Default::default()
    });
    server.start().await?;

    Ok(())
}

/// Compile once, logging instead of failing so the server keeps running.
fn build_logged(options: &BuildOptions, themes: &ThemeCache) {
    match super::build_site(options, themes) {
        Ok(files) => tracing::info!(
            "Built {} files to {}/",
            files.len(),
            options.output.display()
        ),
        Err(e) => tracing::error!("{:#}", e),
    }
}

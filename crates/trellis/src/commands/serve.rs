//! Preview the compiled site over HTTP.

use std::path::{Path, PathBuf};

use anyhow::Result;
use trellis_compiler::ThemeCache;
use trellis_server::{StaticServer, StaticServerConfig};

use super::BuildOptions;
use crate::error::CliError;

/// Options for the serve command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub output: PathBuf,
    pub port: u16,
    /// Compile before serving
    pub build: bool,
    pub open: bool,
    pub frontend: Option<PathBuf>,
}

/// Run the serve command.
pub async fn run(config: &Path, options: ServeOptions, themes: &ThemeCache) -> Result<()> {
    prepare_output(config, &options, themes)?;

    let server = StaticServer::new(StaticServerConfig {
        root: options.output,
        port: options.port,
        open: options.open,
        ..Default::default()
    });
    server.start().await?;

    Ok(())
}

/// Build the site, or check that a previous build exists with `--no-build`.
fn prepare_output(config: &Path, options: &ServeOptions, themes: &ThemeCache) -> Result<()> {
    if !options.build {
        if !options.output.is_dir() {
            return Err(CliError::OutputNotFound(options.output.clone()).into());
        }
        return Ok(());
    }

    let build = BuildOptions {
        config: config.to_path_buf(),
        output: options.output.clone(),
        minify: false,
        frontend: options.frontend.clone(),
    };
    let files = super::build_site(&build, themes)?;
    tracing::info!("Built {} files to {}/", files.len(), options.output.display());

    Ok(())
}

//! One-shot compile of the site into an output directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use trellis_compiler::ThemeCache;

use super::BuildOptions;

/// Run the build command.
pub fn run(
    config: &Path,
    output: &Path,
    minify: bool,
    frontend: Option<PathBuf>,
    themes: &ThemeCache,
) -> Result<()> {
    tracing::info!("Building {}...", config.display());

    let options = BuildOptions {
        config: config.to_path_buf(),
        output: output.to_path_buf(),
        minify,
        frontend,
    };
    let files = super::build_site(&options, themes)?;

    tracing::info!("Built {} files to {}/", files.len(), output.display());
    for file in &files {
        println!("  {}", file);
    }

    Ok(())
}

//! CLI subcommands.

pub mod build;
pub mod components;
pub mod dev;
pub mod init;
pub mod serve;
pub mod themes;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use trellis_compiler::{Compiler, FrontendBundle, PluginManager, ThemeCache};
use trellis_schema::Config;

use crate::error::CliError;

/// Theme palettes from the registry, or the built-in ones when `offline`.
pub fn theme_cache(offline: bool) -> ThemeCache {
    if offline {
        ThemeCache::offline()
    } else {
        ThemeCache::registry()
    }
}

/// Read and parse the config at `path`, then run the config-loaded hooks.
pub fn load_config(path: &Path, plugins: &PluginManager) -> Result<Config> {
    if !path.exists() {
        return Err(CliError::ConfigNotFound(path.to_path_buf()).into());
    }

    let config = Config::from_path(path).map_err(CliError::InvalidConfig)?;
    Ok(plugins.run_config_loaded(config))
}

/// Directory content paths in the config resolve against.
pub fn base_path(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Settings shared by every command that compiles the site.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config: PathBuf,
    pub output: PathBuf,
    pub minify: bool,
    pub frontend: Option<PathBuf>,
}

/// Load, validate and compile the site, failing on any unsuccessful result.
///
/// Returns the output entries that were written.
pub fn build_site(options: &BuildOptions, themes: &ThemeCache) -> Result<Vec<String>> {
    let plugins = PluginManager::new();
    let config = load_config(&options.config, &plugins)?;

    let mut compiler = Compiler::new(&config, base_path(&options.config))
        .with_themes(themes)
        .with_plugins(&plugins);
    if let Some(frontend) = &options.frontend {
        compiler = compiler.with_frontend(FrontendBundle::new(frontend));
    }

    let result = compiler
        .compile(&options.output, options.minify)
        .map_err(|e| CliError::BuildFailed(e.to_string()))?;

    if !result.success {
        let message = result.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(CliError::BuildFailed(message).into());
    }

    Ok(result.files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_base_path_from_config_location() {
        assert_eq!(base_path(Path::new("trellis.yaml")), PathBuf::from("."));
        assert_eq!(
            base_path(Path::new("site/trellis.yaml")),
            PathBuf::from("site")
        );
    }

    #[test]
    fn reports_missing_config() {
        let temp = tempdir().unwrap();
        let err = load_config(&temp.path().join("trellis.yaml"), &PluginManager::new())
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn reports_unparseable_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("trellis.yaml");
        fs::write(&path, "site: [not, a, mapping]\n").unwrap();

        let err = load_config(&path, &PluginManager::new()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builds_site_next_to_config() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/index.md"), "# Home\n").unwrap();
        fs::write(
            temp.path().join("trellis.yaml"),
            "site:\n  title: Demo\ncontent:\n  docs:\n    dir: ./docs\n",
        )
        .unwrap();

        let options = BuildOptions {
            config: temp.path().join("trellis.yaml"),
            output: temp.path().join("aiui"),
            minify: false,
            frontend: None,
        };
        let files = build_site(&options, &ThemeCache::offline()).unwrap();

        assert!(files.contains(&"ui-config.json".to_string()));
        assert!(files.contains(&"docs/".to_string()));
        assert!(temp.path().join("aiui/docs/index.md").exists());
    }

    #[test]
    fn fails_build_on_validation_errors() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("trellis.yaml"),
            "site:\n  title: Demo\ncontent:\n  docs:\n    dir: ./missing\n",
        )
        .unwrap();

        let options = BuildOptions {
            config: temp.path().join("trellis.yaml"),
            output: temp.path().join("aiui"),
            minify: false,
            frontend: None,
        };
        let err = build_site(&options, &ThemeCache::offline()).unwrap_err();

        assert_eq!(crate::error::exit_code(&err), 3);
        assert!(!temp.path().join("aiui").exists());
    }
}

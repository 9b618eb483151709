//! Manifest compiler.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use trellis_docs::{DocsScanner, NavBuilder, NavTree};
use trellis_schema::{validate, Config};

use crate::assets::{self, FrontendBundle, INDEX_FILE};
use crate::manifest::{RouteManifest, UiConfig, DOCS_NAV_FILE, ROUTE_MANIFEST_FILE, UI_CONFIG_FILE};
use crate::plugins::PluginManager;
use crate::theme::{self, ThemeCache};

/// Output path of the generated theme stylesheet.
pub const THEME_CSS_FILE: &str = "assets/theme.css";

/// Output directory entry for the copied docs tree.
pub const DOCS_OUTPUT_DIR: &str = "docs/";

/// Result of a compile run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileResult {
    pub success: bool,

    /// Output entries relative to the output directory, in write order
    pub files: Vec<String>,

    pub error: Option<String>,
}

impl CompileResult {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            error: Some(error),
        }
    }
}

/// Errors that can occur while writing outputs.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },

    #[error("Failed to serialize {name}: {message}")]
    SerializeError { name: String, message: String },

    #[error("Failed to copy {path}: {message}")]
    CopyError { path: String, message: String },

    #[error("Failed to render {name}: {message}")]
    RenderError { name: String, message: String },
}

/// Compiles a config and its docs into manifests under an output directory.
pub struct Compiler<'a> {
    config: &'a Config,
    base_path: PathBuf,
    frontend: Option<FrontendBundle>,
    themes: Option<&'a ThemeCache>,
    plugins: Option<&'a PluginManager>,
}

impl<'a> Compiler<'a> {
    /// Create a compiler. Content directories resolve against `base_path`.
    pub fn new(config: &'a Config, base_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_path: base_path.into(),
            frontend: None,
            themes: None,
            plugins: None,
        }
    }

    /// Use a pre-built frontend bundle instead of the placeholder page.
    pub fn with_frontend(mut self, bundle: FrontendBundle) -> Self {
        self.frontend = Some(bundle);
        self
    }

    /// Resolve theme palettes through `themes`. Without one, only the
    /// built-in palettes are used.
    pub fn with_themes(mut self, themes: &'a ThemeCache) -> Self {
        self.themes = Some(themes);
        self
    }

    pub fn with_plugins(mut self, plugins: &'a PluginManager) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// Validate and write every output.
    ///
    /// A failed validation writes nothing and is reported in the result.
    /// Filesystem failures are returned as errors; outputs written before the
    /// failure are left in place.
    pub fn compile(&self, output_dir: &Path, minify: bool) -> Result<CompileResult, CompileError> {
        let start = Instant::now();

        let validation = validate(self.config, &self.base_path);
        if !validation.valid {
            return Ok(CompileResult::failure(format!(
                "Validation failed: {}",
                validation.joined_messages()
            )));
        }

        fs::create_dir_all(output_dir).map_err(|e| write_error(output_dir, e))?;
        let mut files = Vec::new();

        let ui_config = UiConfig::from_config(self.config);
        write_json(&output_dir.join(UI_CONFIG_FILE), &ui_config, minify)?;
        files.push(UI_CONFIG_FILE.to_string());

        if self.config.docs().is_some() {
            let nav = self.docs_nav(output_dir);
            write_json(&output_dir.join(DOCS_NAV_FILE), &nav, minify)?;
            files.push(DOCS_NAV_FILE.to_string());
        }

        let routes = RouteManifest::from_routes(&self.config.routes);
        write_json(&output_dir.join(ROUTE_MANIFEST_FILE), &routes, minify)?;
        files.push(ROUTE_MANIFEST_FILE.to_string());

        self.install_frontend(output_dir)?;
        files.push(INDEX_FILE.to_string());

        if self.write_theme_css(output_dir, minify)? {
            files.push(THEME_CSS_FILE.to_string());
        }

        if self.copy_docs(output_dir)? {
            files.push(DOCS_OUTPUT_DIR.to_string());
        }

        tracing::info!(
            "Compiled {} outputs in {}ms",
            files.len(),
            start.elapsed().as_millis()
        );

        let result = CompileResult {
            success: true,
            files,
            error: None,
        };

        Ok(match self.plugins {
            Some(plugins) => plugins.run_compile_complete(result),
            None => result,
        })
    }

    fn docs_nav(&self, output_dir: &Path) -> NavTree {
        let Some(docs) = self.config.docs() else {
            return NavTree::default();
        };

        let pages = DocsScanner::new(self.base_path.join(&docs.dir))
            .include(&docs.include)
            .exclude(&docs.exclude)
            .index_files(&docs.index_files)
            .skip_dir(output_dir)
            .scan();
        tracing::debug!("Discovered {} docs pages", pages.len());

        let pages = match self.plugins {
            Some(plugins) => plugins.run_scan_complete(pages),
            None => pages,
        };

        let items = NavBuilder::new(&self.config.site.route_base_docs).build(&pages);
        let items = match self.plugins {
            Some(plugins) => plugins.run_nav_built(items),
            None => items,
        };

        NavTree { items }
    }

    fn install_frontend(&self, output_dir: &Path) -> Result<(), CompileError> {
        match &self.frontend {
            Some(bundle) if bundle.exists() => {
                return bundle.install(output_dir).map_err(|e| CompileError::CopyError {
                    path: bundle.root().display().to_string(),
                    message: e.to_string(),
                });
            }
            Some(bundle) => tracing::warn!(
                "Frontend bundle not found at {}, writing placeholder {}",
                bundle.root().display(),
                INDEX_FILE
            ),
            None => tracing::debug!("No frontend bundle configured, writing placeholder"),
        }

        let site = &self.config.site;
        let html = assets::render_placeholder(
            &site.title,
            site.description.as_deref(),
            self.config.docs().is_some(),
            site.theme.is_some(),
        )
        .map_err(|e| CompileError::RenderError {
            name: INDEX_FILE.to_string(),
            message: e.to_string(),
        })?;

        let path = output_dir.join(INDEX_FILE);
        fs::write(&path, html).map_err(|e| write_error(&path, e))
    }

    /// Write `assets/theme.css` when the site has a theme block.
    fn write_theme_css(&self, output_dir: &Path, minify: bool) -> Result<bool, CompileError> {
        let Some(theme_config) = &self.config.site.theme else {
            return Ok(false);
        };

        let radius = theme::radius_value(theme_config.radius.as_str());
        let render_error = |e: theme::ThemeError| CompileError::RenderError {
            name: THEME_CSS_FILE.to_string(),
            message: e.to_string(),
        };
        let css = match self.themes {
            Some(themes) => themes.theme_css(&theme_config.preset, theme_config.dark_mode, radius),
            None => theme::render_theme_css(
                &theme::fallback_palettes(),
                &theme_config.preset,
                theme_config.dark_mode,
                radius,
            ),
        }
        .map_err(render_error)?;

        let css = if minify {
            assets::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Failed to minify theme CSS: {}", e);
                css
            })
        } else {
            css
        };

        let path = output_dir.join(THEME_CSS_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }
        fs::write(&path, css).map_err(|e| write_error(&path, e))?;

        Ok(true)
    }

    /// Replace `output_dir/docs` with a copy of the docs source.
    fn copy_docs(&self, output_dir: &Path) -> Result<bool, CompileError> {
        let Some(docs) = self.config.docs() else {
            return Ok(false);
        };

        let source = self.base_path.join(&docs.dir);
        if !source.is_dir() {
            return Ok(false);
        }

        assets::replace_dir(&source, &output_dir.join("docs"), &[output_dir]).map_err(|e| {
            CompileError::CopyError {
                path: source.display().to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(true)
    }
}

/// Compile `config` into `output_dir` with the default collaborators.
pub fn compile(
    config: &Config,
    base_path: &Path,
    output_dir: &Path,
    minify: bool,
) -> Result<CompileResult, CompileError> {
    Compiler::new(config, base_path).compile(output_dir, minify)
}

/// Serialize `value` as UTF-8 JSON: two-space indented, or compact if `minify`.
fn write_json<T: Serialize>(path: &Path, value: &T, minify: bool) -> Result<(), CompileError> {
    let json = if minify {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .map_err(|e| CompileError::SerializeError {
        name: path.display().to_string(),
        message: e.to_string(),
    })?;

    fs::write(path, json).map_err(|e| write_error(path, e))
}

fn write_error(path: &Path, e: std::io::Error) -> CompileError {
    CompileError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{HookKind, Plugin};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use trellis_docs::{DocPage, NavItem};
    use trellis_schema::{
        ContentConfig, ContentSourceConfig, Radius, RouteConfig, SiteConfig, SlotRef,
        TemplateConfig, ThemeConfig,
    };

    fn docs_config(dir: &str) -> Config {
        let mut config = Config::new(SiteConfig::new("Test"));
        config.content = Some(ContentConfig {
            docs: Some(ContentSourceConfig::new(dir)),
            ..Default::default()
        });
        config
            .templates
            .insert("docs".to_string(), TemplateConfig::new("Default"));
        config.routes.push(RouteConfig::new("/docs/**", "docs"));
        config
    }

    #[test]
    fn validation_failure_writes_nothing() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");
        let mut config = Config::new(SiteConfig::new("Test"));
        config.templates.insert(
            "docs".to_string(),
            TemplateConfig::new("Default").with_slot("header", Some(SlotRef::component("missing"))),
        );
        config.routes.push(RouteConfig::new("/x", "nope"));

        let result = compile(&config, temp.path(), &out, false).unwrap();

        assert!(!result.success);
        assert!(result.files.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some(
                "Validation failed: Component reference 'missing' not found; \
                 Template 'nope' not found in route '/x'"
            )
        );
        assert!(!out.exists());
    }

    #[test]
    fn writes_manifests_without_docs() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");
        let config = Config::new(SiteConfig::new("Plain"));

        let result = compile(&config, temp.path(), &out, false).unwrap();

        assert!(result.success);
        assert_eq!(
            result.files,
            vec!["ui-config.json", "route-manifest.json", "index.html"]
        );
        assert!(!out.join(DOCS_NAV_FILE).exists());
        assert!(fs::read_to_string(out.join(INDEX_FILE))
            .unwrap()
            .contains("<h1>Plain</h1>"));
    }

    #[test]
    fn copies_docs_and_lists_it() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("content");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::write(docs.join("index.md"), "# Home").unwrap();
        fs::write(docs.join("guide/setup.md"), "# Setup").unwrap();
        let out = temp.path().join("out");

        let result = compile(&docs_config("content"), temp.path(), &out, false).unwrap();

        assert_eq!(
            result.files,
            vec![
                "ui-config.json",
                "docs-nav.json",
                "route-manifest.json",
                "index.html",
                "docs/"
            ]
        );
        assert_eq!(
            fs::read_to_string(out.join("docs/guide/setup.md")).unwrap(),
            "# Setup"
        );
    }

    #[test]
    fn minify_drops_whitespace() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");
        let config = Config::new(SiteConfig::new("Ünïcode"));

        compile(&config, temp.path(), &out, true).unwrap();

        let json = fs::read_to_string(out.join(UI_CONFIG_FILE)).unwrap();
        assert!(json.starts_with("{\"site\":{\"title\":\"Ünïcode\","));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn pretty_json_uses_two_space_indent() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");

        compile(&Config::new(SiteConfig::new("T")), temp.path(), &out, false).unwrap();

        let json = fs::read_to_string(out.join(ROUTE_MANIFEST_FILE)).unwrap();
        assert_eq!(json, "{\n  \"routes\": []\n}");
    }

    #[test]
    fn writes_theme_css_after_bundle() {
        let temp = tempdir().unwrap();
        let bundle_dir = temp.path().join("frontend");
        fs::create_dir_all(bundle_dir.join("assets")).unwrap();
        fs::write(bundle_dir.join(INDEX_FILE), "<html></html>").unwrap();
        fs::write(bundle_dir.join("assets/app.js"), "").unwrap();

        let mut site = SiteConfig::new("Themed");
        site.theme = Some(ThemeConfig {
            radius: Radius::Lg,
            dark_mode: false,
            ..Default::default()
        });
        let config = Config::new(site);
        let themes = ThemeCache::offline();
        let out = temp.path().join("out");

        let result = Compiler::new(&config, temp.path())
            .with_frontend(FrontendBundle::new(&bundle_dir))
            .with_themes(&themes)
            .compile(&out, false)
            .unwrap();

        assert!(result.files.contains(&THEME_CSS_FILE.to_string()));
        assert!(out.join("assets/app.js").exists());
        let css = fs::read_to_string(out.join(THEME_CSS_FILE)).unwrap();
        assert!(css.contains("--radius: 0.75rem;"));
        assert!(!css.contains(".dark"));
        assert_eq!(
            fs::read_to_string(out.join(INDEX_FILE)).unwrap(),
            "<html></html>"
        );
    }

    struct Retitle;

    impl Plugin for Retitle {
        fn name(&self) -> &str {
            "retitle"
        }

        fn hooks(&self) -> &[HookKind] {
            &[
                HookKind::ScanComplete,
                HookKind::NavBuilt,
                HookKind::CompileComplete,
            ]
        }

        fn on_scan_complete(&self, pages: Vec<DocPage>) -> Vec<DocPage> {
            pages.into_iter().filter(|p| p.slug != "draft").collect()
        }

        fn on_nav_built(&self, mut nav: Vec<NavItem>) -> Vec<NavItem> {
            for item in &mut nav {
                item.title = item.title.to_uppercase();
            }
            nav
        }

        fn on_compile_complete(&self, mut result: CompileResult) -> CompileResult {
            result.files.push("plugin.txt".to_string());
            result
        }
    }

    #[test]
    fn runs_plugin_hooks() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("intro.md"), "# Intro").unwrap();
        fs::write(docs.join("draft.md"), "# Draft").unwrap();
        let out = temp.path().join("out");

        let mut plugins = PluginManager::new();
        plugins.register(Retitle).unwrap();
        let config = docs_config("docs");

        let result = Compiler::new(&config, temp.path())
            .with_plugins(&plugins)
            .compile(&out, false)
            .unwrap();

        assert_eq!(result.files.last().map(String::as_str), Some("plugin.txt"));
        let nav: NavTree =
            serde_json::from_str(&fs::read_to_string(out.join(DOCS_NAV_FILE)).unwrap()).unwrap();
        assert_eq!(nav.items, vec![NavItem::new("INTRO", "/docs/intro")]);
    }
}

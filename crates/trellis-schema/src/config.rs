//! Configuration model for `trellis.yaml`.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "trellis.yaml";

/// Slot name to optional slot content. A `null` slot is an explicit "no content".
pub type Slots = IndexMap<String, Option<SlotRef>>;

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Schema revision of the document
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Site-level metadata
    pub site: SiteConfig,

    /// Content sources keyed by name
    #[serde(default)]
    pub content: Option<ContentConfig>,

    /// Component definitions by name
    #[serde(default)]
    pub components: IndexMap<String, ComponentConfig>,

    /// Template definitions by name
    #[serde(default)]
    pub templates: IndexMap<String, TemplateConfig>,

    /// Route rules, first declared wins
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default)]
    pub seo: Option<SeoConfig>,

    #[serde(default)]
    pub i18n: Option<I18nConfig>,

    #[serde(default)]
    pub a11y: Option<A11yConfig>,

    /// Frontend packages the site expects to be installed
    #[serde(default)]
    pub dependencies: Option<DependenciesConfig>,
}

fn default_schema_version() -> u32 {
    1
}

impl Config {
    /// Create a config with only the required site block.
    pub fn new(site: SiteConfig) -> Self {
        Self {
            schema_version: default_schema_version(),
            site,
            content: None,
            components: IndexMap::new(),
            templates: IndexMap::new(),
            routes: Vec::new(),
            seo: None,
            i18n: None,
            a11y: None,
            dependencies: None,
        }
    }

    /// Parse a config from YAML source and check its value constraints.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml_str(&source)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// The docs content source, if configured.
    pub fn docs(&self) -> Option<&ContentSourceConfig> {
        self.content.as_ref().and_then(|c| c.docs.as_ref())
    }

    /// The blog content source, if configured.
    pub fn blog(&self) -> Option<&ContentSourceConfig> {
        self.content.as_ref().and_then(|c| c.blog.as_ref())
    }

    /// Check constraints serde cannot express.
    fn check(&self) -> Result<(), ConfigError> {
        let Some(content) = &self.content else {
            return Ok(());
        };

        for (name, source) in content.sources() {
            if let Some(nav) = &source.nav {
                if !(1..=10).contains(&nav.max_depth) {
                    return Err(ConfigError::Invalid(format!(
                        "content.{}.nav.maxDepth must be between 1 and 10, got {}",
                        name, nav.max_depth
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Site-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// URL prefix the docs navigation is mounted under
    #[serde(default = "default_route_base_docs")]
    pub route_base_docs: String,

    #[serde(default)]
    pub ui: UiLibrary,

    #[serde(default)]
    pub theme: Option<ThemeConfig>,
}

fn default_route_base_docs() -> String {
    "/docs".to_string()
}

impl SiteConfig {
    /// Create a site block with defaults for everything but the title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            route_base_docs: default_route_base_docs(),
            ui: UiLibrary::default(),
            theme: None,
        }
    }
}

/// UI component library the frontend renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UiLibrary {
    #[default]
    Shadcn,
    Mui,
    Chakra,
}

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    #[serde(default)]
    pub radius: Radius,

    /// Color palette name (e.g. "zinc", "blue")
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default = "default_brand_color")]
    pub brand_color: String,

    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_preset() -> String {
    "zinc".to_string()
}

fn default_brand_color() -> String {
    "indigo".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            radius: Radius::default(),
            preset: default_preset(),
            brand_color: default_brand_color(),
            dark_mode: true,
        }
    }
}

/// Corner radius preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Radius {
    None,
    Sm,
    #[default]
    Md,
    Lg,
    Full,
}

impl Radius {
    /// Preset name as written in the config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Full => "full",
        }
    }
}

/// Content sources. `docs` and `blog` are well known; any other key is kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub docs: Option<ContentSourceConfig>,

    #[serde(default)]
    pub blog: Option<ContentSourceConfig>,

    #[serde(flatten)]
    pub extra: IndexMap<String, ContentSourceConfig>,
}

impl ContentConfig {
    /// Iterate every configured source with its name.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &ContentSourceConfig)> {
        self.docs
            .iter()
            .map(|s| ("docs", s))
            .chain(self.blog.iter().map(|s| ("blog", s)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

/// A single content source directory.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSourceConfig {
    /// Directory relative to the config file
    pub dir: String,

    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,

    #[serde(default)]
    pub nav: Option<NavConfig>,
}

fn default_include() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.mdx".to_string()]
}

fn default_index_files() -> Vec<String> {
    vec!["index.md".to_string(), "README.md".to_string()]
}

impl ContentSourceConfig {
    /// Create a source for `dir` with default patterns.
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            include: default_include(),
            exclude: Vec::new(),
            index_files: default_index_files(),
            nav: None,
        }
    }
}

/// Navigation behavior for a content source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavConfig {
    #[serde(default)]
    pub mode: NavMode,

    #[serde(default)]
    pub sort: NavSort,

    #[serde(default = "default_true")]
    pub collapsible: bool,

    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
}

fn default_max_depth() -> u8 {
    4
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            mode: NavMode::default(),
            sort: NavSort::default(),
            collapsible: true,
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavSort {
    #[default]
    Filesystem,
    Alpha,
    Date,
}

/// Slot content: a component reference or an inline component type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SlotRef {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl SlotRef {
    /// Slot pointing at a named component.
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            reference: Some(name.into()),
            kind: None,
        }
    }

    /// Slot rendering an inline component type.
    pub fn inline(kind: impl Into<String>) -> Self {
        Self {
            reference: None,
            kind: Some(kind.into()),
        }
    }
}

/// Component definition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub props: IndexMap<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            props: IndexMap::new(),
        }
    }
}

/// Template definition with a layout and named slots.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub layout: String,

    #[serde(default)]
    pub slots: Slots,

    /// Widget lists per layout zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<IndexMap<String, Vec<WidgetConfig>>>,
}

impl TemplateConfig {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            slots: Slots::new(),
            zones: None,
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, slot: Option<SlotRef>) -> Self {
        self.slots.insert(name.into(), slot);
        self
    }
}

/// A widget placed in a layout zone.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WidgetConfig {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub props: IndexMap<String, serde_json::Value>,
}

/// Route rule mapping a URL glob to a template.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteConfig {
    #[serde(rename = "match")]
    pub pattern: String,

    pub template: String,

    /// Per-route slot overrides
    #[serde(default)]
    pub slots: Option<Slots>,
}

impl RouteConfig {
    pub fn new(pattern: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            template: template.into(),
            slots: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoConfig {
    #[serde(default = "default_title_template")]
    pub title_template: String,

    #[serde(default)]
    pub default_image: Option<String>,

    #[serde(default)]
    pub twitter: Option<IndexMap<String, String>>,
}

fn default_title_template() -> String {
    "%s".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Locales rendered right-to-left
    #[serde(default)]
    pub rtl_locales: Vec<String>,

    #[serde(default)]
    pub fallback_locale: Option<String>,

    #[serde(default = "default_translations_dir")]
    pub translations_dir: String,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_locales() -> Vec<String> {
    vec![default_locale()]
}

fn default_translations_dir() -> String {
    "./translations".to_string()
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locales: default_locales(),
            rtl_locales: Vec::new(),
            fallback_locale: None,
            translations_dir: default_translations_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct A11yConfig {
    #[serde(default = "default_true")]
    pub skip_to_content: bool,

    #[serde(default = "default_true")]
    pub focus_visible: bool,

    #[serde(default)]
    pub reduce_motion: bool,

    #[serde(default)]
    pub aria_labels: IndexMap<String, String>,
}

impl Default for A11yConfig {
    fn default() -> Self {
        Self {
            skip_to_content: true,
            focus_visible: true,
            reduce_motion: false,
            aria_labels: IndexMap::new(),
        }
    }
}

/// Frontend packages required by the site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DependenciesConfig {
    /// shadcn/ui component names
    #[serde(default)]
    pub shadcn: Vec<String>,
}

/// Errors that can occur when loading a config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_minimal_config() {
        let config = Config::from_yaml_str("site:\n  title: Test Site\n").unwrap();

        assert_eq!(config.schema_version, 1);
        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.route_base_docs, "/docs");
        assert_eq!(config.site.ui, UiLibrary::Shadcn);
        assert!(config.site.theme.is_none());
        assert!(config.content.is_none());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn requires_site() {
        let result = Config::from_yaml_str("schemaVersion: 1\n");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn parses_full_site_block() {
        let source = r#"
site:
  title: Full Site
  description: A test site
  routeBaseDocs: /documentation
  ui: mui
  theme:
    preset: blue
    radius: lg
    darkMode: false
"#;
        let config = Config::from_yaml_str(source).unwrap();

        assert_eq!(config.site.description.as_deref(), Some("A test site"));
        assert_eq!(config.site.route_base_docs, "/documentation");
        assert_eq!(config.site.ui, UiLibrary::Mui);

        let theme = config.site.theme.unwrap();
        assert_eq!(theme.preset, "blue");
        assert_eq!(theme.radius, Radius::Lg);
        assert_eq!(theme.brand_color, "indigo");
        assert!(!theme.dark_mode);
    }

    #[test]
    fn content_source_defaults() {
        let source = "site:\n  title: T\ncontent:\n  docs:\n    dir: ./docs\n";
        let config = Config::from_yaml_str(source).unwrap();
        let docs = config.docs().unwrap();

        assert_eq!(docs.dir, "./docs");
        assert_eq!(docs.include, vec!["**/*.md", "**/*.mdx"]);
        assert!(docs.exclude.is_empty());
        assert_eq!(docs.index_files, vec!["index.md", "README.md"]);
        assert!(config.blog().is_none());
    }

    #[test]
    fn keeps_extra_content_sources() {
        let source = r#"
site:
  title: T
content:
  docs:
    dir: ./docs
  changelog:
    dir: ./changelog
"#;
        let config = Config::from_yaml_str(source).unwrap();
        let names: Vec<_> = config.content.unwrap().sources().map(|(n, _)| n.to_string()).collect();

        assert_eq!(names, vec!["docs", "changelog"]);
    }

    #[test]
    fn rejects_out_of_range_max_depth() {
        let source = r#"
site:
  title: T
content:
  docs:
    dir: ./docs
    nav:
      maxDepth: 11
"#;
        let result = Config::from_yaml_str(source);

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn nav_defaults() {
        let source = "site:\n  title: T\ncontent:\n  docs:\n    dir: d\n    nav: {}\n";
        let config = Config::from_yaml_str(source).unwrap();

        assert_eq!(config.docs().unwrap().nav, Some(NavConfig::default()));
    }

    #[test]
    fn parses_templates_with_null_slot() {
        let source = r#"
site:
  title: T
templates:
  docs:
    layout: ThreeColumnLayout
    slots:
      header: { ref: header_main }
      main: { type: DocContent }
      right: null
"#;
        let config = Config::from_yaml_str(source).unwrap();
        let template = &config.templates["docs"];

        assert_eq!(template.layout, "ThreeColumnLayout");
        assert_eq!(
            template.slots["header"],
            Some(SlotRef::component("header_main"))
        );
        assert_eq!(template.slots["main"], Some(SlotRef::inline("DocContent")));
        assert_eq!(template.slots["right"], None);
        let order: Vec<_> = template.slots.keys().cloned().collect();
        assert_eq!(order, vec!["header", "main", "right"]);
    }

    #[test]
    fn parses_routes_and_components() {
        let source = r#"
site:
  title: T
components:
  footer_main:
    type: Footer
    props:
      text: "© 2024"
      links: [a, b]
routes:
  - match: "/docs/**"
    template: docs
  - match: "/blog/**"
    template: blog
    slots:
      left: null
"#;
        let config = Config::from_yaml_str(source).unwrap();

        let footer = &config.components["footer_main"];
        assert_eq!(footer.kind, "Footer");
        assert_eq!(footer.props["text"], serde_json::json!("© 2024"));
        assert_eq!(footer.props["links"], serde_json::json!(["a", "b"]));

        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].pattern, "/docs/**");
        assert!(config.routes[0].slots.is_none());
        assert_eq!(config.routes[1].slots.as_ref().unwrap()["left"], None);
    }

    #[test]
    fn i18n_and_a11y_defaults() {
        let source = "site:\n  title: T\ni18n: {}\na11y: {}\n";
        let config = Config::from_yaml_str(source).unwrap();

        assert_eq!(config.i18n, Some(I18nConfig::default()));
        let a11y = config.a11y.unwrap();
        assert!(a11y.skip_to_content);
        assert!(a11y.focus_visible);
        assert!(!a11y.reduce_motion);
        assert!(a11y.aria_labels.is_empty());
    }

    #[test]
    fn parses_rtl_locales_and_dependencies() {
        let source = r#"
site:
  title: T
i18n:
  locales: [en, ar, he]
  rtlLocales: [ar, he]
  fallbackLocale: en
dependencies:
  shadcn: [button, card]
"#;
        let config = Config::from_yaml_str(source).unwrap();
        let i18n = config.i18n.unwrap();

        assert_eq!(i18n.rtl_locales, vec!["ar", "he"]);
        assert_eq!(i18n.fallback_locale.as_deref(), Some("en"));
        assert_eq!(config.dependencies.unwrap().shadcn, vec!["button", "card"]);
    }

    #[test]
    fn reads_from_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "site:\n  title: From Disk\n").unwrap();

        let config = Config::from_path(&path).unwrap();

        assert_eq!(config.site.title, "From Disk");
        assert!(matches!(
            Config::from_path(&temp.path().join("missing.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}

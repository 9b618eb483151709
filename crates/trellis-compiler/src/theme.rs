//! Theme palettes and CSS variable generation.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use indexmap::IndexMap;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use ureq::Agent;

/// Registry of official shadcn/ui color palettes.
pub const SHADCN_THEMES_URL: &str = "https://ui.shadcn.com/registry/colors.json";

/// Palette used when a requested preset is unknown.
pub const DEFAULT_PRESET: &str = "zinc";

const REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// CSS variable name (without `--`) to value.
pub type ColorMap = IndexMap<String, String>;

/// Palettes keyed by preset name.
pub type Palettes = BTreeMap<String, Palette>;

/// Light and dark color sets of one preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub light: ColorMap,
    #[serde(default)]
    pub dark: ColorMap,
}

/// Errors that can occur when loading palettes or rendering CSS.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to fetch theme registry: {0}")]
    Fetch(String),

    #[error("Theme registry returned no usable palettes")]
    EmptyRegistry,

    #[error("Failed to render theme CSS: {0}")]
    Render(String),
}

/// Somewhere palettes can be loaded from.
pub trait ThemeSource: Send + Sync {
    fn fetch(&self) -> Result<Palettes, ThemeError>;
}

/// Fetches palettes from a remote JSON registry.
pub struct RegistryThemeSource {
    url: String,
    agent: Agent,
}

impl RegistryThemeSource {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(REGISTRY_TIMEOUT))
            .build()
            .into();

        Self {
            url: url.into(),
            agent,
        }
    }
}

impl Default for RegistryThemeSource {
    fn default() -> Self {
        Self::new(SHADCN_THEMES_URL)
    }
}

impl ThemeSource for RegistryThemeSource {
    fn fetch(&self) -> Result<Palettes, ThemeError> {
        let mut response = self
            .agent
            .get(&self.url)
            .header("User-Agent", concat!("trellis/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|e| ThemeError::Fetch(e.to_string()))?;

        let document: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|e| ThemeError::Fetch(e.to_string()))?;

        parse_palettes(document)
    }
}

/// Serves the built-in palettes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackThemeSource;

impl ThemeSource for FallbackThemeSource {
    fn fetch(&self) -> Result<Palettes, ThemeError> {
        Ok(fallback_palettes())
    }
}

/// Keep every top-level entry shaped like `{light: {...}, dark: {...}}`.
fn parse_palettes(document: serde_json::Value) -> Result<Palettes, ThemeError> {
    let serde_json::Value::Object(entries) = document else {
        return Err(ThemeError::EmptyRegistry);
    };

    let palettes: Palettes = entries
        .into_iter()
        .filter_map(|(name, value)| {
            serde_json::from_value::<Palette>(value)
                .ok()
                .map(|palette| (name, palette))
        })
        .collect();

    if palettes.is_empty() {
        return Err(ThemeError::EmptyRegistry);
    }
    Ok(palettes)
}

/// Palette loader that memoizes the first successful fetch.
///
/// A failed fetch is not remembered: the built-in palettes are returned and
/// the next call tries the source again.
pub struct ThemeCache {
    source: Box<dyn ThemeSource>,
    palettes: OnceLock<Arc<Palettes>>,
}

impl ThemeCache {
    pub fn new(source: impl ThemeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            palettes: OnceLock::new(),
        }
    }

    /// Cache backed by the shadcn registry.
    pub fn registry() -> Self {
        Self::new(RegistryThemeSource::default())
    }

    /// Cache that never touches the network.
    pub fn offline() -> Self {
        Self::new(FallbackThemeSource)
    }

    pub fn palettes(&self) -> Arc<Palettes> {
        if let Some(palettes) = self.palettes.get() {
            return Arc::clone(palettes);
        }

        match self.source.fetch() {
            Ok(palettes) => {
                tracing::debug!("Loaded {} theme palettes", palettes.len());
                Arc::clone(self.palettes.get_or_init(|| Arc::new(palettes)))
            }
            Err(e) => {
                tracing::warn!("{}, using built-in palettes", e);
                Arc::new(fallback_palettes())
            }
        }
    }

    /// Names of every available palette, sorted.
    pub fn available_themes(&self) -> Vec<String> {
        self.palettes().keys().cloned().collect()
    }

    /// Render the stylesheet for a preset.
    pub fn theme_css(&self, preset: &str, dark_mode: bool, radius: &str) -> Result<String, ThemeError> {
        render_theme_css(&self.palettes(), preset, dark_mode, radius)
    }
}

impl Default for ThemeCache {
    fn default() -> Self {
        Self::offline()
    }
}

/// CSS value for a radius preset name; unknown names map to `md`.
pub fn radius_value(preset: &str) -> &'static str {
    match preset {
        "none" => "0",
        "sm" => "0.3rem",
        "lg" => "0.75rem",
        "xl" => "1rem",
        "full" => "9999px",
        _ => "0.5rem",
    }
}

const THEME_TEMPLATE: &str = r#":root {
  --radius: {{ radius }};
{%- for name, value in light %}
  --{{ name }}: {{ value }};
{%- endfor %}
}
{%- if dark %}

.dark {
{%- for name, value in dark %}
  --{{ name }}: {{ value }};
{%- endfor %}
}
{%- endif %}
"#;

/// Render `:root` variables for the light colors and, when `dark_mode` is
/// set, a `.dark` block with the dark colors.
///
/// An unknown preset falls back to `zinc`, then to the built-in palette.
pub fn render_theme_css(
    palettes: &Palettes,
    preset: &str,
    dark_mode: bool,
    radius: &str,
) -> Result<String, ThemeError> {
    let fallback;
    let palette = match palettes.get(preset).or_else(|| palettes.get(DEFAULT_PRESET)) {
        Some(palette) => palette,
        None => {
            fallback = zinc();
            &fallback
        }
    };

    let light: Vec<(&String, &String)> = palette.light.iter().collect();
    let dark: Option<Vec<(&String, &String)>> =
        (dark_mode && !palette.dark.is_empty()).then(|| palette.dark.iter().collect());

    let mut env = Environment::new();
    env.add_template("theme.css", THEME_TEMPLATE)
        .map_err(|e| ThemeError::Render(e.to_string()))?;

    env.get_template("theme.css")
        .and_then(|tmpl| {
            tmpl.render(context! {
                radius => radius,
                light => light,
                dark => dark,
            })
        })
        .map_err(|e| ThemeError::Render(e.to_string()))
}

/// The palettes available without network access.
pub fn fallback_palettes() -> Palettes {
    let mut palettes = Palettes::new();
    palettes.insert(DEFAULT_PRESET.to_string(), zinc());
    palettes
}

fn zinc() -> Palette {
    Palette {
        light: colors(&[
            ("background", "0 0% 100%"),
            ("foreground", "240 10% 3.9%"),
            ("card", "0 0% 100%"),
            ("card-foreground", "240 10% 3.9%"),
            ("popover", "0 0% 100%"),
            ("popover-foreground", "240 10% 3.9%"),
            ("primary", "240 5.9% 10%"),
            ("primary-foreground", "0 0% 98%"),
            ("secondary", "240 4.8% 95.9%"),
            ("secondary-foreground", "240 5.9% 10%"),
            ("muted", "240 4.8% 95.9%"),
            ("muted-foreground", "240 3.8% 46.1%"),
            ("accent", "240 4.8% 95.9%"),
            ("accent-foreground", "240 5.9% 10%"),
            ("destructive", "0 84.2% 60.2%"),
            ("destructive-foreground", "0 0% 98%"),
            ("border", "240 5.9% 90%"),
            ("input", "240 5.9% 90%"),
            ("ring", "240 5.9% 10%"),
        ]),
        dark: colors(&[
            ("background", "240 10% 3.9%"),
            ("foreground", "0 0% 98%"),
            ("card", "240 10% 3.9%"),
            ("card-foreground", "0 0% 98%"),
            ("popover", "240 10% 3.9%"),
            ("popover-foreground", "0 0% 98%"),
            ("primary", "0 0% 98%"),
            ("primary-foreground", "240 5.9% 10%"),
            ("secondary", "240 3.7% 15.9%"),
            ("secondary-foreground", "0 0% 98%"),
            ("muted", "240 3.7% 15.9%"),
            ("muted-foreground", "240 5% 64.9%"),
            ("accent", "240 3.7% 15.9%"),
            ("accent-foreground", "0 0% 98%"),
            ("destructive", "0 62.8% 30.6%"),
            ("destructive-foreground", "0 0% 98%"),
            ("border", "240 3.7% 15.9%"),
            ("input", "240 3.7% 15.9%"),
            ("ring", "240 4.9% 83.9%"),
        ]),
    }
}

fn colors(pairs: &[(&str, &str)]) -> ColorMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

//! Site configuration model and validation for trellis.
//!
//! This crate defines the typed shape of a `trellis.yaml` document, loads it
//! with `serde_yaml`, and cross-checks references between components,
//! templates, routes and content directories.

pub mod config;
pub mod validate;

pub use config::{
    A11yConfig, ComponentConfig, Config, ConfigError, ContentConfig, ContentSourceConfig,
    DependenciesConfig, I18nConfig, NavConfig, NavMode, NavSort, Radius, RouteConfig, SeoConfig,
    SiteConfig, SlotRef, Slots, TemplateConfig, ThemeConfig, UiLibrary, WidgetConfig,
    DEFAULT_CONFIG_FILE,
};
pub use validate::{validate, ErrorCode, ValidationError, ValidationResult};

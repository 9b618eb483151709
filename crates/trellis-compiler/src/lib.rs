//! Manifest compiler for trellis sites.
//!
//! Turns a validated [`trellis_schema::Config`] and its docs tree into the JSON
//! manifests, theme stylesheet and static files the frontend runtime loads.

pub mod assets;
pub mod compiler;
pub mod manifest;
pub mod plugins;
pub mod theme;

pub use assets::FrontendBundle;
pub use compiler::{compile, CompileError, CompileResult, Compiler};
pub use manifest::{
    ComponentManifest, RouteEntry, RouteManifest, SiteManifest, SlotManifest, TemplateManifest,
    ThemeManifest, UiConfig,
};
pub use plugins::{HookKind, Plugin, PluginError, PluginManager};
pub use theme::{
    FallbackThemeSource, Palette, Palettes, RegistryThemeSource, ThemeCache, ThemeError,
    ThemeSource,
};

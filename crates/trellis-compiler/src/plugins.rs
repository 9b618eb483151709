//! Plugin hooks that transform build data between compiler stages.

use std::collections::HashSet;
use std::fmt;

use trellis_docs::{DocPage, NavItem};
use trellis_schema::Config;

use crate::compiler::CompileResult;

/// Points in a build where plugins may rewrite data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// After the config file is parsed
    ConfigLoaded,
    /// After docs pages are discovered
    ScanComplete,
    /// After the navigation tree is built
    NavBuilt,
    /// After all outputs are written
    CompileComplete,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigLoaded => "config_loaded",
            Self::ScanComplete => "scan_complete",
            Self::NavBuilt => "nav_built",
            Self::CompileComplete => "compile_complete",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build plugin.
///
/// Only the hooks listed by [`Plugin::hooks`] are invoked. Every hook method
/// defaults to returning its input unchanged.
pub trait Plugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Hooks run in descending priority.
    fn priority(&self) -> i32 {
        0
    }

    /// Hooks this plugin takes part in.
    fn hooks(&self) -> &[HookKind];

    fn on_config_loaded(&self, config: Config) -> Config {
        config
    }

    fn on_scan_complete(&self, pages: Vec<DocPage>) -> Vec<DocPage> {
        pages
    }

    fn on_nav_built(&self, nav: Vec<NavItem>) -> Vec<NavItem> {
        nav
    }

    fn on_compile_complete(&self, result: CompileResult) -> CompileResult {
        result
    }
}

/// Errors from plugin registration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PluginError {
    #[error("Plugin '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("Plugin '{0}' not found")]
    NotFound(String),
}

/// Registered plugins in registration order.
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) -> Result<(), PluginError> {
        if self.get(plugin.name()).is_some() {
            return Err(PluginError::AlreadyRegistered(plugin.name().to_string()));
        }
        tracing::debug!("Registered plugin {}", plugin.name());
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), PluginError> {
        let index = self
            .plugins
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        self.plugins.remove(index);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn run_config_loaded(&self, config: Config) -> Config {
        self.run(HookKind::ConfigLoaded, config, |p, c| p.on_config_loaded(c))
    }

    pub fn run_scan_complete(&self, pages: Vec<DocPage>) -> Vec<DocPage> {
        self.run(HookKind::ScanComplete, pages, |p, v| p.on_scan_complete(v))
    }

    pub fn run_nav_built(&self, nav: Vec<NavItem>) -> Vec<NavItem> {
        self.run(HookKind::NavBuilt, nav, |p, v| p.on_nav_built(v))
    }

    pub fn run_compile_complete(&self, result: CompileResult) -> CompileResult {
        self.run(HookKind::CompileComplete, result, |p, r| p.on_compile_complete(r))
    }

    /// Thread `value` through every plugin subscribed to `hook`.
    fn run<T>(&self, hook: HookKind, value: T, call: impl Fn(&dyn Plugin, T) -> T) -> T {
        let mut subscribed: Vec<&dyn Plugin> = self
            .plugins
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.hooks().contains(&hook))
            .collect();
        // Stable: equal priorities keep registration order.
        subscribed.sort_by_key(|p| std::cmp::Reverse(p.priority()));

        subscribed.into_iter().fold(value, |value, plugin| {
            tracing::debug!("Running {} hook of plugin {}", hook, plugin.name());
            call(plugin, value)
        })
    }

    /// Hook kinds at least one plugin subscribes to.
    pub fn active_hooks(&self) -> HashSet<HookKind> {
        self.plugins
            .iter()
            .flat_map(|p| p.hooks().iter().copied())
            .collect()
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.names())
            .finish()
    }
}

//! JSON manifest documents consumed by the frontend runtime.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use trellis_schema::{
    Config, Radius, RouteConfig, SlotRef, Slots, TemplateConfig, UiLibrary, WidgetConfig,
};

/// File name of the site/theme/components/templates manifest.
pub const UI_CONFIG_FILE: &str = "ui-config.json";
/// File name of the docs navigation manifest.
pub const DOCS_NAV_FILE: &str = "docs-nav.json";
/// File name of the route manifest.
pub const ROUTE_MANIFEST_FILE: &str = "route-manifest.json";

/// The `ui-config.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    pub site: SiteManifest,
    pub components: IndexMap<String, ComponentManifest>,
    pub templates: IndexMap<String, TemplateManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteManifest {
    pub title: String,
    pub description: Option<String>,
    pub route_base_docs: String,
    pub ui: UiLibrary,
    /// `null` when the site has no theme block
    pub theme: Option<ThemeManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeManifest {
    pub radius: Radius,
    pub preset: String,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentManifest {
    #[serde(rename = "type")]
    pub kind: String,
    pub props: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub layout: String,
    pub slots: IndexMap<String, Option<SlotManifest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<IndexMap<String, Vec<WidgetConfig>>>,
}

/// Rendered slot content: `{"ref": ...}` or `{"type": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotManifest {
    Ref {
        #[serde(rename = "ref")]
        reference: String,
    },
    Type {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl SlotManifest {
    /// Render a configured slot. A reference wins over an inline type; a slot
    /// with neither renders as `null`.
    pub fn from_slot(slot: Option<&SlotRef>) -> Option<Self> {
        let slot = slot?;
        if let Some(reference) = slot.reference.as_ref().filter(|r| !r.is_empty()) {
            return Some(Self::Ref {
                reference: reference.clone(),
            });
        }
        slot.kind
            .as_ref()
            .filter(|k| !k.is_empty())
            .map(|kind| Self::Type { kind: kind.clone() })
    }
}

/// The `route-manifest.json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub pattern: String,
    pub template: String,
    /// Larger wins; the first declared route has the highest value
    pub priority: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_overrides: Option<IndexMap<String, Option<SlotManifest>>>,
}

impl UiConfig {
    pub fn from_config(config: &Config) -> Self {
        let site = &config.site;

        Self {
            site: SiteManifest {
                title: site.title.clone(),
                description: site.description.clone(),
                route_base_docs: site.route_base_docs.clone(),
                ui: site.ui,
                theme: site.theme.as_ref().map(|theme| ThemeManifest {
                    radius: theme.radius,
                    preset: theme.preset.clone(),
                    dark_mode: theme.dark_mode,
                }),
            },
            components: config
                .components
                .iter()
                .map(|(name, component)| {
                    (
                        name.clone(),
                        ComponentManifest {
                            kind: component.kind.clone(),
                            props: component.props.clone(),
                        },
                    )
                })
                .collect(),
            templates: config
                .templates
                .iter()
                .map(|(name, template)| (name.clone(), TemplateManifest::from_template(template)))
                .collect(),
        }
    }
}

impl TemplateManifest {
    fn from_template(template: &TemplateConfig) -> Self {
        Self {
            layout: template.layout.clone(),
            slots: render_slots(&template.slots),
            zones: template.zones.clone(),
        }
    }
}

impl RouteManifest {
    /// Routes keep declaration order; priority is `len - index`.
    pub fn from_routes(routes: &[RouteConfig]) -> Self {
        let total = routes.len();

        Self {
            routes: routes
                .iter()
                .enumerate()
                .map(|(index, route)| RouteEntry {
                    pattern: route.pattern.clone(),
                    template: route.template.clone(),
                    priority: total - index,
                    slot_overrides: route
                        .slots
                        .as_ref()
                        .filter(|slots| !slots.is_empty())
                        .map(render_slots),
                })
                .collect(),
        }
    }
}

fn render_slots(slots: &Slots) -> IndexMap<String, Option<SlotManifest>> {
    slots
        .iter()
        .map(|(name, slot)| (name.clone(), SlotManifest::from_slot(slot.as_ref())))
        .collect()
}

//! Navigation tree building from discovered pages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scanner::DocPage;

/// A navigation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
    /// Child items; omitted from JSON when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The `docs-nav.json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavTree {
    pub items: Vec<NavItem>,
}

/// Builds a navigation tree keyed by slug path segments.
#[derive(Debug, Clone)]
pub struct NavBuilder {
    base_path: String,
}

/// Arena node while the tree is being assembled.
struct Node {
    title: String,
    path: String,
    children: Vec<usize>,
    /// Synthesized for a parent directory with no page of its own
    placeholder: bool,
}

impl NavBuilder {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    /// Build the tree in a single pass over `pages`, in their given order.
    ///
    /// Single-segment slugs (and `index`) become roots. Deeper slugs attach to
    /// the item registered under their parent slug; when none exists yet a
    /// placeholder root is created for it. A page that later arrives for a
    /// placeholder's slug takes over that placeholder.
    pub fn build(&self, pages: &[DocPage]) -> Vec<NavItem> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut roots: Vec<usize> = Vec::new();
        let mut by_slug: HashMap<String, usize> = HashMap::new();

        for page in pages {
            let path = format!("{}/{}", self.base_path, page.slug)
                .trim_end_matches('/')
                .to_string();

            if let Some(&id) = by_slug.get(&page.slug) {
                if nodes[id].placeholder {
                    let node = &mut nodes[id];
                    node.title = page.title.clone();
                    node.path = path;
                    node.placeholder = false;
                    continue;
                }
            }

            let id = nodes.len();
            nodes.push(Node {
                title: page.title.clone(),
                path,
                children: Vec::new(),
                placeholder: false,
            });

            let segments: Vec<&str> = page.slug.split('/').collect();

            if segments.len() == 1 || page.slug == "index" {
                roots.push(id);
            } else {
                let parent_slug = segments[..segments.len() - 1].join("/");
                let parent = match by_slug.get(&parent_slug) {
                    Some(&parent) => parent,
                    None => {
                        let parent = nodes.len();
                        nodes.push(Node {
                            title: title_case(&segments[segments.len() - 2].replace('-', " ")),
                            path: format!("{}/{}", self.base_path, parent_slug),
                            children: Vec::new(),
                            placeholder: true,
                        });
                        roots.push(parent);
                        by_slug.insert(parent_slug, parent);
                        parent
                    }
                };
                nodes[parent].children.push(id);
            }

            by_slug.insert(page.slug.clone(), id);
        }

        roots.iter().map(|&id| materialize(&nodes, id)).collect()
    }

    /// Build the tree wrapped as a `docs-nav` document.
    pub fn build_tree(&self, pages: &[DocPage]) -> NavTree {
        NavTree {
            items: self.build(pages),
        }
    }
}

/// Build navigation roots for `pages` under `base_path`.
pub fn build_nav(pages: &[DocPage], base_path: &str) -> Vec<NavItem> {
    NavBuilder::new(base_path).build(pages)
}

fn materialize(nodes: &[Node], id: usize) -> NavItem {
    let node = &nodes[id];
    NavItem {
        title: node.title.clone(),
        path: node.path.clone(),
        children: node
            .children
            .iter()
            .map(|&child| materialize(nodes, child))
            .collect(),
    }
}

/// Uppercase the first letter of every word, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut previous_is_letter = false;

    for c in s.chars() {
        if previous_is_letter {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }

    result
}

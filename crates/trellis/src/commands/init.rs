//! Write a starter site configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use minijinja::{context, Environment};

use crate::error::CliError;

/// Starter layouts offered by `trellis init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InitTemplate {
    /// Docs site with header, sidebar and footer
    Minimal,
    /// Docs site with nav options and a table of contents
    Docs,
    /// Landing page plus docs
    Marketing,
}

impl InitTemplate {
    fn title(self) -> &'static str {
        match self {
            Self::Minimal | Self::Docs => "My Documentation",
            Self::Marketing => "My Product",
        }
    }
}

/// Run the init command.
pub fn run(config_path: &Path, template: InitTemplate, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(CliError::AlreadyExists(config_path.to_path_buf()).into());
    }

    let yaml = render_config(template)?;
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(config_path, yaml)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let docs_dir = super::base_path(config_path).join("docs");
    let index_path = docs_dir.join("index.md");
    if !index_path.exists() || force {
        fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;
        fs::write(&index_path, DEFAULT_INDEX).context("Failed to write docs/index.md")?;
        tracing::info!("Created {}", index_path.display());
    }

    tracing::info!("Run 'trellis dev' to start the development server.");

    Ok(())
}

/// Render the starter YAML for `template`.
pub fn render_config(template: InitTemplate) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("trellis.yaml.j2", CONFIG_TEMPLATE)?;

    let rendered = env.get_template("trellis.yaml.j2")?.render(context! {
        title => template.title(),
        docs_template => template == InitTemplate::Docs,
        marketing => template == InitTemplate::Marketing,
    })?;

    Ok(rendered)
}

const CONFIG_TEMPLATE: &str = r#"# trellis.yaml
schemaVersion: 1

site:
  title: "{{ title }}"
  description: "Built with trellis"
  theme:
    preset: "zinc"
    radius: "md"
    darkMode: true

content:
  docs:
    dir: "./docs"
    include:
      - "**/*.md"
      - "**/*.mdx"
{%- if docs_template %}
    nav:
      mode: auto
      sort: filesystem
      collapsible: true
      maxDepth: 3
{%- endif %}

templates:
  docs:
    layout: "ThreeColumnLayout"
    slots:
      header: { ref: "header_main" }
      left: { ref: "sidebar_docs" }
      main: { type: "DocContent" }
{%- if docs_template %}
      right: { type: "TableOfContents" }
{%- endif %}
      footer: { ref: "footer_main" }
{%- if marketing %}

  landing:
    layout: "SingleColumnLayout"
    slots:
      header: { ref: "header_main" }
      main: { ref: "hero_main" }
      footer: { ref: "footer_main" }
{%- endif %}

components:
  header_main:
    type: "Header"
    props:
      logoText: "{{ title }}"

  footer_main:
    type: "Footer"
    props:
      text: "Built with trellis"

  sidebar_docs:
    type: "DocsSidebar"
    props:
      source: "docs-nav"
{%- if marketing %}

  hero_main:
    type: "Hero"
    props:
      headline: "{{ title }}"
      cta: { label: "Get started", href: "/docs" }
{%- endif %}

routes:
{%- if marketing %}
  - match: "/"
    template: "landing"
{%- endif %}
  - match: "/docs/**"
    template: "docs"
"#;

const DEFAULT_INDEX: &str = r#"---
title: Introduction
---

# Introduction

Welcome to your documentation. Edit `docs/index.md` to get started.
"#;

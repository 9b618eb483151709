//! Frontend bundle installation and content copying.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use walkdir::WalkDir;

use crate::manifest::{DOCS_NAV_FILE, ROUTE_MANIFEST_FILE, UI_CONFIG_FILE};

/// Entry document of the frontend bundle.
pub const INDEX_FILE: &str = "index.html";

/// A pre-built frontend: `index.html` plus an optional `assets/` directory.
#[derive(Debug, Clone)]
pub struct FrontendBundle {
    root: PathBuf,
}

impl FrontendBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the bundle has an entry document.
    pub fn exists(&self) -> bool {
        self.root.join(INDEX_FILE).is_file()
    }

    /// Copy `index.html` into `output_dir` and replace `output_dir/assets`
    /// with the bundle's assets.
    pub fn install(&self, output_dir: &Path) -> io::Result<()> {
        fs::copy(self.root.join(INDEX_FILE), output_dir.join(INDEX_FILE))?;

        let assets = self.root.join("assets");
        if assets.is_dir() {
            replace_dir(&assets, &output_dir.join("assets"), &[])?;
        }

        tracing::debug!("Installed frontend bundle from {}", self.root.display());
        Ok(())
    }
}

/// Copy `from` to `to`, removing whatever was at `to` first.
///
/// Directories listed in `skip` are left out of the copy.
pub fn replace_dir(from: &Path, to: &Path, skip: &[&Path]) -> io::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)?;
    }
    copy_dir(from, to, skip)
}

/// Recursively copy the contents of `from` into `to`.
///
/// `to` itself and every directory in `skip` are never descended into, so a
/// destination nested inside the source is not copied into itself.
pub fn copy_dir(from: &Path, to: &Path, skip: &[&Path]) -> io::Result<()> {
    fs::create_dir_all(to)?;

    let skip: Vec<PathBuf> = std::iter::once(to)
        .chain(skip.iter().copied())
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect();

    let walker = WalkDir::new(from)
        .follow_links(true)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry.path(), entry.file_type().is_dir(), &skip));

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn is_skipped(path: &Path, is_dir: bool, skip: &[PathBuf]) -> bool {
    is_dir
        && !skip.is_empty()
        && fs::canonicalize(path).is_ok_and(|canonical| skip.contains(&canonical))
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}

/// Render the page written in place of a missing frontend bundle.
pub fn render_placeholder(
    site_title: &str,
    description: Option<&str>,
    has_docs_nav: bool,
    has_theme: bool,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(INDEX_FILE, PLACEHOLDER_TEMPLATE)?;

    let mut manifests = vec![UI_CONFIG_FILE];
    if has_docs_nav {
        manifests.push(DOCS_NAV_FILE);
    }
    manifests.push(ROUTE_MANIFEST_FILE);

    env.get_template(INDEX_FILE)?.render(context! {
        title => site_title,
        description => description,
        manifests => manifests,
        has_theme => has_theme,
    })
}

const PLACEHOLDER_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if has_theme %}<link rel="stylesheet" href="/assets/theme.css">
  {% endif %}<style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto; padding: 0 1rem; }
    code { font-family: ui-monospace, monospace; }
  </style>
</head>
<body>
  <main>
    <h1>{{ title }}</h1>
    {% if description %}<p>{{ description }}</p>
    {% endif %}<p>No frontend bundle was found, so this page stands in for the site viewer.
    The generated manifests are:</p>
    <ul>
    {% for file in manifests %}
      <li><a href="/{{ file }}"><code>{{ file }}</code></a></li>
    {% endfor %}
    </ul>
  </main>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn installs_bundle_and_replaces_assets() {
        let temp = tempdir().unwrap();
        let bundle_dir = temp.path().join("frontend");
        let out = temp.path().join("out");
        fs::create_dir_all(bundle_dir.join("assets")).unwrap();
        fs::write(bundle_dir.join(INDEX_FILE), "<div id=root></div>").unwrap();
        fs::write(bundle_dir.join("assets/app.js"), "console.log(1)").unwrap();
        fs::create_dir_all(out.join("assets")).unwrap();
        fs::write(out.join("assets/stale.js"), "old").unwrap();

        let bundle = FrontendBundle::new(&bundle_dir);
        assert!(bundle.exists());
        bundle.install(&out).unwrap();

        assert_eq!(
            fs::read_to_string(out.join(INDEX_FILE)).unwrap(),
            "<div id=root></div>"
        );
        assert!(out.join("assets/app.js").exists());
        assert!(!out.join("assets/stale.js").exists());
    }

    #[test]
    fn missing_bundle_does_not_exist() {
        let temp = tempdir().unwrap();

        assert!(!FrontendBundle::new(temp.path().join("nope")).exists());
    }

    #[test]
    fn copies_nested_trees() {
        let temp = tempdir().unwrap();
        let from = temp.path().join("docs");
        let to = temp.path().join("out/docs");
        fs::create_dir_all(from.join("guide/deep")).unwrap();
        fs::write(from.join("index.md"), "# Home").unwrap();
        fs::write(from.join("guide/deep/page.md"), "# Deep").unwrap();
        fs::create_dir_all(&to).unwrap();
        fs::write(to.join("removed.md"), "gone").unwrap();

        replace_dir(&from, &to, &[]).unwrap();

        assert_eq!(fs::read_to_string(to.join("index.md")).unwrap(), "# Home");
        assert!(to.join("guide/deep/page.md").exists());
        assert!(!to.join("removed.md").exists());
    }

    #[test]
    fn minifies_css() {
        let css = ":root {\n  --radius: 0.5rem;\n}\n\n.dark {\n  --background: 240 10% 3.9%;\n}";

        let minified = minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".dark"));
    }

    #[test]
    fn renders_placeholder_page() {
        let html = render_placeholder("My <Site>", Some("About"), true, false).unwrap();

        assert!(html.contains("<title>My &lt;Site&gt;</title>"));
        assert!(html.contains("<p>About</p>"));
        assert!(html.contains("docs-nav.json"));
        assert!(!html.contains("theme.css"));
    }

    #[test]
    fn skips_destination_nested_in_source() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("aiui");
        fs::write(temp.path().join("README.md"), "# Home").unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("ui-config.json"), "{}").unwrap();

        replace_dir(temp.path(), &out.join("docs"), &[&out]).unwrap();
        replace_dir(temp.path(), &out.join("docs"), &[&out]).unwrap();

        assert!(out.join("docs/README.md").is_file());
        assert!(!out.join("docs/aiui").exists());
    }
}

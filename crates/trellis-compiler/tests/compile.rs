use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::tempdir;

use trellis_compiler::compile;
use trellis_schema::Config;

const CONFIG: &str = r#"
site:
  title: Test
content:
  docs:
    dir: ./docs
templates:
  docs:
    layout: Default
routes:
  - match: "/docs/**"
    template: docs
"#;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_site(root: &Path) -> Config {
    let docs = root.join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("index.md"), "---\ntitle: Home\n---\n# Welcome\n").unwrap();
    fs::write(docs.join("guide.md"), "# Guide\n\nHow to use it.\n").unwrap();
    fs::write(root.join("trellis.yaml"), CONFIG).unwrap();
    Config::from_path(&root.join("trellis.yaml")).unwrap()
}

#[test]
fn compiles_docs_site() {
    let temp = tempdir().unwrap();
    let config = write_site(temp.path());
    let out = temp.path().join("aiui");

    let result = compile(&config, temp.path(), &out, false).unwrap();

    assert!(result.success, "{:?}", result.error);
    assert!(result.files.contains(&"ui-config.json".to_string()));
    assert!(result.files.contains(&"docs-nav.json".to_string()));
    assert!(result.files.contains(&"route-manifest.json".to_string()));

    let routes = read_json(&out.join("route-manifest.json"));
    assert_eq!(
        routes,
        serde_json::json!({
            "routes": [{ "pattern": "/docs/**", "template": "docs", "priority": 1 }]
        })
    );

    let nav = read_json(&out.join("docs-nav.json"));
    assert_eq!(
        nav,
        serde_json::json!({
            "items": [
                { "title": "Guide", "path": "/docs/guide" },
                { "title": "Home", "path": "/docs/index" }
            ]
        })
    );

    let ui = read_json(&out.join("ui-config.json"));
    assert_eq!(ui["site"]["title"], "Test");
    assert_eq!(ui["templates"]["docs"], serde_json::json!({ "layout": "Default", "slots": {} }));
    assert!(out.join("docs/guide.md").exists());
}

#[test]
fn recompiling_is_byte_identical() {
    let temp = tempdir().unwrap();
    let config = write_site(temp.path());
    let out = temp.path().join("aiui");
    let manifests = ["ui-config.json", "docs-nav.json", "route-manifest.json"];

    for minify in [false, true] {
        compile(&config, temp.path(), &out, minify).unwrap();
        let first: Vec<Vec<u8>> = manifests
            .iter()
            .map(|name| fs::read(out.join(name)).unwrap())
            .collect();

        compile(&config, temp.path(), &out, minify).unwrap();
        let second: Vec<Vec<u8>> = manifests
            .iter()
            .map(|name| fs::read(out.join(name)).unwrap())
            .collect();

        assert_eq!(first, second);
    }
}

#[test]
fn missing_docs_dir_fails_validation() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("trellis.yaml"), CONFIG).unwrap();
    let config = Config::from_path(&temp.path().join("trellis.yaml")).unwrap();
    let out = temp.path().join("aiui");

    let result = compile(&config, temp.path(), &out, false).unwrap();

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Validation failed: Docs directory './docs' not found")
    );
    assert!(!out.exists());
}

#[test]
fn docs_dir_containing_output_compiles_repeatedly() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("README.md"), "# Home\n").unwrap();
    fs::write(temp.path().join("guide.md"), "# Guide\n").unwrap();
    let config = Config::from_yaml_str("site:\n  title: Test\ncontent:\n  docs:\n    dir: .\n")
        .unwrap();
    let out = temp.path().join("aiui");

    for _ in 0..2 {
        let result = compile(&config, temp.path(), &out, false).unwrap();
        assert!(result.success, "{:?}", result.error);

        let nav = read_json(&out.join("docs-nav.json"));
        let mut titles: Vec<&str> = nav["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["title"].as_str().unwrap())
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Guide", "Home"]);
    }

    assert!(out.join("docs/README.md").is_file());
    assert!(out.join("docs/guide.md").is_file());
    assert!(!out.join("docs/aiui").exists());
}

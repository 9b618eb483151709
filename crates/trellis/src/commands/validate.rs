//! Check a site configuration without compiling it.

use std::path::Path;

use anyhow::Result;
use trellis_compiler::PluginManager;
use trellis_schema::{validate, ValidationResult};

use crate::error::CliError;

/// Run the validate command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = super::load_config(config_path, &PluginManager::new())?;
    let result = validate(&config, &super::base_path(config_path));

    if result.valid {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    eprint!("{}", report(&result));
    Err(CliError::ValidationFailed(result.errors.len()).into())
}

/// One line per problem, each suggestion indented beneath its error.
pub fn report(result: &ValidationResult) -> String {
    let mut out = String::from("Configuration has errors:\n");
    for error in &result.errors {
        out.push_str(&format!("  [{}] {}\n", error.category, error.message));
        if let Some(suggestion) = &error.suggestion {
            out.push_str(&format!("    {}\n", suggestion));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const BROKEN: &str = r#"
site:
  title: Demo
templates:
  docs:
    layout: ThreeColumnLayout
    slots:
      header: { ref: header_mian }
components:
  header_main:
    type: Header
routes:
  - match: "/docs/**"
    template: doc
"#;

    #[test]
    fn reports_every_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("trellis.yaml");
        fs::write(&path, BROKEN).unwrap();

        let err = run(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ValidationFailed(2))
        ));
    }

    #[test]
    fn formats_categories_and_suggestions() {
        let config = trellis_schema::Config::from_yaml_str(BROKEN).unwrap();
        let result = validate(&config, Path::new("."));
        let report = report(&result);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Configuration has errors:");
        assert_eq!(
            lines[1],
            "  [validation] Component reference 'header_mian' not found"
        );
        assert_eq!(lines[2], "    Did you mean 'header_main'?");
        assert_eq!(
            lines[3],
            "  [validation] Template 'doc' not found in route '/docs/**'"
        );
        assert_eq!(lines[4], "    Did you mean 'docs'?");
    }

    #[test]
    fn accepts_valid_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("trellis.yaml");
        fs::write(&path, "site:\n  title: Demo\n").unwrap();

        run(&path).unwrap();
    }
}

//! Referential integrity checks for a loaded config.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::config::Config;

/// Numeric code identifying a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A template slot references a component that is not defined
    ComponentNotFound,
    /// A route references a template that is not defined
    TemplateNotFound,
    /// The docs content directory does not exist
    DocsDirNotFound,
    /// The blog content directory does not exist
    BlogDirNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::ComponentNotFound => 2001,
            Self::TemplateNotFound => 2002,
            Self::DocsDirNotFound => 3001,
            Self::BlogDirNotFound => 3002,
        }
    }

    /// Broad category the code belongs to.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ComponentNotFound | Self::TemplateNotFound => "validation",
            Self::DocsDirNotFound | Self::BlogDirNotFound => "scanner",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub category: &'static str,
    pub message: String,
    /// "Did you mean ...?" hint
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ValidationError {
    fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            category: code.category(),
            message,
            suggestion: None,
            file: None,
            line: None,
            column: None,
        }
    }

    fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Outcome of validating a config.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// All messages joined with `; `.
    pub fn joined_messages(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate `config`, resolving content directories against `base_path`.
///
/// Every check runs; all problems are collected before returning.
pub fn validate(config: &Config, base_path: &Path) -> ValidationResult {
    let mut errors = Vec::new();

    for template in config.templates.values() {
        for slot in template.slots.values().flatten() {
            let Some(reference) = &slot.reference else {
                continue;
            };
            if !config.components.contains_key(reference) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::ComponentNotFound,
                        format!("Component reference '{}' not found", reference),
                    )
                    .with_suggestion(find_similar(
                        reference,
                        config.components.keys().map(String::as_str),
                    )),
                );
            }
        }
    }

    for route in &config.routes {
        if !config.templates.contains_key(&route.template) {
            errors.push(
                ValidationError::new(
                    ErrorCode::TemplateNotFound,
                    format!(
                        "Template '{}' not found in route '{}'",
                        route.template, route.pattern
                    ),
                )
                .with_suggestion(find_similar(
                    &route.template,
                    config.templates.keys().map(String::as_str),
                )),
            );
        }
    }

    if let Some(docs) = config.docs() {
        if !base_path.join(&docs.dir).exists() {
            errors.push(ValidationError::new(
                ErrorCode::DocsDirNotFound,
                format!("Docs directory '{}' not found", docs.dir),
            ));
        }
    }

    if let Some(blog) = config.blog() {
        if !base_path.join(&blog.dir).exists() {
            errors.push(ValidationError::new(
                ErrorCode::BlogDirNotFound,
                format!("Blog directory '{}' not found", blog.dir),
            ));
        }
    }

    if errors.is_empty() {
        ValidationResult::success()
    } else {
        tracing::debug!("Validation found {} error(s)", errors.len());
        ValidationResult::failure(errors)
    }
}

/// First candidate sharing the target's three-character prefix, case-insensitively.
fn find_similar<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let prefix: String = target.to_lowercase().chars().take(3).collect();

    candidates
        .into_iter()
        .find(|candidate| candidate.to_lowercase().starts_with(&prefix))
        .map(|candidate| format!("Did you mean '{}'?", candidate))
}

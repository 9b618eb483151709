//! Frontmatter extraction and parsing.

use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// Raw front-matter of a Markdown file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    /// Parse the YAML text between the delimiters.
    ///
    /// An empty block yields empty front-matter; anything that is not a
    /// mapping is an error.
    pub fn parse(yaml: &str) -> Result<Self, FrontmatterError> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(mapping) => Ok(Self(mapping)),
            _ => Err(FrontmatterError::NotAMapping),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `title` field rendered as text, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        let title = match self.get("title")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!title.is_empty()).then_some(title)
    }

    /// The integer `order` field, if present.
    pub fn order(&self) -> Option<i64> {
        self.get("order").and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for Frontmatter {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Split a leading front-matter block from the document body.
///
/// The block opens with a line that is exactly `---` at the very start of the
/// file and closes at the next line that is exactly `---`. Returns the YAML
/// text and the remaining body, or `None` when the file has no block.
pub fn split_frontmatter(source: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let mut lines = source.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if strip_line_ending(first) != DELIMITER {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;

    for line in lines {
        if strip_line_ending(line) == DELIMITER {
            let yaml = &source[yaml_start..offset];
            let body = &source[offset + line.len()..];
            return Ok(Some((yaml, body)));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping")]
    NotAMapping,
}

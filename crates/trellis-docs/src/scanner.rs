//! Docs directory scanning.
//!
//! Walks a content directory, keeps Markdown files matching the include
//! patterns and not matching any exclude pattern, and turns each into a
//! [`DocPage`] with a slug, title and navigation order.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;
use walkdir::WalkDir;

use crate::frontmatter::{split_frontmatter, Frontmatter};

static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-").expect("valid number prefix pattern"));

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+").expect("valid leading digits pattern"));

/// A discovered documentation page.
#[derive(Debug, Clone, PartialEq)]
pub struct DocPage {
    /// File on disk
    pub path: PathBuf,

    /// URL slug relative to the docs route base
    pub slug: String,

    pub title: String,

    /// Navigation order (lower = first)
    pub order: i64,

    pub frontmatter: Frontmatter,
}

/// Scans a docs directory and discovers pages.
#[derive(Debug, Clone)]
pub struct DocsScanner {
    docs_dir: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    index_files: Vec<String>,
    skip_dirs: Vec<PathBuf>,
}

impl DocsScanner {
    /// Create a scanner with the default patterns.
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            include: vec!["**/*.md".to_string(), "**/*.mdx".to_string()],
            exclude: Vec::new(),
            index_files: vec!["index.md".to_string(), "README.md".to_string()],
            skip_dirs: Vec::new(),
        }
    }

    /// Replace the include patterns. An empty list keeps the defaults.
    pub fn include(mut self, patterns: &[String]) -> Self {
        if !patterns.is_empty() {
            self.include = patterns.to_vec();
        }
        self
    }

    pub fn exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = patterns.to_vec();
        self
    }

    /// Replace the index file names. An empty list keeps the defaults.
    pub fn index_files(mut self, names: &[String]) -> Self {
        if !names.is_empty() {
            self.index_files = names.to_vec();
        }
        self
    }

    /// Never descend into `dir`, e.g. a build output inside the docs tree.
    pub fn skip_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.skip_dirs.push(dir.into());
        self
    }

    /// Scan the docs directory.
    ///
    /// A missing directory yields no pages. Pages are ordered by parent
    /// directory, then order, then file name.
    pub fn scan(&self) -> Vec<DocPage> {
        if !self.docs_dir.is_dir() {
            tracing::debug!("Docs directory {} not found", self.docs_dir.display());
            return Vec::new();
        }

        let include = build_glob_set(&self.include, true);
        let exclude = build_glob_set(&self.exclude, false);

        let skip: Vec<PathBuf> = self
            .skip_dirs
            .iter()
            .filter_map(|dir| fs::canonicalize(dir).ok())
            .collect();

        let mut seen = HashSet::new();
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.docs_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && !skip.is_empty()
                    && fs::canonicalize(entry.path()).is_ok_and(|path| skip.contains(&path)))
            })
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.docs_dir) else {
                continue;
            };
            let relative_str = to_slash(relative);

            if !include.is_match(&relative_str) {
                continue;
            }

            if is_excluded(&exclude, &relative_str, path) {
                tracing::debug!("Excluded {}", relative_str);
                continue;
            }

            // Overlapping patterns or symlinks can reach the same file twice
            let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if !seen.insert(key) {
                continue;
            }

            if let Some(page) = self.parse_page(path, relative) {
                pages.push(page);
            }
        }

        pages.sort_by(|a, b| {
            a.path
                .parent()
                .cmp(&b.path.parent())
                .then(a.order.cmp(&b.order))
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });

        tracing::debug!(
            "Discovered {} page(s) in {}",
            pages.len(),
            self.docs_dir.display()
        );

        pages
    }

    /// Read a file and extract its metadata.
    fn parse_page(&self, path: &Path, relative: &Path) -> Option<DocPage> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                return None;
            }
        };

        let (frontmatter, body) = match split_frontmatter(&content) {
            Ok(Some((yaml, body))) => {
                let frontmatter = Frontmatter::parse(yaml).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring frontmatter in {}: {}", path.display(), e);
                    Frontmatter::default()
                });
                (frontmatter, body)
            }
            Ok(None) => (Frontmatter::default(), content.as_str()),
            Err(e) => {
                tracing::warn!("Ignoring frontmatter in {}: {}", path.display(), e);
                (Frontmatter::default(), content.as_str())
            }
        };

        let slug = self.path_to_slug(relative);

        let title = frontmatter
            .title()
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| slug.clone());

        let order = frontmatter
            .order()
            .filter(|order| *order != 0)
            .or_else(|| filename_order(path))
            .unwrap_or(0);

        Some(DocPage {
            path: path.to_path_buf(),
            slug,
            title,
            order,
            frontmatter,
        })
    }

    /// Convert a path relative to the docs directory into a URL slug.
    fn path_to_slug(&self, relative: &Path) -> String {
        let mut parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if let Some(last) = parts.last_mut() {
            let stem = Path::new(last.as_str())
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned());
            if let Some(stem) = stem {
                *last = stem;
            }
        }

        if parts.last().is_some_and(|last| self.is_index_name(last)) {
            parts.pop();
        }

        let slug = parts
            .iter()
            .map(|part| NUMBER_PREFIX.replace(part, "").into_owned())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        if slug.is_empty() {
            "index".to_string()
        } else {
            slug
        }
    }

    /// Whether a file stem names a directory index page.
    fn is_index_name(&self, stem: &str) -> bool {
        let stem = stem.to_lowercase();
        if stem == "index" || stem == "readme" {
            return true;
        }
        self.index_files.iter().any(|name| {
            Path::new(name)
                .file_stem()
                .is_some_and(|s| s.to_string_lossy().to_lowercase() == stem)
        })
    }
}

/// Scan `docs_dir` with explicit patterns.
pub fn scan(
    docs_dir: &Path,
    include: &[String],
    exclude: &[String],
    index_files: &[String],
) -> Vec<DocPage> {
    DocsScanner::new(docs_dir)
        .include(include)
        .exclude(exclude)
        .index_files(index_files)
        .scan()
}

/// Build a `GlobSet`, skipping patterns that fail to compile.
///
/// Include patterns use path semantics (`*` stays within one segment);
/// exclude patterns follow shell `fnmatch`, where `*` also crosses `/`.
fn build_glob_set(patterns: &[String], literal_separator: bool) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match GlobBuilder::new(pattern)
            .literal_separator(literal_separator)
            .build()
        {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!("Ignoring invalid glob pattern '{}': {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// A file is excluded if its relative path or bare name matches.
fn is_excluded(exclude: &GlobSet, relative: &str, path: &Path) -> bool {
    if exclude.is_empty() {
        return false;
    }
    exclude.is_match(relative)
        || path
            .file_name()
            .is_some_and(|name| exclude.is_match(Path::new(name)))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Leading digits of the file stem, e.g. `01-intro.md` -> 1.
fn filename_order(path: &Path) -> Option<i64> {
    let stem = path.file_stem()?.to_str()?;
    LEADING_DIGITS.find(stem)?.as_str().parse().ok()
}

/// Text of the first level-one ATX heading (`# Title`, up to three spaces of
/// indentation allowed). Setext headings are not titles.
fn first_heading(body: &str) -> Option<String> {
    let mut current: Option<String> = None;

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if body[range.clone()].trim_start().starts_with('#') => {
                current = Some(String::new());
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current.take() {
                    let heading = heading.trim();
                    if !heading.is_empty() {
                        return Some(heading.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    None
}

//! Docs discovery and navigation for trellis.
//!
//! This crate walks a content directory, extracts YAML front-matter and
//! titles from Markdown files, derives URL slugs and ordering, and folds the
//! discovered pages into a navigation tree.

pub mod frontmatter;
pub mod nav;
pub mod scanner;

pub use frontmatter::{split_frontmatter, Frontmatter, FrontmatterError};
pub use nav::{build_nav, NavBuilder, NavItem, NavTree};
pub use scanner::{scan, DocPage, DocsScanner};

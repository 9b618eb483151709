//! Preview server and file watching for trellis sites.
//!
//! Serves a compiled output directory as a single-page app and recompiles
//! when source files change.

pub mod server;
pub mod watcher;

pub use server::{find_available_port, spa_router, ServerError, StaticServer, StaticServerConfig};
pub use watcher::{rebuild_on_change, FileWatcher, RebuildFn, WatchEvent};

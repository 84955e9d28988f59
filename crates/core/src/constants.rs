//! Constants used throughout the export core crate.
//!
//! Defaults for startup configuration and the fixed strings emitted by the document engine
//! live here so that the REST and CLI front ends agree on them.

/// Default directory for node storage when no explicit directory is configured.
pub const DEFAULT_NODE_DATA_DIR: &str = "node_data";

/// File extension of node files read by the filesystem node store.
pub const NODE_FILE_EXTENSION: &str = "yaml";

/// Default maximum length in bytes of a resolved export file name (extension included).
pub const DEFAULT_MAX_FILE_NAME_LEN: usize = 200;

/// Maximum subtree depth the document engine will walk before giving up.
pub const MAX_EXPORT_DEPTH: usize = 64;

/// Heading emitted above the generated table of contents.
pub const TOC_HEADING: &str = "## Table of Contents";

/// Separator emitted between nodes when a divider line is requested.
pub const DIVIDER_LINE: &str = "---";

/// Deepest ATX heading level markdown supports.
pub const MAX_HEADING_LEVEL: usize = 6;

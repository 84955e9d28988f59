//! Content nodes and where they are read from.
//!
//! A node is the unit of content an export starts from. Each node holds markdown content and an
//! ordered list of child node ids; exporting a node exports its whole subtree.
//!
//! ## Storage Layout
//!
//! [`FsNodeStore`] reads one YAML file per node from a flat directory:
//!
//! ```text
//! node_data/
//!   intro.yaml
//!   chapter-1.yaml
//!   chapter-2.yaml
//! ```
//!
//! ```yaml
//! id: intro
//! owner: alice
//! content: |
//!   # Introduction
//!   Some text.
//! children: [chapter-1, chapter-2]
//! ```

use crate::constants::NODE_FILE_EXTENSION;
use crate::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A single content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<String>,
}

impl Node {
    /// Creates a leaf node with no owner.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: None,
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

/// Source of nodes for the document engine.
pub trait NodeStore: Send + Sync {
    /// Looks up a node by id.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NodeNotFound` if no node has this id, an I/O or decoding error
    /// if the node exists but cannot be read, and `ExportError::RenderError` if the stored node
    /// is inconsistent with its id.
    fn node(&self, id: &str) -> ExportResult<Node>;
}

/// Returns true if `id` is safe to use as a file stem.
fn is_valid_node_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
}

/// Reads nodes from `<dir>/<id>.yaml`.
#[derive(Debug, Clone)]
pub struct FsNodeStore {
    dir: PathBuf,
}

impl FsNodeStore {
    /// Creates a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidInput` if `dir` is not an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> ExportResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ExportError::InvalidInput(format!(
                "node data directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn node_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, NODE_FILE_EXTENSION))
    }
}

impl NodeStore for FsNodeStore {
    fn node(&self, id: &str) -> ExportResult<Node> {
        // Ids become file names, so anything that could escape the directory is simply unknown.
        if !is_valid_node_id(id) {
            return Err(ExportError::NodeNotFound(id.to_string()));
        }

        let path = self.node_path(id);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExportError::NodeNotFound(id.to_string()));
            }
            Err(e) => return Err(ExportError::FileRead(e)),
        };

        let node: Node =
            serde_yaml::from_str(&contents).map_err(ExportError::YamlDeserialization)?;
        if node.id != id {
            tracing::warn!(
                "node file {} declares id '{}', expected '{}'",
                path.display(),
                node.id,
                id
            );
            return Err(ExportError::RenderError(format!(
                "node file for '{}' declares a different id '{}'",
                id, node.id
            )));
        }

        Ok(node)
    }
}

/// In-memory node store.
#[derive(Debug, Clone, Default)]
pub struct MemoryNodeStore {
    nodes: HashMap<String, Node>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a node, keyed by its id.
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }
}

impl FromIterator<Node> for MemoryNodeStore {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut store = Self::new();
        for node in iter {
            store.insert(node);
        }
        store
    }
}

impl NodeStore for MemoryNodeStore {
    fn node(&self, id: &str) -> ExportResult<Node> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| ExportError::NodeNotFound(id.to_string()))
    }
}

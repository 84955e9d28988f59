//! Reference export engine.
//!
//! [`DocumentEngine`] exports a node together with its whole subtree as Markdown, HTML or a JSON
//! tree. Nodes are visited depth-first in the order their parents list them. A node reachable
//! twice (including through a cycle) is exported once, at its first position. Child ids that do
//! not resolve are skipped with a warning; only the root node is required to exist.

use crate::constants::{DIVIDER_LINE, MAX_EXPORT_DEPTH};
use crate::engine::{ExportEngine, ExportPlan, RenderFlags};
use crate::extension::ExportExtension;
use crate::markdown::{
    number_figures, shift_headings, strip_comments, table_of_contents, to_html,
};
use crate::node::NodeStore;
use crate::{ExportError, ExportResult};
use serde::Serialize;
use std::collections::HashSet;

const SUPPORTED: [ExportExtension; 3] = [
    ExportExtension::Md,
    ExportExtension::Html,
    ExportExtension::Json,
];

/// A node after content transforms, with its rendered children.
#[derive(Debug, Serialize)]
struct RenderedNode {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    content: String,
    children: Vec<RenderedNode>,
}

/// Walk state shared across one export.
struct Walk<'a> {
    flags: RenderFlags,
    visited: HashSet<String>,
    figures: usize,
    store: &'a dyn NodeStore,
}

impl Walk<'_> {
    fn visit(&mut self, id: &str, depth: usize) -> ExportResult<RenderedNode> {
        if depth > MAX_EXPORT_DEPTH {
            return Err(ExportError::RenderError(format!(
                "node tree exceeds maximum depth of {}",
                MAX_EXPORT_DEPTH
            )));
        }

        let node = self.store.node(id)?;
        self.visited.insert(node.id.clone());

        let mut content = node.content;
        if !self.flags.include_meta_comments {
            content = strip_comments(&content);
        }
        if self.flags.update_headings {
            content = shift_headings(&content, depth);
        }
        if self.flags.numbered_figures {
            content = number_figures(&content, &mut self.figures);
        }

        let mut children = Vec::new();
        for child_id in &node.children {
            if self.visited.contains(child_id) {
                tracing::debug!("skipping already exported node {}", child_id);
                continue;
            }
            match self.visit(child_id, depth + 1) {
                Ok(child) => children.push(child),
                Err(ExportError::NodeNotFound(missing)) => {
                    tracing::warn!("node {} lists missing child {}", node.id, missing);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(RenderedNode {
            id: node.id,
            owner: if self.flags.include_owners {
                node.owner
            } else {
                None
            },
            content: content.trim_end().to_string(),
            children,
        })
    }
}

/// Renders exports from nodes held in a [`NodeStore`].
#[derive(Debug, Clone)]
pub struct DocumentEngine<S> {
    store: S,
}

impl<S: NodeStore> DocumentEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn render_tree(&self, plan: &ExportPlan) -> ExportResult<RenderedNode> {
        let mut walk = Walk {
            flags: plan.flags(),
            visited: HashSet::new(),
            figures: 0,
            store: &self.store,
        };
        walk.visit(plan.node_id().as_str(), 0)
    }

    /// Renders the plan's subtree as one markdown document.
    pub fn render_markdown(&self, plan: &ExportPlan) -> ExportResult<String> {
        let flags = plan.flags();
        let root = self.render_tree(plan)?;

        let mut sections = Vec::new();
        flatten(&root, flags, &mut sections);

        let separator = if flags.divider_line {
            format!("\n\n{}\n\n", DIVIDER_LINE)
        } else {
            "\n\n".to_string()
        };
        let mut document = sections.join(&separator);

        if flags.include_toc {
            let toc = table_of_contents(&document);
            document = format!("{}\n{}", toc, document);
        }

        document.push('\n');
        Ok(document)
    }

    fn render_json(&self, plan: &ExportPlan) -> ExportResult<Vec<u8>> {
        let root = self.render_tree(plan)?;
        serde_json::to_vec_pretty(&root).map_err(ExportError::Serialization)
    }
}

/// Collects the markdown section of each node in pre-order.
fn flatten(node: &RenderedNode, flags: RenderFlags, out: &mut Vec<String>) {
    let mut section = String::new();
    if flags.include_ids {
        section.push_str(&format!("**ID:** {}\n", node.id));
    }
    if let Some(owner) = &node.owner {
        section.push_str(&format!("**Owner:** {}\n", owner));
    }
    if !section.is_empty() && !node.content.is_empty() {
        section.push('\n');
    }
    section.push_str(&node.content);

    if !section.trim().is_empty() {
        out.push(section.trim_end().to_string());
    }
    for child in &node.children {
        flatten(child, flags, out);
    }
}

impl<S: NodeStore> ExportEngine for DocumentEngine<S> {
    fn supported_extensions(&self) -> &[ExportExtension] {
        &SUPPORTED
    }

    fn render(&self, plan: &ExportPlan) -> ExportResult<Vec<u8>> {
        match plan.extension() {
            ExportExtension::Md => Ok(self.render_markdown(plan)?.into_bytes()),
            ExportExtension::Html => {
                let markdown = self.render_markdown(plan)?;
                Ok(to_html(&markdown, plan.node_id().as_str(), plan.content_width()).into_bytes())
            }
            ExportExtension::Json => self.render_json(plan),
            other => Err(ExportError::RenderError(format!(
                "document engine cannot produce {}",
                other
            ))),
        }
    }
}

//! The export engine seam.
//!
//! An [`ExportEngine`] turns a validated [`ExportPlan`] into file bytes. The service validates
//! and resolves the request before an engine sees it, so engines can rely on the plan's node id
//! being non-empty and its extension being one they declared support for.

use crate::extension::ExportExtension;
use crate::options::ExportOptions;
use crate::validation::ContentWidth;
use crate::ExportResult;
use export_types::NonEmptyText;

/// Layout switches copied from the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderFlags {
    pub include_toc: bool,
    pub include_meta_comments: bool,
    pub include_ids: bool,
    pub include_owners: bool,
    pub divider_line: bool,
    pub update_headings: bool,
    pub thread_as_pdf: bool,
    pub numbered_figures: bool,
}

impl From<&ExportOptions> for RenderFlags {
    fn from(options: &ExportOptions) -> Self {
        Self {
            include_toc: options.include_toc(),
            include_meta_comments: options.include_meta_comments(),
            include_ids: options.include_ids(),
            include_owners: options.include_owners(),
            divider_line: options.divider_line(),
            update_headings: options.update_headings(),
            thread_as_pdf: options.thread_as_pdf(),
            numbered_figures: options.numbered_figures(),
        }
    }
}

/// A validated export request, ready for an engine.
///
/// Only [`crate::ExportService::plan`] creates these.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    node_id: NonEmptyText,
    extension: ExportExtension,
    file_name: String,
    content_type: String,
    content_width: Option<ContentWidth>,
    flags: RenderFlags,
}

impl ExportPlan {
    pub(crate) fn new(
        node_id: NonEmptyText,
        extension: ExportExtension,
        file_name: String,
        content_type: String,
        content_width: Option<ContentWidth>,
        flags: RenderFlags,
    ) -> Self {
        Self {
            node_id,
            extension,
            file_name,
            content_type,
            content_width,
            flags,
        }
    }

    pub fn node_id(&self) -> &NonEmptyText {
        &self.node_id
    }

    pub fn extension(&self) -> ExportExtension {
        self.extension
    }

    /// Resolved file name, extension included.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Resolved response content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_width(&self) -> Option<&ContentWidth> {
        self.content_width.as_ref()
    }

    pub fn flags(&self) -> RenderFlags {
        self.flags
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Renders validated export plans.
pub trait ExportEngine: Send + Sync {
    /// Extensions this engine can produce.
    fn supported_extensions(&self) -> &[ExportExtension];

    /// Renders the plan into file bytes.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NodeNotFound` if the plan's node does not resolve, and
    /// `ExportError::RenderError` if rendering fails.
    fn render(&self, plan: &ExportPlan) -> ExportResult<Vec<u8>>;
}

//! Export request options.
//!
//! [`ExportOptions`] is the immutable record describing one requested export: which node, in
//! which format, and how it should be laid out. It carries values only. Constructing one never
//! fails; checking that the node id is present or that the extension is recognised happens in
//! [`crate::ExportService::plan`] when the options cross into the engine.
//!
//! The serialised form uses the request payload's field names (`nodeId`, `exportExt`,
//! `includeToc`, `includeIDs`, `threadAsPDF`, ...) and every field defaults when absent, so a
//! payload can be read straight into this type and written back out unchanged.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes a string field that may be `null`, treating `null` as empty.
///
/// Clients built around nullable string fields send `"fileName": null` for "unset".
pub fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One requested document export.
///
/// String fields use the empty string for "unset" and booleans default to `false`.
///
/// ```
/// use export_core::ExportOptions;
///
/// let options = ExportOptions::builder("n1", "pdf").include_toc(true).build();
/// assert_eq!(options.node_id(), "n1");
/// assert_eq!(options.export_ext(), "pdf");
/// assert!(options.include_toc());
/// assert!(!options.include_ids());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    #[serde(deserialize_with = "string_or_null")]
    node_id: String,
    #[serde(deserialize_with = "string_or_null")]
    export_ext: String,
    #[serde(deserialize_with = "string_or_null")]
    file_name: String,
    include_toc: bool,
    include_meta_comments: bool,
    #[serde(deserialize_with = "string_or_null")]
    content_type: String,
    #[serde(rename = "includeIDs")]
    include_ids: bool,
    divider_line: bool,
    update_headings: bool,
    #[serde(rename = "threadAsPDF")]
    thread_as_pdf: bool,
    include_owners: bool,
    numbered_figures: bool,
    #[serde(deserialize_with = "string_or_null")]
    content_width: String,
}

impl ExportOptions {
    /// Starts building options for the given node and extension.
    pub fn builder(
        node_id: impl Into<String>,
        export_ext: impl Into<String>,
    ) -> ExportOptionsBuilder {
        ExportOptionsBuilder {
            inner: ExportOptions {
                node_id: node_id.into(),
                export_ext: export_ext.into(),
                ..ExportOptions::default()
            },
        }
    }

    /// Returns a builder seeded with a copy of these options.
    pub fn to_builder(&self) -> ExportOptionsBuilder {
        ExportOptionsBuilder {
            inner: self.clone(),
        }
    }

    /// Identifier of the content node to export.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Requested output extension, exactly as supplied.
    pub fn export_ext(&self) -> &str {
        &self.export_ext
    }

    /// Desired output file base name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn include_toc(&self) -> bool {
        self.include_toc
    }

    pub fn include_meta_comments(&self) -> bool {
        self.include_meta_comments
    }

    pub fn include_ids(&self) -> bool {
        self.include_ids
    }

    pub fn include_owners(&self) -> bool {
        self.include_owners
    }

    pub fn divider_line(&self) -> bool {
        self.divider_line
    }

    pub fn update_headings(&self) -> bool {
        self.update_headings
    }

    pub fn thread_as_pdf(&self) -> bool {
        self.thread_as_pdf
    }

    pub fn numbered_figures(&self) -> bool {
        self.numbered_figures
    }

    /// Content type hint for the response.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Layout width hint, e.g. `"800px"`.
    pub fn content_width(&self) -> &str {
        &self.content_width
    }
}

/// Builder for [`ExportOptions`].
///
/// Each setter replaces any earlier value for the same field.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExportOptionsBuilder {
    inner: ExportOptions,
}

impl ExportOptionsBuilder {
    pub fn node_id(mut self, value: impl Into<String>) -> Self {
        self.inner.node_id = value.into();
        self
    }

    pub fn export_ext(mut self, value: impl Into<String>) -> Self {
        self.inner.export_ext = value.into();
        self
    }

    pub fn file_name(mut self, value: impl Into<String>) -> Self {
        self.inner.file_name = value.into();
        self
    }

    pub fn include_toc(mut self, value: bool) -> Self {
        self.inner.include_toc = value;
        self
    }

    pub fn include_meta_comments(mut self, value: bool) -> Self {
        self.inner.include_meta_comments = value;
        self
    }

    pub fn include_ids(mut self, value: bool) -> Self {
        self.inner.include_ids = value;
        self
    }

    pub fn include_owners(mut self, value: bool) -> Self {
        self.inner.include_owners = value;
        self
    }

    pub fn divider_line(mut self, value: bool) -> Self {
        self.inner.divider_line = value;
        self
    }

    pub fn update_headings(mut self, value: bool) -> Self {
        self.inner.update_headings = value;
        self
    }

    pub fn thread_as_pdf(mut self, value: bool) -> Self {
        self.inner.thread_as_pdf = value;
        self
    }

    pub fn numbered_figures(mut self, value: bool) -> Self {
        self.inner.numbered_figures = value;
        self
    }

    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.inner.content_type = value.into();
        self
    }

    pub fn content_width(mut self, value: impl Into<String>) -> Self {
        self.inner.content_width = value.into();
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> ExportOptions {
        self.inner
    }
}

//! Wire messages for the export API.
//!
//! Field names follow the JSON payloads clients already send (`nodeId`, `exportExt`,
//! `includeIDs`, `threadAsPDF`, ...). Every request field is optional on the wire; missing
//! strings become empty and missing flags become `false`.

use export_core::options::string_or_null;
use export_core::{ExportExtension, ExportOptions, ExportPlan};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /export` and `POST /export/plan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportReq {
    /// Identifier of the content node to export
    #[serde(deserialize_with = "string_or_null")]
    pub node_id: String,
    /// Output file extension, selects the export format (e.g. `md`, `html`, `json`)
    #[serde(deserialize_with = "string_or_null")]
    pub export_ext: String,
    /// Desired output file base name; defaults to the node id
    #[serde(deserialize_with = "string_or_null")]
    pub file_name: String,
    pub include_toc: bool,
    pub include_meta_comments: bool,
    /// Response content type; defaults to the format's usual type
    #[serde(deserialize_with = "string_or_null")]
    pub content_type: String,
    #[serde(rename = "includeIDs")]
    pub include_ids: bool,
    pub divider_line: bool,
    pub update_headings: bool,
    #[serde(rename = "threadAsPDF")]
    pub thread_as_pdf: bool,
    pub include_owners: bool,
    pub numbered_figures: bool,
    /// Layout width such as `800px` or `75%`
    #[serde(deserialize_with = "string_or_null")]
    pub content_width: String,
}

impl From<ExportReq> for ExportOptions {
    fn from(req: ExportReq) -> Self {
        ExportOptions::builder(req.node_id, req.export_ext)
            .file_name(req.file_name)
            .include_toc(req.include_toc)
            .include_meta_comments(req.include_meta_comments)
            .content_type(req.content_type)
            .include_ids(req.include_ids)
            .divider_line(req.divider_line)
            .update_headings(req.update_headings)
            .thread_as_pdf(req.thread_as_pdf)
            .include_owners(req.include_owners)
            .numbered_figures(req.numbered_figures)
            .content_width(req.content_width)
            .build()
    }
}

impl From<&ExportOptions> for ExportReq {
    fn from(options: &ExportOptions) -> Self {
        Self {
            node_id: options.node_id().to_string(),
            export_ext: options.export_ext().to_string(),
            file_name: options.file_name().to_string(),
            include_toc: options.include_toc(),
            include_meta_comments: options.include_meta_comments(),
            content_type: options.content_type().to_string(),
            include_ids: options.include_ids(),
            divider_line: options.divider_line(),
            update_headings: options.update_headings(),
            thread_as_pdf: options.thread_as_pdf(),
            include_owners: options.include_owners(),
            numbered_figures: options.numbered_figures(),
            content_width: options.content_width().to_string(),
        }
    }
}

/// Resolved export plan, as returned by `POST /export/plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanRes {
    pub node_id: String,
    pub export_ext: String,
    pub file_name: String,
    pub content_type: String,
    /// Resolved layout width, empty when unset
    pub content_width: String,
}

impl From<&ExportPlan> for PlanRes {
    fn from(plan: &ExportPlan) -> Self {
        Self {
            node_id: plan.node_id().to_string(),
            export_ext: plan.extension().to_string(),
            file_name: plan.file_name().to_string(),
            content_type: plan.content_type().to_string(),
            content_width: plan
                .content_width()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// One available export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormatInfo {
    pub ext: String,
    pub content_type: String,
}

impl From<ExportExtension> for FormatInfo {
    fn from(ext: ExportExtension) -> Self {
        Self {
            ext: ext.as_str().to_string(),
            content_type: ext.default_content_type().to_string(),
        }
    }
}

/// Response body for `GET /export/formats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatsRes {
    pub formats: Vec<FormatInfo>,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Stable machine-readable code, e.g. `node_not_found`
    pub error: String,
    pub message: String,
}

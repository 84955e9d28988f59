//! Export service.
//!
//! [`ExportService`] is where an [`ExportOptions`] record crosses into an engine. It checks the
//! record's invariants, resolves defaults into an [`ExportPlan`], and hands the plan to the
//! configured [`ExportEngine`].
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations, no HTTP concerns. Request parsing and status
//! code mapping belong in `api-rest` and `api-shared`.

use crate::config::CoreConfig;
use crate::engine::{ExportEngine, ExportPlan, ExportedFile, RenderFlags};
use crate::extension::ExportExtension;
use crate::options::ExportOptions;
use crate::validation::{resolve_content_type, resolve_file_name, ContentWidth};
use crate::{ExportError, ExportResult};
use export_types::NonEmptyText;
use std::sync::Arc;

/// Validates export options and runs them through an engine.
#[derive(Clone)]
pub struct ExportService {
    cfg: Arc<CoreConfig>,
    engine: Arc<dyn ExportEngine>,
}

impl std::fmt::Debug for ExportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportService")
            .field("cfg", &self.cfg)
            .field("engine_extensions", &self.engine.supported_extensions())
            .finish()
    }
}

impl ExportService {
    /// Creates a new export service.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Core configuration (enabled extensions, limits, default width)
    /// * `engine` - Engine used to render validated plans
    pub fn new(cfg: Arc<CoreConfig>, engine: Arc<dyn ExportEngine>) -> Self {
        Self { cfg, engine }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Extensions that are both enabled and supported by the engine, in catalogue order.
    pub fn supported_extensions(&self) -> Vec<ExportExtension> {
        let engine_supported = self.engine.supported_extensions();
        ExportExtension::ALL
            .into_iter()
            .filter(|ext| self.cfg.is_enabled(*ext) && engine_supported.contains(ext))
            .collect()
    }

    /// Validates `options` and resolves them into an [`ExportPlan`].
    ///
    /// Checks run in this order: node id, extension (recognised, then enabled and supported),
    /// content width, content type, file name. An empty content width falls back to the
    /// configured default.
    ///
    /// # Errors
    ///
    /// - `ExportError::InvalidInput` if the node id is empty, or the width, content type or
    ///   file name is invalid.
    /// - `ExportError::InvalidExtension` if the extension is empty, unrecognised, disabled, or
    ///   not supported by the engine.
    pub fn plan(&self, options: &ExportOptions) -> ExportResult<ExportPlan> {
        let node_id = NonEmptyText::new(options.node_id())
            .map_err(|_| ExportError::InvalidInput("nodeId is required".into()))?;

        if options.export_ext().trim().is_empty() {
            return Err(ExportError::InvalidExtension(
                "exportExt is required".into(),
            ));
        }
        let extension = ExportExtension::parse(options.export_ext())?;
        if !self.supported_extensions().contains(&extension) {
            return Err(ExportError::InvalidExtension(format!(
                "{} is not available (available: {})",
                extension,
                self.supported_extensions()
                    .iter()
                    .map(ExportExtension::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let content_width = match ContentWidth::parse(options.content_width())? {
            Some(width) => Some(width),
            None => self.cfg.default_content_width().cloned(),
        };
        let content_type = resolve_content_type(options.content_type(), extension)?;
        let file_name = resolve_file_name(
            options.file_name(),
            node_id.as_str(),
            extension,
            self.cfg.max_file_name_len(),
        )?;

        Ok(ExportPlan::new(
            node_id,
            extension,
            file_name,
            content_type,
            content_width,
            RenderFlags::from(options),
        ))
    }

    /// Exports the node described by `options`.
    ///
    /// # Returns
    ///
    /// The rendered bytes with the resolved content type and file name.
    ///
    /// # Errors
    ///
    /// Any error from [`ExportService::plan`], plus `ExportError::NodeNotFound` or
    /// `ExportError::RenderError` from the engine.
    pub fn export(&self, options: &ExportOptions) -> ExportResult<ExportedFile> {
        tracing::debug!(
            node_id = options.node_id(),
            export_ext = options.export_ext(),
            "export requested"
        );

        let result = self
            .plan(options)
            .and_then(|plan| self.engine.render(&plan).map(|bytes| (plan, bytes)));

        match result {
            Ok((plan, bytes)) => {
                tracing::info!(
                    node_id = plan.node_id().as_str(),
                    extension = plan.extension().as_str(),
                    bytes = bytes.len(),
                    "export complete"
                );
                Ok(ExportedFile {
                    bytes,
                    content_type: plan.content_type().to_string(),
                    file_name: plan.file_name().to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(
                    node_id = options.node_id(),
                    export_ext = options.export_ext(),
                    "export failed: {}",
                    e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentEngine;
    use crate::node::{MemoryNodeStore, Node};
    use std::path::PathBuf;

    fn store() -> MemoryNodeStore {
        [
            Node::new("n1", "# One\nBody").with_children(["n2"]),
            Node::new("n2", "## Two"),
        ]
        .into_iter()
        .collect()
    }

    fn service_with(cfg: CoreConfig) -> ExportService {
        ExportService::new(Arc::new(cfg), Arc::new(DocumentEngine::new(store())))
    }

    fn service() -> ExportService {
        service_with(CoreConfig::with_defaults(PathBuf::from("unused")))
    }

    #[test]
    fn test_supported_extensions_intersects_config_and_engine() {
        assert_eq!(
            service().supported_extensions(),
            vec![
                ExportExtension::Md,
                ExportExtension::Html,
                ExportExtension::Json
            ]
        );

        let cfg = CoreConfig::new(
            PathBuf::from("unused"),
            vec![ExportExtension::Json, ExportExtension::Pdf],
            None,
            100,
        )
        .unwrap();
        assert_eq!(
            service_with(cfg).supported_extensions(),
            vec![ExportExtension::Json]
        );
    }

    #[test]
    fn test_plan_resolves_defaults() {
        let options = ExportOptions::builder("n1", "MD").build();
        let plan = service().plan(&options).unwrap();

        assert_eq!(plan.node_id().as_str(), "n1");
        assert_eq!(plan.extension(), ExportExtension::Md);
        assert_eq!(plan.file_name(), "n1.md");
        assert_eq!(plan.content_type(), "text/markdown");
        assert!(plan.content_width().is_none());
        assert_eq!(plan.flags(), RenderFlags::default());
    }

    #[test]
    fn test_plan_keeps_explicit_values() {
        let options = ExportOptions::builder(" n1 ", "html")
            .file_name("Guide")
            .content_type("text/html; charset=utf-8")
            .content_width("50rem")
            .include_toc(true)
            .thread_as_pdf(true)
            .build();
        let plan = service().plan(&options).unwrap();

        assert_eq!(plan.node_id().as_str(), "n1");
        assert_eq!(plan.file_name(), "Guide.html");
        assert_eq!(plan.content_type(), "text/html; charset=utf-8");
        assert_eq!(plan.content_width().unwrap().to_string(), "50rem");
        assert!(plan.flags().include_toc);
        assert!(plan.flags().thread_as_pdf);
    }

    #[test]
    fn test_plan_falls_back_to_default_width() {
        let cfg = CoreConfig::new(
            PathBuf::from("unused"),
            ExportExtension::ALL.to_vec(),
            ContentWidth::parse("70%").unwrap(),
            100,
        )
        .unwrap();
        let svc = service_with(cfg);

        let plan = svc
            .plan(&ExportOptions::builder("n1", "html").build())
            .unwrap();
        assert_eq!(plan.content_width().unwrap().to_string(), "70%");

        let plan = svc
            .plan(
                &ExportOptions::builder("n1", "html")
                    .content_width("300px")
                    .build(),
            )
            .unwrap();
        assert_eq!(plan.content_width().unwrap().to_string(), "300px");
    }

    #[test]
    fn test_plan_requires_node_id() {
        let err = service()
            .plan(&ExportOptions::builder("  ", "md").build())
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput(_)));

        let err = service().plan(&ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput(_)));
    }

    #[test]
    fn test_plan_rejects_bad_extensions() {
        for ext in ["", "docx", "pdf", "zip"] {
            let err = service()
                .plan(&ExportOptions::builder("n1", ext).build())
                .unwrap_err();
            assert!(
                matches!(err, ExportError::InvalidExtension(_)),
                "expected InvalidExtension for {ext:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_plan_rejects_disabled_extension() {
        let cfg = CoreConfig::new(PathBuf::from("unused"), vec![ExportExtension::Md], None, 100)
            .unwrap();
        let err = service_with(cfg)
            .plan(&ExportOptions::builder("n1", "json").build())
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidExtension(msg) if msg.contains("available: md")));
    }

    #[test]
    fn test_plan_rejects_bad_width_type_and_name() {
        let svc = service();
        for options in [
            ExportOptions::builder("n1", "md").content_width("wide").build(),
            ExportOptions::builder("n1", "md").content_type("markdown").build(),
            ExportOptions::builder("n1", "md").file_name(".hidden").build(),
        ] {
            assert!(matches!(
                svc.plan(&options),
                Err(ExportError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_export_returns_bytes_type_and_name() {
        let options = ExportOptions::builder("n1", "md")
            .file_name("out")
            .divider_line(true)
            .build();
        let file = service().export(&options).unwrap();

        assert_eq!(file.file_name, "out.md");
        assert_eq!(file.content_type, "text/markdown");
        assert_eq!(
            String::from_utf8(file.bytes).unwrap(),
            "# One\nBody\n\n---\n\n## Two\n"
        );
    }

    #[test]
    fn test_export_missing_node() {
        let err = service()
            .export(&ExportOptions::builder("ghost", "md").build())
            .unwrap_err();
        assert!(matches!(err, ExportError::NodeNotFound(id) if id == "ghost"));
    }
}

//! # Export Core
//!
//! Core logic for exporting content nodes as documents.
//!
//! This crate contains:
//! - [`ExportOptions`], the immutable record describing one export request
//! - the recognised output formats ([`ExportExtension`]) and input validation
//! - [`ExportService`], which validates options and drives an [`ExportEngine`]
//! - [`DocumentEngine`], a reference engine rendering Markdown, HTML and JSON from a
//!   [`NodeStore`]
//!
//! **No API concerns**: HTTP servers, request DTOs and status codes belong in `api-rest` or
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod document;
pub mod engine;
pub mod error;
pub mod extension;
pub mod markdown;
pub mod node;
pub mod options;
pub mod service;
pub mod validation;

pub use config::CoreConfig;
pub use constants::DEFAULT_NODE_DATA_DIR;
pub use document::DocumentEngine;
pub use engine::{ExportEngine, ExportPlan, ExportedFile, RenderFlags};
pub use error::{ExportError, ExportResult};
pub use extension::ExportExtension;
pub use node::{FsNodeStore, MemoryNodeStore, Node, NodeStore};
pub use options::{ExportOptions, ExportOptionsBuilder};
pub use service::ExportService;
pub use validation::ContentWidth;

pub use export_types::NonEmptyText;

//! Recognised export file extensions.
//!
//! The `exportExt` field of an export request selects the output format. Only the values in
//! [`ExportExtension::ALL`] are recognised; whether a recognised extension can actually be
//! produced depends on configuration and on the engine in use.

use crate::{ExportError, ExportResult};
use std::fmt;
use std::str::FromStr;

/// Output formats an export may be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExportExtension {
    Md,
    Html,
    Pdf,
    Json,
    Zip,
    Tar,
    TarGz,
}

impl ExportExtension {
    /// Every recognised extension, in a stable order.
    pub const ALL: [ExportExtension; 7] = [
        ExportExtension::Md,
        ExportExtension::Html,
        ExportExtension::Pdf,
        ExportExtension::Json,
        ExportExtension::Zip,
        ExportExtension::Tar,
        ExportExtension::TarGz,
    ];

    /// Parses an extension string.
    ///
    /// Matching is case-insensitive and a single leading `.` is ignored, so `"MD"`, `".md"` and
    /// `"md"` all resolve to [`ExportExtension::Md`].
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidExtension` if the value is empty or not recognised.
    pub fn parse(value: &str) -> ExportResult<Self> {
        let trimmed = value.trim();
        let normalised = trimmed
            .strip_prefix('.')
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|ext| ext.as_str() == normalised)
            .ok_or_else(|| ExportError::InvalidExtension(trimmed.to_string()))
    }

    /// The canonical file extension, without a leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportExtension::Md => "md",
            ExportExtension::Html => "html",
            ExportExtension::Pdf => "pdf",
            ExportExtension::Json => "json",
            ExportExtension::Zip => "zip",
            ExportExtension::Tar => "tar",
            ExportExtension::TarGz => "tar.gz",
        }
    }

    /// The content type used when the request does not supply one.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            ExportExtension::Md => "text/markdown",
            ExportExtension::Html => "text/html",
            ExportExtension::Pdf => "application/pdf",
            ExportExtension::Json => "application/json",
            ExportExtension::Zip => "application/zip",
            ExportExtension::Tar => "application/x-tar",
            ExportExtension::TarGz => "application/gzip",
        }
    }
}

impl fmt::Display for ExportExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportExtension {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExportExtension {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExportExtension> for String {
    fn from(ext: ExportExtension) -> Self {
        ext.as_str().to_string()
    }
}

/// Parses a comma-separated list of extensions, dropping duplicates while keeping order.
///
/// Blank entries are ignored, so `"md, ,html,"` yields `[Md, Html]`.
///
/// # Errors
///
/// Returns `ExportError::InvalidExtension` for the first unrecognised entry.
pub fn parse_extension_list(value: &str) -> ExportResult<Vec<ExportExtension>> {
    let mut out = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let ext = ExportExtension::parse(part)?;
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    Ok(out)
}

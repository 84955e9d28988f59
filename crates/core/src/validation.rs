//! Input validation utilities.
//!
//! This module contains the checks applied to the free-form string fields of an export request
//! (width, content type, file name) before they are handed to an engine.

use crate::extension::ExportExtension;
use crate::{ExportError, ExportResult};
use std::fmt;

/// Units accepted in a content width.
const WIDTH_UNITS: [&str; 10] = ["px", "rem", "em", "%", "vw", "ch", "in", "cm", "mm", "pt"];

/// A parsed layout width such as `800px` or `75%`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentWidth {
    value: f64,
    unit: &'static str,
}

impl ContentWidth {
    /// Parses a CSS-style dimension.
    ///
    /// An empty (or whitespace-only) input means "unset" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidInput` if the value is not a positive number followed by a
    /// supported unit, or if a percentage exceeds 100.
    pub fn parse(input: &str) -> ExportResult<Option<Self>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        // `rem` is listed before `em` so the longer suffix wins.
        let unit = WIDTH_UNITS
            .into_iter()
            .find(|u| trimmed.ends_with(u))
            .ok_or_else(|| {
                ExportError::InvalidInput(format!(
                    "content width '{}' must end with one of: {}",
                    trimmed,
                    WIDTH_UNITS.join(", ")
                ))
            })?;

        let number = &trimmed[..trimmed.len() - unit.len()];
        let well_formed = !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && number.bytes().filter(|b| *b == b'.').count() <= 1;
        let value = well_formed
            .then(|| number.parse::<f64>().ok())
            .flatten()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| {
                ExportError::InvalidInput(format!(
                    "content width '{}' must start with a positive number",
                    trimmed
                ))
            })?;

        if unit == "%" && value > 100.0 {
            return Err(ExportError::InvalidInput(format!(
                "content width '{}' exceeds 100%",
                trimmed
            )));
        }

        Ok(Some(Self { value, unit }))
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }
}

impl fmt::Display for ContentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Resolves the file name an export is delivered under.
///
/// - An empty name falls back to `node_id`.
/// - Any directory components are dropped (`a/b/c` → `c`).
/// - A trailing `.<ext>` matching the requested extension is removed so it is not doubled.
/// - Characters outside `[A-Za-z0-9._ -]` are replaced with `_`.
/// - The extension is appended.
///
/// # Errors
///
/// Returns `ExportError::InvalidInput` if the sanitised name is empty, starts with `.`, or the
/// final name is longer than `max_len` bytes.
pub fn resolve_file_name(
    requested: &str,
    node_id: &str,
    extension: ExportExtension,
    max_len: usize,
) -> ExportResult<String> {
    let requested = requested.trim();
    let base = if requested.is_empty() {
        node_id
    } else {
        requested
    };

    let base = base.rsplit(['/', '\\']).next().unwrap_or(base);
    let suffix = format!(".{}", extension.as_str());
    let base = if base.len() > suffix.len()
        && base.to_ascii_lowercase().ends_with(&suffix)
    {
        &base[..base.len() - suffix.len()]
    } else {
        base
    };

    let sanitised: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ' ' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitised.is_empty() {
        return Err(ExportError::InvalidInput("file name cannot be empty".into()));
    }
    if sanitised.starts_with('.') {
        return Err(ExportError::InvalidInput(
            "file name cannot start with '.'".into(),
        ));
    }

    let file_name = format!("{}{}", sanitised, suffix);
    if file_name.len() > max_len {
        return Err(ExportError::InvalidInput(format!(
            "file name exceeds maximum length of {} characters",
            max_len
        )));
    }

    Ok(file_name)
}

/// Resolves the response content type.
///
/// An empty hint falls back to the extension's default content type.
///
/// # Errors
///
/// Returns `ExportError::InvalidInput` if the hint is not of the form `type/subtype` made of
/// printable ASCII without whitespace (parameters after `;` are allowed).
pub fn resolve_content_type(hint: &str, extension: ExportExtension) -> ExportResult<String> {
    let hint = hint.trim();
    if hint.is_empty() {
        return Ok(extension.default_content_type().to_string());
    }

    let essence = hint.split(';').next().unwrap_or(hint).trim();
    let valid_chars = hint.bytes().all(|b| b.is_ascii_graphic() || b == b' ');
    let well_formed = match essence.split_once('/') {
        Some((kind, sub)) => {
            !kind.is_empty()
                && !sub.is_empty()
                && !sub.contains('/')
                && !essence.contains(' ')
        }
        None => false,
    };

    if !valid_chars || !well_formed {
        return Err(ExportError::InvalidInput(format!(
            "content type '{}' must look like type/subtype",
            hint
        )));
    }

    Ok(hint.to_string())
}

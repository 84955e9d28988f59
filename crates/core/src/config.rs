//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables. The `*_from_env_value`
//! helpers take the raw variable value (or `None`) rather than reading the environment
//! themselves, which keeps them testable.

use crate::constants::{DEFAULT_MAX_FILE_NAME_LEN, DEFAULT_NODE_DATA_DIR};
use crate::extension::{parse_extension_list, ExportExtension};
use crate::validation::ContentWidth;
use crate::{ExportError, ExportResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    node_data_dir: PathBuf,
    enabled_extensions: Vec<ExportExtension>,
    default_content_width: Option<ContentWidth>,
    max_file_name_len: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidInput` if no extension is enabled or `max_file_name_len`
    /// is zero.
    pub fn new(
        node_data_dir: PathBuf,
        enabled_extensions: Vec<ExportExtension>,
        default_content_width: Option<ContentWidth>,
        max_file_name_len: usize,
    ) -> ExportResult<Self> {
        if enabled_extensions.is_empty() {
            return Err(ExportError::InvalidInput(
                "at least one export extension must be enabled".into(),
            ));
        }
        if max_file_name_len == 0 {
            return Err(ExportError::InvalidInput(
                "maximum file name length must be greater than zero".into(),
            ));
        }

        Ok(Self {
            node_data_dir,
            enabled_extensions,
            default_content_width,
            max_file_name_len,
        })
    }

    /// Configuration with every extension enabled and default limits.
    pub fn with_defaults(node_data_dir: PathBuf) -> Self {
        Self {
            node_data_dir,
            enabled_extensions: ExportExtension::ALL.to_vec(),
            default_content_width: None,
            max_file_name_len: DEFAULT_MAX_FILE_NAME_LEN,
        }
    }

    pub fn node_data_dir(&self) -> &Path {
        &self.node_data_dir
    }

    pub fn enabled_extensions(&self) -> &[ExportExtension] {
        &self.enabled_extensions
    }

    pub fn is_enabled(&self, extension: ExportExtension) -> bool {
        self.enabled_extensions.contains(&extension)
    }

    pub fn default_content_width(&self) -> Option<&ContentWidth> {
        self.default_content_width.as_ref()
    }

    pub fn max_file_name_len(&self) -> usize {
        self.max_file_name_len
    }
}

/// Trims a raw variable value, treating empty and whitespace-only as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the node data directory from an optional value.
pub fn node_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_NODE_DATA_DIR.into()))
}

/// Parse the enabled extensions from an optional comma-separated value.
///
/// If `value` is `None` or blank, every recognised extension is enabled.
///
/// # Errors
///
/// Returns `ExportError::InvalidExtension` for an unrecognised entry, and
/// `ExportError::InvalidInput` if the list contains only separators.
pub fn enabled_extensions_from_env_value(
    value: Option<String>,
) -> ExportResult<Vec<ExportExtension>> {
    match non_blank(value) {
        None => Ok(ExportExtension::ALL.to_vec()),
        Some(v) => {
            let list = parse_extension_list(&v)?;
            if list.is_empty() {
                return Err(ExportError::InvalidInput(
                    "enabled extension list is empty".into(),
                ));
            }
            Ok(list)
        }
    }
}

/// Parse the default content width from an optional value.
///
/// # Errors
///
/// Returns `ExportError::InvalidInput` if the value is set but not a valid width.
pub fn default_width_from_env_value(value: Option<String>) -> ExportResult<Option<ContentWidth>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => ContentWidth::parse(&v),
    }
}

/// Parse the maximum file name length from an optional value.
///
/// # Errors
///
/// Returns `ExportError::InvalidInput` if the value is set but not a positive integer.
pub fn max_file_name_len_from_env_value(value: Option<String>) -> ExportResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_FILE_NAME_LEN),
        Some(v) => v
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ExportError::InvalidInput(format!(
                    "maximum file name length must be a positive integer, got '{}'",
                    v
                ))
            }),
    }
}

/// Build a `CoreConfig` from raw environment values.
///
/// Callers read the variables (`NODE_DATA_DIR`, `EXPORT_ENABLED_EXTENSIONS`,
/// `EXPORT_DEFAULT_WIDTH`, `EXPORT_MAX_FILE_NAME_LEN`) once at startup and pass them in.
///
/// # Errors
///
/// Returns the first error from the individual `*_from_env_value` parsers.
pub fn core_config_from_env_values(
    node_data_dir: Option<String>,
    enabled_extensions: Option<String>,
    default_width: Option<String>,
    max_file_name_len: Option<String>,
) -> ExportResult<CoreConfig> {
    CoreConfig::new(
        node_data_dir_from_env_value(node_data_dir),
        enabled_extensions_from_env_value(enabled_extensions)?,
        default_width_from_env_value(default_width)?,
        max_file_name_len_from_env_value(max_file_name_len)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_extensions_and_zero_length() {
        assert!(CoreConfig::new(PathBuf::from("d"), vec![], None, 10).is_err());
        assert!(CoreConfig::new(PathBuf::from("d"), vec![ExportExtension::Md], None, 0).is_err());
    }

    #[test]
    fn test_with_defaults_enables_everything() {
        let cfg = CoreConfig::with_defaults(PathBuf::from("d"));
        for ext in ExportExtension::ALL {
            assert!(cfg.is_enabled(ext));
        }
        assert_eq!(cfg.max_file_name_len(), DEFAULT_MAX_FILE_NAME_LEN);
        assert!(cfg.default_content_width().is_none());
    }

    #[test]
    fn test_node_data_dir_default() {
        assert_eq!(
            node_data_dir_from_env_value(None),
            PathBuf::from(DEFAULT_NODE_DATA_DIR)
        );
        assert_eq!(
            node_data_dir_from_env_value(Some("  ".into())),
            PathBuf::from(DEFAULT_NODE_DATA_DIR)
        );
        assert_eq!(
            node_data_dir_from_env_value(Some("/srv/nodes".into())),
            PathBuf::from("/srv/nodes")
        );
    }

    #[test]
    fn test_enabled_extensions_from_env_value() {
        assert_eq!(
            enabled_extensions_from_env_value(None).unwrap(),
            ExportExtension::ALL.to_vec()
        );
        assert_eq!(
            enabled_extensions_from_env_value(Some("md,json".into())).unwrap(),
            vec![ExportExtension::Md, ExportExtension::Json]
        );
        assert!(matches!(
            enabled_extensions_from_env_value(Some("md,docx".into())),
            Err(ExportError::InvalidExtension(_))
        ));
        assert!(matches!(
            enabled_extensions_from_env_value(Some(", ,".into())),
            Err(ExportError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_default_width_from_env_value() {
        assert!(default_width_from_env_value(None).unwrap().is_none());
        let width = default_width_from_env_value(Some("900px".into()))
            .unwrap()
            .unwrap();
        assert_eq!(width.to_string(), "900px");
        assert!(default_width_from_env_value(Some("huge".into())).is_err());
    }

    #[test]
    fn test_core_config_from_env_values() {
        let cfg = core_config_from_env_values(
            Some("nodes".into()),
            Some("md".into()),
            Some("50%".into()),
            None,
        )
        .unwrap();
        assert_eq!(cfg.node_data_dir(), Path::new("nodes"));
        assert_eq!(cfg.enabled_extensions(), &[ExportExtension::Md]);
        assert_eq!(cfg.default_content_width().unwrap().to_string(), "50%");

        assert!(core_config_from_env_values(None, None, None, Some("x".into())).is_err());
    }

    #[test]
    fn test_max_file_name_len_from_env_value() {
        assert_eq!(
            max_file_name_len_from_env_value(None).unwrap(),
            DEFAULT_MAX_FILE_NAME_LEN
        );
        assert_eq!(max_file_name_len_from_env_value(Some("64".into())).unwrap(), 64);
        assert!(max_file_name_len_from_env_value(Some("0".into())).is_err());
        assert!(max_file_name_len_from_env_value(Some("-3".into())).is_err());
    }
}

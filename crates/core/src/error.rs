#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported export extension: {0}")]
    InvalidExtension(String),
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("failed to render export: {0}")]
    RenderError(String),

    #[error("failed to read node file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to serialize export: {0}")]
    Serialization(serde_json::Error),
}

impl ExportError {
    /// Returns a stable machine-readable code for this error.
    ///
    /// Used by API layers to populate error bodies without exposing internal detail.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::InvalidInput(_) => "invalid_input",
            ExportError::InvalidExtension(_) => "invalid_extension",
            ExportError::NodeNotFound(_) => "node_not_found",
            ExportError::RenderError(_) => "render_error",
            ExportError::FileRead(_)
            | ExportError::YamlDeserialization(_)
            | ExportError::Serialization(_) => "internal",
        }
    }
}

impl From<export_types::TextError> for ExportError {
    fn from(err: export_types::TextError) -> Self {
        ExportError::InvalidInput(err.to_string())
    }
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

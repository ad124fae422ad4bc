use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dataset reading operations.
#[derive(Debug, Error)]
pub enum DataSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse XML from {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Unable to parse metadata from {path}")]
    MetadataNotFound { path: String },

    #[error("Unsupported file kind '{kind}' for reference '{reference}'")]
    UnsupportedFileKind { reference: String, kind: String },

    #[error("Invalid file reference '{reference}': {message}")]
    InvalidFileReference { reference: String, message: String },

    #[error("File {path} references itself through a manifest or dataset chain")]
    ReferenceCycle { path: PathBuf },

    #[error("Nesting limit of {depth} exceeded while expanding {path}")]
    RecursionLimit { path: PathBuf, depth: usize },

    #[error("Cannot merge a {found} dataset into a {expected} dataset")]
    IncompatibleMetaType { expected: String, found: String },

    #[error("Unknown dataset kind: {0}")]
    UnknownDataSetKind(String),

    #[error("Failed to serialize output as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize output as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl DataSetError {
    /// True when the error means the input was not well-formed XML.
    ///
    /// Used by unknown-file ingestion to decide whether to fall back to
    /// treating the file as a generic binary resource.
    pub fn is_malformed_xml(&self) -> bool {
        matches!(self, DataSetError::XmlParse { .. })
    }
}

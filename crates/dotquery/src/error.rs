use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DotQueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Could not decode QuerySet: {0}")]
    WireDecode(#[from] serde_json::Error),

    #[error("Path syntax error: {0}")]
    PathSyntax(String),

    #[error("Path traversal error: {0}")]
    PathTraversal(String),

    #[error("Invalid document in {path}: {message}")]
    DocumentDecode { path: PathBuf, message: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DotQueryError>;

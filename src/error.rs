use thiserror::Error;

#[derive(Error, Debug)]
pub enum CritError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode index data: {0}")]
    Decode(String),

    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CritError>;

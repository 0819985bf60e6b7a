//! Error handling and custom error types
//!
//! Provides unified error handling across the library using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Template rendering error: {0}")]
    Template(#[from] askama::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Response missing mandatory field '{0}'")]
    MissingField(&'static str),

    #[error("BetaFace API error: {0}")]
    Api(String),

    #[error("Job still processing")]
    NotReady,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

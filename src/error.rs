// src/error.rs
// =============================================================================
// Typed errors for the two "library-like" parts of the tool:
// - OpmlError: reading, parsing and writing OPML documents
// - IconError: loading, padding and saving icon images
//
// The command handlers in main.rs still use anyhow::Result, so any of these
// errors can be returned with ? and gets printed with its message.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpmlError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: usize,
        source: quick_xml::Error,
    },

    #[error("malformed document at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("failed to serialize document: {0}")]
    Serialize(quick_xml::Error),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[derive(Error, Debug)]
pub enum IconError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("scale factor must be a positive number, got {0}")]
    InvalidScale(f64),

    #[error("scaling {width}x{height} by {scale} leaves no pixels")]
    EmptyResult { width: u32, height: u32, scale: f64 },
}

pub type OpmlResult<T> = Result<T, OpmlError>;

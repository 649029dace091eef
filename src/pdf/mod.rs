//! Order document (注文書) pipeline: fax-safe PDF rendering and the seal
//! overlay compositor.

pub mod common;
pub mod renderer;
pub mod stamp;

pub use renderer::{OrderPdfRenderer, OrderSheetData};
pub use stamp::SealStamper;

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while composing the order PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create temporary document file: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to write document: {0}")]
    WriteDocument(#[source] std::io::Error),
    #[error("failed to embed font: {0}")]
    Font(String),
    #[error("PDF serialization failed: {0}")]
    Serialize(String),
}

/// Errors raised while merging the seal overlay. All of them degrade to
/// "no overlay applied" at the call site.
#[derive(Debug, Error)]
pub enum StampError {
    #[error("seal image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("seal image fetch returned status {0}")]
    FetchStatus(reqwest::StatusCode),
    #[error("seal image exceeds the size limit")]
    TooLarge,
    #[error("seal image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
    #[error("document could not be re-opened for stamping: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("document has no pages")]
    EmptyDocument,
}

/// A freshly rendered order PDF, scoped to a single request.
///
/// Holds the serialized bytes plus a uniquely named temp file. The file is
/// removed when the value drops, so cleanup runs on success, failure, and
/// preview-only paths alike.
pub struct RenderedDocument {
    file: NamedTempFile,
    bytes: Vec<u8>,
    filename: String,
}

impl RenderedDocument {
    pub(crate) fn new(bytes: Vec<u8>, filename: String) -> Result<Self, RenderError> {
        let mut file = tempfile::Builder::new()
            .prefix("order_")
            .suffix(".pdf")
            .tempfile()
            .map_err(RenderError::TempFile)?;
        file.write_all(&bytes).map_err(RenderError::WriteDocument)?;
        file.flush().map_err(RenderError::WriteDocument)?;

        Ok(Self {
            file,
            bytes,
            filename,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Suggested download filename (not the temp path).
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Replace the document contents in place (seal overlay).
    pub(crate) fn replace_bytes(&mut self, bytes: Vec<u8>) -> Result<(), RenderError> {
        std::fs::write(self.file.path(), &bytes).map_err(RenderError::WriteDocument)?;
        self.bytes = bytes;
        Ok(())
    }

    /// Hand the bytes to the caller, deleting the temp file immediately.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

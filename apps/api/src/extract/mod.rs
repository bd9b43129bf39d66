//! Document Text Extractor — turns an uploaded file into plain text.
//!
//! Dispatch is by lower-cased file-name extension. Unknown extensions are not rejected:
//! they are read as text and a warning is logged. Every failure surfaces as a single
//! `UnreadableFileError`; no partial text is ever returned.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

pub mod pdf;
pub mod text;
pub mod word;

/// File extensions the upload surface advertises.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "json", "md", "pdf", "doc", "docx"];

/// A file as received from the client. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased text after the last `.`; the whole name when there is no dot.
    pub fn extension(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Word,
    /// Anything else. Read optimistically as text.
    Unrecognized,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "txt" | "json" | "md" => DocumentKind::PlainText,
            "pdf" => DocumentKind::Pdf,
            "doc" | "docx" => DocumentKind::Word,
            _ => DocumentKind::Unrecognized,
        }
    }
}

/// A single file could not be parsed into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to read file: {message}")]
pub struct UnreadableFileError {
    pub message: String,
}

impl UnreadableFileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extracts the plain-text content of `document`.
pub fn extract_text(document: &UploadedDocument) -> Result<String, UnreadableFileError> {
    let extension = document.extension();
    let kind = DocumentKind::from_extension(&extension);

    let result = match kind {
        DocumentKind::PlainText => text::read_text(&document.bytes),
        DocumentKind::Pdf => pdf::read_pdf(&document.bytes),
        DocumentKind::Word => word::read_word(&document.bytes),
        DocumentKind::Unrecognized => {
            warn!(
                "Unknown file type: {extension}. Trying to read {} as text.",
                document.name
            );
            text::read_text(&document.bytes)
        }
    };

    match result {
        Ok(text) => {
            debug!(
                file = %document.name,
                ?kind,
                bytes = document.size(),
                chars = text.chars().count(),
                "extracted document text"
            );
            Ok(text)
        }
        Err(e) => {
            warn!(file = %document.name, ?kind, "failed to read file: {e:#}");
            Err(UnreadableFileError::new(format!("{e:#}")))
        }
    }
}

/// Runs `extract_text` on the blocking pool so PDF and DOCX parsing never stalls the runtime.
pub async fn extract_text_async(document: &UploadedDocument) -> Result<String, UnreadableFileError> {
    let document = document.clone();
    tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .map_err(|e| UnreadableFileError::new(format!("extraction task failed: {e}")))?
}

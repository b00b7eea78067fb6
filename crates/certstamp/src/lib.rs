//! Certstamp - write a name onto a certificate PDF
//!
//! This crate provides:
//! - The generation request model (JSON or builder)
//! - Font selection: one of the 14 standard fonts, or a custom TrueType file
//! - Placement of the text centered on a point of the page
//! - Rendering orchestration: open, measure, draw, save
//!
//! # Example
//!
//! ```ignore
//! use certstamp::{generate, GenerationRequest};
//!
//! let request = GenerationRequest::new("template.pdf", "Jane Doe", "HELVETICA_BOLD", 24, 300.0, "jane.pdf");
//! let saved_to = generate(&request)?;
//! ```

mod generate;
pub mod placement;
mod request;

pub use generate::generate;
pub use placement::{compute_origin, Placement, BASELINE_OFFSET};
pub use request::{CustomFontMode, FontSelector, GenerationRequest, CUSTOM_FONT_TYPE};

use pdf_core::PdfError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while stamping a certificate
#[derive(Debug, Error)]
pub enum StampError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Font type CUSTOM requires a font file")]
    MissingFontFile,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StampError {
    /// The font type named none of the standard fonts
    pub fn is_unsupported_font(&self) -> bool {
        matches!(self, StampError::Pdf(PdfError::UnsupportedFont(_)))
    }
}

/// Result type for stamping operations
pub type Result<T> = std::result::Result<T, StampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unsupported_font() {
        let err = StampError::from(PdfError::UnsupportedFont("ARIAL".to_string()));
        assert!(err.is_unsupported_font());
        assert_eq!(err.to_string(), "PDF error: Unsupported font name: ARIAL");

        assert!(!StampError::MissingFontFile.is_unsupported_font());
    }

    #[test]
    fn test_io_error_names_path() {
        let err = StampError::Io {
            path: PathBuf::from("fonts/missing.ttf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to access fonts/missing.ttf: not found");
    }
}

//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Reading page geometry (inherited MediaBox)
//! - The 14 standard PDF fonts and their AFM metrics
//! - Loading and embedding TrueType fonts
//! - Appending text at specific coordinates
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{FontMetrics, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::open("certificate.pdf")?;
//! let font = StandardFont::from_name("helvetica_bold")?;
//! let width = font.string_width("Jane Doe")? / 1000.0 * 24.0;
//! doc.set_standard_font(font, 24.0);
//! doc.insert_text("Jane Doe", 1, 306.0 - width / 2.0, 300.0)?;
//! doc.save("outputs/jane.pdf")?;
//! ```

mod document;
mod font;
mod metrics;
mod standard;
mod text;

pub use document::{Color, PageSize, PdfDocument};
pub use font::FontData;
pub use metrics::{to_points, FontMetrics, GLYPH_SPACE_UNITS};
pub use standard::StandardFont;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Unsupported font name: {0}")]
    UnsupportedFont(String),

    #[error("Font {font} cannot encode character {ch:?}")]
    UnencodableText { font: String, ch: char },

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

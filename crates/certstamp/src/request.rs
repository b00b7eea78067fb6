//! Generation request types

use crate::{Result, StampError};
use pdf_core::StandardFont;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Font type that selects a caller-supplied TrueType file
///
/// Matched exactly, so `custom` is looked up as a standard font name.
pub const CUSTOM_FONT_TYPE: &str = "CUSTOM";

/// Which font measures (and usually draws) the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSelector {
    Standard(StandardFont),
    Custom,
}

impl FontSelector {
    /// Parse a font type string
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(FontSelector::parse("helvetica")?, FontSelector::Standard(StandardFont::Helvetica));
    /// assert_eq!(FontSelector::parse("CUSTOM")?, FontSelector::Custom);
    /// ```
    pub fn parse(font_type: &str) -> pdf_core::Result<Self> {
        if font_type == CUSTOM_FONT_TYPE {
            return Ok(FontSelector::Custom);
        }
        StandardFont::from_name(font_type).map(FontSelector::Standard)
    }
}

impl FromStr for FontSelector {
    type Err = pdf_core::PdfError;

    fn from_str(s: &str) -> pdf_core::Result<Self> {
        Self::parse(s)
    }
}

/// How a custom TrueType font takes part in rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomFontMode {
    /// Measure with the custom font, draw with Helvetica
    #[default]
    MeasureOnly,
    /// Embed the custom font and draw with it
    Embed,
}

/// Everything needed to stamp one name onto one certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Template PDF to read
    pub input_path: PathBuf,
    /// Text to write, usually a recipient name
    pub text: String,
    /// Standard font name (any case) or `CUSTOM`
    pub font_type: String,
    /// Font size in points
    pub font_size: u32,
    /// Horizontal center in points; `None` or negative centers on the page
    #[serde(default)]
    pub center_x: Option<f64>,
    /// Vertical reference in points from the bottom of the page
    pub center_y: f64,
    /// TrueType file, required when `font_type` is `CUSTOM`
    #[serde(default)]
    pub font_file: Option<PathBuf>,
    /// File name of the result inside `output_dir`
    pub output_file_name: String,
    /// Directory for the result, created when missing
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Page to write on (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub custom_font_mode: CustomFontMode,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_page() -> usize {
    1
}

impl GenerationRequest {
    /// Create a request with the default page, output directory and centering
    pub fn new(
        input_path: impl Into<PathBuf>,
        text: impl Into<String>,
        font_type: impl Into<String>,
        font_size: u32,
        center_y: f64,
        output_file_name: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            text: text.into(),
            font_type: font_type.into(),
            font_size,
            center_x: None,
            center_y,
            font_file: None,
            output_file_name: output_file_name.into(),
            output_dir: default_output_dir(),
            page: default_page(),
            custom_font_mode: CustomFontMode::default(),
        }
    }

    pub fn with_center_x(mut self, center_x: f64) -> Self {
        self.center_x = Some(center_x);
        self
    }

    pub fn with_font_file(mut self, font_file: impl Into<PathBuf>) -> Self {
        self.font_file = Some(font_file.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_custom_font_mode(mut self, mode: CustomFontMode) -> Self {
        self.custom_font_mode = mode;
        self
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a request from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StampError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check the fields that do not need the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(StampError::InvalidRequest(
                "font size must be positive".to_string(),
            ));
        }
        if self.page == 0 {
            return Err(StampError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        if !self.center_y.is_finite() {
            return Err(StampError::InvalidRequest(
                "center Y must be a finite number".to_string(),
            ));
        }
        if let Some(center_x) = self.center_x {
            if !center_x.is_finite() {
                return Err(StampError::InvalidRequest(
                    "center X must be a finite number".to_string(),
                ));
            }
        }
        if self.output_file_name.trim().is_empty() {
            return Err(StampError::InvalidRequest(
                "output file name is empty".to_string(),
            ));
        }
        if !is_plain_file_name(&self.output_file_name) {
            return Err(StampError::InvalidRequest(format!(
                "output file name {:?} must not contain a directory",
                self.output_file_name
            )));
        }
        if self.font_type == CUSTOM_FONT_TYPE && self.font_file.is_none() {
            return Err(StampError::MissingFontFile);
        }
        Ok(())
    }

    /// Where the result is written
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file_name)
    }
}

/// A single normal path component, so the output stays inside `output_dir`
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

//! Rendering orchestration

use crate::placement::compute_origin;
use crate::request::{CustomFontMode, FontSelector, GenerationRequest};
use crate::{Result, StampError};
use pdf_core::{FontData, FontMetrics, PdfDocument, PdfError, StandardFont};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Font used to draw custom-font text when it is only measured
const MEASURE_ONLY_DRAW_FONT: StandardFont = StandardFont::Helvetica;

/// The font a request resolved to
enum SelectedFont {
    Standard(StandardFont),
    Custom(FontData),
}

impl SelectedFont {
    fn metrics(&self) -> &dyn FontMetrics {
        match self {
            SelectedFont::Standard(font) => font as &dyn FontMetrics,
            SelectedFont::Custom(font) => font,
        }
    }
}

/// Write the request's text onto its certificate and save the result
///
/// Returns the path of the saved PDF. Nothing is written when the font
/// cannot be resolved or the input cannot be read.
///
/// # Example
/// ```ignore
/// let request = GenerationRequest::from_json_file("request.json")?;
/// let saved_to = certstamp::generate(&request)?;
/// ```
pub fn generate(request: &GenerationRequest) -> Result<PathBuf> {
    match stamp(request) {
        Ok(output_path) => {
            info!(
                input = %request.input_path.display(),
                output = %output_path.display(),
                "Name written"
            );
            Ok(output_path)
        }
        Err(err) => {
            error!(
                input = %request.input_path.display(),
                font_type = %request.font_type,
                error = %err,
                "Failed to write name"
            );
            Err(err)
        }
    }
}

fn stamp(request: &GenerationRequest) -> Result<PathBuf> {
    request.validate()?;

    // Resolve the font before touching the output directory
    let font = select_font(request)?;
    debug!(
        font = font.metrics().font_name(),
        bbox = ?font.metrics().font_bbox(),
        "Resolved font"
    );

    let mut doc = PdfDocument::open(&request.input_path)?;
    let page_size = doc.page_size(request.page)?;
    debug!(
        page = request.page,
        width = page_size.width,
        height = page_size.height,
        "Page size"
    );

    let font_size = f64::from(request.font_size);
    let placement = compute_origin(
        request.center_x,
        request.center_y,
        page_size.width,
        &request.text,
        font.metrics(),
        font_size,
    )?;
    debug!(
        x = placement.x,
        y = placement.y,
        text_width = placement.text_width,
        text_height = placement.text_height,
        "Placed text"
    );

    // Font sizes are small integers, exact in f32
    let draw_size = request.font_size as f32;
    match font {
        SelectedFont::Standard(standard) => doc.set_standard_font(standard, draw_size),
        SelectedFont::Custom(custom) => match request.custom_font_mode {
            CustomFontMode::MeasureOnly => {
                warn!(
                    measured_with = %custom.name,
                    drawn_with = MEASURE_ONLY_DRAW_FONT.base_font(),
                    "Custom font is only used for measuring; centering may be off"
                );
                doc.set_standard_font(MEASURE_ONLY_DRAW_FONT, draw_size);
            }
            CustomFontMode::Embed => {
                let name = custom.name.clone();
                doc.add_font_data(custom)?;
                doc.set_font(&name, draw_size)?;
            }
        },
    }
    doc.insert_text(&request.text, request.page, placement.x, placement.y)?;

    std::fs::create_dir_all(&request.output_dir).map_err(|source| StampError::Io {
        path: request.output_dir.clone(),
        source,
    })?;
    let output_path = request.output_path();
    doc.save(&output_path)?;

    Ok(output_path)
}

fn select_font(request: &GenerationRequest) -> Result<SelectedFont> {
    match FontSelector::parse(&request.font_type)? {
        FontSelector::Standard(font) => Ok(SelectedFont::Standard(font)),
        FontSelector::Custom => {
            let path = request
                .font_file
                .as_deref()
                .ok_or(StampError::MissingFontFile)?;
            Ok(SelectedFont::Custom(load_custom_font(path)?))
        }
    }
}

fn load_custom_font(path: &Path) -> Result<FontData> {
    FontData::from_file(path).map_err(|err| match err {
        PdfError::IoError(source) => StampError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => StampError::Pdf(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_standard_font() {
        let request = GenerationRequest::new("in.pdf", "x", "courier_bold", 12, 0.0, "x.pdf");
        match select_font(&request).unwrap() {
            SelectedFont::Standard(font) => assert_eq!(font, StandardFont::CourierBold),
            SelectedFont::Custom(_) => panic!("Expected a standard font"),
        }
    }

    #[test]
    fn test_select_unknown_font() {
        let request = GenerationRequest::new("in.pdf", "x", "ARIAL", 12, 0.0, "x.pdf");
        let err = select_font(&request).err().unwrap();
        assert!(err.is_unsupported_font());
    }

    #[test]
    fn test_select_custom_font_unreadable() {
        let request = GenerationRequest::new("in.pdf", "x", "CUSTOM", 12, 0.0, "x.pdf")
            .with_font_file("/definitely/not/here.ttf");
        match select_font(&request) {
            Err(StampError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.ttf"))
            }
            Err(other) => panic!("Expected Io error, got {other:?}"),
            Ok(_) => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_select_custom_font_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let request =
            GenerationRequest::new("in.pdf", "x", "CUSTOM", 12, 0.0, "x.pdf").with_font_file(&path);
        assert!(matches!(
            select_font(&request),
            Err(StampError::Pdf(PdfError::FontParseError(_)))
        ));
    }

    #[test]
    fn test_custom_font_named_after_file() {
        let font_path = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        ]
        .into_iter()
        .find(|path| Path::new(path).exists());
        let Some(font_path) = font_path else {
            return;
        };

        let font = load_custom_font(Path::new(font_path)).unwrap();
        let stem = Path::new(font_path).file_stem().unwrap().to_str().unwrap();
        assert_eq!(font.name, stem);
    }
}

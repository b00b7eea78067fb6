//! TrueType font handling for PDF documents

use crate::metrics::{FontMetrics, GLYPH_SPACE_UNITS};
use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::HashSet;
use std::path::Path;

/// Font data structure for embedded fonts
///
/// Holds the raw TrueType bytes; the face is re-parsed on demand, which is
/// cheap since `ttf-parser` only reads table offsets up front.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters used (for the widths array and ToUnicode map)
    pub used_chars: HashSet<char>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        // Validate that we can parse the font
        ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: ttf_data.to_vec(),
            used_chars: HashSet::new(),
        })
    }

    /// Load a TrueType font file, named after the file stem
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom");
        Self::from_ttf(name, &data)
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        for c in text.chars() {
            self.used_chars.insert(c);
        }
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get glyph advance width in font units
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        self.face().and_then(|face| {
            let glyph_id = face.glyph_index(c)?;
            face.glyph_hor_advance(glyph_id)
        })
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face()
            .map(|face| face.units_per_em())
            .unwrap_or(1000)
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face().map(|face| face.ascender()).unwrap_or(800)
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face().map(|face| face.descender()).unwrap_or(-200)
    }

    /// Cap height in font units (OS/2 `sCapHeight`, else the ascender)
    pub fn capital_height(&self) -> i16 {
        self.face()
            .and_then(|face| face.capital_height())
            .filter(|&h| h > 0)
            .unwrap_or_else(|| self.ascender())
    }

    /// PostScript name from the `name` table, falling back to the identifier
    pub fn postscript_name(&self) -> String {
        let from_table = self.face().and_then(|face| {
            face.names()
                .into_iter()
                .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
                .find_map(|n| n.to_string())
        });
        from_table
            .unwrap_or_else(|| self.name.clone())
            .chars()
            .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
            .collect()
    }

    /// Convert font units to 1000-unit glyph space
    fn to_glyph_space(&self, value: f64) -> f64 {
        value * GLYPH_SPACE_UNITS / f64::from(self.units_per_em())
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.postscript_name().into_bytes());

        // Generate ToUnicode CMap
        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        // Generate font file stream
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let scaled = |v: i16| self.to_glyph_space(f64::from(v)).round() as i64;
        let font_bbox: Vec<Object> = self
            .font_bbox()
            .iter()
            .map(|&v| (v.round() as i64).into())
            .collect();

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", scaled(self.ascender()).into()),
            ("Descent", scaled(self.descender()).into()),
            ("CapHeight", scaled(self.capital_height()).into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))), // Placeholder, will be set when embedding
        ]);

        let widths_array = self.generate_widths_array();

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))), // Placeholder, will be set when embedding
            ("W", widths_array.into()),
            ("DW", 1000.into()),
            ("CIDToGIDMap", "Identity".into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()), // Placeholder, will be set when embedding
            ("ToUnicode", Object::Reference((0, 0))), // Placeholder, will be set when embedding
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Encode text as hex string for PDF Tj operator
    ///
    /// Characters without a glyph are rejected rather than drawn as `.notdef`.
    pub fn encode_text_hex(&self, text: &str) -> Result<String> {
        let mut result = String::new();
        for c in text.chars() {
            let gid = self.glyph_id(c).filter(|&id| id != 0).ok_or_else(|| {
                PdfError::UnencodableText {
                    font: self.name.clone(),
                    ch: c,
                }
            })?;
            result.push_str(&format!("{gid:04X}"));
        }
        Ok(format!("<{result}>"))
    }

    /// Generate /W array for glyph widths
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let face = match self.face() {
            Some(f) => f,
            None => return widths,
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();
        gids.sort();
        gids.dedup();

        // Individual mapping format: [gid1 [width1] gid2 [width2] ...]
        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .map(|a| self.to_glyph_space(f64::from(a)).round() as i64)
                .unwrap_or(1000);
            widths.push(i64::from(gid).into());
            widths.push(vec![advance.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");

        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mut char_list: Vec<char> = self.used_chars.iter().copied().collect();
        char_list.sort_by_key(|c| *c as u32);

        // At most 100 entries per bfchar section
        for chunk in char_list.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

impl FontMetrics for FontData {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn string_width(&self, text: &str) -> Result<f64> {
        let face = self.face();
        let mut total = 0.0;
        for c in text.chars() {
            let advance = face
                .as_ref()
                .and_then(|face| {
                    let glyph_id = face.glyph_index(c).filter(|id| id.0 != 0)?;
                    Some(face.glyph_hor_advance(glyph_id).unwrap_or(0))
                })
                .ok_or_else(|| PdfError::UnencodableText {
                    font: self.name.clone(),
                    ch: c,
                })?;
            total += f64::from(advance);
        }
        Ok(self.to_glyph_space(total))
    }

    fn cap_height(&self) -> f64 {
        self.to_glyph_space(f64::from(self.capital_height()))
    }

    fn font_bbox(&self) -> [f64; 4] {
        let [x_min, y_min, x_max, y_max] = match self.face() {
            Some(face) => {
                let bbox = face.global_bounding_box();
                [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max]
            }
            None => [0, self.descender(), self.units_per_em() as i16, self.ascender()],
        };
        [x_min, y_min, x_max, y_max].map(|v| self.to_glyph_space(f64::from(v)))
    }
}

//! PDF Document wrapper

use crate::metrics::{to_points, FontMetrics};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{FontData, PdfError, Result, StandardFont};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::Path;

/// US Letter, used when no MediaBox is found anywhere up the page tree
const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// Limit on `/Parent` hops when looking up inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Font selected for drawing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ActiveFont {
    Standard(StandardFont),
    Embedded(String),
}

/// A buffered text operation for deferred encoding
///
/// Text is buffered during rendering and encoded during save, after the
/// font objects it refers to have been written.
#[derive(Debug, Clone)]
struct BufferedTextOp {
    /// The text to render
    text: String,
    /// Font the text is drawn with
    font: ActiveFont,
    /// Font resource name (e.g., "F1")
    font_resource_name: String,
    /// Page number (1-indexed)
    page: usize,
    /// X coordinate of the baseline origin (PDF coordinates)
    x: f64,
    /// Y coordinate of the baseline origin (PDF coordinates)
    y: f64,
    /// Font size in points
    font_size: f32,
    /// Text color
    color: Color,
}

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Red color
    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// PDF Document wrapper providing high-level operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered TrueType fonts
    fonts: HashMap<String, FontData>,
    /// Current font
    current_font: Option<ActiveFont>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Fonts written to the document (font -> PDF object ID)
    embedded_fonts: HashMap<ActiveFont, ObjectId>,
    /// Page font resources (page number -> font -> resource name)
    page_font_resources: HashMap<usize, HashMap<ActiveFont, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Buffered text operations (encoded during save)
    buffered_text_ops: Vec<BufferedTextOp>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Arguments
    /// * `path` - Path to the PDF file
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("certificate.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path)
            .map_err(|e| PdfError::OpenError(format!("{}: {e}", path.display())))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            fonts: HashMap::new(),
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            page_content_buffer: BTreeMap::new(),
            buffered_text_ops: Vec::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the page size in points
    ///
    /// Reads the MediaBox, following the `/Parent` chain when the page
    /// inherits it. Pages without any MediaBox are treated as US Letter.
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;

        let media_box = match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(media_box) => media_box,
            None => return Ok(DEFAULT_PAGE_SIZE),
        };
        let values = self
            .resolve(media_box)?
            .as_array()
            .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?;

        if values.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }
        let mut coords = [0.0f64; 4];
        for (coord, value) in coords.iter_mut().zip(values) {
            *coord = number_value(self.resolve(value)?)
                .ok_or_else(|| PdfError::ParseError("Invalid MediaBox entry".to_string()))?;
        }

        Ok(PageSize {
            width: (coords[2] - coords[0]).abs(),
            height: (coords[3] - coords[1]).abs(),
        })
    }

    /// Add a TrueType font to the document
    ///
    /// # Arguments
    /// * `name` - Font identifier (used in set_font)
    /// * `ttf_data` - TrueType font file bytes
    pub fn add_font(&mut self, name: &str, ttf_data: &[u8]) -> Result<()> {
        self.add_font_data(FontData::from_ttf(name, ttf_data)?)
    }

    /// Register an already parsed font under its own name
    pub fn add_font_data(&mut self, font: FontData) -> Result<()> {
        if self.fonts.contains_key(&font.name) {
            return Err(PdfError::FontAlreadyExists(font.name));
        }
        self.fonts.insert(font.name.clone(), font);
        Ok(())
    }

    /// Set the current font to a registered TrueType font
    ///
    /// # Arguments
    /// * `name` - Font identifier given to `add_font`
    /// * `size` - Font size in points
    pub fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(PdfError::FontNotFound(name.to_string()));
        }

        self.current_font = Some(ActiveFont::Embedded(name.to_string()));
        self.current_font_size = size;

        Ok(())
    }

    /// Set the current font to one of the 14 standard fonts
    ///
    /// # Example
    /// ```ignore
    /// doc.set_standard_font(StandardFont::HelveticaBold, 24.0);
    /// ```
    pub fn set_standard_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = Some(ActiveFont::Standard(font));
        self.current_font_size = size;
    }

    /// Set the text color
    ///
    /// # Example
    /// ```ignore
    /// doc.set_text_color(Color::from_rgb(255, 128, 0)); // Orange
    /// ```
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Metrics of the current font
    pub fn current_metrics(&self) -> Result<&dyn FontMetrics> {
        let font = self
            .current_font
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font set".to_string()))?;
        self.metrics_for(font)
    }

    fn metrics_for<'a>(&'a self, font: &'a ActiveFont) -> Result<&'a dyn FontMetrics> {
        match font {
            ActiveFont::Standard(standard) => Ok(standard as &dyn FontMetrics),
            ActiveFont::Embedded(name) => self
                .fonts
                .get(name)
                .map(|data| data as &dyn FontMetrics)
                .ok_or_else(|| PdfError::FontNotFound(name.clone())),
        }
    }

    /// Get current font's text width for a string
    ///
    /// # Returns
    /// Width in points at the current font size
    ///
    /// # Example
    /// ```ignore
    /// doc.set_standard_font(StandardFont::Helvetica, 12.0);
    /// let width = doc.get_text_width("Hello")?;
    /// ```
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        let width = self.current_metrics()?.string_width(text)?;
        Ok(to_points(width, f64::from(self.current_font_size)))
    }

    /// Insert text with its baseline origin at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (from the left edge)
    /// * `y` - Y coordinate in points (from the bottom edge)
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let font = self
            .current_font
            .clone()
            .ok_or_else(|| PdfError::FontNotFound("No font set".to_string()))?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        // Reject unencodable text now rather than at save time
        self.encode_text(&font, text)?;

        if let ActiveFont::Embedded(name) = &font {
            if let Some(font_data) = self.fonts.get_mut(name) {
                font_data.add_chars(text);
            }
        }

        let font_resource_name = self.get_or_create_font_ref(&font, page)?;

        self.buffered_text_ops.push(BufferedTextOp {
            text: text.to_string(),
            font,
            font_resource_name,
            page,
            x,
            y,
            font_size: self.current_font_size,
            color: self.current_text_color,
        });

        Ok(())
    }

    fn encode_text(&self, font: &ActiveFont, text: &str) -> Result<String> {
        match font {
            ActiveFont::Standard(standard) => standard.encode_text_hex(text),
            ActiveFont::Embedded(name) => self
                .fonts
                .get(name)
                .ok_or_else(|| PdfError::FontNotFound(name.clone()))?
                .encode_text_hex(text),
        }
    }

    /// Save the document to a file
    ///
    /// # Arguments
    /// * `path` - Output file path
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.write_pending_content()?;

        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.write_pending_content()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn write_pending_content(&mut self) -> Result<()> {
        // 1. Write font objects and register them on the pages that use them
        self.embed_fonts()?;

        // 2. Encode buffered text into page content buffers
        self.encode_buffered_text()?;

        // 3. Append buffered content streams to pages
        self.flush_content_buffers()
    }

    /// Encode buffered text operations and add to content buffers
    fn encode_buffered_text(&mut self) -> Result<()> {
        let text_ops: Vec<BufferedTextOp> = std::mem::take(&mut self.buffered_text_ops);

        for op in text_ops {
            let text_hex = self.encode_text(&op.font, &op.text)?;

            let ctx = TextRenderContext {
                font_name: op.font_resource_name,
                font_size: op.font_size,
                color: op.color,
            };

            let operators = generate_text_operators(&text_hex, op.x, op.y, &ctx);
            self.buffer_content(op.page, &operators);
        }

        Ok(())
    }

    /// Write every font referenced by a page into the PDF
    fn embed_fonts(&mut self) -> Result<()> {
        let mut used: Vec<ActiveFont> = self
            .page_font_resources
            .values()
            .flat_map(|fonts| fonts.keys().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        // Stable object numbering between runs
        used.sort_by_key(font_sort_key);

        for font in used {
            // Embedded subsets depend on the characters used so far
            if matches!(font, ActiveFont::Standard(_)) && self.embedded_fonts.contains_key(&font)
            {
                continue;
            }
            let object_id = match &font {
                ActiveFont::Standard(standard) => self.inner.add_object(standard.to_pdf_dictionary()),
                ActiveFont::Embedded(name) => self.embed_font_object(name)?,
            };
            self.embedded_fonts.insert(font, object_id);
        }

        self.finalize_page_font_resources()
    }

    /// Embed a single TrueType font into the PDF
    fn embed_font_object(&mut self, font_name: &str) -> Result<ObjectId> {
        let font_data = self
            .fonts
            .get(font_name)
            .ok_or_else(|| PdfError::FontNotFound(font_name.to_string()))?;

        let font_objects = font_data.to_pdf_objects()?;

        let font_file_id = self.inner.add_object(font_objects.font_file_stream);

        let mut font_descriptor = font_objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = font_objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let mut type0_font = font_objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );

        let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));

        Ok(self.inner.add_object(type0_font))
    }

    /// Get or create a font resource name for a specific page
    ///
    /// Names already present in the page's `/Font` resources are skipped so
    /// the original content keeps pointing at its own fonts.
    fn get_or_create_font_ref(&mut self, font: &ActiveFont, page: usize) -> Result<String> {
        if let Some(name) = self
            .page_font_resources
            .get(&page)
            .and_then(|fonts| fonts.get(font))
        {
            return Ok(name.clone());
        }

        let page_id = self.page_id(page)?;
        let resources = self.page_resources(page_id)?;
        let taken: HashSet<Vec<u8>> = self
            .font_dictionary(&resources)?
            .iter()
            .map(|(key, _)| key.clone())
            .collect();

        let resource_name = loop {
            let candidate = format!("F{}", self.next_font_resource);
            self.next_font_resource += 1;
            if !taken.contains(candidate.as_bytes()) {
                break candidate;
            }
        };

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font.clone(), resource_name.clone());

        Ok(resource_name)
    }

    /// Add font references to the Resources of every page that uses them
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let page_resources: Vec<(usize, Vec<(ActiveFont, String)>)> = self
            .page_font_resources
            .iter()
            .map(|(&page, fonts)| {
                let font_list = fonts
                    .iter()
                    .map(|(font, name)| (font.clone(), name.clone()))
                    .collect();
                (page, font_list)
            })
            .collect();

        for (page, fonts) in page_resources {
            if !fonts.is_empty() {
                self.add_fonts_to_page_resources(page, &fonts)?;
            }
        }

        Ok(())
    }

    /// Add multiple fonts to a page's Resources dictionary in a single operation
    ///
    /// Inherited or indirect Resources are copied onto the page itself.
    fn add_fonts_to_page_resources(
        &mut self,
        page: usize,
        fonts: &[(ActiveFont, String)],
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let mut resources_dict = self.page_resources(page_id)?;
        let mut font_dict = self.font_dictionary(&resources_dict)?;

        for (font, resource_name) in fonts {
            let font_ref = self
                .embedded_fonts
                .get(font)
                .ok_or_else(|| PdfError::FontNotFound(format!("{font:?}")))?;
            font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
        }

        resources_dict.set("Font", Object::Dictionary(font_dict));

        let mut page_dict = self.page_dictionary(page_id)?.clone();
        page_dict.set("Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, Object::Dictionary(page_dict));

        Ok(())
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        u32::try_from(page)
            .ok()
            .and_then(|number| pages.get(&number).copied())
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    fn page_dictionary(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Follow a reference one level
    fn resolve<'a>(&'a self, object: &'a Object) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Look up a page attribute, walking up `/Parent` for inheritable keys
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    /// Owned copy of the page's effective Resources dictionary
    fn page_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        match self.inherited_attribute(page_id, b"Resources")? {
            Some(resources) => Ok(self
                .resolve(resources)?
                .as_dict()
                .cloned()
                .unwrap_or_default()),
            None => Ok(Dictionary::new()),
        }
    }

    /// Owned copy of the `/Font` sub-dictionary of a Resources dictionary
    fn font_dictionary(&self, resources: &Dictionary) -> Result<Dictionary> {
        match resources.get(b"Font") {
            Ok(font) => Ok(self.resolve(font)?.as_dict().cloned().unwrap_or_default()),
            Err(_) => Ok(Dictionary::new()),
        }
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content streams
    ///
    /// The existing streams are left untouched and bracketed by a `q` stream
    /// before and a `Q` at the start of the new stream, so graphics state set
    /// by the original content cannot leak into the appended text.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut page_dict = self.page_dictionary(page_id)?.clone();

        let mut contents: Vec<Object> = match page_dict.get(b"Contents") {
            Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*ref_id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            Ok(Object::Stream(stream)) => {
                let stream = stream.clone();
                vec![Object::Reference(self.inner.add_object(stream))]
            }
            _ => Vec::new(),
        };

        let mut new_content = Vec::with_capacity(content.len() + 2);
        if !contents.is_empty() {
            let save_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.insert(0, Object::Reference(save_id));
            new_content.extend_from_slice(b"\nQ\n");
        }
        new_content.extend_from_slice(content);

        let mut dict = Dictionary::new();
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        let stream_id = self
            .inner
            .add_object(Stream::new(dict, deflate(&new_content)?));
        contents.push(Object::Reference(stream_id));

        page_dict.set("Contents", Object::Array(contents));
        self.inner.objects.insert(page_id, Object::Dictionary(page_dict));

        Ok(())
    }
}

/// Compress with FlateDecode (zlib)
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn number_value(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn font_sort_key(font: &ActiveFont) -> String {
    match font {
        ActiveFont::Standard(standard) => format!("0{}", standard.base_font()),
        ActiveFont::Embedded(name) => format!("1{name}"),
    }
}

//! PDF Document wrapper

use crate::font::{encode_win_ansi, hex_string, BaseFont};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A4 fallback used when a page has no MediaBox anywhere in its tree
const A4_WIDTH: f64 = 595.28;
const A4_HEIGHT: f64 = 841.89;

/// Maximum depth followed through `/Parent` links
const MAX_INHERITANCE_DEPTH: usize = 32;

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

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
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
    /// The base font and its object, once registered
    base_font: Option<(BaseFont, ObjectId)>,
    /// Page font resource names (page number -> resource name)
    page_font_resources: HashMap<usize, String>,
    /// Next font resource number
    next_font_resource: u32,
    /// Embedded images (data hash -> PDF object ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: HashMap<usize, HashMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            base_font: None,
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the size of a page in points
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;
        extract_size_from_media_box(&media_box)
    }

    /// Register the base font with the document.
    ///
    /// The font object is added once; later calls return the same object.
    pub fn use_base_font(&mut self) -> ObjectId {
        if let Some((_, id)) = self.base_font {
            return id;
        }

        let font = BaseFont::default();
        let id = self
            .inner
            .add_object(Object::Dictionary(font.to_pdf_dictionary()));
        self.base_font = Some((font, id));
        id
    }

    /// Insert left-aligned text with its baseline at `(x, y)`
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (from left)
    /// * `y` - Y coordinate in points (from bottom)
    /// * `font_size` - Font size in points
    /// * `color` - Fill color
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        color: Color,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        if self.base_font.is_none() {
            return Err(PdfError::FontNotSet);
        }

        let (bytes, replaced) = encode_win_ansi(text);
        if replaced > 0 {
            log::warn!(
                "{replaced} character(s) in {text:?} have no WinAnsi code and were replaced with '?'"
            );
        }

        let font_resource_name = self.get_or_create_font_ref(page)?;
        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size,
            color,
        };
        let operators = generate_text_operators(&hex_string(&bytes), x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image stretched into a box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (PNG or JPEG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate of the box's left edge in points
    /// * `y` - Y coordinate of the box's bottom edge in points
    /// * `width` - Box width in points
    /// * `height` - Box height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let image_resource_name = self.get_or_create_image_ref(data, page)?;
        let operators = generate_image_operators(&image_resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Write buffered content and resource references into the page tree
    fn finalize(&mut self) -> Result<()> {
        self.flush_content_buffers()?;
        self.finalize_page_resources()
    }

    /// Look up the object ID of a page (1-indexed)
    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get or create the font resource name for a page
    ///
    /// The name is recorded now and added to the page resources at save time.
    fn get_or_create_font_ref(&mut self, page: usize) -> Result<String> {
        if let Some(name) = self.page_font_resources.get(&page) {
            return Ok(name.clone());
        }

        let existing = self.resource_names(page, b"Font")?;
        let name = loop {
            let candidate = format!("FF{}", self.next_font_resource);
            self.next_font_resource += 1;
            if !existing.contains(&candidate) {
                break candidate;
            }
        };

        self.page_font_resources.insert(page, name.clone());
        Ok(name)
    }

    /// Get or create an image resource name for a page
    ///
    /// Images are deduplicated by a hash of their bytes.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(id) => *id,
            None => {
                let xobject = ImageXObject::decode(data)?;
                let id = self.inner.add_object(xobject.to_pdf_stream());
                self.embedded_images.insert(data_hash, id);
                id
            }
        };

        if let Some(resources) = self.page_image_resources.get(&page) {
            if let Some((name, _)) = resources.iter().find(|(_, id)| **id == object_id) {
                return Ok(name.clone());
            }
        }

        let existing = self.resource_names(page, b"XObject")?;
        let name = loop {
            let candidate = format!("FIm{}", self.next_image_resource);
            self.next_image_resource += 1;
            if !existing.contains(&candidate) {
                break candidate;
            }
        };

        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(name.clone(), object_id);

        Ok(name)
    }

    /// Names already used in one category (`Font`, `XObject`) of a page's resources
    fn resource_names(&self, page: usize, category: &[u8]) -> Result<Vec<String>> {
        let page_id = self.page_id(page)?;
        let resources = self.resolved_resources(page_id)?;
        let names = match resources.get(category) {
            Ok(obj) => match self.resolve_dict(obj) {
                Some(dict) => dict
                    .iter()
                    .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
                    .collect(),
                None => Vec::new(),
            },
            Err(_) => Vec::new(),
        };
        Ok(names)
    }

    /// Resolve an object to a dictionary, following one reference
    fn resolve_dict(&self, obj: &Object) -> Option<Dictionary> {
        match obj {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .cloned(),
            _ => None,
        }
    }

    /// The effective Resources dictionary of a page
    ///
    /// Follows references and `/Parent` inheritance; returns an owned copy.
    fn resolved_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(self.resolve_dict(resources).unwrap_or_default());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let obj = self.inner.get_object(current_id)?;
            let dict = obj
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let media_box_array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
                };
                return Ok(media_box_array);
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }

            break;
        }

        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(A4_WIDTH as f32),
            Object::Real(A4_HEIGHT as f32),
        ])
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    ///
    /// Each page gets exactly one new content stream: the original content
    /// wrapped in `q ... Q`, followed by the buffered operators.
    fn flush_content_buffers(&mut self) -> Result<()> {
        let mut buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();
        buffers.sort_by_key(|(page, _)| *page);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// Handles single streams, references and arrays of streams.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let (existing_content, page_dict_clone) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            let existing_content = match page_dict.get(b"Contents") {
                Ok(Object::Stream(stream)) => stream_bytes(stream),
                Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                    Ok(Object::Stream(stream)) => stream_bytes(stream),
                    _ => Vec::new(),
                },
                Ok(Object::Array(arr)) => {
                    let mut combined = Vec::new();
                    for obj in arr {
                        let data = match obj {
                            Object::Reference(ref_id) => match self.inner.get_object(*ref_id) {
                                Ok(Object::Stream(stream)) => stream_bytes(stream),
                                _ => continue,
                            },
                            Object::Stream(stream) => stream_bytes(stream),
                            _ => continue,
                        };
                        combined.extend_from_slice(&data);
                        // streams in an array are separate lexical units
                        combined.push(b'\n');
                    }
                    combined
                }
                _ => Vec::new(),
            };

            (existing_content, page_dict.clone())
        };

        let mut new_content = Vec::with_capacity(existing_content.len() + content.len() + 8);
        if !existing_content.is_empty() {
            new_content.extend_from_slice(b"q\n");
            new_content.extend_from_slice(&existing_content);
            new_content.extend_from_slice(b"\nQ\n");
        }
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let mut new_page_dict = page_dict_clone;
        new_page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Add font and image references to the pages that use them
    fn finalize_page_resources(&mut self) -> Result<()> {
        let font_pages: Vec<(usize, String)> = self
            .page_font_resources
            .drain()
            .collect();
        let image_pages: Vec<(usize, HashMap<String, ObjectId>)> =
            self.page_image_resources.drain().collect();

        let font_id = self.base_font.map(|(_, id)| id);

        let mut pages: Vec<usize> = font_pages
            .iter()
            .map(|(p, _)| *p)
            .chain(image_pages.iter().map(|(p, _)| *p))
            .collect();
        pages.sort_unstable();
        pages.dedup();

        for page in pages {
            let page_id = self.page_id(page)?;
            let mut resources = self.resolved_resources(page_id)?;

            if let Some((_, resource_name)) = font_pages.iter().find(|(p, _)| *p == page) {
                let font_id = font_id.ok_or(PdfError::FontNotSet)?;
                let mut font_dict = resources
                    .get(b"Font")
                    .ok()
                    .and_then(|obj| self.resolve_dict(obj))
                    .unwrap_or_default();
                font_dict.set(resource_name.as_bytes(), Object::Reference(font_id));
                resources.set(b"Font", Object::Dictionary(font_dict));
            }

            if let Some((_, images)) = image_pages.iter().find(|(p, _)| *p == page) {
                let mut xobject_dict = resources
                    .get(b"XObject")
                    .ok()
                    .and_then(|obj| self.resolve_dict(obj))
                    .unwrap_or_default();
                for (name, id) in images {
                    xobject_dict.set(name.as_bytes(), Object::Reference(*id));
                }
                resources.set(b"XObject", Object::Dictionary(xobject_dict));
            }

            let mut page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?
                .clone();
            page_dict.set(b"Resources", Object::Dictionary(resources));
            self.inner.objects.insert(page_id, page_dict.into());
        }

        Ok(())
    }
}

/// Decompressed bytes of a content stream
fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Convert a lopdf numeric object (Integer or Real) to f64
pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Extract width and height from a MediaBox array
fn extract_size_from_media_box(media_box: &[Object]) -> Result<PageSize> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let coord = |i: usize| {
        object_to_f64(&media_box[i])
            .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
    };
    let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);

    Ok(PageSize {
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    })
}

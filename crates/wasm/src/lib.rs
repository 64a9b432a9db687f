//! WASM bindings for formfill
//!
//! This crate provides a JavaScript-friendly API for:
//! - Loading a PDF template and a saved mapping
//! - Listing the image URLs a record needs, so the host can fetch them
//! - Filling one record (PDF) or many (ZIP) with the same engine the
//!   fill service runs
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { FormFiller } from 'filler-wasm';
//!
//! await init();
//!
//! const filler = new FormFiller(templateBytes, JSON.stringify(mapping));
//!
//! for (const url of filler.imageUrls(record)) {
//!   const res = await fetch(url);
//!   if (res.ok) filler.addAsset(url, new Uint8Array(await res.arrayBuffer()));
//! }
//!
//! const pdf = filler.fill(record);
//! download(pdf, FormFiller.fileName(record));
//! ```

use filler::naming::{single_file_name, ARCHIVE_FILE_NAME};
use filler::{AssetBundle, DocumentFiller, FillError, Mapping, Record};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: FillError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json(value: JsValue) -> Result<serde_json::Value, JsValue> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn to_record(value: JsValue) -> Result<Record, JsValue> {
    Record::from_value(to_json(value)?).map_err(js_error)
}

fn to_records(value: JsValue) -> Result<Vec<Record>, JsValue> {
    match to_json(value)? {
        serde_json::Value::Array(values) => values
            .into_iter()
            .map(|v| Record::from_value(v).map_err(js_error))
            .collect(),
        _ => Err(JsValue::from_str("records must be an array")),
    }
}

/// Fills one template with one mapping
#[wasm_bindgen]
pub struct FormFiller {
    template: Vec<u8>,
    mapping: Mapping,
    assets: AssetBundle,
    filler: DocumentFiller,
}

impl FormFiller {
    fn create(template: &[u8], mapping: Mapping) -> filler::Result<FormFiller> {
        if template.is_empty() {
            return Err(FillError::TemplateParse("template is empty".to_string()));
        }
        Ok(FormFiller {
            template: template.to_vec(),
            mapping,
            assets: AssetBundle::new(),
            filler: DocumentFiller::new(),
        })
    }

    fn fill_record(&self, record: &Record) -> filler::Result<Vec<u8>> {
        self.filler
            .fill(&self.template, record, &self.mapping, &self.assets)
    }

    fn fill_records(&self, records: &[Record]) -> filler::Result<Vec<u8>> {
        self.filler
            .fill_archive(&self.template, records, &self.mapping, &self.assets)
    }
}

#[wasm_bindgen]
impl FormFiller {
    /// Create a filler from template bytes and mapping JSON
    ///
    /// @param template - PDF file bytes (Uint8Array)
    /// @param mappingJson - `{ fields, uiW, uiH }` or a saved `{ mapping: {...} }` row
    #[wasm_bindgen(constructor)]
    pub fn new(template: &[u8], mapping_json: &str) -> Result<FormFiller, JsValue> {
        let mapping = Mapping::from_json(mapping_json).map_err(js_error)?;
        FormFiller::create(template, mapping).map_err(js_error)
    }

    /// Create a filler from template bytes and a mapping object
    #[wasm_bindgen(js_name = fromMapping)]
    pub fn from_mapping(template: &[u8], mapping: JsValue) -> Result<FormFiller, JsValue> {
        let mapping = Mapping::from_value(to_json(mapping)?).map_err(js_error)?;
        FormFiller::create(template, mapping).map_err(js_error)
    }

    /// Supply the bytes of an image fetched by the host
    ///
    /// @param url - The URL as returned by `imageUrls`
    /// @param data - PNG or JPEG bytes (Uint8Array)
    #[wasm_bindgen(js_name = addAsset)]
    pub fn add_asset(&mut self, url: &str, data: &[u8]) {
        self.assets.insert(url, data.to_vec());
    }

    /// Image URLs the record's image fields point at, in mapping order
    ///
    /// @param record - Submission object
    /// @returns Array of URLs
    #[wasm_bindgen(js_name = imageUrls)]
    pub fn image_urls(&self, record: JsValue) -> Result<js_sys::Array, JsValue> {
        let record = to_record(record)?;
        Ok(AssetBundle::image_urls(&self.mapping, &record)
            .into_iter()
            .map(|url| JsValue::from_str(&url))
            .collect())
    }

    /// Fill the template for one record
    ///
    /// Image fields whose bytes were never added are left blank.
    ///
    /// @param record - Submission object
    /// @returns PDF bytes (Uint8Array)
    pub fn fill(&self, record: JsValue) -> Result<Vec<u8>, JsValue> {
        let record = to_record(record)?;
        self.fill_record(&record).map_err(js_error)
    }

    /// Fill the template for every record and pack the PDFs into a ZIP
    ///
    /// @param records - Array of submission objects
    /// @returns ZIP bytes (Uint8Array)
    #[wasm_bindgen(js_name = fillBulk)]
    pub fn fill_bulk(&self, records: JsValue) -> Result<Vec<u8>, JsValue> {
        let records = to_records(records)?;
        self.fill_records(&records).map_err(js_error)
    }

    /// Download name for a single-record PDF
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(record: JsValue) -> Result<String, JsValue> {
        Ok(single_file_name(&to_record(record)?))
    }

    /// Download name for a bulk archive
    #[wasm_bindgen(js_name = archiveFileName)]
    pub fn archive_file_name() -> String {
        ARCHIVE_FILE_NAME.to_string()
    }
}

//! Mapping schema types
//!
//! A mapping is what the visual editor saves: named fields dropped onto a
//! rendered template page, in that page's pixel space.

use crate::record::SIGNATURE_FIELD;
use crate::{FillError, Result, DEFAULT_FONT_SIZE, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// What a field draws, carrying only the sizes that kind needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Text drawn at `font_size` points (never scaled)
    Text { font_size: f64 },
    /// An image stretched into a `width` x `height` pixel box.
    /// Only the reserved signature field embeds one; any other field of this
    /// kind draws its value as text at the default size.
    Image { width: f64, height: f64 },
}

impl FieldKind {
    /// A text field with the default font size
    pub fn text() -> Self {
        FieldKind::Text {
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// An image field with the default box size
    pub fn image() -> Self {
        FieldKind::Image {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, FieldKind::Image { .. })
    }
}

impl Default for FieldKind {
    fn default() -> Self {
        Self::text()
    }
}

/// One placed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct MappingField {
    /// Record key the value is read from
    pub name: String,

    /// Left edge in authoring pixels
    pub x: f64,

    /// Top edge in authoring pixels (from top)
    pub y: f64,

    /// Page index (0-based). Missing or unusable values fall back to the first page.
    pub page: Option<i64>,

    /// Text or image
    pub kind: FieldKind,
}

impl MappingField {
    /// Text field on the first page with the default font size
    pub fn text(name: &str, x: f64, y: f64) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            page: None,
            kind: FieldKind::text(),
        }
    }

    /// Image field on the first page with the default box
    pub fn image(name: &str, x: f64, y: f64) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            page: None,
            kind: FieldKind::image(),
        }
    }

    /// Place on a page (0-based)
    pub fn on_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Replace the kind
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the field embeds an image rather than drawing text
    pub fn draws_image(&self) -> bool {
        self.kind.is_image() && self.name == SIGNATURE_FIELD
    }
}

/// Flat field shape as written by the editor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawField {
    #[serde(default)]
    name: String,

    #[serde(default, deserialize_with = "lenient_number")]
    x: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    y: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_number", serialize_with = "whole_number")]
    page: Option<f64>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_string")]
    kind: Option<String>,

    #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_number")]
    font_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    w: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    h: Option<f64>,
}

impl From<RawField> for MappingField {
    fn from(raw: RawField) -> Self {
        let kind = match raw.kind.as_deref() {
            Some("image") => FieldKind::Image {
                width: positive_or(raw.w, DEFAULT_IMAGE_WIDTH),
                height: positive_or(raw.h, DEFAULT_IMAGE_HEIGHT),
            },
            // unknown kinds draw as text
            _ => FieldKind::Text {
                font_size: positive_or(raw.font_size, DEFAULT_FONT_SIZE),
            },
        };

        let page = raw
            .page
            .filter(|p| p.fract() == 0.0 && p.abs() <= i64::MAX as f64)
            .map(|p| p as i64);

        MappingField {
            name: raw.name,
            x: raw.x.unwrap_or(0.0),
            y: raw.y.unwrap_or(0.0),
            page,
            kind,
        }
    }
}

impl From<MappingField> for RawField {
    fn from(field: MappingField) -> Self {
        let mut raw = RawField {
            name: field.name,
            x: Some(field.x),
            y: Some(field.y),
            page: field.page.map(|p| p as f64),
            ..Default::default()
        };
        match field.kind {
            FieldKind::Text { font_size } => {
                raw.kind = Some("text".to_string());
                raw.font_size = Some(font_size);
            }
            FieldKind::Image { width, height } => {
                raw.kind = Some("image".to_string());
                raw.w = Some(width);
                raw.h = Some(height);
            }
        }
        raw
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// Accept numbers and numeric strings; anything else is absent
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn whole_number<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_i64(*v as i64),
        None => serializer.serialize_none(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// `null` reads the same as a missing value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Authoring dimensions are only meaningful when positive
fn positive_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.filter(|v| *v > 0.0))
}

/// A saved field placement configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Fields in draw order
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<MappingField>,

    /// Authoring viewport width in pixels
    #[serde(rename = "uiW", default, skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "positive_number")]
    pub ui_width: Option<f64>,

    /// Authoring viewport height in pixels
    #[serde(rename = "uiH", default, skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "positive_number")]
    pub ui_height: Option<f64>,
}

impl Mapping {
    /// Create a mapping authored at `ui_width` x `ui_height` pixels
    pub fn new(fields: Vec<MappingField>, ui_width: f64, ui_height: f64) -> Self {
        Self {
            fields,
            ui_width: Some(ui_width),
            ui_height: Some(ui_height),
        }
    }

    /// Parse a mapping from JSON.
    ///
    /// Accepts the mapping itself or a saved row wrapping it as `{"mapping": {...}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Same as [`Mapping::from_json`] for an already parsed value
    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut obj) if !obj.contains_key("fields") && obj.contains_key("mapping") => {
                obj.remove("mapping").unwrap_or(Value::Null)
            }
            other => other,
        };

        if !value.is_object() {
            return Err(FillError::InvalidMapping(
                "expected a JSON object".to_string(),
            ));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Check what the editor should never save
    pub fn validate(&self) -> Result<()> {
        for dim in [self.ui_width, self.ui_height].into_iter().flatten() {
            if !dim.is_finite() || dim <= 0.0 {
                return Err(FillError::InvalidMapping(format!(
                    "authoring dimensions must be positive, got {dim}"
                )));
            }
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(FillError::InvalidMapping(format!("field {i} has no name")));
            }
            if !field.x.is_finite() || !field.y.is_finite() || field.x < 0.0 || field.y < 0.0 {
                return Err(FillError::InvalidMapping(format!(
                    "field '{}' has an invalid position ({}, {})",
                    field.name, field.x, field.y
                )));
            }
        }

        Ok(())
    }

    /// Whether any field draws an image
    pub fn has_image_fields(&self) -> bool {
        self.fields.iter().any(MappingField::draws_image)
    }
}

/// A named mapping as kept by mapping storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub name: String,
    pub mapping: Mapping,
    pub updated_at: DateTime<Utc>,
}

impl MappingRecord {
    /// Stamp a mapping with the current time
    pub fn new(name: &str, mapping: Mapping) -> Self {
        Self {
            name: name.to_string(),
            mapping,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_editor_mapping() {
        let mapping = Mapping::from_json(
            r#"{
                "fields": [
                    {"name": "full_name", "x": 50, "y": 100, "fontSize": 14, "type": "text", "w": 120, "h": 48, "page": 0},
                    {"name": "signature_url", "x": 40, "y": 600, "fontSize": 12, "type": "image", "w": 200, "h": 60, "page": 1}
                ],
                "uiW": 600,
                "uiH": 800
            }"#,
        )
        .unwrap();

        assert_eq!(mapping.ui_width, Some(600.0));
        assert_eq!(mapping.ui_height, Some(800.0));
        assert_eq!(
            mapping.fields,
            vec![
                MappingField::text("full_name", 50.0, 100.0)
                    .on_page(0)
                    .with_kind(FieldKind::Text { font_size: 14.0 }),
                MappingField::image("signature_url", 40.0, 600.0)
                    .on_page(1)
                    .with_kind(FieldKind::Image {
                        width: 200.0,
                        height: 60.0
                    }),
            ]
        );
    }

    #[test]
    fn test_defaults_apply_to_missing_and_falsy_values() {
        let mapping = Mapping::from_value(json!({
            "fields": [
                {"name": "a", "x": 1, "y": 2},
                {"name": "b", "x": 1, "y": 2, "type": "image", "w": 0, "h": null},
                {"name": "c", "x": 1, "y": 2, "fontSize": -3, "page": 1.5},
            ],
            "uiW": 0
        }))
        .unwrap();

        assert_eq!(mapping.ui_width, None);
        assert_eq!(mapping.ui_height, None);
        assert_eq!(mapping.fields[0].kind, FieldKind::text());
        assert_eq!(mapping.fields[0].page, None);
        assert_eq!(mapping.fields[1].kind, FieldKind::image());
        assert_eq!(mapping.fields[2].kind, FieldKind::text());
        assert_eq!(mapping.fields[2].page, None);
    }

    #[test]
    fn test_null_fields_are_empty() {
        let mapping = Mapping::from_json(r#"{"fields": null, "uiW": 600}"#).unwrap();
        assert!(mapping.fields.is_empty());
        assert_eq!(mapping.ui_width, Some(600.0));
    }

    #[test]
    fn test_unknown_type_is_text() {
        let mapping = Mapping::from_value(json!({
            "fields": [{"name": "a", "x": 1, "y": 2, "type": "checkbox", "fontSize": 9}]
        }))
        .unwrap();
        assert_eq!(mapping.fields[0].kind, FieldKind::Text { font_size: 9.0 });
    }

    #[test]
    fn test_wrapped_mapping() {
        let mapping = Mapping::from_json(
            r#"{"name": "default", "mapping": {"fields": [{"name": "a", "x": 1, "y": 2}], "uiW": 10, "uiH": 20}}"#,
        )
        .unwrap();
        assert_eq!(mapping.fields.len(), 1);
        assert_eq!(mapping.ui_height, Some(20.0));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            Mapping::from_json("[1, 2]"),
            Err(FillError::InvalidMapping(_))
        ));
    }

    #[test]
    fn test_serialize_flat_shape() {
        let mapping = Mapping::new(
            vec![
                MappingField::text("full_name", 50.0, 100.0),
                MappingField::image("signature_url", 10.0, 20.0).on_page(2),
            ],
            600.0,
            800.0,
        );

        let value = serde_json::to_value(&mapping).unwrap();
        assert_eq!(
            value,
            json!({
                "fields": [
                    {"name": "full_name", "x": 50.0, "y": 100.0, "type": "text", "fontSize": 12.0},
                    {"name": "signature_url", "x": 10.0, "y": 20.0, "page": 2, "type": "image", "w": 120.0, "h": 48.0}
                ],
                "uiW": 600.0,
                "uiH": 800.0
            })
        );

        let back: Mapping = serde_json::from_value(value).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_only_signature_field_draws_image() {
        assert!(MappingField::image(SIGNATURE_FIELD, 0.0, 0.0).draws_image());
        assert!(!MappingField::image("photo", 0.0, 0.0).draws_image());
        assert!(!MappingField::text(SIGNATURE_FIELD, 0.0, 0.0).draws_image());

        let photo_only = Mapping::new(vec![MappingField::image("photo", 0.0, 0.0)], 1.0, 1.0);
        assert!(!photo_only.has_image_fields());
    }

    #[test]
    fn test_validate() {
        let good = Mapping::new(vec![MappingField::text("a", 0.0, 0.0)], 600.0, 800.0);
        assert!(good.validate().is_ok());

        let unnamed = Mapping::new(vec![MappingField::text(" ", 0.0, 0.0)], 600.0, 800.0);
        assert!(unnamed.validate().is_err());

        let negative = Mapping::new(vec![MappingField::text("a", -1.0, 0.0)], 600.0, 800.0);
        assert!(negative.validate().is_err());

        let zero_ui = Mapping::new(vec![], 0.0, 800.0);
        assert!(zero_ui.validate().is_err());
    }

    #[test]
    fn test_mapping_record_roundtrip() {
        let record = MappingRecord::new("default", Mapping::default());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"updated_at\""));
        let back: MappingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

//! Image handling for PDF documents

use crate::{fmt_num, PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use lopdf::{dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: String,
    /// Raw image data (compressed)
    pub data: Vec<u8>,
}

/// Get JPEG info including dimensions and color components
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::ImageError("Missing JPEG SOI marker".to_string()));
    }

    // SOF segment structure:
    // - 2 bytes: marker (0xFF, 0xC0-0xCF)
    // - 2 bytes: segment length
    // - 1 byte: precision
    // - 2 bytes: height
    // - 2 bytes: width
    // - 1 byte: number of components (1=grayscale, 3=YCbCr, 4=CMYK)
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF markers (baseline, progressive, etc.), excluding DHT/JPG/DAC
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            if width == 0 || height == 0 {
                break;
            }
            return Ok(JpegInfo {
                width,
                height,
                num_components,
            });
        }

        // Skip to next marker
        if i + 4 < data.len() {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            if length < 2 {
                break;
            }
            i += 2 + length;
        } else {
            break;
        }
    }

    Err(PdfError::ImageError(
        "Could not parse JPEG info".to_string(),
    ))
}

impl ImageXObject {
    /// Decode image bytes, trying PNG first and JPEG second
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::from_png(data).or_else(|png_err| {
            Self::from_jpeg(data).map_err(|jpeg_err| {
                PdfError::ImageError(format!(
                    "not a PNG ({png_err}) and not a JPEG ({jpeg_err})"
                ))
            })
        })
    }

    /// Create XObject from JPEG data
    ///
    /// JPEG images can be embedded directly with DCTDecode filter.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
        })
    }

    /// Create XObject from PNG data
    ///
    /// Samples are stored raw behind FlateDecode. Transparent pixels are
    /// composited onto white since the XObject carries no soft mask.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let decoder =
            ImageReader::with_format(Cursor::new(data), ImageFormat::Png).into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let gray = matches!(
            color_type,
            ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16
        );
        let samples = if gray {
            flatten_alpha(image.to_luma_alpha8().pixels().map(|p| p.0), 1)
        } else {
            flatten_alpha(image.to_rgba8().pixels().map(|p| p.0), 3)
        };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&samples)?;

        Ok(Self {
            width,
            height,
            color_space: if gray { "DeviceGray" } else { "DeviceRGB" }.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: encoder.finish()?,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => Object::Name(self.color_space.clone().into_bytes()),
            "BitsPerComponent" => self.bits_per_component as i64,
            "Filter" => Object::Name(self.filter.clone().into_bytes()),
            "Length" => self.data.len() as i64,
        };

        // Already compressed; lopdf must not compress it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Composite `[channels..., alpha]` pixels onto white, dropping alpha
fn flatten_alpha<const N: usize>(
    pixels: impl Iterator<Item = [u8; N]>,
    channels: usize,
) -> Vec<u8> {
    pixels
        .flat_map(|p| {
            let alpha = p[channels] as u32;
            (0..channels).map(move |c| ((p[c] as u32 * alpha + 255 * (255 - alpha)) / 255) as u8)
        })
        .collect()
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "FIm1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{image_name} Do\nQ\n",
        fmt_num(width),
        fmt_num(height),
        fmt_num(x),
        fmt_num(y)
    )
    .into_bytes()
}

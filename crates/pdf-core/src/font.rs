//! Base font handling for PDF documents
//!
//! Filled fields are drawn with a single standard Type1 font. Standard fonts
//! are never embedded; the viewer supplies the glyphs, so text must be
//! encoded into the font's single-byte WinAnsi code page.

use lopdf::{Dictionary, Object};

/// Upper half of WinAnsiEncoding that differs from Latin-1 (0x80..=0x9F)
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Byte used for characters the code page cannot represent
const REPLACEMENT: u8 = b'?';

/// The standard font used for every filled text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseFont {
    /// PostScript name of the standard font
    pub base_name: &'static str,
}

impl BaseFont {
    /// Helvetica, the default sans-serif standard font
    pub const HELVETICA: BaseFont = BaseFont {
        base_name: "Helvetica",
    };

    /// Build the font dictionary referenced from page resources
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set(
            "BaseFont",
            Object::Name(self.base_name.as_bytes().to_vec()),
        );
        dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        dict
    }
}

impl Default for BaseFont {
    fn default() -> Self {
        Self::HELVETICA
    }
}

/// Encode text into WinAnsi bytes.
///
/// Returns the encoded bytes and the number of characters that had to be
/// replaced with `?`. Tabs and line breaks become spaces since fields are
/// drawn on a single line.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;

    for c in text.chars() {
        let code = c as u32;
        let byte = match c {
            '\t' | '\n' | '\r' => Some(b' '),
            _ if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) => {
                Some(code as u8)
            }
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(_, ch)| *ch == c)
                .map(|(b, _)| *b),
        };

        match byte {
            Some(b) => bytes.push(b),
            None => {
                bytes.push(REPLACEMENT);
                replaced += 1;
            }
        }
    }

    (bytes, replaced)
}

/// Decode WinAnsi bytes back into text
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WIN_ANSI_HIGH
                .iter()
                .find(|(code, _)| *code == b)
                .map(|(_, c)| *c)
                .unwrap_or('\u{FFFD}'),
            _ => b as char,
        })
        .collect()
}

/// Encode bytes as a PDF hex string (e.g. `<4A616E65>`)
pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 2);
    out.push('<');
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out.push('>');
    out
}

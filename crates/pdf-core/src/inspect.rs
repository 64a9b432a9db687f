//! Read back what a document draws.
//!
//! Walks each page's content stream and reports every text show and every
//! XObject placement in page space. Only the operators this crate emits are
//! interpreted; everything else is skipped.

use crate::document::object_to_f64;
use crate::font::decode_win_ansi;
use crate::{PdfError, Result};
use lopdf::content::Content;
use lopdf::{Document, Object};

/// Something drawn on a page
#[derive(Debug, Clone, PartialEq)]
pub enum DrawnItem {
    /// A text show operation, positioned at its baseline origin
    Text {
        page: usize,
        x: f64,
        y: f64,
        font_size: f64,
        text: String,
    },
    /// An XObject painted into the box `(x, y, width, height)`
    Image {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl DrawnItem {
    /// Page number (1-indexed)
    pub fn page(&self) -> usize {
        match self {
            DrawnItem::Text { page, .. } | DrawnItem::Image { page, .. } => *page,
        }
    }

    /// Compare two items, allowing `tolerance` on every number
    pub fn approx_eq(&self, other: &DrawnItem, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        match (self, other) {
            (
                DrawnItem::Text { page: p1, x: x1, y: y1, font_size: s1, text: t1 },
                DrawnItem::Text { page: p2, x: x2, y: y2, font_size: s2, text: t2 },
            ) => p1 == p2 && t1 == t2 && close(*x1, *x2) && close(*y1, *y2) && close(*s1, *s2),
            (
                DrawnItem::Image { page: p1, x: x1, y: y1, width: w1, height: h1 },
                DrawnItem::Image { page: p2, x: x2, y: y2, width: w2, height: h2 },
            ) => {
                p1 == p2 && close(*x1, *x2) && close(*y1, *y2) && close(*w1, *w2) && close(*h1, *h2)
            }
            _ => false,
        }
    }
}

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `a` then `b`
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(object_to_f64).collect()
}

fn shown_text(operands: &[Object]) -> Option<String> {
    let mut bytes = Vec::new();
    for operand in operands {
        match operand {
            Object::String(s, _) => bytes.extend_from_slice(s),
            Object::Array(items) => {
                for item in items {
                    if let Object::String(s, _) = item {
                        bytes.extend_from_slice(s);
                    }
                }
            }
            _ => {}
        }
    }
    if bytes.is_empty() {
        None
    } else {
        Some(decode_win_ansi(&bytes))
    }
}

/// List everything drawn in a saved document, page by page in stream order
pub fn drawn_items(pdf: &[u8]) -> Result<Vec<DrawnItem>> {
    let doc = Document::load_mem(pdf).map_err(|e| PdfError::OpenError(e.to_string()))?;
    let mut items = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let content = doc.get_page_content(page_id)?;
        let content =
            Content::decode(&content).map_err(|e| PdfError::ParseError(e.to_string()))?;
        collect_page(page_number as usize, &content, &mut items);
    }

    Ok(items)
}

fn collect_page(page: usize, content: &Content, items: &mut Vec<DrawnItem>) {
    let mut ctm = IDENTITY;
    let mut stack: Vec<Matrix> = Vec::new();
    let mut line_matrix = IDENTITY;
    let mut font_size = 0.0;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => ctm = stack.pop().unwrap_or(IDENTITY),
            "cm" => {
                if let [a, b, c, d, e, f] = numbers(&op.operands)[..] {
                    ctm = multiply(&[a, b, c, d, e, f], &ctm);
                }
            }
            "BT" => line_matrix = IDENTITY,
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(object_to_f64) {
                    font_size = size;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty] = numbers(&op.operands)[..] {
                    line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &line_matrix);
                }
            }
            "Tm" => {
                if let [a, b, c, d, e, f] = numbers(&op.operands)[..] {
                    line_matrix = [a, b, c, d, e, f];
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if let Some(text) = shown_text(&op.operands) {
                    let origin = multiply(&line_matrix, &ctm);
                    items.push(DrawnItem::Text {
                        page,
                        x: origin[4],
                        y: origin[5],
                        font_size,
                        text,
                    });
                }
            }
            "Do" => {
                items.push(DrawnItem::Image {
                    page,
                    x: ctm[4],
                    y: ctm[5],
                    width: ctm[0],
                    height: ctm[3],
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use pretty_assertions::assert_eq;

    fn int(v: i64) -> Object {
        Object::Integer(v)
    }

    #[test]
    fn test_collect_text_and_image() {
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("cm", vec![int(2), int(0), int(0), int(2), int(0), int(0)]),
                Operation::new("Q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"FF1".to_vec()), int(12)]),
                Operation::new("Td", vec![int(51), int(681)]),
                Operation::new("Tj", vec![Object::string_literal("Jane Doe")]),
                Operation::new("ET", vec![]),
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![int(120), int(0), int(0), int(48), int(10), int(20)],
                ),
                Operation::new("Do", vec![Object::Name(b"FIm1".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };

        let mut items = Vec::new();
        collect_page(1, &content, &mut items);

        assert_eq!(
            items,
            vec![
                DrawnItem::Text {
                    page: 1,
                    x: 51.0,
                    y: 681.0,
                    font_size: 12.0,
                    text: "Jane Doe".to_string(),
                },
                DrawnItem::Image {
                    page: 1,
                    x: 10.0,
                    y: 20.0,
                    width: 120.0,
                    height: 48.0,
                },
            ]
        );
    }

    #[test]
    fn test_approx_eq() {
        let a = DrawnItem::Image { page: 1, x: 1.0, y: 2.0, width: 3.0, height: 4.0 };
        let b = DrawnItem::Image { page: 1, x: 1.0005, y: 2.0, width: 3.0, height: 4.0 };
        assert!(a.approx_eq(&b, 1e-3));
        assert!(!a.approx_eq(&b, 1e-4));
    }
}

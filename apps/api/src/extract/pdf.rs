//! PDF page-by-page text reconstruction.
//!
//! Each text-showing operator (`Tj`, `TJ`, `'`, `"`) yields one text item, and each
//! end of a text object (`ET`) yields an empty end-of-line item. Items of a page are
//! joined with single spaces and every page is terminated by `\n`. No layout, column,
//! or reading-order reconstruction beyond content-stream order.
//!
//! String operands are decoded through the encoding of the font selected by the last
//! `Tf`: WinAnsi/MacRoman/Standard tables for simple fonts, the `ToUnicode` CMap for
//! Identity-H composite fonts.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::debug;

pub fn read_pdf(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).context("invalid PDF document")?;

    let mut text = String::new();
    // get_pages() is keyed by 1-based page number, so iteration is in page order.
    for (page_number, page_id) in doc.get_pages() {
        let raw = doc
            .get_page_content(page_id)
            .with_context(|| format!("failed to read content of page {page_number}"))?;
        let content = Content::decode(&raw)
            .with_context(|| format!("failed to decode content of page {page_number}"))?;
        let fonts = page_font_encodings(&doc, page_id);

        text.push_str(&page_items(&content.operations, &fonts).join(" "));
        text.push('\n');
    }

    Ok(text)
}

/// Encodings of the fonts in a page's resources, keyed by resource name (`F1`).
/// Fonts whose encoding lopdf cannot build are left out.
fn page_font_encodings(doc: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, Encoding<'_>> {
    let fonts = match doc.get_page_fonts(page_id) {
        Ok(fonts) => fonts,
        Err(e) => {
            debug!("No readable fonts on page {page_id:?}: {e}");
            return BTreeMap::new();
        }
    };
    fonts
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("Font {} has no usable encoding: {e}", String::from_utf8_lossy(&name));
                None
            }
        })
        .collect()
}

fn page_items(operations: &[Operation], fonts: &BTreeMap<Vec<u8>, Encoding<'_>>) -> Vec<String> {
    let mut items = Vec::new();
    let mut encoding = None;
    for operation in operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| fonts.get(name));
            }
            // `'` and `"` carry the string as their last operand.
            "Tj" | "'" | "\"" => {
                if let Some(Object::String(bytes, _)) = operation.operands.last() {
                    items.push(decode_with_font(encoding, bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operation.operands.first() {
                    items.push(collect_tj_array(parts, encoding));
                }
            }
            "ET" => items.push(String::new()),
            _ => {}
        }
    }
    items
}

fn collect_tj_array(parts: &[Object], encoding: Option<&Encoding<'_>>) -> String {
    let mut item = String::new();
    for part in parts {
        match part {
            Object::String(bytes, _) => item.push_str(&decode_with_font(encoding, bytes)),
            // Kerning below -100 thousandths of a text-space unit is a word gap.
            Object::Integer(_) | Object::Real(_) => {
                if part.as_float().map(|v| v < -100.0).unwrap_or(false) {
                    item.push(' ');
                }
            }
            _ => {}
        }
    }
    item
}

fn decode_with_font(encoding: Option<&Encoding<'_>>, bytes: &[u8]) -> String {
    match encoding.map(|encoding| Document::decode_text(encoding, bytes)) {
        Some(Ok(text)) => text,
        _ => decode_pdf_string(bytes),
    }
}

/// Fallback for strings shown without a decodable font: UTF-16BE when it carries a byte-order mark,
/// otherwise one byte per character.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xfe, 0xff]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

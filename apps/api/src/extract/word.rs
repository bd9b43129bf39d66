//! Raw-text extraction from word-processing documents.
//!
//! Only the OOXML package format is readable. The body part (`word/document.xml`) is
//! streamed and every `w:t` run is kept; each paragraph ends with a blank line.

use std::io::{Cursor, Read};

use anyhow::{bail, Context, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Compound File Binary signature used by legacy `.doc` files.
const CFB_SIGNATURE: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

const DOCUMENT_PART: &str = "word/document.xml";

pub fn read_word(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&CFB_SIGNATURE) {
        bail!("legacy binary Word documents are not supported; save the file as .docx");
    }

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("not a valid Word document package")?;

    let mut xml = String::new();
    {
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .with_context(|| format!("document package has no {DOCUMENT_PART}"))?;
        part.read_to_string(&mut xml)
            .with_context(|| format!("failed to read {DOCUMENT_PART}"))?;
    }

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event().context("malformed document XML")? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                // A self-closing paragraph is still a paragraph.
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                let decoded = e.decode().context("malformed text run")?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(reference) if in_text_run => {
                if let Some(ch) = reference.resolve_char_ref().context("malformed character reference")? {
                    text.push(ch);
                } else {
                    let name = reference.decode().context("malformed entity reference")?;
                    if let Some(resolved) = resolve_predefined_entity(&name) {
                        text.push_str(resolved);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

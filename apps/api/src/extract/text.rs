use anyhow::{Context, Result};

const UTF8_BOM: &str = "\u{feff}";

/// Reads raw bytes as UTF-8 text. A leading byte-order mark is dropped.
pub fn read_text(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).context("file is not valid UTF-8 text")?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
}

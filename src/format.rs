use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::parser::Listing;

/// Indent unit inside each entry.
const FIELD_INDENT: &[u8] = b"                ";
/// Prefix of every entry line, matching the array in the target file.
const ENTRY_PREFIX: &str = "            ";

/// Render listings as comma-terminated array elements, one per entry.
pub fn format_listings(listings: &[Listing]) -> serde_json::Result<String> {
    let mut out = String::new();
    for listing in listings {
        let entry = render_entry(listing)?;
        for (i, line) in entry.lines().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(ENTRY_PREFIX);
            out.push_str(line);
        }
        out.push_str(",\n");
    }
    Ok(out)
}

fn render_entry(listing: &Listing) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(FIELD_INDENT));
    listing.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8.
    let json = String::from_utf8_lossy(&buf);
    Ok(escape_non_ascii(&json))
}

/// `\uXXXX`-escape DEL and everything outside ASCII so the page source stays 7-bit.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() && c != '\x7f' {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

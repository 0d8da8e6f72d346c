use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

static CHAR_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|([A-Za-z][A-Za-z0-9]{0,31}))(;?)").unwrap()
});

/// Headings the directory uses for its own navigation widgets.
const EXCLUDED: &[&str] = &["Filter", "Archives"];

const MIN_NAME_CHARS: usize = 3;

const REPLACEMENT: char = '\u{FFFD}';

/// Named references browsers still resolve without a trailing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren", "deg",
    "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34", "gt",
    "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 meaning of numeric references 0x80..=0x9F.
const C1_REMAP: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Trim a raw heading and reject ones that are not BBS names.
///
/// Checks run on the raw (still entity-encoded) text.
pub fn accept(raw: &str) -> Option<&str> {
    let name = raw.trim();
    if name.is_empty()
        || name.starts_with('+')
        || name.chars().count() < MIN_NAME_CHARS
        || EXCLUDED.contains(&name)
    {
        return None;
    }
    Some(name)
}

/// Resolve HTML character references one at a time, the way browsers do.
///
/// A reference that does not resolve is left in place; the rest still decode.
pub fn decode(name: &str) -> Cow<'_, str> {
    CHAR_REF_RE.replace_all(name, |caps: &Captures| {
        if let Some(dec) = caps.get(1) {
            numeric(dec.as_str(), 10)
        } else if let Some(hex) = caps.get(2) {
            numeric(hex.as_str(), 16)
        } else {
            named(&caps[3], &caps[4])
        }
    })
}

fn numeric(digits: &str, radix: u32) -> String {
    let Ok(n) = u32::from_str_radix(digits, radix) else {
        return REPLACEMENT.to_string();
    };
    match n {
        0 => REPLACEMENT.to_string(),
        0x0D => "\r".to_string(),
        0x80..=0x9F => C1_REMAP[(n - 0x80) as usize].to_string(),
        0xD800..=0xDFFF | 0x110000.. => REPLACEMENT.to_string(),
        n if is_forbidden(n) => String::new(),
        n => char::from_u32(n).map_or_else(|| REPLACEMENT.to_string(), String::from),
    }
}

/// Control characters and noncharacters, dropped from the output.
fn is_forbidden(n: u32) -> bool {
    matches!(n, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF) || n & 0xFFFE == 0xFFFE
}

/// `&name;` resolves against the full HTML5 table. Otherwise the longest
/// legacy prefix wins and the remaining characters are kept as text.
fn named(name: &str, semicolon: &str) -> String {
    if !semicolon.is_empty() {
        if let Some(text) = resolve_html5_entity(name) {
            return text.to_string();
        }
    }
    for end in (2..=name.len()).rev() {
        let prefix = &name[..end];
        if LEGACY_ENTITIES.contains(&prefix) {
            if let Some(text) = resolve_html5_entity(prefix) {
                return format!("{}{}{}", text, &name[end..], semicolon);
            }
        }
    }
    format!("&{}{}", name, semicolon)
}

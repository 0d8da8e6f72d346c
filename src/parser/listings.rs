use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use super::names;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h3[^>]*>([^<]+)</h3>").unwrap());
static QUOTED_TELNET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="telnet://([^:"]+):(\d+)""#).unwrap());
static BARE_TELNET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"telnet://([^:"]+):(\d+)"#).unwrap());

/// How far past a heading to look for its telnet link, in characters.
pub const LOOKAHEAD_CHARS: usize = 3000;

/// One BBS scraped from the directory page.
///
/// Only `name`, `address` and `port` come from the page; the remaining fields
/// mark the entry as imported. Field order is the rendered order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub name: String,
    pub address: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub status: &'static str,
    pub tags: [&'static str; 2],
    pub sysop: &'static str,
}

impl Listing {
    pub fn imported(name: String, address: String, port: u16) -> Self {
        Listing {
            name,
            address,
            port,
            kind: "bulletin",
            location: "Imported",
            description: "BBS from telnetbbsguide.com",
            status: "online",
            tags: ["telnetbbsguide", "imported"],
            sysop: "telnetbbsguide.com",
        }
    }
}

/// Scan `<h3>` headings and pair each valid one with the first telnet link after it.
pub fn extract(html: &str) -> Vec<Listing> {
    let mut listings = Vec::new();
    let mut dropped = 0usize;

    for caps in HEADING_RE.captures_iter(html) {
        let Some(name) = names::accept(&caps[1]) else {
            dropped += 1;
            continue;
        };
        let name = names::decode(name).into_owned();

        let after = caps.get(0).map_or(html.len(), |m| m.end());
        let window = take_chars(&html[after..], LOOKAHEAD_CHARS);

        match find_telnet(window) {
            Some((address, port)) => listings.push(Listing::imported(name, address, port)),
            None => {
                trace!("No telnet link within {} chars of {:?}", LOOKAHEAD_CHARS, name);
                dropped += 1;
            }
        }
    }

    debug!("Extracted {} listings ({} headings dropped)", listings.len(), dropped);
    listings
}

/// Prefer `href="telnet://host:port"`, fall back to any bare `telnet://host:port`.
fn find_telnet(window: &str) -> Option<(String, u16)> {
    let caps = QUOTED_TELNET_RE
        .captures(window)
        .or_else(|| BARE_TELNET_RE.captures(window))?;
    let port = caps[2].parse::<u16>().ok()?;
    Some((caps[1].to_string(), port))
}

/// Longest prefix of `s` holding at most `n` characters.
fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn single_heading_and_link() {
        let html = r#"<h3>Test BBS</h3><p>Connect: <a href="telnet://bbs.example.com:2023">telnet</a></p>"#;
        let got = extract(html);
        assert_eq!(got, vec![Listing::imported("Test BBS".into(), "bbs.example.com".into(), 2023)]);
        assert_eq!(got[0].kind, "bulletin");
        assert_eq!(got[0].tags, ["telnetbbsguide", "imported"]);
    }

    #[test]
    fn heading_attributes_and_entities() {
        let html = r#"<h3 class="entry-title">Bits &amp; Bytes</h3> href="telnet://bits.example.org:23""#;
        let got = extract(html);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "Bits & Bytes");
        assert_eq!(got[0].address, "bits.example.org");
        assert_eq!(got[0].port, 23);
    }

    #[test]
    fn quoted_link_preferred_over_bare() {
        let html = concat!(
            "<h3>Dual</h3>",
            "<p>old address telnet://old.example.com:2300</p>",
            r#"<a href="telnet://new.example.com:23">go</a>"#,
        );
        let got = extract(html);
        assert_eq!(got[0].address, "new.example.com");
        assert_eq!(got[0].port, 23);
    }

    #[test]
    fn bare_link_fallback() {
        let html = "<h3>Bare Board</h3><code>telnet://bare.example.net:6400</code>";
        let got = extract(html);
        assert_eq!(got[0].address, "bare.example.net");
        assert_eq!(got[0].port, 6400);
    }

    #[test]
    fn excluded_labels_never_produce_records() {
        let html = r#"<h3>Filter</h3><a href="telnet://a.example.com:23"></a><h3>Archives</h3><a href="telnet://b.example.com:23"></a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn short_and_plus_names_dropped() {
        let html = r#"<h3>AB</h3><a href="telnet://a.example.com:23"></a><h3>+ More</h3><a href="telnet://b.example.com:23"></a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn nested_markup_is_not_a_heading() {
        let html = r#"<h3><a href="/x">Linked BBS</a></h3><a href="telnet://a.example.com:23"></a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn link_beyond_window_is_ignored() {
        let filler = "x".repeat(LOOKAHEAD_CHARS);
        let html = format!(r#"<h3>Far Away</h3>{}<a href="telnet://far.example.com:23"></a>"#, filler);
        assert!(extract(&html).is_empty());

        let filler = "x".repeat(LOOKAHEAD_CHARS - 40);
        let html = format!(r#"<h3>Near Enough</h3>{}href="telnet://near.example.com:23""#, filler);
        assert_eq!(extract(&html).len(), 1);
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        // Two-byte filler pushes the link past 3000 bytes but not past 3000 chars.
        let filler = "é".repeat(LOOKAHEAD_CHARS - 30);
        let html = format!("<h3>Wide Board</h3>{}telnet://w.example:23", filler);
        assert_eq!(extract(&html).len(), 1);
    }

    #[test]
    fn oversized_port_dropped() {
        let html = r#"<h3>Broken Port</h3><a href="telnet://x.example.com:99999"></a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn overlapping_windows_are_not_deduplicated() {
        let html = r#"<h3>First BBS</h3><h3>Second BBS</h3><a href="telnet://shared.example.com:23"></a>"#;
        let got = extract(html);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].address, got[1].address);
        assert_eq!(got[0].name, "First BBS");
        assert_eq!(got[1].name, "Second BBS");
    }

    #[test]
    fn no_headings() {
        assert!(extract("<html><body><p>Nothing here</p></body></html>").is_empty());
    }

    #[test]
    fn directory_page_fixture() {
        let got = extract(&fixture("telnetbbsguide"));
        let names: Vec<&str> = got.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Test BBS", "Level 29", "Dragon's Lair", "Café Retro"]);
        assert_eq!(got[0].address, "bbs.example.com");
        assert_eq!(got[0].port, 2023);
        assert_eq!(got[2].address, "lair.example.org");
        assert_eq!(got[2].port, 23);
        assert_eq!(got[3].address, "retro.example.fr");
    }
}

//! `Links` header parsing
//!
//! Format: `<https://example.com/api/v1/players/?after=5>; rel="next", ...`

use crate::error::{Error, Result};
use crate::types::LinkMap;
use tracing::warn;

/// Parse a `Links` header into a relation → URL map.
///
/// An absent header yields an empty map. Entries that can't be split
/// into a URL and a `rel` are skipped.
pub fn parse_links(header: Option<&str>) -> LinkMap {
    let mut links = LinkMap::new();
    let Some(header) = header else {
        return links;
    };

    for entry in entries(header) {
        match parse_entry(entry) {
            Ok((rel, url)) => {
                links.insert(rel, url);
            }
            Err(e) => warn!("Skipping link entry: {}", e),
        }
    }

    links
}

/// Parse a `Links` header, failing on the first malformed entry
pub fn parse_link_header_strict(header: &str) -> Result<LinkMap> {
    entries(header).map(parse_entry).collect()
}

fn entries(header: &str) -> impl Iterator<Item = &str> {
    header.split(',').filter(|entry| !entry.trim().is_empty())
}

fn parse_entry(entry: &str) -> Result<(String, String)> {
    let mut segments = entry.split(';');

    let target = segments.next().unwrap_or_default().trim();
    let url = target
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .ok_or_else(|| Error::link_header(entry, "target is not enclosed in <...>"))?;

    let rel = segments
        .map(str::trim)
        .find_map(|segment| segment.strip_prefix("rel="))
        .map(|rel| rel.trim_matches('"'))
        .filter(|rel| !rel.is_empty())
        .ok_or_else(|| Error::link_header(entry, "missing rel parameter"))?;

    Ok((rel.to_string(), url.to_string()))
}

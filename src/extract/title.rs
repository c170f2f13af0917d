use scraper::Html;

use super::first_match;
use super::rules::TITLE_RULES;

/// Placeholder name when a page declares no title at all.
pub const UNKNOWN_SITE: &str = "unknown site";

/// Trim "Site Name - Tagline" style titles down to the site name.
///
/// The first segment is kept only when it is longer than three characters,
/// so short prefixes like "A - B" keep the whole text.
pub fn split_title(raw: &str) -> String {
    let title = raw.trim();
    let mut parts = title.split(|c| matches!(c, '-' | '|' | '—'));
    if let (Some(first), Some(_)) = (parts.next(), parts.next()) {
        let first = first.trim();
        if first.chars().count() > 3 {
            return first.to_string();
        }
    }
    title.to_string()
}

pub fn extract_title(document: &Html) -> String {
    first_match(document, TITLE_RULES, |rule, raw| {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        log::debug!("Title from {}: {}", rule.selector, raw);
        Some(split_title(raw))
    })
    .unwrap_or_else(|| UNKNOWN_SITE.to_string())
}

//! Heuristic metadata extraction from a fetched homepage.
//!
//! Each field is driven by an ordered rule list from [`rules`] and evaluated
//! by [`first_match`]: the first rule whose element exists and whose value
//! survives the field's filter wins. A miss is never an error; it yields
//! `None` (or the title placeholder).

pub mod description;
pub mod rules;
pub mod title;

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use self::rules::{ExtractionRule, Source, AVATAR_RULES};

pub use self::title::{split_title, UNKNOWN_SITE};

/// Host fragment that marks a candidate URL as unusable.
const EXCLUDED_HOST: &str = "localhost";

/// Values pulled from a homepage before card overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

/// Title/description/avatar extractor.
#[derive(Debug, Clone, Default)]
pub struct HeuristicExtractor {
    description_denylist: Vec<String>,
}

impl HeuristicExtractor {
    pub fn new(description_denylist: Vec<String>) -> Self {
        Self {
            description_denylist,
        }
    }

    pub fn extract(&self, document: &Html, base_url: &Url) -> Extracted {
        Extracted {
            title: title::extract_title(document),
            description: description::extract_description(document, &self.description_denylist),
            avatar: extract_avatar(document, base_url),
        }
    }
}

/// Evaluate `rules` in order against the first element each selector hits.
///
/// `accept` sees the raw candidate and may reject it, in which case the next
/// rule is tried.
pub fn first_match<T>(
    document: &Html,
    rules: &[ExtractionRule],
    mut accept: impl FnMut(&ExtractionRule, String) -> Option<T>,
) -> Option<T> {
    for rule in rules {
        let selector = match Selector::parse(rule.selector) {
            Ok(sel) => sel,
            Err(e) => {
                log::warn!("Skipping bad selector {:?}: {:?}", rule.selector, e);
                continue;
            }
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };
        let Some(value) = read_source(element, rule.source) else {
            continue;
        };
        if let Some(found) = accept(rule, value) {
            return Some(found);
        }
    }
    None
}

fn read_source(element: ElementRef<'_>, source: Source) -> Option<String> {
    match source {
        Source::Text => Some(element.text().collect()),
        Source::Attr(name) => element.value().attr(name).map(str::to_string),
        Source::StyleBackgroundUrl => element
            .value()
            .attr("style")
            .and_then(background_url)
            .map(str::to_string),
    }
}

fn background_url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).ok())
        .as_ref()
}

/// URL inside the first `url(...)` of an inline style declaration.
pub fn background_url(style: &str) -> Option<&str> {
    background_url_regex()?
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Origin of `target`, used as the base for relative candidates.
pub fn site_base(target: &Url) -> Option<Url> {
    Url::parse(&target.origin().ascii_serialization()).ok()
}

/// Resolve `candidate` against `base`, rejecting blanks and localhost URLs.
pub fn resolve_candidate(base: &Url, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    let resolved = base.join(candidate).ok()?;
    let resolved = resolved.to_string();
    if resolved.contains(EXCLUDED_HOST) {
        log::debug!("Skipping localhost candidate {}", resolved);
        return None;
    }
    Some(resolved)
}

/// Resolve a URL-valued rule list against `base`.
pub fn first_url(document: &Html, rules: &[ExtractionRule], base: &Url) -> Option<String> {
    first_match(document, rules, |rule, raw| {
        let url = resolve_candidate(base, &raw)?;
        log::debug!("Matched {} -> {}", rule.selector, url);
        Some(url)
    })
}

pub fn extract_avatar(document: &Html, base_url: &Url) -> Option<String> {
    first_url(document, AVATAR_RULES, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://friend.example").unwrap()
    }

    fn avatar_of(html: &str) -> Option<String> {
        extract_avatar(&Html::parse_document(html), &base())
    }

    #[test]
    fn background_url_variants() {
        assert_eq!(background_url("background-image: url('/a.png')"), Some("/a.png"));
        assert_eq!(background_url("background:url(\"b.jpg\") no-repeat"), Some("b.jpg"));
        assert_eq!(background_url("background: url(/c.webp);"), Some("/c.webp"));
        assert_eq!(background_url("color: red"), None);
    }

    #[test]
    fn site_base_is_origin() {
        let target = Url::parse("https://friend.example/blog/post?x=1").unwrap();
        assert_eq!(site_base(&target).unwrap().as_str(), "https://friend.example/");
    }

    #[test]
    fn avatar_from_logo_background() {
        let html = r#"<div id="logo" style="background-image: url('/img/me.png')"></div>"#;
        assert_eq!(
            avatar_of(html).as_deref(),
            Some("https://friend.example/img/me.png")
        );
    }

    #[test]
    fn avatar_skips_localhost_candidate() {
        let html = r#"
            <div id="logo" style="background: url(http://localhost:4000/me.png)"></div>
            <div class="site-avatar"><img src="https://cdn.example/me.png"></div>
        "#;
        assert_eq!(avatar_of(html).as_deref(), Some("https://cdn.example/me.png"));
    }

    #[test]
    fn avatar_falls_back_to_og_image() {
        let html = r#"<head><meta property="og:image" content="/og.png"></head>"#;
        assert_eq!(avatar_of(html).as_deref(), Some("https://friend.example/og.png"));
    }

    #[test]
    fn avatar_miss_is_none() {
        assert_eq!(avatar_of("<p>no pictures</p>"), None);
    }

    #[test]
    fn tailwind_escaped_class_matches() {
        let html = r#"<img class="max-h-[5rem] rounded" src="/tw.png">"#;
        assert_eq!(avatar_of(html).as_deref(), Some("https://friend.example/tw.png"));
    }

    #[test]
    fn extractor_combines_fields() {
        let html = r#"
            <html><head>
              <title>Friend Blog | Notes</title>
              <meta name="description" content="  Notes on things ">
            </head><body><img class="site-logo" src="logo.svg"></body></html>
        "#;
        let out = HeuristicExtractor::default().extract(&Html::parse_document(html), &base());
        assert_eq!(out.title, "Friend Blog");
        assert_eq!(out.description.as_deref(), Some("Notes on things"));
        assert_eq!(out.avatar.as_deref(), Some("https://friend.example/logo.svg"));
    }
}

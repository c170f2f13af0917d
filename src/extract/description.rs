use scraper::{Html, Selector};
use serde_json::Value;

use super::first_match;
use super::rules::{DESCRIPTION_RULES, STRUCTURED_DATA_SELECTOR};

/// Structured data first, then meta tags. Denylisted boilerplate is skipped.
pub fn extract_description(document: &Html, denylist: &[String]) -> Option<String> {
    let accept = |value: &str| -> Option<String> {
        let value = value.trim();
        if value.is_empty() || is_denylisted(value, denylist) {
            return None;
        }
        Some(value.to_string())
    };

    if let Some(desc) = structured_description(document).and_then(|d| accept(&d)) {
        log::debug!("Using structured-data description: {}", desc);
        return Some(desc);
    }

    first_match(document, DESCRIPTION_RULES, |rule, raw| {
        let desc = accept(&raw)?;
        log::debug!("Using description ({}): {}", rule.selector, desc);
        Some(desc)
    })
}

fn is_denylisted(value: &str, denylist: &[String]) -> bool {
    denylist
        .iter()
        .any(|entry| entry.trim().eq_ignore_ascii_case(value))
}

/// `description` from the first JSON-LD block, if it has one.
///
/// Malformed JSON is logged and treated as absent.
fn structured_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(STRUCTURED_DATA_SELECTOR).ok()?;
    let script = document.select(&selector).next()?;
    let raw: String = script.text().collect();
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => description_field(&value),
        Err(e) => {
            log::debug!("Ignoring malformed structured data: {}", e);
            None
        }
    }
}

fn description_field(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .or_else(|| map.get("@graph").and_then(description_field)),
        Value::Array(items) => items.iter().find_map(description_field),
        _ => None,
    }
}

//! Page-lifetime language toggle bound to the button/label controls.

use std::time::Instant;

use super::cache::TextConversionCache;
use super::{detect_variant, ScriptConverter, ToggleLabel, ToggleState, Variant};
use crate::config::{Region, ToggleConfig};
use crate::dom::{DomNode, DomTree};

/// The one toggle a page owns. Created once by [`LanguageToggle::install`]
/// and kept for as long as the page is shown.
#[derive(Debug, Clone)]
pub struct LanguageToggle {
    cache: TextConversionCache,
    button_id: String,
    label_id: String,
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}

impl LanguageToggle {
    /// Detect the page variant, label the controls with it and snapshot the
    /// page text.
    ///
    /// Returns `None` when either control is missing; the subsystem is then
    /// simply off. Detection and snapshotting each wait for their settle
    /// delay, measured from the call.
    pub fn install(tree: &mut DomTree, config: &ToggleConfig) -> Option<Self> {
        if tree.root.find_by_id(&config.button_id).is_none()
            || tree.root.find_by_id(&config.label_id).is_none()
        {
            log::debug!("Language toggle controls missing, conversion disabled");
            return None;
        }

        let started = Instant::now();
        sleep_until(started + config.detect_delay);
        let variant = detect_variant(&tree.body_text());
        log::info!("Detected page variant: {:?}", variant);
        write_controls(tree, &config.label_id, &config.button_id, variant.label());

        sleep_until(started + config.snapshot_delay.max(config.detect_delay));
        let mut excluded = vec![
            Region::Id(config.button_id.clone()),
            Region::Id(config.label_id.clone()),
        ];
        excluded.extend(config.excluded.iter().cloned());
        let cache = TextConversionCache::build(tree, &excluded, variant);

        Some(Self {
            cache,
            button_id: config.button_id.clone(),
            label_id: config.label_id.clone(),
        })
    }

    pub fn cache(&self) -> &TextConversionCache {
        &self.cache
    }

    pub fn state(&self) -> ToggleState {
        self.cache.state()
    }

    pub fn original_variant(&self) -> Variant {
        self.cache.original_variant()
    }

    pub fn label(&self) -> ToggleLabel {
        self.cache.displayed_variant().label()
    }

    /// Handle one button activation and refresh the controls.
    pub fn toggle(&mut self, tree: &mut DomTree, converter: &dyn ScriptConverter) -> ToggleLabel {
        let state = self.cache.toggle(tree, converter);
        log::debug!("Toggled to {:?}", state);
        let label = self.label();
        self.write_controls(tree, label);
        label
    }

    /// Write the label text and button title into the tree.
    pub fn write_controls(&self, tree: &mut DomTree, label: ToggleLabel) {
        write_controls(tree, &self.label_id, &self.button_id, label);
    }
}

fn write_controls(tree: &mut DomTree, label_id: &str, button_id: &str, label: ToggleLabel) {
    if let Some(el) = tree.root.find_by_id_mut(label_id) {
        el.children = vec![DomNode::text(label.text)];
    }
    if let Some(el) = tree.root.find_by_id_mut(button_id) {
        el.attributes
            .insert("title".to_string(), label.title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::CharTableConverter;
    use crate::dom::parser::parse_html;
    use std::time::Duration;

    const PAGE: &str = r#"
        <html><body>
          <a href="/">这个博客</a>
          <button id="langToggleBtn" title=""><span id="langLabel">简体中文</span></button>
          <p>这个国家没有地图</p>
        </body></html>
    "#;

    #[test]
    fn missing_controls_disable_toggle() {
        let mut tree = parse_html("<html><body><p>这个</p></body></html>");
        assert!(LanguageToggle::install(&mut tree, &ToggleConfig::immediate()).is_none());
    }

    #[test]
    fn toggle_converts_and_labels() {
        let mut tree = parse_html(PAGE);
        let mut toggle = LanguageToggle::install(&mut tree, &ToggleConfig::immediate()).unwrap();
        assert_eq!(toggle.original_variant(), Variant::Simplified);
        assert_eq!(toggle.label(), Variant::Simplified.label());

        let label = toggle.toggle(&mut tree, &CharTableConverter::default());
        assert_eq!(label.text, "繁體中文");
        let text = tree.body_text();
        assert!(text.contains("這個國家沒有地圖"));
        // Home link is excluded.
        assert!(text.contains("这个博客"));

        let button = tree.root.find_by_id("langToggleBtn").unwrap();
        assert_eq!(button.attr("title"), Some(Variant::Traditional.label().title));

        toggle.toggle(&mut tree, &CharTableConverter::default());
        assert!(tree.body_text().contains("这个国家没有地图"));
        assert_eq!(toggle.state(), ToggleState::Original);
    }

    #[test]
    fn settle_delays_are_honoured() {
        let mut tree = parse_html(PAGE);
        let mut config = ToggleConfig::immediate();
        config.snapshot_delay = Duration::from_millis(30);
        let started = Instant::now();
        assert!(LanguageToggle::install(&mut tree, &config).is_some());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn install_relabels_controls_with_detected_variant() {
        let mut tree = parse_html(
            r#"<html><body>
                <button id="langToggleBtn" title=""><span id="langLabel">简体中文</span></button>
                <p>這個國家沒有地圖</p>
            </body></html>"#,
        );
        let toggle = LanguageToggle::install(&mut tree, &ToggleConfig::immediate()).unwrap();
        assert_eq!(toggle.original_variant(), Variant::Traditional);
        assert_eq!(toggle.state(), ToggleState::Original);

        let label = tree.root.find_by_id("langLabel").unwrap();
        assert_eq!(label.collect_text(), "繁體中文");
        let button = tree.root.find_by_id("langToggleBtn").unwrap();
        assert_eq!(button.attr("title"), Some(Variant::Traditional.label().title));
    }
}

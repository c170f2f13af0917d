//! Friend cards: the author-supplied input attributes and the display
//! regions the resolver writes into.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::engine::ResolvedMetadata;
use crate::extract::UNKNOWN_SITE;

pub const CARD_SELECTOR: &str = ".friend-card";

/// Read-only card attributes as authored on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    pub target_url: String,
    pub override_title: Option<String>,
    pub override_description: Option<String>,
    pub override_avatar: Option<String>,
    pub fallback_title: Option<String>,
    pub fallback_description: Option<String>,
    pub fallback_avatar: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Card {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    /// Build a card from a `.friend-card` element. `None` without `data-url`.
    pub fn from_element(el: ElementRef<'_>) -> Option<Self> {
        let attr = |name: &str| non_empty(el.value().attr(name));
        Some(Self {
            target_url: attr("data-url")?,
            override_title: attr("data-custom-title"),
            override_description: attr("data-custom-desc"),
            override_avatar: attr("data-custom-avatar"),
            fallback_title: attr("data-fallback-title"),
            fallback_description: attr("data-fallback-desc"),
            fallback_avatar: attr("data-fallback-avatar"),
        })
    }

    /// Address opened in a new browsing context when the card is clicked.
    pub fn click_target(&self) -> &str {
        &self.target_url
    }

    /// Metadata shown when every proxy failed. Favicon is always absent.
    pub fn fallback_metadata(&self) -> ResolvedMetadata {
        ResolvedMetadata {
            title: self.fallback_title.clone(),
            description: self.fallback_description.clone(),
            favicon: None,
            avatar: self.fallback_avatar.clone(),
        }
    }
}

/// Every card on a friends page, in document order.
pub fn cards_from_page(html: &str) -> Vec<Card> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| {
            let card = Card::from_element(el);
            if card.is_none() {
                log::warn!("Skipping {} without data-url", CARD_SELECTOR);
            }
            card
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Favicon,
    Avatar,
}

/// An image region: source plus visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageRegion {
    pub src: Option<String>,
    pub visible: bool,
}

impl ImageRegion {
    fn show(&mut self, src: &str) {
        self.src = Some(src.to_string());
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Display regions of one card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub url: String,
    pub name: String,
    pub description: Option<String>,
    pub description_visible: bool,
    pub favicon: ImageRegion,
    pub avatar: ImageRegion,
    /// Number of render passes applied so far.
    pub renders: usize,
}

impl CardView {
    /// Static state before any resolution has completed.
    pub fn initial(card: &Card) -> Self {
        Self {
            url: card.target_url.clone(),
            name: card
                .fallback_title
                .clone()
                .unwrap_or_else(|| UNKNOWN_SITE.to_string()),
            ..Self::default()
        }
    }

    /// Project resolved metadata onto the regions.
    ///
    /// A missing favicon leaves the favicon region untouched so that the
    /// later favicon patch and this pass never fight; a missing avatar or
    /// description hides its region.
    pub fn render(&mut self, card: &Card, data: &ResolvedMetadata) {
        self.name = data
            .title
            .clone()
            .or_else(|| card.fallback_title.clone())
            .unwrap_or_else(|| UNKNOWN_SITE.to_string());

        match &data.description {
            Some(desc) => {
                self.description = Some(desc.clone());
                self.description_visible = true;
            }
            None => self.description_visible = false,
        }

        if let Some(favicon) = &data.favicon {
            self.favicon.show(favicon);
        }

        match &data.avatar {
            Some(avatar) => self.avatar.show(avatar),
            None => self.avatar.hide(),
        }

        self.renders += 1;
    }

    /// Favicon-only second pass after the background probe settles.
    pub fn patch_favicon(&mut self, favicon: Option<&str>) {
        if let Some(favicon) = favicon {
            self.favicon.show(favicon);
        }
        self.renders += 1;
    }

    /// An image failed to load in the rendered page; hide only that region.
    pub fn image_failed(&mut self, slot: ImageSlot) {
        match slot {
            ImageSlot::Favicon => self.favicon.hide(),
            ImageSlot::Avatar => self.avatar.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="friends">
          <div class="friend-card" data-url="https://a.example"
               data-custom-title="Alpha" data-fallback-desc="Alpha's notes">
            <img class="friend-favicon"><span class="friend-name"></span>
          </div>
          <div class="friend-card" data-url="  ">broken</div>
          <div class="friend-card" data-url="https://b.example" data-custom-avatar="">
          </div>
        </div>
    "#;

    #[test]
    fn cards_are_read_in_order_and_blank_attrs_dropped() {
        let cards = cards_from_page(PAGE);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].target_url, "https://a.example");
        assert_eq!(cards[0].override_title.as_deref(), Some("Alpha"));
        assert_eq!(cards[0].fallback_description.as_deref(), Some("Alpha's notes"));
        assert_eq!(cards[1].override_avatar, None);
        assert_eq!(cards[1].click_target(), "https://b.example");
    }

    #[test]
    fn fallback_metadata_never_has_favicon() {
        let mut card = Card::new("https://a.example");
        card.fallback_title = Some("A".into());
        card.fallback_avatar = Some("https://a.example/me.png".into());
        let meta = card.fallback_metadata();
        assert_eq!(meta.title.as_deref(), Some("A"));
        assert_eq!(meta.favicon, None);
        assert_eq!(meta.avatar.as_deref(), Some("https://a.example/me.png"));
    }

    #[test]
    fn render_applies_visibility_rules() {
        let card = Card::new("https://a.example");
        let mut view = CardView::initial(&card);
        view.render(
            &card,
            &ResolvedMetadata {
                title: Some("Alpha".into()),
                description: None,
                favicon: None,
                avatar: None,
            },
        );
        assert_eq!(view.name, "Alpha");
        assert!(!view.description_visible);
        assert!(!view.favicon.visible);
        assert!(!view.avatar.visible);

        view.patch_favicon(Some("https://a.example/favicon.ico"));
        assert!(view.favicon.visible);
        assert_eq!(view.name, "Alpha");
        assert_eq!(view.renders, 2);
    }

    #[test]
    fn name_falls_back_to_fallback_title_then_placeholder() {
        let mut card = Card::new("https://a.example");
        let mut view = CardView::initial(&card);
        view.render(&card, &ResolvedMetadata::default());
        assert_eq!(view.name, UNKNOWN_SITE);

        card.fallback_title = Some("Alpha".into());
        view.render(&card, &ResolvedMetadata::default());
        assert_eq!(view.name, "Alpha");
    }

    #[test]
    fn image_failure_hides_only_that_region() {
        let card = Card::new("https://a.example");
        let mut view = CardView::initial(&card);
        view.render(
            &card,
            &ResolvedMetadata {
                title: None,
                description: Some("d".into()),
                favicon: Some("https://a.example/f.ico".into()),
                avatar: Some("https://a.example/a.png".into()),
            },
        );
        view.image_failed(ImageSlot::Avatar);
        assert!(!view.avatar.visible);
        assert!(view.favicon.visible);
        assert!(view.description_visible);
    }

    #[test]
    fn empty_favicon_patch_leaves_region_alone() {
        let card = Card::new("https://a.example");
        let mut view = CardView::initial(&card);
        view.patch_favicon(None);
        assert!(!view.favicon.visible);
        assert_eq!(view.favicon.src, None);
    }
}

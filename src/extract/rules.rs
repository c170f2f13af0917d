//! Ordered selector lists. Earlier rules win.

/// Where a rule reads its candidate value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Concatenated text content of the element.
    Text,
    Attr(&'static str),
    /// First `url(...)` inside the element's inline `style`.
    StyleBackgroundUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub selector: &'static str,
    pub source: Source,
}

const fn rule(selector: &'static str, source: Source) -> ExtractionRule {
    ExtractionRule { selector, source }
}

const CONTENT: Source = Source::Attr("content");
const HREF: Source = Source::Attr("href");
const SRC: Source = Source::Attr("src");

pub const TITLE_RULES: &[ExtractionRule] = &[
    rule("title", Source::Text),
    rule("meta[name='title']", CONTENT),
    rule("meta[property='og:site_name']", CONTENT),
    rule("meta[property='og:title']", CONTENT),
];

/// Checked before [`DESCRIPTION_RULES`]; a `description` field here wins.
pub const STRUCTURED_DATA_SELECTOR: &str = "script[type='application/ld+json']";

pub const DESCRIPTION_RULES: &[ExtractionRule] = &[
    rule("meta[name='description']", CONTENT),
    rule("meta[property='og:description']", CONTENT),
    rule("meta[name='twitter:description']", CONTENT),
];

// Vector first, then raster icons from largest to smallest.
pub const FAVICON_RULES: &[ExtractionRule] = &[
    rule("link[rel='icon'][type='image/svg+xml']", HREF),
    rule("link[rel='icon'][sizes='256x256']", HREF),
    rule("link[rel='icon'][sizes='128x128']", HREF),
    rule("link[rel='icon'][sizes='64x64']", HREF),
    rule("link[rel='apple-touch-icon']", HREF),
    rule("link[rel='icon'][sizes='32x32']", HREF),
    rule("link[rel='icon'][sizes='16x16']", HREF),
    rule("link[rel='icon']", HREF),
    rule("link[rel='shortcut icon']", HREF),
];

pub const AVATAR_RULES: &[ExtractionRule] = &[
    rule("#logo", Source::StyleBackgroundUrl),
    rule(".site-avatar img", SRC),
    rule("img.site-logo", SRC),
    rule("img.logo-image", SRC),
    rule(".logo", SRC),
    rule("img.logo", SRC),
    rule(".max-h-\\[5rem\\]", SRC),
    rule("img[class*='logo']", SRC),
    rule("meta[property='og:image']", CONTENT),
];

/// Well-known icon location probed when no `<link>` declares one.
pub const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

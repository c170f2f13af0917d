//! Resolver and language-toggle settings.
//!
//! Both structs carry working defaults. [`ResolverConfig::from_env`] layers
//! environment overrides on top of them for the binary.

use std::time::Duration;

/// Public relays tried in order for every card.
pub const DEFAULT_PROXIES: &[&str] = &[
    "https://api.allorigins.win/raw?url=",
    "https://api.codetabs.com/v1/proxy?quest=",
    "https://thingproxy.freeboard.io/fetch/",
];

pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; friendlink/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Settings for the proxy-cascade metadata resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub proxies: Vec<String>,
    /// Fixed pause after each failed proxy attempt.
    pub backoff: Duration,
    /// Per-request timeout handed to the HTTP client.
    pub timeout: Duration,
    pub user_agent: String,
    /// Boilerplate descriptions that are not treated as real descriptions.
    pub description_denylist: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            proxies: DEFAULT_PROXIES.iter().map(|p| p.to_string()).collect(),
            backoff: DEFAULT_BACKOFF,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            description_denylist: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Defaults overridden by `FRIENDLINK_*` environment variables.
    ///
    /// Unparsable numeric values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("FRIENDLINK_PROXIES") {
            let proxies: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if !proxies.is_empty() {
                self.proxies = proxies;
            }
        }
        if let Some(raw) = lookup("FRIENDLINK_BACKOFF_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.backoff = Duration::from_millis(ms),
                Err(e) => log::warn!("Ignoring FRIENDLINK_BACKOFF_MS={:?}: {}", raw, e),
            }
        }
        if let Some(raw) = lookup("FRIENDLINK_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.timeout = Duration::from_secs(secs),
                Err(e) => log::warn!("Ignoring FRIENDLINK_TIMEOUT_SECS={:?}: {}", raw, e),
            }
        }
        if let Some(raw) = lookup("FRIENDLINK_DESC_DENYLIST") {
            self.description_denylist = raw
                .split('|')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        self
    }
}

/// Region of the page whose text is never converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Id(String),
    Class(String),
    /// `a[href="<href>"]`, typically the home link.
    Link(String),
}

/// Settings for the Simplified/Traditional text toggle.
#[derive(Debug, Clone)]
pub struct ToggleConfig {
    pub button_id: String,
    pub label_id: String,
    /// Pause before detecting the page's script variant.
    pub detect_delay: Duration,
    /// Pause before snapshotting text nodes, so late content is included.
    pub snapshot_delay: Duration,
    /// Regions excluded in addition to the toggle controls themselves.
    pub excluded: Vec<Region>,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            button_id: "langToggleBtn".to_string(),
            label_id: "langLabel".to_string(),
            detect_delay: Duration::from_millis(200),
            snapshot_delay: Duration::from_millis(300),
            excluded: vec![Region::Class("logo".to_string()), Region::Link("/".to_string())],
        }
    }
}

impl ToggleConfig {
    /// No settle delays; for trees that are already final.
    pub fn immediate() -> Self {
        Self {
            detect_delay: Duration::ZERO,
            snapshot_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

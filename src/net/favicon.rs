//! Favicon resolution.
//!
//! Declared `<link>` icons resolve synchronously. Pages that declare none
//! get a background existence probe of the conventional `/favicon.ico`,
//! whose result arrives later through a [`FaviconProbe`].

use std::sync::mpsc;
use std::sync::Arc;

use scraper::Html;
use url::Url;

use super::Transport;
use crate::extract::first_url;
use crate::extract::rules::{DEFAULT_FAVICON_PATH, FAVICON_RULES};

/// Pending result of a background `/favicon.ico` check.
pub struct FaviconProbe {
    url: String,
    rx: mpsc::Receiver<Option<String>>,
}

impl FaviconProbe {
    /// Start probing `url` on a background thread.
    pub fn spawn(transport: Arc<dyn Transport>, url: String) -> Self {
        let (tx, rx) = mpsc::channel();
        let probe_url = url.clone();

        std::thread::spawn(move || {
            let result = match transport.probe(&probe_url) {
                Ok(_) => {
                    log::debug!("Using default favicon: {}", probe_url);
                    Some(probe_url)
                }
                Err(e) => {
                    log::debug!("No default favicon: {}", e);
                    None
                }
            };
            let _ = tx.send(result);
        });

        Self { url, rx }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Block until the probe settles.
    pub fn wait(self) -> Option<String> {
        self.rx.recv().unwrap_or(None)
    }
}

pub enum FaviconLookup {
    /// Declared by the page.
    Found(String),
    /// Nothing declared; the default location is being checked.
    Probing(FaviconProbe),
}

pub struct FaviconResolver {
    transport: Arc<dyn Transport>,
}

impl FaviconResolver {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn resolve(&self, document: &Html, base_url: &Url) -> FaviconLookup {
        if let Some(url) = first_url(document, FAVICON_RULES, base_url) {
            log::debug!("Found favicon: {}", url);
            return FaviconLookup::Found(url);
        }

        let fallback = match base_url.join(DEFAULT_FAVICON_PATH) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}{}",
                base_url.as_str().trim_end_matches('/'),
                DEFAULT_FAVICON_PATH
            ),
        };
        FaviconLookup::Probing(FaviconProbe::spawn(Arc::clone(&self.transport), fallback))
    }
}

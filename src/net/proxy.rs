//! Proxy cascade: fetch a page through an ordered list of public relays.
//!
//! Attempts are strictly sequential. A relay that errors, answers with a
//! non-success status, or returns markup that does not parse counts as
//! failed; the cascade sleeps for the fixed backoff and moves on to the next
//! relay. Running off the end of the list is terminal.

use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use scraper::Html;

use super::{FetchError, Transport};
use crate::config::ResolverConfig;
use crate::dom::parser::{parse_document, ParseError};

/// Characters `encodeURIComponent` leaves alone, besides alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A relay address template.
///
/// The percent-encoded target replaces `{url}` when present, otherwise it is
/// appended to the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    template: String,
}

impl ProxyEndpoint {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Retrievable address for `target` through this relay.
    pub fn address(&self, target: &str) -> String {
        let encoded = utf8_percent_encode(target, URI_COMPONENT).to_string();
        if self.template.contains("{url}") {
            self.template.replace("{url}", &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}

/// Outcome of a single proxy attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    Failed(FetchError),
    /// The attempt index is past the last relay.
    Exhausted,
}

/// A successful cascade result.
#[derive(Debug)]
pub struct Fetched<T> {
    pub value: T,
    /// Zero-based index of the relay that answered.
    pub attempt: usize,
}

/// Every relay failed for `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeExhausted {
    pub target: String,
    pub attempts: usize,
}

impl std::fmt::Display for CascadeExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "all {} proxies failed for {}",
            self.attempts, self.target
        )
    }
}

impl std::error::Error for CascadeExhausted {}

pub struct ProxyCascade {
    proxies: Vec<ProxyEndpoint>,
    backoff: Duration,
    transport: Arc<dyn Transport>,
}

impl ProxyCascade {
    pub fn new(config: &ResolverConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            proxies: config.proxies.iter().map(ProxyEndpoint::new).collect(),
            backoff: config.backoff,
            transport,
        }
    }

    /// Run relay `index` once and parse its body with `parse`.
    pub fn attempt<T>(
        &self,
        target: &str,
        index: usize,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Attempt<T> {
        let Some(proxy) = self.proxies.get(index) else {
            return Attempt::Exhausted;
        };

        let address = proxy.address(target);
        log::debug!("Proxy {} -> {}", index, address);

        let body = match self.transport.get(&address) {
            Ok(body) => body,
            Err(e) => return Attempt::Failed(e),
        };

        match parse(&body) {
            Ok(value) => Attempt::Success(value),
            Err(reason) => Attempt::Failed(FetchError::Parse {
                url: address,
                reason,
            }),
        }
    }

    /// Walk the relays in order until one yields a parsable document.
    ///
    /// `on_attempt` is told the index of every attempt before it is made.
    pub fn fetch_observed<T>(
        &self,
        target: &str,
        mut parse: impl FnMut(&str) -> Result<T, ParseError>,
        mut on_attempt: impl FnMut(usize),
    ) -> Result<Fetched<T>, CascadeExhausted> {
        let mut index = 0;
        loop {
            if index < self.proxies.len() {
                on_attempt(index);
            }
            match self.attempt(target, index, &mut parse) {
                Attempt::Success(value) => {
                    log::debug!("Proxy {} succeeded for {}", index, target);
                    return Ok(Fetched {
                        value,
                        attempt: index,
                    });
                }
                Attempt::Failed(e) => {
                    log::warn!("Proxy {} failed for {}, trying next: {}", index, target, e);
                    std::thread::sleep(self.backoff);
                    index += 1;
                }
                Attempt::Exhausted => {
                    log::warn!("All proxies failed, using fallback data: {}", target);
                    return Err(CascadeExhausted {
                        target: target.to_string(),
                        attempts: index,
                    });
                }
            }
        }
    }

    /// Fetch and parse `target` into a queryable document.
    pub fn fetch(&self, target: &str) -> Result<Fetched<Html>, CascadeExhausted> {
        self.fetch_observed(target, parse_document, |_| {})
    }
}

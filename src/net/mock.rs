//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{FetchError, Transport};

enum Reply {
    Body(String),
    Status(u16),
}

/// Serves canned bodies and statuses by exact URL; anything else fails as a
/// connection error. Every request is recorded as `"GET <url>"` or
/// `"HEAD <url>"`.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: HashMap<String, Reply>,
    probes: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    pub fn probe_status(mut self, url: &str, status: u16) -> Self {
        self.probes.insert(url.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, entry: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(entry);
        }
    }

    fn refused(url: &str) -> FetchError {
        FetchError::Transport {
            url: url.to_string(),
            message: "connection refused".to_string(),
        }
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        self.record(format!("GET {}", url));
        match self.replies.get(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(Self::refused(url)),
        }
    }

    fn probe(&self, url: &str) -> Result<u16, FetchError> {
        self.record(format!("HEAD {}", url));
        match self.probes.get(url) {
            Some(&status) if (200..300).contains(&status) => Ok(status),
            Some(&status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(Self::refused(url)),
        }
    }
}

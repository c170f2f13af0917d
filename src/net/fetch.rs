use url::Url;

use super::{FetchError, Transport};
use crate::config::ResolverConfig;

/// Add `https://` to scheme-less input and validate it.
pub fn normalize_url(url_str: &str) -> Result<Url, FetchError> {
    let trimmed = url_str.trim();
    let lower = trimmed.to_ascii_lowercase();
    let url = if !lower.starts_with("http://") && !lower.starts_with("https://") {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    Url::parse(&url).map_err(|e| FetchError::InvalidUrl {
        url: url_str.to_string(),
        message: e.to_string(),
    })
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ResolverConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Client {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })
    }

    fn probe(&self, url: &str) -> Result<u16, FetchError> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_added_when_missing() {
        let url = normalize_url("example.com/blog").unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog");
    }

    #[test]
    fn explicit_http_is_kept() {
        let url = normalize_url("  http://example.com ").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn scheme_match_ignores_case() {
        let url = normalize_url("HTTPS://friend.example/").unwrap();
        assert_eq!(url.as_str(), "https://friend.example/");
        assert_eq!(url.host_str(), Some("friend.example"));

        let url = normalize_url("Http://friend.example/blog").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            normalize_url("https://exa mple.com"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn client_builds_from_defaults() {
        assert!(HttpTransport::new(&ResolverConfig::default()).is_ok());
    }
}

//! HTTP transport for WordPress REST API calls

use super::Transport;
use crate::cache::{Entity, DEFAULT_TOTAL};
use crate::error::TransportError;
use crate::query::Query;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("wpcache/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Append query parameters to a URL, percent-encoding values.
///
/// Arrays become repeated `key[]=` pairs; nulls and objects are skipped.
pub fn add_query_params(url: &str, query: &Query) -> String {
    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in query.iter() {
        match value {
            Value::String(s) => {
                query_parts.push(format!("{}={}", key, urlencoding::encode(s)));
            }
            Value::Number(n) => query_parts.push(format!("{}={}", key, n)),
            Value::Bool(b) => query_parts.push(format!("{}={}", key, b)),
            Value::Array(arr) => {
                for item in arr {
                    let item = match item {
                        Value::String(s) => urlencoding::encode(s).into_owned(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => continue,
                    };
                    query_parts.push(format!("{}[]={}", key, item));
                }
            }
            Value::Null | Value::Object(_) => {}
        }
    }

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

/// Parse a count header, falling back to [`DEFAULT_TOTAL`]
fn parse_total(headers: &HeaderMap, header: &str) -> u64 {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|total| *total > 0)
        .unwrap_or(DEFAULT_TOTAL)
}

/// HTTP client bound to one site's REST API root
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_root: String,
}

impl HttpTransport {
    /// Create a transport for a site, e.g. `https://example.com/`
    pub fn new(site_url: &str) -> Result<Self> {
        Self::with_options(site_url, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    pub fn with_options(site_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let site = Url::parse(site_url).with_context(|| format!("Invalid site URL '{}'", site_url))?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("Unsupported URL scheme '{}'", site.scheme()));
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_root: format!("{}/wp-json", site.as_str().trim_end_matches('/')),
        })
    }

    /// Full request URL for an endpoint and query
    pub fn url(&self, endpoint: &str, query: &Query) -> String {
        add_query_params(&format!("{}{}", self.api_root, endpoint), query)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn list(&self, endpoint: &str, query: &Query) -> Result<Vec<Entity>, TransportError> {
        let url = self.url(endpoint, query);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(TransportError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let entities: Vec<Entity> = serde_json::from_str(&body)?;
        tracing::debug!("GET {} returned {} entities", url, entities.len());
        Ok(entities)
    }

    async fn count(&self, endpoint: &str, header: &str, query: &Query) -> Result<u64, TransportError> {
        let url = self.url(endpoint, query);
        tracing::debug!("HEAD {}", url);

        let response = self
            .client
            .head(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("API error on count: {}", status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(parse_total(response.headers(), header))
    }
}

//! Visitor counter client.
//!
//! A counter lives at `<api_base>/{hit,get}/<namespace>/<key>` and answers
//! with `{"value": <count>}`. The first visit from a machine increments it;
//! later visits only read it. The "visited" flag is kept in [`crate::cache`].

use crate::cache;
use crate::cancellation::CancellationToken;
use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterAction {
    Hit,
    Get,
}

impl CounterAction {
    fn as_str(self) -> &'static str {
        match self {
            CounterAction::Hit => "hit",
            CounterAction::Get => "get",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisitorCounter {
    client: Client,
    api_base: Url,
    namespace: String,
    key: String,
}

impl VisitorCounter {
    pub fn new(api_base: &str, namespace: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .with_context(|| format!("invalid visitor counter api base `{api_base}`"))?;
        if api_base.cannot_be_a_base() {
            bail!("visitor counter api base `{api_base}` cannot hold a path");
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_base,
            namespace: namespace.into(),
            key: key.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Increment the counter and return the new count.
    pub fn hit(&self) -> Result<Option<u64>> {
        self.request(CounterAction::Hit)
    }

    /// Read the counter without incrementing it.
    pub fn get(&self) -> Result<Option<u64>> {
        self.request(CounterAction::Get)
    }

    fn request(&self, action: CounterAction) -> Result<Option<u64>> {
        let url = self.url(action)?;
        debug!(%url, action = action.as_str(), "Requesting visitor count");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to send visitor counter {}", action.as_str()))?;

        if !response.status().is_success() {
            bail!("visitor counter {} failed: {}", action.as_str(), response.status());
        }

        let body = response
            .text()
            .context("Failed to read visitor counter response")?;
        parse_count(&body)
    }

    fn url(&self, action: CounterAction) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("visitor counter api base cannot hold a path"))?
            .pop_if_empty()
            .extend([action.as_str(), self.namespace.as_str(), self.key.as_str()]);
        Ok(url)
    }
}

/// Count from a counter response body; `None` when the body has no numeric
/// `value`.
pub fn parse_count(body: &str) -> Result<Option<u64>> {
    let json: serde_json::Value =
        serde_json::from_str(body).context("visitor counter returned invalid JSON")?;
    Ok(json.get("value").and_then(serde_json::Value::as_u64))
}

/// Count this run as a visit: `hit` on the first run from this machine
/// (falling back to `get` if `hit` fails), `get` afterwards.
pub fn record_visit(
    counter: &VisitorCounter,
    cache_dir: &Path,
    token: &CancellationToken,
) -> Result<Option<u64>> {
    token.check("visited lookup")?;
    let visited = cache::load_visited(cache_dir, counter.namespace(), counter.key());

    let count = match visited {
        Some(at) => {
            debug!(visited_at_ms = at, "Returning visitor; reading count");
            token.check("get")?;
            counter.get()?
        }
        None => {
            token.check("hit")?;
            let hit = counter.hit();
            // The attempt counts as the visit, whatever the fallback does.
            cache::save_visited(cache_dir, counter.namespace(), counter.key());
            match hit {
                Ok(count) => count,
                Err(err) => {
                    warn!("Visitor hit failed, reading count instead: {err:#}");
                    token.check("get")?;
                    counter.get()?
                }
            }
        }
    };

    info!(count = ?count, namespace = counter.namespace(), "Visitor count");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread;

    const NAMESPACE: &str = "portfolio_synectron";
    const KEY: &str = "unique_visitors";
    /// Nothing listens on port 1, so every request is refused.
    const UNREACHABLE: &str = "http://127.0.0.1:1";

    fn counter(base: &str) -> VisitorCounter {
        VisitorCounter::new(base, NAMESPACE, KEY).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "scroll-sync-visitors-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    /// Serves `replies.len()` requests, one per connection, answering each
    /// with the given status and body. Yields the request paths it saw.
    fn serve(replies: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let worker = thread::spawn(move || {
            let mut paths = Vec::new();
            for (status, body) in replies {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                paths.push(request_line.split_whitespace().nth(1).unwrap_or("").to_string());
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    if header.trim().is_empty() {
                        break;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            paths
        });
        (base, worker)
    }

    #[test]
    fn builds_hit_and_get_urls() {
        let counter = counter("https://api.countapi.xyz");
        assert_eq!(
            counter.url(CounterAction::Hit).unwrap().as_str(),
            "https://api.countapi.xyz/hit/portfolio_synectron/unique_visitors"
        );
        assert_eq!(
            counter.url(CounterAction::Get).unwrap().as_str(),
            "https://api.countapi.xyz/get/portfolio_synectron/unique_visitors"
        );
    }

    #[test]
    fn url_segments_are_encoded() {
        let counter = VisitorCounter::new("https://counter.test/api/", "my site", "a/b").unwrap();
        assert_eq!(
            counter.url(CounterAction::Get).unwrap().as_str(),
            "https://counter.test/api/get/my%20site/a%2Fb"
        );
    }

    #[test]
    fn rejects_unusable_api_base() {
        assert!(VisitorCounter::new("not a url", "ns", "key").is_err());
        assert!(VisitorCounter::new("mailto:someone@example.com", "ns", "key").is_err());
    }

    #[test]
    fn parses_count_bodies() {
        assert_eq!(parse_count(r#"{"value": 42}"#).unwrap(), Some(42));
        assert_eq!(parse_count(r#"{"value": "42"}"#).unwrap(), None);
        assert_eq!(parse_count("{}").unwrap(), None);
        assert!(parse_count("<html>").is_err());
    }

    #[test]
    fn cancelled_visit_makes_no_request() {
        let token = CancellationToken::new();
        token.cancel();
        let dir = std::env::temp_dir().join(format!("scroll-sync-visitors-{}", std::process::id()));
        let err = record_visit(&counter("https://api.countapi.xyz"), &dir, &token).unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert_eq!(cache::load_visited(&dir, "portfolio_synectron", "unique_visitors"), None);
    }

    #[test]
    fn first_visit_hits_and_marks_visited() {
        let dir = scratch_dir("first");
        let (base, server) = serve(vec![(200, r#"{"value": 8}"#)]);
        let count = record_visit(&counter(&base), &dir, &CancellationToken::new()).unwrap();
        assert_eq!(count, Some(8));
        assert_eq!(server.join().unwrap(), vec![format!("/hit/{NAMESPACE}/{KEY}")]);
        assert!(cache::load_visited(&dir, NAMESPACE, KEY).is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_hit_falls_back_to_get() {
        let dir = scratch_dir("fallback");
        let (base, server) = serve(vec![(500, "{}"), (200, r#"{"value": 7}"#)]);
        let count = record_visit(&counter(&base), &dir, &CancellationToken::new()).unwrap();
        assert_eq!(count, Some(7));
        assert_eq!(
            server.join().unwrap(),
            vec![format!("/hit/{NAMESPACE}/{KEY}"), format!("/get/{NAMESPACE}/{KEY}")]
        );
        assert!(cache::load_visited(&dir, NAMESPACE, KEY).is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_hit_and_get_still_mark_visited() {
        let dir = scratch_dir("both-fail");
        let result = record_visit(&counter(UNREACHABLE), &dir, &CancellationToken::new());
        assert!(result.is_err());
        assert!(cache::load_visited(&dir, NAMESPACE, KEY).is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn returning_visitor_only_reads() {
        let dir = scratch_dir("returning");
        cache::save_visited(&dir, NAMESPACE, KEY);
        let (base, server) = serve(vec![(200, r#"{"value": 12}"#)]);
        let count = record_visit(&counter(&base), &dir, &CancellationToken::new()).unwrap();
        assert_eq!(count, Some(12));
        assert_eq!(server.join().unwrap(), vec![format!("/get/{NAMESPACE}/{KEY}")]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn returning_visitor_keeps_flag_when_get_fails() {
        let dir = scratch_dir("returning-fail");
        cache::save_visited(&dir, NAMESPACE, KEY);
        assert!(record_visit(&counter(UNREACHABLE), &dir, &CancellationToken::new()).is_err());
        assert!(cache::load_visited(&dir, NAMESPACE, KEY).is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

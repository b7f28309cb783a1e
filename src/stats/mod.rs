//! Per-request instrumentation.
//!
//! Every request is timed. What happens with the measurement is up to the
//! [`StatsObserver`] installed at start-up: with `STATS=on` it is logged,
//! otherwise it is dropped.

mod middleware;
mod user_agent;

pub use middleware::with_stats;
pub use user_agent::{browser_name, classify, os_name};

use crate::config::Config;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Labels attached to each observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    pub host: Option<String>,
    pub endpoint: String,
    pub os: String,
    pub browser: String,
}

impl Tags {
    pub fn new(path: &str, user_agent: &str, host: Option<String>) -> Self {
        let (os, browser) = classify(user_agent);
        Self {
            host,
            endpoint: endpoint_name(path),
            os,
            browser,
        }
    }

    /// `base.host.endpoint.os.browser`, dropping the host segment when no
    /// host is known and writing `no-<tag>` for empty values.
    pub fn metric_name(&self, base: &str) -> String {
        let mut name = String::from(base);
        let mut segments: Vec<(&str, &str)> = Vec::with_capacity(4);
        if let Some(host) = &self.host {
            segments.push(("host", host.as_str()));
        }
        segments.push(("endpoint", self.endpoint.as_str()));
        segments.push(("os", self.os.as_str()));
        segments.push(("browser", self.browser.as_str()));

        for (key, value) in segments {
            name.push('.');
            if value.is_empty() {
                name.push_str("no-");
                name.push_str(key);
            } else {
                push_clean(&mut name, value);
            }
        }
        name
    }
}

/// Last path segment, `/` for the root.
fn endpoint_name(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

fn push_clean(buf: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '{' | '}' | '/' | '\\' | ':' | ' ' | '\t' | '.' => buf.push('-'),
            _ => buf.push(c),
        }
    }
}

/// Receives timing observations. Implementations must not fail or block for
/// long; they run inline with the request.
pub trait StatsObserver: Send + Sync {
    fn request_received(&self, tags: &Tags, at: DateTime<Utc>);
    fn record_latency(&self, tags: &Tags, elapsed: Duration);
}

pub struct LogObserver;

impl StatsObserver for LogObserver {
    fn request_received(&self, tags: &Tags, at: DateTime<Utc>) {
        log::info!("{} at: {}", tags.metric_name("requestFrom"), at.to_rfc3339());
    }

    fn record_latency(&self, tags: &Tags, elapsed: Duration) {
        log::info!(
            "RecordLatency: {} = {:?}",
            tags.metric_name("handler.latency"),
            elapsed
        );
    }
}

pub struct NoopObserver;

impl StatsObserver for NoopObserver {
    fn request_received(&self, _: &Tags, _: DateTime<Utc>) {}
    fn record_latency(&self, _: &Tags, _: Duration) {}
}

/// Shared app data for [`with_stats`].
#[derive(Clone)]
pub struct Stats {
    observer: Arc<dyn StatsObserver>,
    host: Option<String>,
}

impl Stats {
    pub fn new(observer: Arc<dyn StatsObserver>, host: Option<String>) -> Self {
        Self { observer, host }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopObserver), None)
    }

    pub fn from_config(cfg: &Config) -> Self {
        if !cfg.stats {
            return Self::disabled();
        }
        let host = cfg.stats_host.clone().or_else(local_hostname);
        Self::new(Arc::new(LogObserver), host)
    }

    pub fn tags(&self, path: &str, user_agent: &str) -> Tags {
        Tags::new(path, user_agent, self.host.clone())
    }

    pub fn observer(&self) -> &dyn StatsObserver {
        self.observer.as_ref()
    }
}

fn local_hostname() -> Option<String> {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

    #[test]
    fn endpoint_is_last_segment() {
        assert_eq!(endpoint_name("/v1/messages/12"), "12");
        assert_eq!(endpoint_name("/v1/messages/"), "messages");
        assert_eq!(endpoint_name("/hello"), "hello");
        assert_eq!(endpoint_name("/"), "/");
        assert_eq!(endpoint_name(""), "/");
    }

    #[test]
    fn metric_name_with_host() {
        let tags = Tags::new("/v1/messages", FIREFOX_LINUX, Some("web.01".into()));
        assert_eq!(
            tags.metric_name("requestFrom"),
            "requestFrom.web-01.messages.Linux.Firefox"
        );
    }

    #[test]
    fn metric_name_without_host_or_agent() {
        let tags = Tags::new("/", "", None);
        assert_eq!(
            tags.metric_name("handler.latency"),
            "handler.latency.-.no-os.no-browser"
        );
    }

    #[test]
    fn disabled_stats_carry_no_host() {
        let stats = Stats::from_config(&Config::default());
        assert_eq!(stats.tags("/hello", "").host, None);
    }

    #[test]
    fn configured_host_wins() {
        let cfg = Config {
            stats: true,
            stats_host: Some("api-1".into()),
            ..Config::default()
        };
        let stats = Stats::from_config(&cfg);
        assert_eq!(stats.tags("/hello", "").host.as_deref(), Some("api-1"));
    }
}

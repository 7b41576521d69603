use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::{jsonld, HttpFetch, SourceError};
use crate::models::Event;

/// Listing page the remote source scrapes.
pub const DEFAULT_REMOTE_URL: &str = "https://idziemynamiasto.pl";

/// Per-attempt timeout for each proxied request.
pub const REMOTE_TIMEOUT_SECS: u64 = 15;

/// Placeholder replaced by the percent-encoded target URL.
const URL_PLACEHOLDER: &str = "{url}";

/// Public relays tried in order when no proxies are configured.
pub const DEFAULT_PROXY_TEMPLATES: [&str; 2] = [
    "https://api.allorigins.win/raw?url={url}",
    "https://corsproxy.io/?{url}",
];

/// URL-rewriting strategy for reaching the target through an intermediary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTemplate {
    template: String,
}

impl ProxyTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_PROXY_TEMPLATES.iter().map(|t| Self::new(*t)).collect()
    }

    /// Proxied URL for `target`. A template without a placeholder gets the
    /// encoded target appended.
    pub fn rewrite(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        if self.template.contains(URL_PLACEHOLDER) {
            self.template.replace(URL_PLACEHOLDER, &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

/// The live listing page, reached through an ordered list of proxies.
pub struct RemoteSource {
    http: Arc<dyn HttpFetch>,
    target: String,
    proxies: Vec<ProxyTemplate>,
}

impl RemoteSource {
    pub fn new(http: Arc<dyn HttpFetch>, target: impl Into<String>, proxies: Vec<ProxyTemplate>) -> Self {
        Self {
            http,
            target: target.into(),
            proxies,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Try each proxy in turn and return the events of the first one that
    /// yields any. Errors, timeouts and empty pages all advance to the next
    /// proxy; running out of proxies is a terminal failure.
    pub async fn fetch(&self) -> Result<Vec<Event>, SourceError> {
        for (index, proxy) in self.proxies.iter().enumerate() {
            match self.try_proxy(proxy).await {
                Ok(events) if !events.is_empty() => {
                    info!(proxy = index, count = events.len(), "Loaded events through proxy");
                    return Ok(events);
                }
                Ok(_) => {
                    warn!(proxy = index, template = proxy.as_str(), "Proxy returned no events");
                }
                Err(e) => {
                    warn!(proxy = index, template = proxy.as_str(), error = %e, "Proxy failed");
                }
            }
        }

        Err(SourceError::ProxiesExhausted {
            attempts: self.proxies.len(),
        })
    }

    async fn try_proxy(&self, proxy: &ProxyTemplate) -> Result<Vec<Event>, SourceError> {
        let url = proxy.rewrite(&self.target);
        let html = self
            .http
            .fetch(&url, Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .await?
            .into_success_body()?;
        Ok(jsonld::parse_events(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::FakeHttp;

    const TARGET: &str = "https://idziemynamiasto.pl";
    const FIRST: &str = "https://api.allorigins.win/raw?url=https%3A%2F%2Fidziemynamiasto.pl";
    const SECOND: &str = "https://corsproxy.io/?https%3A%2F%2Fidziemynamiasto.pl";

    fn listing(name: &str) -> String {
        format!(
            r#"<script type="application/ld+json">{{"@type":"ItemList","itemListElement":[{{"position":1,"item":{{"name":"{}"}}}}]}}</script>"#,
            name
        )
    }

    fn source(http: Arc<FakeHttp>) -> RemoteSource {
        RemoteSource::new(http, TARGET, ProxyTemplate::defaults())
    }

    #[test]
    fn test_rewrite_encodes_target() {
        let proxies = ProxyTemplate::defaults();
        assert_eq!(proxies[0].rewrite(TARGET), FIRST);
        assert_eq!(proxies[1].rewrite(TARGET), SECOND);
        assert_eq!(
            ProxyTemplate::new("https://relay.example/?q=").rewrite("https://a.b/?x=1&y=2"),
            "https://relay.example/?q=https%3A%2F%2Fa.b%2F%3Fx%3D1%26y%3D2"
        );
    }

    #[tokio::test]
    async fn test_first_proxy_wins() {
        let http = Arc::new(
            FakeHttp::new()
                .respond(FIRST, 200, &listing("Pierwszy"))
                .respond(SECOND, 200, &listing("Drugi")),
        );
        let events = source(http.clone()).fetch().await.unwrap();
        assert_eq!(events[0].name, "Pierwszy");
        assert_eq!(http.calls(), vec![FIRST.to_string()]);
        assert_eq!(http.timeouts(), vec![Duration::from_secs(REMOTE_TIMEOUT_SECS)]);
    }

    #[tokio::test]
    async fn test_falls_through_on_status_timeout_and_empty() {
        for first in [
            FakeHttp::new().respond(FIRST, 500, "boom"),
            FakeHttp::new().timeout(FIRST),
            FakeHttp::new().respond(FIRST, 200, "<html>no data</html>"),
        ] {
            let http = Arc::new(first.respond(SECOND, 200, &listing("Drugi")));
            let events = source(http.clone()).fetch().await.unwrap();
            assert_eq!(events[0].name, "Drugi");
            assert_eq!(http.calls(), vec![FIRST.to_string(), SECOND.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let http = Arc::new(FakeHttp::new().respond(SECOND, 200, "<html></html>"));
        let err = source(http.clone()).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::ProxiesExhausted { attempts: 2 }));
        assert_eq!(http.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_proxies_is_exhausted() {
        let http = Arc::new(FakeHttp::new());
        let err = RemoteSource::new(http.clone(), TARGET, Vec::new()).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::ProxiesExhausted { attempts: 0 }));
        assert!(http.calls().is_empty());
    }
}

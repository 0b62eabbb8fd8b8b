//! HTTP retrieval of raw feed and page bodies.
//!
//! A [`Fetcher`] issues exactly one GET per call and hands back the body text.
//! There is no retry or backoff; redirects follow reqwest's default policy.
//! Headers mimic a desktop browser because several sources refuse bare
//! clients.

use crate::config::HttpConfig;
use crate::error::FetchError;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher from the HTTP section of the hub config.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        if let Ok(v) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, v);
        }
        if let Ok(v) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout());
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET `url` and return the body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the feed or page
    /// * `timeout` - Overrides the client's configured timeout for this call
    ///   only; `None` keeps the default
    ///
    /// # Returns
    ///
    /// The response body as text.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] for connection failures and timeouts,
    /// [`FetchError::Status`] for any non-2xx response.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        let mut request = self.client.get(url);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        info!(bytes = body.len(), "Fetched body");
        Ok(body)
    }

    /// Try each URL once, in order, returning the first successful body.
    ///
    /// Used for sources that publish the same document under alternate
    /// endpoints. Each URL is requested at most once.
    ///
    /// # Returns
    ///
    /// The first successful body, or the last endpoint's error.
    /// [`FetchError::NoUrl`] when `urls` is empty.
    #[instrument(level = "info", skip_all, fields(candidates = urls.len()))]
    pub async fn fetch_first(
        &self,
        urls: &[String],
        timeout: Option<Duration>,
    ) -> Result<String, FetchError> {
        let mut last_err = FetchError::NoUrl;
        for url in urls {
            match self.fetch(url, timeout).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!(%url, error = %e, "Endpoint failed; trying next");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::{local_http, serve};
    use super::*;

    fn fetcher() -> Fetcher {
        Fetcher::new(&local_http()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let base = serve(vec![("200 OK", "<rss></rss>".to_string())]).await;
        let body = fetcher().fetch(&format!("{base}/feed"), None).await.unwrap();
        assert_eq!(body, "<rss></rss>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_status_error() {
        let base = serve(vec![("403 Forbidden", "nope".to_string())]).await;
        let err = fetcher().fetch(&format!("{base}/feed"), None).await.unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 403),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = fetcher()
            .fetch(&format!("http://{addr}/"), Some(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_per_call_timeout_overrides_client_default() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer.
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let started = std::time::Instant::now();
        let err = fetcher()
            .fetch(&format!("http://{addr}/feed"), Some(Duration::from_millis(300)))
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        match err {
            FetchError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_first_falls_through_to_alternate() {
        let base = serve(vec![
            ("404 Not Found", String::new()),
            ("200 OK", "second".to_string()),
        ])
        .await;
        let urls = vec![format!("{base}/feed/"), format!("{base}/feed")];
        let body = fetcher().fetch_first(&urls, None).await.unwrap();
        assert_eq!(body, "second");
    }

    #[tokio::test]
    async fn test_fetch_first_with_no_urls() {
        let err = fetcher().fetch_first(&[], None).await.unwrap_err();
        assert!(matches!(err, FetchError::NoUrl));
    }
}

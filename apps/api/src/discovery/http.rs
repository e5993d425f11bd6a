//! Plain HTTP backend for server-rendered pages.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::debug;

use crate::discovery::fetch::{
    pick_user_agent, BackendKind, FetchConfig, FetchError, StaticFetcher, StaticResponse,
};

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(config.static_timeout)
            .user_agent(pick_user_agent())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::unavailable(BackendKind::Http, e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.static_timeout,
        })
    }
}

#[async_trait]
impl StaticFetcher for HttpFetcher {
    async fn fetch_static(&self, url: &str) -> Result<StaticResponse, FetchError> {
        debug!(url = %url, "Fetching page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }
            } else {
                FetchError::Http(e)
            }
        })?;

        Ok(StaticResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            static_timeout: timeout,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_static_returns_status_and_body() {
        let app = Router::new()
            .route("/jobs", get(|| async { "<div class=\"job-card\">Rust</div>" }))
            .route("/gone", get(|| async { (StatusCode::NOT_FOUND, "missing") }));
        let addr = serve(app).await;
        let fetcher = fetcher(Duration::from_secs(5));

        let ok = fetcher
            .fetch_static(&format!("http://{addr}/jobs"))
            .await
            .unwrap();
        assert_eq!(ok.status, 200);
        assert!(ok.body.contains("job-card"));

        let missing = fetcher
            .fetch_static(&format!("http://{addr}/gone"))
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_static_times_out() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let addr = serve(app).await;
        let fetcher = fetcher(Duration::from_millis(200));

        let err = fetcher
            .fetch_static(&format!("http://{addr}/slow"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    }
}

// src/fetch/gate.rs
// =============================================================================
// The only place the crawler talks to the network.
//
// Key functionality:
// - Admits at most K requests at a time across the whole crawl; everyone
//   else waits on a semaphore
// - Makes a GET request with a fixed User-Agent
// - Hands back the body only if the server says it's HTML
// - Turns every failure (DNS, refused connection, timeout, broken body) into
//   "no page" plus a warning; nothing here aborts a crawl
//
// Crawl tasks are unbounded (one per discovered link), so this semaphore is
// the crawler's only backpressure on outgoing requests.
// =============================================================================

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::config::{CrawlConfig, USER_AGENT};

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct FetchGate {
    client: Client,
    permits: Arc<Semaphore>,
    limit: usize,
}

impl FetchGate {
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let redirect_policy = if config.follow_redirects {
            redirect::Policy::limited(5)
        } else {
            redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .redirect(redirect_policy)
            .build()?;

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(config.concurrency)),
            limit: config.concurrency,
        })
    }

    /// The admission cap K.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held by an in-flight request.
    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Turns away every fetch still waiting for a permit, and every later
    /// one. Requests already holding a permit are unaffected.
    pub fn close(&self) {
        self.permits.close();
    }

    // Fetches a page and returns it only if it is HTML
    //
    // Returns None for transport errors and non-HTML responses.
    // The semaphore permit lives in `_permit` and is released when this
    // function returns, whichever path it takes.
    pub async fn fetch(&self, url: &Url) -> Option<Page> {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                debug!(%url, "fetch gate closed, skipping");
                return None;
            }
        };

        debug!(%url, "fetching");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %describe_error(&e), "fetch failed");
                return None;
            }
        };

        let status = response.status();
        if status.is_redirection() {
            let target = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            debug!(%url, status = status.as_u16(), location = target, "http redirect");
        } else if status.is_client_error() || status.is_server_error() {
            debug!(%url, status = status.as_u16(), "http error");
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            debug!(%url, content_type = %content_type, "not html, skipping");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(Page { content_type, body }),
            Err(e) => {
                warn!(%url, error = %describe_error(&e), "failed to read body");
                None
            }
        }
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

// reqwest errors can happen for many reasons; give the log line a short,
// readable cause instead of the full error chain
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate(seed: &str, concurrency: usize) -> FetchGate {
        let config = CrawlConfig::new(seed).unwrap().with_concurrency(concurrency);
        FetchGate::new(&config).unwrap()
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("Text/HTML; charset=UTF-8"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(html("<a href='/x'>X</a>"))
            .expect(1)
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 4);
        let url = Url::parse(&server.uri()).unwrap();
        let page = gate.fetch(&url).await.expect("html page");
        assert!(page.body.contains("href='/x'"));
        assert!(page.content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_non_html_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 4);
        let url = Url::parse(&format!("{}/data.json", server.uri())).unwrap();
        assert!(gate.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_error_status_still_classified() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(b"<a href='/home'>Home</a>".to_vec(), "text/html"),
            )
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 4);
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let page = gate.fetch(&url).await.expect("404 pages with html bodies are kept");
        assert!(page.body.contains("/home"));
    }

    #[tokio::test]
    async fn test_redirect_not_followed_by_default() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(html("<p>new</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 4);
        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        assert!(gate.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_closed_gate_skips_without_requesting() {
        let server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(html("<p>never served</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 4);
        gate.close();
        let url = Url::parse(&server.uri()).unwrap();
        assert!(gate.fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_permit_released_after_transport_failure() {
        // Grab a free port, then close it so the connection is refused
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let seed = format!("http://{addr}/");
        let gate = gate(&seed, 1);
        let url = Url::parse(&seed).unwrap();

        assert!(gate.fetch(&url).await.is_none());
        assert_eq!(gate.available(), 1);
        // A second fetch must not deadlock on the single permit
        assert!(gate.fetch(&url).await.is_none());
        assert_eq!(gate.available(), gate.limit());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_admission_cap_holds_permit_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(html("<p>slow</p>").set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let gate = gate(&server.uri(), 2);
        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

        let mut in_flight = Vec::new();
        for _ in 0..3 {
            let gate = gate.clone();
            let url = url.clone();
            in_flight.push(tokio::spawn(async move { gate.fetch(&url).await }));
        }

        tokio::time::sleep(Duration::from_millis(150)).await;
        // Two requests hold both permits, the third is queued
        assert_eq!(gate.available(), 0);

        for handle in in_flight {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(gate.available(), 2);
    }
}

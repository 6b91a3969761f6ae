use std::time::{Duration, Instant};

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, SERVER};
use reqwest::{Client, Response, Version};
use tokio::time::timeout;
use tracing::debug;

use statuslite_core::probe::{ProbeError, ProbeResponse, Transport};

/// reqwest-backed transport for the health checker
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(format!("statuslite/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn header(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn network_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::TimedOut
    } else {
        ProbeError::Network(e.to_string())
    }
}

/// Reason phrase as sent on the status line.
///
/// hyper keeps the phrase only when it differs from the canonical one, so a
/// missing phrase on HTTP/1.x means the canonical text was sent. HTTP/2 and
/// later carry no phrase at all.
fn reason_phrase(response: &Response) -> Option<String> {
    if let Some(phrase) = response.extensions().get::<ReasonPhrase>() {
        return Some(String::from_utf8_lossy(phrase.as_bytes()).into_owned());
    }
    let version = response.version();
    if version == Version::HTTP_2 || version == Version::HTTP_3 {
        return None;
    }
    response.status().canonical_reason().map(str::to_string)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, deadline: Duration) -> Result<ProbeResponse, ProbeError> {
        let started = Instant::now();

        let response = timeout(deadline, self.client.get(url).send())
            .await
            .map_err(|_| ProbeError::TimedOut)?
            .map_err(network_error)?;

        let elapsed = started.elapsed();
        let status = response.status();
        let status_text = reason_phrase(&response);
        let content_type = header(response.headers(), CONTENT_TYPE);
        let server = header(response.headers(), SERVER);

        let mut probe = ProbeResponse {
            status_code: status.as_u16(),
            ok: status.is_success(),
            status_text,
            content_type,
            server,
            body: None,
            elapsed,
        };

        // Only JSON bodies feed metrics; anything else is done once headers arrive.
        // A body that fails or outlives the deadline leaves latency-only metrics.
        if probe.is_json() {
            let remaining = deadline.saturating_sub(started.elapsed());
            probe.body = match timeout(remaining, response.text()).await {
                Ok(Ok(body)) => Some(body),
                Ok(Err(e)) => {
                    debug!(url, "could not read body: {}", e);
                    None
                }
                Err(_) => {
                    debug!(url, "body did not arrive before the deadline");
                    None
                }
            };
        }

        Ok(probe)
    }
}

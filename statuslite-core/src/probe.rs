//! Health checker
//!
//! One bounded-time HTTP probe per service. All failure is absorbed here and
//! turned into a status plus a metrics map; nothing is surfaced as an error.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::extract::extract;
use crate::model::{MetricValue, Metrics, ServiceRecord, ServiceStatus};

/// Hard deadline for a single probe
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Responses slower than this are classified as degraded
pub const DEGRADED_THRESHOLD_MS: u64 = 1_500;

pub const LATENCY_KEY: &str = "Latency";
pub const SERVER_KEY: &str = "Server";
pub const TYPE_KEY: &str = "Type";
pub const TIMEOUT_SENTINEL: &str = "Timeout";

/// What the transport saw once response headers arrived
#[derive(Clone, Debug, Default)]
pub struct ProbeResponse {
    pub status_code: u16,
    /// The response was a success (2xx)
    pub ok: bool,
    pub status_text: Option<String>,
    pub content_type: Option<String>,
    pub server: Option<String>,
    /// Body text, read only for JSON responses; `None` when it was not read
    pub body: Option<String>,
    /// Time from call start until response headers were received
    pub elapsed: Duration,
}

impl ProbeResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    pub fn latency_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Why a probe produced no response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeError {
    /// The deadline passed before headers arrived
    TimedOut,
    /// DNS, connect, TLS or any other transport failure
    Network(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::TimedOut => write!(f, "probe timed out"),
            ProbeError::Network(reason) => write!(f, "network error: {}", reason),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Outbound HTTP seam used by the checker
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET that must complete within `deadline`
    async fn get(&self, url: &str, deadline: Duration) -> Result<ProbeResponse, ProbeError>;
}

/// Map availability and latency to a status
pub fn classify(ok: bool, latency_ms: u64) -> ServiceStatus {
    if !ok {
        ServiceStatus::Outage
    } else if latency_ms > DEGRADED_THRESHOLD_MS {
        ServiceStatus::Degraded
    } else {
        ServiceStatus::Operational
    }
}

/// Build the metrics map for a response that arrived
pub fn response_metrics(response: &ProbeResponse) -> Metrics {
    let mut metrics = Metrics::new();
    metrics.insert(
        LATENCY_KEY.into(),
        MetricValue::Text(format!("{}ms", response.latency_ms())),
    );

    if response.is_json() {
        match response.body.as_deref().map(serde_json::from_str::<serde_json::Value>) {
            Some(Ok(value)) => metrics.extend(extract(&value)),
            Some(Err(e)) => debug!("response declared JSON but did not parse: {}", e),
            None => debug!("JSON body unavailable, keeping latency only"),
        }
    } else {
        if let Some(server) = &response.server {
            metrics.insert(SERVER_KEY.into(), MetricValue::Text(server.clone()));
        }
        let kind = response
            .status_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("HTML");
        metrics.insert(TYPE_KEY.into(), MetricValue::text(kind));
    }

    metrics
}

/// Metrics recorded when no response arrived
pub fn failure_metrics() -> Metrics {
    let mut metrics = Metrics::new();
    metrics.insert(LATENCY_KEY.into(), MetricValue::text(TIMEOUT_SENTINEL));
    metrics
}

/// Probes services through a [`Transport`]
pub struct HealthChecker<T> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> HealthChecker<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: PROBE_TIMEOUT,
        }
    }

    /// Override the probe deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Probe one service and return an updated copy.
    ///
    /// Records without a URL come back unchanged.
    pub async fn check(&self, record: &ServiceRecord) -> ServiceRecord {
        let Some(url) = record.probe_url() else {
            return record.clone();
        };

        let mut next = record.clone();

        match self.transport.get(url, self.timeout).await {
            Ok(response) => {
                next.status = classify(response.ok, response.latency_ms());
                next.metrics = response_metrics(&response);
                debug!(
                    service = %record.id,
                    url,
                    code = response.status_code,
                    latency_ms = response.latency_ms(),
                    status = %next.status,
                    "probe completed"
                );
            }
            Err(e) => {
                next.status = ServiceStatus::Outage;
                next.metrics = failure_metrics();
                warn!(service = %record.id, url, "probe failed: {}", e);
            }
        }

        next
    }

    /// Probe every service concurrently and wait for the whole batch.
    ///
    /// Results come back in input order.
    pub async fn check_all(&self, records: &[ServiceRecord]) -> Vec<ServiceRecord> {
        join_all(records.iter().map(|r| self.check(r))).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Canned transport keyed by URL
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: BTreeMap<String, Result<ProbeResponse, ProbeError>>,
        pub(crate) calls: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeTransport {
        pub(crate) fn respond(mut self, url: &str, result: Result<ProbeResponse, ProbeError>) -> Self {
            self.responses.insert(url.to_string(), result);
            self
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str, deadline: Duration) -> Result<ProbeResponse, ProbeError> {
            self.calls.lock().unwrap().push((url.to_string(), deadline));
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(ProbeError::Network("connection refused".into())))
        }
    }

    pub(crate) fn html(ms: u64, status_text: Option<&str>) -> ProbeResponse {
        ProbeResponse {
            status_code: 200,
            ok: true,
            status_text: status_text.map(str::to_string),
            content_type: Some("text/html; charset=utf-8".into()),
            server: None,
            body: None,
            elapsed: Duration::from_millis(ms),
        }
    }

    pub(crate) fn json(ms: u64, body: &str) -> ProbeResponse {
        ProbeResponse {
            status_code: 200,
            ok: true,
            status_text: Some("OK".into()),
            content_type: Some("application/json".into()),
            server: Some("nginx".into()),
            body: Some(body.into()),
            elapsed: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(true, 120), ServiceStatus::Operational);
        assert_eq!(classify(true, 1500), ServiceStatus::Operational);
        assert_eq!(classify(true, 1501), ServiceStatus::Degraded);
        assert_eq!(classify(false, 5), ServiceStatus::Outage);
        assert_eq!(classify(false, 5000), ServiceStatus::Outage);
    }

    #[tokio::test]
    async fn test_no_url_is_unchanged() {
        let checker = HealthChecker::new(FakeTransport::default());
        let mut record = ServiceRecord::new("1", "cron").with_status(ServiceStatus::Degraded);
        record.metrics.insert("Jobs".into(), MetricValue::from(3));

        assert_eq!(checker.check(&record).await, record);
        assert_eq!(checker.check(&record.clone().with_url("")).await.status, ServiceStatus::Degraded);
        assert!(checker.transport().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_html_is_degraded() {
        let url = "https://slow.example.com";
        let transport = FakeTransport::default().respond(url, Ok(html(2000, Some("OK"))));
        let checker = HealthChecker::new(transport);

        let record = ServiceRecord::new("1", "site").with_url(url);
        let checked = checker.check(&record).await;

        assert_eq!(checked.status, ServiceStatus::Degraded);
        assert_eq!(checked.metrics[LATENCY_KEY], MetricValue::text("2000ms"));
        assert_eq!(checked.metrics[TYPE_KEY], MetricValue::text("OK"));
        assert!(!checked.metrics.contains_key(SERVER_KEY));
    }

    #[tokio::test]
    async fn test_html_defaults_and_server_header() {
        let url = "https://example.com";
        let mut response = html(80, None);
        response.server = Some("cloudflare".into());
        let checker = HealthChecker::new(FakeTransport::default().respond(url, Ok(response)));

        let checked = checker.check(&ServiceRecord::new("1", "site").with_url(url)).await;

        assert_eq!(checked.status, ServiceStatus::Operational);
        assert_eq!(checked.metrics[TYPE_KEY], MetricValue::text("HTML"));
        assert_eq!(checked.metrics[SERVER_KEY], MetricValue::text("cloudflare"));
    }

    #[tokio::test]
    async fn test_timeout_sentinel() {
        let url = "https://hang.example.com";
        let transport = FakeTransport::default().respond(url, Err(ProbeError::TimedOut));
        let checker = HealthChecker::new(transport);

        let mut record = ServiceRecord::new("1", "hang").with_url(url);
        record.metrics.insert("stale".into(), MetricValue::from(1));
        let checked = checker.check(&record).await;

        assert_eq!(checked.status, ServiceStatus::Outage);
        assert_eq!(checked.metrics, failure_metrics());
        assert_eq!(checked.metrics.len(), 1);

        let calls = checker.transport().calls.lock().unwrap();
        assert_eq!(calls[0].1, PROBE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_network_error_collapses_to_timeout() {
        let checker = HealthChecker::new(FakeTransport::default());
        let record = ServiceRecord::new("1", "gone").with_url("https://nxdomain.invalid");

        let checked = checker.check(&record).await;
        assert_eq!(checked.status, ServiceStatus::Outage);
        assert_eq!(checked.metrics[LATENCY_KEY], MetricValue::text(TIMEOUT_SENTINEL));
    }

    #[tokio::test]
    async fn test_http_error_is_outage() {
        let url = "https://broken.example.com";
        let mut response = json(30, r#"{"error":"boom"}"#);
        response.ok = false;
        response.status_code = 503;
        let checker = HealthChecker::new(FakeTransport::default().respond(url, Ok(response)));

        let checked = checker.check(&ServiceRecord::new("1", "api").with_url(url)).await;
        assert_eq!(checked.status, ServiceStatus::Outage);
        assert_eq!(checked.metrics[LATENCY_KEY], MetricValue::text("30ms"));
    }

    #[tokio::test]
    async fn test_json_metrics_merged() {
        let url = "https://httpbin.org/uuid";
        let body = r#"{"uuid":"6f1b2c4e-8d55-4c3b-a0f8-3f0a3d1e9c77"}"#;
        let checker = HealthChecker::new(FakeTransport::default().respond(url, Ok(json(250, body))));

        let checked = checker.check(&ServiceRecord::new("3", "uuid").with_url(url)).await;
        assert_eq!(checked.status, ServiceStatus::Operational);
        assert_eq!(checked.metrics.len(), 2);
        assert_eq!(
            checked.metrics["uuid"],
            MetricValue::text("6f1b2c4e-8d55-4c3b-a0f8-3f0a3d1e9c77")
        );
        assert!(!checked.metrics.contains_key(SERVER_KEY));
    }

    #[tokio::test]
    async fn test_bad_json_keeps_latency_only() {
        let url = "https://api.example.com";
        let checker =
            HealthChecker::new(FakeTransport::default().respond(url, Ok(json(10, "{not json"))));

        let checked = checker.check(&ServiceRecord::new("1", "api").with_url(url)).await;
        assert_eq!(checked.status, ServiceStatus::Operational);
        assert_eq!(checked.metrics.len(), 1);
        assert_eq!(checked.metrics[LATENCY_KEY], MetricValue::text("10ms"));
    }

    #[tokio::test]
    async fn test_unread_json_body_keeps_latency_only() {
        let url = "https://api.example.com";
        let response = ProbeResponse {
            body: None,
            ..json(25, "")
        };
        let checker = HealthChecker::new(FakeTransport::default().respond(url, Ok(response)));

        let checked = checker.check(&ServiceRecord::new("1", "api").with_url(url)).await;
        assert_eq!(checked.status, ServiceStatus::Operational);
        assert_eq!(checked.metrics.len(), 1);
        assert_eq!(checked.metrics[LATENCY_KEY], MetricValue::text("25ms"));
    }

    #[tokio::test]
    async fn test_check_all_preserves_order() {
        let transport = FakeTransport::default()
            .respond("https://a", Ok(html(10, None)))
            .respond("https://b", Err(ProbeError::TimedOut));
        let checker = HealthChecker::new(transport);

        let records = vec![
            ServiceRecord::new("a", "A").with_url("https://a"),
            ServiceRecord::new("internal", "Internal"),
            ServiceRecord::new("b", "B").with_url("https://b"),
        ];
        let checked = checker.check_all(&records).await;

        let ids: Vec<&str> = checked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "internal", "b"]);
        assert_eq!(checked[0].status, ServiceStatus::Operational);
        assert_eq!(checked[1], records[1]);
        assert_eq!(checked[2].status, ServiceStatus::Outage);
    }
}

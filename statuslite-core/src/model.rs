use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type ServiceId = String;

/// Labeled display values shown next to a service
pub type Metrics = BTreeMap<String, MetricValue>;

pub const DEFAULT_DESCRIPTION: &str = "System Service";

/// Uptime label a freshly added monitor starts with
pub const NEW_SERVICE_UPTIME: &str = "100%";

/// Three-point health scale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Operational,
    Degraded,
    Outage,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 3] = [
        ServiceStatus::Operational,
        ServiceStatus::Degraded,
        ServiceStatus::Outage,
    ];

    /// Next status in the manual cycle: operational -> degraded -> outage -> operational
    pub fn next(self) -> Self {
        match self {
            ServiceStatus::Operational => ServiceStatus::Degraded,
            ServiceStatus::Degraded => ServiceStatus::Outage,
            ServiceStatus::Outage => ServiceStatus::Operational,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Outage => "outage",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A metric value is either a number or a piece of text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(serde_json::Number),
    Text(String),
}

impl MetricValue {
    pub fn text(s: impl Into<String>) -> Self {
        MetricValue::Text(s.into())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

impl From<i64> for MetricValue {
    fn from(n: i64) -> Self {
        MetricValue::Number(n.into())
    }
}

/// One monitored entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub name: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Probe target; `None` marks an internal service that is never checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub status: ServiceStatus,

    #[serde(default)]
    pub metrics: Metrics,

    /// Caller-supplied display string, never computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.into()
}

/// Trimmed description, or the default when missing or blank
pub(crate) fn description_or_default(description: Option<&str>) -> String {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_description)
}

impl ServiceRecord {
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: default_description(),
            url: None,
            status: ServiceStatus::Operational,
            metrics: Metrics::new(),
            uptime: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = status;
        self
    }

    /// The probe target, if the service has a non-empty URL
    pub fn probe_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn is_internal(&self) -> bool {
        self.probe_url().is_none()
    }

    /// Copy of this record with its status advanced one step. Metrics are untouched.
    pub fn cycled(&self) -> Self {
        let mut next = self.clone();
        next.status = self.status.next();
        next
    }
}

/// Errors raised while building a record from user input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    EmptyName,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyName => write!(f, "service name cannot be empty"),
        }
    }
}

impl std::error::Error for ModelError {}

/// User input for a new service
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl NewService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the input and mint a fresh record with a new id
    pub fn build(self) -> Result<ServiceRecord, ModelError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }

        let description = description_or_default(self.description.as_deref());

        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(ServiceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            url,
            status: ServiceStatus::Operational,
            metrics: Metrics::new(),
            uptime: Some(NEW_SERVICE_UPTIME.into()),
        })
    }
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{ServiceRecord, description_or_default};
use crate::store::{DEFAULT_STORAGE_KEY, MetricsPolicy};

pub const CONFIG_ENV: &str = "STATUSLITE_CONFIG";
pub const CONFIG_VERSION: &str = "1";
pub const CONFIG_NAMES: [&str; 4] = [
    "statuslite.yml",
    "statuslite.yaml",
    ".statuslite.yml",
    ".statuslite.yaml",
];

/// Seed service definition in the config file
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedService {
    /// Stable id (defaults to the 1-based position in the list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Probe target; leave out for internal services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Fixed uptime label shown instead of metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Config file version
    #[serde(default = "default_version")]
    pub version: String,

    /// Page title shown in the banner
    #[serde(default = "default_title")]
    pub title: String,

    /// Key the service list is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Where the file-backed store lives (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Replace or merge metrics on each check
    #[serde(default)]
    pub metrics_policy: MetricsPolicy,

    /// Services used when nothing has been stored yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<SeedService>>,
}

fn default_version() -> String {
    CONFIG_VERSION.into()
}
fn default_title() -> String {
    "Status".into()
}
fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            title: default_title(),
            storage_key: default_storage_key(),
            data_dir: None,
            metrics_policy: MetricsPolicy::default(),
            services: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    EmptyServiceName { index: usize },
    DuplicateServiceId { id: String },
    EmptyStorageKey,
    UnsupportedVersion { found: String },
    NotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Yaml(e) => write!(f, "YAML parse error: {}", e),
            Self::EmptyServiceName { index } => {
                write!(f, "service #{} has an empty name", index + 1)
            }
            Self::DuplicateServiceId { id } => write!(f, "duplicate service id '{}'", id),
            Self::EmptyStorageKey => write!(f, "storage_key cannot be empty"),
            Self::UnsupportedVersion { found } => write!(
                f,
                "unsupported config version '{}' (expected '{}')",
                found, CONFIG_VERSION
            ),
            Self::NotFound { searched } => {
                write!(f, "no config file found, searched: {:?}", searched)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl StatusConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: StatusConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file: `env_path` (the value of `$STATUSLITE_CONFIG`) first,
    /// then `start_dir` and its parents
    pub fn discover(start_dir: &Path, env_path: Option<&Path>) -> Result<(PathBuf, Self), ConfigError> {
        let mut searched = Vec::new();

        if let Some(env_path) = env_path {
            let path = env_path.to_path_buf();
            if path.exists() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        let mut dir = Some(start_dir);
        while let Some(current) = dir {
            for name in &CONFIG_NAMES {
                let path = current.join(name);
                if path.exists() {
                    return Ok((path.clone(), Self::load(&path)?));
                }
                searched.push(path);
            }
            dir = current.parent();
        }

        Err(ConfigError::NotFound { searched })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim() != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version.clone(),
            });
        }

        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        let mut seen = BTreeSet::new();
        for (index, svc) in self.services.iter().flatten().enumerate() {
            if svc.name.trim().is_empty() {
                return Err(ConfigError::EmptyServiceName { index });
            }
            let id = seed_id(svc, index);
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateServiceId { id });
            }
        }

        Ok(())
    }

    /// Records to seed an empty store with
    pub fn seed_records(&self) -> Vec<ServiceRecord> {
        match &self.services {
            Some(services) => services
                .iter()
                .enumerate()
                .map(|(index, svc)| ServiceRecord {
                    id: seed_id(svc, index),
                    name: svc.name.trim().to_string(),
                    description: description_or_default(svc.description.as_deref()),
                    url: svc.url.clone().filter(|u| !u.trim().is_empty()),
                    uptime: svc.uptime.clone(),
                    ..ServiceRecord::new("", "")
                })
                .collect(),
            None => default_services(),
        }
    }

    /// YAML written by `statuslite init`
    pub fn starter_yaml() -> Result<String, ConfigError> {
        let config = StatusConfig {
            title: "My Status Page".into(),
            services: Some(
                default_services()
                    .into_iter()
                    .map(|r| SeedService {
                        id: Some(r.id),
                        name: r.name,
                        description: Some(r.description),
                        url: r.url,
                        uptime: r.uptime,
                    })
                    .collect(),
            ),
            ..StatusConfig::default()
        };
        Ok(serde_yaml::to_string(&config)?)
    }
}

fn seed_id(svc: &SeedService, index: usize) -> String {
    svc.id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Bundled list used when neither the store nor the config provide services
pub fn default_services() -> Vec<ServiceRecord> {
    vec![
        ServiceRecord::new("1", "GitHub Profile")
            .with_description("Fetching real user data")
            .with_url("https://api.github.com/users/octocat"),
        ServiceRecord::new("2", "IP Info (HttpBin)")
            .with_description("Public IP & Origin check")
            .with_url("https://httpbin.org/get"),
        ServiceRecord::new("3", "UUID Generator")
            .with_description("Testing JSON response")
            .with_url("https://httpbin.org/uuid"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_DESCRIPTION;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
title: Acme Status
metrics_policy: merge
services:
  - name: API
    url: https://api.acme.test/health
  - id: db
    name: Database
    description: Primary Postgres
    uptime: "99.98%"
"#;
        let config = StatusConfig::from_str(yaml).unwrap();
        assert_eq!(config.title, "Acme Status");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.metrics_policy, MetricsPolicy::Merge);

        let records = config.seed_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(records[1].id, "db");
        assert!(records[1].is_internal());
        assert_eq!(records[1].uptime.as_deref(), Some("99.98%"));
    }

    #[test]
    fn test_empty_config_uses_bundled_services() {
        let config = StatusConfig::from_str("{}").unwrap();
        assert_eq!(config.metrics_policy, MetricsPolicy::Replace);
        assert_eq!(config.seed_records(), default_services());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
services:
  - id: "2"
    name: First
  - name: Second
"#;
        let result = StatusConfig::from_str(yaml);
        assert!(matches!(result, Err(ConfigError::DuplicateServiceId { .. })));
    }

    #[test]
    fn test_empty_name_rejected() {
        let yaml = r#"
services:
  - name: "  "
"#;
        let result = StatusConfig::from_str(yaml);
        assert!(matches!(result, Err(ConfigError::EmptyServiceName { index: 0 })));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = StatusConfig::from_str("metrics_policy: sometimes\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_starter_yaml_parses_back() {
        let yaml = StatusConfig::starter_yaml().unwrap();
        let config = StatusConfig::from_str(&yaml).unwrap();
        assert_eq!(config.title, "My Status Page");
        assert_eq!(config.seed_records(), default_services());
    }

    #[test]
    fn test_discover_walks_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("statuslite.yml"), "title: Found\n").unwrap();

        let (path, config) = StatusConfig::discover(&nested, None).unwrap();
        assert_eq!(path, dir.path().join("statuslite.yml"));
        assert_eq!(config.title, "Found");
    }

    #[test]
    fn test_discover_prefers_env_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("statuslite.yml"), "title: Local\n").unwrap();
        let elsewhere = dir.path().join("elsewhere.yml");
        std::fs::write(&elsewhere, "title: From Env\n").unwrap();

        let (path, config) = StatusConfig::discover(dir.path(), Some(&elsewhere)).unwrap();
        assert_eq!(path, elsewhere);
        assert_eq!(config.title, "From Env");

        // a dangling env path falls through to the directory search
        let missing = dir.path().join("missing.yml");
        let (path, config) = StatusConfig::discover(dir.path(), Some(&missing)).unwrap();
        assert_eq!(path, dir.path().join("statuslite.yml"));
        assert_eq!(config.title, "Local");
    }

    #[test]
    fn test_discover_reports_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        match StatusConfig::discover(dir.path(), Some(&missing)) {
            Err(ConfigError::NotFound { searched }) => {
                assert_eq!(searched[0], missing);
                assert!(searched.contains(&dir.path().join("statuslite.yml")));
            }
            other => panic!("expected NotFound, got {:?}", other.map(|(p, _)| p)),
        }
    }

    #[test]
    fn test_seed_description_trimmed_or_defaulted() {
        let yaml = r#"
services:
  - name: Blank
    description: "   "
  - name: Padded
    description: "  Edge cache  "
"#;
        let records = StatusConfig::from_str(yaml).unwrap().seed_records();
        assert_eq!(records[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(records[1].description, "Edge cache");
    }

    #[test]
    fn test_unsupported_version_rejected() {
        assert!(StatusConfig::from_str("version: \"1\"\n").is_ok());
        let result = StatusConfig::from_str("version: \"2\"\n");
        match result {
            Err(ConfigError::UnsupportedVersion { found }) => assert_eq!(found, "2"),
            other => panic!("expected UnsupportedVersion, got {:?}", other.map(|c| c.version)),
        }
    }
}

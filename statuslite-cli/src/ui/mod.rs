pub mod theme;

use std::time::SystemTime;

use statuslite_core::model::ServiceRecord;

pub use theme::styles;

/// Format a SystemTime as HH:MM:SS (UTC)
pub fn format_timestamp(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => {
            let secs = duration.as_secs();
            let hours = (secs / 3600) % 24;
            let minutes = (secs / 60) % 60;
            let seconds = secs % 60;
            format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
        }
        Err(_) => "??:??:??".to_string(),
    }
}

/// Metrics as `key value` pairs, or the uptime label for services with none
pub fn metrics_line(record: &ServiceRecord) -> Option<String> {
    if record.metrics.is_empty() {
        return record.uptime.as_ref().map(|u| format!("Uptime {}", u));
    }

    let pairs: Vec<String> = record
        .metrics
        .iter()
        .map(|(k, v)| format!("{} {}", k, v))
        .collect();
    Some(pairs.join(" · "))
}

/// Where a service points, for display
pub fn target_label(record: &ServiceRecord) -> String {
    record
        .probe_url()
        .map(str::to_string)
        .unwrap_or_else(|| "internal".to_string())
}

//! One-shot service commands: list, add, remove, cycle, reset, status, check

use statuslite_core::model::{NewService, ServiceRecord, ServiceStatus};
use statuslite_core::probe::HealthChecker;
use statuslite_core::reducer::{Action, reduce};
use statuslite_core::store::ServiceStore;
use statuslite_core::summary::Summary;

use crate::context::Context;
use crate::transport::HttpTransport;
use crate::ui::{metrics_line, target_label};

const RESET: &str = "\x1b[0m";

fn color(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Operational => "\x1b[32m",
        ServiceStatus::Degraded => "\x1b[33m",
        ServiceStatus::Outage => "\x1b[31m",
    }
}

fn icon(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Operational => "✓",
        ServiceStatus::Degraded => "!",
        ServiceStatus::Outage => "✗",
    }
}

/// Exit code for `statuslite status`
pub fn exit_code(status: ServiceStatus) -> i32 {
    match status {
        ServiceStatus::Operational => 0,
        ServiceStatus::Degraded => 1,
        ServiceStatus::Outage => 2,
    }
}

fn open(ctx: &Context) -> Result<ServiceStore, String> {
    ctx.open_store().map_err(|e| e.to_string())
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn print_record(record: &ServiceRecord) {
    println!(
        "  {}{} {:<12}{} {:<8} {}",
        color(record.status),
        icon(record.status),
        record.status.label().to_uppercase(),
        RESET,
        short_id(&record.id),
        record.name
    );
    println!("    {} · {}", record.description, target_label(record));
    if let Some(metrics) = metrics_line(record) {
        println!("    {}", metrics);
    }
}

/// `3 monitor(s): 2 operational, 1 outage, 1 internal`; zero counts are left out
fn summary_counts(summary: &Summary) -> String {
    let mut parts: Vec<String> = ServiceStatus::ALL
        .into_iter()
        .filter(|status| summary.count(*status) > 0)
        .map(|status| format!("{} {}", summary.count(status), status.label()))
        .collect();
    if summary.internal > 0 {
        parts.push(format!("{} internal", summary.internal));
    }

    if parts.is_empty() {
        format!("{} monitor(s)", summary.monitors)
    } else {
        format!("{} monitor(s): {}", summary.monitors, parts.join(", "))
    }
}

fn print_summary(title: &str, records: &[ServiceRecord]) {
    let summary = Summary::from_records(records);
    println!(
        "{}\n{}{}{}  ({})\n",
        title,
        color(summary.overall),
        summary.headline(),
        RESET,
        summary_counts(&summary)
    );
}

pub fn run_list(ctx: &Context) -> Result<(), String> {
    let store = open(ctx)?;
    print_summary(&ctx.config.title, store.records());

    if store.is_empty() {
        println!("No services. Add one with `statuslite add --name <NAME>`.");
        return Ok(());
    }

    for record in store.records() {
        print_record(record);
    }
    Ok(())
}

pub fn run_add(
    ctx: &Context,
    name: String,
    description: Option<String>,
    url: Option<String>,
) -> Result<(), String> {
    let mut store = open(ctx)?;
    let service = NewService {
        name,
        description,
        url,
    };
    let outcome = reduce(&mut store, Action::Add(service)).map_err(|e| e.to_string())?;
    println!("{}", outcome);
    Ok(())
}

pub fn run_remove(ctx: &Context, id: &str) -> Result<(), String> {
    let mut store = open(ctx)?;
    let id = store.resolve(id).map_err(|e| e.to_string())?;
    let outcome = reduce(&mut store, Action::Remove { id }).map_err(|e| e.to_string())?;
    println!("{}", outcome);
    Ok(())
}

pub fn run_cycle(ctx: &Context, id: &str) -> Result<(), String> {
    let mut store = open(ctx)?;
    let id = store.resolve(id).map_err(|e| e.to_string())?;
    let outcome = reduce(&mut store, Action::Cycle { id }).map_err(|e| e.to_string())?;
    println!("{}", outcome);
    Ok(())
}

pub fn run_reset(ctx: &Context) -> Result<(), String> {
    let mut store = open(ctx)?;
    let outcome = reduce(&mut store, Action::Reset).map_err(|e| e.to_string())?;
    println!("{}", outcome);
    Ok(())
}

/// Print the overall status and return the matching exit code
pub fn run_status(ctx: &Context) -> Result<i32, String> {
    let store = open(ctx)?;
    let summary = Summary::from_records(store.records());
    println!("{}{}{}", color(summary.overall), summary.headline(), RESET);
    Ok(exit_code(summary.overall))
}

/// Probe every service once, persist the batch, then print the result
pub async fn run_check(ctx: &Context, json: bool) -> Result<(), String> {
    let mut store = open(ctx)?;
    let transport = HttpTransport::new().map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    let checker = HealthChecker::new(transport);

    if !json {
        println!("Checking {} service(s)...\n", store.len());
    }

    let results = checker.check_all(store.records()).await;
    reduce(&mut store, Action::ChecksCompleted { results }).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(store.records()).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }

    print_summary(&ctx.config.title, store.records());
    for record in store.records() {
        print_record(record);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ServiceStatus::Operational), 0);
        assert_eq!(exit_code(ServiceStatus::Degraded), 1);
        assert_eq!(exit_code(ServiceStatus::Outage), 2);
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            ServiceRecord::new("1", "API").with_url("https://api.test"),
            ServiceRecord::new("2", "Cron"),
            ServiceRecord::new("3", "Queue")
                .with_url("https://queue.test")
                .with_status(ServiceStatus::Outage),
        ];
        assert_eq!(
            summary_counts(&Summary::from_records(&records)),
            "3 monitor(s): 2 operational, 1 outage, 1 internal"
        );
        assert_eq!(summary_counts(&Summary::from_records(&[])), "0 monitor(s)");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3"), "3");
        assert_eq!(short_id("0b4f8c1e-92aa-4c7e"), "0b4f8c1e");
    }
}

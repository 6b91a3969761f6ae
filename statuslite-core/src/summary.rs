use crate::model::{ServiceRecord, ServiceStatus};

/// Worst status wins: any outage, then any degraded, else operational
pub fn overall_status<'a, I>(records: I) -> ServiceStatus
where
    I: IntoIterator<Item = &'a ServiceRecord>,
{
    let mut degraded = false;
    for record in records {
        match record.status {
            ServiceStatus::Outage => return ServiceStatus::Outage,
            ServiceStatus::Degraded => degraded = true,
            ServiceStatus::Operational => {}
        }
    }

    if degraded {
        ServiceStatus::Degraded
    } else {
        ServiceStatus::Operational
    }
}

/// Banner text for an overall status
pub fn headline(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Operational => "All Systems Operational",
        ServiceStatus::Degraded => "Performance Degraded",
        ServiceStatus::Outage => "System Outage",
    }
}

/// Aggregate view of the whole store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub overall: ServiceStatus,
    pub monitors: usize,
    pub operational: usize,
    pub degraded: usize,
    pub outage: usize,
    /// Services without a probe URL
    pub internal: usize,
}

impl Summary {
    pub fn from_records(records: &[ServiceRecord]) -> Self {
        let mut summary = Summary {
            overall: overall_status(records),
            monitors: records.len(),
            ..Summary::default()
        };

        for record in records {
            match record.status {
                ServiceStatus::Operational => summary.operational += 1,
                ServiceStatus::Degraded => summary.degraded += 1,
                ServiceStatus::Outage => summary.outage += 1,
            }
            if record.is_internal() {
                summary.internal += 1;
            }
        }

        summary
    }

    pub fn headline(&self) -> &'static str {
        headline(self.overall)
    }

    pub fn count(&self, status: ServiceStatus) -> usize {
        match status {
            ServiceStatus::Operational => self.operational,
            ServiceStatus::Degraded => self.degraded,
            ServiceStatus::Outage => self.outage,
        }
    }
}

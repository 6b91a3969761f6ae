use std::fmt;

use crate::model::{NewService, ServiceId, ServiceRecord, ServiceStatus};
use crate::store::{ServiceStore, StoreError};

/// Mutations the view controller can request
#[derive(Clone, Debug)]
pub enum Action {
    Add(NewService),
    Remove { id: ServiceId },
    Cycle { id: ServiceId },
    /// A full "check all" batch finished
    ChecksCompleted { results: Vec<ServiceRecord> },
    Reset,
}

/// What a reduced action did, for status lines and logs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Added { id: ServiceId, name: String },
    Removed { id: ServiceId, name: String },
    Cycled { id: ServiceId, status: ServiceStatus },
    Checked { updated: usize },
    Reset { count: usize },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { name, .. } => write!(f, "added {}", name),
            Outcome::Removed { name, .. } => write!(f, "removed {}", name),
            Outcome::Cycled { id, status } => write!(f, "{} is now {}", id, status),
            Outcome::Checked { updated } => write!(f, "checked {} service(s)", updated),
            Outcome::Reset { count } => write!(f, "restored {} default service(s)", count),
        }
    }
}

pub fn reduce(store: &mut ServiceStore, action: Action) -> Result<Outcome, StoreError> {
    match action {
        Action::Add(service) => {
            let record = store.add(service)?;
            Ok(Outcome::Added {
                id: record.id.clone(),
                name: record.name.clone(),
            })
        }
        Action::Remove { id } => {
            let removed = store.remove(&id)?;
            Ok(Outcome::Removed {
                id: removed.id,
                name: removed.name,
            })
        }
        Action::Cycle { id } => {
            let status = store.cycle(&id)?;
            Ok(Outcome::Cycled { id, status })
        }
        Action::ChecksCompleted { results } => {
            let updated = store.apply_checks(results)?;
            Ok(Outcome::Checked { updated })
        }
        Action::Reset => {
            store.reset()?;
            Ok(Outcome::Reset { count: store.len() })
        }
    }
}

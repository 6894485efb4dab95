//! Workshop error types

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one spawned task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerId {
    Dispatcher,
    Reindeer(usize),
    Elf(usize),
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerId::Dispatcher => write!(f, "dispatcher"),
            WorkerId::Reindeer(id) => write!(f, "reindeer-{}", id),
            WorkerId::Elf(id) => write!(f, "elf-{}", id),
        }
    }
}

/// Errors surfaced when tearing a simulation down
#[derive(Debug, Error)]
pub enum WorkshopError {
    #[error("{worker} panicked: {message}")]
    WorkerPanicked { worker: WorkerId, message: String },

    #[error("{} task(s) still running after {grace:?}: {}", .stuck.len(), format_workers(.stuck))]
    ShutdownTimeout { grace: Duration, stuck: Vec<WorkerId> },
}

fn format_workers(workers: &[WorkerId]) -> String {
    workers.iter().map(|w| w.to_string()).collect::<Vec<_>>().join(", ")
}

impl WorkshopError {
    /// Workers implicated by this error
    pub fn workers(&self) -> Vec<WorkerId> {
        match self {
            WorkshopError::WorkerPanicked { worker, .. } => vec![*worker],
            WorkshopError::ShutdownTimeout { stuck, .. } => stuck.clone(),
        }
    }
}

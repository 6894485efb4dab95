//! Event types for the workshop activity log

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workshop::DispatcherState;

/// Everything the workshop reports to its activity log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkshopEvent {
    /// A reindeer came back and is waiting to be hitched
    ReindeerReturned { id: usize, waiting: usize },
    /// The last reindeer of a team saw the delivery complete
    DeliveryFinished { id: usize },
    /// An elf was admitted to the queue
    ElfNeedsHelp { id: usize, waiting: usize },
    /// An elf finished its help session
    ElfHelped { id: usize, remaining: usize },
    /// The dispatcher moved to a new state
    DispatcherStateChanged {
        state: DispatcherState,
        reindeer_waiting: usize,
        elves_waiting: usize,
    },
    /// A delivery batch completed
    DeliveryCompleted { total: u32, goal: u32 },
    /// A help batch completed
    HelpCompleted { total: u32 },
    /// The delivery goal was reached; no further batches start
    GoalReached { deliveries: u32 },
    /// The speed multiplier changed
    SpeedChanged { speed: f64 },
    /// Shutdown was requested
    ShutdownRequested,
}

impl WorkshopEvent {
    /// Short name of the variant
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkshopEvent::ReindeerReturned { .. } => "ReindeerReturned",
            WorkshopEvent::DeliveryFinished { .. } => "DeliveryFinished",
            WorkshopEvent::ElfNeedsHelp { .. } => "ElfNeedsHelp",
            WorkshopEvent::ElfHelped { .. } => "ElfHelped",
            WorkshopEvent::DispatcherStateChanged { .. } => "DispatcherStateChanged",
            WorkshopEvent::DeliveryCompleted { .. } => "DeliveryCompleted",
            WorkshopEvent::HelpCompleted { .. } => "HelpCompleted",
            WorkshopEvent::GoalReached { .. } => "GoalReached",
            WorkshopEvent::SpeedChanged { .. } => "SpeedChanged",
            WorkshopEvent::ShutdownRequested => "ShutdownRequested",
        }
    }
}

impl fmt::Display for WorkshopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkshopEvent::ReindeerReturned { id, waiting } => {
                write!(f, "Reindeer {} returned from vacation (Total: {})", id, waiting)
            }
            WorkshopEvent::DeliveryFinished { .. } => write!(f, "All reindeer finished delivery"),
            WorkshopEvent::ElfNeedsHelp { id, waiting } => {
                write!(f, "Elf {} needs help (Total waiting: {})", id, waiting)
            }
            WorkshopEvent::ElfHelped { id, remaining } => {
                write!(f, "Elf {} finished getting help (Remaining: {})", id, remaining)
            }
            WorkshopEvent::DispatcherStateChanged { state, .. } => write!(f, "Santa is now {}", state),
            WorkshopEvent::DeliveryCompleted { total, goal } => write!(f, "Progress: {}/{} deliveries", total, goal),
            WorkshopEvent::HelpCompleted { total } => {
                write!(f, "Santa finished helping elves (Total helps: {})", total)
            }
            WorkshopEvent::GoalReached { deliveries } => {
                write!(f, "Workshop goal reached! ({} deliveries)", deliveries)
            }
            WorkshopEvent::SpeedChanged { speed } => write!(f, "Simulation speed set to {:.2}x", speed),
            WorkshopEvent::ShutdownRequested => write!(f, "Closing workshop..."),
        }
    }
}

/// Timestamped event, the unit written by JSON sinks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WorkshopEvent,
}

impl ActivityEntry {
    pub fn new(event: WorkshopEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

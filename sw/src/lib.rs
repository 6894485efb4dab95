//! Santa Workshop - rendezvous coordinator for the Santa Claus problem
//!
//! A dispatcher (Santa) sleeps until either all nine reindeer are back from
//! vacation or three elves need help. Reindeer always win when both groups are
//! ready. At most three elves may queue at once; the rest wait for admission.
//!
//! # Core Concepts
//!
//! - **One owned aggregate**: [`Workshop`] holds the counters, the mutex and
//!   every semaphore; tasks share it by `Arc`
//! - **No lost wakeups**: the increment that completes a batch and the wake it
//!   posts happen in the same critical section
//! - **Lock-free observation**: every mutation republishes a [`Snapshot`] on a
//!   watch channel
//! - **Bounded broadcast shutdown**: [`Workshop::shutdown`] posts each
//!   semaphore once per task that could be blocked on it
//!
//! # Modules
//!
//! - [`workshop`] - State, synchronization fabric and the three task loops
//! - [`events`] - Activity log events, bus and sinks
//! - [`simulation`] - Runner that spawns a full workshop and tears it down
//! - [`config`] - Configuration file loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod simulation;
pub mod workshop;

// Re-export commonly used types
pub use config::{Config, ShutdownConfig};
pub use error::{WorkerId, WorkshopError};
pub use events::{ActivityEntry, ActivitySink, ConsoleFormat, ConsoleSink, EventBus, WorkshopEvent};
pub use simulation::{Simulation, Summary};
pub use workshop::{
    DelayRange, DelaySampler, DispatcherState, ELF_BATCH, FixedSampler, REINDEER_TEAM, RandomSampler, Snapshot,
    TimingConfig, Workshop, WorkshopConfig,
};

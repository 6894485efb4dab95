//! Activity log for the workshop
//!
//! Every significant transition (a reindeer returning, an elf queueing, the
//! dispatcher changing state) emits a [`WorkshopEvent`] onto the [`EventBus`].
//! Consumers subscribe and drain on their own task, so a slow renderer can
//! never hold up a worker.
//!
//! ```text
//!   reindeer ─┐
//!   elves ────┼──► EventBus (bounded broadcast) ──► ActivitySink task(s)
//!   dispatcher┘
//! ```

mod bus;
mod sink;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use sink::{ActivitySink, ConsoleFormat, ConsoleSink, spawn_activity_sink};
pub use types::{ActivityEntry, WorkshopEvent};

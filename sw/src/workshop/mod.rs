//! Santa Claus rendezvous coordinator
//!
//! One dispatcher arbitrates between a team of nine reindeer and a pool of
//! elves. The dispatcher only acts on a full reindeer team or a full batch of
//! three elves, and always serves the reindeer first when both are ready.
//!
//! Synchronization is a single mutex over the counters plus six counting
//! semaphores:
//!
//! | semaphore            | initial | posted by                          | waited on by      |
//! |----------------------|---------|------------------------------------|-------------------|
//! | `wake_dispatcher`    | 0       | 9th reindeer, 3rd elf              | dispatcher        |
//! | `release_reindeer`   | 0       | dispatcher, 9 per delivery         | reindeer          |
//! | `admission_limit`    | 3       | elf leaving (permit drop)          | elf entering      |
//! | `elf_ready`          | 0       | dispatcher, 3 per help session     | elves             |
//! | `elf_done`           | 0       | each helped elf                    | dispatcher        |
//! | `last_reindeer_done` | 0       | dispatcher, once per delivery      | last reindeer     |

mod config;
mod core;
mod dispatcher;
mod elf;
mod pacing;
mod reindeer;
mod signal;
mod state;

pub use config::{TimingConfig, WorkshopConfig};
pub use core::Workshop;
pub use pacing::{DelayRange, DelaySampler, FixedSampler, Pacer, RandomSampler, normalize_speed, scale_delay};
pub use state::{DispatcherState, ELF_BATCH, REINDEER_TEAM, Snapshot};

//! Simulation runner - spawns a full workshop and drives it to the goal

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{WorkerId, WorkshopError};
use crate::workshop::{REINDEER_TEAM, Workshop, WorkshopConfig};

/// Totals reported when a simulation is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub deliveries: u32,
    pub helps: u32,
    #[serde(rename = "elapsed-ms")]
    pub elapsed_ms: u64,
}

/// A running workshop together with the handles of every task it spawned
pub struct Simulation {
    workshop: Arc<Workshop>,
    tasks: Vec<(WorkerId, JoinHandle<()>)>,
    started: Instant,
}

impl Simulation {
    /// Build a workshop from `config` and start all of its tasks
    pub fn start(config: WorkshopConfig) -> Self {
        let elves = config.clone().normalized().elves;
        Self::start_with(Workshop::new(config), elves)
    }

    /// Start the dispatcher, a full reindeer team and `elves` elves
    pub fn start_with(workshop: Arc<Workshop>, elves: usize) -> Self {
        info!(elves, reindeer = REINDEER_TEAM, "Simulation starting");
        let mut tasks = Vec::with_capacity(1 + REINDEER_TEAM + elves);
        tasks.push((WorkerId::Dispatcher, workshop.spawn_dispatcher()));
        for id in 0..REINDEER_TEAM {
            tasks.push((WorkerId::Reindeer(id), workshop.spawn_reindeer(id)));
        }
        for id in 0..elves {
            tasks.push((WorkerId::Elf(id), workshop.spawn_elf(id)));
        }
        Self {
            workshop,
            tasks,
            started: Instant::now(),
        }
    }

    pub fn workshop(&self) -> &Arc<Workshop> {
        &self.workshop
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Resolve once the delivery goal has been met
    pub async fn wait_for_goal(&self) {
        let goal = self.workshop.required_deliveries();
        debug!(goal, "Simulation::wait_for_goal: called");
        let mut rx = self.workshop.watch();
        // The sender lives inside the workshop we hold, so this cannot close.
        let _ = rx.wait_for(|s| s.total_deliveries >= goal).await;
        info!(goal, "Simulation goal reached");
    }

    /// Stop the workshop and join every task within `grace`
    ///
    /// Tasks still running when the grace period ends are aborted and
    /// reported. A panicked task is reported ahead of any timeout.
    pub async fn shutdown(self, grace: Duration) -> Result<Summary, WorkshopError> {
        debug!(?grace, "Simulation::shutdown: called");
        self.workshop.shutdown();

        let deadline = Instant::now() + grace;
        let mut stuck = Vec::new();
        let mut panicked = None;

        for (worker, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(%worker, error = %e, "task failed");
                    if panicked.is_none() {
                        panicked = Some(WorkshopError::WorkerPanicked {
                            worker,
                            message: panic_message(e),
                        });
                    }
                }
                Err(_) => {
                    warn!(%worker, "task did not stop within grace period, aborting");
                    handle.abort();
                    stuck.push(worker);
                }
            }
        }

        if let Some(err) = panicked {
            return Err(err);
        }
        if !stuck.is_empty() {
            return Err(WorkshopError::ShutdownTimeout { grace, stuck });
        }

        let snap = self.workshop.snapshot();
        let summary = Summary {
            deliveries: snap.total_deliveries,
            helps: snap.total_helps,
            elapsed_ms: saturating_millis(self.started.elapsed()),
        };
        info!(?summary, "Simulation stopped");
        Ok(summary)
    }

    /// Wait for the goal, then shut down
    pub async fn run_to_completion(self, grace: Duration) -> Result<Summary, WorkshopError> {
        self.wait_for_goal().await;
        self.shutdown(grace).await
    }
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

//! Dispatcher (Santa) loop

use std::sync::Arc;

use tracing::{debug, info};

use super::core::Workshop;
use super::state::{DispatcherState, ELF_BATCH, REINDEER_TEAM};
use crate::events::WorkshopEvent;

impl Workshop {
    /// Run the dispatcher until shutdown
    ///
    /// Each wake services at most one batch. A ready reindeer team always wins
    /// over a ready elf batch; the losing batch still has its own wake permit
    /// queued, so it is serviced on the next iteration.
    pub async fn run_dispatcher(self: Arc<Self>) {
        debug!("dispatcher started");
        loop {
            if !self.fabric.wake_dispatcher.wait().await || !self.is_running() {
                break;
            }

            let mut state = self.lock().await;

            if state.total_deliveries() >= self.required_deliveries {
                debug!("dispatcher woke after goal, staying asleep");
                self.transition(&mut state, DispatcherState::Sleeping);
                continue;
            }

            if state.team_ready() {
                self.transition(&mut state, DispatcherState::Delivering);
                self.fabric.release_reindeer.post(REINDEER_TEAM);
                self.pacer.pause_fixed(self.timing.sleigh_prep_ms).await;

                let total = state.delivery_finished();
                self.transition(&mut state, DispatcherState::Sleeping);
                info!(total, goal = self.required_deliveries, "delivery completed");
                self.events.emit(WorkshopEvent::DeliveryCompleted {
                    total,
                    goal: self.required_deliveries,
                });
                if total == self.required_deliveries {
                    info!(total, "delivery goal reached");
                    self.events.emit(WorkshopEvent::GoalReached { deliveries: total });
                }
                self.fabric.last_reindeer_done.post(1);
            } else if state.batch_ready() {
                self.transition(&mut state, DispatcherState::Helping);
                self.fabric.elf_ready.post(ELF_BATCH);
                // Helping runs unlocked; elves need the mutex to leave the queue.
                drop(state);

                self.pacer.pause_fixed(self.timing.help_session_ms).await;
                let mut interrupted = false;
                for _ in 0..ELF_BATCH {
                    if !self.fabric.elf_done.wait().await || !self.is_running() {
                        interrupted = true;
                        break;
                    }
                }
                if interrupted {
                    debug!("help session interrupted by shutdown");
                    break;
                }

                let mut state = self.lock().await;
                let total = state.help_finished();
                self.transition(&mut state, DispatcherState::Sleeping);
                info!(total, "help session completed");
                self.events.emit(WorkshopEvent::HelpCompleted { total });
            } else {
                debug!("dispatcher woke with nothing ready");
            }
        }
        debug!("dispatcher stopped");
    }
}

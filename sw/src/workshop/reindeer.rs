//! Reindeer worker loop

use std::sync::Arc;

use tracing::debug;

use super::core::Workshop;
use crate::events::WorkshopEvent;

impl Workshop {
    /// Run one reindeer until shutdown
    ///
    /// The reindeer whose arrival completes the team wakes the dispatcher and,
    /// after its own trip, waits on `last_reindeer_done` so it cannot start a
    /// new vacation before the dispatcher has closed the delivery out.
    pub async fn run_reindeer(self: Arc<Self>, id: usize) {
        debug!(id, "reindeer started");
        while self.is_running() {
            self.pacer.pause(self.timing.reindeer_vacation).await;
            if !self.is_running() {
                break;
            }

            let last_of_team = {
                let mut state = self.lock().await;
                let completes_team = state.reindeer_arrived();
                self.publish(&state);
                self.events.emit(WorkshopEvent::ReindeerReturned {
                    id,
                    waiting: state.snapshot().reindeer_count,
                });
                if completes_team {
                    debug!(id, "reindeer completes the team, waking dispatcher");
                    self.fabric.wake_dispatcher.post(1);
                }
                completes_team
            };

            if !self.fabric.release_reindeer.wait().await || !self.is_running() {
                break;
            }

            self.pacer.pause(self.timing.reindeer_hitch).await;

            if last_of_team {
                if !self.fabric.last_reindeer_done.wait().await || !self.is_running() {
                    break;
                }
                self.events.emit(WorkshopEvent::DeliveryFinished { id });
            }
        }
        debug!(id, "reindeer stopped");
    }
}

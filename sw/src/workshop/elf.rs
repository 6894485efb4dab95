//! Elf worker loop

use std::sync::Arc;

use tracing::debug;

use super::core::Workshop;
use crate::events::WorkshopEvent;

impl Workshop {
    /// Run one elf until shutdown
    ///
    /// An elf must hold an admission slot for the whole time it is queued or
    /// being helped. The slot is an RAII permit, so every exit path below
    /// gives it back.
    pub async fn run_elf(self: Arc<Self>, id: usize) {
        debug!(id, "elf started");
        while self.is_running() {
            self.pacer.pause(self.timing.elf_work).await;
            if !self.is_running() {
                break;
            }

            let Some(_slot) = self.fabric.admission_limit.hold().await else {
                break;
            };
            if !self.is_running() {
                break;
            }

            {
                let mut state = self.lock().await;
                let completes_batch = state.elf_arrived();
                self.publish(&state);
                self.events.emit(WorkshopEvent::ElfNeedsHelp {
                    id,
                    waiting: state.snapshot().elf_count,
                });
                if completes_batch {
                    debug!(id, "elf completes the batch, waking dispatcher");
                    self.fabric.wake_dispatcher.post(1);
                }
            }

            if !self.fabric.elf_ready.wait().await || !self.is_running() {
                break;
            }

            self.pacer.pause(self.timing.elf_help).await;

            {
                let mut state = self.lock().await;
                state.elf_left();
                self.publish(&state);
                self.events.emit(WorkshopEvent::ElfHelped {
                    id,
                    remaining: state.snapshot().elf_count,
                });
            }
            self.fabric.elf_done.post(1);
        }
        debug!(id, "elf stopped");
    }
}

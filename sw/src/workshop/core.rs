//! The Workshop aggregate: shared state, fabric and observation surface

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::config::{TimingConfig, WorkshopConfig};
use super::pacing::{DelaySampler, Pacer, RandomSampler};
use super::signal::{Fabric, PoolSizes};
use super::state::{DispatcherState, ELF_BATCH, Snapshot, WorkshopState};
use crate::events::{ActivitySink, EventBus, WorkshopEvent, spawn_activity_sink};

/// Coordinates the dispatcher, the reindeer team and the elves
///
/// A single instance is shared by `Arc` between every task of one simulation
/// run. All counter mutation happens under `state`; each mutation republishes
/// a [`Snapshot`] so observers never need the mutex.
pub struct Workshop {
    pub(super) state: Mutex<WorkshopState>,
    pub(super) fabric: Fabric,
    pub(super) pacer: Pacer,
    pub(super) timing: TimingConfig,
    pub(super) required_deliveries: u32,
    pub(super) events: EventBus,
    running: AtomicBool,
    snapshots: watch::Sender<Snapshot>,
    dispatchers: AtomicUsize,
    reindeer: AtomicUsize,
    elves: AtomicUsize,
}

impl Workshop {
    /// Create a workshop drawing delays from the thread RNG
    pub fn new(config: WorkshopConfig) -> Arc<Self> {
        Self::with_sampler(config, RandomSampler)
    }

    /// Create a workshop with a custom delay source
    pub fn with_sampler(config: WorkshopConfig, sampler: impl DelaySampler + 'static) -> Arc<Self> {
        let config = config.normalized();
        debug!(?config, "Workshop::with_sampler: called");
        let (snapshots, _) = watch::channel(Snapshot::default());
        Arc::new(Self {
            state: Mutex::new(WorkshopState::default()),
            fabric: Fabric::new(),
            pacer: Pacer::new(config.speed, Box::new(sampler)),
            timing: config.timing,
            required_deliveries: config.required_deliveries,
            events: EventBus::new(config.event_capacity),
            running: AtomicBool::new(true),
            snapshots,
            dispatchers: AtomicUsize::new(0),
            reindeer: AtomicUsize::new(0),
            elves: AtomicUsize::new(0),
        })
    }

    // === Observation ===

    /// Latest published counters, read without the mutex
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    pub fn reindeer_count(&self) -> usize {
        self.snapshot().reindeer_count
    }

    pub fn elf_count(&self) -> usize {
        self.snapshot().elf_count
    }

    pub fn dispatcher_state(&self) -> DispatcherState {
        self.snapshot().dispatcher_state
    }

    pub fn total_deliveries(&self) -> u32 {
        self.snapshot().total_deliveries
    }

    pub fn total_helps(&self) -> u32 {
        self.snapshot().total_helps
    }

    /// Receiver that sees every snapshot published from now on
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Free slots in the elf admission limiter, never more than [`ELF_BATCH`]
    ///
    /// Shutdown posts extra permits so blocked elves can leave; those are not
    /// slots and are not reported.
    pub fn admission_slots_free(&self) -> usize {
        self.fabric.admission_limit.available().min(ELF_BATCH)
    }

    /// Wakes posted to the dispatcher that it has not yet consumed
    pub fn wake_pending(&self) -> usize {
        self.fabric.wake_dispatcher.available()
    }

    pub fn required_deliveries(&self) -> u32 {
        self.required_deliveries
    }

    pub fn goal_reached(&self) -> bool {
        self.total_deliveries() >= self.required_deliveries
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    // === Activity log ===

    /// Registration point for activity log consumers
    pub fn subscribe(&self) -> broadcast::Receiver<WorkshopEvent> {
        self.events.subscribe()
    }

    /// Drain the activity log into `sink` on its own task
    ///
    /// The task ends once the workshop is dropped.
    pub fn attach_sink<S: ActivitySink>(&self, sink: S) -> JoinHandle<()> {
        debug!("Workshop::attach_sink: called");
        spawn_activity_sink(self.events.subscribe(), sink)
    }

    // === Control ===

    /// Change the speed multiplier; safe while workers are running
    pub fn set_speed(&self, speed: f64) -> f64 {
        debug!(speed, "Workshop::set_speed: called");
        let applied = self.pacer.set_speed(speed);
        self.events.emit(WorkshopEvent::SpeedChanged { speed: applied });
        applied
    }

    pub fn speed(&self) -> f64 {
        self.pacer.speed()
    }

    /// Stop every loop and unblock every waiting task
    ///
    /// Idempotent: only the first call releases the fabric, and only that call
    /// returns true.
    pub fn shutdown(&self) -> bool {
        debug!("Workshop::shutdown: called");
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Workshop::shutdown: already stopped");
            return false;
        }
        let pools = PoolSizes {
            dispatchers: self.dispatchers.load(Ordering::SeqCst),
            reindeer: self.reindeer.load(Ordering::SeqCst),
            elves: self.elves.load(Ordering::SeqCst),
        };
        info!(?pools, "Workshop shutting down");
        self.events.emit(WorkshopEvent::ShutdownRequested);
        self.fabric.release_all(pools);
        true
    }

    // === Spawning ===

    pub fn spawn_dispatcher(self: &Arc<Self>) -> JoinHandle<()> {
        self.dispatchers.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(Arc::clone(self).run_dispatcher())
    }

    pub fn spawn_reindeer(self: &Arc<Self>, id: usize) -> JoinHandle<()> {
        self.reindeer.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(Arc::clone(self).run_reindeer(id))
    }

    pub fn spawn_elf(self: &Arc<Self>, id: usize) -> JoinHandle<()> {
        self.elves.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(Arc::clone(self).run_elf(id))
    }

    // === Internal helpers for the loops ===

    pub(super) async fn lock(&self) -> MutexGuard<'_, WorkshopState> {
        self.state.lock().await
    }

    /// Republish the counters; call with the guard still held
    pub(super) fn publish(&self, state: &WorkshopState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Move the dispatcher to `next`, publishing and logging the change
    pub(super) fn transition(&self, state: &mut WorkshopState, next: DispatcherState) {
        let prev = state.set_dispatcher_state(next);
        self.publish(state);
        if prev != next {
            let snap = state.snapshot();
            debug!(%prev, %next, "dispatcher transition");
            self.events.emit(WorkshopEvent::DispatcherStateChanged {
                state: next,
                reindeer_waiting: snap.reindeer_count,
                elves_waiting: snap.elf_count,
            });
        }
    }
}

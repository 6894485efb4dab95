//! Shared workshop counters and the dispatcher state machine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reindeer needed before the dispatcher can deliver
pub const REINDEER_TEAM: usize = 9;

/// Elves needed before the dispatcher helps, and the admission limit
pub const ELF_BATCH: usize = 3;

/// What the dispatcher is doing right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherState {
    #[default]
    Sleeping,
    Helping,
    Delivering,
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatcherState::Sleeping => "sleeping",
            DispatcherState::Helping => "helping",
            DispatcherState::Delivering => "delivering",
        };
        write!(f, "{}", name)
    }
}

/// Point-in-time copy of the workshop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub reindeer_count: usize,
    pub elf_count: usize,
    pub dispatcher_state: DispatcherState,
    pub total_deliveries: u32,
    pub total_helps: u32,
}

/// Counters guarded by the workshop mutex
///
/// Every mutation goes through a method here so the threshold checks live next
/// to the increments that cross them.
#[derive(Debug, Default)]
pub(crate) struct WorkshopState {
    reindeer_count: usize,
    elf_count: usize,
    dispatcher_state: DispatcherState,
    total_deliveries: u32,
    total_helps: u32,
}

impl WorkshopState {
    /// Record a returning reindeer; true when it completes the team
    pub(crate) fn reindeer_arrived(&mut self) -> bool {
        self.reindeer_count += 1;
        self.reindeer_count == REINDEER_TEAM
    }

    /// Record an elf joining the queue; true when it completes the batch
    pub(crate) fn elf_arrived(&mut self) -> bool {
        self.elf_count += 1;
        self.elf_count == ELF_BATCH
    }

    pub(crate) fn elf_left(&mut self) {
        self.elf_count = self.elf_count.saturating_sub(1);
    }

    pub(crate) fn team_ready(&self) -> bool {
        self.reindeer_count >= REINDEER_TEAM
    }

    pub(crate) fn batch_ready(&self) -> bool {
        self.elf_count >= ELF_BATCH
    }

    /// Close out a delivery: the team is sent back on vacation
    pub(crate) fn delivery_finished(&mut self) -> u32 {
        self.reindeer_count = 0;
        self.total_deliveries += 1;
        self.total_deliveries
    }

    pub(crate) fn help_finished(&mut self) -> u32 {
        self.total_helps += 1;
        self.total_helps
    }

    pub(crate) fn set_dispatcher_state(&mut self, state: DispatcherState) -> DispatcherState {
        std::mem::replace(&mut self.dispatcher_state, state)
    }

    pub(crate) fn total_deliveries(&self) -> u32 {
        self.total_deliveries
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            reindeer_count: self.reindeer_count,
            elf_count: self.elf_count,
            dispatcher_state: self.dispatcher_state,
            total_deliveries: self.total_deliveries,
            total_helps: self.total_helps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = WorkshopState::default();
        let snap = state.snapshot();
        assert_eq!(snap.reindeer_count, 0);
        assert_eq!(snap.elf_count, 0);
        assert_eq!(snap.dispatcher_state, DispatcherState::Sleeping);
        assert_eq!(snap.total_deliveries, 0);
        assert_eq!(snap.total_helps, 0);
    }

    #[test]
    fn test_ninth_reindeer_completes_team() {
        let mut state = WorkshopState::default();
        for _ in 0..REINDEER_TEAM - 1 {
            assert!(!state.reindeer_arrived());
        }
        assert!(!state.team_ready());
        assert!(state.reindeer_arrived());
        assert!(state.team_ready());
    }

    #[test]
    fn test_third_elf_completes_batch() {
        let mut state = WorkshopState::default();
        assert!(!state.elf_arrived());
        assert!(!state.elf_arrived());
        assert!(!state.batch_ready());
        assert!(state.elf_arrived());
        assert!(state.batch_ready());

        state.elf_left();
        assert!(!state.batch_ready());
        assert_eq!(state.snapshot().elf_count, 2);
    }

    #[test]
    fn test_delivery_resets_team() {
        let mut state = WorkshopState::default();
        for _ in 0..REINDEER_TEAM {
            state.reindeer_arrived();
        }
        assert_eq!(state.delivery_finished(), 1);
        let snap = state.snapshot();
        assert_eq!(snap.reindeer_count, 0);
        assert_eq!(snap.total_deliveries, 1);
    }

    #[test]
    fn test_elf_left_never_underflows() {
        let mut state = WorkshopState::default();
        state.elf_left();
        assert_eq!(state.snapshot().elf_count, 0);
    }

    #[test]
    fn test_set_dispatcher_state_returns_previous() {
        let mut state = WorkshopState::default();
        let prev = state.set_dispatcher_state(DispatcherState::Delivering);
        assert_eq!(prev, DispatcherState::Sleeping);
        assert_eq!(state.snapshot().dispatcher_state, DispatcherState::Delivering);
    }

    #[test]
    fn test_dispatcher_state_display_and_serde() {
        assert_eq!(DispatcherState::Helping.to_string(), "helping");
        let json = serde_json::to_string(&DispatcherState::Delivering).unwrap();
        assert_eq!(json, "\"delivering\"");
    }
}

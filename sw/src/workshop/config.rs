//! Workshop configuration

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pacing::{DelayRange, normalize_speed};
use super::state::ELF_BATCH;
use crate::events::DEFAULT_CHANNEL_CAPACITY;

/// Workshop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopConfig {
    /// Number of elf workers (at least 3)
    #[serde(default = "default_elves")]
    pub elves: usize,

    /// Deliveries after which the dispatcher stops starting batches
    #[serde(rename = "required-deliveries", default = "default_required_deliveries")]
    pub required_deliveries: u32,

    /// Initial speed multiplier; delays are divided by it
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Capacity of the activity event channel
    #[serde(rename = "event-capacity", default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Delay ranges for every simulated activity
    #[serde(default)]
    pub timing: TimingConfig,
}

fn default_elves() -> usize {
    debug!("default_elves: called");
    10
}

fn default_required_deliveries() -> u32 {
    debug!("default_required_deliveries: called");
    20
}

fn default_speed() -> f64 {
    debug!("default_speed: called");
    1.0
}

fn default_event_capacity() -> usize {
    debug!("default_event_capacity: called");
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        debug!("WorkshopConfig::default: called");
        Self {
            elves: 10,
            required_deliveries: 20,
            speed: 1.0,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            timing: TimingConfig::default(),
        }
    }
}

impl WorkshopConfig {
    /// Clamp out-of-range values instead of rejecting them
    pub fn normalized(mut self) -> Self {
        debug!(?self, "WorkshopConfig::normalized: called");
        if self.elves < ELF_BATCH {
            warn!(elves = self.elves, min = ELF_BATCH, "WorkshopConfig: too few elves, clamping");
            self.elves = ELF_BATCH;
        }
        if self.required_deliveries == 0 {
            warn!("WorkshopConfig: required-deliveries is 0, using 1");
            self.required_deliveries = 1;
        }
        let speed = normalize_speed(self.speed);
        if speed != self.speed {
            warn!(speed = self.speed, "WorkshopConfig: non-positive speed, using 1.0");
            self.speed = speed;
        }
        if self.event_capacity == 0 {
            warn!("WorkshopConfig: event-capacity is 0, using default");
            self.event_capacity = DEFAULT_CHANNEL_CAPACITY;
        }
        self.timing = self.timing.normalized();
        self
    }
}

/// Simulated activity durations in milliseconds, before speed scaling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Time a reindeer spends away before returning
    #[serde(rename = "reindeer-vacation")]
    pub reindeer_vacation: DelayRange,

    /// Time a released reindeer spends hitched and travelling
    #[serde(rename = "reindeer-hitch")]
    pub reindeer_hitch: DelayRange,

    /// Time an elf works before needing help
    #[serde(rename = "elf-work")]
    pub elf_work: DelayRange,

    /// Time an elf spends receiving help
    #[serde(rename = "elf-help")]
    pub elf_help: DelayRange,

    /// Dispatcher time spent preparing the sleigh, mutex held
    #[serde(rename = "sleigh-prep-ms")]
    pub sleigh_prep_ms: u64,

    /// Dispatcher time spent helping a batch of elves
    #[serde(rename = "help-session-ms")]
    pub help_session_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reindeer_vacation: DelayRange::new(10, 20),
            reindeer_hitch: DelayRange::new(10, 30),
            elf_work: DelayRange::new(20, 40),
            elf_help: DelayRange::new(5, 10),
            sleigh_prep_ms: 100,
            help_session_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn normalized(self) -> Self {
        Self {
            reindeer_vacation: self.reindeer_vacation.normalized(),
            reindeer_hitch: self.reindeer_hitch.normalized(),
            elf_work: self.elf_work.normalized(),
            elf_help: self.elf_help.normalized(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkshopConfig::default();
        assert_eq!(config.elves, 10);
        assert_eq!(config.required_deliveries, 20);
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.timing.reindeer_vacation, DelayRange::new(10, 20));
        assert_eq!(config.timing.sleigh_prep_ms, 100);
    }

    #[test]
    fn test_normalized_clamps_bad_values() {
        let config = WorkshopConfig {
            elves: 1,
            required_deliveries: 0,
            speed: -2.0,
            event_capacity: 0,
            timing: TimingConfig {
                elf_work: DelayRange::new(40, 20),
                ..Default::default()
            },
        }
        .normalized();

        assert_eq!(config.elves, ELF_BATCH);
        assert_eq!(config.required_deliveries, 1);
        assert_eq!(config.speed, 1.0);
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.timing.elf_work, DelayRange::new(20, 40));
    }

    #[test]
    fn test_normalized_keeps_valid_values() {
        let config = WorkshopConfig {
            elves: 4,
            speed: 2.5,
            ..Default::default()
        };
        assert_eq!(config.clone().normalized(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "elves: 5\ntiming:\n  sleigh-prep-ms: 10\n";
        let config: WorkshopConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.elves, 5);
        assert_eq!(config.required_deliveries, 20);
        assert_eq!(config.timing.sleigh_prep_ms, 10);
        assert_eq!(config.timing.help_session_ms, 100);
        assert_eq!(config.timing.elf_help, DelayRange::new(5, 10));
    }

    #[test]
    fn test_kebab_case_keys() {
        let yaml = serde_yaml::to_string(&WorkshopConfig::default()).unwrap();
        assert!(yaml.contains("required-deliveries"));
        assert!(yaml.contains("reindeer-vacation"));
        assert!(yaml.contains("min-ms"));
    }
}

// src/monitoring/events.rs
//! Random clinical events, automatic adjustments and the event log

use super::sensors::SensorReadings;
use crate::config::constants::monitoring::*;
use crate::ventilator::{Command, SettingField, VentilatorSettings};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Patient events injected during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClinicalEvent {
    Bronchospasm,
    ComplianceChange,
    Disconnection,
    IncreasedDemand,
}

impl ClinicalEvent {
    pub const ALL: [ClinicalEvent; 4] = [
        ClinicalEvent::Bronchospasm,
        ClinicalEvent::ComplianceChange,
        ClinicalEvent::Disconnection,
        ClinicalEvent::IncreasedDemand,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            ClinicalEvent::Bronchospasm => BRONCHOSPASM_WEIGHT,
            ClinicalEvent::ComplianceChange => COMPLIANCE_CHANGE_WEIGHT,
            ClinicalEvent::Disconnection => DISCONNECTION_WEIGHT,
            ClinicalEvent::IncreasedDemand => INCREASED_DEMAND_WEIGHT,
        }
    }

    /// Weighted random pick
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match WeightedIndex::new(Self::ALL.iter().map(|e| e.weight())) {
            Ok(dist) => Self::ALL[dist.sample(rng)],
            // Weights are compile-time constants and all positive
            Err(_) => ClinicalEvent::Bronchospasm,
        }
    }

    /// Perturb the sensor readings and describe what happened
    pub fn apply<R: Rng + ?Sized>(&self, rng: &mut R, readings: &mut SensorReadings) -> String {
        match self {
            ClinicalEvent::Bronchospasm => {
                let (low, high) = BRONCHOSPASM_RESISTANCE_INCREASE;
                let change = rng.gen_range(low..=high);
                readings.effective_resistance += change;
                format!("Event: bronchospasm. Resistance rose by {change:.1} cmH2O/L/s")
            }
            ClinicalEvent::ComplianceChange => {
                let (low, high) = COMPLIANCE_SHIFT;
                readings.effective_compliance += rng.gen_range(low..=high);
                format!(
                    "Event: compliance change. New value {:.3} L/cmH2O",
                    readings.effective_compliance
                )
            }
            ClinicalEvent::Disconnection => {
                readings.expired_flow *= DISCONNECTION_FACTOR;
                readings.expired_volume *= DISCONNECTION_FACTOR;
                "Alert: possible disconnection or leak".to_string()
            }
            ClinicalEvent::IncreasedDemand => {
                readings.expired_flow *= DEMAND_FLOW_FACTOR;
                readings.heart_rate = readings
                    .heart_rate
                    .saturating_add(DEMAND_HEART_RATE_INCREASE)
                    .min(MAX_HEART_RATE_BPM);
                "Event: increased ventilatory demand".to_string()
            }
        }
    }

    /// Setting change the automatic mode makes in response, if any
    pub fn auto_adjustment(
        &self,
        settings: &VentilatorSettings,
        readings: &SensorReadings,
    ) -> Option<Command> {
        match self {
            ClinicalEvent::Bronchospasm => {
                let peep = (settings.peep + AUTO_PEEP_STEP).min(AUTO_PEEP_CEILING);
                (peep != settings.peep).then_some(Command::Set {
                    field: SettingField::Peep,
                    value: peep,
                })
            }
            ClinicalEvent::ComplianceChange => {
                let factor = readings.effective_compliance / settings.compliance;
                let target = (settings.tidal_volume_ml * factor)
                    .clamp(AUTO_TIDAL_VOLUME_FLOOR, AUTO_TIDAL_VOLUME_CEILING);
                ((target - settings.tidal_volume_ml).abs() > AUTO_TIDAL_VOLUME_MIN_CHANGE).then(|| {
                    Command::Set {
                        field: SettingField::TidalVolume,
                        value: target.trunc(),
                    }
                })
            }
            ClinicalEvent::IncreasedDemand => {
                let rate = (settings.respiratory_rate + AUTO_RATE_STEP).min(AUTO_RATE_CEILING);
                (rate != settings.respiratory_rate).then_some(Command::Set {
                    field: SettingField::RespiratoryRate,
                    value: rate,
                })
            }
            ClinicalEvent::Disconnection => None,
        }
    }
}

impl fmt::Display for ClinicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClinicalEvent::Bronchospasm => "bronchospasm",
            ClinicalEvent::ComplianceChange => "compliance change",
            ClinicalEvent::Disconnection => "disconnection",
            ClinicalEvent::IncreasedDemand => "increased demand",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Seconds since session start
    pub elapsed_secs: f64,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.elapsed_secs.max(0.0) as u64;
        write!(
            f,
            "[{:02}:{:02}:{:02}] {}",
            total / 3600,
            (total / 60) % 60,
            total % 60,
            self.message
        )
    }
}

/// Newest-first log bounded to `capacity` entries
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, elapsed_secs: f64, message: impl Into<String>) {
        self.entries.push_front(LogEntry {
            elapsed_secs,
            message: message.into(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = ClinicalEvent::ALL.iter().map(|e| e.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_choose_follows_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<ClinicalEvent, usize> = HashMap::new();
        for _ in 0..10_000 {
            *counts.entry(ClinicalEvent::choose(&mut rng)).or_default() += 1;
        }
        let bronchospasm = counts[&ClinicalEvent::Bronchospasm] as f64 / 10_000.0;
        let disconnection = counts[&ClinicalEvent::Disconnection] as f64 / 10_000.0;
        assert!((bronchospasm - 0.3).abs() < 0.03);
        assert!((disconnection - 0.2).abs() < 0.03);
    }

    #[test]
    fn test_event_effects() {
        let mut rng = StdRng::seed_from_u64(5);
        let base = SensorReadings {
            expired_flow: 20.0,
            expired_volume: 400.0,
            heart_rate: 175,
            ..Default::default()
        };

        let mut readings = base.clone();
        ClinicalEvent::Bronchospasm.apply(&mut rng, &mut readings);
        let rise = readings.effective_resistance - base.effective_resistance;
        assert!((5.0..=15.0).contains(&rise));

        let mut readings = base.clone();
        ClinicalEvent::Disconnection.apply(&mut rng, &mut readings);
        assert_eq!(readings.expired_flow, 10.0);
        assert_eq!(readings.expired_volume, 200.0);

        let mut readings = base.clone();
        ClinicalEvent::IncreasedDemand.apply(&mut rng, &mut readings);
        assert_eq!(readings.expired_flow, 30.0);
        assert_eq!(readings.heart_rate, MAX_HEART_RATE_BPM);
    }

    #[test]
    fn test_auto_adjustments() {
        let settings = VentilatorSettings::default();
        let readings = SensorReadings::default();

        assert_eq!(
            ClinicalEvent::Bronchospasm.auto_adjustment(&settings, &readings),
            Some(Command::Set { field: SettingField::Peep, value: 7.0 })
        );
        assert_eq!(
            ClinicalEvent::IncreasedDemand.auto_adjustment(&settings, &readings),
            Some(Command::Set { field: SettingField::RespiratoryRate, value: 20.0 })
        );
        assert_eq!(ClinicalEvent::Disconnection.auto_adjustment(&settings, &readings), None);

        let at_ceiling = VentilatorSettings {
            respiratory_rate: 35.0,
            ..Default::default()
        };
        assert_eq!(ClinicalEvent::IncreasedDemand.auto_adjustment(&at_ceiling, &readings), None);
    }

    #[test]
    fn test_compliance_adjustment_threshold() {
        let settings = VentilatorSettings::default();

        // 2% drop moves Vt by 10 mL: below the threshold
        let small = SensorReadings {
            effective_compliance: 0.049,
            ..Default::default()
        };
        assert_eq!(ClinicalEvent::ComplianceChange.auto_adjustment(&settings, &small), None);

        // Halved compliance asks for 250 mL, clamped to the 300 mL floor
        let large = SensorReadings {
            effective_compliance: 0.025,
            ..Default::default()
        };
        assert_eq!(
            ClinicalEvent::ComplianceChange.auto_adjustment(&settings, &large),
            Some(Command::Set { field: SettingField::TidalVolume, value: 300.0 })
        );
    }

    #[test]
    fn test_event_log_newest_first_and_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.record(i as f64, format!("event {i}"));
        }
        assert_eq!(log.len(), 3);
        let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["event 4", "event 3", "event 2"]);
    }

    #[test]
    fn test_log_entry_timestamp() {
        let entry = LogEntry {
            elapsed_secs: 3725.4,
            message: "Alert".to_string(),
        };
        assert_eq!(entry.to_string(), "[01:02:05] Alert");
    }
}

// src/config/constants.rs
//! System-wide configuration constants

/// Ventilator setting defaults and control ranges
pub mod ventilator {
    pub const DEFAULT_RESPIRATORY_RATE: f64 = 15.0;
    pub const MIN_RESPIRATORY_RATE: f64 = 5.0;
    pub const MAX_RESPIRATORY_RATE: f64 = 50.0;

    pub const DEFAULT_TIDAL_VOLUME_ML: f64 = 500.0;
    pub const MIN_TIDAL_VOLUME_ML: f64 = 200.0;
    pub const MAX_TIDAL_VOLUME_ML: f64 = 1000.0;

    pub const DEFAULT_PEEP_CMH2O: f64 = 5.0;
    pub const MIN_PEEP_CMH2O: f64 = 0.0;
    pub const MAX_PEEP_CMH2O: f64 = 20.0;

    pub const DEFAULT_PEAK_PRESSURE_CMH2O: f64 = 20.0;
    pub const MIN_PEAK_PRESSURE_CMH2O: f64 = 10.0;
    pub const MAX_PEAK_PRESSURE_CMH2O: f64 = 40.0;

    pub const DEFAULT_IE_RATIO: f64 = 1.2;
    pub const MIN_IE_RATIO: f64 = 0.5;
    pub const MAX_IE_RATIO: f64 = 3.0;

    pub const DEFAULT_PRESSURE_SUPPORT_CMH2O: f64 = 15.0;
    pub const MIN_PRESSURE_SUPPORT_CMH2O: f64 = 5.0;
    pub const MAX_PRESSURE_SUPPORT_CMH2O: f64 = 40.0;

    pub const DEFAULT_PLATEAU_TIME_S: f64 = 0.3;
    pub const MIN_PLATEAU_TIME_S: f64 = 0.1;
    pub const MAX_PLATEAU_TIME_S: f64 = 1.0;

    pub const DEFAULT_RESISTANCE: f64 = 10.0;
    pub const MIN_RESISTANCE: f64 = 5.0;
    pub const MAX_RESISTANCE: f64 = 50.0;

    pub const DEFAULT_COMPLIANCE: f64 = 0.05;
    pub const MIN_COMPLIANCE: f64 = 0.01;
    pub const MAX_COMPLIANCE: f64 = 0.1;
}

/// Closed-form waveform model coefficients
pub mod waveform {
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    /// Rate floor applied before dividing into a cycle length
    pub const MIN_EFFECTIVE_RATE: f64 = 1.0;

    // Volume-controlled inspiration
    pub const VC_INITIAL_FLOW_LPM: f64 = 38.0;
    pub const VC_FINAL_FLOW_LPM: f64 = 9.0;
    pub const VC_PRESSURE_RISE_RATE: f64 = 2.0;

    // Volume-controlled expiration
    pub const VC_PEAK_EXPIRATORY_FLOW_LPM: f64 = 50.0;
    pub const VC_EXPIRATORY_FLOW_DECAY: f64 = 7.0;
    pub const VC_EXPIRATORY_VOLUME_DECAY: f64 = 8.0;
    pub const LOW_PEEP_THRESHOLD: f64 = 1.0;
    pub const LOW_PEEP_DISPLAY_OFFSET: f64 = 0.4;

    // Pressure-controlled phase shares of inspiratory time
    pub const PC_RAMP_FRACTION: f64 = 0.2;
    pub const PC_MAX_PLATEAU_FRACTION: f64 = 0.5;

    pub const PC_RAMP_PRESSURE_RISE: f64 = 5.0;
    pub const PC_RELEASE_PRESSURE_DECAY: f64 = 8.0;
    pub const PC_EXPIRATORY_PRESSURE_DECAY: f64 = 5.0;

    pub const PC_PLATEAU_FLOW_FRACTION: f64 = 0.3;
    pub const PC_RELEASE_FLOW_FRACTION: f64 = 0.1;
    pub const PC_EXPIRATORY_FLOW_FRACTION: f64 = 0.7;
    pub const PC_EXPIRATORY_FLOW_DECAY: f64 = 6.0;

    pub const PC_RAMP_END_VOLUME_FRACTION: f64 = 0.5;
    pub const PC_PLATEAU_END_VOLUME_FRACTION: f64 = 0.9;
    pub const PC_EXPIRATORY_VOLUME_DECAY: f64 = 5.0;
}

/// Sample history and display window
pub mod history {
    pub const DEFAULT_POINTS_PER_CYCLE: usize = 200;
    pub const DEFAULT_MAX_CYCLES: usize = 3;
    pub const DEFAULT_WINDOW_SIZE_SECS: f64 = 10.0;
    pub const MIN_WINDOW_SIZE_SECS: f64 = 0.5;
    pub const MAX_WINDOW_SIZE_SECS: f64 = 120.0;
    pub const MAX_HISTORY_CAPACITY: usize = 1_000_000;
}

/// Tick scheduling
pub mod scheduler {
    pub const MILLISECONDS_PER_SECOND: f64 = 1000.0;
    pub const MIN_TICK_INTERVAL_MS: u64 = 10;
    pub const MAX_TICK_INTERVAL_MS: u64 = 100;
    /// Longest bounded run; roughly 31 years
    pub const MAX_RUN_DURATION_SECS: f64 = 1e9;
}

/// Patient monitor: sensors, alarms and clinical events
pub mod monitoring {
    pub const DEFAULT_SENSOR_INTERVAL_MS: u64 = 1000;
    pub const DEFAULT_EVENT_INTERVAL_SECS: u64 = 1800;
    pub const DEFAULT_FIRST_EVENT_DELAY_SECS: u64 = 5;
    pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 50;
    pub const ALARM_PRESSURE_LOOKBACK_SAMPLES: usize = 10;

    pub const INITIAL_SPO2_PERCENT: u8 = 98;
    pub const MIN_SPO2_PERCENT: u8 = 70;
    pub const MAX_SPO2_PERCENT: u8 = 100;
    pub const INITIAL_HEART_RATE_BPM: u16 = 75;
    pub const MIN_HEART_RATE_BPM: u16 = 40;
    pub const MAX_HEART_RATE_BPM: u16 = 180;

    // Alarm limit defaults and their adjustable ranges
    pub const DEFAULT_PIP_MAX: f64 = 40.0;
    pub const PIP_MAX_RANGE: (f64, f64) = (10.0, 60.0);
    pub const DEFAULT_PIP_MIN: f64 = 5.0;
    pub const PIP_MIN_RANGE: (f64, f64) = (0.0, 20.0);
    pub const DEFAULT_PEEP_MAX: f64 = 15.0;
    pub const PEEP_MAX_RANGE: (f64, f64) = (5.0, 25.0);
    pub const DEFAULT_RATE_MAX: f64 = 35.0;
    pub const RATE_MAX_RANGE: (f64, f64) = (10.0, 60.0);
    pub const DEFAULT_TIDAL_VOLUME_MAX: f64 = 800.0;
    pub const TIDAL_VOLUME_MAX_RANGE: (f64, f64) = (300.0, 1200.0);
    pub const DEFAULT_SPO2_MIN: f64 = 90.0;
    pub const SPO2_MIN_RANGE: (f64, f64) = (70.0, 100.0);

    // Automatic adjustment ceilings
    pub const AUTO_PEEP_STEP: f64 = 2.0;
    pub const AUTO_PEEP_CEILING: f64 = 15.0;
    pub const AUTO_RATE_STEP: f64 = 5.0;
    pub const AUTO_RATE_CEILING: f64 = 35.0;
    pub const AUTO_TIDAL_VOLUME_FLOOR: f64 = 300.0;
    pub const AUTO_TIDAL_VOLUME_CEILING: f64 = 800.0;
    pub const AUTO_TIDAL_VOLUME_MIN_CHANGE: f64 = 20.0;
    pub const DEMAND_HEART_RATE_INCREASE: u16 = 10;

    // Sensor jitter, as multiplicative (low, high) factors
    pub const EXPIRED_FLOW_JITTER: (f64, f64) = (0.9, 1.1);
    pub const EXPIRED_VOLUME_JITTER: (f64, f64) = (0.95, 1.05);
    pub const COMPLIANCE_DRIFT: (f64, f64) = (0.98, 1.02);
    pub const RESISTANCE_DRIFT: (f64, f64) = (0.95, 1.05);
    pub const SPO2_STEP: i16 = 1;
    pub const HEART_RATE_STEP: i32 = 2;

    // Clinical event weights and effects
    pub const BRONCHOSPASM_WEIGHT: f64 = 0.3;
    pub const COMPLIANCE_CHANGE_WEIGHT: f64 = 0.3;
    pub const DISCONNECTION_WEIGHT: f64 = 0.2;
    pub const INCREASED_DEMAND_WEIGHT: f64 = 0.2;
    pub const BRONCHOSPASM_RESISTANCE_INCREASE: (f64, f64) = (5.0, 15.0);
    pub const COMPLIANCE_SHIFT: (f64, f64) = (-0.02, 0.02);
    pub const DISCONNECTION_FACTOR: f64 = 0.5;
    pub const DEMAND_FLOW_FACTOR: f64 = 1.5;
}

/// Configuration file locations
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/vent-sim/config.toml";
    pub const USER_CONFIG_DIR: &str = ".config/vent-sim";
    pub const DEFAULT_CONFIG_FILE: &str = "vent-sim.toml";
    pub const LOCAL_CONFIG_FILE: &str = "vent-sim.local.toml";
    pub const ENV_PREFIX: &str = "VENT_";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_ranges() {
        use ventilator::*;
        assert!((MIN_RESPIRATORY_RATE..=MAX_RESPIRATORY_RATE).contains(&DEFAULT_RESPIRATORY_RATE));
        assert!((MIN_TIDAL_VOLUME_ML..=MAX_TIDAL_VOLUME_ML).contains(&DEFAULT_TIDAL_VOLUME_ML));
        assert!((MIN_PEEP_CMH2O..=MAX_PEEP_CMH2O).contains(&DEFAULT_PEEP_CMH2O));
        assert!((MIN_IE_RATIO..=MAX_IE_RATIO).contains(&DEFAULT_IE_RATIO));
        assert!((MIN_COMPLIANCE..=MAX_COMPLIANCE).contains(&DEFAULT_COMPLIANCE));
    }

    #[test]
    fn test_tick_interval_bounds_ordered() {
        assert!(scheduler::MIN_TICK_INTERVAL_MS < scheduler::MAX_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_history_capacity_default() {
        assert_eq!(history::DEFAULT_POINTS_PER_CYCLE * history::DEFAULT_MAX_CYCLES, 600);
    }
}

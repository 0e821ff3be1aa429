//! Predefined patient profiles for different teaching scenarios
//! Location: src/ventilator/profiles.rs

use super::settings::VentilatorSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatientProfile {
    pub name: String,
    pub description: String,
    pub lung_mechanics: LungMechanics,
    pub initial_settings: InitialSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LungMechanics {
    pub resistance: f64,
    pub compliance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InitialSettings {
    pub respiratory_rate: f64,
    pub tidal_volume_ml: f64,
    pub peep: f64,
    pub peak_pressure: f64,
    pub ie_ratio: f64,
}

impl PatientProfile {
    /// Adult with normal lung mechanics
    pub fn healthy_adult() -> Self {
        let defaults = VentilatorSettings::default();
        Self {
            name: "healthy_adult".to_string(),
            description: "Adult with normal resistance and compliance".to_string(),
            lung_mechanics: LungMechanics {
                resistance: defaults.resistance,
                compliance: defaults.compliance,
            },
            initial_settings: InitialSettings {
                respiratory_rate: defaults.respiratory_rate,
                tidal_volume_ml: defaults.tidal_volume_ml,
                peep: defaults.peep,
                peak_pressure: defaults.peak_pressure,
                ie_ratio: defaults.ie_ratio,
            },
        }
    }

    /// Stiff lungs: low compliance, protective small volumes, higher PEEP
    pub fn restrictive() -> Self {
        Self {
            name: "restrictive".to_string(),
            description: "Low-compliance lungs ventilated with small volumes".to_string(),
            lung_mechanics: LungMechanics {
                resistance: 12.0,
                compliance: 0.02,
            },
            initial_settings: InitialSettings {
                respiratory_rate: 22.0,
                tidal_volume_ml: 400.0,
                peep: 10.0,
                peak_pressure: 30.0,
                ie_ratio: 1.0,
            },
        }
    }

    /// Narrowed airways: high resistance, long expiration
    pub fn obstructive() -> Self {
        Self {
            name: "obstructive".to_string(),
            description: "High airway resistance needing prolonged expiration".to_string(),
            lung_mechanics: LungMechanics {
                resistance: 25.0,
                compliance: 0.06,
            },
            initial_settings: InitialSettings {
                respiratory_rate: 12.0,
                tidal_volume_ml: 450.0,
                peep: 5.0,
                peak_pressure: 28.0,
                ie_ratio: 0.5,
            },
        }
    }

    /// Look up a built-in profile by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "healthy_adult" | "healthy" => Some(Self::healthy_adult()),
            "restrictive" => Some(Self::restrictive()),
            "obstructive" => Some(Self::obstructive()),
            _ => None,
        }
    }

    pub fn builtin_names() -> [&'static str; 3] {
        ["healthy_adult", "restrictive", "obstructive"]
    }

    /// Overwrite the profile-controlled fields of `settings`
    pub fn apply_to(&self, settings: &mut VentilatorSettings) {
        settings.resistance = self.lung_mechanics.resistance;
        settings.compliance = self.lung_mechanics.compliance;
        settings.respiratory_rate = self.initial_settings.respiratory_rate;
        settings.tidal_volume_ml = self.initial_settings.tidal_volume_ml;
        settings.peep = self.initial_settings.peep;
        settings.peak_pressure = self.initial_settings.peak_pressure;
        settings.ie_ratio = self.initial_settings.ie_ratio;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_produce_valid_settings() {
        for name in PatientProfile::builtin_names() {
            let profile = PatientProfile::by_name(name).unwrap();
            let mut settings = VentilatorSettings::default();
            profile.apply_to(&mut settings);
            assert!(settings.validate().is_ok(), "profile {} invalid", name);
        }
    }

    #[test]
    fn test_obstructive_has_longer_expiration() {
        let profile = PatientProfile::obstructive();
        assert!(profile.initial_settings.ie_ratio < 1.0);
        assert!(profile.lung_mechanics.resistance > PatientProfile::healthy_adult().lung_mechanics.resistance);
    }

    #[test]
    fn test_unknown_profile() {
        assert!(PatientProfile::by_name("martian").is_none());
    }
}

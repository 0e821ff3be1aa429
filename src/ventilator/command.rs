// src/ventilator/command.rs
//! Control commands issued by the UI collaborator

use super::settings::{SettingField, VentilationMode};
use crate::monitoring::alarms::AlarmLimitField;
use crate::utils::validation::ValidationError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One control action against a running session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Numeric setter
    Set { field: SettingField, value: f64 },
    /// Switch ventilation mode (resets history and clock)
    SetMode(VentilationMode),
    /// Adjust an alarm threshold
    SetAlarmLimit { limit: AlarmLimitField, value: f64 },
    /// Enable or disable automatic adjustments after clinical events
    SetAutoAdjust(bool),
    /// Stop the driver
    Quit,
}

/// Text command parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Command '{0}' needs a value")]
    MissingValue(String),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Invalid switch '{0}', expected on/off")]
    InvalidSwitch(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn parse_number(token: &str) -> Result<f64, CommandParseError> {
    token
        .parse::<f64>()
        .map_err(|_| CommandParseError::InvalidNumber(token.to_string()))
}

fn parse_switch(token: &str) -> Result<bool, CommandParseError> {
    match token.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(CommandParseError::InvalidSwitch(other.to_string())),
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse a line such as `rate 20`, `mode pc`, `alarm pip_max 35`,
    /// `auto off` or `quit`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or(CommandParseError::Empty)?;
        let head_lower = head.to_lowercase();

        let mut next_value = |name: &str| {
            tokens
                .next()
                .ok_or_else(|| CommandParseError::MissingValue(name.to_string()))
        };

        match head_lower.as_str() {
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "mode" => {
                let mode = next_value("mode")?.parse::<VentilationMode>()?;
                Ok(Command::SetMode(mode))
            }
            "auto" => Ok(Command::SetAutoAdjust(parse_switch(next_value("auto")?)?)),
            "alarm" => {
                let limit = next_value("alarm")?.parse::<AlarmLimitField>()?;
                let value = parse_number(next_value(limit.name())?)?;
                Ok(Command::SetAlarmLimit { limit, value })
            }
            _ => {
                let field = head.parse::<SettingField>()?;
                let value = parse_number(next_value(field.name())?)?;
                Ok(Command::Set { field, value })
            }
        }
    }
}

/// Formats back into the text form accepted by `FromStr`
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { field, value } => write!(f, "{field} {value}"),
            Command::SetMode(VentilationMode::VolumeControlled) => f.write_str("mode vc"),
            Command::SetMode(VentilationMode::PressureControlled) => f.write_str("mode pc"),
            Command::SetAlarmLimit { limit, value } => write!(f, "alarm {limit} {value}"),
            Command::SetAutoAdjust(enabled) => {
                write!(f, "auto {}", if *enabled { "on" } else { "off" })
            }
            Command::Quit => f.write_str("quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setter() {
        assert_eq!(
            "rate 20".parse::<Command>().unwrap(),
            Command::Set { field: SettingField::RespiratoryRate, value: 20.0 }
        );
        assert_eq!(
            "  compliance   0.03 ".parse::<Command>().unwrap(),
            Command::Set { field: SettingField::Compliance, value: 0.03 }
        );
    }

    #[test]
    fn test_parse_mode_auto_quit() {
        assert_eq!(
            "mode pc".parse::<Command>().unwrap(),
            Command::SetMode(VentilationMode::PressureControlled)
        );
        assert_eq!("auto off".parse::<Command>().unwrap(), Command::SetAutoAdjust(false));
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_alarm_limit() {
        assert_eq!(
            "alarm pip_max 35".parse::<Command>().unwrap(),
            Command::SetAlarmLimit { limit: AlarmLimitField::PipMax, value: 35.0 }
        );
    }

    #[test]
    fn test_display_parses_back() {
        for line in ["peep 8", "mode pc", "alarm spo2_min 88", "auto off", "quit"] {
            let command: Command = line.parse().unwrap();
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
        let command = Command::Set { field: SettingField::IeRatio, value: 2.5 };
        assert_eq!(command.to_string(), "ie_ratio 2.5");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandParseError::Empty));
        assert_eq!(
            "peep".parse::<Command>(),
            Err(CommandParseError::MissingValue("peep".to_string()))
        );
        assert_eq!(
            "peep high".parse::<Command>(),
            Err(CommandParseError::InvalidNumber("high".to_string()))
        );
        assert!(matches!(
            "heart 80".parse::<Command>(),
            Err(CommandParseError::Validation(ValidationError::UnknownField(_)))
        ));
    }
}

// src/ventilator/mod.rs
//! Ventilator settings, control commands and patient profiles

pub mod settings;
pub mod command;
pub mod profiles;

pub use settings::*;
pub use command::{Command, CommandParseError};
pub use profiles::PatientProfile;

// src/acquisition/mod.rs
//! Sample buffering between the generator and the render collaborator

pub mod history;
pub mod buffer_manager;

pub use history::{HistoryError, SampleHistory};
pub use buffer_manager::*;

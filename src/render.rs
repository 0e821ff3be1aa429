// src/render.rs
//! Render collaborator interface
//!
//! Each tick hands the sink the visible window as three curves sharing one
//! time axis, plus the X-axis bounds. Plotting is left to the sink.

use crate::acquisition::VisibleWindow;
use crate::error::{IntoVentError, VentResult};
use crate::waveform::Sample;
use ndarray::Array1;
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Plot-ready arrays for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub time: Array1<f64>,
    pub pressure: Array1<f64>,
    pub flow: Array1<f64>,
    pub volume: Array1<f64>,
    /// `[t_min, t_max]` of the visible window
    pub x_bounds: (f64, f64),
}

impl RenderFrame {
    pub fn from_window(window: &VisibleWindow) -> Self {
        let column = |f: fn(&Sample) -> f64| window.samples.iter().map(f).collect::<Array1<f64>>();

        Self {
            time: column(|s| s.time),
            pressure: column(|s| s.pressure),
            flow: column(|s| s.flow),
            volume: column(|s| s.volume),
            x_bounds: (window.t_min, window.t_max),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Newest sample of the frame
    pub fn latest(&self) -> Option<Sample> {
        let last = self.len().checked_sub(1)?;
        Some(Sample {
            time: self.time[last],
            pressure: self.pressure[last],
            flow: self.flow[last],
            volume: self.volume[last],
        })
    }

    /// Highest pressure in view, for axis scaling
    pub fn peak_pressure(&self) -> Option<f64> {
        self.pressure.iter().copied().reduce(f64::max)
    }
}

/// Receives one frame per tick
pub trait RenderSink {
    fn render(&mut self, frame: &RenderFrame) -> VentResult<()>;
}

/// Logs a one-line summary of each frame through `tracing`
#[derive(Debug, Default)]
pub struct LogRenderer {
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for LogRenderer {
    fn render(&mut self, frame: &RenderFrame) -> VentResult<()> {
        self.frames += 1;
        if let Some(latest) = frame.latest() {
            info!(
                frame = self.frames,
                points = frame.len(),
                t_min = frame.x_bounds.0,
                t_max = frame.x_bounds.1,
                pressure = latest.pressure,
                flow = latest.flow,
                volume = latest.volume,
                "frame"
            );
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct FrameRecord {
    t_min: f64,
    t_max: f64,
    time: Vec<f64>,
    pressure: Vec<f64>,
    flow: Vec<f64>,
    volume: Vec<f64>,
}

impl From<&RenderFrame> for FrameRecord {
    fn from(frame: &RenderFrame) -> Self {
        Self {
            t_min: frame.x_bounds.0,
            t_max: frame.x_bounds.1,
            time: frame.time.to_vec(),
            pressure: frame.pressure.to_vec(),
            flow: frame.flow.to_vec(),
            volume: frame.volume.to_vec(),
        }
    }
}

/// Writes each frame as one JSON object per line
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSink for JsonLinesRenderer<W> {
    fn render(&mut self, frame: &RenderFrame) -> VentResult<()> {
        let record = FrameRecord::from(frame);
        serde_json::to_writer(&mut self.writer, &record).vent_err("json renderer", "serialize frame")?;
        self.writer
            .write_all(b"\n")
            .and_then(|_| self.writer.flush())
            .vent_err("json renderer", "write frame")
    }
}

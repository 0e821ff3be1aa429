// src/runtime.rs
//! Async driver for the desktop build
//!
//! One task owns the session. A `tokio` interval paced by the tick scheduler
//! drives ticks; commands arrive on an mpsc channel and are applied between
//! ticks. The interval is rebuilt whenever the scheduler's generation moves.

use crate::config::SchedulerConfig;
use crate::error::{IntoVentError, VentError, VentResult};
use crate::render::RenderSink;
use crate::session::SimulationSession;
use crate::ventilator::Command;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Commands buffered between the reader and the session task
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    DurationElapsed,
    Interrupted,
}

/// Counters reported when a run ends
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub ticks: u64,
    pub failed_ticks: u64,
    pub frames_rendered: u64,
    pub render_errors: u64,
    pub elapsed_secs: f64,
}

pub struct SimulationRuntime {
    session: SimulationSession,
    sink: Box<dyn RenderSink + Send>,
    render_every_n_ticks: u64,
    run_duration: Option<Duration>,
    frames_rendered: u64,
    render_errors: u64,
}

impl SimulationRuntime {
    /// Fails when `scheduler` is out of range, so the run duration always
    /// converts to a `Duration`.
    pub fn new(
        session: SimulationSession,
        sink: Box<dyn RenderSink + Send>,
        scheduler: &SchedulerConfig,
    ) -> VentResult<Self> {
        scheduler.validate()?;
        Ok(Self {
            session,
            sink,
            render_every_n_ticks: u64::from(scheduler.render_every_n_ticks.max(1)),
            run_duration: scheduler.run_duration_secs.map(Duration::from_secs_f64),
            frames_rendered: 0,
            render_errors: 0,
        })
    }

    pub fn session(&self) -> &SimulationSession {
        &self.session
    }

    /// Run until `quit`, the configured duration, or Ctrl-C
    pub async fn run(self, commands: mpsc::Receiver<Command>) -> VentResult<RunSummary> {
        self.run_until(commands, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `quit`, the configured duration, or `shutdown` resolves
    pub async fn run_until<F>(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        shutdown: F,
    ) -> VentResult<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let deadline = self.run_duration.and_then(|d| started.checked_add(d));
        let expired = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);
        tokio::pin!(shutdown);

        self.session.start();
        let mut generation = self.session.scheduler().generation();
        let mut ticker = self.build_ticker();
        let mut commands_open = true;

        info!(
            interval_ms = self.session.scheduler().interval_ms(),
            duration_secs = ?self.run_duration.map(|d| d.as_secs_f64()),
            "simulation running"
        );

        let reason = loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick()?,
                received = commands.recv(), if commands_open => match received {
                    Some(command) => self.on_command(command)?,
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                    }
                },
                _ = &mut expired => break StopReason::DurationElapsed,
                _ = &mut shutdown => break StopReason::Interrupted,
            }

            if !self.session.scheduler().is_running() {
                break StopReason::Quit;
            }

            let current = self.session.scheduler().generation();
            if current != generation {
                generation = current;
                ticker = self.build_ticker();
                debug!(
                    interval_ms = self.session.scheduler().interval_ms(),
                    generation, "tick timer rebuilt"
                );
            }
        };

        self.session.stop();
        let summary = RunSummary {
            reason,
            ticks: self.session.ticks(),
            failed_ticks: self.session.failed_ticks(),
            frames_rendered: self.frames_rendered,
            render_errors: self.render_errors,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            reason = ?summary.reason,
            ticks = summary.ticks,
            failed_ticks = summary.failed_ticks,
            frames = summary.frames_rendered,
            "simulation stopped"
        );
        Ok(summary)
    }

    fn build_ticker(&self) -> Interval {
        let mut ticker = interval(self.session.scheduler().interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    fn on_tick(&mut self) -> VentResult<()> {
        let tick = match self.session.tick() {
            Ok(tick) => tick,
            Err(e) if e.is_recoverable() => return Ok(()),
            Err(e) => return Err(e),
        };

        if self.session.ticks() % self.render_every_n_ticks == 0 {
            match self.sink.render(&tick.frame) {
                Ok(()) => self.frames_rendered += 1,
                Err(e) => {
                    self.render_errors += 1;
                    warn!(error = %e, "frame not rendered");
                }
            }
        }
        Ok(())
    }

    fn on_command(&mut self, command: Command) -> VentResult<()> {
        debug!(command = %command, "applying command");
        match self.session.apply(command) {
            Ok(()) => {
                info!(readout = %self.session.readout(), "settings");
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, command = %command, "command rejected");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Read control lines from stdin and forward the parsed commands.
///
/// Blank lines are skipped and unparseable ones logged. The task ends on
/// EOF, after `quit`, or when the receiver is dropped.
pub fn spawn_stdin_reader(commands: mpsc::Sender<Command>) -> JoinHandle<VentResult<()>> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.vent_err("stdin reader", "read line")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    let quit = command == Command::Quit;
                    if commands.send(command).await.is_err() || quit {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, line, "ignoring control line"),
            }
        }
        Ok::<(), VentError>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::monitoring::MonitorConfig;
    use crate::render::RenderFrame;
    use crate::ventilator::SettingField;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        frames: Arc<AtomicU64>,
    }

    impl RenderSink for CountingSink {
        fn render(&mut self, frame: &RenderFrame) -> VentResult<()> {
            assert!(!frame.is_empty());
            self.frames.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn runtime(duration_secs: Option<f64>, every: u32) -> (SimulationRuntime, Arc<AtomicU64>) {
        let config = SimulatorConfig {
            monitoring: MonitorConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let scheduler = SchedulerConfig {
            run_duration_secs: duration_secs,
            render_every_n_ticks: every,
        };
        let frames = Arc::new(AtomicU64::new(0));
        let sink = CountingSink {
            frames: frames.clone(),
        };
        let session = SimulationSession::new(&config).unwrap();
        (SimulationRuntime::new(session, Box::new(sink), &scheduler).unwrap(), frames)
    }

    #[tokio::test]
    async fn test_runs_for_configured_duration() {
        let (runtime, frames) = runtime(Some(0.3), 1);
        let (_tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let summary = runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();

        assert_eq!(summary.reason, StopReason::DurationElapsed);
        assert!(summary.ticks >= 2);
        assert_eq!(summary.frames_rendered, summary.ticks);
        assert_eq!(frames.load(Ordering::SeqCst), summary.ticks);
    }

    #[tokio::test]
    async fn test_quit_command_stops() {
        let (runtime, _) = runtime(None, 1);
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        tx.send(Command::Set {
            field: SettingField::Peep,
            value: 8.0,
        })
        .await
        .unwrap();
        tx.send(Command::Quit).await.unwrap();

        let summary = runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();
        assert_eq!(summary.reason, StopReason::Quit);
    }

    #[tokio::test]
    async fn test_rejected_command_keeps_running() {
        let (runtime, _) = runtime(Some(0.2), 1);
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        tx.send(Command::Set {
            field: SettingField::Peep,
            value: 99.0,
        })
        .await
        .unwrap();
        drop(tx);

        let summary = runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();
        assert_eq!(summary.reason, StopReason::DurationElapsed);
    }

    #[tokio::test]
    async fn test_shutdown_future_interrupts() {
        let (runtime, _) = runtime(None, 1);
        let (_tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let summary = runtime
            .run_until(rx, tokio::time::sleep(Duration::from_millis(150)))
            .await
            .unwrap();
        assert_eq!(summary.reason, StopReason::Interrupted);
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let session = SimulationSession::new(&SimulatorConfig::default()).unwrap();
        let sink = CountingSink {
            frames: Arc::new(AtomicU64::new(0)),
        };
        let scheduler = SchedulerConfig {
            run_duration_secs: Some(1e20),
            render_every_n_ticks: 1,
        };

        let err = SimulationRuntime::new(session, Box::new(sink), &scheduler).err().unwrap();
        assert!(matches!(err, VentError::Validation(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_render_every_n_ticks() {
        let (runtime, _) = runtime(Some(0.4), 3);
        let (_tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let summary = runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();
        assert_eq!(summary.frames_rendered, summary.ticks / 3);
    }
}

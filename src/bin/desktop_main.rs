use clap::Parser;
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vent_sim::config::{ConfigError, ConfigLoader, SimulatorConfig};
use vent_sim::error::{IntoVentError, VentResult};
use vent_sim::render::{JsonLinesRenderer, LogRenderer, RenderSink};
use vent_sim::runtime::{spawn_stdin_reader, SimulationRuntime, COMMAND_CHANNEL_CAPACITY};
use vent_sim::session::SimulationSession;
use vent_sim::ventilator::VentilationMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mechanical ventilator waveform simulator")]
struct Args {
    /// Extra TOML file layered over the discovered ones
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write frames to stdout as JSON lines instead of logging them
    #[arg(long)]
    json: bool,
    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<f64>,
    /// Initial mode: vc or pc
    #[arg(long)]
    mode: Option<VentilationMode>,
    /// Patient profile: healthy_adult, restrictive, obstructive
    #[arg(long)]
    profile: Option<String>,
    /// Seed for the patient monitor
    #[arg(long)]
    seed: Option<u64>,
    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> VentResult<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vent_sim=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.print_config {
        let text = toml::to_string_pretty(&config).vent_err("cli", "serialize config")?;
        println!("{text}");
        return Ok(());
    }

    let summary = config.summary();
    info!(
        profile = ?summary.profile,
        mode = %summary.mode,
        rate = summary.respiratory_rate,
        tick_interval_ms = summary.tick_interval_ms,
        history_capacity = summary.history_capacity,
        window_secs = summary.window_size_secs,
        monitoring = summary.monitoring_enabled,
        "configuration loaded"
    );

    let sink: Box<dyn RenderSink + Send> = if args.json {
        Box::new(JsonLinesRenderer::new(io::stdout()))
    } else {
        Box::new(LogRenderer::new())
    };

    let session = SimulationSession::new(&config)?;
    let runtime = SimulationRuntime::new(session, sink, &config.scheduler)?;

    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let _reader = spawn_stdin_reader(tx);

    let summary = runtime.run(rx).await?;
    info!(
        ticks = summary.ticks,
        frames = summary.frames_rendered,
        elapsed_secs = summary.elapsed_secs,
        "done"
    );
    Ok(())
}

fn load_config(args: &Args) -> VentResult<SimulatorConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        // An explicit file must exist, unlike the search paths
        loader.validate_config_file(path)?;
        loader.add_path(path.clone());
    }
    let mut config = loader.load()?;

    if let Some(mode) = args.mode {
        config.ventilator.mode = mode;
    }
    if let Some(profile) = &args.profile {
        config.profile = Some(profile.clone());
    }
    if let Some(seed) = args.seed {
        config.monitoring.seed = Some(seed);
    }
    if let Some(duration) = args.duration {
        config.scheduler.run_duration_secs = Some(duration);
    }

    config.validate()?;
    config
        .validate_consistency()
        .map_err(ConfigError::Inconsistent)?;
    Ok(config)
}

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use phonekit::app::{
    build_controller, build_controller_with, handle_fatal_error, init_logging, AppConfig,
};
use phonekit::catalog::{all_methods, lookup, MethodSpec, ServiceType};
use phonekit::config::{load_config, BackendType, ServiceConfig};
use phonekit::device::Platform;
use phonekit::engine::{FixedOutcome, OutcomeSource, RandomOutcomes};
use phonekit::session::{
    SessionEvent, SessionObserver, SessionStatus, StartRequest, TimestampedEvent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Session engine for advanced phone operations
#[derive(Parser)]
#[command(name = "phonekit", version)]
#[command(about = "Simulated advanced phone operations with pausable progress", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Path to configuration file (defaults to ./phonekit.toml if present)
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Address to listen on, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// List the methods available for each service
    Methods {
        /// Only show one service
        #[arg(long)]
        service: Option<ServiceType>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run one session end to end with a progress bar
    Simulate {
        #[arg(long)]
        service: ServiceType,

        #[arg(long)]
        method: String,

        /// Device platform (defaults to one the method supports)
        #[arg(long)]
        platform: Option<Platform>,

        /// Multiplier for phase delays; 0 runs without waiting
        #[arg(long, default_value = "1.0")]
        delay_scale: f64,

        /// How step failures are decided
        #[arg(long, value_enum, default_value_t = OutcomeMode::Random)]
        outcome: OutcomeMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutcomeMode {
    /// Roll each step against the method's failure probability
    Random,
    /// Never fail a step
    Succeed,
    /// Fail the first step
    Fail,
}

impl OutcomeMode {
    fn source(self) -> Arc<dyn OutcomeSource> {
        match self {
            OutcomeMode::Random => Arc::new(RandomOutcomes),
            OutcomeMode::Succeed => Arc::new(FixedOutcome::never_fail()),
            OutcomeMode::Fail => Arc::new(FixedOutcome::always_fail()),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Serve { config, bind } => run_serve(verbose, config, bind).await,
        Commands::Methods { service, json } => {
            init_logging(&AppConfig::new(verbose));
            run_methods(service, json)
        }
        Commands::Simulate {
            service,
            method,
            platform,
            delay_scale,
            outcome,
        } => {
            init_logging(&AppConfig::new(verbose));
            run_simulate(service, method, platform, delay_scale, outcome).await
        }
    };

    if let Err(e) = result {
        handle_fatal_error(e, verbose);
    }
}

async fn run_serve(verbose: u8, config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(bind) = bind {
        config.bind = bind;
    }

    let app_config = AppConfig::new(verbose)
        .with_config_path(config_path)
        .with_configured_level(config.log_level.clone());
    init_logging(&app_config);
    debug!("Loaded configuration: {:?}", config);

    let controller = build_controller(&config).await?;
    phonekit::api::serve(controller, &config.bind).await
}

fn run_methods(service: Option<ServiceType>, json: bool) -> Result<()> {
    let methods: Vec<&MethodSpec> = match service {
        Some(service) => service.methods().collect(),
        None => all_methods().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&methods)?);
        return Ok(());
    }

    let mut current = None;
    for spec in methods {
        if current != Some(spec.service) {
            println!("{}", spec.service);
            current = Some(spec.service);
        }
        let platforms: Vec<&str> = spec.platforms.iter().map(|p| p.as_str()).collect();
        println!(
            "  {:<24} {:>3} steps  ~{:>3}s  fail {:>4.1}%/step  [{}]",
            spec.name,
            spec.total_steps,
            spec.nominal_duration().as_secs(),
            spec.failure_probability * 100.0,
            platforms.join(", ")
        );
    }
    Ok(())
}

/// Drives an indicatif bar from session events
struct BarObserver {
    bar: ProgressBar,
    done: Notify,
}

#[async_trait]
impl SessionObserver for BarObserver {
    async fn on_event(&self, event: &TimestampedEvent) {
        match &event.event {
            SessionEvent::StepAdvanced { progress } => {
                self.bar.set_position(u64::from(progress.current_step));
                self.bar.set_message(progress.current_phase.clone());
            }
            other if other.is_terminal() => {
                self.bar.finish_with_message(other.description());
                self.done.notify_one();
            }
            _ => {}
        }
    }
}

async fn run_simulate(
    service: ServiceType,
    method: String,
    platform: Option<Platform>,
    delay_scale: f64,
    outcome: OutcomeMode,
) -> Result<()> {
    let spec = lookup(service, &method)
        .with_context(|| format!("method '{method}' is not available for {service}"))?;
    let platform = match platform {
        Some(platform) => platform,
        None => spec.platforms.first().copied().unwrap_or(Platform::Android),
    };

    let mut config = ServiceConfig::default();
    config.storage.backend = BackendType::Memory;
    config.engine.delay_scale = delay_scale;
    let controller = build_controller_with(&config, outcome.source()).await?;

    let bar = ProgressBar::new(u64::from(spec.total_steps));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    let observer = Arc::new(BarObserver {
        bar,
        done: Notify::new(),
    });
    controller.add_observer(observer.clone()).await;

    let user_id = "local";
    let device = controller
        .register_device(user_id, platform, Some("simulated".to_string()))
        .await?;
    let session = controller
        .start(StartRequest {
            user_id: user_id.to_string(),
            device_id: device.id,
            service_type: service,
            method,
            options: serde_json::json!({ "simulated": true }),
        })
        .await?;

    observer.done.notified().await;
    let finished = controller.get_session(&session.id, user_id).await?;
    if let Some(result) = &finished.result {
        println!("{}", serde_json::to_string_pretty(result)?);
    }

    match finished.status {
        SessionStatus::Completed => Ok(()),
        status => bail!(
            "session {} ended {}: {}",
            finished.id,
            status,
            finished
                .result
                .and_then(|r| r.error_message)
                .unwrap_or_default()
        ),
    }
}

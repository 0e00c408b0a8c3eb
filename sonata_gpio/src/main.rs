//! # Sonata GPIO Demo Runner
//!
//! Runs one of the LED demos against a GPIO board, either writing the
//! register directly or going through the LED ownership registry.
//!
//! # Usage
//!
//! ```bash
//! # Default demo (led_walk_dynamic) on the simulation board
//! sonata_gpio
//!
//! # Blink LED 7 through a handle, 20 steps at 100ms
//! sonata_gpio --demo blinky-dynamic --period-ms 100 --cycles 20
//!
//! # Load settings from a file, verbose logging
//! sonata_gpio --config config/gpio.toml -v
//!
//! # Print the final registry snapshot as JSON
//! sonata_gpio -n 8 --json
//! ```

use clap::Parser;
use sonata_common::consts::DEFAULT_CONFIG_PATH;
use sonata_common::prelude::*;
use sonata_gpio::{BoardRegistry, DemoCore, LedRegistry, QuotaAllocator, create_demo};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Sonata GPIO - LED demos over an exclusive LED ownership registry
#[derive(Parser, Debug)]
#[command(name = "sonata_gpio")]
#[command(version)]
#[command(about = "Run LED demos over an exclusive LED ownership registry")]
#[command(long_about = None)]
struct Args {
    /// Path to gpio.toml. Defaults to /etc/sonata/gpio.toml when it exists.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Demo to run (overrides config)
    #[arg(short, long)]
    demo: Option<DemoKind>,

    /// Board driver (overrides config)
    #[arg(short, long)]
    board: Option<String>,

    /// Step period in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    period_ms: Option<u64>,

    /// Number of steps, 0 = until interrupted (overrides config)
    #[arg(short = 'n', long)]
    cycles: Option<u64>,

    /// LED used by the blinky demos (overrides config)
    #[arg(short, long)]
    led: Option<u8>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format and print the final registry snapshot
    #[arg(long)]
    json: bool,

    /// List available demos and boards, then exit
    #[arg(long)]
    list: bool,
}

fn main() {
    let args = Args::parse();

    if args.list {
        print_list();
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sonata_gpio: {e}");
            std::process::exit(2);
        }
    };

    setup_tracing(&args, &config);

    if let Err(e) = run(&args, config) {
        error!("Demo runner failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: GpioAppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let boards = BoardRegistry::with_builtin_boards();
    let board = boards.create_board(&config.gpio.board, &config.gpio)?;
    let allocator = Arc::new(QuotaAllocator::new(config.gpio.malloc_quota));
    let registry = Arc::new(LedRegistry::new(board.clone(), allocator));

    let mut demo = create_demo(&config.demo, board, registry.clone());
    let mut core = DemoCore::new(&config.demo);

    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    core.run(demo.as_mut())?;

    let stats = core.stats();
    info!(
        "Timing: {} steps, avg={}us, max={}us, overruns={}",
        stats.steps,
        stats.avg_step_us(),
        stats.max_step_us,
        stats.overruns
    );

    if args.json {
        println!("{}", registry.snapshot().to_json()?);
    }

    info!("{} shutdown complete", config.shared.service_name);
    Ok(())
}

/// Load the config file (if any), apply CLI overrides and validate.
fn load_config(args: &Args) -> Result<GpioAppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => GpioAppConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            GpioAppConfig::load(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => GpioAppConfig::default(),
    };

    if let Some(kind) = args.demo {
        config.demo.kind = kind;
    }
    if let Some(board) = &args.board {
        config.gpio.board = board.clone();
    }
    if let Some(period_ms) = args.period_ms {
        config.demo.period_ms = period_ms;
    }
    if let Some(cycles) = args.cycles {
        config.demo.cycles = cycles;
    }
    if let Some(led) = args.led {
        config.demo.led_index = led;
    }

    config.validate()?;
    Ok(config)
}

fn print_list() {
    println!("Demos:");
    for kind in DemoKind::ALL {
        let mode = if kind.uses_registry() { "registry" } else { "raw" };
        println!("  {:<18} ({})", kind.as_str(), mode);
    }
    println!("Boards:");
    for name in BoardRegistry::with_builtin_boards().list_boards() {
        println!("  {name}");
    }
}

/// Setup tracing subscriber. `RUST_LOG` wins over the config log level.
///
/// In JSON mode logs go to stderr so stdout carries only the snapshot.
fn setup_tracing(args: &Args, config: &GpioAppConfig) {
    let directive = if args.verbose {
        "debug"
    } else {
        config.shared.log_level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

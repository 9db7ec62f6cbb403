//! MSPad GW - Rust implementation
//!
//! Drive a Master System joypad port from a modern game controller.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mspad_gw::cli::Args;
use mspad_gw::input::{provider, replay};
use mspad_gw::mapping::MappingSet;
use mspad_gw::output::OutputSink;

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("Starting MSPad GW v{}...", env!("CARGO_PKG_VERSION"));

    if args.list_gamepads {
        let gamepads = provider::list_gamepads()?;
        if gamepads.is_empty() {
            println!("No gamepads connected");
        }
        for (index, name) in gamepads {
            println!("  [{}] {}", index, name);
        }
        return Ok(());
    }

    let config = args.to_config()?;

    if let Some(path) = &args.output {
        config.save(path)?;
        info!("💾 Configuration saved to {}", path.display());
    }

    let mappings = MappingSet::build(&config).context("Invalid mapping configuration")?;
    if mappings.is_empty() {
        warn!("⚠️  No mappings configured, the console pad will stay idle");
    }

    let mut sink = open_sink()?;

    match &args.replay {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open replay log: {}", path.display()))?;
            let mut ctrl = mappings.controller("replay");
            let count = replay::replay(BufReader::new(file), &mut ctrl, sink.as_mut())?;
            info!("✅ Replayed {} events", count);
        }
        None => run_live(mappings, sink.as_mut())?,
    }

    Ok(())
}

#[cfg(feature = "sdl")]
fn run_live(mappings: MappingSet, sink: &mut dyn OutputSink) -> Result<()> {
    let mut controllers = mspad_gw::input::sdl::SdlProvider::new(mappings)?;
    controllers.run(sink);
    Ok(())
}

#[cfg(not(feature = "sdl"))]
fn run_live(mappings: MappingSet, sink: &mut dyn OutputSink) -> Result<()> {
    warn!("⚠️  Built without SDL support, gyro mappings only fire from --replay");
    let mut gamepads = provider::GilrsProvider::new(mappings)?;
    info!("{} gamepad(s) attached", gamepads.controller_count());
    gamepads.run(sink)
}

#[cfg(feature = "gpio")]
fn open_sink() -> Result<Box<dyn OutputSink>> {
    use mspad_gw::output::{gpio, GpioSink};

    let sink = GpioSink::new(&gpio::default_pin_map()).context("Failed to open GPIO pins")?;
    info!("Console pad driven through GPIO");
    Ok(Box::new(sink))
}

#[cfg(not(feature = "gpio"))]
fn open_sink() -> Result<Box<dyn OutputSink>> {
    info!("Console pad output logged to the terminal (build with --features gpio to drive pins)");
    Ok(Box::new(mspad_gw::output::ConsoleSink::new()))
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

//! multimouse CLI: bridge evdev mice to a microcontroller over serial.

mod input;
mod serial;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use multimouse_core::aggregator::Aggregator;
use multimouse_core::settings::{InputMode, LogicMode, OutputMode, Settings};
use multimouse_core::synthetic::{GenMode, SyntheticSource};
use multimouse_core::transport::FrameSink;
use multimouse_core::{control, validate, NUM_SLOTS};
use serial::{SerialSink, DEFAULT_BAUD};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "multimouse",
    version,
    about = "Bridge multiple mice to a microcontroller over a serial link"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mice usable as bridge inputs.
    ListDevices,
    /// Aggregate all mice and stream telemetry frames until Ctrl+C.
    Run {
        /// Serial port (e.g. /dev/ttyUSB0).
        #[arg(long, short)]
        port: String,
        /// UART baud rate.
        #[arg(long, default_value_t = DEFAULT_BAUD)]
        baud: u32,
        /// Frame rate in Hz.
        #[arg(long, default_value_t = 50.0)]
        rate: f64,
    },
    /// Send a configuration control frame to the device.
    SendSettings {
        /// Serial port (e.g. /dev/ttyACM0).
        #[arg(long, short)]
        port: String,
        /// UART baud rate.
        #[arg(long, default_value_t = DEFAULT_BAUD)]
        baud: u32,
        /// JSON config file; CLI flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of mice the firmware should combine (2-6).
        #[arg(long)]
        num_mice: Option<u8>,
        /// Logic mode: sum, average, max, min, and, or, xor, nand, nor, xnor.
        #[arg(long)]
        logic_mode: Option<String>,
        /// Input mode: uart, quadrature, both.
        #[arg(long)]
        input_mode: Option<String>,
        /// Output mode: combined (1 mouse) or separate (6 mice).
        #[arg(long)]
        output_mode: Option<String>,
        /// Amplification factor (0.1-10.0).
        #[arg(long)]
        amplify: Option<f32>,
        /// Quadrature scale (1-1000).
        #[arg(long)]
        quad_scale: Option<u16>,
        /// Apply in RAM only; do not save to flash.
        #[arg(long)]
        no_save: bool,
    },
    /// Stream random test frames without real mice.
    TestRandom {
        /// Serial port (e.g. /dev/ttyUSB0).
        #[arg(long, short)]
        port: String,
        /// UART baud rate.
        #[arg(long, default_value_t = DEFAULT_BAUD)]
        baud: u32,
        /// Frames per second.
        #[arg(long, default_value_t = 50.0)]
        rate: f64,
        /// Max |dx|,|dy| per slot per frame.
        #[arg(long, default_value_t = 4)]
        magnitude: i32,
        /// Only move slot N (0-5); others stay zero.
        #[arg(long)]
        single: Option<usize>,
        /// Run for N seconds (default: until Ctrl+C).
        #[arg(long)]
        duration: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListDevices => list_devices(),
        Commands::Run { port, baud, rate } => run_bridge(&port, baud, rate),
        Commands::SendSettings {
            port,
            baud,
            config,
            num_mice,
            logic_mode,
            input_mode,
            output_mode,
            amplify,
            quad_scale,
            no_save,
        } => send_settings(
            &port, baud, config, num_mice, logic_mode, input_mode, output_mode, amplify,
            quad_scale, no_save,
        ),
        Commands::TestRandom {
            port,
            baud,
            rate,
            magnitude,
            single,
            duration,
        } => test_random(&port, baud, rate, magnitude, single, duration),
    }
}

fn stop_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed))
        .context("install Ctrl+C handler")?;
    Ok(stop)
}

fn list_devices() -> Result<()> {
    let mice = input::discover();
    if mice.is_empty() {
        println!("No mice found.");
        println!("Ensure you have read access to /dev/input (e.g. user in group input).");
    } else {
        for (slot, mouse) in mice.iter().enumerate() {
            println!("slot {slot}: {} ({})", mouse.name, mouse.path.display());
        }
    }
    Ok(())
}

fn run_bridge(port: &str, baud: u32, rate: f64) -> Result<()> {
    if rate <= 0.0 {
        bail!("--rate must be positive");
    }

    let mice = input::discover();
    if mice.len() < NUM_SLOTS {
        warn!(
            found = mice.len(),
            "fewer than {NUM_SLOTS} mice; remaining slots stay zero"
        );
    }

    let mut aggregator = Aggregator::new();
    let mut devices = Vec::new();
    for (slot, mouse) in mice.into_iter().enumerate() {
        aggregator.bind(slot)?;
        println!("slot {slot}: {} ({})", mouse.name, mouse.path.display());
        devices.push(mouse.device);
    }

    let mut mux = input::EvdevMux::new(devices)?;
    let mut sink = SerialSink::open(port, baud)?;
    let stop = stop_flag()?;
    let period = Duration::from_secs_f64(1.0 / rate);

    println!("Bridging to {port} at {baud} baud, {rate} Hz. Ctrl+C to stop.");
    aggregator
        .run(&mut mux, &mut sink, period, &stop)
        .context("bridge loop")?;
    println!("Stopped.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn send_settings(
    port: &str,
    baud: u32,
    config: Option<PathBuf>,
    num_mice: Option<u8>,
    logic_mode: Option<String>,
    input_mode: Option<String>,
    output_mode: Option<String>,
    amplify: Option<f32>,
    quad_scale: Option<u16>,
    no_save: bool,
) -> Result<()> {
    let mut settings = Settings::default();

    if let Some(path) = config {
        apply_config_file(&mut settings, &path)?;
    }

    if let Some(n) = num_mice {
        settings.num_devices = n;
    }
    if let Some(name) = logic_mode {
        settings.logic_mode = LogicMode::from_name(&name).ok_or_else(|| {
            anyhow::anyhow!("unknown logic mode '{name}'; valid: {}", mode_list(LogicMode::ALL.iter().map(|m| m.label())))
        })?;
    }
    if let Some(name) = input_mode {
        settings.input_mode = InputMode::from_name(&name).ok_or_else(|| {
            anyhow::anyhow!("unknown input mode '{name}'; valid: {}", mode_list(InputMode::ALL.iter().map(|m| m.label())))
        })?;
    }
    if let Some(name) = output_mode {
        settings.output_mode = OutputMode::from_name(&name).ok_or_else(|| {
            anyhow::anyhow!("unknown output mode '{name}'; valid: {}", mode_list(OutputMode::ALL.iter().map(|m| m.label())))
        })?;
    }
    if let Some(a) = amplify {
        settings.amplify = a;
    }
    if let Some(q) = quad_scale {
        settings.quad_scale = q;
    }
    settings.persist = !no_save;

    let validated = validate::validate(&settings)?;
    let frame = control::encode(&validated);

    let mut sink = SerialSink::open(port, baud)?;
    sink.write_frame(&frame)?;

    println!(
        "Sent settings to {port}: num_devices={} logic={} input={} output={} amplify={} quad_scale={} save={}",
        validated.num_devices,
        validated.logic_mode,
        validated.input_mode,
        validated.output_mode,
        validated.amplify,
        validated.quad_scale,
        validated.persist
    );
    Ok(())
}

/// Load key/value pairs from a JSON config file into the settings record.
/// Unknown keys and malformed values are ignored with a warning.
fn apply_config_file(settings: &mut Settings, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parse config file {}", path.display()))?;
    let object = value
        .as_object()
        .with_context(|| format!("config file {} is not a JSON object", path.display()))?;

    for (key, value) in object {
        let raw = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        settings.apply_kv(key, &raw);
    }
    Ok(())
}

fn mode_list<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

fn test_random(
    port: &str,
    baud: u32,
    rate: f64,
    magnitude: i32,
    single: Option<usize>,
    duration: Option<f64>,
) -> Result<()> {
    let mode = match single {
        Some(slot) => GenMode::Single(slot),
        None => GenMode::AllSlots,
    };
    let mut source = SyntheticSource::new(mode, magnitude)?;
    let mut sink = SerialSink::open(port, baud)?;
    let stop = stop_flag()?;

    println!("Sending random frames to {port} at {rate} Hz. Ctrl+C to stop.");
    if let Some(slot) = single {
        println!("Only slot {slot} will move (others zero).");
    }

    let started = Instant::now();
    let sent = source.run(
        &mut sink,
        rate,
        duration.map(Duration::from_secs_f64),
        &stop,
    )?;
    let elapsed = started.elapsed().as_secs_f64();
    println!("Sent {sent} frames in {elapsed:.1} s ({:.0} Hz)", sent as f64 / elapsed.max(1e-9));
    Ok(())
}

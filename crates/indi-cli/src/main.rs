//! INDI CLI - Drive a device's property store from the command line
//!
//! Builds a device from its role profile, then renders outbound protocol
//! elements or replays a capture of inbound elements into the store.

mod config;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use indi_core::format::{format_number, parse_number, parse_switch};
use indi_core::wire::decode;
use indi_core::{Blob, Device, DeviceNotification, Number, PropertyKind, Switch, Text};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "indi")]
#[command(about = "INDI device property store and protocol codec")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "indi.toml")]
    config: PathBuf,

    /// Device name (overrides the configuration file)
    #[arg(short, long)]
    device: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print definitions for one vector, or all of them
    Announce {
        #[arg(default_value = "")]
        name: String,
    },
    /// Print a property request for one vector, or all of them
    Query {
        #[arg(default_value = "")]
        name: String,
    },
    /// Set one value and print the resulting message
    ///
    /// Blob values are read from the file named by INPUT.
    Set {
        vector: String,
        value: String,
        input: String,
        /// Vector kind, required when the name exists under several kinds
        #[arg(short, long)]
        kind: Option<PropertyKind>,
    },
    /// Apply a capture of inbound elements, one per line
    Replay {
        file: PathBuf,
        /// Print the final store as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("INDI v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(device) = args.device {
        config.device.name = device;
    }

    info!(
        device = %config.device.name,
        role = %config.device.role,
        mode = %config.device.mode,
        "Configuration loaded"
    );

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let printer = spawn_printer(rx);
    let mut device = build_device(&config, tx)?;
    let logger = spawn_notification_logger(device.subscribe());

    match args.command {
        Command::Announce { name } => {
            device.define_properties(&name)?;
        }
        Command::Query { name } => {
            device.query_properties(&name)?;
            if config.device.enable_blobs {
                device.enable_blob(true)?;
            }
        }
        Command::Set {
            vector,
            value,
            input,
            kind,
        } => {
            set_value(&mut device, &vector, &value, &input, kind)?;
        }
        Command::Replay { file, json } => {
            replay(&mut device, &file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(device.store())?);
            } else {
                print_summary(&device);
            }
        }
    }

    // Closes both channels so the tasks drain and exit
    drop(device);
    printer.await?;
    logger.await?;

    Ok(())
}

fn build_device(config: &Config, publisher: mpsc::UnboundedSender<String>) -> Result<Device> {
    let extra = config.profiles.load()?;
    let device = Device::new(&config.device.name, config.device.mode, publisher)
        .with_profile(config.device.role, extra)?;
    Ok(device)
}

fn spawn_printer(mut rx: mpsc::UnboundedReceiver<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            println!("{}", message);
        }
    })
}

fn spawn_notification_logger(mut rx: broadcast::Receiver<DeviceNotification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(DeviceNotification::ConnectionChanged { device, connected }) => {
                    info!(device = %device, connected, "Connection changed");
                }
                Ok(DeviceNotification::PropertyUpdated {
                    device,
                    kind,
                    name,
                    standard,
                }) => {
                    debug!(
                        device = %device,
                        kind = %kind,
                        vector = %name,
                        standard = standard.as_deref().unwrap_or("-"),
                        "Property updated"
                    );
                }
                Ok(DeviceNotification::PropertyDeleted { device, name }) => {
                    info!(device = %device, vector = %name, "Property deleted");
                }
                Ok(DeviceNotification::Message { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!(skipped = n, "Notification channel lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn set_value(
    device: &mut Device,
    vector: &str,
    value: &str,
    input: &str,
    kind: Option<PropertyKind>,
) -> Result<()> {
    let kinds = device.store().kinds_of(vector);
    let kind = match (kind, kinds.as_slice()) {
        (_, []) => bail!("Unknown vector: {}", vector),
        (Some(kind), _) if kinds.contains(&kind) => kind,
        (Some(kind), _) => bail!("No {} vector named {}", kind, vector),
        (None, [kind]) => *kind,
        (None, _) => {
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            bail!(
                "Vector {} exists as {}; pick one with --kind",
                vector,
                names.join(", ")
            )
        }
    };

    match kind {
        PropertyKind::Number => {
            let x = parse_number(input).ok_or_else(|| anyhow!("Invalid number: {}", input))?;
            device.set_number(vector, value, x)?;
        }
        PropertyKind::Switch => {
            let on = parse_switch(input).ok_or_else(|| anyhow!("Invalid switch state: {}", input))?;
            device.set_switch(vector, value, on)?;
        }
        PropertyKind::Text => {
            device.set_text(vector, value, input)?;
        }
        PropertyKind::Blob => {
            let payload = std::fs::read(input).with_context(|| format!("Failed to read {}", input))?;
            device.set_blob(vector, value, &payload)?;
        }
    }
    Ok(())
}

fn replay(device: &mut Device, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut applied = 0usize;
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match decode(line) {
            Ok(event) => {
                device.handle(event);
                applied += 1;
            }
            Err(e) => warn!(line = line_no + 1, error = %e, "Skipping element"),
        }
    }

    if applied == 0 && !content.trim().is_empty() {
        bail!("No element in {} could be decoded", file.display());
    }
    info!(path = %file.display(), applied, "Replay complete");
    Ok(())
}

fn print_summary(device: &Device) {
    let store = device.store();
    println!(
        "{} ({} vectors, {})",
        device.name(),
        store.len(),
        if device.is_connected() { "connected" } else { "disconnected" }
    );
    for group in store.groups() {
        println!("  [{}]", if group.is_empty() { "-" } else { group.as_str() });
        for vector in store.vectors::<Number>().filter(|v| v.group == group) {
            let values: Vec<String> = vector
                .values
                .iter()
                .map(|n| format!("{}={}", n.name, format_number(n.value)))
                .collect();
            println!("    number {}: {}", vector.name, values.join(" "));
        }
        for vector in store.vectors::<Switch>().filter(|v| v.group == group) {
            let selected = vector.selected().map(|s| s.name.as_str()).unwrap_or("-");
            println!("    switch {}: {}", vector.name, selected);
        }
        for vector in store.vectors::<Text>().filter(|v| v.group == group) {
            let values: Vec<String> = vector
                .values
                .iter()
                .map(|t| format!("{}={:?}", t.name, t.value))
                .collect();
            println!("    text {}: {}", vector.name, values.join(" "));
        }
        for vector in store.vectors::<Blob>().filter(|v| v.group == group) {
            let sizes: Vec<String> = vector
                .values
                .iter()
                .map(|b| format!("{}[{}]", b.name, b.value.len()))
                .collect();
            println!("    blob {}: {}", vector.name, sizes.join(" "));
        }
    }
}

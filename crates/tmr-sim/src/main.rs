//! tmr-sim - TMR voter simulation
//!
//! Feeds simulated triplicated sensor readings through the voter task and
//! reports what the voter forwarded and which state transitions it requested.

#![deny(clippy::unwrap_used)]

mod report;
mod sensors;
mod sim;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tmr_voter::{VoterConfig, VoterError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::sensors::FaultMode;
use crate::sim::SimulationOptions;

#[derive(Parser, Debug)]
#[command(name = "tmr-sim")]
#[command(about = "Simulate a triplicated sensor feeding the TMR voter")]
#[command(version)]
struct Cli {
    /// Voter configuration file (YAML or JSON)
    #[arg(long, env = "TMR_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Bit mask applied to every sample, e.g. 0x0FFF
    #[arg(long, value_parser = parse_mask)]
    mask: Option<u16>,

    /// Valid cycles per health classification
    #[arg(long)]
    window: Option<u32>,

    /// Pairwise deviation threshold
    #[arg(long)]
    threshold: Option<u16>,

    /// Sampling cycles to simulate
    #[arg(long, default_value_t = 100)]
    cycles: u64,

    /// Delay between sampling cycles in milliseconds
    #[arg(long, default_value_t = 10)]
    period_ms: u64,

    /// Maximum noise added to each channel
    #[arg(long, default_value_t = 1)]
    noise: u16,

    /// Sensor fault to inject
    #[arg(long, value_enum, default_value_t = FaultMode::None)]
    fault: FaultMode,

    /// Inject a malformed record after every K readings (0 disables)
    #[arg(long, value_name = "K", default_value_t = 0)]
    malformed_every: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Slots in each ring buffer
    #[arg(long, default_value_t = 64)]
    ring_slots: usize,

    /// Output in JSON format for machine parsing
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_mask(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid mask '{text}': {e}"))
}

impl Cli {
    fn voter_config(&self) -> Result<VoterConfig> {
        let mut config = match &self.config {
            Some(path) => VoterConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => VoterConfig::default(),
        };
        if let Some(mask) = self.mask {
            config.mask = mask;
        }
        if let Some(window) = self.window {
            config.window_len = window;
        }
        if let Some(threshold) = self.threshold {
            config.deviation_threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }

    fn options(&self) -> Result<SimulationOptions> {
        Ok(SimulationOptions {
            voter: self.voter_config()?,
            cycles: self.cycles,
            period: Duration::from_millis(self.period_ms),
            noise: self.noise,
            fault: self.fault,
            malformed_every: self.malformed_every,
            seed: self.seed,
            ring_slots: self.ring_slots,
        })
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let report = sim::run(&cli.options()?)?;
    if cli.json {
        report.print_json()
    } else {
        report.print_human();
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tmr_sim={log_level},tmr_voter={log_level},tmr_ringbuf={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                report::print_error_json(&e);
            } else {
                report::print_error_human(&e);
            }
            if e.downcast_ref::<VoterError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

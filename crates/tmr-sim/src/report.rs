//! Output formatting for simulation results.

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use serde_json::json;
use tmr_voter::{StateTransition, SystemState, VoterConfig, VoterStats};

use crate::sensors::FaultMode;
use crate::sim::{MonitorStats, ProducerStats};

/// Transitions listed in human output before eliding the rest.
const MAX_LISTED_TRANSITIONS: usize = 10;

/// Summary of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Voter configuration used.
    pub config: VoterConfig,
    /// Injected fault.
    pub fault: FaultMode,
    /// Cycles requested.
    pub cycles: u64,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
    /// Producer counters.
    pub producer: ProducerStats,
    /// Voter counters.
    pub voter: VoterStats,
    /// Monitor counters.
    pub monitor: MonitorStats,
    /// State requested by the last transition.
    pub final_state: Option<SystemState>,
    /// Requested transitions, oldest first.
    pub transitions: Vec<StateTransition>,
}

impl SimulationReport {
    /// Print the report as pretty JSON.
    pub fn print_json(&self) -> Result<()> {
        let output = json!({
            "success": true,
            "report": self,
        });
        let text = serde_json::to_string_pretty(&output).context("Failed to format report")?;
        println!("{text}");
        Ok(())
    }

    /// Print the report for a terminal.
    pub fn print_human(&self) {
        println!("{}", "TMR Simulation".bold());
        println!(
            "  mask {:#06x}  window {}  threshold {}  fault {:?}",
            self.config.mask, self.config.window_len, self.config.deviation_threshold, self.fault
        );
        println!("  {} cycles in {} ms", self.cycles, self.elapsed_ms);

        println!("\n{}", "Producer".bold());
        println!("  readings sent:   {}", self.producer.readings_sent);
        println!("  malformed sent:  {}", self.producer.malformed_sent);
        println!("  send failures:   {}", self.producer.send_failures);

        println!("\n{}", "Voter".bold());
        println!("  voted:           {}", self.voter.voted);
        println!("  discarded:       {}", self.voter.discarded);
        println!("  forwarded:       {}", self.voter.forwarded);
        println!("  dropped results: {}", self.voter.dropped_results);
        println!("  receive waits:   {}", self.voter.receive_timeouts);
        for state in SystemState::all() {
            println!(
                "  {:<16} {}",
                format!("{state}:"),
                self.voter.classifications_for(state)
            );
        }

        println!("\n{}", "Monitor".bold());
        println!("  results:         {}", self.monitor.results);
        match self.monitor.last_result {
            Some(value) => println!("  last result:     {value} ({value:#06x})"),
            None => println!("  last result:     -"),
        }

        println!("\n{}", "Transitions".bold());
        if self.transitions.is_empty() {
            println!("  {}", "No windows completed".yellow());
        }
        let skipped = self.transitions.len().saturating_sub(MAX_LISTED_TRANSITIONS);
        if skipped > 0 {
            println!("  {}", format!("... {skipped} earlier").as_str().dimmed());
        }
        for transition in self.transitions.iter().skip(skipped) {
            println!("  {} {}", "●".color(state_color(transition.state)), transition);
        }

        match self.final_state {
            Some(state) => println!("\nFinal state: {}", paint_state(state)),
            None => println!("\nFinal state: {}", "unknown".dimmed()),
        }
    }
}

fn state_color(state: SystemState) -> &'static str {
    match state {
        SystemState::AllSensorsOk => "green",
        SystemState::OneSensorFail => "yellow",
        SystemState::CriticalError => "red",
    }
}

fn paint_state(state: SystemState) -> ColoredString {
    state.as_str().color(state_color(state)).bold()
}

/// Print an error as JSON.
pub fn print_error_json(error: &anyhow::Error) {
    let output = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    match serde_json::to_string_pretty(&output) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print an error with its cause chain.
pub fn print_error_human(error: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

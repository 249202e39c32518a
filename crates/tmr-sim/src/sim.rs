//! Simulation wiring: producer, voter task, monitor and transition collector.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tmr_ringbuf::RingBuffer;
use tmr_voter::{
    READING_SIZE, RESULT_SIZE, StateTransition, StopToken, TransitionLog, Voter, VoterConfig,
    VoterTask, decode_result,
};
use tracing::{debug, error, info, trace, warn};

use crate::report::SimulationReport;
use crate::sensors::{FaultMode, SensorModel};

/// Malformed record injected by the producer.
const MALFORMED_RECORD: [u8; 4] = [0xEE; 4];

/// Poll interval of the monitor thread.
const MONITOR_POLL: Duration = Duration::from_millis(50);

/// Upper bound on waiting for the voter to drain the sensor ring.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything needed to run one simulation.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Voter configuration.
    pub voter: VoterConfig,
    /// Sampling cycles to produce.
    pub cycles: u64,
    /// Delay between sampling cycles.
    pub period: Duration,
    /// Maximum per-channel noise added to the measured value.
    pub noise: u16,
    /// Injected sensor fault.
    pub fault: FaultMode,
    /// Inject a malformed record after every `k` readings (0 disables).
    pub malformed_every: u64,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
    /// Slots in each ring buffer.
    pub ring_slots: usize,
}

/// What the producer managed to send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProducerStats {
    /// Readings queued on the sensor ring.
    pub readings_sent: u64,
    /// Malformed records queued on the sensor ring.
    pub malformed_sent: u64,
    /// Records that timed out waiting for ring space.
    pub send_failures: u64,
}

/// What the monitor saw on the result ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    /// Results received.
    pub results: u64,
    /// Most recent result.
    pub last_result: Option<u16>,
}

/// Run a simulation to completion.
pub fn run(options: &SimulationOptions) -> Result<SimulationReport> {
    options.voter.validate().context("Invalid voter configuration")?;

    let sensors = Arc::new(
        RingBuffer::for_items(options.ring_slots, READING_SIZE)
            .context("Failed to create sensor ring")?,
    );
    let monitor = Arc::new(
        RingBuffer::for_items(options.ring_slots, RESULT_SIZE)
            .context("Failed to create monitor ring")?,
    );
    let log = Arc::new(TransitionLog::new());
    let (transition_tx, transition_rx) = crossbeam::channel::bounded::<StateTransition>(64);

    let started = Instant::now();
    info!(
        cycles = options.cycles,
        fault = ?options.fault,
        period_ms = options.period.as_millis(),
        "Starting simulation"
    );

    let collector = spawn_collector(transition_rx, Arc::clone(&log))?;
    let monitor_stop = StopToken::new();
    let monitor_thread = spawn_monitor(Arc::clone(&monitor), monitor_stop.clone())?;

    let voter = Voter::new(
        options.voter,
        Arc::clone(&sensors),
        Arc::clone(&monitor),
        transition_tx,
    )
    .context("Failed to create voter")?;
    let task = VoterTask::spawn(voter).context("Failed to start voter task")?;

    let producer = spawn_producer(options, Arc::clone(&sensors))?;
    let producer_stats = producer
        .join()
        .map_err(|_panic| anyhow!("Producer thread panicked"))?;

    let drain_deadline = Instant::now() + DRAIN_TIMEOUT;
    while !sensors.is_empty() && Instant::now() < drain_deadline {
        thread::sleep(Duration::from_millis(1));
    }
    if !sensors.is_empty() {
        warn!(pending = sensors.len(), "Sensor ring not drained before shutdown");
    }

    let voter_stats = task.stop().context("Voter task failed")?;

    // Voter is gone, so the collector sees a disconnected channel.
    collector
        .join()
        .map_err(|_panic| anyhow!("Transition collector panicked"))?;

    monitor_stop.request_stop();
    let monitor_stats = monitor_thread
        .join()
        .map_err(|_panic| anyhow!("Monitor thread panicked"))?;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(elapsed_ms, "Simulation finished");

    Ok(SimulationReport {
        config: options.voter,
        fault: options.fault,
        cycles: options.cycles,
        elapsed_ms,
        producer: producer_stats,
        voter: voter_stats,
        monitor: monitor_stats,
        final_state: log.current_state(),
        transitions: log.history(),
    })
}

fn spawn_producer(
    options: &SimulationOptions,
    sensors: Arc<RingBuffer>,
) -> Result<JoinHandle<ProducerStats>> {
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut model = SensorModel::new(rng, options.noise, options.fault);
    let cycles = options.cycles;
    let period = options.period;
    let malformed_every = options.malformed_every;
    let send_timeout = period.max(Duration::from_millis(10));

    thread::Builder::new()
        .name("tmr-sim-producer".to_string())
        .spawn(move || {
            let mut stats = ProducerStats::default();
            for cycle in 1..=cycles {
                let reading = model.next_reading();
                trace!(cycle, base = model.base(), %reading, "Sampled sensors");
                match sensors.send(&reading.to_bytes(), send_timeout) {
                    Ok(()) => stats.readings_sent = stats.readings_sent.saturating_add(1),
                    Err(err) if err.is_transient() => {
                        stats.send_failures = stats.send_failures.saturating_add(1);
                        warn!(cycle, %err, "Sensor ring full, reading lost");
                    }
                    Err(err) => {
                        error!(cycle, %err, "Sensor ring rejected reading, stopping producer");
                        stats.send_failures = stats.send_failures.saturating_add(1);
                        break;
                    }
                }

                if malformed_every > 0 && cycle % malformed_every == 0 {
                    match sensors.send(&MALFORMED_RECORD, send_timeout) {
                        Ok(()) => stats.malformed_sent = stats.malformed_sent.saturating_add(1),
                        Err(_) => stats.send_failures = stats.send_failures.saturating_add(1),
                    }
                }

                if !period.is_zero() {
                    thread::sleep(period);
                }
            }
            debug!(?stats, "Producer finished");
            stats
        })
        .context("Failed to spawn producer thread")
}

fn spawn_monitor(monitor: Arc<RingBuffer>, stop: StopToken) -> Result<JoinHandle<MonitorStats>> {
    thread::Builder::new()
        .name("tmr-sim-monitor".to_string())
        .spawn(move || {
            let mut stats = MonitorStats::default();
            loop {
                let Some(item) = monitor.receive(MONITOR_POLL) else {
                    if stop.is_stop_requested() {
                        break;
                    }
                    continue;
                };
                match decode_result(&item) {
                    Ok(result) => {
                        stats.results = stats.results.saturating_add(1);
                        stats.last_result = Some(result);
                    }
                    Err(err) => warn!(%err, "Unexpected record on monitor ring"),
                }
            }
            stats
        })
        .context("Failed to spawn monitor thread")
}

fn spawn_collector(
    transitions: crossbeam::channel::Receiver<StateTransition>,
    log: Arc<TransitionLog>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tmr-sim-state".to_string())
        .spawn(move || {
            for transition in transitions {
                info!(%transition, "State transition requested");
                log.record(transition);
            }
        })
        .context("Failed to spawn transition collector")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmr_voter::SystemState;

    fn options(fault: FaultMode) -> SimulationOptions {
        SimulationOptions {
            voter: VoterConfig {
                receive_timeout_ms: 20,
                send_timeout_ms: 20,
                ..VoterConfig::default()
            },
            cycles: 40,
            period: Duration::ZERO,
            noise: 1,
            fault,
            malformed_every: 0,
            seed: Some(42),
            ring_slots: 64,
        }
    }

    #[test]
    fn test_healthy_run() -> Result<()> {
        let report = run(&options(FaultMode::None))?;
        assert_eq!(report.producer.readings_sent, 40);
        assert_eq!(report.voter.voted, 40);
        assert_eq!(report.monitor.results, 40);
        assert_eq!(report.transitions.len(), 4);
        assert_eq!(report.final_state, Some(SystemState::AllSensorsOk));
        Ok(())
    }

    #[test]
    fn test_stuck_channel_run() -> Result<()> {
        let report = run(&options(FaultMode::Stuck))?;
        assert_eq!(report.final_state, Some(SystemState::OneSensorFail));
        assert!(
            report
                .transitions
                .iter()
                .all(|t| t.suspect == Some(tmr_voter::SensorChannel::Sensor1))
        );
        Ok(())
    }

    #[test]
    fn test_malformed_records_are_discarded() -> Result<()> {
        let mut opts = options(FaultMode::None);
        opts.malformed_every = 5;
        let report = run(&opts)?;
        assert_eq!(report.producer.malformed_sent, 8);
        assert_eq!(report.voter.discarded, 8);
        assert_eq!(report.voter.voted, 40);
        assert_eq!(report.transitions.len(), 4);
        Ok(())
    }

    #[test]
    fn test_producer_stops_when_reading_can_never_fit() -> Result<()> {
        let tiny = Arc::new(RingBuffer::new(8)?);
        let producer = spawn_producer(&options(FaultMode::None), Arc::clone(&tiny))?;
        let stats = producer
            .join()
            .map_err(|_panic| anyhow!("Producer thread panicked"))?;
        assert_eq!(stats.readings_sent, 0);
        assert_eq!(stats.send_failures, 1);
        assert!(tiny.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut opts = options(FaultMode::None);
        opts.voter.window_len = 0;
        assert!(run(&opts).is_err());
    }
}

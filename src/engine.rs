use std::io::{stdout, Read};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel as channel;
use tracing::{debug, info};

use crate::cli::{Cli, OutputFormat};
use crate::clock::{Clock, SystemClock};
use crate::error::SpeedtestError;
use crate::metrics::floor_elapsed;
use crate::reader::{consume, TransferOutcome};
use crate::report::{ConsoleReporter, JsonReporter, Reporter};
use crate::sampler::{Sample, Sampler};
use crate::state::{SessionState, TransferSession};
use crate::transport::{build_client, open};

// Samples the renderer may lag behind before new ones are dropped.
const OBSERVATION_BACKLOG: usize = 64;

#[derive(Debug, Clone)]
pub struct MeasureConfig {
    pub interval: Duration,
    pub buffer_size: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self { interval: Duration::from_millis(100), buffer_size: 32 * 1024 }
    }
}

/// Result of one transfer session.
#[derive(Debug)]
pub struct Measurement {
    pub url: String,
    pub bytes: u64,
    pub elapsed: Duration,
    pub outcome: TransferOutcome,
}

impl Measurement {
    /// Whole-session average in bytes per second; `None` for a failed
    /// transfer.
    pub fn average_bps(&self) -> Option<f64> {
        match self.outcome {
            TransferOutcome::Completed => Some(self.bytes as f64 / floor_elapsed(self.elapsed)),
            TransferOutcome::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Self, SpeedtestError> {
        match self.outcome {
            TransferOutcome::Failed(source) => Err(SpeedtestError::Read { bytes: self.bytes, source }),
            TransferOutcome::Completed => Ok(self),
        }
    }
}

/// Drain `source` while a sampler reports live progress through `reporter`,
/// then hand the final measurement to `reporter`.
///
/// The sampler is stopped and the renderer drained before `finish` runs, so
/// the summary is always the last thing reported.
pub fn measure<S, R>(
    url: &str,
    source: &mut S,
    reporter: R,
    clock: Arc<dyn Clock>,
    config: &MeasureConfig,
) -> Result<Measurement>
where
    S: Read + ?Sized,
    R: Reporter + 'static,
{
    let mut session = TransferSession::new(url, clock.now());
    info!(url = %session.url, buffer = config.buffer_size, interval = ?config.interval, "Transfer started");

    let (sample_tx, sample_rx) = channel::bounded::<Sample>(OBSERVATION_BACKLOG);
    let mut reporter = reporter;
    let renderer = thread::Builder::new()
        .name("dlspeed-render".into())
        .spawn(move || {
            for sample in sample_rx.iter() {
                if let Err(e) = reporter.progress(&sample) {
                    debug!(?e, "Progress write failed");
                }
            }
            reporter
        })
        .context("Spawning renderer thread")?;

    let sampler = Sampler::spawn(
        Arc::clone(&session.downloaded),
        Arc::clone(&clock),
        session.started,
        config.interval,
        sample_tx,
    )?;

    let outcome = consume(source, &session.downloaded, config.buffer_size);
    sampler.stop();
    let mut reporter = renderer.join().map_err(|_| anyhow!("Renderer thread panicked"))?;

    let elapsed = clock.now().saturating_duration_since(session.started);
    session.finish(if outcome.is_completed() { SessionState::Completed } else { SessionState::Failed });
    let measurement = Measurement { url: session.url.clone(), bytes: session.bytes(), elapsed, outcome };
    info!(bytes = measurement.bytes, elapsed = ?elapsed, state = ?session.state(), "Transfer finished");

    reporter.finish(&measurement).context("Writing summary")?;
    Ok(measurement)
}

pub fn run_speedtest(cli: Cli) -> Result<()> {
    let mut reporter: Box<dyn Reporter> = match cli.format {
        OutputFormat::Text => Box::new(ConsoleReporter::new(stdout(), !cli.no_clear)),
        OutputFormat::Json => Box::new(JsonReporter::new(stdout())),
    };
    reporter.start(&cli.url).context("Writing header")?;

    let client = build_client()?;
    let mut response = open(&client, &cli.url)?;

    let config = MeasureConfig { interval: cli.interval(), buffer_size: cli.buffer_size };
    measure(&cli.url, &mut response, reporter, Arc::new(SystemClock), &config)?.into_result()?;
    Ok(())
}

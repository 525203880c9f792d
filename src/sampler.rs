use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{self as channel, select, Sender, TryRecvError, TrySendError};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::metrics::{elapsed_secs, rate_bps};
use crate::state::ByteCounter;

/// One progress observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: Instant,
    pub bytes: u64,
    pub rate_bps: f64,
}

/// Handle to the running sampler thread.
pub struct Sampler {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Sampler {
    /// Start sampling `counter` every `period`, pushing observations into
    /// `out` without ever waiting on it.
    pub fn spawn(
        counter: Arc<ByteCounter>,
        clock: Arc<dyn Clock>,
        started: Instant,
        period: Duration,
        out: Sender<Sample>,
    ) -> Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("dlspeed-sampler".into())
            .spawn(move || {
                let ticker = channel::tick(period);
                let mut prev_at = started;
                let mut prev_bytes = 0u64;
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            // a stop that raced with this tick wins
                            if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                                break;
                            }
                            let now = clock.now();
                            let bytes = counter.get().max(prev_bytes);
                            let sample = Sample {
                                at: now,
                                bytes,
                                rate_bps: rate_bps(prev_bytes, bytes, elapsed_secs(prev_at, now)),
                            };
                            match out.try_send(sample) {
                                Ok(()) => {}
                                Err(TrySendError::Full(_)) => debug!(bytes, "Renderer behind, dropping sample"),
                                Err(TrySendError::Disconnected(_)) => break,
                            }
                            prev_at = now;
                            prev_bytes = bytes;
                        }
                    }
                }
                debug!("Sampler stopped");
            })
            .context("Spawning sampler thread")?;
        Ok(Self { stop_tx, handle })
    }

    /// Cancel the ticker and wait for the thread to exit. Once this returns
    /// no further sample is sent.
    pub fn stop(self) {
        let _ = self.stop_tx.try_send(());
        drop(self.stop_tx);
        if self.handle.join().is_err() {
            warn!("Sampler thread panicked");
        }
    }
}

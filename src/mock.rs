//! Scripted streams and a hand-driven clock for exercising the engine
//! without a network or wall-clock dependence.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

/// Delivers the planned chunk sizes in order, never more than the caller's
/// buffer per read, then end of stream.
pub struct ChunkedReader {
    plan: VecDeque<usize>,
    interrupt_every: Option<usize>,
    calls: usize,
}

impl ChunkedReader {
    pub fn new(plan: Vec<usize>) -> Self {
        // a zero-length read would read as end of stream
        let plan = plan.into_iter().filter(|n| *n > 0).collect();
        Self { plan, interrupt_every: None, calls: 0 }
    }

    pub fn interrupt_every(mut self, n: usize) -> Self {
        self.interrupt_every = Some(n.max(1));
        self
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        if let Some(k) = self.interrupt_every {
            if self.calls % k == 0 {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
        }
        let Some(front) = self.plan.front_mut() else {
            return Ok(0);
        };
        let n = (*front).min(buf.len());
        buf[..n].fill(0xAB);
        *front -= n;
        if *front == 0 {
            self.plan.pop_front();
        }
        Ok(n)
    }
}

/// Delivers `total` bytes then fails with `kind` instead of ending.
pub struct FailingReader {
    remaining: usize,
    kind: ErrorKind,
}

impl FailingReader {
    pub fn new(total: usize, kind: ErrorKind) -> Self {
        Self { remaining: total, kind }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(self.kind, "simulated transport failure"));
        }
        let n = self.remaining.min(buf.len());
        self.remaining -= n;
        Ok(n)
    }
}

/// Advances a [`ManualClock`] by a fixed step after every non-empty read.
pub struct PacedReader<R> {
    inner: R,
    clock: Arc<ManualClock>,
    per_read: Duration,
}

impl<R: Read> PacedReader<R> {
    pub fn new(inner: R, clock: Arc<ManualClock>, per_read: Duration) -> Self {
        Self { inner, clock, per_read }
    }
}

impl<R: Read> Read for PacedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.clock.advance(self.per_read);
        }
        Ok(n)
    }
}

pub struct ManualClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { base: Instant::now(), offset_nanos: AtomicU64::new(0) }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

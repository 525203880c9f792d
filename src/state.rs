use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Total bytes transferred. The reader is the only writer, the sampler the
/// only reader; the value never decreases.
#[derive(Debug, Default)]
pub struct ByteCounter {
    total: AtomicU64,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: u64) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Completed,
    Failed,
}

/// One attempt to download a resource and measure its throughput.
pub struct TransferSession {
    pub url: String,
    pub started: Instant,
    pub downloaded: Arc<ByteCounter>,
    state: SessionState,
}

impl TransferSession {
    pub fn new(url: impl Into<String>, started: Instant) -> Self {
        Self {
            url: url.into(),
            started,
            downloaded: Arc::new(ByteCounter::new()),
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn bytes(&self) -> u64 {
        self.downloaded.get()
    }

    pub(crate) fn finish(&mut self, state: SessionState) {
        debug_assert_ne!(state, SessionState::Running);
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn counter_accumulates_across_threads() {
        let counter = Arc::new(ByteCounter::new());
        let writer = {
            let c = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    c.add(3);
                }
            })
        };
        let mut last = 0;
        while !writer.is_finished() {
            let now = counter.get();
            assert!(now >= last);
            last = now;
        }
        writer.join().unwrap();
        assert_eq!(counter.get(), 30_000);
    }

    #[test]
    fn session_starts_running_with_zero_bytes() {
        let s = TransferSession::new("http://example.com", Instant::now());
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.bytes(), 0);
    }

    #[test]
    fn session_finish_records_state() {
        let mut s = TransferSession::new("http://example.com", Instant::now());
        s.downloaded.add(42);
        s.finish(SessionState::Failed);
        assert_eq!(s.state(), SessionState::Failed);
        assert_eq!(s.bytes(), 42);
    }
}

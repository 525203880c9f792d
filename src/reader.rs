use std::io::{ErrorKind, Read};

use tracing::warn;

use crate::state::ByteCounter;

#[derive(Debug)]
pub enum TransferOutcome {
    Completed,
    Failed(std::io::Error),
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TransferOutcome::Completed)
    }
}

/// Drain `source` through a reused buffer of `buffer_size` bytes, adding
/// every chunk to `counter` as soon as it arrives.
///
/// End of stream is the only success signal. Interrupted reads are retried;
/// any other error stops the transfer with whatever was already counted.
pub fn consume<R: Read + ?Sized>(
    source: &mut R,
    counter: &ByteCounter,
    buffer_size: usize,
) -> TransferOutcome {
    let mut buffer = vec![0u8; buffer_size.max(1)];
    loop {
        match source.read(&mut buffer) {
            Ok(0) => return TransferOutcome::Completed,
            Ok(n) => counter.add(n as u64),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(?e, bytes = counter.get(), "Read failed mid-transfer");
                return TransferOutcome::Failed(e);
            }
        }
    }
}

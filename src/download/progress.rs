//! Download progress reporting and fixed-size re-chunking.

use bytes::{Bytes, BytesMut};

/// Progress of a source download after a chunk has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferProgress {
    /// Percentage of the declared `Content-Length`, capped at 100.
    Percent(u8),
    /// No usable `Content-Length`; only the running byte count is known.
    Indeterminate {
        /// Bytes written so far.
        bytes: u64,
    },
}

impl TransferProgress {
    /// Computes progress for `downloaded` bytes against an optional total.
    ///
    /// A missing or zero total yields [`TransferProgress::Indeterminate`].
    #[must_use]
    pub fn compute(downloaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                let percent = downloaded.saturating_mul(100) / total;
                Self::Percent(u8::try_from(percent.min(100)).unwrap_or(100))
            }
            _ => Self::Indeterminate { bytes: downloaded },
        }
    }
}

/// Regroups arbitrary network frames into chunks of exactly `chunk_size`
/// bytes. Only the final chunk may be shorter.
#[derive(Debug)]
pub(crate) struct ChunkBuffer {
    chunk_size: usize,
    pending: BytesMut,
}

impl ChunkBuffer {
    pub(crate) fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            pending: BytesMut::with_capacity(chunk_size),
        }
    }

    pub(crate) fn extend(&mut self, frame: &[u8]) {
        self.pending.extend_from_slice(frame);
    }

    /// Takes the next full chunk, if one is buffered.
    pub(crate) fn take_full(&mut self) -> Option<Bytes> {
        (self.pending.len() >= self.chunk_size)
            .then(|| self.pending.split_to(self.chunk_size).freeze())
    }

    /// Takes whatever remains once the stream has ended.
    pub(crate) fn take_rest(&mut self) -> Option<Bytes> {
        (!self.pending.is_empty()).then(|| self.pending.split().freeze())
    }
}

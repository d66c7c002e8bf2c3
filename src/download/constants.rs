//! Constants for the download module (chunking, timeouts, fallback name).

/// Size of each chunk written to the staged file (8 KiB).
pub const CHUNK_SIZE: usize = 8192;

/// Connect and per-read timeout for source fetches (60 seconds).
pub const TIMEOUT_SECS: u64 = 60;

/// Filename used when neither the headers nor the URL provide one.
pub const FALLBACK_FILENAME: &str = "downloaded_file";

//! Binary-side helpers: progress display and exit status mapping.

pub(crate) mod exit_handler;
pub(crate) mod progress_manager;

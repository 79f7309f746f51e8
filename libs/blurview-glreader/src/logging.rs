// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `tracing` subscriber bootstrap.
//!
//! The readback runs inside a host process (an app, a test binary) that may
//! or may not have installed a subscriber. These helpers install a fmt
//! subscriber if none is set yet and are no-ops otherwise.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV_VAR: &str = "BLURVIEW_GLREADER_LOG";

/// Filter from `BLURVIEW_GLREADER_LOG`, `info` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a fmt subscriber writing to stderr.
pub fn init_logging() {
    init_logging_with_writer(std::io::stderr);
}

/// Install a fmt subscriber writing to `writer`.
///
/// Ignores the error when a global subscriber already exists.
pub fn init_logging_with_writer<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

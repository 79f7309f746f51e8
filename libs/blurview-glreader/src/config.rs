// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Readback configuration.
//!
//! The timing log level can be selected via:
//! 1. Explicit value passed to `TimingLevel::resolve()`
//! 2. `BLURVIEW_GLREADER_TIMING` environment variable
//! 3. Default (`info`, which the default log filter lets through)

use std::str::FromStr;

/// Level at which the per-call `glReadPixels` duration is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimingLevel {
    /// Don't log the duration.
    Off,
    Trace,
    Debug,
    #[default]
    Info,
}

impl TimingLevel {
    /// Environment variable name for the timing level override.
    pub const ENV_VAR: &'static str = "BLURVIEW_GLREADER_TIMING";

    /// Resolve the timing level.
    ///
    /// Resolution priority:
    /// 1. Explicit value (if provided)
    /// 2. `BLURVIEW_GLREADER_TIMING` environment variable
    /// 3. Default
    pub fn resolve(explicit: Option<Self>) -> Self {
        if let Some(level) = explicit {
            return level;
        }

        if let Ok(env_value) = std::env::var(Self::ENV_VAR) {
            if let Ok(level) = env_value.parse() {
                return level;
            }
        }

        Self::default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

impl FromStr for TimingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            _ => Err(format!(
                "Unknown timing level '{}'. Valid values: off, trace, debug, info",
                s
            )),
        }
    }
}

impl std::fmt::Display for TimingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Knobs for [`PixelReadback`](crate::PixelReadback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadbackConfig {
    /// Reject the call when the context is not current on this thread.
    pub require_current_context: bool,
    /// Reject the call when the render target size cannot be determined.
    /// When false, an unknown size is logged and the read proceeds with the
    /// bitmap's size.
    pub strict_target_extent: bool,
    pub timing_level: TimingLevel,
}

impl Default for ReadbackConfig {
    fn default() -> Self {
        Self {
            require_current_context: true,
            strict_target_extent: false,
            timing_level: TimingLevel::default(),
        }
    }
}

impl ReadbackConfig {
    /// Default config with the timing level taken from the environment.
    pub fn from_env() -> Self {
        Self::default().with_timing_level(TimingLevel::resolve(None))
    }

    pub fn with_require_current_context(mut self, require: bool) -> Self {
        self.require_current_context = require;
        self
    }

    pub fn with_strict_target_extent(mut self, strict: bool) -> Self {
        self.strict_target_extent = strict;
        self
    }

    pub fn with_timing_level(mut self, level: TimingLevel) -> Self {
        self.timing_level = level;
        self
    }
}

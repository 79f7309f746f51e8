// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Render target → bitmap readback.

use std::time::{Duration, Instant};

use crate::config::{ReadbackConfig, TimingLevel};
use crate::context::RenderContext;
use crate::error::{ReadbackError, Result};
use crate::lock::PixelLock;
use crate::surface::{Extent, LockableSurface, SurfaceInfo};

/// `tracing` target for every readback event.
pub const LOG_TARGET: &str = "readToBitmap";

/// Outcome of a successful readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadbackReport {
    pub extent: Extent,
    pub bytes_copied: usize,
    /// Wall time of the `read_pixels` call alone.
    pub elapsed: Duration,
}

impl ReadbackReport {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Reads the bound render target into bitmaps with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct PixelReadback {
    config: ReadbackConfig,
}

impl PixelReadback {
    pub fn new(config: ReadbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadbackConfig {
        &self.config
    }

    pub fn read<C, S>(&self, ctx: &C, surface: &mut S) -> Result<ReadbackReport>
    where
        C: RenderContext + ?Sized,
        S: LockableSurface + ?Sized,
    {
        read_to_surface(ctx, surface, &self.config)
    }
}

/// Copy the render target bound in `ctx` into `surface`.
///
/// The surface is locked only after its descriptor has been validated against
/// the render target; every rejection before that point leaves the surface
/// untouched and never requests the lock. Once locked, the lock is released
/// before this function returns.
pub fn read_to_surface<C, S>(
    ctx: &C,
    surface: &mut S,
    config: &ReadbackConfig,
) -> Result<ReadbackReport>
where
    C: RenderContext + ?Sized,
    S: LockableSurface + ?Sized,
{
    let info = surface.info().map_err(|code| {
        let err = ReadbackError::SurfaceInfoUnavailable { code };
        tracing::error!(target: LOG_TARGET, "{}", err);
        err
    })?;

    let (extent, len) = validate(ctx, &info, config).inspect_err(|err| {
        tracing::error!(target: LOG_TARGET, "{}", err);
    })?;

    // SAFETY: `validate` derived `len` from this descriptor and checked that
    // rows are tightly packed, so `len == stride * height`.
    let mut lock = unsafe { PixelLock::acquire_unchecked(surface, len) }.inspect_err(|err| {
        tracing::error!(target: LOG_TARGET, "{}", err);
    })?;

    let start = Instant::now();
    ctx.read_pixels(extent, lock.pixels_mut());
    let elapsed = start.elapsed();

    let report = ReadbackReport {
        extent,
        bytes_copied: len,
        elapsed,
    };
    log_timing(config.timing_level, &report);

    drop(lock);
    Ok(report)
}

/// Descriptor and render target checks. Returns the read extent and its
/// byte length.
fn validate<C>(ctx: &C, info: &SurfaceInfo, config: &ReadbackConfig) -> Result<(Extent, usize)>
where
    C: RenderContext + ?Sized,
{
    if !info.format.is_readback_compatible() {
        return Err(ReadbackError::UnsupportedFormat(info.format));
    }

    let extent = info.extent();
    let too_large = || ReadbackError::SurfaceTooLarge(extent);

    // glReadPixels takes GLsizei.
    if i32::try_from(extent.width).is_err() || i32::try_from(extent.height).is_err() {
        return Err(too_large());
    }
    let expected_stride = extent.width.checked_mul(4).ok_or_else(too_large)?;
    if info.stride != expected_stride {
        return Err(ReadbackError::StrideMismatch {
            stride: info.stride,
            expected: expected_stride,
        });
    }
    let len = extent.rgba_byte_len().ok_or_else(too_large)?;

    if config.require_current_context && !ctx.is_current() {
        return Err(ReadbackError::ContextNotCurrent);
    }

    match ctx.target_extent() {
        Some(target) if target != extent => {
            return Err(ReadbackError::TargetSizeMismatch {
                target,
                surface: extent,
            });
        }
        Some(_) => {}
        None if config.strict_target_extent => return Err(ReadbackError::TargetExtentUnknown),
        None => {
            tracing::warn!(
                target: LOG_TARGET,
                "Render target size unknown, reading {} to match the bitmap",
                extent
            );
        }
    }

    Ok((extent, len))
}

fn log_timing(level: TimingLevel, report: &ReadbackReport) {
    let ms = report.elapsed_ms();
    match level {
        TimingLevel::Off => {}
        TimingLevel::Trace => {
            tracing::trace!(
                target: LOG_TARGET,
                extent = %report.extent,
                "glReadPixels time : {:.3}",
                ms
            )
        }
        TimingLevel::Debug => {
            tracing::debug!(
                target: LOG_TARGET,
                extent = %report.extent,
                "glReadPixels time : {:.3}",
                ms
            )
        }
        TimingLevel::Info => {
            tracing::info!(
                target: LOG_TARGET,
                extent = %report.extent,
                "glReadPixels time : {:.3}",
                ms
            )
        }
    }
}

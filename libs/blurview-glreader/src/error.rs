// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

use crate::surface::{Extent, PixelFormat};

#[derive(Error, Debug)]
pub enum ReadbackError {
    #[error("get info failed : {code}")]
    SurfaceInfoUnavailable { code: i32 },

    #[error("lock pixels failed : {code}")]
    MemoryAcquisitionFailed { code: i32 },

    #[error("Unsupported bitmap format {0:?} (only RGBA_8888 can be read back)")]
    UnsupportedFormat(PixelFormat),

    #[error("Bitmap rows are not tightly packed: stride {stride}, expected {expected}")]
    StrideMismatch { stride: u32, expected: u32 },

    #[error("Bitmap {0} is too large to read back")]
    SurfaceTooLarge(Extent),

    #[error("Requested {requested} bytes but the bitmap holds {available}")]
    LockRangeOutOfBounds { requested: usize, available: usize },

    #[error("Render context is not current on this thread")]
    ContextNotCurrent,

    #[error("Render target is {target} but bitmap is {surface}")]
    TargetSizeMismatch { target: Extent, surface: Extent },

    #[error("Render target size is unknown")]
    TargetExtentUnknown,

    #[error("EGL error: {0}")]
    Egl(String),
}

impl ReadbackError {
    /// Status code reported across the FFI boundary.
    pub fn status(&self) -> ReadbackStatus {
        match self {
            Self::SurfaceInfoUnavailable { .. } => ReadbackStatus::SurfaceInfoUnavailable,
            Self::MemoryAcquisitionFailed { .. } => ReadbackStatus::MemoryAcquisitionFailed,
            Self::UnsupportedFormat(_)
            | Self::StrideMismatch { .. }
            | Self::SurfaceTooLarge(_)
            | Self::LockRangeOutOfBounds { .. }
            | Self::ContextNotCurrent
            | Self::TargetSizeMismatch { .. }
            | Self::TargetExtentUnknown
            | Self::Egl(_) => ReadbackStatus::InvalidTarget,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadbackError>;

/// Discriminated outcome of a readback, for callers that only see an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReadbackStatus {
    Success = 0,
    SurfaceInfoUnavailable = 1,
    MemoryAcquisitionFailed = 2,
    /// Bitmap or render target rejected before the lock was taken.
    InvalidTarget = 3,
}

impl ReadbackStatus {
    #[inline]
    pub const fn as_code(&self) -> i32 {
        *self as i32
    }
}

impl<T> From<&Result<T>> for ReadbackStatus {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.status(),
        }
    }
}

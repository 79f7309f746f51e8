// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Scoped access to a surface's pixel memory.

use std::ptr::NonNull;

use crate::error::{ReadbackError, Result};
use crate::surface::LockableSurface;

/// Locked pixel memory of a [`LockableSurface`].
///
/// Exists only after a successful `lock_pixels`. Dropping it calls
/// `unlock_pixels` exactly once, on every exit path including unwinding.
///
/// The guard borrows the surface mutably, so nothing else can lock, unlock or
/// query it while the guard is alive, and the guard cannot leave the thread
/// that took it.
pub struct PixelLock<'a, S: LockableSurface + ?Sized> {
    surface: &'a mut S,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a, S: LockableSurface + ?Sized> PixelLock<'a, S> {
    /// Lock `surface` and expose the first `len` bytes of its memory.
    ///
    /// `len` is checked against `stride * height` of the surface's current
    /// descriptor before the lock is requested; a larger request fails with
    /// [`ReadbackError::LockRangeOutOfBounds`] and leaves the surface unlocked.
    pub fn acquire(surface: &'a mut S, len: usize) -> Result<Self> {
        let info = surface
            .info()
            .map_err(|code| ReadbackError::SurfaceInfoUnavailable { code })?;
        let available = (info.stride as usize)
            .checked_mul(info.height as usize)
            .unwrap_or(usize::MAX);
        if len > available {
            return Err(ReadbackError::LockRangeOutOfBounds {
                requested: len,
                available,
            });
        }
        // SAFETY: `len` fits the descriptor just queried, and the surface is
        // mutably borrowed until the lock is taken.
        unsafe { Self::acquire_unchecked(surface, len) }
    }

    /// Lock `surface` without querying its descriptor again.
    ///
    /// # Safety
    ///
    /// `len` must not exceed `stride * height` of the surface's descriptor as
    /// it stands when the lock is taken.
    pub(crate) unsafe fn acquire_unchecked(surface: &'a mut S, len: usize) -> Result<Self> {
        let ptr = surface
            .lock_pixels()
            .map_err(|code| ReadbackError::MemoryAcquisitionFailed { code })?;
        Ok(Self { surface, ptr, len })
    }

    /// The locked region, `len` bytes long.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        // SAFETY: `LockableSurface` guarantees the pointer is valid for
        // `stride * height >= len` bytes until `unlock_pixels`, which only
        // runs in `Drop`. The `&mut self` receiver prevents aliasing slices.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<S: LockableSurface + ?Sized> Drop for PixelLock<'_, S> {
    fn drop(&mut self) {
        self.surface.unlock_pixels();
    }
}

impl<S: LockableSurface + ?Sized> std::fmt::Debug for PixelLock<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelLock")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

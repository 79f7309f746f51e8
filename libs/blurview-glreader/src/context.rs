// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Render context seam.
//!
//! GL state is thread-bound and implicit. Readback takes the context as an
//! explicit handle instead, so "a context is current on this thread" and
//! "the bound target has the bitmap's size" become checks rather than
//! assumptions.

use crate::surface::Extent;

/// The render context whose bound target is read back.
pub trait RenderContext {
    /// Whether this context is current on the calling thread.
    fn is_current(&self) -> bool;

    /// Size of the currently bound render target, `None` if it cannot be
    /// determined.
    fn target_extent(&self) -> Option<Extent>;

    /// Copy `(0,0)`–`(extent.width, extent.height)` of the bound target into
    /// `dst` as tightly packed RGBA, 8 bits per channel.
    ///
    /// `dst` is exactly `extent.rgba_byte_len()` bytes. Blocks until the copy
    /// is complete. Failures of the underlying call are not reported.
    fn read_pixels(&self, extent: Extent, dst: &mut [u8]);
}

impl<T: RenderContext + ?Sized> RenderContext for &T {
    fn is_current(&self) -> bool {
        (**self).is_current()
    }

    fn target_extent(&self) -> Option<Extent> {
        (**self).target_extent()
    }

    fn read_pixels(&self, extent: Extent, dst: &mut [u8]) {
        (**self).read_pixels(extent, dst)
    }
}

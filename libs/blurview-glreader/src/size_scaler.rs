// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Downscaled bitmap sizing.
//!
//! The blur runs on a bitmap smaller than the view by `scale_factor`. The
//! downscaled width is rounded up to a multiple of [`ROUNDING_VALUE`] so the
//! row stride meets allocator alignment without an extra copy; the height is
//! scaled by the same effective factor as the width.
//!
//! Not part of the JNI surface: the Java view sizes its own bitmaps. This is
//! for Rust hosts that allocate the bitmap they read back into.

/// Width alignment of downscaled bitmaps. 16 on most devices, 64 on some.
pub const ROUNDING_VALUE: u32 = 64;

/// Result of [`SizeScaler::scale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledSize {
    pub width: u32,
    pub height: u32,
    /// Effective factor from the original width to `width`.
    pub scale_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScaler {
    scale_factor: f32,
}

impl SizeScaler {
    /// `None` unless `scale_factor` is finite and greater than zero.
    pub fn new(scale_factor: f32) -> Option<Self> {
        (scale_factor.is_finite() && scale_factor > 0.0).then_some(Self { scale_factor })
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Downscale `width`×`height`.
    ///
    /// Check [`is_zero_sized`](Self::is_zero_sized) first: a zero width
    /// yields a zero size with the configured factor.
    pub fn scale(&self, width: u32, height: u32) -> ScaledSize {
        let scaled_width = round_size(self.downscale(width));
        if scaled_width == 0 {
            return ScaledSize {
                width: 0,
                height: 0,
                scale_factor: self.scale_factor,
            };
        }

        let rounding_scale_factor = width as f32 / scaled_width as f32;
        // Ceil so no empty rows are left at the bottom of the view.
        let scaled_height = (height as f32 / rounding_scale_factor).ceil() as u32;

        ScaledSize {
            width: scaled_width,
            height: scaled_height,
            scale_factor: rounding_scale_factor,
        }
    }

    pub fn is_zero_sized(&self, width: u32, height: u32) -> bool {
        self.downscale(width) == 0 || self.downscale(height) == 0
    }

    fn downscale(&self, value: u32) -> u32 {
        (value as f32 / self.scale_factor).ceil() as u32
    }
}

/// Round up to the next multiple of [`ROUNDING_VALUE`], or down to the largest
/// one when rounding up would overflow.
fn round_size(value: u32) -> u32 {
    value
        .checked_next_multiple_of(ROUNDING_VALUE)
        .unwrap_or(u32::MAX - u32::MAX % ROUNDING_VALUE)
}

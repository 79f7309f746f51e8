// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Target surface contract: descriptor, pixel format and scoped memory access.

use std::ptr::NonNull;

/// Pixel format of a platform bitmap.
///
/// Values ARE the `AndroidBitmapFormat` constants from `<android/bitmap.h>`,
/// so the FFI layer converts with a plain match and no lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum PixelFormat {
    /// ANDROID_BITMAP_FORMAT_NONE
    #[default]
    None = 0,
    /// 32-bit RGBA (8 bits/channel). ANDROID_BITMAP_FORMAT_RGBA_8888
    Rgba8888 = 1,
    /// 16-bit RGB. ANDROID_BITMAP_FORMAT_RGB_565
    Rgb565 = 4,
    /// 16-bit RGBA (deprecated on the platform). ANDROID_BITMAP_FORMAT_RGBA_4444
    Rgba4444 = 7,
    /// 8-bit alpha only. ANDROID_BITMAP_FORMAT_A_8
    A8 = 8,
    /// 64-bit half-float RGBA. ANDROID_BITMAP_FORMAT_RGBA_F16
    RgbaF16 = 9,
    /// 32-bit packed 10:10:10:2. ANDROID_BITMAP_FORMAT_RGBA_1010102
    Rgba1010102 = 10,
    /// Code not known to this crate.
    Unknown = -1,
}

impl PixelFormat {
    /// Create from an `AndroidBitmapFormat` code.
    pub fn from_android_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Rgba8888,
            4 => Self::Rgb565,
            7 => Self::Rgba4444,
            8 => Self::A8,
            9 => Self::RgbaF16,
            10 => Self::Rgba1010102,
            _ => Self::Unknown,
        }
    }

    /// Bytes per pixel, 0 when the format has no defined layout.
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::Rgba8888 | Self::Rgba1010102 => 4,
            Self::Rgb565 | Self::Rgba4444 => 2,
            Self::A8 => 1,
            Self::RgbaF16 => 8,
            Self::None | Self::Unknown => 0,
        }
    }

    /// Whether `glReadPixels(GL_RGBA, GL_UNSIGNED_BYTE)` lands in this layout unchanged.
    pub const fn is_readback_compatible(&self) -> bool {
        matches!(self, Self::Rgba8888)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of a tightly packed RGBA_8888 image of this extent, or `None` if
    /// it does not fit in `usize`.
    pub fn rgba_byte_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Descriptor of a target surface, queried from the surface itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    /// Bytes per row in the backing memory.
    pub stride: u32,
    pub format: PixelFormat,
}

impl SurfaceInfo {
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}

/// A platform bitmap whose pixel memory can be locked for native writes.
///
/// Failure codes are the platform's own (`ANDROID_BITMAP_RESULT_*` on
/// Android) and are reported verbatim in diagnostics.
///
/// # Safety
///
/// A pointer returned from a successful [`lock_pixels`](Self::lock_pixels)
/// must be valid for writes of `stride * height` bytes (as reported by
/// [`info`](Self::info)) and must not move, be reclaimed or be accessed by
/// anyone else until the matching [`unlock_pixels`](Self::unlock_pixels).
pub unsafe trait LockableSurface {
    /// Query width, height, stride and format.
    fn info(&self) -> Result<SurfaceInfo, i32>;

    /// Acquire exclusive access to the backing memory.
    fn lock_pixels(&mut self) -> Result<NonNull<u8>, i32>;

    /// Release access acquired by [`lock_pixels`](Self::lock_pixels).
    fn unlock_pixels(&mut self);
}

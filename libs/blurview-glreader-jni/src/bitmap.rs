// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `android.graphics.Bitmap` as a [`LockableSurface`], via libjnigraphics.

use blurview_glreader::{PixelFormat, SurfaceInfo};

/// ANDROID_BITMAP_RESULT_SUCCESS
pub const ANDROID_BITMAP_RESULT_SUCCESS: i32 = 0;
/// ANDROID_BITMAP_RESULT_BAD_PARAMETER
pub const ANDROID_BITMAP_RESULT_BAD_PARAMETER: i32 = -1;
/// ANDROID_BITMAP_RESULT_JNI_EXCEPTION
pub const ANDROID_BITMAP_RESULT_JNI_EXCEPTION: i32 = -2;
/// ANDROID_BITMAP_RESULT_ALLOCATION_FAILED
pub const ANDROID_BITMAP_RESULT_ALLOCATION_FAILED: i32 = -3;

/// Mirror of `AndroidBitmapInfo` from `<android/bitmap.h>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidBitmapInfo {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: i32,
    pub flags: u32,
}

impl From<AndroidBitmapInfo> for SurfaceInfo {
    fn from(info: AndroidBitmapInfo) -> Self {
        SurfaceInfo {
            width: info.width,
            height: info.height,
            stride: info.stride,
            format: PixelFormat::from_android_code(info.format),
        }
    }
}

/// Human-readable name of an `ANDROID_BITMAP_RESULT_*` code.
pub fn result_name(code: i32) -> &'static str {
    match code {
        ANDROID_BITMAP_RESULT_SUCCESS => "success",
        ANDROID_BITMAP_RESULT_BAD_PARAMETER => "bad parameter",
        ANDROID_BITMAP_RESULT_JNI_EXCEPTION => "jni exception",
        ANDROID_BITMAP_RESULT_ALLOCATION_FAILED => "allocation failed",
        _ => "unknown",
    }
}

#[cfg(target_os = "android")]
pub use android::AndroidBitmap;

#[cfg(target_os = "android")]
mod android {
    use std::ffi::c_void;
    use std::ptr::NonNull;

    use blurview_glreader::{LockableSurface, SurfaceInfo};
    use jni::sys::{JNIEnv, jobject};
    use libc::c_int;

    use super::{ANDROID_BITMAP_RESULT_SUCCESS, AndroidBitmapInfo, result_name};

    #[link(name = "jnigraphics")]
    unsafe extern "C" {
        fn AndroidBitmap_getInfo(
            env: *mut JNIEnv,
            jbitmap: jobject,
            info: *mut AndroidBitmapInfo,
        ) -> c_int;

        fn AndroidBitmap_lockPixels(
            env: *mut JNIEnv,
            jbitmap: jobject,
            addr_ptr: *mut *mut c_void,
        ) -> c_int;

        fn AndroidBitmap_unlockPixels(env: *mut JNIEnv, jbitmap: jobject) -> c_int;
    }

    /// A Java `Bitmap` reachable through a JNI env, valid for one native call.
    pub struct AndroidBitmap {
        env: *mut JNIEnv,
        bitmap: jobject,
    }

    impl AndroidBitmap {
        /// # Safety
        ///
        /// `env` must be the JNI env of the calling thread and `bitmap` a
        /// local or global reference to an `android.graphics.Bitmap`, both
        /// valid for the lifetime of the returned value.
        pub unsafe fn new(env: *mut JNIEnv, bitmap: jobject) -> Self {
            Self { env, bitmap }
        }
    }

    // SAFETY: libjnigraphics guarantees the address from a successful
    // AndroidBitmap_lockPixels stays valid for `stride * height` bytes and is
    // not moved or reclaimed until AndroidBitmap_unlockPixels.
    unsafe impl LockableSurface for AndroidBitmap {
        fn info(&self) -> Result<SurfaceInfo, i32> {
            let mut info = AndroidBitmapInfo::default();
            // SAFETY: env/bitmap validity is the constructor's contract.
            let result = unsafe { AndroidBitmap_getInfo(self.env, self.bitmap, &mut info) };
            if result != ANDROID_BITMAP_RESULT_SUCCESS {
                return Err(result);
            }
            Ok(info.into())
        }

        fn lock_pixels(&mut self) -> Result<NonNull<u8>, i32> {
            let mut addr: *mut c_void = std::ptr::null_mut();
            // SAFETY: as above; `addr` receives one pointer.
            let result = unsafe { AndroidBitmap_lockPixels(self.env, self.bitmap, &mut addr) };
            if result != ANDROID_BITMAP_RESULT_SUCCESS {
                return Err(result);
            }
            NonNull::new(addr.cast::<u8>()).ok_or_else(|| {
                // Locked but unusable: release before reporting.
                // SAFETY: matches the successful lock above.
                unsafe { AndroidBitmap_unlockPixels(self.env, self.bitmap) };
                super::ANDROID_BITMAP_RESULT_BAD_PARAMETER
            })
        }

        fn unlock_pixels(&mut self) {
            // SAFETY: only called by PixelLock after a successful lock.
            let result = unsafe { AndroidBitmap_unlockPixels(self.env, self.bitmap) };
            if result != ANDROID_BITMAP_RESULT_SUCCESS {
                tracing::warn!(
                    "unlock pixels failed : {} ({})",
                    result,
                    result_name(result)
                );
            }
        }
    }
}

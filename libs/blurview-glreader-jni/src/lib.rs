// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! JNI cdylib behind `eightbitlab.com.blurview.gl.GlReader`.
//!
//! Java side:
//!
//! ```java
//! final class GlReader {
//!     static { System.loadLibrary("blurview_glreader_jni"); }
//!     // Returns 0 on success, see ReadbackStatus for the other codes.
//!     static native int readToBitmap(Bitmap bitmap);
//! }
//! ```
//!
//! Must be called on the thread whose EGL context has just rendered the frame
//! to capture, with an `ARGB_8888` bitmap the size of the bound target.

pub mod bitmap;
pub mod logcat;

use blurview_glreader::{ReadbackError, ReadbackStatus};

/// Log the platform's name for a bitmap failure code.
fn describe_failure(err: &ReadbackError) {
    if let ReadbackError::SurfaceInfoUnavailable { code }
    | ReadbackError::MemoryAcquisitionFailed { code } = err
    {
        tracing::debug!(
            target: blurview_glreader::LOG_TARGET,
            "bitmap result {} = {}",
            code,
            bitmap::result_name(*code)
        );
    }
}

/// `ReadbackStatus` code for a finished readback, logging the platform name
/// of any bitmap failure code.
pub fn status_code<T>(result: &blurview_glreader::Result<T>) -> i32 {
    if let Err(err) = result {
        describe_failure(err);
    }
    ReadbackStatus::from(result).as_code()
}

#[cfg(target_os = "android")]
mod export {
    use blurview_glreader::{EglLibrary, GlesContext, PixelReadback, ReadbackConfig, Result};
    use jni::JNIEnv;
    use jni::objects::{JClass, JObject};
    use jni::sys::jint;

    use crate::bitmap::AndroidBitmap;
    use crate::logcat;

    fn current_context() -> Result<GlesContext> {
        EglLibrary::shared()
            .and_then(GlesContext::from_current)
            .inspect_err(|err| {
                tracing::error!(target: blurview_glreader::LOG_TARGET, "{}", err);
            })
    }

    #[unsafe(no_mangle)]
    pub extern "system" fn Java_eightbitlab_com_blurview_gl_GlReader_readToBitmap<'local>(
        env: JNIEnv<'local>,
        _class: JClass<'local>,
        bitmap: JObject<'local>,
    ) -> jint {
        logcat::init();

        let ctx = match current_context() {
            Ok(ctx) => ctx,
            Err(err) => return crate::status_code::<()>(&Err(err)),
        };

        // SAFETY: `env` belongs to this thread and `bitmap` is a local
        // reference; both outlive this call, which is all `surface` lives for.
        let mut surface = unsafe { AndroidBitmap::new(env.get_raw(), bitmap.as_raw()) };

        let readback = PixelReadback::new(ReadbackConfig::from_env());
        let result = readback.read(&ctx, &mut surface);
        crate::status_code(&result)
    }
}

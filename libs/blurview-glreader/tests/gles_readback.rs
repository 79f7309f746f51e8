// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `GlesContext` against a real EGL pbuffer context.
//!
//! Each test brings up a small GLES 2 pbuffer on the default display and
//! returns early when the host has no libEGL, no display or no matching
//! config (headless CI without Mesa).

mod support;

use std::sync::Mutex;

use blurview_glreader::{
    EglLibrary, Extent, GlesContext, PixelReadback, ReadbackConfig, ReadbackError, RenderContext,
};
use khronos_egl as egl;
use support::MockBitmap;

/// One GL context current at a time across this binary.
static GL_THREAD: Mutex<()> = Mutex::new(());

/// A pbuffer surface and GLES 2 context, current on this thread until drop.
struct Pbuffer {
    egl: &'static EglLibrary,
    display: egl::Display,
    surface: egl::Surface,
    context: egl::Context,
}

impl Pbuffer {
    fn new(width: i32, height: i32) -> Option<Self> {
        let egl = match EglLibrary::shared() {
            Ok(egl) => egl,
            Err(err) => return skip(&err.to_string()),
        };
        let instance = egl.instance();

        // SAFETY: EGL_DEFAULT_DISPLAY needs no native handle.
        let Some(display) = (unsafe { instance.get_display(egl::DEFAULT_DISPLAY) }) else {
            return skip("no default EGL display");
        };
        if let Err(err) = instance.initialize(display) {
            return skip(&format!("eglInitialize failed: {}", err));
        }

        let config_attribs = [
            egl::SURFACE_TYPE,
            egl::PBUFFER_BIT,
            egl::RENDERABLE_TYPE,
            egl::OPENGL_ES2_BIT,
            egl::RED_SIZE,
            8,
            egl::GREEN_SIZE,
            8,
            egl::BLUE_SIZE,
            8,
            egl::ALPHA_SIZE,
            8,
            egl::NONE,
        ];
        let Ok(Some(config)) = instance.choose_first_config(display, &config_attribs) else {
            return skip("no RGBA8 GLES 2 pbuffer config");
        };
        if instance.bind_api(egl::OPENGL_ES_API).is_err() {
            return skip("GLES API unavailable");
        }

        let surface_attribs = [egl::WIDTH, width, egl::HEIGHT, height, egl::NONE];
        let Ok(surface) = instance.create_pbuffer_surface(display, config, &surface_attribs)
        else {
            return skip("pbuffer creation failed");
        };
        let context_attribs = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];
        let Ok(context) = instance.create_context(display, config, None, &context_attribs) else {
            let _ = instance.destroy_surface(display, surface);
            return skip("GLES 2 context creation failed");
        };

        let pbuffer = Self {
            egl,
            display,
            surface,
            context,
        };
        instance
            .make_current(display, Some(surface), Some(surface), Some(context))
            .ok()?;
        Some(pbuffer)
    }

    fn release_current(&self) {
        let _ = self
            .egl
            .instance()
            .make_current(self.display, None, None, None);
    }
}

impl Drop for Pbuffer {
    fn drop(&mut self) {
        self.release_current();
        let instance = self.egl.instance();
        let _ = instance.destroy_context(self.display, self.context);
        let _ = instance.destroy_surface(self.display, self.surface);
    }
}

fn skip<T>(reason: &str) -> Option<T> {
    tracing::warn!("skipping EGL test: {}", reason);
    None
}

fn clear(rgba: [f32; 4]) {
    // SAFETY: a context is current and `gl` was loaded by `from_current`.
    unsafe {
        gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]);
        gl::Clear(gl::COLOR_BUFFER_BIT);
    }
}

fn assert_solid(bitmap: &MockBitmap, expected: [u8; 4]) {
    for (i, pixel) in bitmap.pixels().chunks_exact(4).enumerate() {
        assert_eq!(pixel, expected, "pixel {}", i);
    }
}

#[test]
fn test_reads_cleared_pbuffer() {
    let _guard = GL_THREAD.lock().unwrap_or_else(|e| e.into_inner());
    let Some(pbuffer) = Pbuffer::new(4, 4) else {
        return;
    };

    let ctx = GlesContext::from_current(pbuffer.egl).unwrap();
    assert!(ctx.is_current());
    assert_eq!(ctx.target_extent(), Some(Extent::new(4, 4)));

    clear([1.0, 0.0, 1.0, 1.0]);

    let mut bitmap = MockBitmap::rgba(4, 4);
    let report = PixelReadback::default().read(&ctx, &mut bitmap).unwrap();

    assert_eq!(report.extent, Extent::new(4, 4));
    assert_eq!(report.bytes_copied, 64);
    assert_solid(&bitmap, [255, 0, 255, 255]);
    assert!(bitmap.guard().iter().all(|&b| b == support::GUARD_BYTE));
    assert_eq!((bitmap.lock_calls, bitmap.unlock_calls), (1, 1));
}

#[test]
fn test_pbuffer_size_mismatch_is_rejected() {
    let _guard = GL_THREAD.lock().unwrap_or_else(|e| e.into_inner());
    let Some(pbuffer) = Pbuffer::new(4, 4) else {
        return;
    };

    let ctx = GlesContext::from_current(pbuffer.egl).unwrap();
    let mut bitmap = MockBitmap::rgba(8, 8);

    let err = PixelReadback::default().read(&ctx, &mut bitmap).unwrap_err();

    assert!(matches!(
        err,
        ReadbackError::TargetSizeMismatch { target, surface }
            if target == Extent::new(4, 4) && surface == Extent::new(8, 8)
    ));
    assert_eq!(bitmap.lock_calls, 0);
    assert!(bitmap.is_untouched());
}

#[test]
fn test_bound_fbo_uses_declared_extent() {
    let _guard = GL_THREAD.lock().unwrap_or_else(|e| e.into_inner());
    let Some(pbuffer) = Pbuffer::new(4, 4) else {
        return;
    };

    let ctx = GlesContext::from_current(pbuffer.egl).unwrap();

    let (mut texture, mut fbo) = (0, 0);
    // SAFETY: plain GL object setup on the current context.
    let complete = unsafe {
        gl::GenTextures(1, &mut texture);
        gl::BindTexture(gl::TEXTURE_2D, texture);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            gl::RGBA as i32,
            2,
            2,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            std::ptr::null(),
        );
        gl::GenFramebuffers(1, &mut fbo);
        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture,
            0,
        );
        gl::CheckFramebufferStatus(gl::FRAMEBUFFER) == gl::FRAMEBUFFER_COMPLETE
    };
    if !complete {
        return;
    }
    clear([0.0, 1.0, 0.0, 1.0]);

    // GLES 2 cannot size an FBO attachment on its own.
    assert_eq!(ctx.target_extent(), None);
    let strict = PixelReadback::new(ReadbackConfig::default().with_strict_target_extent(true));
    let mut bitmap = MockBitmap::rgba(2, 2);
    let err = strict.read(&ctx, &mut bitmap).unwrap_err();
    assert!(matches!(err, ReadbackError::TargetExtentUnknown));
    assert_eq!(bitmap.lock_calls, 0);

    let ctx = ctx.with_framebuffer_extent(Extent::new(2, 2));
    assert_eq!(ctx.target_extent(), Some(Extent::new(2, 2)));
    strict.read(&ctx, &mut bitmap).unwrap();
    assert_solid(&bitmap, [0, 255, 0, 255]);

    // Back on the default framebuffer the pbuffer size applies again.
    // SAFETY: as above.
    unsafe {
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        gl::DeleteFramebuffers(1, &fbo);
        gl::DeleteTextures(1, &texture);
    }
    assert_eq!(ctx.target_extent(), Some(Extent::new(4, 4)));
}

#[test]
fn test_released_context_is_not_current() {
    let _guard = GL_THREAD.lock().unwrap_or_else(|e| e.into_inner());
    let Some(pbuffer) = Pbuffer::new(4, 4) else {
        return;
    };

    let ctx = GlesContext::from_current(pbuffer.egl).unwrap();
    pbuffer.release_current();

    assert!(!ctx.is_current());
    let mut bitmap = MockBitmap::rgba(4, 4);
    let err = PixelReadback::default().read(&ctx, &mut bitmap).unwrap_err();
    assert!(matches!(err, ReadbackError::ContextNotCurrent));
    assert_eq!(bitmap.lock_calls, 0);

    assert!(matches!(
        GlesContext::from_current(pbuffer.egl),
        Err(ReadbackError::ContextNotCurrent)
    ));
}

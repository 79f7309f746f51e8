// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! EGL/GLES implementation of [`RenderContext`].
//!
//! libEGL is loaded at runtime and the `gl` entry points are resolved through
//! `eglGetProcAddress`, so nothing links against EGL or GLES at build time.
//! [`GlesContext`] captures whichever EGL context is current on the calling
//! thread; it never creates, makes current or destroys one.
//!
//! libEGL is loaded once per process ([`EglLibrary::shared`]) and never
//! unloaded, so the `gl` pointers resolved through it stay valid on every
//! thread.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::sync::{Once, OnceLock};

use khronos_egl as egl;

use crate::context::RenderContext;
use crate::error::{ReadbackError, Result};
use crate::surface::Extent;

static EGL: OnceLock<EglLibrary> = OnceLock::new();
static GL_LOAD: Once = Once::new();

/// A runtime-loaded libEGL (EGL 1.4 entry points).
pub struct EglLibrary {
    instance: egl::DynamicInstance<egl::EGL1_4>,
}

impl EglLibrary {
    /// Load libEGL from the default search path.
    pub fn load() -> Result<Self> {
        // SAFETY: libEGL has no library constructors with preconditions; the
        // loaded symbols are only called through `khronos_egl`'s typed table.
        let instance = unsafe { egl::DynamicInstance::<egl::EGL1_4>::load_required() }
            .map_err(|e| ReadbackError::Egl(format!("failed to load libEGL: {}", e)))?;
        tracing::debug!("Loaded libEGL");
        Ok(Self { instance })
    }

    /// The process-wide libEGL, loaded on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn shared() -> Result<&'static EglLibrary> {
        if let Some(egl) = EGL.get() {
            return Ok(egl);
        }
        let loaded = Self::load()?;
        // A concurrent first call may win; its copy is kept and ours dropped.
        Ok(EGL.get_or_init(|| loaded))
    }

    pub fn instance(&self) -> &egl::DynamicInstance<egl::EGL1_4> {
        &self.instance
    }

    /// Resolve the process-wide `gl` function pointers, once.
    fn load_gl(&self) {
        GL_LOAD.call_once(|| {
            gl::load_with(|symbol| {
                self.instance
                    .get_proc_address(symbol)
                    .map_or(std::ptr::null(), |f| f as *const c_void)
            });
        });
    }
}

impl std::fmt::Debug for EglLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EglLibrary").finish_non_exhaustive()
    }
}

/// The EGL context current on the constructing thread, plus the GLES calls
/// readback needs.
///
/// Neither `Send` nor `Sync`: it stays on the GL thread it was created on.
pub struct GlesContext {
    egl: &'static EglLibrary,
    display: egl::Display,
    context: egl::Context,
    framebuffer_extent: Option<Extent>,
    _thread_bound: PhantomData<*const ()>,
}

impl GlesContext {
    /// Capture the EGL context current on this thread.
    ///
    /// Fails when no context is current or `glReadPixels` cannot be resolved.
    pub fn from_current(egl: &'static EglLibrary) -> Result<Self> {
        let context = egl
            .instance
            .get_current_context()
            .ok_or(ReadbackError::ContextNotCurrent)?;
        let display = egl
            .instance
            .get_current_display()
            .ok_or_else(|| ReadbackError::Egl("no current display".into()))?;

        egl.load_gl();
        if !gl::ReadPixels::is_loaded() {
            return Err(ReadbackError::Egl(
                "glReadPixels could not be resolved".into(),
            ));
        }

        Ok(Self {
            egl,
            display,
            context,
            framebuffer_extent: None,
            _thread_bound: PhantomData,
        })
    }

    /// Declare the size of the application framebuffer object that will be
    /// bound at readback time.
    ///
    /// GLES 2 cannot query the size of an FBO's color attachment, so without
    /// this [`target_extent`](RenderContext::target_extent) only knows the
    /// default framebuffer (the EGL draw surface).
    pub fn with_framebuffer_extent(mut self, extent: Extent) -> Self {
        self.framebuffer_extent = Some(extent);
        self
    }

    /// Pop the oldest GL error flag, `GL_NO_ERROR` (0) if none is set.
    ///
    /// Readback itself never checks it: `glGetError` forces a pipeline sync.
    pub fn last_error(&self) -> u32 {
        // SAFETY: plain GL call; the context is current (checked by callers).
        unsafe { gl::GetError() }
    }

    fn bound_framebuffer(&self) -> i32 {
        let mut binding = 0;
        // SAFETY: writes one GLint.
        unsafe { gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut binding) };
        binding
    }

    fn draw_surface_extent(&self) -> Option<Extent> {
        let instance = &self.egl.instance;
        let surface = instance.get_current_surface(egl::DRAW)?;
        let width = instance.query_surface(self.display, surface, egl::WIDTH).ok()?;
        let height = instance.query_surface(self.display, surface, egl::HEIGHT).ok()?;
        Some(Extent::new(
            u32::try_from(width).ok()?,
            u32::try_from(height).ok()?,
        ))
    }
}

impl RenderContext for GlesContext {
    fn is_current(&self) -> bool {
        self.egl
            .instance
            .get_current_context()
            .is_some_and(|current| current.as_ptr() == self.context.as_ptr())
    }

    fn target_extent(&self) -> Option<Extent> {
        if self.bound_framebuffer() == 0 {
            self.draw_surface_extent()
        } else {
            self.framebuffer_extent
        }
    }

    fn read_pixels(&self, extent: Extent, dst: &mut [u8]) {
        assert_eq!(
            Some(dst.len()),
            extent.rgba_byte_len(),
            "readback buffer does not match {}",
            extent
        );
        // SAFETY: `dst` holds exactly width * height * 4 bytes, which is what
        // GL_RGBA/GL_UNSIGNED_BYTE writes with the default pack alignment of
        // 4 (a width * 4 row is always 4-byte aligned). Dimensions were
        // checked to fit GLsizei before the bitmap was locked.
        unsafe {
            gl::ReadPixels(
                0,
                0,
                extent.width as gl::types::GLsizei,
                extent.height as gl::types::GLsizei,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                dst.as_mut_ptr().cast(),
            );
        }
    }
}

impl std::fmt::Debug for GlesContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlesContext")
            .field("context", &self.context.as_ptr())
            .field("framebuffer_extent", &self.framebuffer_extent)
            .finish()
    }
}

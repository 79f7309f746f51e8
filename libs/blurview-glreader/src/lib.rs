// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Framebuffer readback for BlurView.
//!
//! Copies the currently bound GL render target into a caller-owned
//! `RGBA_8888` bitmap:
//!
//! 1. query the bitmap descriptor
//! 2. validate it against the render target
//! 3. lock the pixel memory
//! 4. one `glReadPixels` over `(0,0)`–`(width,height)`
//! 5. log the elapsed time, unlock
//!
//! The bitmap and the GL context are explicit trait seams
//! ([`LockableSurface`], [`RenderContext`]) rather than ambient globals, so
//! every exit path of [`read_to_surface`] can be exercised with mocks.
//!
//! ```ignore
//! let ctx = GlesContext::from_current(EglLibrary::shared()?)?;
//! let report = PixelReadback::default().read(&ctx, &mut bitmap)?;
//! tracing::debug!("copied {} bytes", report.bytes_copied);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod gles;
pub mod lock;
pub mod logging;
pub mod readback;
pub mod size_scaler;
pub mod surface;

pub use config::{ReadbackConfig, TimingLevel};
pub use context::RenderContext;
pub use error::{ReadbackError, ReadbackStatus, Result};
pub use gles::{EglLibrary, GlesContext};
pub use lock::PixelLock;
pub use readback::{LOG_TARGET, PixelReadback, ReadbackReport, read_to_surface};
pub use size_scaler::{ScaledSize, SizeScaler};
pub use surface::{Extent, LockableSurface, PixelFormat, SurfaceInfo};

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Mock bitmap, mock render target and log capture shared by the
//! integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use blurview_glreader::{Extent, LockableSurface, PixelFormat, RenderContext, SurfaceInfo};

/// Bytes appended after the bitmap memory to detect overruns.
pub const GUARD_LEN: usize = 32;
pub const GUARD_BYTE: u8 = 0xEE;
pub const INITIAL_BYTE: u8 = 0x11;

/// Bitmap with counted lock/unlock calls and injectable failures.
pub struct MockBitmap {
    pub info: SurfaceInfo,
    /// `stride * height` bytes of pixel memory followed by `GUARD_LEN` guard bytes.
    pub memory: Vec<u8>,
    pub info_error: Option<i32>,
    pub lock_error: Option<i32>,
    pub info_calls: Cell<usize>,
    pub lock_calls: usize,
    pub unlock_calls: usize,
}

impl MockBitmap {
    pub fn rgba(width: u32, height: u32) -> Self {
        Self::new(SurfaceInfo {
            width,
            height,
            stride: width * 4,
            format: PixelFormat::Rgba8888,
        })
    }

    pub fn new(info: SurfaceInfo) -> Self {
        let pixel_len = (info.stride * info.height) as usize;
        let mut memory = vec![INITIAL_BYTE; pixel_len + GUARD_LEN];
        memory[pixel_len..].fill(GUARD_BYTE);
        Self {
            info,
            memory,
            info_error: None,
            lock_error: None,
            info_calls: Cell::new(0),
            lock_calls: 0,
            unlock_calls: 0,
        }
    }

    pub fn failing_info(mut self, code: i32) -> Self {
        self.info_error = Some(code);
        self
    }

    pub fn failing_lock(mut self, code: i32) -> Self {
        self.lock_error = Some(code);
        self
    }

    pub fn pixel_len(&self) -> usize {
        self.memory.len() - GUARD_LEN
    }

    pub fn pixels(&self) -> &[u8] {
        &self.memory[..self.pixel_len()]
    }

    pub fn guard(&self) -> &[u8] {
        &self.memory[self.pixel_len()..]
    }

    pub fn is_untouched(&self) -> bool {
        self.pixels().iter().all(|&b| b == INITIAL_BYTE)
            && self.guard().iter().all(|&b| b == GUARD_BYTE)
    }
}

unsafe impl LockableSurface for MockBitmap {
    fn info(&self) -> Result<SurfaceInfo, i32> {
        self.info_calls.set(self.info_calls.get() + 1);
        match self.info_error {
            Some(code) => Err(code),
            None => Ok(self.info),
        }
    }

    fn lock_pixels(&mut self) -> Result<NonNull<u8>, i32> {
        self.lock_calls += 1;
        if let Some(code) = self.lock_error {
            return Err(code);
        }
        assert_eq!(
            self.lock_calls - self.unlock_calls,
            1,
            "bitmap locked twice without unlock"
        );
        NonNull::new(self.memory.as_mut_ptr()).ok_or(-1)
    }

    fn unlock_pixels(&mut self) {
        self.unlock_calls += 1;
        assert!(
            self.unlock_calls <= self.lock_calls,
            "unlock without a matching lock"
        );
    }
}

/// Render target backed by an in-memory RGBA color buffer.
pub struct MockTarget {
    pub extent: Option<Extent>,
    pub color: Vec<u8>,
    pub current: bool,
    pub panic_on_read: bool,
    pub reads: Cell<usize>,
}

impl MockTarget {
    /// Target whose color buffer holds `0, 1, 2, ...` (wrapping).
    pub fn gradient(width: u32, height: u32) -> Self {
        let len = (width * height * 4) as usize;
        Self {
            extent: Some(Extent::new(width, height)),
            color: (0..len).map(|i| (i % 251) as u8).collect(),
            current: true,
            panic_on_read: false,
            reads: Cell::new(0),
        }
    }
}

impl RenderContext for MockTarget {
    fn is_current(&self) -> bool {
        self.current
    }

    fn target_extent(&self) -> Option<Extent> {
        self.extent
    }

    fn read_pixels(&self, extent: Extent, dst: &mut [u8]) {
        self.reads.set(self.reads.get() + 1);
        if self.panic_on_read {
            panic!("driver fault");
        }
        let len = extent.rgba_byte_len().unwrap();
        assert_eq!(dst.len(), len);
        dst.copy_from_slice(&self.color[..len]);
    }
}

/// Shared buffer receiving fmt subscriber output.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with a thread-local subscriber that records every event.
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

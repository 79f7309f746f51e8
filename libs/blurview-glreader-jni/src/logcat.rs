// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! `tracing` → logcat.
//!
//! An app process has no reader on stderr, so the fmt subscriber writes
//! through [`LogcatWriter`], which emits one `__android_log_write` per event
//! at the priority matching the event's level. Off-device the same lines go
//! to stderr.

use std::ffi::CString;
use std::io;
use std::sync::Once;

use libc::c_int;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Logcat tag for everything this library logs.
pub const LOG_TAG: &str = "GlReader";

/// `android_LogPriority` values from `<android/log.h>`.
pub const ANDROID_LOG_VERBOSE: c_int = 2;
pub const ANDROID_LOG_DEBUG: c_int = 3;
pub const ANDROID_LOG_INFO: c_int = 4;
pub const ANDROID_LOG_WARN: c_int = 5;
pub const ANDROID_LOG_ERROR: c_int = 6;

static INIT: Once = Once::new();

/// Install the logcat subscriber, once per process.
pub fn init() {
    INIT.call_once(|| {
        blurview_glreader::logging::init_logging_with_writer(LogcatWriter::new(LOG_TAG));
    });
}

pub fn priority_for(level: &Level) -> c_int {
    match *level {
        Level::TRACE => ANDROID_LOG_VERBOSE,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        Level::INFO => ANDROID_LOG_INFO,
        Level::WARN => ANDROID_LOG_WARN,
        Level::ERROR => ANDROID_LOG_ERROR,
    }
}

/// [`MakeWriter`] producing one [`LogcatLine`] per event.
#[derive(Debug)]
pub struct LogcatWriter {
    tag: CString,
}

impl LogcatWriter {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: to_c_string(tag.as_bytes()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogcatWriter {
    type Writer = LogcatLine<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogcatLine::new(&self.tag, ANDROID_LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LogcatLine::new(&self.tag, priority_for(meta.level()))
    }
}

/// Buffers one formatted event and hands it to logcat on drop.
pub struct LogcatLine<'a> {
    tag: &'a CString,
    priority: c_int,
    buf: Vec<u8>,
}

impl<'a> LogcatLine<'a> {
    fn new(tag: &'a CString, priority: c_int) -> Self {
        Self {
            tag,
            priority,
            buf: Vec::with_capacity(128),
        }
    }

    pub fn priority(&self) -> c_int {
        self.priority
    }

    /// The buffered text as logcat will receive it: no trailing newline,
    /// interior NULs replaced.
    pub fn message(&self) -> CString {
        let trimmed = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
        to_c_string(trimmed)
    }
}

impl io::Write for LogcatLine<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogcatLine<'_> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        emit(self.priority, self.tag, &self.message());
    }
}

fn to_c_string(bytes: &[u8]) -> CString {
    let cleaned: Vec<u8> = bytes.iter().map(|&b| if b == 0 { b'?' } else { b }).collect();
    // No NUL bytes remain.
    CString::new(cleaned).unwrap_or_default()
}

#[cfg(target_os = "android")]
fn emit(priority: c_int, tag: &CString, text: &CString) {
    use libc::c_char;

    #[link(name = "log")]
    unsafe extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    // SAFETY: both pointers are NUL-terminated and outlive the call.
    unsafe {
        __android_log_write(priority, tag.as_ptr(), text.as_ptr());
    }
}

#[cfg(not(target_os = "android"))]
fn emit(priority: c_int, tag: &CString, text: &CString) {
    use std::io::Write as _;

    let _ = writeln!(
        io::stderr(),
        "{}/{}: {}",
        priority,
        tag.to_string_lossy(),
        text.to_string_lossy()
    );
}

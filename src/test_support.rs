use std::{
    io,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use regex::Regex;

/// A writer whose clones all write into the same buffer.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }
}

/// A writer that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrokenWriter;

impl io::Write for BrokenWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("broken"))
    }
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \(\d+ms\)").unwrap());

/// Replace printed durations with ` (Nms)`.
pub fn sanitize_durations(input: &str) -> String {
    DURATION_RE.replace_all(input, " (Nms)").into_owned()
}

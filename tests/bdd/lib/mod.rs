use std::{
    io,
    sync::{Arc, LazyLock, Mutex},
};

use kispec::formatter::Output;
use regex::Regex;

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    Poison,
    FromUtf8(std::string::FromUtf8Error),
}

#[derive(Debug, Default, Clone)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("poison error"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    pub fn try_to_string(&self) -> Result<String, Error> {
        let guard = self.0.lock().map_err(|_| Error::Poison)?;
        String::from_utf8(guard.to_vec()).map_err(Error::FromUtf8)
    }

    /// A plain output writing into this buffer.
    pub fn output(&self) -> Output<'static> {
        Output::new(self.clone())
    }
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \(\d+ms\)").unwrap());
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.rs:\d+").unwrap());

/// Replace durations and line numbers, they change with every edit and run.
pub fn sanitize(input: &str) -> String {
    let input = DURATION_RE.replace_all(input, " (Nms)");
    LINE_RE.replace_all(&input, ".rs:L").into_owned()
}

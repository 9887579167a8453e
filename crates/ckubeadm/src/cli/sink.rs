//! Output sinks handed to command factories
//!
//! A [`Sink`] is a cheap, cloneable handle to a writer. Factories capture
//! clones of the sinks they are given, so the same stdout/stderr handles
//! flow through the whole tree. [`Sink::capture`] returns a sink backed by
//! an in-memory buffer for tests.

use std::{
    fmt::Display,
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard},
};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
pub struct Sink {
    inner: SharedWriter,
}

impl Sink {
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    /// A sink writing into a buffer readable through the returned [`Capture`].
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::from_writer(capture.clone()), capture)
    }

    /// Write one line.
    pub fn line(&self, line: impl Display) -> io::Result<()> {
        let mut writer = self.lock()?;
        writeln!(writer, "{line}")
    }

    /// Write text as-is.
    pub fn text(&self, text: &str) -> io::Result<()> {
        self.lock()?.write_all(text.as_bytes())
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// In-memory buffer behind [`Sink::capture`].
#[derive(Clone, Default)]
pub struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

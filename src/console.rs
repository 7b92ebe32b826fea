//! User-visible transcript of an exchange.
//!
//! Everything the operator reads goes through [`Console`]; diagnostics go to
//! `tracing` on stderr instead.

use std::io::{self, Write};
use std::path::Path;

use crate::error::ClientError;

pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn connecting(&mut self, url: &str) -> io::Result<()> {
        writeln!(self.out, "Connecting to {url}...")
    }

    pub fn greeting(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "Connection response: {text}")
    }

    pub fn sending(&mut self, path: &Path, size: usize) -> io::Result<()> {
        writeln!(self.out, "Sending WAV file: {}", path.display())?;
        writeln!(self.out, "File size: {size} bytes")
    }

    pub fn received(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "Received: {text}")
    }

    pub fn connection_closed(&mut self) -> io::Result<()> {
        writeln!(self.out, "Connection closed")
    }

    /// Free-form text such as `--help` output; written as-is.
    pub fn text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    pub fn error(&mut self, error: &ClientError) -> io::Result<()> {
        match error {
            ClientError::Usage(usage) => self.text(usage),
            ClientError::ConnectRefused { .. } => {
                writeln!(self.out, "{error}")?;
                self.out.flush()
            }
            _ => {
                writeln!(self.out, "Error: {error}")?;
                self.out.flush()
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

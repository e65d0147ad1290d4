//! Sensor line source boundary.
//!
//! The physical transport (serial port, pipe, replay file) lives outside
//! the pipeline; anything that can hand over UTF-8 lines works. An
//! exhausted or momentarily silent source means "no reading this cycle",
//! not an error.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A lazy, per-line source of raw sensor text.
pub trait LineSource {
    /// Read the next line, without the trailing newline.
    ///
    /// `Ok(None)` means the source produced nothing this cycle; I/O
    /// errors are returned to the caller to retry.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Line source over any buffered reader (file, serial device node, stdin).
pub struct ReaderLineSource<R: BufRead> {
    reader: R,
}

impl ReaderLineSource<BufReader<File>> {
    /// Open a path as a line source.
    ///
    /// Failure here is the caller's to treat as fatal; it is the one
    /// startup error the pipeline does not absorb.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl<R: BufRead> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

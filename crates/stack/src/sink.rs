//! Diagnostic log sinks
//!
//! The container never assumes a particular sink implementation: dumps are
//! rendered to text and handed to whatever `LogSink` the caller injected. A
//! failing sink degrades diagnostics, it never corrupts or aborts the
//! logical operation that triggered the write.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only, fallible line sink for diagnostic output
pub trait LogSink: Send {
    /// Appends one line of text (no trailing newline expected)
    fn append(&mut self, line: &str) -> io::Result<()>;
}

/// Sink writing to standard output
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(line.as_bytes())?;
        handle.write_all(b"\n")
    }
}

/// Sink appending to a log file
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Opens `path` for appending, creating it if missing
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// Path this sink appends to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")
    }
}

/// In-memory sink collecting lines, for tests and programmatic inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_lines() {
        let mut sink = MemorySink::new();
        sink.append("first").unwrap();
        sink.append("second").unwrap();
        assert_eq!(sink.lines(), ["first", "second"]);
    }

    #[test]
    fn file_sink_appends_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.log");

        {
            let mut sink = FileSink::open(&path).unwrap();
            sink.append("one").unwrap();
        }
        {
            let mut sink = FileSink::open(&path).unwrap();
            sink.append("two").unwrap();
            assert_eq!(sink.path(), path);
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }
}

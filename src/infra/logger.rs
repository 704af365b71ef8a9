// ============================================================
// Layer 6 - Dual-Sink Logger
// ============================================================
// Writes run output to the terminal and to a log file at once.
//
// States:
//   unopened - terminal only; writing to the file sink fails
//   opened   - `open()` bound a file (truncate or append)
//
// Messages containing '\r' (progress-bar redraws) are treated
// as terminal-only whatever the caller asks for. Every write
// flushes the sinks it touched.
//
// Diagnostics from the library itself go through `tracing`;
// this logger is for the run transcript a caller wants on disk.

use std::{
    fs::{File, OpenOptions},
    io::{self, Stdout, Write},
    path::Path,
    str::FromStr,
};

use crate::error::{Result, UtilError};

/// How `Logger::open` treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create or truncate ("w")
    #[default]
    Write,
    /// Create or append ("a")
    Append,
}

impl FromStr for OpenMode {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "w" | "write"  => Ok(OpenMode::Write),
            "a" | "append" => Ok(OpenMode::Append),
            other => Err(UtilError::configuration(format!(
                "unknown log file mode '{other}', expected 'w' or 'a'"
            ))),
        }
    }
}

pub struct Logger<W: Write = Stdout> {
    terminal: W,
    file:     Option<File>,
}

impl Logger<Stdout> {
    /// Logger whose terminal sink is stdout.
    pub fn new() -> Self {
        Self::with_terminal(io::stdout())
    }
}

impl Default for Logger<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Logger<W> {
    pub fn with_terminal(terminal: W) -> Self {
        Self { terminal, file: None }
    }

    /// Bind the file sink. Re-opening replaces the previous file.
    pub fn open(&mut self, path: impl AsRef<Path>, mode: OpenMode) -> Result<()> {
        let path = path.as_ref();
        let file = match mode {
            OpenMode::Write  => File::create(path)?,
            OpenMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        self.file = Some(file);
        tracing::debug!("Logging to '{}' ({:?})", path.display(), mode);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Write `message` to the selected sinks.
    ///
    /// A message with a carriage return never reaches the file. With
    /// `to_file` set and no file open, the terminal part is written and
    /// then `UtilError::LogFileNotOpen` is returned.
    pub fn write(&mut self, message: &str, to_terminal: bool, to_file: bool) -> Result<()> {
        self.write_bytes(message.as_bytes(), to_terminal, to_file)
    }

    fn write_bytes(&mut self, bytes: &[u8], to_terminal: bool, to_file: bool) -> Result<()> {
        let to_file = to_file && !bytes.contains(&b'\r');

        if to_terminal {
            self.terminal.write_all(bytes)?;
            self.terminal.flush()?;
        }

        if to_file {
            let file = self.file.as_mut().ok_or(UtilError::LogFileNotOpen)?;
            file.write_all(bytes)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Write to both sinks.
    pub fn log(&mut self, message: &str) -> Result<()> {
        self.write(message, true, true)
    }

    /// Does nothing; writes are already flushed.
    pub fn flush(&mut self) {}

    pub fn terminal(&self) -> &W {
        &self.terminal
    }
}

/// Stream adapter: raw bytes go to both sinks (file only when open).
/// The carriage-return rule applies per `write` call.
impl<W: Write> Write for Logger<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let to_file = self.is_open();
        self.write_bytes(buf, true, to_file).map_err(|e| match e {
            UtilError::Io(io) => io,
            other => io::Error::other(other.to_string()),
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn logger_with_file(dir: &tempfile::TempDir) -> (Logger<Vec<u8>>, std::path::PathBuf) {
        let path = dir.path().join("train.log");
        let mut logger = Logger::with_terminal(Vec::new());
        logger.open(&path, OpenMode::Write).unwrap();
        (logger, path)
    }

    #[test]
    fn test_writes_to_both_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let (mut logger, path) = logger_with_file(&dir);
        logger.write("epoch 1 loss 0.5\n", true, true).unwrap();

        assert_eq!(logger.terminal().as_slice(), b"epoch 1 loss 0.5\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "epoch 1 loss 0.5\n");
    }

    #[test]
    fn test_carriage_return_stays_off_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut logger, path) = logger_with_file(&dir);
        logger.write("\r[=====>    ] 50%", true, true).unwrap();
        logger.write("done\n", true, true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "done\n");
        assert_eq!(logger.terminal().as_slice(), b"\r[=====>    ] 50%done\n");
    }

    #[test]
    fn test_sink_flags() {
        let dir = tempfile::tempdir().unwrap();
        let (mut logger, path) = logger_with_file(&dir);
        logger.write("file only\n", false, true).unwrap();
        logger.write("terminal only\n", true, false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "file only\n");
        assert_eq!(logger.terminal().as_slice(), b"terminal only\n");
    }

    #[test]
    fn test_file_write_while_unopened_fails() {
        let mut logger = Logger::with_terminal(Vec::new());
        let err = logger.write("hello\n", true, true).unwrap_err();
        assert!(matches!(err, UtilError::LogFileNotOpen));
        // terminal sink was written before the failure
        assert_eq!(logger.terminal().as_slice(), b"hello\n");
        // terminal-only writes are fine
        logger.write("again\n", true, false).unwrap();
    }

    #[test]
    fn test_append_mode_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        fs::write(&path, "first run\n").unwrap();

        let mut logger = Logger::with_terminal(io::sink());
        logger.open(&path, OpenMode::Append).unwrap();
        logger.log("second run\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first run\nsecond run\n");

        logger.open(&path, OpenMode::Write).unwrap();
        logger.log("fresh\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_open_mode_parsing() {
        assert_eq!("w".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert_eq!("a".parse::<OpenMode>().unwrap(), OpenMode::Append);
        assert!(matches!("x".parse::<OpenMode>(), Err(UtilError::Configuration(_))));
    }

    #[test]
    fn test_writeln_through_stream_adapter() {
        let mut logger = Logger::with_terminal(Vec::new());
        writeln!(logger, "step {}", 3).unwrap();
        Write::flush(&mut logger).unwrap();
        logger.flush();
        assert_eq!(logger.terminal().as_slice(), b"step 3\n");
    }

    #[test]
    fn test_multibyte_char_split_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut logger, path) = logger_with_file(&dir);
        let bytes = "é\n".as_bytes();
        Write::write_all(&mut logger, &bytes[..1]).unwrap();
        Write::write_all(&mut logger, &bytes[1..]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "é\n");
        assert_eq!(logger.terminal().as_slice(), "é\n".as_bytes());
    }
}

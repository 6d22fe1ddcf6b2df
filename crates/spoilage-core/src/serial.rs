//! Serial line ingestion.
//!
//! The sensor board prints one newline-terminated line per observation. This
//! module opens the port and turns the byte stream into trimmed, non-blank
//! text lines. There is no framing or checksum beyond the newline.
//!
//! Reads are bounded by the port timeout. A timeout is not an error: the
//! partial line read so far is kept and the loop checks its cancellation
//! token before trying again, so a stop request is noticed within one
//! timeout period.
//!
//! # Example
//!
//! ```no_run
//! use spoilage_core::serial::{LineReader, SerialSettings, open_port, read_lines};
//! use tokio_util::sync::CancellationToken;
//!
//! let settings = SerialSettings::new("/dev/ttyUSB0");
//! let port = open_port(&settings)?;
//! let mut reader = LineReader::new(port);
//! let cancel = CancellationToken::new();
//! read_lines(&mut reader, &cancel, |line| {
//!     println!("{line}");
//!     true
//! })?;
//! # Ok::<(), spoilage_core::Error>(())
//! ```

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::time::Duration;

use serialport::SerialPort;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Baud rate the firmware configures with `Serial.begin`.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Upper bound on a single blocking read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Connection parameters for the sensor board.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl SerialSettings {
    /// Settings for `port` with the default baud rate and timeout.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Open the serial port.
///
/// The returned handle closes the port when dropped.
pub fn open_port(settings: &SerialSettings) -> Result<Box<dyn SerialPort>> {
    info!(
        "Connecting to {} at {} baud",
        settings.port, settings.baud_rate
    );
    serialport::new(&settings.port, settings.baud_rate)
        .timeout(settings.timeout)
        .open()
        .map_err(|e| Error::SerialOpen {
            port: settings.port.clone(),
            source: e,
        })
}

/// Outcome of a single [`LineReader::poll_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    /// A complete, trimmed, non-blank line.
    Line(String),
    /// The read timed out before a full line arrived.
    Idle,
    /// The stream is closed.
    Eof,
}

/// Why [`read_lines`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The cancellation token fired.
    Cancelled,
    /// The stream ended.
    EndOfStream,
    /// The line consumer asked to stop.
    ConsumerClosed,
}

/// Splits a byte stream into text lines, tolerating read timeouts.
pub struct LineReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    /// Wrap a byte source.
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Read until a non-blank line is available, the read times out, or the
    /// stream ends.
    pub fn poll_line(&mut self) -> Result<ReadEvent> {
        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(0) => {
                    // A final line without a trailing newline still counts.
                    if let Some(line) = self.take_pending() {
                        return Ok(ReadEvent::Line(line));
                    }
                    return Ok(ReadEvent::Eof);
                }
                Ok(_) => {
                    if self.pending.last() != Some(&b'\n') {
                        continue;
                    }
                    if let Some(line) = self.take_pending() {
                        return Ok(ReadEvent::Line(line));
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(ReadEvent::Idle);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    /// Recover the byte source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn take_pending(&mut self) -> Option<String> {
        let line = decode_line(&self.pending);
        self.pending.clear();
        (!line.is_empty()).then_some(line)
    }
}

/// Decode bytes as UTF-8, dropping invalid sequences, and trim whitespace.
pub fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Feed every line to `emit` until cancelled, the stream ends, or `emit`
/// returns `false`.
pub fn read_lines<R, F>(reader: &mut LineReader<R>, cancel: &CancellationToken, mut emit: F) -> Result<LoopExit>
where
    R: Read,
    F: FnMut(String) -> bool,
{
    loop {
        if cancel.is_cancelled() {
            return Ok(LoopExit::Cancelled);
        }

        match reader.poll_line()? {
            ReadEvent::Line(line) => {
                debug!("Received line: {}", line);
                if !emit(line) {
                    return Ok(LoopExit::ConsumerClosed);
                }
            }
            ReadEvent::Idle => {}
            ReadEvent::Eof => return Ok(LoopExit::EndOfStream),
        }
    }
}

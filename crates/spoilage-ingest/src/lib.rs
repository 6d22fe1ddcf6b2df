//! Serial ingestion for medicine storage sensor boards.
//!
//! Reads newline-delimited text from the board, prints every line and,
//! optionally, forwards lines that parse as readings to the web service.
//!
//! The serial port is read on a blocking thread; lines cross to the async side
//! through a bounded channel and are handed to each [`LineSink`] in turn.
//!
//! # Configuration
//!
//! The ingest binary reads `~/.config/spoilage/ingest.toml`:
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//! timeout_ms = 2000
//! reset_delay_ms = 2000
//!
//! [forward]
//! url = "http://127.0.0.1:5000"
//! ```

pub mod config;
pub mod error;
pub mod forward;
pub mod sink;

use std::io::Read;

use spoilage_core::serial::{LineReader, LoopExit, read_lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use config::{ConfigError, ForwardConfig, IngestConfig, SerialConfig};
pub use error::{Error, Result};
pub use forward::ForwardClient;
pub use sink::{ConsoleSink, ForwardSink, LineSink};

/// Lines buffered between the serial thread and the sinks.
pub const CHANNEL_CAPACITY: usize = 64;

/// Result of a completed ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Why the read loop stopped.
    pub exit: LoopExit,
    /// Number of lines delivered to the sinks.
    pub lines: u64,
}

/// Deliver every line from `rx` to all sinks until the channel closes.
pub async fn consume(mut rx: mpsc::Receiver<String>, sinks: &[Box<dyn LineSink>]) -> u64 {
    let mut lines = 0;
    while let Some(line) = rx.recv().await {
        for sink in sinks {
            sink.accept(&line).await;
        }
        lines += 1;
    }
    lines
}

/// Read lines from `source` and hand them to `sinks` until the stream ends or
/// `cancel` fires.
///
/// `source` is moved onto a blocking thread and dropped there once the read
/// loop stops, so a serial port is closed before this function returns.
pub async fn ingest<R>(
    source: R,
    cancel: CancellationToken,
    sinks: Vec<Box<dyn LineSink>>,
) -> Result<IngestSummary>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let reader_cancel = cancel.clone();
    let reader = tokio::task::spawn_blocking(move || {
        let mut reader = LineReader::new(source);
        read_lines(&mut reader, &reader_cancel, |line| tx.blocking_send(line).is_ok())
    });

    let lines = consume(rx, &sinks).await;
    let exit = reader.await??;
    debug!("Read loop stopped ({:?}) after {} lines", exit, lines);

    Ok(IngestSummary { exit, lines })
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default, Clone)]
    struct Recorder {
        lines: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LineSink for Recorder {
        async fn accept(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    /// Never yields data; every read times out.
    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
        }
    }

    #[tokio::test]
    async fn test_ingest_delivers_lines_to_every_sink() {
        let first = Recorder::default();
        let second = Recorder::default();
        let source = Cursor::new(b"21.5,40,310,420\r\n\r\n  \nT=22 H=41 L=300 G=430".to_vec());

        let summary = ingest(
            source,
            CancellationToken::new(),
            vec![Box::new(first.clone()), Box::new(second.clone())],
        )
        .await
        .unwrap();

        assert_eq!(summary.exit, LoopExit::EndOfStream);
        assert_eq!(summary.lines, 2);
        let expected = vec!["21.5,40,310,420", "T=22 H=41 L=300 G=430"];
        assert_eq!(*first.lines.lock().unwrap(), expected);
        assert_eq!(*second.lines.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_ingest_drops_invalid_utf8() {
        let recorder = Recorder::default();
        let source = Cursor::new(b"temp=2\xff1\n".to_vec());

        ingest(source, CancellationToken::new(), vec![Box::new(recorder.clone())])
            .await
            .unwrap();

        assert_eq!(*recorder.lines.lock().unwrap(), vec!["temp=21"]);
    }

    #[tokio::test]
    async fn test_ingest_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let summary = ingest(Silent, cancel, Vec::new()).await.unwrap();
        assert_eq!(summary.exit, LoopExit::Cancelled);
        assert_eq!(summary.lines, 0);
    }

    #[tokio::test]
    async fn test_ingest_reports_read_errors() {
        let result = ingest(Broken, CancellationToken::new(), Vec::new()).await;
        assert!(matches!(result, Err(Error::Serial(_))));
    }
}

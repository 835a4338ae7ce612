//! Stream-based data source.
//!
//! Receives snapshots from an async byte stream such as a TCP connection
//! to a capture decoder.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use replset_types::ReplSetStatusDoc;

use super::SnapshotSource;
use crate::decode::Validator;

/// A data source that receives snapshots from an async stream.
///
/// This source spawns a background task that reads newline-delimited JSON
/// from the provided async reader, decodes and validates each line, and
/// makes snapshots available via `poll()` or `next()`. Lines that fail are
/// recorded as the last error and skipped.
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use replset_doctor::{StreamSource, Validator};
///
/// # tokio_test::block_on(async {
/// let data = b"{\"date\":\"2024-01-01T00:00:00Z\",\"members\":[]}\n";
/// let stream = Cursor::new(data.to_vec());
/// let mut source = StreamSource::spawn(stream, "example", Validator::default());
/// let snapshot = source.next().await.unwrap();
/// assert!(snapshot.is_empty());
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<ReplSetStatusDoc>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str, validator: Validator) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            let mut line_no = 0usize;

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!(source = %desc, lines = line_no, "Stream closed");
                        break;
                    }
                    Ok(_) => {
                        line_no += 1;
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match validator.decode_str(trimmed) {
                            Ok(snapshot) => {
                                *error_handle.lock() = None;
                                if tx.send(snapshot).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(source = %desc, line = line_no, error = %e, "Skipping snapshot");
                                *error_handle.lock() = Some(e.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        warn!(source = %desc, error = %e, "Stream read failed");
                        *error_handle.lock() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the stream has
    /// ended and every snapshot has been received.
    pub async fn next(&mut self) -> Option<ReplSetStatusDoc> {
        self.receiver.recv().await
    }
}

impl SnapshotSource for StreamSource {
    fn poll(&mut self) -> Option<ReplSetStatusDoc> {
        match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => None,
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

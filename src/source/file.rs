//! File-based data source.
//!
//! Reads snapshots from a JSON file holding a single snapshot, a JSON
//! array of snapshots, or newline-delimited JSON.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use replset_types::ReplSetStatusDoc;

use super::SnapshotSource;
use crate::decode::{decode_value, Validator};
use crate::error::{DecodeError, Result};

/// A data source that reads snapshots from a file.
///
/// The source tracks the file's modification time. When the file changes
/// it is read again and only snapshots past the ones already consumed are
/// queued, so append-only capture files can be followed. Snapshots sharing
/// a date pass through; a snapshot dated before its predecessor is skipped
/// and reported as [`DecodeError::OutOfOrder`].
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    validator: Validator,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    last_date: Option<DateTime<Utc>>,
    consumed: usize,
    pending: VecDeque<ReplSetStatusDoc>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            validator: Validator::default(),
            last_error: None,
            last_modified: None,
            last_date: None,
            consumed: 0,
            pending: VecDeque::new(),
        }
    }

    /// Validate snapshots with the given rules instead of the defaults.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode every snapshot in the file without validating.
    pub fn read_all(&self) -> Result<Vec<ReplSetStatusDoc>> {
        let content = fs::read_to_string(&self.path)?;
        parse_content(&content)
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Queue snapshots that follow the ones consumed by earlier reloads.
    fn reload(&mut self) -> bool {
        let docs = match self.read_all() {
            Ok(docs) => docs,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return false;
            }
        };
        self.last_error = None;

        if docs.len() < self.consumed {
            warn!(path = %self.path.display(), "File shrank, reading from the start");
            self.consumed = 0;
            self.last_date = None;
        }

        let mut queued = 0;
        for doc in docs.into_iter().skip(self.consumed) {
            self.consumed += 1;
            if let Some(previous) = self.last_date.filter(|last| doc.date < *last) {
                let e = DecodeError::OutOfOrder {
                    previous,
                    current: doc.date,
                };
                warn!(path = %self.path.display(), error = %e, "Skipping out-of-order snapshot");
                self.last_error = Some(e.to_string());
                continue;
            }
            if let Err(e) = self.validator.validate(&doc) {
                warn!(path = %self.path.display(), date = %doc.date, error = %e, "Skipping invalid snapshot");
                self.last_error = Some(e.to_string());
                continue;
            }
            self.last_date = Some(doc.date);
            self.pending.push_back(doc);
            queued += 1;
        }
        debug!(path = %self.path.display(), queued, "Loaded snapshots");
        true
    }
}

impl SnapshotSource for FileSource {
    fn poll(&mut self) -> Option<ReplSetStatusDoc> {
        if self.pending.is_empty() {
            let current_modified = self.get_modified_time();

            let file_changed = match (&self.last_modified, &current_modified) {
                (None, _) => true,        // First poll, always read
                (Some(_), None) => false, // File disappeared, keep what we had
                (Some(last), Some(current)) => current > last,
            };

            if file_changed && self.reload() {
                self.last_modified = current_modified;
            }
        }

        self.pending.pop_front()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

fn parse_content(content: &str) -> Result<Vec<ReplSetStatusDoc>> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => items.into_iter().map(decode_value).collect(),
        Ok(value) => Ok(vec![decode_value(value)?]),
        // Not one JSON document: try one snapshot per line
        Err(whole) => {
            let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
            if lines.len() < 2 {
                return Err(whole.into());
            }
            lines
                .into_iter()
                .map(|line| {
                    let value: Value = serde_json::from_str(line)?;
                    decode_value(value)
                })
                .collect()
        }
    }
}

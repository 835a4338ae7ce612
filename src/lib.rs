//! # replset-doctor
//!
//! Decoding, validation and health reporting for replica-set status
//! snapshots.
//!
//! The snapshot model itself lives in `replset-types`; this crate plays the
//! roles around it. It reads snapshots from files or live streams, rejects
//! malformed ones with a classified [`DecodeError`], assembles them into an
//! ordered [`Timeline`], and computes replication lag and health.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  source  │───▶│  decode  │───▶│ data::status │───▶│  report  │
//! │ (input)  │    │(validate)│    │ (lag+health) │    │  (CLI)   │
//! └──────────┘    └────┬─────┘    └──────────────┘    └──────────┘
//!                      │
//!                      ▼
//!               ┌──────────────┐
//!               │data::timeline│ elections, lag series
//!               └──────────────┘
//! ```
//!
//! - **[`source`]**: [`SnapshotSource`] trait with [`FileSource`] and [`StreamSource`]
//! - **[`decode`]**: shape normalization and [`Validator`]
//! - **[`data`]**: [`StatusData`] health computation and [`Timeline`] history
//! - **[`config`]**: [`Settings`] loaded from file and environment
//! - **[`report`]**: text and JSON rendering of results
//!
//! ## Usage
//!
//! ```
//! use replset_doctor::{decode_str, StatusData, Thresholds};
//!
//! let doc = decode_str(r#"{
//!     "date": "2024-01-01T00:00:00Z",
//!     "members": [
//!         {"name": "node1:27017", "optime": {"ts": {"T": 1704067200, "I": 1}, "t": 1}, "state": 1},
//!         {"name": "node2:27017", "optime": {"ts": {"T": 1704067195, "I": 1}, "t": 1}, "state": 2}
//!     ]
//! }"#).unwrap();
//!
//! let status = StatusData::from_doc(&doc, &Thresholds::default());
//! assert_eq!(status.primary(), Some("node1:27017"));
//! assert_eq!(status.max_lag().unwrap().as_secs(), 5);
//! ```

pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod report;
pub mod source;

pub use config::Settings;
pub use data::{Election, HealthStatus, MemberData, StatusData, Thresholds, Timeline};
pub use decode::{decode_str, decode_value, Validator};
pub use error::DecodeError;
pub use source::{FileSource, SnapshotSource, StreamSource};

pub use replset_types::{MemberDoc, OpTimestamp, Optime, ReplSetStatusDoc, ReplState};

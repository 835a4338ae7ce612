//! # replset-types
//!
//! Core types for replica-set status snapshots. A decoder samples the
//! cluster's diagnostic stream once per interval and produces one
//! [`ReplSetStatusDoc`] per sample; time-series assemblers, chart renderers
//! and alerting consume the same shape.
//!
//! ## Design Goals
//!
//! - **Plain values**: snapshots are immutable records with public fields and no validation
//! - **Stable wire format**: keys are `date`, `members`, `name`, `optime`, `state`
//! - **Opaque optimes**: the `optime` payload survives round-trips whatever its upstream shape
//! - **Ergonomic builders**: fluent API for constructing snapshots in tests and tools
//!
//! ## Example
//!
//! ```rust
//! use replset_types::{OpTimestamp, Optime, ReplSetStatusDoc, PRIMARY, SECONDARY};
//!
//! let ts = OpTimestamp::new(1704067200, 1);
//! let status = ReplSetStatusDoc::builder()
//!     .date_rfc3339("2024-01-01T00:00:00Z")
//!     .member("node1:27017", |m| m.optime(Optime::with_term(ts, 3)).state(PRIMARY))
//!     .member("node2:27017", |m| m.optime(Optime::with_term(ts, 3)).state(SECONDARY))
//!     .build();
//!
//! assert_eq!(status.members.len(), 2);
//! assert_eq!(status.primary().map(|m| m.name.as_str()), Some("node1:27017"));
//!
//! let json = serde_json::to_string(&status).unwrap();
//! let parsed: ReplSetStatusDoc = serde_json::from_str(&json).unwrap();
//! assert_eq!(status, parsed);
//! ```

mod member;
mod optime;
mod state;
mod status;

pub use member::*;
pub use optime::*;
pub use state::*;
pub use status::*;

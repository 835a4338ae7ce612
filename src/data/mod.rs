//! Data models and processing for replica-set snapshots.
//!
//! This module turns decoded snapshots into health-annotated data and
//! tracks them over time.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "10s", "1.5m")
//! - [`status`]: Per-snapshot health ([`StatusData`], [`MemberData`], [`HealthStatus`])
//! - [`timeline`]: Ordered snapshot history, election detection and lag series
//!
//! ## Data Flow
//!
//! ```text
//! ReplSetStatusDoc (decoded)
//!        │
//!        ├──▶ StatusData::from_doc() (lag + health from Thresholds)
//!        │
//!        └──▶ Timeline::push() (ordering check, elections, lag trends)
//! ```

pub mod duration;
pub mod status;
pub mod timeline;

pub use status::{HealthStatus, MemberData, StatusData, Thresholds};
pub use timeline::{Election, Timeline};

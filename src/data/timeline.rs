//! Snapshot history for election detection and lag trends.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use replset_types::ReplSetStatusDoc;

use crate::error::{DecodeError, Result};

/// Default number of snapshots to keep (one hour at one sample per second).
pub const DEFAULT_CAPACITY: usize = 3600;

/// A change of primary observed between snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Election {
    /// Date of the first snapshot showing the new primary.
    pub date: DateTime<Utc>,
    /// Previous primary; `None` when no primary had been seen yet.
    pub from: Option<String>,
    pub to: String,
}

/// Ordered, bounded sequence of snapshots from one source.
///
/// Dates must never go backwards; equal dates are accepted. Once full,
/// the oldest snapshot is dropped for each new one.
#[derive(Debug, Clone)]
pub struct Timeline {
    snapshots: VecDeque<ReplSetStatusDoc>,
    capacity: usize,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Create a timeline holding up to [`DEFAULT_CAPACITY`] snapshots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a timeline holding up to `capacity` snapshots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot, rejecting one dated before the latest.
    pub fn push(&mut self, doc: ReplSetStatusDoc) -> Result<()> {
        if let Some(last) = self.snapshots.back() {
            if doc.date < last.date {
                warn!(previous = %last.date, current = %doc.date, "Rejecting out-of-order snapshot");
                return Err(DecodeError::OutOfOrder {
                    previous: last.date,
                    current: doc.date,
                });
            }
        }

        debug!(date = %doc.date, members = doc.len(), "Recorded snapshot");
        self.snapshots.push_back(doc);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&ReplSetStatusDoc> {
        self.snapshots.back()
    }

    /// Snapshots oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ReplSetStatusDoc> {
        self.snapshots.iter()
    }

    /// Time between the oldest and newest retained snapshot.
    pub fn span(&self) -> Option<TimeDelta> {
        let first = self.snapshots.front()?;
        let last = self.snapshots.back()?;
        Some(last.date - first.date)
    }

    /// Every change of primary across the retained snapshots.
    ///
    /// Snapshots without a unique primary (mid-election) do not end the
    /// previous primary's tenure. The primary of the oldest snapshot is the
    /// baseline and is not reported.
    pub fn elections(&self) -> Vec<Election> {
        let mut elections = Vec::new();
        let mut current: Option<&str> = None;

        for (i, doc) in self.snapshots.iter().enumerate() {
            let Some(primary) = doc.primary() else {
                continue;
            };
            let name = primary.name.as_str();
            if i > 0 && current != Some(name) {
                elections.push(Election {
                    date: doc.date,
                    from: current.map(str::to_string),
                    to: name.to_string(),
                });
            }
            current = Some(name);
        }

        elections
    }

    /// Replication lag of one member over time.
    ///
    /// Snapshots where the lag cannot be computed (no unique primary,
    /// member missing, unreadable optime) are skipped.
    pub fn lag_series(&self, member: &str) -> Vec<(DateTime<Utc>, Duration)> {
        self.snapshots
            .iter()
            .filter_map(|doc| {
                let primary = doc.primary()?.optime.timestamp()?;
                let own = doc.member(member)?.optime.timestamp()?;
                Some((doc.date, Duration::from_secs(own.secs_behind(primary))))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use replset_types::{OpTimestamp, PRIMARY, SECONDARY};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    /// Snapshot at `secs` where `primary` leads with optime `secs` and every
    /// other listed member trails by `lag` seconds.
    fn sample(secs: i64, primary: Option<&str>, others: &[&str], lag: u32) -> ReplSetStatusDoc {
        let now = 1_704_067_200 + secs as u32;
        let mut builder = ReplSetStatusDoc::builder().date(at(secs));
        if let Some(p) = primary {
            builder = builder.member(p, |m| m.optime(OpTimestamp::new(now, 1)).state(PRIMARY));
        }
        for name in others {
            builder = builder
                .member(*name, |m| m.optime(OpTimestamp::new(now - lag, 1)).state(SECONDARY));
        }
        builder.build()
    }

    #[test]
    fn rejects_date_regressions() {
        let mut timeline = Timeline::new();
        timeline.push(sample(10, Some("a:1"), &[], 0)).unwrap();
        timeline.push(sample(10, Some("a:1"), &[], 0)).unwrap();

        let err = timeline.push(sample(5, Some("a:1"), &[], 0)).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfOrder { .. }));
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut timeline = Timeline::with_capacity(3);
        for secs in 0..5 {
            timeline.push(sample(secs, Some("a:1"), &[], 0)).unwrap();
        }
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.iter().next().unwrap().date, at(2));
        assert_eq!(timeline.latest().unwrap().date, at(4));
        assert_eq!(timeline.span(), Some(TimeDelta::seconds(2)));
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut timeline = Timeline::with_capacity(0);
        timeline.push(sample(0, None, &[], 0)).unwrap();
        timeline.push(sample(1, None, &[], 0)).unwrap();
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn detects_failover_through_election_window() {
        let mut timeline = Timeline::new();
        timeline.push(sample(0, Some("a:1"), &["b:1"], 0)).unwrap();
        // Election in progress: nobody is primary
        timeline.push(sample(1, None, &["a:1", "b:1"], 0)).unwrap();
        timeline.push(sample(2, Some("b:1"), &["a:1"], 0)).unwrap();
        timeline.push(sample(3, Some("b:1"), &["a:1"], 0)).unwrap();

        let elections = timeline.elections();
        assert_eq!(
            elections,
            [Election {
                date: at(2),
                from: Some("a:1".to_string()),
                to: "b:1".to_string(),
            }]
        );
    }

    #[test]
    fn first_primary_after_outage_is_an_election() {
        let mut timeline = Timeline::new();
        timeline.push(sample(0, None, &["a:1"], 0)).unwrap();
        timeline.push(sample(1, Some("a:1"), &[], 0)).unwrap();

        let elections = timeline.elections();
        assert_eq!(elections.len(), 1);
        assert_eq!(elections[0].from, None);
        assert_eq!(elections[0].to, "a:1");
    }

    #[test]
    fn stable_primary_has_no_elections() {
        let mut timeline = Timeline::new();
        for secs in 0..10 {
            timeline.push(sample(secs, Some("a:1"), &["b:1"], 1)).unwrap();
        }
        assert!(timeline.elections().is_empty());
        assert!(Timeline::new().elections().is_empty());
    }

    #[test]
    fn lag_series_skips_unknown_samples() {
        let mut timeline = Timeline::new();
        timeline.push(sample(0, Some("a:1"), &["b:1"], 2)).unwrap();
        timeline.push(sample(1, None, &["b:1"], 2)).unwrap();
        timeline.push(sample(2, Some("a:1"), &["b:1"], 7)).unwrap();
        timeline.push(sample(3, Some("a:1"), &[], 0)).unwrap();

        let series = timeline.lag_series("b:1");
        assert_eq!(
            series,
            [(at(0), Duration::from_secs(2)), (at(2), Duration::from_secs(7))]
        );
        assert!(timeline.lag_series("nope:1").is_empty());
    }
}

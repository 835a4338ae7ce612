//! Replica-set health computation.
//!
//! This module turns a raw [`ReplSetStatusDoc`] into per-member data with
//! replication lag and a health status computed from configurable
//! thresholds.

use std::time::Duration;

use chrono::{DateTime, Utc};

use replset_types::{OpTimestamp, ReplSetStatusDoc, ReplState};

/// Thresholds for health status computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Replication lag that triggers a warning.
    pub lag_warning: Duration,
    /// Replication lag that triggers critical status.
    pub lag_critical: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            lag_warning: Duration::from_secs(10),
            lag_critical: Duration::from_secs(60),
        }
    }
}

/// Health status for a member or the whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Parsed member data with computed lag and health.
#[derive(Debug, Clone)]
pub struct MemberData {
    pub name: String,
    pub state: i32,
    /// Server name of the state, or `STATE(<code>)` when unrecognized.
    pub state_label: String,
    pub optime: Option<OpTimestamp>,
    /// Time this member trails the primary. `None` without a single primary
    /// or without a readable optime.
    pub lag: Option<Duration>,
    pub health: HealthStatus,
}

/// Complete parsed replica-set status ready for display.
#[derive(Debug, Clone)]
pub struct StatusData {
    pub date: DateTime<Utc>,
    /// Members sorted worst health first, then by name.
    pub members: Vec<MemberData>,
    /// Names of members claiming the primary state, in received order.
    pub primaries: Vec<String>,
    pub health: HealthStatus,
}

impl StatusData {
    /// Convert a snapshot into processed status data.
    pub fn from_doc(doc: &ReplSetStatusDoc, thresholds: &Thresholds) -> Self {
        let primaries: Vec<String> = doc.primaries().map(|m| m.name.clone()).collect();
        let primary_optime = doc.primary().and_then(|p| p.optime.timestamp());

        let mut members: Vec<MemberData> = doc
            .members
            .iter()
            .map(|m| {
                let optime = m.optime.timestamp();
                let lag = match (primary_optime, optime) {
                    (Some(p), Some(o)) => Some(Duration::from_secs(o.secs_behind(p))),
                    _ => None,
                };
                let state = m.repl_state();
                MemberData {
                    name: m.name.clone(),
                    state: m.state,
                    state_label: state
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_else(|| format!("STATE({})", m.state)),
                    optime,
                    lag,
                    health: Self::compute_member_status(state, lag, thresholds),
                }
            })
            .collect();

        members.sort_by(|a, b| b.health.cmp(&a.health).then_with(|| a.name.cmp(&b.name)));

        let election_status = match primaries.len() {
            0 => HealthStatus::Critical,
            1 => HealthStatus::Healthy,
            _ => HealthStatus::Warning,
        };

        // Set health is the worst of its members and its primary count
        let health = members
            .iter()
            .map(|m| m.health)
            .chain(std::iter::once(election_status))
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            date: doc.date,
            members,
            primaries,
            health,
        }
    }

    fn compute_member_status(
        state: Option<ReplState>,
        lag: Option<Duration>,
        thresholds: &Thresholds,
    ) -> HealthStatus {
        let state_status = match state {
            None
            | Some(ReplState::Down)
            | Some(ReplState::Unknown)
            | Some(ReplState::Removed)
            | Some(ReplState::Fatal)
            | Some(ReplState::Rollback) => HealthStatus::Critical,
            Some(ReplState::Recovering) | Some(ReplState::Startup) | Some(ReplState::Startup2) => {
                HealthStatus::Warning
            }
            Some(ReplState::Primary) | Some(ReplState::Secondary) | Some(ReplState::Arbiter) => {
                HealthStatus::Healthy
            }
        };

        let lag_status = lag.map_or(HealthStatus::Healthy, |d| {
            if d >= thresholds.lag_critical {
                HealthStatus::Critical
            } else if d >= thresholds.lag_warning {
                HealthStatus::Warning
            } else {
                HealthStatus::Healthy
            }
        });

        state_status.max(lag_status)
    }

    /// The unique primary, if there is one.
    pub fn primary(&self) -> Option<&str> {
        match self.primaries.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// Largest lag of any member.
    pub fn max_lag(&self) -> Option<Duration> {
        self.members.iter().filter_map(|m| m.lag).max()
    }

    /// Members that are not healthy, worst first.
    pub fn unhealthy_members(&self) -> impl Iterator<Item = &MemberData> {
        self.members.iter().filter(|m| m.health != HealthStatus::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replset_types::{Optime, PRIMARY, SECONDARY};

    fn optime(secs: u32) -> Optime {
        Optime::with_term(OpTimestamp::new(secs, 1), 2)
    }

    fn doc(members: &[(&str, u32, i32)]) -> ReplSetStatusDoc {
        let mut builder = ReplSetStatusDoc::builder().date_rfc3339("2024-01-01T00:00:00Z");
        for &(name, secs, state) in members {
            builder = builder.member(name, |m| m.optime(optime(secs)).state(state));
        }
        builder.build()
    }

    #[test]
    fn healthy_set() {
        let data = StatusData::from_doc(
            &doc(&[("a:1", 1000, PRIMARY), ("b:1", 998, SECONDARY)]),
            &Thresholds::default(),
        );

        assert_eq!(data.health, HealthStatus::Healthy);
        assert_eq!(data.primary(), Some("a:1"));
        assert_eq!(data.max_lag(), Some(Duration::from_secs(2)));
        assert_eq!(data.unhealthy_members().count(), 0);
    }

    #[test]
    fn lag_thresholds() {
        let data = StatusData::from_doc(
            &doc(&[
                ("a:1", 1000, PRIMARY),
                ("b:1", 990, SECONDARY),
                ("c:1", 940, SECONDARY),
                ("d:1", 991, SECONDARY),
            ]),
            &Thresholds::default(),
        );

        let by_name = |n: &str| data.members.iter().find(|m| m.name == n).unwrap();
        assert_eq!(by_name("b:1").health, HealthStatus::Warning); // equal is warning
        assert_eq!(by_name("c:1").health, HealthStatus::Critical);
        assert_eq!(by_name("d:1").health, HealthStatus::Healthy);
        assert_eq!(data.health, HealthStatus::Critical);

        // Critical first, then warning, then healthy by name
        let order: Vec<&str> = data.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(order, ["c:1", "b:1", "a:1", "d:1"]);
    }

    #[test]
    fn secondary_ahead_of_primary_has_zero_lag() {
        let data = StatusData::from_doc(
            &doc(&[("a:1", 1000, PRIMARY), ("b:1", 1005, SECONDARY)]),
            &Thresholds::default(),
        );
        let b = data.members.iter().find(|m| m.name == "b:1").unwrap();
        assert_eq!(b.lag, Some(Duration::ZERO));
    }

    #[test]
    fn no_primary_is_critical_without_lag() {
        let data = StatusData::from_doc(
            &doc(&[("a:1", 1000, SECONDARY), ("b:1", 900, SECONDARY)]),
            &Thresholds::default(),
        );
        assert_eq!(data.health, HealthStatus::Critical);
        assert!(data.primary().is_none());
        assert!(data.members.iter().all(|m| m.lag.is_none()));
    }

    #[test]
    fn two_primaries_is_warning() {
        let data = StatusData::from_doc(
            &doc(&[("a:1", 1000, PRIMARY), ("b:1", 1000, PRIMARY)]),
            &Thresholds::default(),
        );
        assert_eq!(data.health, HealthStatus::Warning);
        assert_eq!(data.primaries, ["a:1", "b:1"]);
        assert!(data.primary().is_none());
    }

    #[test]
    fn state_driven_health() {
        let data = StatusData::from_doc(
            &doc(&[
                ("a:1", 1000, PRIMARY),
                ("down:1", 1000, ReplState::Down.code()),
                ("rec:1", 1000, ReplState::Recovering.code()),
                ("odd:1", 1000, 77),
            ]),
            &Thresholds::default(),
        );

        let by_name = |n: &str| data.members.iter().find(|m| m.name == n).unwrap();
        assert_eq!(by_name("down:1").health, HealthStatus::Critical);
        assert_eq!(by_name("rec:1").health, HealthStatus::Warning);
        assert_eq!(by_name("odd:1").health, HealthStatus::Critical);
        assert_eq!(by_name("odd:1").state_label, "STATE(77)");
        assert_eq!(by_name("a:1").state_label, "PRIMARY");
    }

    #[test]
    fn empty_snapshot() {
        let data = StatusData::from_doc(&doc(&[]), &Thresholds::default());
        assert!(data.members.is_empty());
        assert_eq!(data.health, HealthStatus::Critical);
        assert_eq!(data.max_lag(), None);
    }

    #[test]
    fn symbols() {
        assert_eq!(HealthStatus::Healthy.symbol(), "OK");
        assert_eq!(HealthStatus::Warning.symbol(), "WARN");
        assert_eq!(HealthStatus::Critical.symbol(), "CRIT");
        assert!(HealthStatus::Critical > HealthStatus::Warning);
    }
}

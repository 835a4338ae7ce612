//! Snapshot - a point-in-time view of replica-set status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MemberDoc, MemberDocBuilder};

/// One timestamped observation of a whole replica set.
///
/// Decoders emit one of these per sampling interval. Member order is kept
/// as received but carries no meaning; members are identified by name.
/// Duplicate names and zero or several primaries are all representable
/// (the latter is normal while an election is running).
///
/// # Example
///
/// ```rust
/// use replset_types::{ReplSetStatusDoc, PRIMARY};
///
/// let status = ReplSetStatusDoc::builder()
///     .date_rfc3339("2024-01-01T00:00:00Z")
///     .member("node1:27017", |m| m.state(PRIMARY))
///     .build();
///
/// let json = serde_json::to_string(&status).unwrap();
/// assert!(json.contains(r#""members":[{"name":"node1:27017""#));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplSetStatusDoc {
    /// Wall-clock time the snapshot was captured.
    pub date: DateTime<Utc>,

    /// Members as received from the source.
    #[serde(default)]
    pub members: Vec<MemberDoc>,
}

impl ReplSetStatusDoc {
    /// Create a snapshot from its parts.
    pub fn new(date: DateTime<Utc>, members: Vec<MemberDoc>) -> Self {
        Self { date, members }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> ReplSetStatusDocBuilder {
        ReplSetStatusDocBuilder::new()
    }

    /// Check if the snapshot has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members in the snapshot.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Iterate over members in received order.
    pub fn iter(&self) -> impl Iterator<Item = &MemberDoc> {
        self.members.iter()
    }

    /// First member with the given name.
    pub fn member(&self, name: &str) -> Option<&MemberDoc> {
        self.members.iter().find(|m| m.name == name)
    }

    /// All members reporting the primary state.
    pub fn primaries(&self) -> impl Iterator<Item = &MemberDoc> {
        self.members.iter().filter(|m| m.is_primary())
    }

    /// The primary, if exactly one member claims the role.
    pub fn primary(&self) -> Option<&MemberDoc> {
        let mut primaries = self.primaries();
        let first = primaries.next()?;
        match primaries.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Names that appear more than once, each reported once, in order of
    /// second appearance.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut dups: Vec<&str> = Vec::new();
        for (i, m) in self.members.iter().enumerate() {
            let seen_before = self.members[..i].iter().any(|p| p.name == m.name);
            if seen_before && !dups.contains(&m.name.as_str()) {
                dups.push(&m.name);
            }
        }
        dups
    }
}

impl<'a> IntoIterator for &'a ReplSetStatusDoc {
    type Item = &'a MemberDoc;
    type IntoIter = core::slice::Iter<'a, MemberDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Builder for constructing `ReplSetStatusDoc` instances.
#[derive(Debug, Default)]
pub struct ReplSetStatusDocBuilder {
    date: Option<DateTime<Utc>>,
    members: Vec<MemberDoc>,
}

impl ReplSetStatusDocBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture time.
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the capture time from an RFC 3339 string.
    ///
    /// An unparsable string leaves the date unset, so [`build`](Self::build)
    /// falls back to the current time. Debug builds panic instead.
    pub fn date_rfc3339(mut self, date: &str) -> Self {
        let parsed = DateTime::parse_from_rfc3339(date);
        debug_assert!(parsed.is_ok(), "invalid RFC 3339 date: {date:?}");
        self.date = parsed.ok().map(|d| d.with_timezone(&Utc));
        self
    }

    /// Add a member configured with a closure.
    pub fn member<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(MemberDocBuilder) -> MemberDocBuilder,
    {
        self.members.push(f(MemberDocBuilder::new(name)).build());
        self
    }

    /// Add a pre-built member.
    pub fn member_doc(mut self, member: MemberDoc) -> Self {
        self.members.push(member);
        self
    }

    /// Build the snapshot.
    ///
    /// Without a date, including one rejected by
    /// [`date_rfc3339`](Self::date_rfc3339) in release builds, the current
    /// time is used.
    pub fn build(self) -> ReplSetStatusDoc {
        ReplSetStatusDoc {
            date: self.date.unwrap_or_else(Utc::now),
            members: self.members,
        }
    }
}

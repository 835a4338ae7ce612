//! Replication-state codes.

use core::fmt;
use core::ops::RangeInclusive;

/// Integer code of the primary state.
pub const PRIMARY: i32 = 1;

/// Integer code of the secondary state.
pub const SECONDARY: i32 = 2;

/// Role or health of a replica-set member, as reported in `state`.
///
/// Snapshots keep the raw integer so codes from newer servers survive a
/// round-trip; use [`ReplState::from_code`] to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum ReplState {
    /// Not yet an active member; parsing configuration.
    Startup = 0,
    /// The only member that accepts writes.
    Primary = 1,
    /// Replicating from the primary.
    Secondary = 2,
    /// Performing startup self-checks or recovering from rollback/resync.
    Recovering = 3,
    /// Unrecoverable error (only reported by legacy servers).
    Fatal = 4,
    /// Joined the set and running initial sync.
    Startup2 = 5,
    /// State not yet known from the viewpoint of the reporting member.
    Unknown = 6,
    /// Votes in elections, holds no data.
    Arbiter = 7,
    /// Unreachable from the reporting member.
    Down = 8,
    /// Actively rolling back.
    Rollback = 9,
    /// Was once in the set but has been removed from the configuration.
    Removed = 10,
}

impl ReplState {
    /// Every state, in code order.
    pub const ALL: [ReplState; 11] = [
        ReplState::Startup,
        ReplState::Primary,
        ReplState::Secondary,
        ReplState::Recovering,
        ReplState::Fatal,
        ReplState::Startup2,
        ReplState::Unknown,
        ReplState::Arbiter,
        ReplState::Down,
        ReplState::Rollback,
        ReplState::Removed,
    ];

    /// The documented range of codes.
    pub const CODE_RANGE: RangeInclusive<i32> = 0..=10;

    /// Look up a state by its integer code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ReplState::Startup),
            1 => Some(ReplState::Primary),
            2 => Some(ReplState::Secondary),
            3 => Some(ReplState::Recovering),
            4 => Some(ReplState::Fatal),
            5 => Some(ReplState::Startup2),
            6 => Some(ReplState::Unknown),
            7 => Some(ReplState::Arbiter),
            8 => Some(ReplState::Down),
            9 => Some(ReplState::Rollback),
            10 => Some(ReplState::Removed),
            _ => None,
        }
    }

    /// The integer code of this state.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Check whether `code` falls in the documented range.
    pub fn is_documented_code(code: i32) -> bool {
        Self::CODE_RANGE.contains(&code)
    }

    /// The server's name for this state (e.g. `"PRIMARY"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            ReplState::Startup => "STARTUP",
            ReplState::Primary => "PRIMARY",
            ReplState::Secondary => "SECONDARY",
            ReplState::Recovering => "RECOVERING",
            ReplState::Fatal => "FATAL",
            ReplState::Startup2 => "STARTUP2",
            ReplState::Unknown => "UNKNOWN",
            ReplState::Arbiter => "ARBITER",
            ReplState::Down => "DOWN",
            ReplState::Rollback => "ROLLBACK",
            ReplState::Removed => "REMOVED",
        }
    }

    /// Whether a member in this state holds a copy of the data and so
    /// reports an optime, whether or not it is serving reads.
    pub const fn is_data_bearing(self) -> bool {
        matches!(
            self,
            ReplState::Primary
                | ReplState::Secondary
                | ReplState::Recovering
                | ReplState::Startup2
                | ReplState::Rollback
        )
    }
}

impl fmt::Display for ReplState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for ReplState {
    type Error = i32;

    /// Fails with the unrecognized code.
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

impl From<ReplState> for i32 {
    fn from(state: ReplState) -> Self {
        state.code()
    }
}

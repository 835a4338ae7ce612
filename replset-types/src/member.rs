//! Per-member state within a snapshot.

use serde::{Deserialize, Serialize};

use crate::{Optime, ReplState, PRIMARY, SECONDARY};

/// Observed state of one replica-set member at the time of a snapshot.
///
/// No validation happens here: empty names, unknown state codes and
/// unreadable optimes are all representable. Checking them is the job of
/// whatever decoded the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDoc {
    /// Member address, usually `host:port`.
    pub name: String,

    /// Replication progress of this member, in whatever shape the server sent.
    #[serde(default)]
    pub optime: Optime,

    /// Replication-state code. See [`ReplState`].
    pub state: i32,
}

impl MemberDoc {
    /// Create a member record.
    pub fn new(name: impl Into<String>, optime: Optime, state: i32) -> Self {
        Self {
            name: name.into(),
            optime,
            state,
        }
    }

    /// Create a builder for a member record.
    pub fn builder(name: impl Into<String>) -> MemberDocBuilder {
        MemberDocBuilder::new(name)
    }

    /// Interpret the state code, `None` if it is not a known state.
    pub fn repl_state(&self) -> Option<ReplState> {
        ReplState::from_code(self.state)
    }

    pub fn is_primary(&self) -> bool {
        self.state == PRIMARY
    }

    pub fn is_secondary(&self) -> bool {
        self.state == SECONDARY
    }
}

/// Builder for `MemberDoc`.
#[derive(Debug)]
pub struct MemberDocBuilder {
    name: String,
    optime: Optime,
    state: i32,
}

impl MemberDocBuilder {
    /// Create a new builder. The state defaults to `UNKNOWN`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optime: Optime::null(),
            state: ReplState::Unknown.code(),
        }
    }

    /// Set the optime.
    pub fn optime(mut self, optime: impl Into<Optime>) -> Self {
        self.optime = optime.into();
        self
    }

    /// Set the raw state code.
    pub fn state(mut self, code: i32) -> Self {
        self.state = code;
        self
    }

    /// Set the state from the enumeration.
    pub fn repl_state(mut self, state: ReplState) -> Self {
        self.state = state.code();
        self
    }

    /// Build the member record.
    pub fn build(self) -> MemberDoc {
        MemberDoc {
            name: self.name,
            optime: self.optime,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpTimestamp;
    use serde_json::json;

    #[test]
    fn new_keeps_fields_as_given() {
        let m = MemberDoc::new("", Optime::null(), 99);
        assert_eq!(m.name, "");
        assert_eq!(m.state, 99);
        assert!(m.optime.is_null());
        assert_eq!(m.repl_state(), None);
    }

    #[test]
    fn builder_defaults() {
        let m = MemberDoc::builder("node1:27017").build();
        assert_eq!(m.name, "node1:27017");
        assert_eq!(m.repl_state(), Some(ReplState::Unknown));
        assert!(m.optime.is_null());
    }

    #[test]
    fn builder_all_fields() {
        let ts = OpTimestamp::new(1704067200, 1);
        let m = MemberDoc::builder("node1:27017")
            .optime(ts)
            .repl_state(ReplState::Primary)
            .build();

        assert!(m.is_primary());
        assert!(!m.is_secondary());
        assert_eq!(m.optime.timestamp(), Some(ts));
    }

    #[test]
    fn serialized_keys() {
        let m = MemberDoc::new("node2:27017", Optime::from_value(json!(5)), SECONDARY);
        let value = serde_json::to_value(&m).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, ["name", "optime", "state"]);
        assert_eq!(obj["state"], json!(2));
        assert_eq!(obj["optime"], json!(5));
    }

    #[test]
    fn missing_optime_reads_as_null() {
        let m: MemberDoc = serde_json::from_str(r#"{"name":"a:1","state":7}"#).unwrap();
        assert!(m.optime.is_null());
        assert_eq!(m.repl_state(), Some(ReplState::Arbiter));
    }

    #[test]
    fn unknown_state_code_round_trips() {
        let m = MemberDoc::new("a:1", Optime::null(), 42);
        let json = serde_json::to_string(&m).unwrap();
        let parsed: MemberDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.state, 42);
        assert_eq!(parsed, m);
    }

    #[test]
    fn extra_server_fields_are_ignored() {
        let m: MemberDoc = serde_json::from_value(json!({
            "_id": 0,
            "name": "node1:27017",
            "health": 1,
            "state": 1,
            "stateStr": "PRIMARY",
            "optime": { "ts": { "$timestamp": { "t": 1, "i": 1 } }, "t": 2 }
        }))
        .unwrap();
        assert!(m.is_primary());
        assert_eq!(m.optime.term(), Some(2));
    }
}

//! Snapshot decoding and validation.
//!
//! The types in `replset-types` accept anything; this module is where
//! untrusted input is checked. Decoding handles the shapes that real
//! producers emit (a `null` member list from Go encoders, extended JSON
//! `$date` values from mongo tools) and then [`Validator`] classifies
//! anything that would corrupt downstream time series.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use replset_types::{ReplSetStatusDoc, ReplState};

use crate::error::{DecodeError, Result};

/// Decode a snapshot from a JSON string.
pub fn decode_str(content: &str) -> Result<ReplSetStatusDoc> {
    let value: Value = serde_json::from_str(content)?;
    decode_value(value)
}

/// Decode a snapshot from a parsed JSON value.
///
/// Extra keys (as found in a full `replSetGetStatus` reply) are ignored.
pub fn decode_value(value: Value) -> Result<ReplSetStatusDoc> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(DecodeError::UnrecognizedShape(format!(
                "expected an object, found {}",
                kind_of(&other)
            )));
        }
    };

    let date = obj
        .get_mut("date")
        .ok_or_else(|| DecodeError::UnrecognizedShape("missing `date`".to_string()))?;
    if let Some(normalized) = normalize_date(date) {
        *date = normalized;
    }

    match obj.get("members") {
        None | Some(Value::Null) => {
            obj.insert("members".to_string(), Value::Array(Vec::new()));
        }
        Some(Value::Array(_)) => {}
        Some(other) => {
            return Err(DecodeError::UnrecognizedShape(format!(
                "`members` must be an array, found {}",
                kind_of(other)
            )));
        }
    }

    let doc: ReplSetStatusDoc = serde_json::from_value(Value::Object(obj))?;
    debug!(date = %doc.date, members = doc.members.len(), "Decoded snapshot");
    Ok(doc)
}

// {"$date": "..."} / {"$date": ms} / {"$date": {"$numberLong": "ms"}} -> RFC 3339
fn normalize_date(date: &Value) -> Option<Value> {
    let inner = date.as_object()?.get("$date")?;
    let millis = match inner {
        Value::String(s) => return Some(Value::String(s.clone())),
        Value::Number(n) => n.as_i64()?,
        Value::Object(m) => m.get("$numberLong")?.as_str()?.parse().ok()?,
        _ => return None,
    };
    let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Content checks applied to decoded snapshots.
///
/// Zero or several primaries are never reported: they are the normal
/// picture while an election is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    /// Reject members whose optime has no recognizable timestamp.
    pub strict_optime: bool,
    /// Accept repeated member names.
    pub allow_duplicates: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every problem found, in check order: empty names, duplicates,
    /// state codes, optimes.
    pub fn findings(&self, doc: &ReplSetStatusDoc) -> Vec<DecodeError> {
        let mut findings = Vec::new();

        for (index, m) in doc.members.iter().enumerate() {
            if m.name.is_empty() {
                findings.push(DecodeError::EmptyMemberName { index });
            }
        }

        if !self.allow_duplicates {
            for name in doc.duplicate_names() {
                findings.push(DecodeError::DuplicateMember {
                    name: name.to_string(),
                });
            }
        }

        for m in &doc.members {
            if !ReplState::is_documented_code(m.state) {
                findings.push(DecodeError::UnknownState {
                    name: m.name.clone(),
                    code: m.state,
                });
            }
        }

        if self.strict_optime {
            for m in &doc.members {
                // Arbiters and unreachable members legitimately carry no optime
                let expects_optime = m.repl_state().is_some_and(ReplState::is_data_bearing);
                if expects_optime && m.optime.timestamp().is_none() {
                    findings.push(DecodeError::UnrecognizedOptime {
                        name: m.name.clone(),
                    });
                }
            }
        }

        findings
    }

    /// Fail with the first problem found.
    pub fn validate(&self, doc: &ReplSetStatusDoc) -> Result<()> {
        match self.findings(doc).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Decode and validate in one step.
    pub fn decode_str(&self, content: &str) -> Result<ReplSetStatusDoc> {
        let doc = decode_str(content)?;
        self.validate(&doc)?;
        Ok(doc)
    }

    /// Decode and validate a parsed value in one step.
    pub fn decode_value(&self, value: Value) -> Result<ReplSetStatusDoc> {
        let doc = decode_value(value)?;
        self.validate(&doc)?;
        Ok(doc)
    }
}

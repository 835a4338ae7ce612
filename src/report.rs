//! Text and JSON rendering of snapshot health.

use serde_json::{json, Value};

use crate::data::duration::format_duration;
use crate::data::{Election, StatusData, Timeline};

/// One-line summary followed by one indented line per member.
pub fn render_text(status: &StatusData) -> String {
    let primary = match status.primaries.as_slice() {
        [] => "none".to_string(),
        [only] => only.clone(),
        many => format!("{} (election in progress)", many.join(", ")),
    };
    let max_lag = status.max_lag().map_or_else(|| "-".to_string(), format_duration);

    let mut out = format!(
        "{} [{}] members={} primary={} max_lag={}\n",
        status.date.to_rfc3339(),
        status.health.symbol(),
        status.members.len(),
        primary,
        max_lag
    );
    for m in &status.members {
        let lag = m.lag.map_or_else(|| "-".to_string(), format_duration);
        out.push_str(&format!(
            "  {:<4} {:<24} {:<10} lag={}\n",
            m.health.symbol(),
            m.name,
            m.state_label,
            lag
        ));
    }
    out
}

/// One line per election.
pub fn render_elections(elections: &[Election]) -> String {
    elections
        .iter()
        .map(|e| {
            format!(
                "{} election: {} -> {}\n",
                e.date.to_rfc3339(),
                e.from.as_deref().unwrap_or("none"),
                e.to
            )
        })
        .collect()
}

/// JSON export of the latest status and the timeline's elections.
pub fn export_json(latest: Option<&StatusData>, timeline: &Timeline) -> Value {
    let mut export = serde_json::Map::new();

    let mut summary = serde_json::Map::new();
    summary.insert("snapshots".to_string(), json!(timeline.len()));
    summary.insert(
        "span_secs".to_string(),
        json!(timeline.span().map(|d| d.num_seconds())),
    );
    if let Some(status) = latest {
        summary.insert("date".to_string(), json!(status.date.to_rfc3339()));
        summary.insert("health".to_string(), json!(format!("{:?}", status.health)));
        summary.insert("primary".to_string(), json!(status.primary()));
        summary.insert(
            "max_lag_secs".to_string(),
            json!(status.max_lag().map(|d| d.as_secs())),
        );
    }
    export.insert("summary".to_string(), Value::Object(summary));

    let members: Vec<Value> = latest
        .map(|status| {
            status
                .members
                .iter()
                .map(|m| {
                    json!({
                        "name": m.name,
                        "state": m.state,
                        "state_label": m.state_label,
                        "lag_secs": m.lag.map(|d| d.as_secs()),
                        "health": format!("{:?}", m.health),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    export.insert("members".to_string(), Value::Array(members));

    let elections: Vec<Value> = timeline
        .elections()
        .iter()
        .map(|e| {
            json!({
                "date": e.date.to_rfc3339(),
                "from": e.from,
                "to": e.to,
            })
        })
        .collect();
    export.insert("elections".to_string(), Value::Array(elections));

    Value::Object(export)
}

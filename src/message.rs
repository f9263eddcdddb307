use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::TelemetryError;
use crate::identity::{current_tid, Identity};
use crate::timestamp;

/// One outbound datagram payload. The `_route` tag and the `type` subtype
/// key are exactly what the collector daemon parses; renaming either breaks
/// ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_route", rename_all = "snake_case")]
pub enum Message {
    Stat {
        #[serde(rename = "type")]
        kind: StatKind,
        name: String,
        timestamp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        increment: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        labels: Labels,
    },
    Notification {
        message: String,
        labels: Labels,
    },
    Heartbeat {
        labels: Labels,
    },
    RegisterPlugin {
        plugin_path: String,
        plugin_args: String,
        plugin: String,
        interval: f64,
        labels: Labels,
    },
    RegisterService {
        labels: Labels,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Mark,
    Counter,
    Gauge,
}

/// Labels attached to every message. The identity fields are typed so they
/// can never be absent; everything else the caller supplied rides along in
/// `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labels {
    pub app: String,
    pub pid: u32,
    pub tid: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Labels {
    /// Merges caller labels with the identity fields.
    ///
    /// `pid` and `tid` always come from the identity, even if the caller
    /// tried to set them. `app` may be pre-set by the caller to label a
    /// message as coming from a different logical subsystem (the built-in
    /// heartbeat job does this); otherwise the identity's app name is used.
    pub fn build(caller: Option<&HashMap<String, String>>, identity: &Identity) -> Labels {
        let mut extra = BTreeMap::new();
        let mut app = None;
        if let Some(map) = caller {
            for (key, value) in map {
                match key.as_str() {
                    "app" => app = Some(value.clone()),
                    // Identity-owned, caller values are dropped.
                    "pid" | "tid" => {}
                    _ => {
                        extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Labels {
            app: app.unwrap_or_else(|| identity.app_name()),
            pid: identity.pid(),
            tid: current_tid(),
            extra,
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), TelemetryError> {
    if value.is_empty() {
        Err(TelemetryError::Encoding(format!("{} must be non-empty", field)))
    } else {
        Ok(())
    }
}

/// A caller-supplied timestamp is of unknown unit and goes through range
/// inference; an omitted one uses the wall clock, already in microseconds.
fn resolve_timestamp(timestamp: Option<i64>) -> Result<i64, TelemetryError> {
    match timestamp {
        Some(raw) => timestamp::normalize(raw),
        None => Ok(timestamp::now_micros()),
    }
}

pub fn mark(
    name: &str,
    ts: Option<i64>,
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    require("name", name)?;
    Ok(Message::Stat {
        kind: StatKind::Mark,
        name: name.to_string(),
        timestamp: resolve_timestamp(ts)?,
        increment: None,
        value: None,
        labels: Labels::build(labels, identity),
    })
}

pub fn counter(
    name: &str,
    ts: Option<i64>,
    increment: f64,
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    require("name", name)?;
    Ok(Message::Stat {
        kind: StatKind::Counter,
        name: name.to_string(),
        timestamp: resolve_timestamp(ts)?,
        increment: Some(increment),
        value: None,
        labels: Labels::build(labels, identity),
    })
}

pub fn gauge(
    name: &str,
    ts: Option<i64>,
    value: f64,
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    require("name", name)?;
    Ok(Message::Stat {
        kind: StatKind::Gauge,
        name: name.to_string(),
        timestamp: resolve_timestamp(ts)?,
        increment: None,
        value: Some(value),
        labels: Labels::build(labels, identity),
    })
}

pub fn notification(
    message: &str,
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    require("message", message)?;
    Ok(Message::Notification {
        message: message.to_string(),
        labels: Labels::build(labels, identity),
    })
}

pub fn heartbeat(
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    Ok(Message::Heartbeat {
        labels: Labels::build(labels, identity),
    })
}

pub fn register_plugin(
    path: &str,
    args: &str,
    name: &str,
    interval: f64,
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    require("plugin_path", path)?;
    require("plugin", name)?;
    Ok(Message::RegisterPlugin {
        plugin_path: path.to_string(),
        plugin_args: args.to_string(),
        plugin: name.to_string(),
        interval,
        labels: Labels::build(labels, identity),
    })
}

pub fn register_service(
    labels: Option<&HashMap<String, String>>,
    identity: &Identity,
) -> Result<Message, TelemetryError> {
    Ok(Message::RegisterService {
        labels: Labels::build(labels, identity),
    })
}

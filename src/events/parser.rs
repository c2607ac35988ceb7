use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{AgentSnapshot, AgentStatus, DirectorEvent, QueuedJob};

// Wire envelope: {"event": "<name>", "data": {...}}
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum Envelope {
    AgentUpdate(AgentSnapshot),
    DisconnectAgent(AgentRef),
    LogMessage(LogPayload),
    QueueUpdate(QueuePayload),
}

#[derive(Debug, Deserialize)]
struct AgentRef {
    agent_id: String,
}

#[derive(Debug, Deserialize)]
struct LogPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueuePayload {
    #[serde(default)]
    queue: Option<Vec<QueuedJob>>,
}

impl From<Envelope> for DirectorEvent {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::AgentUpdate(snapshot) => DirectorEvent::AgentUpdate(snapshot),
            Envelope::DisconnectAgent(AgentRef { agent_id }) => {
                DirectorEvent::DisconnectAgent { agent_id }
            }
            Envelope::LogMessage(LogPayload { message }) => DirectorEvent::LogMessage { message },
            Envelope::QueueUpdate(QueuePayload { queue }) => DirectorEvent::QueueUpdate {
                queue: queue.unwrap_or_default(),
            },
        }
    }
}

/// Decode a request body holding one envelope or an array of envelopes.
///
/// A batch is all-or-nothing: one malformed envelope rejects the body.
pub fn parse_events(data: &[u8]) -> Result<Vec<DirectorEvent>> {
    let value: Value = serde_json::from_slice(data).context("Event body is not valid JSON")?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| decode_envelope(item).with_context(|| format!("Event #{i}")))
            .collect(),
        Value::Object(_) => Ok(vec![decode_envelope(value)?]),
        other => bail!("Expected an event object or array, got {}", json_kind(&other)),
    }
}

fn decode_envelope(value: Value) -> Result<DirectorEvent> {
    let envelope: Envelope =
        serde_json::from_value(value).context("Malformed event envelope")?;
    let event = DirectorEvent::from(envelope);

    if matches!(&event, DirectorEvent::AgentUpdate(snapshot) if snapshot.agent_id.is_empty()) {
        bail!("agent_update is missing agent_id");
    }

    Ok(event)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Field-level fallbacks: a mistyped field decodes as absent instead of
// failing the whole snapshot.

pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<Option<AgentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.map(AgentStatus::from))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

/// Strings pass through, numbers are stringified, empty strings are absent.
pub(crate) fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|v| v.is_finite()))
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u64))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            // Frame counters sometimes arrive as 120.0
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

//! Inbound director events
//!
//! The director backend pushes agent snapshots, removals, log lines and job
//! queue updates. This module holds their decoded form; decoding lives in
//! [`parser`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod parser;

pub use parser::*;

/// Agent lifecycle status as reported by the backend.
///
/// Unknown status strings are kept verbatim so new backend states still
/// render instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    Connecting,
    Starting,
    Idle,
    Rendering,
    Completed,
    Error,
    Disconnected,
    Other(String),
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Connecting => "Connecting",
            AgentStatus::Starting => "Starting",
            AgentStatus::Idle => "Idle",
            AgentStatus::Rendering => "Rendering",
            AgentStatus::Completed => "Completed",
            AgentStatus::Error => "Error",
            AgentStatus::Disconnected => "Disconnected",
            AgentStatus::Other(s) => s,
        }
    }
}

impl From<String> for AgentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Connecting" => AgentStatus::Connecting,
            "Starting" => AgentStatus::Starting,
            "Idle" => AgentStatus::Idle,
            "Rendering" => AgentStatus::Rendering,
            "Completed" => AgentStatus::Completed,
            "Error" => AgentStatus::Error,
            "Disconnected" => AgentStatus::Disconnected,
            _ => AgentStatus::Other(s),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(status: AgentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known state of one agent, as pushed by the backend.
///
/// Only `agent_id` is required. Every other field degrades to absent when
/// missing or mistyped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: String,
    #[serde(default, deserialize_with = "parser::lenient_status")]
    pub status: Option<AgentStatus>,
    #[serde(default, deserialize_with = "parser::lenient_string")]
    pub ip: String,
    #[serde(default, deserialize_with = "parser::lenient_optional_string")]
    pub job_id: Option<String>,
    /// Fraction complete in `[0, 1]`. Non-finite values decode as absent.
    #[serde(default, deserialize_with = "parser::lenient_f64")]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "parser::lenient_u64")]
    pub current_frame: Option<u64>,
    /// Per-agent monotonic sequence number, when the backend provides one.
    #[serde(default, deserialize_with = "parser::lenient_u64")]
    pub seq: Option<u64>,
}

impl AgentSnapshot {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }
}

/// A job waiting in the director's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub job_id: String,
}

/// One decoded push event from the director
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorEvent {
    AgentUpdate(AgentSnapshot),
    DisconnectAgent { agent_id: String },
    LogMessage { message: String },
    QueueUpdate { queue: Vec<QueuedJob> },
}

impl DirectorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DirectorEvent::AgentUpdate(_) => "agent_update",
            DirectorEvent::DisconnectAgent { .. } => "disconnect_agent",
            DirectorEvent::LogMessage { .. } => "log_message",
            DirectorEvent::QueueUpdate { .. } => "queue_update",
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::jobs::JobSpec;
use crate::registry::DisconnectSink;

/// Operator action waiting to be collected by the director backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", content = "data", rename_all = "snake_case")]
pub enum OutboundRequest {
    /// Ask the director to connect to an agent at `ip` (`host:port`)
    AddAgent { ip: String },
    DisconnectAgentRequest { agent_id: String },
    SubmitJob { job: JobSpec },
}

impl OutboundRequest {
    /// `None` when `ip` is blank.
    pub fn add_agent(ip: &str) -> Option<Self> {
        let ip = ip.trim();
        if ip.is_empty() {
            return None;
        }
        Some(OutboundRequest::AddAgent { ip: ip.to_string() })
    }
}

/// Shared FIFO of outbound requests. Cloning shares the queue.
#[derive(Debug, Clone, Default)]
pub struct RequestOutbox {
    queue: Arc<Mutex<VecDeque<OutboundRequest>>>,
}

impl RequestOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: OutboundRequest) {
        self.lock().push_back(request);
    }

    /// Take every queued request, oldest first.
    pub fn drain(&self) -> Vec<OutboundRequest> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<OutboundRequest>> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DisconnectSink for RequestOutbox {
    fn request_disconnect(&self, agent_id: &str) {
        self.push(OutboundRequest::DisconnectAgentRequest {
            agent_id: agent_id.to_string(),
        });
    }
}

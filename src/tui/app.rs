use chrono::{DateTime, Local, Utc};
use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::events::{AgentStatus, DirectorEvent, QueuedJob};
use crate::registry::{Activation, AgentViewRegistry, PendingDisconnect, UpdateOutcome};
use crate::server::{OutboundRequest, RequestOutbox};
use crate::view::{CardDeck, CardTarget, CardView};

pub const QUEUE_EMPTY_MESSAGE: &str = "The job queue is empty.";

#[derive(Debug, Clone)]
pub struct LogLine {
    pub time: DateTime<Local>,
    pub message: String,
}

impl LogLine {
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.time.format("%H:%M:%S"), self.message)
    }
}

/// Dashboard state. Owns the agent registry; every inbound event is
/// applied here, one at a time, from the UI loop.
pub struct App {
    pub registry: AgentViewRegistry<CardDeck>,
    outbox: RequestOutbox,
    pub queue: Vec<QueuedJob>,
    pub log: VecDeque<LogLine>,
    log_capacity: usize,
    pub selected_index: usize,
    pub paused: bool,
    pub pending_disconnect: Option<PendingDisconnect>,
    /// Text typed into the add-agent prompt, `Some` while it is open
    pub agent_ip_input: Option<String>,
    pub listen_addr: String,
    pub last_event: Option<DateTime<Utc>>,
}

impl App {
    pub fn new(outbox: RequestOutbox, config: &Config) -> Self {
        Self {
            registry: AgentViewRegistry::new(CardDeck::new()),
            outbox,
            queue: Vec::new(),
            log: VecDeque::new(),
            log_capacity: config.log_capacity.max(1),
            selected_index: 0,
            paused: false,
            pending_disconnect: None,
            agent_ip_input: None,
            listen_addr: config.listen_addr.clone(),
            last_event: None,
        }
    }

    /// Apply queued events unless paused. Returns how many were applied.
    pub fn drain_events(&mut self, rx: &mut UnboundedReceiver<DirectorEvent>) -> usize {
        if self.paused {
            return 0;
        }

        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, event: DirectorEvent) {
        self.last_event = Some(Utc::now());

        match event {
            DirectorEvent::AgentUpdate(snapshot) => {
                let agent_id = snapshot.agent_id.clone();
                match self.registry.on_agent_update(snapshot) {
                    UpdateOutcome::Created => {
                        self.add_log(format!("Agent '{}' connected.", agent_id));
                    }
                    UpdateOutcome::Updated => {}
                    UpdateOutcome::Stale => {
                        tracing::debug!("Ignored stale update for {}", agent_id);
                    }
                }
            }
            DirectorEvent::DisconnectAgent { agent_id } => {
                if self.registry.on_agent_removed(&agent_id) {
                    self.add_log(format!("Agent '{}' disconnected.", agent_id));
                    if self
                        .pending_disconnect
                        .as_ref()
                        .is_some_and(|p| p.agent_id == agent_id)
                    {
                        self.pending_disconnect = None;
                    }
                    self.clamp_selection();
                }
            }
            DirectorEvent::LogMessage { message } => self.add_log(message),
            DirectorEvent::QueueUpdate { queue } => self.queue = queue,
        }
    }

    pub fn add_log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.log.push_back(LogLine {
            time: Local::now(),
            message,
        });
        while self.log.len() > self.log_capacity {
            self.log.pop_front();
        }
    }

    pub fn cards(&self) -> &[CardView] {
        self.registry.mount().cards()
    }

    pub fn selected_card(&self) -> Option<&CardView> {
        self.cards().get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        let len = self.cards().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1) % len;
        }
    }

    pub fn select_previous(&mut self) {
        let len = self.cards().len();
        if len > 0 {
            self.selected_index = if self.selected_index == 0 {
                len - 1
            } else {
                self.selected_index - 1
            };
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.cards().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// Header activation on the selected card: toggles expanded.
    pub fn activate_header(&mut self) {
        self.activate(CardTarget::Header);
    }

    /// Disconnect control on the selected card: asks for confirmation.
    pub fn activate_disconnect(&mut self) {
        self.activate(CardTarget::Disconnect);
    }

    fn activate(&mut self, target: CardTarget) {
        let Some(agent_id) = self.selected_card().map(|c| c.agent_id.clone()) else {
            return;
        };

        match self.registry.activate(&agent_id, target) {
            Activation::Toggled { expanded } => {
                tracing::debug!("Card {} expanded={}", agent_id, expanded);
            }
            Activation::ConfirmDisconnect(pending) => self.pending_disconnect = Some(pending),
            Activation::Ignored => {}
        }
    }

    /// Answer the open confirmation prompt, if any.
    pub fn resolve_disconnect(&mut self, accepted: bool) {
        let Some(pending) = self.pending_disconnect.take() else {
            return;
        };
        let agent_id = pending.agent_id.clone();
        if pending.resolve(accepted, &self.outbox) {
            self.add_log(format!("Requested disconnect of agent '{}'.", agent_id));
        }
    }

    pub fn begin_add_agent(&mut self) {
        self.agent_ip_input = Some(String::new());
    }

    pub fn push_agent_ip_char(&mut self, c: char) {
        if let Some(input) = &mut self.agent_ip_input {
            input.push(c);
        }
    }

    pub fn pop_agent_ip_char(&mut self) {
        if let Some(input) = &mut self.agent_ip_input {
            input.pop();
        }
    }

    pub fn cancel_add_agent(&mut self) {
        self.agent_ip_input = None;
    }

    /// Queue an add-agent request for the typed address. A blank address
    /// leaves the prompt open.
    pub fn submit_add_agent(&mut self) {
        let Some(input) = &self.agent_ip_input else {
            return;
        };
        let Some(request) = OutboundRequest::add_agent(input) else {
            return;
        };
        if let OutboundRequest::AddAgent { ip } = &request {
            self.add_log(format!("Requested connection to agent at {}.", ip));
        }
        self.outbox.push(request);
        self.agent_ip_input = None;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn queue_lines(&self) -> Vec<String> {
        if self.queue.is_empty() {
            return vec![QUEUE_EMPTY_MESSAGE.to_string()];
        }
        self.queue
            .iter()
            .map(|job| format!("Queued: {}", job.job_id))
            .collect()
    }

    pub fn rendering_count(&self) -> usize {
        self.registry
            .agent_ids()
            .iter()
            .filter_map(|id| self.registry.get(id))
            .filter(|entry| entry.latest.status == Some(AgentStatus::Rendering))
            .count()
    }
}

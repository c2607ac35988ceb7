//! Agent view registry
//!
//! Maps agent ids to their view state and reconciles it against inbound
//! snapshots and removals. The expanded flag is the only state that is not
//! supplied by the backend, and snapshot refreshes never touch it.
//!
//! Per agent the lifecycle is:
//!
//! ```text
//! Absent --update--> Present(Collapsed) <--toggle--> Present(Expanded)
//! Present(s) --update--> Present(s)
//! Present(*) --removed--> Absent
//! ```
//!
//! None of the operations fail. Unknown ids on removal or toggle are
//! ignored so duplicate and late events are harmless.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::events::AgentSnapshot;
use crate::view::{CardTarget, CardView, Mount};

/// Receives disconnect requests once the operator has confirmed them.
pub trait DisconnectSink {
    fn request_disconnect(&self, agent_id: &str);
}

#[derive(Debug, Clone)]
pub struct AgentViewState {
    pub agent_id: String,
    pub latest: AgentSnapshot,
    pub expanded: bool,
    rendered: CardView,
}

impl AgentViewState {
    /// The card as last handed to the mount
    pub fn rendered(&self) -> &CardView {
        &self.rendered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Created,
    Updated,
    /// Dropped because its sequence number is older than the stored one
    Stale,
}

/// A disconnect waiting on a yes/no answer from the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDisconnect {
    pub agent_id: String,
    pub prompt: String,
}

impl PendingDisconnect {
    /// Forward the request to `sink` only if the operator accepted.
    /// Returns whether a request was sent.
    pub fn resolve(self, accepted: bool, sink: &dyn DisconnectSink) -> bool {
        if !accepted {
            tracing::debug!("Disconnect of {} declined", self.agent_id);
            return false;
        }
        tracing::info!("Requesting disconnect of agent {}", self.agent_id);
        sink.request_disconnect(&self.agent_id);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Toggled { expanded: bool },
    ConfirmDisconnect(PendingDisconnect),
    Ignored,
}

pub struct AgentViewRegistry<M: Mount> {
    mount: M,
    entries: HashMap<String, AgentViewState>,
    /// First-seen order, mirrors attach order on the mount
    order: Vec<String>,
}

impl<M: Mount> AgentViewRegistry<M> {
    pub fn new(mount: M) -> Self {
        Self {
            mount,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create the entry for an unseen agent, or refresh an existing one
    /// while keeping its expanded flag.
    pub fn on_agent_update(&mut self, snapshot: AgentSnapshot) -> UpdateOutcome {
        let entry = match self.entries.entry(snapshot.agent_id.clone()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let agent_id = snapshot.agent_id.clone();
                let rendered = CardView::render(&snapshot, false);
                self.mount.attach(rendered.clone());
                vacant.insert(AgentViewState {
                    agent_id: agent_id.clone(),
                    latest: snapshot,
                    expanded: false,
                    rendered,
                });
                tracing::debug!("Created card for agent {}", agent_id);
                self.order.push(agent_id);
                return UpdateOutcome::Created;
            }
        };

        if let (Some(stored), Some(incoming)) = (entry.latest.seq, snapshot.seq) {
            if incoming < stored {
                tracing::debug!(
                    "Dropping stale snapshot for {} (seq {} < {})",
                    entry.agent_id,
                    incoming,
                    stored
                );
                return UpdateOutcome::Stale;
            }
        }

        entry.latest = snapshot;
        rerender(&mut self.mount, entry);
        UpdateOutcome::Updated
    }

    /// Returns whether an entry was removed.
    pub fn on_agent_removed(&mut self, agent_id: &str) -> bool {
        if self.entries.remove(agent_id).is_none() {
            tracing::debug!("Ignoring removal of unknown agent {}", agent_id);
            return false;
        }
        self.order.retain(|id| id != agent_id);
        self.mount.detach(agent_id);
        tracing::debug!("Removed card for agent {}", agent_id);
        true
    }

    /// Flip the expanded flag. Returns the new value, or `None` for an
    /// unknown id.
    pub fn toggle_expanded(&mut self, agent_id: &str) -> Option<bool> {
        let entry = self.entries.get_mut(agent_id)?;
        entry.expanded = !entry.expanded;
        rerender(&mut self.mount, entry);
        Some(entry.expanded)
    }

    /// Delegated interaction handling for every card.
    ///
    /// Only the innermost target reacts: activating the disconnect control
    /// opens a confirmation and leaves the expanded flag alone.
    pub fn activate(&mut self, agent_id: &str, target: CardTarget) -> Activation {
        match target {
            CardTarget::Header => match self.toggle_expanded(agent_id) {
                Some(expanded) => Activation::Toggled { expanded },
                None => Activation::Ignored,
            },
            CardTarget::Disconnect => match self.entries.get(agent_id) {
                Some(entry) => Activation::ConfirmDisconnect(PendingDisconnect {
                    agent_id: entry.agent_id.clone(),
                    prompt: entry.rendered.disconnect_prompt(),
                }),
                None => Activation::Ignored,
            },
        }
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentViewState> {
        self.entries.get(agent_id)
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.entries.contains_key(agent_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Agent ids in first-seen order
    pub fn agent_ids(&self) -> &[String] {
        &self.order
    }

    pub fn mount(&self) -> &M {
        &self.mount
    }
}

fn rerender<M: Mount>(mount: &mut M, entry: &mut AgentViewState) {
    let next = CardView::render(&entry.latest, entry.expanded);
    let patches = entry.rendered.diff(&next);
    if !patches.is_empty() {
        mount.patch(&entry.agent_id, patches);
    }
    entry.rendered = next;
}

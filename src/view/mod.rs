//! Retained agent card views
//!
//! A [`CardView`] is a pure function of one agent's latest snapshot and its
//! expanded flag. Cards are attached to a [`Mount`] once and afterwards only
//! receive targeted [`CardPatch`]es computed by [`CardView::diff`], so the
//! mount never rebuilds a card that is still alive.

pub mod geometry;

use crate::events::{AgentSnapshot, AgentStatus};

/// Shown when the backend has not reported a status yet.
pub const STATUS_PLACEHOLDER: &str = "Connecting...";
/// Shown for absent job ids and frame numbers.
pub const NOT_ASSIGNED: &str = "N/A";
pub const DISCONNECT_LABEL: &str = "Disconnect";

/// Interactive regions of a card. Each activation resolves to exactly one
/// target; the disconnect control sits inside the card but never also
/// counts as a header activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    Header,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    /// Sweep angle in degrees
    pub degrees: f64,
    /// SVG path data for the filled sector
    pub d: String,
}

/// Circular progress indicator shown while an agent is rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRing {
    pub percent: f64,
    pub label: String,
    /// `None` at 0%, where a zero-length arc would render as an artifact.
    pub arc: Option<ArcPath>,
}

impl ProgressRing {
    pub fn from_progress(progress: f64) -> Self {
        let percent = geometry::clamp_percent(progress);
        let degrees = geometry::arc_degrees(percent);
        Self {
            percent,
            label: format_percent(percent),
            arc: geometry::pie_path(degrees).map(|d| ArcPath { degrees, d }),
        }
    }

    pub fn glyph(&self) -> char {
        geometry::pie_glyph(self.percent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub agent_id: String,
    pub status_label: String,
    /// Lowercased status label, drives variant styling
    pub state_tag: String,
    pub ip: String,
    pub job: String,
    pub progress: Option<ProgressRing>,
    /// Only present while expanded and rendering
    pub detail: Option<String>,
    pub expanded: bool,
}

impl CardView {
    pub fn render(snapshot: &AgentSnapshot, expanded: bool) -> Self {
        let status_label = snapshot
            .status
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| STATUS_PLACEHOLDER.to_string());
        let state_tag = status_label.to_lowercase();

        let rendering_progress = match (&snapshot.status, snapshot.progress) {
            (Some(AgentStatus::Rendering), Some(p)) if p.is_finite() => Some(p),
            _ => None,
        };

        let progress = rendering_progress.map(ProgressRing::from_progress);

        let detail = match &progress {
            Some(ring) if expanded => Some(format!(
                "Progress: {} (Frame: {})",
                ring.label,
                snapshot
                    .current_frame
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| NOT_ASSIGNED.to_string())
            )),
            _ => None,
        };

        Self {
            agent_id: snapshot.agent_id.clone(),
            status_label,
            state_tag,
            ip: snapshot.ip.clone(),
            job: snapshot
                .job_id
                .clone()
                .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
            progress,
            detail,
            expanded,
        }
    }

    pub fn title(&self) -> String {
        format!("AGENT: {}", self.agent_id)
    }

    pub fn disconnect_prompt(&self) -> String {
        format!(
            "Are you sure you want to disconnect agent {}?",
            self.agent_id
        )
    }

    /// Targeted updates that turn `self` into `next`.
    pub fn diff(&self, next: &CardView) -> Vec<CardPatch> {
        let mut patches = Vec::new();

        if self.status_label != next.status_label || self.state_tag != next.state_tag {
            patches.push(CardPatch::Status {
                label: next.status_label.clone(),
                state_tag: next.state_tag.clone(),
            });
        }
        if self.ip != next.ip {
            patches.push(CardPatch::Ip(next.ip.clone()));
        }
        if self.job != next.job {
            patches.push(CardPatch::Job(next.job.clone()));
        }
        if self.progress != next.progress {
            patches.push(CardPatch::Progress(next.progress.clone()));
        }
        if self.detail != next.detail {
            patches.push(CardPatch::Detail(next.detail.clone()));
        }
        if self.expanded != next.expanded {
            patches.push(CardPatch::Expanded(next.expanded));
        }

        patches
    }

    pub fn apply(&mut self, patch: CardPatch) {
        match patch {
            CardPatch::Status { label, state_tag } => {
                self.status_label = label;
                self.state_tag = state_tag;
            }
            CardPatch::Ip(ip) => self.ip = ip,
            CardPatch::Job(job) => self.job = job,
            CardPatch::Progress(progress) => self.progress = progress,
            CardPatch::Detail(detail) => self.detail = detail,
            CardPatch::Expanded(expanded) => self.expanded = expanded,
        }
    }
}

/// One targeted change to an attached card
#[derive(Debug, Clone, PartialEq)]
pub enum CardPatch {
    Status { label: String, state_tag: String },
    Ip(String),
    Job(String),
    Progress(Option<ProgressRing>),
    Detail(Option<String>),
    Expanded(bool),
}

/// Where rendered cards attach.
pub trait Mount {
    fn attach(&mut self, card: CardView);
    fn patch(&mut self, agent_id: &str, patches: Vec<CardPatch>);
    fn detach(&mut self, agent_id: &str);
}

/// In-memory retained card tree, in attach order
#[derive(Debug, Default)]
pub struct CardDeck {
    cards: Vec<CardView>,
}

impl CardDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn get(&self, agent_id: &str) -> Option<&CardView> {
        self.cards.iter().find(|c| c.agent_id == agent_id)
    }

    pub fn position(&self, agent_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.agent_id == agent_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Mount for CardDeck {
    fn attach(&mut self, card: CardView) {
        self.cards.push(card);
    }

    fn patch(&mut self, agent_id: &str, patches: Vec<CardPatch>) {
        let Some(card) = self.cards.iter_mut().find(|c| c.agent_id == agent_id) else {
            tracing::warn!("Patch for unmounted card {}", agent_id);
            return;
        };
        for patch in patches {
            card.apply(patch);
        }
    }

    fn detach(&mut self, agent_id: &str) {
        self.cards.retain(|c| c.agent_id != agent_id);
    }
}

/// One decimal place, with exact ties rounded up rather than to even.
///
/// The only exactly representable ties at one decimal are `n.25` and `n.75`,
/// i.e. values whose quadruple is an odd integer.
pub fn format_percent(percent: f64) -> String {
    let quarters = percent * 4.0;
    let percent = if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        percent + 0.05
    } else {
        percent
    };
    format!("{:.1}%", percent)
}

//! Card rendering tests
//!
//! Cards are a pure function of (snapshot, expanded), so these tests build
//! snapshots directly and inspect the rendered `CardView`.

use renderdeck::events::{AgentSnapshot, AgentStatus};
use renderdeck::view::{CardPatch, CardView, ProgressRing};

fn rendering(progress: Option<f64>, frame: Option<u64>) -> AgentSnapshot {
    AgentSnapshot {
        agent_id: "a1".to_string(),
        status: Some(AgentStatus::Rendering),
        ip: "10.0.0.5".to_string(),
        job_id: Some("J1".to_string()),
        progress,
        current_frame: frame,
        seq: None,
    }
}

/// Snapshot with only id and IP falls back to placeholders
#[test]
fn test_partial_snapshot_uses_placeholders() {
    let snapshot = AgentSnapshot {
        ip: "10.0.0.5".to_string(),
        ..AgentSnapshot::new("a1")
    };

    let card = CardView::render(&snapshot, false);

    assert_eq!(card.title(), "AGENT: a1");
    assert_eq!(card.status_label, "Connecting...");
    assert_eq!(card.state_tag, "connecting...");
    assert_eq!(card.ip, "10.0.0.5");
    assert_eq!(card.job, "N/A");
    assert_eq!(card.progress, None);
    assert_eq!(card.detail, None);
}

/// State tag is the lowercased status label
#[test]
fn test_state_tag_is_lowercase_status() {
    let mut snapshot = AgentSnapshot::new("a1");

    snapshot.status = Some(AgentStatus::Idle);
    assert_eq!(CardView::render(&snapshot, false).state_tag, "idle");

    snapshot.status = Some(AgentStatus::Other("Compiling Shaders".to_string()));
    let card = CardView::render(&snapshot, false);
    assert_eq!(card.status_label, "Compiling Shaders");
    assert_eq!(card.state_tag, "compiling shaders");
}

/// At 0% the ring and label render but no arc path does
#[test]
fn test_zero_progress_has_no_arc() {
    let card = CardView::render(&rendering(Some(0.0), Some(0)), false);

    let ring = card.progress.expect("ring should render at 0%");
    assert_eq!(ring.percent, 0.0);
    assert_eq!(ring.label, "0.0%");
    assert_eq!(ring.arc, None);
}

/// 75.6% maps to a 272.16 degree arc
#[test]
fn test_progress_arc_angle() {
    let card = CardView::render(&rendering(Some(0.756), Some(10)), false);

    let ring = card.progress.unwrap();
    assert_eq!(ring.label, "75.6%");
    let arc = ring.arc.unwrap();
    assert!((arc.degrees - 272.16).abs() < 1e-9);
    assert!(arc.d.starts_with("M 50 50 L 50 10 A 40 40 0 1 1 "));
    assert!(arc.d.ends_with(" Z"));
}

/// Labels round exact halves up
#[test]
fn test_progress_label_rounds_half_up() {
    let card = CardView::render(&rendering(Some(0.0625), Some(3)), true);

    assert_eq!(card.progress.unwrap().label, "6.3%");
    assert_eq!(card.detail.as_deref(), Some("Progress: 6.3% (Frame: 3)"));
    assert_eq!(ProgressRing::from_progress(0.8125).label, "81.3%");
}

/// Progress outside [0, 1] is clamped
#[test]
fn test_progress_is_clamped() {
    let over = ProgressRing::from_progress(1.4);
    assert_eq!(over.percent, 100.0);
    assert_eq!(over.label, "100.0%");
    assert!((over.arc.unwrap().degrees - 360.0).abs() < 1e-9);

    let under = ProgressRing::from_progress(-0.3);
    assert_eq!(under.percent, 0.0);
    assert_eq!(under.arc, None);
}

/// The ring is shown whether or not the card is expanded
#[test]
fn test_ring_independent_of_expanded() {
    let snapshot = rendering(Some(0.5), Some(120));

    let collapsed = CardView::render(&snapshot, false);
    let expanded = CardView::render(&snapshot, true);

    assert_eq!(collapsed.progress, expanded.progress);
    assert!(collapsed.progress.is_some());
}

/// Detail line only appears while expanded
#[test]
fn test_detail_line_requires_expanded() {
    let snapshot = rendering(Some(0.5), Some(120));

    assert_eq!(CardView::render(&snapshot, false).detail, None);
    assert_eq!(
        CardView::render(&snapshot, true).detail.as_deref(),
        Some("Progress: 50.0% (Frame: 120)")
    );
}

/// Missing frame number renders as N/A in the detail line
#[test]
fn test_detail_line_without_frame() {
    let card = CardView::render(&rendering(Some(0.25), None), true);
    assert_eq!(card.detail.as_deref(), Some("Progress: 25.0% (Frame: N/A)"));
}

/// Rendering with no progress value shows neither ring nor detail
#[test]
fn test_rendering_without_progress() {
    let card = CardView::render(&rendering(None, Some(5)), true);
    assert_eq!(card.progress, None);
    assert_eq!(card.detail, None);
    assert_eq!(card.status_label, "Rendering");
}

/// Progress on a non-rendering agent is ignored
#[test]
fn test_progress_ignored_when_not_rendering() {
    let mut snapshot = rendering(Some(1.0), Some(300));
    snapshot.status = Some(AgentStatus::Completed);

    let card = CardView::render(&snapshot, true);
    assert_eq!(card.progress, None);
    assert_eq!(card.detail, None);
}

/// Disconnect prompt names the agent
#[test]
fn test_disconnect_prompt() {
    let card = CardView::render(&AgentSnapshot::new("render-07"), false);
    assert_eq!(
        card.disconnect_prompt(),
        "Are you sure you want to disconnect agent render-07?"
    );
}

/// Applying a diff turns the old card into the new one
#[test]
fn test_diff_then_apply_reaches_target() {
    let old = CardView::render(&rendering(Some(0.1), Some(1)), false);
    let mut snapshot = rendering(Some(0.8), Some(80));
    snapshot.job_id = Some("J2".to_string());
    let new = CardView::render(&snapshot, true);

    let patches = old.diff(&new);
    assert!(patches.contains(&CardPatch::Job("J2".to_string())));
    assert!(!patches.iter().any(|p| matches!(p, CardPatch::Ip(_))));

    let mut patched = old.clone();
    for patch in patches {
        patched.apply(patch);
    }
    assert_eq!(patched, new);
}

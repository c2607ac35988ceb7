//! TUI integration tests
//!
//! These tests verify that the dashboard App applies director events
//! correctly and that the UI renders them.

use renderdeck::config::Config;
use renderdeck::events::{AgentSnapshot, AgentStatus, DirectorEvent, QueuedJob};
use renderdeck::server::{OutboundRequest, RequestOutbox};
use renderdeck::tui::app::{App, QUEUE_EMPTY_MESSAGE};
use ratatui::{Terminal, backend::TestBackend};

fn make_app() -> (App, RequestOutbox) {
    let outbox = RequestOutbox::new();
    let app = App::new(outbox.clone(), &Config::default());
    (app, outbox)
}

fn update(agent_id: &str, status: AgentStatus, progress: Option<f64>) -> DirectorEvent {
    DirectorEvent::AgentUpdate(AgentSnapshot {
        agent_id: agent_id.to_string(),
        status: Some(status),
        ip: "10.0.0.5:9000".to_string(),
        job_id: Some("job_1".to_string()),
        progress,
        current_frame: Some(42),
        seq: None,
    })
}

fn removal(agent_id: &str) -> DirectorEvent {
    DirectorEvent::DisconnectAgent {
        agent_id: agent_id.to_string(),
    }
}

/// Render the UI into a string buffer
fn render(app: &App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| renderdeck::tui::ui::draw(f, app))
        .unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

/// Test that App starts empty
#[test]
fn test_app_creation() {
    let (app, _) = make_app();

    assert!(app.registry.is_empty());
    assert!(app.queue.is_empty());
    assert!(app.log.is_empty());
    assert_eq!(app.selected_index, 0);
    assert!(!app.paused);
    assert!(app.pending_disconnect.is_none());
}

/// New agents are logged, removals are logged once
#[test]
fn test_agent_lifecycle_is_logged() {
    let (mut app, _) = make_app();

    app.apply(update("a1", AgentStatus::Idle, None));
    app.apply(update("a1", AgentStatus::Idle, None));
    app.apply(removal("a1"));
    app.apply(removal("a1"));

    let messages: Vec<&str> = app.log.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Agent 'a1' connected.", "Agent 'a1' disconnected."]
    );
}

/// Log panel is bounded by log_capacity
#[test]
fn test_log_capacity() {
    let outbox = RequestOutbox::new();
    let config = Config {
        log_capacity: 3,
        ..Config::default()
    };
    let mut app = App::new(outbox, &config);

    for i in 0..5 {
        app.apply(DirectorEvent::LogMessage {
            message: format!("line {}", i),
        });
    }

    assert_eq!(app.log.len(), 3);
    assert_eq!(app.log.front().unwrap().message, "line 2");
    assert_eq!(app.log.back().unwrap().message, "line 4");
}

/// Log lines carry a [HH:MM:SS] prefix
#[test]
fn test_log_line_format() {
    let (mut app, _) = make_app();
    app.add_log("Successfully connected to Director backend.");

    let formatted = app.log.back().unwrap().formatted();
    assert!(formatted.starts_with('['));
    assert_eq!(&formatted[9..11], "] ");
    assert!(formatted.ends_with("Successfully connected to Director backend."));
}

/// Queue panel lines
#[test]
fn test_queue_lines() {
    let (mut app, _) = make_app();
    assert_eq!(app.queue_lines(), vec![QUEUE_EMPTY_MESSAGE.to_string()]);

    app.apply(DirectorEvent::QueueUpdate {
        queue: vec![
            QueuedJob {
                job_id: "job_1".to_string(),
            },
            QueuedJob {
                job_id: "job_2".to_string(),
            },
        ],
    });
    assert_eq!(app.queue_lines(), vec!["Queued: job_1", "Queued: job_2"]);

    app.apply(DirectorEvent::QueueUpdate { queue: vec![] });
    assert_eq!(app.queue_lines(), vec![QUEUE_EMPTY_MESSAGE.to_string()]);
}

/// Navigation wraps around the cards
#[test]
fn test_app_navigation() {
    let (mut app, _) = make_app();
    for id in ["a1", "a2", "a3"] {
        app.apply(update(id, AgentStatus::Idle, None));
    }

    assert_eq!(app.selected_index, 0);
    app.select_next();
    app.select_next();
    assert_eq!(app.selected_card().unwrap().agent_id, "a3");

    // Wraps around
    app.select_next();
    assert_eq!(app.selected_index, 0);

    app.select_previous();
    assert_eq!(app.selected_index, 2);
}

/// Selection stays in range when the selected card goes away
#[test]
fn test_selection_clamped_on_removal() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Idle, None));
    app.apply(update("a2", AgentStatus::Idle, None));
    app.select_next();

    app.apply(removal("a2"));
    assert_eq!(app.selected_index, 0);
    assert_eq!(app.selected_card().unwrap().agent_id, "a1");
}

/// Enter on the selected card toggles it, and the state survives updates
#[test]
fn test_header_activation_survives_updates() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Rendering, Some(0.5)));

    app.activate_header();
    app.apply(update("a1", AgentStatus::Rendering, Some(0.9)));

    let card = app.selected_card().unwrap();
    assert!(card.expanded);
    assert_eq!(card.detail.as_deref(), Some("Progress: 90.0% (Frame: 42)"));
}

/// Confirmed disconnect queues a request but does not remove the card
#[test]
fn test_confirmed_disconnect_queues_request() {
    let (mut app, outbox) = make_app();
    app.apply(update("a1", AgentStatus::Idle, None));

    app.activate_disconnect();
    assert!(app.pending_disconnect.is_some());
    assert!(!app.selected_card().unwrap().expanded);

    app.resolve_disconnect(true);

    assert!(app.pending_disconnect.is_none());
    assert_eq!(
        outbox.drain(),
        vec![OutboundRequest::DisconnectAgentRequest {
            agent_id: "a1".to_string()
        }]
    );
    assert!(app.registry.contains("a1"));

    // Removal only happens when the backend says so
    app.apply(removal("a1"));
    assert!(!app.registry.contains("a1"));
}

/// Declined disconnect queues nothing
#[test]
fn test_declined_disconnect() {
    let (mut app, outbox) = make_app();
    app.apply(update("a1", AgentStatus::Idle, None));

    app.activate_disconnect();
    app.resolve_disconnect(false);

    assert!(app.pending_disconnect.is_none());
    assert!(outbox.is_empty());
}

/// A removal for the agent under confirmation closes the prompt
#[test]
fn test_removal_cancels_pending_prompt() {
    let (mut app, outbox) = make_app();
    app.apply(update("a1", AgentStatus::Idle, None));

    app.activate_disconnect();
    app.apply(removal("a1"));
    app.resolve_disconnect(true);

    assert!(app.pending_disconnect.is_none());
    assert!(outbox.is_empty());
}

/// Typed address becomes an add-agent request
#[test]
fn test_add_agent_queues_request() {
    let (mut app, outbox) = make_app();

    app.begin_add_agent();
    for c in "10.0.0.7:9100".chars() {
        app.push_agent_ip_char(c);
    }
    app.push_agent_ip_char('x');
    app.pop_agent_ip_char();
    app.submit_add_agent();

    assert!(app.agent_ip_input.is_none());
    assert_eq!(
        outbox.drain(),
        vec![OutboundRequest::AddAgent {
            ip: "10.0.0.7:9100".to_string()
        }]
    );
    assert_eq!(
        app.log.back().unwrap().message,
        "Requested connection to agent at 10.0.0.7:9100."
    );
    // The card only appears once the director reports the agent
    assert!(app.registry.is_empty());
}

/// Blank address keeps the prompt open, cancel closes it without a request
#[test]
fn test_add_agent_blank_and_cancel() {
    let (mut app, outbox) = make_app();

    app.begin_add_agent();
    app.push_agent_ip_char(' ');
    app.submit_add_agent();
    assert_eq!(app.agent_ip_input.as_deref(), Some(" "));

    app.cancel_add_agent();
    assert!(app.agent_ip_input.is_none());
    assert!(outbox.is_empty());
}

/// Paused apps leave events queued until resumed
#[test]
fn test_pause_holds_events() {
    let (mut app, _) = make_app();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    tx.send(update("a1", AgentStatus::Idle, None)).unwrap();
    app.toggle_pause();
    assert_eq!(app.drain_events(&mut rx), 0);
    assert!(app.registry.is_empty());

    tx.send(update("a2", AgentStatus::Idle, None)).unwrap();
    app.toggle_pause();
    assert_eq!(app.drain_events(&mut rx), 2);
    assert_eq!(app.registry.agent_ids(), &["a1".to_string(), "a2".to_string()]);
}

/// Rendering counter only counts rendering agents
#[test]
fn test_rendering_count() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Rendering, Some(0.1)));
    app.apply(update("a2", AgentStatus::Idle, None));
    app.apply(update("a3", AgentStatus::Rendering, Some(0.7)));

    assert_eq!(app.rendering_count(), 2);
}

// =============================================================================
// UI Rendering Tests
// =============================================================================

/// Test that UI can render with no data
#[test]
fn test_ui_renders_empty_state() {
    let (app, _) = make_app();
    let screen = render(&app, 100, 30);

    assert!(screen.contains("renderdeck"));
    assert!(screen.contains("No agents connected."));
    assert!(screen.contains(QUEUE_EMPTY_MESSAGE));
}

/// Cards show their fields, and the detail line only when expanded
#[test]
fn test_ui_renders_cards() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Rendering, Some(0.756)));
    app.apply(DirectorEvent::AgentUpdate(AgentSnapshot {
        ip: "10.0.0.6".to_string(),
        ..AgentSnapshot::new("a2")
    }));

    let screen = render(&app, 120, 40);
    assert!(screen.contains("AGENT: a1"));
    assert!(screen.contains("Rendering"));
    assert!(screen.contains("75.6%"));
    assert!(screen.contains("AGENT: a2"));
    assert!(screen.contains("Connecting..."));
    assert!(screen.contains("N/A"));
    assert!(screen.contains("[Disconnect]"));
    assert!(!screen.contains("Frame: 42"));

    app.activate_header();
    let screen = render(&app, 120, 40);
    assert!(screen.contains("Progress: 75.6% (Frame: 42)"));
}

/// The confirmation popup shows the prompt
#[test]
fn test_ui_renders_confirm_popup() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Idle, None));
    app.activate_disconnect();

    let screen = render(&app, 120, 40);
    assert!(screen.contains("Are you sure you want to disconnect agent a1?"));
}

/// The add-agent prompt shows what has been typed
#[test]
fn test_ui_renders_add_agent_prompt() {
    let (mut app, _) = make_app();
    app.begin_add_agent();
    for c in "10.0.0.7:9100".chars() {
        app.push_agent_ip_char(c);
    }

    let screen = render(&app, 120, 40);
    assert!(screen.contains("Add Agent"));
    assert!(screen.contains("10.0.0.7:9100"));
}

/// Small terminals must not panic
#[test]
fn test_ui_renders_small_terminal() {
    let (mut app, _) = make_app();
    app.apply(update("a1", AgentStatus::Rendering, Some(0.5)));
    app.activate_disconnect();

    let backend = TestBackend::new(20, 10);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| renderdeck::tui::ui::draw(f, &app))
        .unwrap();
}

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::App;
use crate::view::{CardView, DISCONNECT_LABEL};

/// Color for a card's state tag (the lowercased status label)
pub fn status_color(state_tag: &str) -> Color {
    match state_tag {
        "idle" => Color::Green,
        "rendering" => Color::Cyan,
        "completed" => Color::LightBlue,
        "error" => Color::Red,
        "disconnected" => Color::DarkGray,
        "starting" | "connecting" | "connecting..." => Color::Yellow,
        _ => Color::White,
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Cards | queue + log
            Constraint::Length(1), // Footer (hotkeys only)
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(body[1]);

    draw_header(f, app, chunks[0]);
    draw_cards(f, app, body[0]);
    draw_queue(f, app, side[0]);
    draw_log(f, app, side[1]);
    draw_footer(f, chunks[2]);

    if app.pending_disconnect.is_some() {
        draw_confirm_popup(f, app);
    }
    if app.agent_ip_input.is_some() {
        draw_add_agent_popup(f, app);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let paused = if app.paused { " [PAUSED]" } else { "" };
    let title = format!(" renderdeck{}", paused);

    let header_content = Line::from(vec![
        Span::styled("Agents: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.registry.len().to_string(),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled("Rendering: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.rendering_count().to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled("Queued: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.queue.len().to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", app.listen_addr),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(header_content)
        .alignment(Alignment::Right)
        .block(block);
    f.render_widget(paragraph, area);
}

/// Terminal lines for one card
pub fn card_text(card: &CardView) -> Text<'static> {
    let marker = if card.expanded { "▾ " } else { "▸ " };
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(card.title(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled("Status: ", label),
            Span::styled(
                card.status_label.clone(),
                Style::default().fg(status_color(&card.state_tag)),
            ),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("IP Address: ", label),
            Span::raw(card.ip.clone()),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Current Job: ", label),
            Span::raw(card.job.clone()),
        ]),
    ];

    if let Some(ring) = &card.progress {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(ring.glyph().to_string(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(ring.label.clone(), Style::default().fg(Color::Cyan)),
        ]));
    }

    if let Some(detail) = &card.detail {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(detail.clone(), Style::default().fg(Color::LightBlue)),
        ]));
    }

    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("[{}]", DISCONNECT_LABEL),
            Style::default().fg(Color::Red),
        ),
    ]));
    lines.push(Line::from(""));

    Text::from(lines)
}

fn draw_cards(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Agents ")
        .border_style(Style::default().fg(Color::Cyan));

    if app.cards().is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "No agents connected.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .cards()
        .iter()
        .map(|card| ListItem::new(card_text(card)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_queue(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.queue.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let lines: Vec<Line> = app
        .queue_lines()
        .into_iter()
        .map(|l| Line::from(Span::styled(l, style)))
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Job Queue ")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(paragraph, area);
}

fn draw_log(f: &mut Frame, app: &App, area: Rect) {
    // Newest at the bottom: show the tail that fits
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.log.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .log
        .iter()
        .skip(skip)
        .map(|line| Line::from(line.formatted()))
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Log ")
            .border_style(Style::default().fg(Color::Magenta)),
    );
    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let footer = Line::from(vec![Span::styled(
        " [q]uit [j/k] select [enter] expand [a]dd agent [x] disconnect [p]ause",
        Style::default().fg(Color::DarkGray),
    )]);

    let paragraph = Paragraph::new(footer);
    f.render_widget(paragraph, area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let Some(pending) = &app.pending_disconnect else {
        return;
    };

    let area = centered_rect(50, 25, f.area());

    // Clear the area
    f.render_widget(Clear, area);

    let content = vec![
        Line::from(""),
        Line::from(pending.prompt.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("es   "),
            Span::styled("[n]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("o"),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Disconnect Agent ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

    f.render_widget(paragraph, area);
}

fn draw_add_agent_popup(f: &mut Frame, app: &App) {
    let Some(input) = &app.agent_ip_input else {
        return;
    };

    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Agent IP:Port > ", Style::default().fg(Color::DarkGray)),
            Span::raw(input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "[enter] connect  [esc] cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Add Agent ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

//! Shared UI components (status bar, stats pane, modal helpers).
//!
//! Contains small building blocks reused by the users/groups screens.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{AppState, InputMode, ModalState};

/// Render the bottom status bar with mode, counts and the transient message.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::SearchUsers => "SEARCH(users)",
        InputMode::SearchGroups => "SEARCH(groups)",
        InputMode::Modal => "MODAL",
    };
    let filter = match app.active_tab {
        crate::app::ActiveTab::Users => app.users.search_term(),
        crate::app::ActiveTab::Groups => app.groups.search_term(),
    };
    let filter_str = if filter.is_empty() {
        String::new()
    } else {
        format!("  filter:[{}]", filter)
    };
    let base = format!(
        "mode: {mode}  users:{}  groups:{}{}",
        app.users.all().len(),
        app.groups.all().len(),
        filter_str
    );

    let mut spans = vec![Span::raw(base)];
    if let Some(status) = &app.status {
        let style = if status.error {
            Style::default().fg(app.theme.negative).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.status_fg).add_modifier(Modifier::BOLD)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.text.clone(), style));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Totals and negative-attitude counts over the authoritative snapshots.
pub fn render_stats(f: &mut Frame, area: Rect, app: &AppState) {
    let users_negative = app.users.all().iter().filter(|u| u.is_negative()).count();
    let groups_negative = app.groups.all().iter().filter(|g| g.is_negative()).count();
    let lines = vec![
        Line::from(vec![
            Span::raw("Users:  "),
            Span::styled(
                app.users.all().len().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  negative: "),
            Span::styled(
                users_negative.to_string(),
                Style::default().fg(app.theme.negative),
            ),
        ]),
        Line::from(vec![
            Span::raw("Groups: "),
            Span::styled(
                app.groups.all().len().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  negative: "),
            Span::styled(
                groups_negative.to_string(),
                Style::default().fg(app.theme.negative),
            ),
        ]),
    ];
    let p = Paragraph::new(lines).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Stats")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

/// Raw payload of the most recent backend response (dev mode only).
pub fn render_response_pane(f: &mut Frame, area: Rect, app: &AppState) {
    let body = app
        .last_response
        .as_deref()
        .unwrap_or("no response yet")
        .to_string();
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(app.theme.muted))
        .block(
            Block::default()
                .title("Response")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 40u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let p = Paragraph::new(message.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Info")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal with usage information and key tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(50);
    let height = 18u16.min(area.height.saturating_sub(4)).max(12);
    let rect = centered_rect(width, height, area);

    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Help", bold)),
        Line::raw(""),
    ];
    for (label, keys) in [
        ("Navigation: ", "Arrow keys / j k, h l or PageUp/PageDown for pages"),
        ("Search: ", "/ to start; type and Enter to apply; Esc to cancel"),
        ("Switch tab: ", "Tab"),
        ("Sort: ", "digits 1-5 (users) / 1-3 (groups); same digit flips direction"),
        ("Edit record: ", "Enter"),
        ("Delete record: ", "Delete"),
        ("Refresh from backend: ", "r"),
        ("Export filtered view: ", "e"),
        ("Cycle rows per page: ", "p"),
        ("Toggle response pane (dev): ", "Shift+R"),
        ("Quit: ", "q"),
    ] {
        lines.push(Line::from(vec![Span::raw(label), Span::styled(keys, italic)]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", italic),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::api::{UserAttitude, UserSortKey};
use crate::app::{AppState, ModalState, UserForm};
use crate::listview::SortDirection;

fn sort_marker(app: &AppState, key: UserSortKey) -> &'static str {
    match app.users.sort() {
        Some((k, SortDirection::Asc)) if k == key => " ▲",
        Some((k, SortDirection::Desc)) if k == key => " ▼",
        _ => "",
    }
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let theme = app.theme;
    let selected = app.selected_user_row;
    let page = app.users.current_page();

    let rows = page.items.iter().enumerate().map(|(i, u)| {
        let style = if i == selected {
            Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        Row::new(vec![
            Cell::from(u.display_id().to_string()),
            name_cell(u, &theme),
            Cell::from(u.display_nickname()),
            attitude_cell(u.attitude.as_deref(), u.attitude_value(), &theme),
            relationship_cell(u, &theme),
            Cell::from(u.other.clone().unwrap_or_default()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Percentage(40),
    ];

    let header = Row::new(vec![
        format!("ID{}", sort_marker(app, UserSortKey::Id)),
        format!("NAME{}", sort_marker(app, UserSortKey::Name)),
        format!("NICKNAME{}", sort_marker(app, UserSortKey::Nickname)),
        format!("ATTITUDE{}", sort_marker(app, UserSortKey::Attitude)),
        format!("RELATION{}", sort_marker(app, UserSortKey::Relationship)),
        "OTHER".to_string(),
    ])
    .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));

    let title = if app.loading_users { "Users (loading…)" } else { "Users" };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

fn name_cell(u: &UserAttitude, theme: &crate::app::Theme) -> Cell<'static> {
    match u.username.as_deref().filter(|s| !s.is_empty()) {
        Some(name) => Cell::from(name.to_string()),
        None => Cell::from(u.display_name()).style(Style::default().fg(theme.muted)),
    }
}

pub(crate) fn attitude_cell(
    raw: Option<&str>,
    value: Option<f64>,
    theme: &crate::app::Theme,
) -> Cell<'static> {
    match raw {
        None => Cell::from("none").style(Style::default().fg(theme.muted)),
        Some(text) => {
            let style = match value {
                Some(v) if v > 0.0 => Style::default().fg(theme.positive),
                Some(v) if v < 0.0 => Style::default().fg(theme.negative),
                _ => Style::default(),
            };
            Cell::from(text.to_string()).style(style)
        }
    }
}

fn relationship_cell(u: &UserAttitude, theme: &crate::app::Theme) -> Cell<'static> {
    match u.relationship.as_deref().filter(|s| !s.is_empty()) {
        None => Cell::from("unknown").style(Style::default().fg(theme.muted)),
        Some(rel) => {
            let style = match rel.to_lowercase().as_str() {
                "friend" => Style::default().fg(theme.positive),
                "enemy" => Style::default().fg(theme.negative),
                _ => Style::default(),
            };
            Cell::from(rel.to_string()).style(style)
        }
    }
}

pub fn render_pagination(f: &mut Frame, area: Rect, app: &AppState) {
    let page = app.users.current_page();
    let line = format!(
        " {}-{} of {}  ·  page {}/{}  ·  {}/page  (h/l: page, p: size, 1-5: sort)",
        page.range_start,
        page.range_end,
        page.total_count,
        page.page,
        page.total_pages,
        app.users.page_size()
    );
    let p = Paragraph::new(line).style(Style::default().fg(app.theme.muted));
    f.render_widget(p, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "ID: {}\nName: {}\nNickname: {}\nAttitude: {}\nRelation: {}\nOther: {}",
            u.display_id(),
            u.display_name(),
            u.display_nickname(),
            u.attitude.as_deref().unwrap_or("none"),
            u.relationship.as_deref().unwrap_or("unknown"),
            u.other.as_deref().unwrap_or("")
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

pub fn render_user_modal(f: &mut Frame, area: Rect, app: &mut AppState, state: &ModalState) {
    match state.clone() {
        ModalState::EditUser { form, field } => {
            let rect = crate::ui::components::centered_rect(60, 11, area);
            let body = edit_form_body(&form, field);
            let p = Paragraph::new(body).block(
                Block::default()
                    .title("Edit user")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            f.render_widget(Clear, rect);
            f.render_widget(p, rect);
        }
        ModalState::ConfirmDeleteUser { user_id, selected } => {
            let rect = crate::ui::components::centered_rect(50, 7, area);
            let yes = if selected == 0 { "[Yes]" } else { " Yes " };
            let no = if selected == 1 { "[No]" } else { " No  " };
            let body = format!(
                "Delete attitude record for user '{}'?\n\n  {}    {}",
                user_id, yes, no
            );
            let p = Paragraph::new(body).block(
                Block::default()
                    .title("Confirm delete")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            f.render_widget(Clear, rect);
            f.render_widget(p, rect);
        }
        _ => {}
    }
}

fn edit_form_body(form: &UserForm, field: usize) -> String {
    let labels = ["User id", "Attitude", "Relation", "Other", "Username", "Nickname"];
    let values = [
        &form.user_id,
        &form.attitude,
        &form.relationship,
        &form.other,
        &form.username,
        &form.nickname,
    ];
    let mut body = String::new();
    for (idx, (label, value)) in labels.iter().zip(values).enumerate() {
        let marker = if idx == field { "▶" } else { " " };
        body.push_str(&format!("{} {:<9} {}\n", marker, format!("{}:", label), value));
    }
    body.push_str("\nTab: next field; Enter: save; Esc: cancel");
    body
}

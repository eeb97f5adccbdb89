use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::api::{GroupAttitude, GroupSortKey};
use crate::app::{AppState, GroupForm, ModalState};
use crate::listview::SortDirection;

fn sort_marker(app: &AppState, key: GroupSortKey) -> &'static str {
    match app.groups.sort() {
        Some((k, SortDirection::Asc)) if k == key => " ▲",
        Some((k, SortDirection::Desc)) if k == key => " ▼",
        _ => "",
    }
}

pub fn render_groups_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let theme = app.theme;
    let selected = app.selected_group_row;
    let page = app.groups.current_page();

    let rows = page.items.iter().enumerate().map(|(i, g)| {
        let style = if i == selected {
            Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        Row::new(vec![
            Cell::from(g.display_id().to_string()),
            name_cell(g, &theme),
            crate::ui::users::attitude_cell(g.attitude.as_deref(), g.attitude_value(), &theme),
            Cell::from(g.other.clone().unwrap_or_default()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Percentage(50),
    ];

    let header = Row::new(vec![
        format!("ID{}", sort_marker(app, GroupSortKey::Id)),
        format!("NAME{}", sort_marker(app, GroupSortKey::Name)),
        format!("ATTITUDE{}", sort_marker(app, GroupSortKey::Attitude)),
        "OTHER".to_string(),
    ])
    .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD));

    let title = if app.loading_groups { "Groups (loading…)" } else { "Groups" };
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

fn name_cell(g: &GroupAttitude, theme: &crate::app::Theme) -> Cell<'static> {
    match g.channel_name.as_deref().filter(|s| !s.is_empty()) {
        Some(name) => Cell::from(name.to_string()),
        None => Cell::from(g.display_name()).style(Style::default().fg(theme.muted)),
    }
}

pub fn render_pagination(f: &mut Frame, area: Rect, app: &AppState) {
    let page = app.groups.current_page();
    let line = format!(
        " {}-{} of {}  ·  page {}/{}  ·  {}/page  (h/l: page, p: size, 1-3: sort)",
        page.range_start,
        page.range_end,
        page.total_count,
        page.page,
        page.total_pages,
        app.groups.page_size()
    );
    let p = Paragraph::new(line).style(Style::default().fg(app.theme.muted));
    f.render_widget(p, area);
}

pub fn render_group_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_group() {
        Some(g) => format!(
            "ID: {}\nName: {}\nAttitude: {}\nOther: {}",
            g.display_id(),
            g.display_name(),
            g.attitude.as_deref().unwrap_or("none"),
            g.other.as_deref().unwrap_or("")
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

pub fn render_group_modal(f: &mut Frame, area: Rect, app: &mut AppState, state: &ModalState) {
    match state.clone() {
        ModalState::EditGroup { form, field } => {
            let rect = crate::ui::components::centered_rect(60, 8, area);
            let body = edit_form_body(&form, field);
            let p = Paragraph::new(body).block(
                Block::default()
                    .title("Edit group")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            f.render_widget(Clear, rect);
            f.render_widget(p, rect);
        }
        ModalState::ConfirmDeleteGroup { group_id, selected } => {
            let rect = crate::ui::components::centered_rect(50, 7, area);
            let yes = if selected == 0 { "[Yes]" } else { " Yes " };
            let no = if selected == 1 { "[No]" } else { " No  " };
            let body = format!(
                "Delete attitude record for group '{}'?\n\n  {}    {}",
                group_id, yes, no
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

fn edit_form_body(form: &GroupForm, field: usize) -> String {
    let labels = ["Group id", "Attitude", "Other"];
    let values = [&form.group_id, &form.attitude, &form.other];
    let mut body = String::new();
    for (idx, (label, value)) in labels.iter().zip(values).enumerate() {
        let marker = if idx == field { "▶" } else { " " };
        body.push_str(&format!("{} {:<9} {}\n", marker, format!("{}:", label), value));
    }
    body.push_str("\nTab: next field; Enter: save; Esc: cancel");
    body
}

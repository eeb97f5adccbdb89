pub mod components;
pub mod groups;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{ActiveTab, AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
        .split(root[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(body[0]);
    let show_response = app.dev && app.show_response_pane;
    let right = if show_response {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Length(6), Constraint::Min(4)].as_ref())
            .split(body[1])
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(4)].as_ref())
            .split(body[1])
    };

    let tabs = match app.active_tab {
        ActiveTab::Users => "[Users]  Groups",
        ActiveTab::Groups => "Users  [Groups]",
    };
    let prompt = match app.input_mode {
        InputMode::Normal | InputMode::Modal => String::new(),
        InputMode::SearchUsers => format!("  Search users: {}", app.search_input),
        InputMode::SearchGroups => format!("  Search groups: {}", app.search_input),
    };
    let p = Paragraph::new(format!(
        "attitude-manager  {tabs}{prompt}  users:{}  groups:{}  — Tab: switch tab; /: search; Enter: edit; r: refresh; e: export; ?: help; q: quit",
        app.users.all().len(),
        app.groups.all().len()
    ))
    .block(
        Block::default()
            .title("attitude-manager")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    match app.active_tab {
        ActiveTab::Users => {
            users::render_users_table(f, left[0], app);
            users::render_pagination(f, left[1], app);
            users::render_user_details(f, right[0], app);
        }
        ActiveTab::Groups => {
            groups::render_groups_table(f, left[0], app);
            groups::render_pagination(f, left[1], app);
            groups::render_group_details(f, right[0], app);
        }
    }

    components::render_stats(f, right[1], app);
    if show_response {
        components::render_response_pane(f, right[2], app);
    }

    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &mut AppState) {
    if let Some(state) = app.modal.clone() {
        match state.clone() {
            ModalState::EditUser { .. } | ModalState::ConfirmDeleteUser { .. } => {
                users::render_user_modal(f, area, app, &state);
            }
            ModalState::EditGroup { .. } | ModalState::ConfirmDeleteGroup { .. } => {
                groups::render_group_modal(f, area, app, &state);
            }
            ModalState::Info { .. } => {
                components::render_info_modal(f, area, app, &state);
            }
            ModalState::Help => {
                components::render_help_modal(f, area, app);
            }
        }
    }
}

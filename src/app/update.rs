//! Event loop and state transitions.
//!
//! The loop is single-threaded: draw, drain completed API calls, poll one key
//! event. Network calls run on the tokio runtime and report back over a
//! channel as [`ApiEvent`]s, applied in completion order; overlapping
//! requests are allowed and the later completion wins. A successful mutation
//! never patches the snapshot locally; it requests one full reload instead.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use serde::Serialize;
use std::sync::mpsc;
use std::time::Duration;
use tracing::info;

use crate::api::{
    ApiClient, ApiError, DeleteResponse, GroupAttitude, GroupAttitudeUpdate, GroupSortKey,
    UserAttitude, UserAttitudeUpdate, UserSortKey,
};
use crate::app::{
    ActiveTab, AppState, GroupForm, InputMode, ModalState, UserForm, viewconf,
};
use crate::app::keymap::KeyAction;
use crate::export;
use crate::ui;

/// Which authoritative snapshot to fetch again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reload {
    Users,
    Groups,
}

/// A completed backend call, delivered to the event loop.
#[derive(Debug)]
pub enum ApiEvent {
    UsersLoaded(Result<Vec<UserAttitude>, ApiError>),
    GroupsLoaded(Result<Vec<GroupAttitude>, ApiError>),
    UserSaved(Result<UserAttitude, ApiError>),
    GroupSaved(Result<GroupAttitude, ApiError>),
    UserDeleted(Result<DeleteResponse, ApiError>),
    GroupDeleted(Result<DeleteResponse, ApiError>),
}

/// Spawns backend calls on the runtime and routes completions to the loop.
pub struct Dispatcher {
    handle: tokio::runtime::Handle,
    client: ApiClient,
    tx: mpsc::Sender<ApiEvent>,
}

impl Dispatcher {
    pub fn new(
        handle: tokio::runtime::Handle,
        client: ApiClient,
        tx: mpsc::Sender<ApiEvent>,
    ) -> Self {
        Self { handle, client, tx }
    }

    pub fn reload(&self, which: Reload) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let event = match which {
                Reload::Users => ApiEvent::UsersLoaded(client.list_users().await),
                Reload::Groups => ApiEvent::GroupsLoaded(client.list_groups().await),
            };
            let _ = tx.send(event);
        });
    }

    pub fn update_user(&self, user_id: String, update: UserAttitudeUpdate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let _ = tx.send(ApiEvent::UserSaved(client.update_user(&user_id, &update).await));
        });
    }

    pub fn update_group(&self, group_id: String, update: GroupAttitudeUpdate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let _ = tx.send(ApiEvent::GroupSaved(client.update_group(&group_id, &update).await));
        });
    }

    pub fn delete_user(&self, user_id: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let _ = tx.send(ApiEvent::UserDeleted(client.delete_user(&user_id).await));
        });
    }

    pub fn delete_group(&self, group_id: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let _ = tx.send(ApiEvent::GroupDeleted(client.delete_group(&group_id).await));
        });
    }
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    client: ApiClient,
    handle: tokio::runtime::Handle,
    dev: bool,
) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(handle, client, tx);
    let mut app = AppState::new(dev);

    request_reload(&mut app, &dispatcher, Reload::Users);
    request_reload(&mut app, &dispatcher, Reload::Groups);

    loop {
        app.tick_status();
        terminal.draw(|f| {
            ui::render(f, &mut app);
        })?;

        while let Ok(api_event) = rx.try_recv() {
            if let Some(which) = apply_api_event(&mut app, api_event) {
                request_reload(&mut app, &dispatcher, which);
            }
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.input_mode {
                        InputMode::Normal => {
                            if !handle_normal_key(&mut app, &key, &dispatcher) {
                                break;
                            }
                        }
                        InputMode::SearchUsers | InputMode::SearchGroups => {
                            handle_search_key(&mut app, key.code);
                        }
                        InputMode::Modal => {
                            handle_modal_key(&mut app, key.code, &dispatcher);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn request_reload(app: &mut AppState, dispatcher: &Dispatcher, which: Reload) {
    match which {
        Reload::Users => app.loading_users = true,
        Reload::Groups => app.loading_groups = true,
    }
    dispatcher.reload(which);
}

/// Apply a completed backend call to the state. Returns the reload a
/// successful mutation requires; failures leave the snapshot untouched and
/// trigger nothing.
pub fn apply_api_event(app: &mut AppState, event: ApiEvent) -> Option<Reload> {
    match event {
        ApiEvent::UsersLoaded(Ok(users)) => {
            app.loading_users = false;
            record_response(app, &users);
            app.users.load(users);
            app.selected_user_row = 0;
            app.clamp_selection();
            None
        }
        ApiEvent::UsersLoaded(Err(e)) => {
            app.loading_users = false;
            app.set_error(format!("load users failed: {}", e));
            None
        }
        ApiEvent::GroupsLoaded(Ok(groups)) => {
            app.loading_groups = false;
            record_response(app, &groups);
            app.groups.load(groups);
            app.selected_group_row = 0;
            app.clamp_selection();
            None
        }
        ApiEvent::GroupsLoaded(Err(e)) => {
            app.loading_groups = false;
            app.set_error(format!("load groups failed: {}", e));
            None
        }
        ApiEvent::UserSaved(Ok(user)) => {
            record_response(app, &user);
            app.set_status(format!("updated user {}", user.display_id()));
            Some(Reload::Users)
        }
        ApiEvent::UserSaved(Err(e)) => {
            app.set_error(format!("update failed: {}", e));
            None
        }
        ApiEvent::GroupSaved(Ok(group)) => {
            record_response(app, &group);
            app.set_status(format!("updated group {}", group.display_id()));
            Some(Reload::Groups)
        }
        ApiEvent::GroupSaved(Err(e)) => {
            app.set_error(format!("update failed: {}", e));
            None
        }
        ApiEvent::UserDeleted(Ok(resp)) => {
            app.set_status(delete_status(&resp));
            Some(Reload::Users)
        }
        ApiEvent::UserDeleted(Err(e)) => {
            app.set_error(format!("delete failed: {}", e));
            None
        }
        ApiEvent::GroupDeleted(Ok(resp)) => {
            app.set_status(delete_status(&resp));
            Some(Reload::Groups)
        }
        ApiEvent::GroupDeleted(Err(e)) => {
            app.set_error(format!("delete failed: {}", e));
            None
        }
    }
}

fn delete_status(resp: &DeleteResponse) -> String {
    if resp.message.is_empty() {
        "deleted".to_string()
    } else {
        format!("deleted: {}", resp.message)
    }
}

/// In dev mode the payload is surfaced in the response pane; otherwise it is
/// only used to refresh the computed view.
fn record_response<T: Serialize>(app: &mut AppState, payload: &T) {
    if app.dev {
        app.last_response = serde_json::to_string_pretty(payload).ok();
    }
}

/// Build the PUT body for a user form. The id is required; every text field
/// is sent verbatim (including empty strings), only an empty attitude is
/// omitted so the backend keeps the stored score.
pub fn user_form_payload(form: &UserForm) -> Result<(String, UserAttitudeUpdate), ApiError> {
    let id = form.user_id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("user id is required".to_string()));
    }
    let attitude = if form.attitude.trim().is_empty() {
        None
    } else {
        Some(form.attitude.clone())
    };
    Ok((
        id.to_string(),
        UserAttitudeUpdate {
            attitude,
            relationship: form.relationship.clone(),
            other: form.other.clone(),
            username: form.username.clone(),
            nickname: form.nickname.clone(),
        },
    ))
}

/// Build the PUT body for a group form. Unlike the user path, empty optional
/// fields are omitted entirely.
pub fn group_form_payload(form: &GroupForm) -> Result<(String, GroupAttitudeUpdate), ApiError> {
    let id = form.group_id.trim();
    if id.is_empty() {
        return Err(ApiError::Validation("group id is required".to_string()));
    }
    let attitude = if form.attitude.trim().is_empty() {
        None
    } else {
        Some(form.attitude.clone())
    };
    let other = if form.other.is_empty() {
        None
    } else {
        Some(form.other.clone())
    };
    Ok((id.to_string(), GroupAttitudeUpdate { attitude, other }))
}

fn handle_normal_key(app: &mut AppState, key: &KeyEvent, dispatcher: &Dispatcher) -> bool {
    match app.keymap.resolve(key) {
        Some(KeyAction::Quit) => return false,
        Some(KeyAction::SwitchTab) => {
            app.active_tab = match app.active_tab {
                ActiveTab::Users => ActiveTab::Groups,
                ActiveTab::Groups => ActiveTab::Users,
            };
        }
        Some(KeyAction::StartSearch) => {
            app.search_input.clear();
            app.input_mode = match app.active_tab {
                ActiveTab::Users => InputMode::SearchUsers,
                ActiveTab::Groups => InputMode::SearchGroups,
            };
        }
        Some(KeyAction::Refresh) => {
            request_reload(app, dispatcher, Reload::Users);
            request_reload(app, dispatcher, Reload::Groups);
            app.set_status("refreshing…");
        }
        Some(KeyAction::Export) => export_active_view(app),
        Some(KeyAction::EditSelection) => open_edit_modal(app),
        Some(KeyAction::DeleteSelection) => open_delete_modal(app),
        Some(KeyAction::MoveUp) => move_selection_up(app),
        Some(KeyAction::MoveDown) => move_selection_down(app),
        Some(KeyAction::PrevPage) => {
            let view_has_prev = match app.active_tab {
                ActiveTab::Users => app.users.has_prev_page(),
                ActiveTab::Groups => app.groups.has_prev_page(),
            };
            if view_has_prev {
                match app.active_tab {
                    ActiveTab::Users => {
                        let p = app.users.page();
                        app.users.set_page(p - 1);
                        app.selected_user_row = 0;
                    }
                    ActiveTab::Groups => {
                        let p = app.groups.page();
                        app.groups.set_page(p - 1);
                        app.selected_group_row = 0;
                    }
                }
            }
        }
        Some(KeyAction::NextPage) => {
            let view_has_next = match app.active_tab {
                ActiveTab::Users => app.users.has_next_page(),
                ActiveTab::Groups => app.groups.has_next_page(),
            };
            if view_has_next {
                match app.active_tab {
                    ActiveTab::Users => {
                        let p = app.users.page();
                        app.users.set_page(p + 1);
                        app.selected_user_row = 0;
                    }
                    ActiveTab::Groups => {
                        let p = app.groups.page();
                        app.groups.set_page(p + 1);
                        app.selected_group_row = 0;
                    }
                }
            }
        }
        Some(KeyAction::CyclePageSize) => {
            let next = match app.active_tab {
                ActiveTab::Users => {
                    let next = viewconf::next_page_size(app.users.page_size());
                    app.users.set_page_size(next);
                    next
                }
                ActiveTab::Groups => {
                    let next = viewconf::next_page_size(app.groups.page_size());
                    app.groups.set_page_size(next);
                    next
                }
            };
            app.clamp_selection();
            let _ = viewconf::ViewConfig::save_from_app(app, "view.conf");
            app.set_status(format!("rows per page: {}", next));
        }
        Some(KeyAction::ToggleResponsePane) => {
            if app.dev {
                app.show_response_pane = !app.show_response_pane;
            }
        }
        Some(KeyAction::OpenHelp) => {
            app.modal = Some(ModalState::Help);
            app.input_mode = InputMode::Modal;
        }
        Some(KeyAction::Ignore) => {}
        None => handle_sort_digit(app, key.code),
    }
    true
}

/// Digit keys sort by the visible column of the active tab; the same digit
/// again flips the direction.
fn handle_sort_digit(app: &mut AppState, code: KeyCode) {
    match app.active_tab {
        ActiveTab::Users => {
            let key = match code {
                KeyCode::Char('1') => Some(UserSortKey::Id),
                KeyCode::Char('2') => Some(UserSortKey::Name),
                KeyCode::Char('3') => Some(UserSortKey::Nickname),
                KeyCode::Char('4') => Some(UserSortKey::Attitude),
                KeyCode::Char('5') => Some(UserSortKey::Relationship),
                _ => None,
            };
            if let Some(key) = key {
                app.users.set_sort(key);
                app.clamp_selection();
            }
        }
        ActiveTab::Groups => {
            let key = match code {
                KeyCode::Char('1') => Some(GroupSortKey::Id),
                KeyCode::Char('2') => Some(GroupSortKey::Name),
                KeyCode::Char('3') => Some(GroupSortKey::Attitude),
                _ => None,
            };
            if let Some(key) = key {
                app.groups.set_sort(key);
                app.clamp_selection();
            }
        }
    }
}

fn move_selection_up(app: &mut AppState) {
    match app.active_tab {
        ActiveTab::Users => {
            if app.selected_user_row > 0 {
                app.selected_user_row -= 1;
            } else if app.users.has_prev_page() {
                let p = app.users.page();
                app.users.set_page(p - 1);
                app.selected_user_row = app.users.current_page().items.len().saturating_sub(1);
            }
        }
        ActiveTab::Groups => {
            if app.selected_group_row > 0 {
                app.selected_group_row -= 1;
            } else if app.groups.has_prev_page() {
                let p = app.groups.page();
                app.groups.set_page(p - 1);
                app.selected_group_row = app.groups.current_page().items.len().saturating_sub(1);
            }
        }
    }
}

fn move_selection_down(app: &mut AppState) {
    match app.active_tab {
        ActiveTab::Users => {
            let len = app.users.current_page().items.len();
            if app.selected_user_row + 1 < len {
                app.selected_user_row += 1;
            } else if app.users.has_next_page() {
                let p = app.users.page();
                app.users.set_page(p + 1);
                app.selected_user_row = 0;
            }
        }
        ActiveTab::Groups => {
            let len = app.groups.current_page().items.len();
            if app.selected_group_row + 1 < len {
                app.selected_group_row += 1;
            } else if app.groups.has_next_page() {
                let p = app.groups.page();
                app.groups.set_page(p + 1);
                app.selected_group_row = 0;
            }
        }
    }
}

fn export_active_view(app: &mut AppState) {
    let result = match app.active_tab {
        ActiveTab::Users => {
            export::write_snapshot(&app.users.export_snapshot(), std::path::Path::new("."))
        }
        ActiveTab::Groups => {
            export::write_snapshot(&app.groups.export_snapshot(), std::path::Path::new("."))
        }
    };
    match result {
        Ok(path) => {
            info!("exported snapshot to {}", path.display());
            app.set_status(format!("exported to {}", path.display()));
        }
        Err(e) => app.set_error(format!("export failed: {}", e)),
    }
}

fn open_edit_modal(app: &mut AppState) {
    let modal = match app.active_tab {
        ActiveTab::Users => app.selected_user().map(|user| ModalState::EditUser {
            form: UserForm::from_record(user),
            field: 0,
        }),
        ActiveTab::Groups => app.selected_group().map(|group| ModalState::EditGroup {
            form: GroupForm::from_record(group),
            field: 0,
        }),
    };
    if let Some(modal) = modal {
        app.modal = Some(modal);
        app.input_mode = InputMode::Modal;
    }
}

fn open_delete_modal(app: &mut AppState) {
    let modal = match app.active_tab {
        ActiveTab::Users => app.selected_user().map(|user| ModalState::ConfirmDeleteUser {
            user_id: user.user_id.clone(),
            selected: 1,
        }),
        ActiveTab::Groups => app.selected_group().map(|group| ModalState::ConfirmDeleteGroup {
            group_id: group.group_id.clone(),
            selected: 1,
        }),
    };
    if let Some(modal) = modal {
        app.modal = Some(modal);
        app.input_mode = InputMode::Modal;
    }
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            let term = app.search_input.clone();
            match app.input_mode {
                InputMode::SearchUsers => {
                    app.users.set_search_term(&term);
                    app.selected_user_row = 0;
                }
                InputMode::SearchGroups => {
                    app.groups.set_search_term(&term);
                    app.selected_group_row = 0;
                }
                InputMode::Normal | InputMode::Modal => {}
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode, dispatcher: &Dispatcher) {
    match &mut app.modal {
        Some(ModalState::EditUser { form, field }) => match code {
            KeyCode::Esc => close_modal(app),
            KeyCode::Tab | KeyCode::Down => {
                *field = (*field + 1) % UserForm::FIELDS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                *field = (*field + UserForm::FIELDS - 1) % UserForm::FIELDS;
            }
            KeyCode::Enter => {
                let built = user_form_payload(form);
                match built {
                    Ok((user_id, update)) => {
                        dispatcher.update_user(user_id, update);
                        close_modal(app);
                        app.set_status("saving…");
                    }
                    // Validation failure: nothing was sent, the form stays open.
                    Err(e) => app.set_error(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                form.field_mut(*field).pop();
            }
            KeyCode::Char(c) => {
                form.field_mut(*field).push(c);
            }
            _ => {}
        },
        Some(ModalState::EditGroup { form, field }) => match code {
            KeyCode::Esc => close_modal(app),
            KeyCode::Tab | KeyCode::Down => {
                *field = (*field + 1) % GroupForm::FIELDS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                *field = (*field + GroupForm::FIELDS - 1) % GroupForm::FIELDS;
            }
            KeyCode::Enter => {
                let built = group_form_payload(form);
                match built {
                    Ok((group_id, update)) => {
                        dispatcher.update_group(group_id, update);
                        close_modal(app);
                        app.set_status("saving…");
                    }
                    Err(e) => app.set_error(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                form.field_mut(*field).pop();
            }
            KeyCode::Char(c) => {
                form.field_mut(*field).push(c);
            }
            _ => {}
        },
        Some(ModalState::ConfirmDeleteUser { user_id, selected }) => match code {
            KeyCode::Esc => close_modal(app),
            KeyCode::Left | KeyCode::Right => {
                *selected = if *selected == 0 { 1 } else { 0 };
            }
            KeyCode::Enter => {
                let confirmed = *selected == 0;
                let user_id = user_id.clone();
                close_modal(app);
                if confirmed {
                    if user_id.trim().is_empty() {
                        app.set_error("user id is required");
                    } else {
                        dispatcher.delete_user(user_id);
                        app.set_status("deleting…");
                    }
                }
            }
            _ => {}
        },
        Some(ModalState::ConfirmDeleteGroup { group_id, selected }) => match code {
            KeyCode::Esc => close_modal(app),
            KeyCode::Left | KeyCode::Right => {
                *selected = if *selected == 0 { 1 } else { 0 };
            }
            KeyCode::Enter => {
                let confirmed = *selected == 0;
                let group_id = group_id.clone();
                close_modal(app);
                if confirmed {
                    if group_id.trim().is_empty() {
                        app.set_error("group id is required");
                    } else {
                        dispatcher.delete_group(group_id);
                        app.set_status("deleting…");
                    }
                }
            }
            _ => {}
        },
        Some(ModalState::Info { .. }) => match code {
            KeyCode::Esc | KeyCode::Enter => close_modal(app),
            _ => {}
        },
        Some(ModalState::Help) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => close_modal(app),
            _ => {}
        },
        None => {}
    }
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

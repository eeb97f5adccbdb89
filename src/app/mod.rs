//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, the theme with its
//! `theme.conf` persistence, and helpers to construct defaults. The event
//! loop itself lives in [`update`] and is re-exported as `run`.

pub mod keymap;
pub mod update;
pub mod viewconf;

use ratatui::style::Color;
use std::time::{Duration, Instant};

use crate::api::{GroupAttitude, UserAttitude};
use crate::listview::ListView;

/// Page sizes the operator can cycle through, mirroring the panel's selector.
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// How long a transient status message stays on the status bar.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Top-level active tab in the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Users,
    Groups,
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    SearchUsers,
    SearchGroups,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    /// Positive attitude / "friend" relationship rows.
    pub positive: Color,
    /// Negative attitude / "enemy" relationship rows and error status.
    pub negative: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            positive: Color::Green,
            negative: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),      // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),     // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),     // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),    // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44), // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe), // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4), // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            positive: Color::Rgb(0xa6, 0xe3, 0xa1),  // green
            negative: Color::Rgb(0xf3, 0x8b, 0xa8),  // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "positive" => theme.positive = color,
                    "negative" => theme.negative = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or special names: "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = if let Some(h) = lower.strip_prefix('#') { h } else { lower.as_str() };
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# attitude-manager theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                // For named colors, emit a best-effort hex approximation
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::LightRed => "#FF6666".to_string(),
                Color::LightGreen => "#66FF66".to_string(),
                Color::LightYellow => "#FFFF66".to_string(),
                Color::LightBlue => "#6666FF".to_string(),
                Color::LightMagenta => "#FF66FF".to_string(),
                Color::LightCyan => "#66FFFF".to_string(),
                Color::White => "#FFFFFF".to_string(),
                Color::Indexed(i) => format!("index:{}", i),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("positive", self.positive);
        kv("negative", self.negative);

        std::fs::write(path, buf)
    }

    /// Ensure a config file exists; if missing, write one with the current default theme and return it.
    /// If present, load from it; on parse errors, return `mocha`.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Resolve a config file by name: working directory first, then the user
/// config directory.
pub fn config_file_read_path(name: &str) -> Option<String> {
    let cwd = std::path::Path::new(name);
    if cwd.exists() {
        return Some(name.to_string());
    }
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(std::path::PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| std::path::Path::new(&h).join(".config")))?;
    let candidate = base.join("attitude-manager").join(name);
    if candidate.exists() {
        Some(candidate.to_string_lossy().into_owned())
    } else {
        None
    }
}

/// Edit form for a user record. Every text field is sent on submit even when
/// empty; only an empty attitude is dropped from the payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserForm {
    pub user_id: String,
    pub attitude: String,
    pub relationship: String,
    pub other: String,
    pub username: String,
    pub nickname: String,
}

impl UserForm {
    pub const FIELDS: usize = 6;

    pub fn from_record(record: &UserAttitude) -> Self {
        Self {
            user_id: record.user_id.clone(),
            attitude: record.attitude.clone().unwrap_or_default(),
            relationship: record.relationship.clone().unwrap_or_default(),
            other: record.other.clone().unwrap_or_default(),
            username: record.username.clone().unwrap_or_default(),
            nickname: record.nickname.clone().unwrap_or_default(),
        }
    }

    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.user_id,
            1 => &mut self.attitude,
            2 => &mut self.relationship,
            3 => &mut self.other,
            4 => &mut self.username,
            _ => &mut self.nickname,
        }
    }
}

/// Edit form for a group record. Empty optional fields are omitted on submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupForm {
    pub group_id: String,
    pub attitude: String,
    pub other: String,
}

impl GroupForm {
    pub const FIELDS: usize = 3;

    pub fn from_record(record: &GroupAttitude) -> Self {
        Self {
            group_id: record.group_id.clone(),
            attitude: record.attitude.clone().unwrap_or_default(),
            other: record.other.clone().unwrap_or_default(),
        }
    }

    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.group_id,
            1 => &mut self.attitude,
            _ => &mut self.other,
        }
    }
}

/// Modal dialog states.
#[derive(Clone, Debug)]
pub enum ModalState {
    EditUser { form: UserForm, field: usize },
    EditGroup { form: GroupForm, field: usize },
    ConfirmDeleteUser { user_id: String, selected: usize },
    ConfirmDeleteGroup { group_id: String, selected: usize },
    Info { message: String },
    Help,
}

/// Transient status-bar message, toast style.
#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub error: bool,
    pub at: Instant,
}

impl StatusMessage {
    pub fn expired(&self) -> bool {
        self.at.elapsed() > STATUS_TTL
    }
}

pub struct AppState {
    pub users: ListView<UserAttitude>,
    pub groups: ListView<GroupAttitude>,
    /// Selected row within the current page, per tab.
    pub selected_user_row: usize,
    pub selected_group_row: usize,
    pub active_tab: ActiveTab,
    pub input_mode: InputMode,
    /// Live search buffer; applied to the active view on Enter.
    pub search_input: String,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub modal: Option<ModalState>,
    pub status: Option<StatusMessage>,
    /// Surfacing raw payloads was requested (`--dev`).
    pub dev: bool,
    pub show_response_pane: bool,
    pub last_response: Option<String>,
    pub loading_users: bool,
    pub loading_groups: bool,
}

impl AppState {
    /// Fresh state with configuration loaded from the working directory.
    /// No data is fetched here; the event loop issues the initial loads.
    pub fn new(dev: bool) -> Self {
        let view_cfg = viewconf::ViewConfig::load_or_init("view.conf");
        let mut app = Self {
            users: ListView::new(PAGE_SIZES[0]),
            groups: ListView::new(PAGE_SIZES[0]),
            selected_user_row: 0,
            selected_group_row: 0,
            active_tab: ActiveTab::Users,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            theme: Theme::load_or_init("theme.conf"),
            keymap: keymap::Keymap::load_or_init("keybinds.conf"),
            modal: None,
            status: None,
            dev,
            show_response_pane: dev,
            last_response: None,
            loading_users: false,
            loading_groups: false,
        };
        view_cfg.apply_to(&mut app);
        app
    }

    pub fn selected_user(&self) -> Option<&UserAttitude> {
        self.users.current_page().items.get(self.selected_user_row)
    }

    pub fn selected_group(&self) -> Option<&GroupAttitude> {
        self.groups.current_page().items.get(self.selected_group_row)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: false,
            at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: true,
            at: Instant::now(),
        });
    }

    /// Drop the status message once its display window has passed.
    pub fn tick_status(&mut self) {
        if self.status.as_ref().is_some_and(StatusMessage::expired) {
            self.status = None;
        }
    }

    /// Keep the selected row inside the current page after any view change.
    pub fn clamp_selection(&mut self) {
        let users_len = self.users.current_page().items.len();
        if users_len == 0 {
            self.selected_user_row = 0;
        } else if self.selected_user_row >= users_len {
            self.selected_user_row = users_len - 1;
        }
        let groups_len = self.groups.current_page().items.len();
        if groups_len == 0 {
            self.selected_group_row = 0;
        } else if self.selected_group_row >= groups_len {
            self.selected_group_row = groups_len - 1;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

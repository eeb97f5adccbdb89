//! View configuration: parse/write `view.conf` and apply to AppState.
//!
//! Persists the per-tab page sizes so the operator's choice from the
//! page-size presets survives restarts.

use super::{AppState, PAGE_SIZES};

/// Persisted table-view settings.
#[derive(Clone, Copy, Debug)]
pub struct ViewConfig {
    /// Rows per page on the Users tab.
    pub users_per_page: usize,
    /// Rows per page on the Groups tab.
    pub groups_per_page: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            users_per_page: PAGE_SIZES[0],
            groups_per_page: PAGE_SIZES[0],
        }
    }
}

impl ViewConfig {
    /// Extract the current view settings from an [`AppState`].
    pub fn from_app(app: &AppState) -> Self {
        Self {
            users_per_page: app.users.page_size(),
            groups_per_page: app.groups.page_size(),
        }
    }

    /// Save the current view settings from an [`AppState`] to a file.
    pub fn save_from_app(app: &AppState, path: &str) -> std::io::Result<()> {
        Self::from_app(app).write_file(path)
    }

    /// Load view settings from a file, or create defaults if the file
    /// doesn't exist in the working directory or the user config directory.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("view.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let cfg = Self::default();
        let _ = cfg.write_file(path);
        cfg
    }

    /// Load view settings from a configuration file.
    ///
    /// Format: `<key> = <value>`. Comments and empty lines are ignored, as
    /// are unknown keys and unparseable or non-positive sizes.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            match lhs {
                "users_per_page" => {
                    if let Some(n) = parse_size(rhs) {
                        cfg.users_per_page = n;
                    }
                }
                "groups_per_page" => {
                    if let Some(n) = parse_size(rhs) {
                        cfg.groups_per_page = n;
                    }
                }
                _ => {}
            }
        }
        Some(cfg)
    }

    /// Write the current view settings to a configuration file.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# attitude-manager view settings\n");
        buf.push_str("# Rows per page; presets in the UI: 10, 25, 50, 100\n\n");
        let _ = writeln!(&mut buf, "users_per_page = {}", self.users_per_page);
        let _ = writeln!(&mut buf, "groups_per_page = {}", self.groups_per_page);
        std::fs::write(path, buf)
    }

    /// Apply the persisted settings to an [`AppState`].
    pub fn apply_to(&self, app: &mut AppState) {
        app.users.set_page_size(self.users_per_page);
        app.groups.set_page_size(self.groups_per_page);
    }
}

fn parse_size(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Next preset page size after `current`, wrapping around.
pub fn next_page_size(current: usize) -> usize {
    match PAGE_SIZES.iter().position(|&p| p == current) {
        Some(i) => PAGE_SIZES[(i + 1) % PAGE_SIZES.len()],
        None => PAGE_SIZES[0],
    }
}

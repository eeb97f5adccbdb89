//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
///
/// Multiple key combinations can map to the same action (e.g. both 'j' and
/// Down move the selection).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Switch between Users and Groups tabs.
    SwitchTab,
    /// Start/enter search mode for the active tab.
    StartSearch,
    /// Reload both lists from the backend.
    Refresh,
    /// Export the current filtered view to a JSON file.
    Export,
    /// Open the edit form for the selected record.
    EditSelection,
    /// Ask to delete the selected record.
    DeleteSelection,
    /// Move up in the current table.
    MoveUp,
    /// Move down in the current table.
    MoveDown,
    /// Previous page of results.
    PrevPage,
    /// Next page of results.
    NextPage,
    /// Cycle the page size through the panel's presets.
    CyclePageSize,
    /// Show/hide the raw-response pane (dev mode).
    ToggleResponsePane,
    /// Display the help reference.
    OpenHelp,
    /// Ignore this key.
    Ignore,
}

/// Manages keybinding configuration and key-to-action resolution.
///
/// The keymap uses a canonical mapping from `(KeyModifiers, KeyCode)` pairs
/// to [`KeyAction`]s, loaded from `keybinds.conf` with defaults as fallback.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: std::collections::HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Create a keymap with default keybindings: arrow keys plus vim-style
    /// hjkl for navigation, and single-letter mnemonics for the rest.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = std::collections::HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('e')), KeyAction::Export);
        bindings.insert((M::NONE, Char('p')), KeyAction::CyclePageSize);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, KeyCode::Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Tab), KeyAction::SwitchTab);
        // Shift+Tab is BackTab in crossterm; some terminals report the
        // modifier, some don't.
        bindings.insert((M::NONE, BackTab), KeyAction::SwitchTab);
        bindings.insert((M::SHIFT, BackTab), KeyAction::SwitchTab);
        bindings.insert((M::SHIFT, Tab), KeyAction::SwitchTab);

        bindings.insert((M::NONE, Enter), KeyAction::EditSelection);
        // Navigation
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        // Vim-like keys
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        // Response pane toggle (Shift+R variants across terminals)
        bindings.insert((M::SHIFT, Char('r')), KeyAction::ToggleResponsePane);
        bindings.insert((M::SHIFT, Char('R')), KeyAction::ToggleResponsePane);
        bindings.insert((M::NONE, Char('R')), KeyAction::ToggleResponsePane);

        // Page keys
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);

        Self { bindings }
    }

    /// Load a keymap from a file, or create defaults if the file doesn't exist.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("keybinds.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Load a keymap from a configuration file.
    ///
    /// The file uses `<Action> = <KeySpec>` (or the legacy reversed form).
    /// Defaults are taken first, then overridden by user bindings.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
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
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
        }
        Some(map)
    }

    /// Write the current keymap to a configuration file.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# attitude-manager keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete, /, r, e, p, j, k, h, l\n");
        buf.push_str("# Actions: Quit, SwitchTab, StartSearch, Refresh, Export, EditSelection, DeleteSelection, MoveUp, MoveDown, PrevPage, NextPage, CyclePageSize, ToggleResponsePane, OpenHelp, Ignore\n\n");

        // Emit a stable, readable subset of current bindings
        let dump = [
            ("q", KeyAction::Quit),
            ("Esc", KeyAction::Ignore),
            ("/", KeyAction::StartSearch),
            ("r", KeyAction::Refresh),
            ("e", KeyAction::Export),
            ("p", KeyAction::CyclePageSize),
            ("Tab", KeyAction::SwitchTab),
            ("?", KeyAction::OpenHelp),
            ("Enter", KeyAction::EditSelection),
            ("Delete", KeyAction::DeleteSelection),
            ("Up", KeyAction::MoveUp),
            ("Down", KeyAction::MoveDown),
            ("Left", KeyAction::PrevPage),
            ("Right", KeyAction::NextPage),
            ("j", KeyAction::MoveDown),
            ("k", KeyAction::MoveUp),
            ("h", KeyAction::PrevPage),
            ("l", KeyAction::NextPage),
            ("PageUp", KeyAction::PrevPage),
            ("PageDown", KeyAction::NextPage),
        ];
        for (k, a) in dump {
            let _ = writeln!(&mut buf, "{} = {}", format_action(a), k);
        }

        std::fs::write(path, buf)
    }

    /// Resolve a key event to its corresponding action, if any.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Format a key (modifiers + code) into a human-readable spec like "Ctrl+q".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char('/') => "/".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let mut rest = s;
    let mut mods = KeyModifiers::NONE;
    if let Some(after) = s.strip_prefix("Ctrl+") {
        mods |= KeyModifiers::CONTROL;
        rest = after;
    }
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "/" => Char('/'),
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let chars: Vec<char> = rest.chars().collect();
            if chars.len() == 1 {
                KeyCode::Char(chars[0])
            } else {
                return None;
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    match s.trim() {
        "Quit" => Some(KeyAction::Quit),
        "SwitchTab" => Some(KeyAction::SwitchTab),
        "StartSearch" => Some(KeyAction::StartSearch),
        "Refresh" => Some(KeyAction::Refresh),
        "Export" => Some(KeyAction::Export),
        "EditSelection" => Some(KeyAction::EditSelection),
        "DeleteSelection" => Some(KeyAction::DeleteSelection),
        "MoveUp" => Some(KeyAction::MoveUp),
        "MoveDown" => Some(KeyAction::MoveDown),
        "PrevPage" => Some(KeyAction::PrevPage),
        "NextPage" => Some(KeyAction::NextPage),
        "CyclePageSize" => Some(KeyAction::CyclePageSize),
        "ToggleResponsePane" => Some(KeyAction::ToggleResponsePane),
        "OpenHelp" => Some(KeyAction::OpenHelp),
        "Ignore" => Some(KeyAction::Ignore),
        _ => None,
    }
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::SwitchTab => "SwitchTab",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::Refresh => "Refresh",
        KeyAction::Export => "Export",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PrevPage => "PrevPage",
        KeyAction::NextPage => "NextPage",
        KeyAction::CyclePageSize => "CyclePageSize",
        KeyAction::ToggleResponsePane => "ToggleResponsePane",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::Ignore => "Ignore",
    }
}

//! Keyboard dispatch.
//!
//! Keystrokes resolve to value-typed [`Action`]s through explicit binding
//! tables, one per scope. The list scope (navigation, selection, triage
//! actions) can be disabled wholesale while a dialog is open; the global
//! scope (command palette, help, escape) stays active regardless.
//!
//! Rebinding replaces an entire scope's table at once and dispatch hands
//! back an `Action` for the orchestrator to apply, so there is no stored
//! callback whose identity could go stale between renders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A keyboard key. Only the keys the dashboard binds are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Char(char),
    Up,
    Down,
    Enter,
    Escape,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Esc"),
        }
    }
}

/// Modifier state for a keystroke. `command` is Cmd on macOS and Ctrl
/// elsewhere (the "mod" chord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn command() -> Self {
        Self {
            command: true,
            shift: false,
        }
    }

    pub fn shift() -> Self {
        Self {
            command: false,
            shift: true,
        }
    }
}

/// A single keystroke: key plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keystroke {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl Keystroke {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn key(key: Key) -> Self {
        Self::new(key, Modifiers::none())
    }

    pub fn char(c: char) -> Self {
        Self::key(Key::Char(c))
    }

    pub fn command(key: Key) -> Self {
        Self::new(key, Modifiers::command())
    }

    pub fn shift(key: Key) -> Self {
        Self::new(key, Modifiers::shift())
    }
}

/// Named dashboard action a keystroke resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveUp,
    MoveDown,
    ToggleSelect,
    SelectAll,
    OpenFocused,
    Dismiss,
    Blacklist,
    Reply,
    CommandPalette,
    ShowHelp,
    Escape,
}

/// Binding scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Navigation, selection, and triage bindings; gateable.
    List,
    /// Always-on bindings (palette, help, escape).
    Global,
}

/// Scoped keystroke-to-action tables.
#[derive(Debug, Clone)]
pub struct Keymap {
    list: HashMap<Keystroke, Action>,
    global: HashMap<Keystroke, Action>,
    list_enabled: bool,
}

impl Keymap {
    /// Keymap with the default bindings registered.
    pub fn new() -> Self {
        let mut keymap = Self {
            list: HashMap::new(),
            global: HashMap::new(),
            list_enabled: true,
        };
        keymap.rebind(Scope::List, default_list_bindings());
        keymap.rebind(Scope::Global, default_global_bindings());
        keymap
    }

    /// Replaces a scope's entire binding table.
    pub fn rebind(&mut self, scope: Scope, bindings: Vec<(Keystroke, Action)>) {
        let table = match scope {
            Scope::List => &mut self.list,
            Scope::Global => &mut self.global,
        };
        table.clear();
        table.extend(bindings);
    }

    /// Enables or disables the list scope (e.g. while a modal is open).
    pub fn set_list_enabled(&mut self, enabled: bool) {
        self.list_enabled = enabled;
    }

    pub fn list_enabled(&self) -> bool {
        self.list_enabled
    }

    /// Resolves a keystroke to an action. List bindings win when the
    /// scope is enabled; global bindings always apply.
    pub fn resolve(&self, keystroke: Keystroke) -> Option<Action> {
        if self.list_enabled {
            if let Some(action) = self.list.get(&keystroke) {
                return Some(*action);
            }
        }
        self.global.get(&keystroke).copied()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

fn default_list_bindings() -> Vec<(Keystroke, Action)> {
    vec![
        (Keystroke::char('j'), Action::MoveDown),
        (Keystroke::key(Key::Down), Action::MoveDown),
        (Keystroke::char('k'), Action::MoveUp),
        (Keystroke::key(Key::Up), Action::MoveUp),
        (Keystroke::char('x'), Action::ToggleSelect),
        (Keystroke::command(Key::Char('a')), Action::SelectAll),
        (Keystroke::char('d'), Action::Dismiss),
        (Keystroke::char('b'), Action::Blacklist),
        (Keystroke::char('r'), Action::Reply),
        (Keystroke::key(Key::Enter), Action::OpenFocused),
        (Keystroke::char('o'), Action::OpenFocused),
    ]
}

fn default_global_bindings() -> Vec<(Keystroke, Action)> {
    vec![
        (Keystroke::command(Key::Char('k')), Action::CommandPalette),
        (Keystroke::shift(Key::Char('/')), Action::ShowHelp),
        (Keystroke::key(Key::Escape), Action::Escape),
    ]
}

/// One row of the shortcuts help dialog.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutHelp {
    pub keys: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

/// Reference table for the shortcuts help surface.
pub const SHORTCUT_HELP: [ShortcutHelp; 11] = [
    ShortcutHelp { keys: "j / ↓", description: "Move down", category: "Navigation" },
    ShortcutHelp { keys: "k / ↑", description: "Move up", category: "Navigation" },
    ShortcutHelp { keys: "Enter / o", description: "Open email", category: "Navigation" },
    ShortcutHelp { keys: "Esc", description: "Close / Clear selection", category: "Navigation" },
    ShortcutHelp { keys: "x", description: "Toggle selection", category: "Selection" },
    ShortcutHelp { keys: "mod+A", description: "Select all", category: "Selection" },
    ShortcutHelp { keys: "d", description: "Dismiss selected", category: "Actions" },
    ShortcutHelp { keys: "b", description: "Blacklist sender", category: "Actions" },
    ShortcutHelp { keys: "r", description: "Reply / Generate draft", category: "Actions" },
    ShortcutHelp { keys: "mod+K", description: "Open command palette", category: "Global" },
    ShortcutHelp { keys: "?", description: "Show shortcuts", category: "Global" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_list_bindings_resolve() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(Keystroke::char('j')), Some(Action::MoveDown));
        assert_eq!(keymap.resolve(Keystroke::key(Key::Down)), Some(Action::MoveDown));
        assert_eq!(keymap.resolve(Keystroke::char('k')), Some(Action::MoveUp));
        assert_eq!(keymap.resolve(Keystroke::char('d')), Some(Action::Dismiss));
        assert_eq!(
            keymap.resolve(Keystroke::command(Key::Char('a'))),
            Some(Action::SelectAll)
        );
        assert_eq!(
            keymap.resolve(Keystroke::key(Key::Enter)),
            Some(Action::OpenFocused)
        );
    }

    #[test]
    fn unbound_keystrokes_resolve_to_none() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(Keystroke::char('z')), None);
        // Bare 'a' is unbound; only mod+a selects all.
        assert_eq!(keymap.resolve(Keystroke::char('a')), None);
    }

    #[test]
    fn disabling_list_scope_keeps_global_alive() {
        let mut keymap = Keymap::new();
        keymap.set_list_enabled(false);

        assert_eq!(keymap.resolve(Keystroke::char('j')), None);
        assert_eq!(keymap.resolve(Keystroke::char('d')), None);

        assert_eq!(
            keymap.resolve(Keystroke::command(Key::Char('k'))),
            Some(Action::CommandPalette)
        );
        assert_eq!(
            keymap.resolve(Keystroke::shift(Key::Char('/'))),
            Some(Action::ShowHelp)
        );
        assert_eq!(
            keymap.resolve(Keystroke::key(Key::Escape)),
            Some(Action::Escape)
        );
    }

    #[test]
    fn rebind_replaces_the_whole_table() {
        let mut keymap = Keymap::new();
        keymap.rebind(
            Scope::List,
            vec![(Keystroke::char('n'), Action::MoveDown)],
        );

        assert_eq!(keymap.resolve(Keystroke::char('n')), Some(Action::MoveDown));
        // Old bindings are gone, not merged.
        assert_eq!(keymap.resolve(Keystroke::char('j')), None);
        assert_eq!(keymap.resolve(Keystroke::char('d')), None);
        // Global scope is untouched.
        assert_eq!(
            keymap.resolve(Keystroke::key(Key::Escape)),
            Some(Action::Escape)
        );
    }

    #[test]
    fn modifiers_distinguish_bindings() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.resolve(Keystroke::command(Key::Char('k'))),
            Some(Action::CommandPalette)
        );
        assert_eq!(keymap.resolve(Keystroke::char('k')), Some(Action::MoveUp));
    }

    #[test]
    fn help_table_covers_every_action_once() {
        let categories: Vec<&str> = SHORTCUT_HELP.iter().map(|s| s.category).collect();
        assert!(categories.contains(&"Navigation"));
        assert!(categories.contains(&"Selection"));
        assert!(categories.contains(&"Actions"));
        assert!(categories.contains(&"Global"));
    }
}

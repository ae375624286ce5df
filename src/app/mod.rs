//! Interaction engines and the dashboard orchestrator.
//!
//! Each engine (selection, navigation, filtering, grouping, keymap,
//! date cursor) is plain in-memory state with no remote side effects;
//! [`Dashboard`] composes them and owns every store mutation.

mod dashboard;
mod dates;
mod filter;
mod grouping;
mod keymap;
mod navigation;
mod selection;

pub use dashboard::{Dashboard, Notice};
pub use dates::{parse_date, DateCursor};
pub use filter::{facet_counts, FacetCounts, FilterState};
pub use grouping::{flat_email_list, group_by_priority, PriorityGroup};
pub use keymap::{
    Action, Key, Keymap, Keystroke, Modifiers, Scope, ShortcutHelp, SHORTCUT_HELP,
};
pub use navigation::NavigationState;
pub use selection::SelectionState;

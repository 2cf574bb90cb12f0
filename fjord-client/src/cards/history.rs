// Session history model (pushState / popstate semantics).

use serde::{Deserialize, Serialize};

/// State payload stored with each history entry: `{ page: <card id> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub page: String,
}

impl NavigationState {
    pub fn new(page: impl Into<String>) -> Self {
        Self { page: page.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: Option<NavigationState>,
    pub fragment: String,
}

pub trait History {
    /// Append an entry after the current one, discarding any forward entries.
    fn push_state(&mut self, state: NavigationState, fragment: &str);

    /// Overwrite the current entry in place.
    fn replace_state(&mut self, state: Option<NavigationState>, fragment: &str);

    fn current(&self) -> Option<&HistoryEntry>;

    /// Step back one entry. Returns the restored entry's state (the popstate payload), or
    /// `None` when already at the first entry.
    fn back(&mut self) -> Option<Option<NavigationState>>;

    /// Step forward one entry; mirror of `back`.
    fn forward(&mut self) -> Option<Option<NavigationState>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl MemoryHistory {
    /// Start a session at a page whose URL fragment is `fragment` (e.g. `""` or `"#thanks"`).
    pub fn new(fragment: &str) -> Self {
        Self {
            entries: vec![HistoryEntry {
                state: None,
                fragment: fragment.to_string(),
            }],
            cursor: 0,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn push_state(&mut self, state: NavigationState, fragment: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            state: Some(state),
            fragment: fragment.to_string(),
        });
        self.cursor = self.entries.len() - 1;
    }

    fn replace_state(&mut self, state: Option<NavigationState>, fragment: &str) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.state = state;
            entry.fragment = fragment.to_string();
        }
    }

    fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    fn back(&mut self) -> Option<Option<NavigationState>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(|e| e.state.clone())
    }

    fn forward(&mut self) -> Option<Option<NavigationState>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(|e| e.state.clone())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// True for legacy numeric fragments (`#3`) left over from index-based wizards.
pub fn is_numeric_fragment(fragment: &str) -> bool {
    match fragment.strip_prefix('#') {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Wipe a legacy numeric fragment from the current entry.
pub fn normalize_fragment(history: &mut dyn History) {
    let numeric = history
        .current()
        .map(|e| is_numeric_fragment(&e.fragment))
        .unwrap_or(false);
    if numeric {
        history.replace_state(None, "#");
    }
}

// Navigable history.
// Mirrors the active section into a back/forward stack of paths.

/// A browser-style history: a current path that can be pushed or replaced.
pub trait History {
    /// Current path, or `None` when no history is available.
    fn current_path(&self) -> Option<String>;

    /// Add a new entry after the current one, dropping any forward entries.
    fn push(&mut self, path: &str);

    /// Overwrite the current entry.
    fn replace(&mut self, path: &str);
}

/// No history at all. Every sync is a no-op.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

#[cfg(test)]
impl History for NoHistory {
    fn current_path(&self) -> Option<String> {
        None
    }

    fn push(&mut self, _path: &str) {}

    fn replace(&mut self, _path: &str) {}
}

/// In-memory history with back/forward traversal.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    /// Start with a single entry at `initial`.
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            index: 0,
        }
    }

    /// Step back one entry, returning the new current path.
    pub fn back(&mut self) -> Option<String> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward one entry, returning the new current path.
    pub fn forward(&mut self) -> Option<String> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> Option<String> {
        self.entries.get(self.index).cloned()
    }

    fn push(&mut self, path: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, path: &str) {
        self.entries[self.index] = path.to_string();
    }
}

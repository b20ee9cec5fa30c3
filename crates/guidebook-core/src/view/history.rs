/// Back/forward history of location fragments, with browser semantics.
///
/// Starts at a single entry. Pushing after going back drops the forward
/// entries; pushing the current fragment again is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if fragment == self.current() {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment);
        self.cursor += 1;
    }

    /// Move back one entry, returning the fragment now current.
    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Move forward one entry, returning the fragment now current.
    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("")
    }
}

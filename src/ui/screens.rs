/// Filterable list used for album, song, and entry selection.
pub(crate) struct PickerState {
    pub(crate) title: String,
    items: Vec<String>,
    /// Indices into `items` that match the filter.
    pub(crate) visible: Vec<usize>,
    pub(crate) filter: String,
    pub(crate) selected: usize,
}

impl PickerState {
    pub(crate) fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        let mut picker = Self {
            title: title.into(),
            visible: Vec::new(),
            items,
            filter: String::new(),
            selected: 0,
        };
        picker.apply_filter();
        picker
    }

    /// Start with the cursor on `current` when it is in the list.
    pub(crate) fn with_current(mut self, current: Option<&str>) -> Self {
        if let Some(current) = current {
            if let Some(pos) = self
                .visible
                .iter()
                .position(|&i| self.items[i] == current)
            {
                self.selected = pos;
            }
        }
        self
    }

    pub(crate) fn apply_filter(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.ensure_in_bounds();
    }

    pub(crate) fn push_filter(&mut self, ch: char) {
        if !ch.is_control() {
            self.filter.push(ch);
            self.apply_filter();
        }
    }

    pub(crate) fn pop_filter(&mut self) {
        self.filter.pop();
        self.apply_filter();
    }

    pub(crate) fn visible_items(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(|&i| self.items[i].as_str())
    }

    /// Index into the unfiltered item list of the highlighted row.
    pub(crate) fn current_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    pub(crate) fn current(&self) -> Option<&str> {
        self.current_index().map(|i| self.items[i].as_str())
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }
}

/// Scrollable cursor over the recorded setlist ("Edit Previous Songs").
#[derive(Default)]
pub(crate) struct SetlistScreen {
    pub(crate) selected: usize,
}

impl SetlistScreen {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Cursor over projected timeline events.
#[derive(Default)]
pub(crate) struct TimelineScreen {
    pub(crate) selected: usize,
}

impl TimelineScreen {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }
}

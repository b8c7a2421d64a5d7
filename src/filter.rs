/// Incremental substring filter over a fixed set of lines.
///
/// Holds the original lines immutably and recomputes the filtered view in
/// full on every pattern change. The selection is an index into the filtered
/// view: movement clamps to the view bounds, and a pattern change that
/// strands the selection out of bounds resets it to the top.
///
/// Every operation is total - an empty line set, a pattern that matches
/// nothing, and an oversized move delta all produce well-defined results.
pub struct FilterEngine {
    original_lines: Vec<String>,
    filtered_lines: Vec<String>,
    selected_index: usize,
    pattern: String,
    case_sensitive: bool,
}

impl FilterEngine {
    pub fn new(lines: Vec<String>, case_sensitive: bool) -> Self {
        Self {
            filtered_lines: lines.clone(),
            original_lines: lines,
            selected_index: 0,
            pattern: String::new(),
            case_sensitive,
        }
    }

    /// Replace the search pattern and rebuild the filtered view with a full
    /// scan of the original lines. Returns the line now selected, or the
    /// empty string when nothing matches.
    ///
    /// An empty pattern restores the full original set and resets the
    /// selection to the top.
    pub fn update_filter(&mut self, pattern: &str) -> &str {
        self.pattern = pattern.to_string();

        if pattern.is_empty() {
            self.filtered_lines = self.original_lines.clone();
            self.selected_index = 0;
        } else {
            let needle = if self.case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            };
            let case_sensitive = self.case_sensitive;

            let filtered: Vec<String> = self
                .original_lines
                .iter()
                .filter(|line| {
                    if case_sensitive {
                        line.contains(needle.as_str())
                    } else {
                        line.to_lowercase().contains(needle.as_str())
                    }
                })
                .cloned()
                .collect();
            self.filtered_lines = filtered;

            // Selection survives a pattern change only while still in bounds
            if self.selected_index >= self.filtered_lines.len() {
                self.selected_index = 0;
            }
        }

        self.selected_line()
    }

    /// The currently selected line, or the empty string when the filtered
    /// view is empty. No side effects.
    pub fn selected_line(&self) -> &str {
        self.filtered_lines
            .get(self.selected_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Move the selection by `delta`, clamped to the filtered view bounds.
    /// Returns the empty string and leaves the state untouched when the
    /// filtered view is empty.
    pub fn move_selection(&mut self, delta: i64) -> &str {
        if self.filtered_lines.is_empty() {
            return "";
        }

        let last = (self.filtered_lines.len() - 1) as i64;
        let target = (self.selected_index as i64).saturating_add(delta).clamp(0, last);
        self.selected_index = target as usize;

        self.selected_line()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn filtered_lines(&self) -> &[String] {
        &self.filtered_lines
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered_lines.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }
}

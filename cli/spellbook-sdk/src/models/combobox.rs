//! Multi-select combobox with a free-text filter.
//!
//! The combobox owns its selection,
//! there is no second copy of the selected labels anywhere else.

use std::time::{Duration, Instant};

/// Delay between losing focus and closing the option list,
/// so that a click on an option isn't lost to the blur that precedes it.
pub const BLUR_CLOSE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Combobox {
    options: Vec<String>,
    selected: Vec<String>,
    filter: String,
    open: bool,
    close_at: Option<Instant>,
}

impl Combobox {
    pub fn new<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Preselect labels, e.g. from previously submitted criteria.
    ///
    /// Labels are kept even if they are not among the options,
    /// so a selection survives an option list that failed to load.
    pub fn with_selected<S: Into<String>>(mut self, selected: impl IntoIterator<Item = S>) -> Self {
        for label in selected {
            let label = label.into();
            if !self.selected.contains(&label) {
                self.selected.push(label);
            }
        }
        self
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Options that can still be picked.
    ///
    /// Selected labels are never offered.
    /// The filter matches case-insensitively anywhere in the label.
    pub fn visible_options(&self) -> Vec<&str> {
        let filter = self.filter.to_lowercase();
        self.options
            .iter()
            .filter(|option| !self.selected.contains(option))
            .filter(|option| option.to_lowercase().contains(&filter))
            .map(String::as_str)
            .collect()
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Add an option to the selection, clear the filter and close the list.
    ///
    /// Returns false if the label isn't an option or already selected.
    pub fn select(&mut self, label: &str) -> bool {
        if !self.options.iter().any(|option| option == label) || self.is_selected(label) {
            return false;
        }
        self.selected.push(label.to_string());
        self.filter.clear();
        self.close();
        true
    }

    /// Drop a label from the selection, offering it again.
    pub fn remove(&mut self, label: &str) -> bool {
        let len_before = self.selected.len();
        self.selected.retain(|selected| selected != label);
        self.filter.clear();
        self.selected.len() != len_before
    }

    pub fn is_selected(&self, label: &str) -> bool {
        self.selected.iter().any(|selected| selected == label)
    }

    pub fn focus(&mut self) {
        self.open = true;
        self.close_at = None;
    }

    /// Schedule closing the list, see [BLUR_CLOSE_DELAY].
    pub fn blur(&mut self, now: Instant) {
        if self.open {
            self.close_at = Some(now + BLUR_CLOSE_DELAY);
        }
    }

    /// Apply a scheduled close once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.close_at.is_some_and(|deadline| now >= deadline) {
            self.close();
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.close_at = None;
    }

    pub fn into_selected(self) -> Vec<String> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn colors() -> Combobox {
        Combobox::new(["Red", "White", "Blue", "Black"])
    }

    #[test]
    fn selected_options_are_not_offered() {
        let mut combobox = colors();
        assert!(combobox.select("Blue"));

        assert_eq!(combobox.visible_options(), ["Red", "White", "Black"]);
        assert_eq!(combobox.selected(), ["Blue"]);
    }

    #[test]
    fn removing_offers_option_again() {
        let mut combobox = colors();
        combobox.select("Blue");
        combobox.select("Red");

        assert!(combobox.remove("Blue"));
        assert_eq!(combobox.selected(), ["Red"]);
        assert!(combobox.visible_options().contains(&"Blue"));
        assert!(!combobox.remove("Blue"));
    }

    #[test]
    fn select_rejects_unknown_and_duplicates() {
        let mut combobox = colors();
        assert!(!combobox.select("Green"));
        assert!(combobox.select("Red"));
        assert!(!combobox.select("Red"));
        assert_eq!(combobox.selected(), ["Red"]);
    }

    #[test]
    fn filter_narrows_and_is_cleared_by_select() {
        let mut combobox = colors();
        combobox.set_filter("bl");
        assert_eq!(combobox.visible_options(), ["Blue", "Black"]);

        combobox.select("Black");
        assert_eq!(combobox.filter(), "");
        assert_eq!(combobox.visible_options(), ["Red", "White", "Blue"]);
    }

    #[test]
    fn remove_clears_filter() {
        let mut combobox = colors();
        combobox.select("Red");
        combobox.set_filter("wh");
        combobox.remove("Red");
        assert_eq!(combobox.filter(), "");
    }

    #[test]
    fn preselected_labels_survive_missing_options() {
        let combobox = Combobox::new(Vec::<String>::new()).with_selected(["Goblin", "Goblin"]);
        assert_eq!(combobox.selected(), ["Goblin"]);
        assert!(combobox.visible_options().is_empty());
    }

    #[test]
    fn blur_closes_after_delay() {
        let mut combobox = colors();
        let now = Instant::now();
        combobox.focus();
        combobox.blur(now);

        combobox.tick(now + BLUR_CLOSE_DELAY / 2);
        assert!(combobox.is_open());

        combobox.tick(now + BLUR_CLOSE_DELAY);
        assert!(!combobox.is_open());
    }

    /// A click landing between blur and close still selects
    #[test]
    fn select_during_pending_close() {
        let mut combobox = colors();
        let now = Instant::now();
        combobox.focus();
        combobox.blur(now);

        assert!(combobox.select("White"));
        assert!(!combobox.is_open());
        assert_eq!(combobox.selected(), ["White"]);
    }

    #[test]
    fn focus_cancels_pending_close() {
        let mut combobox = colors();
        let now = Instant::now();
        combobox.focus();
        combobox.blur(now);
        combobox.focus();

        combobox.tick(now + BLUR_CLOSE_DELAY * 2);
        assert!(combobox.is_open());
    }
}

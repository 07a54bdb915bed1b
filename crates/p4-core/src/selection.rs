//! Selection algebra for the media grid

use serde::Serialize;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// Any modifier that turns a click into a multi-select gesture.
    pub fn is_multi(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Contiguous inclusive range between the smallest and largest index.
pub fn range_fill(indexes: &[usize]) -> Vec<usize> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => (min..=max).collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    selected: Vec<usize>,
    bulk_mode_enabled: bool,
    is_multi_selecting: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected indexes in selection order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn bulk_mode_enabled(&self) -> bool {
        self.bulk_mode_enabled
    }

    pub fn is_multi_selecting(&self) -> bool {
        self.is_multi_selecting
    }

    /// Apply a click on `index`. `imported` tells whether that item already
    /// has a remote id. Returns false when the click was ignored.
    pub fn click(&mut self, index: usize, imported: bool, modifiers: Modifiers) -> bool {
        if self.bulk_mode_enabled && imported {
            return false;
        }

        self.is_multi_selecting = modifiers.is_multi();

        if modifiers.shift {
            let mut span = self.selected.clone();
            span.push(index);
            self.selected = range_fill(&span);
        } else if modifiers.ctrl || modifiers.meta || self.bulk_mode_enabled {
            self.toggle(index);
        } else {
            self.selected = vec![index];
        }
        true
    }

    fn toggle(&mut self, index: usize) {
        if let Some(pos) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(pos);
        } else {
            self.selected.push(index);
        }
    }

    /// Switch bulk mode. Any change clears the selection; returns whether
    /// the mode changed.
    pub fn set_bulk_mode(&mut self, enabled: bool) -> bool {
        if self.bulk_mode_enabled == enabled {
            return false;
        }
        self.bulk_mode_enabled = enabled;
        self.is_multi_selecting = false;
        self.selected.clear();
        true
    }

    /// Keep only the selected indexes `keep` accepts.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        self.selected.retain(|&i| keep(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(selected: &[usize]) -> SelectionState {
        SelectionState {
            selected: selected.to_vec(),
            ..SelectionState::default()
        }
    }

    #[test]
    fn test_range_fill() {
        assert_eq!(range_fill(&[7, 2, 5]), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(range_fill(&[4]), vec![4]);
        assert!(range_fill(&[]).is_empty());
        // Descending input is sorted before taking the bounds.
        assert_eq!(range_fill(&[9, 6]), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_shift_click_fills_gaps() {
        let mut s = state(&[2, 5]);
        assert!(s.click(7, false, Modifiers::shift()));
        assert_eq!(s.selected(), &[2, 3, 4, 5, 6, 7]);
        assert!(s.is_multi_selecting());
    }

    #[test]
    fn test_shift_click_below_selection() {
        let mut s = state(&[5, 8]);
        s.click(1, false, Modifiers::shift());
        assert_eq!(s.selected(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_shift_click_on_empty_selection() {
        let mut s = SelectionState::new();
        s.click(4, false, Modifiers::shift());
        assert_eq!(s.selected(), &[4]);
    }

    #[test]
    fn test_ctrl_click_toggles_one_index() {
        let mut s = state(&[1, 3, 6]);
        s.click(3, false, Modifiers::ctrl());
        assert_eq!(s.selected(), &[1, 6]);
        s.click(4, false, Modifiers::meta());
        assert_eq!(s.selected(), &[1, 6, 4]);
    }

    #[test]
    fn test_plain_click_replaces() {
        let mut s = state(&[1, 3]);
        s.click(9, false, Modifiers::NONE);
        assert_eq!(s.selected(), &[9]);
        assert!(!s.is_multi_selecting());
    }

    #[test]
    fn test_bulk_mode_plain_click_toggles() {
        let mut s = SelectionState::new();
        s.set_bulk_mode(true);
        s.click(2, false, Modifiers::NONE);
        s.click(5, false, Modifiers::NONE);
        assert_eq!(s.selected(), &[2, 5]);
        s.click(2, false, Modifiers::NONE);
        assert_eq!(s.selected(), &[5]);
        assert!(!s.is_multi_selecting());
    }

    #[test]
    fn test_bulk_mode_ignores_imported() {
        let mut s = SelectionState::new();
        s.set_bulk_mode(true);
        s.click(1, false, Modifiers::NONE);
        let before = s.clone();

        for modifiers in [Modifiers::NONE, Modifiers::shift(), Modifiers::ctrl()] {
            assert!(!s.click(4, true, modifiers));
            assert_eq!(s, before);
        }
    }

    #[test]
    fn test_imported_selectable_outside_bulk_mode() {
        let mut s = SelectionState::new();
        assert!(s.click(4, true, Modifiers::NONE));
        assert_eq!(s.selected(), &[4]);
    }

    #[test]
    fn test_retain_keeps_order() {
        let mut s = state(&[6, 2, 3, 9]);
        s.retain(|i| i % 3 == 0);
        assert_eq!(s.selected(), &[6, 3, 9]);
    }

    #[test]
    fn test_bulk_toggle_off_clears() {
        let mut s = SelectionState::new();
        s.set_bulk_mode(true);
        s.click(1, false, Modifiers::NONE);
        s.click(3, false, Modifiers::NONE);
        assert_eq!(s.selected(), &[1, 3]);

        assert!(s.set_bulk_mode(false));
        assert!(s.is_empty());
        assert!(!s.set_bulk_mode(false));
    }
}

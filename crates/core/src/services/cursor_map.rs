//! Page number → cursor bookkeeping for the patient list.
//!
//! Cursors are strictly sequential: the cursor for page `N + 1` is only
//! learned by fetching page `N`. The map therefore always holds a
//! contiguous run of reachable pages starting at page 1, optionally
//! followed by a single [`CursorState::Unreachable`] marker where the
//! result set ended.

use std::collections::BTreeMap;

use crate::ports::Cursor;

/// What is known about the cursor of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// Fetch from the beginning of the result set (page 1).
    Start,
    /// Fetch the records after this cursor.
    Known(Cursor),
    /// The previous page was the last one.
    Unreachable,
}

impl CursorState {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, CursorState::Unreachable)
    }
}

/// Mapping from 1-based page number to its cursor state.
///
/// Pages absent from the map are unknown. Page 1 is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorMap {
    entries: BTreeMap<u32, CursorState>,
}

impl Default for CursorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorMap {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(1, CursorState::Start);
        Self { entries }
    }

    /// Forget everything but page 1.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.insert(1, CursorState::Start);
    }

    /// State of `page`, `None` when unknown.
    pub fn get(&self, page: u32) -> Option<&CursorState> {
        self.entries.get(&page)
    }

    /// The `after` argument needed to fetch `page`.
    ///
    /// Returns `None` when the page cannot be fetched directly (unknown or
    /// past the end), `Some(None)` for page 1.
    pub fn after_for(&self, page: u32) -> Option<Option<&Cursor>> {
        match self.entries.get(&page)? {
            CursorState::Start => Some(None),
            CursorState::Known(cursor) => Some(Some(cursor)),
            CursorState::Unreachable => None,
        }
    }

    /// Whether `page` can be fetched without a forward-fill sequence.
    pub fn is_known(&self, page: u32) -> bool {
        self.after_for(page).is_some()
    }

    /// Highest page whose cursor is known.
    pub fn max_known_page(&self) -> u32 {
        self.entries
            .iter()
            .rev()
            .find(|(_, state)| state.is_reachable())
            .map(|(page, _)| *page)
            .unwrap_or(1)
    }

    /// Last page of the result set, once a fetch has reported the end.
    pub fn last_page(&self) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, state)| !state.is_reachable())
            .map(|(page, _)| page - 1)
    }

    /// Record the outcome of a successful fetch of `page`.
    ///
    /// `next` is the cursor returned for the following page, `None` when the
    /// result set ended. Calls for pages that are not reachable are ignored.
    pub fn record_fetch(&mut self, page: u32, next: Option<Cursor>) {
        if !self.is_known(page) {
            return;
        }
        match next {
            Some(cursor) => {
                self.entries.insert(page + 1, CursorState::Known(cursor));
            }
            None => {
                self.truncate_after(page);
                self.entries.insert(page + 1, CursorState::Unreachable);
            }
        }
    }

    /// Drop every entry for pages after `page`.
    pub fn truncate_after(&mut self, page: u32) {
        self.entries.retain(|p, _| *p <= page.max(1));
    }

    /// Number of entries, unknown pages excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &CursorState)> {
        self.entries.iter().map(|(page, state)| (*page, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(v: usize) -> Cursor {
        Cursor::from_offset(v)
    }

    #[test]
    fn test_new_map_only_knows_page_one() {
        let map = CursorMap::new();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(1), Some(&CursorState::Start));
        assert_eq!(map.after_for(1), Some(None));
        assert_eq!(map.get(2), None);
        assert_eq!(map.max_known_page(), 1);
    }

    #[test]
    fn test_record_fetch_learns_next_page() {
        let mut map = CursorMap::new();
        map.record_fetch(1, Some(cursor(9)));
        map.record_fetch(2, Some(cursor(19)));

        assert_eq!(map.after_for(3), Some(Some(&cursor(19))));
        assert_eq!(map.max_known_page(), 3);
        assert_eq!(map.last_page(), None);
    }

    // Fin des résultats: la page suivante devient inatteignable
    #[test]
    fn test_end_of_results_marks_unreachable() {
        let mut map = CursorMap::new();
        map.record_fetch(1, Some(cursor(9)));
        map.record_fetch(2, Some(cursor(19)));
        map.record_fetch(3, None);

        assert_eq!(map.get(4), Some(&CursorState::Unreachable));
        assert!(!map.is_known(4));
        assert_eq!(map.max_known_page(), 3);
        assert_eq!(map.last_page(), Some(3));
    }

    #[test]
    fn test_end_of_results_drops_stale_tail() {
        let mut map = CursorMap::new();
        map.record_fetch(1, Some(cursor(9)));
        map.record_fetch(2, Some(cursor(19)));
        map.record_fetch(3, Some(cursor(29)));

        // Le jeu de résultats a rétréci: la page 1 est maintenant la dernière
        map.record_fetch(1, None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(2), Some(&CursorState::Unreachable));
        assert_eq!(map.get(3), None);
    }

    // Ne jamais enregistrer de curseur pour une page qu'on ne sait pas atteindre
    #[test]
    fn test_record_fetch_ignores_unknown_pages() {
        let mut map = CursorMap::new();
        map.record_fetch(5, Some(cursor(49)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(6), None);
    }

    #[test]
    fn test_reset_and_truncate_keep_page_one() {
        let mut map = CursorMap::new();
        map.record_fetch(1, Some(cursor(9)));
        map.record_fetch(2, Some(cursor(19)));

        map.truncate_after(0);
        assert_eq!(map, CursorMap::new());

        map.record_fetch(1, Some(cursor(9)));
        map.reset();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(1, &CursorState::Start)]);
    }
}

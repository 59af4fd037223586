use chrono::NaiveDate;

use crate::{
    codec::{self, AppState},
    domain::{Clock, DayKey, MonthCursor, ViewMode},
    error::{ImportValidationError, StorageError},
    storage::{MemoryStore, StateStore},
};

/// The calendar-placement engine.
///
/// Every operation that changes the cursor, the view or the placements
/// writes the whole state through the store before returning. The selection
/// is never persisted.
pub struct StickerBook {
    state: AppState,
    selection: Option<DayKey>,
    store: Box<dyn StateStore>,
    clock: Box<dyn Clock>,
    storage_available: bool,
}

impl StickerBook {
    pub fn open(store: Box<dyn StateStore>, clock: Box<dyn Clock>) -> Self {
        let defaults = AppState::starting_at(clock.today());

        let (state, storage_available) = match store.load() {
            Ok(Some(text)) => match codec::import_into(&defaults, &text) {
                Ok(state) => (state, true),
                Err(e) => {
                    tracing::warn!(
                        store = %store.describe(),
                        "stored state did not validate, keeping what can be read: {e}"
                    );
                    // The next save overwrites the file; keep the original.
                    if let Err(e) = store.backup() {
                        tracing::warn!("could not back up unreadable state: {e}");
                    }
                    let state = codec::salvage(&defaults, &text).unwrap_or(defaults);
                    (state, true)
                }
            },
            Ok(None) => (defaults, true),
            Err(e) => {
                tracing::warn!("state storage unavailable, keeping this session in memory: {e}");
                (defaults, false)
            }
        };

        let mut book = Self {
            state,
            selection: None,
            store,
            clock,
            storage_available,
        };
        if !book.storage_available {
            book.store = Box::new(MemoryStore::new());
        }
        book
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn cursor(&self) -> MonthCursor {
        self.state.cursor
    }

    pub fn view(&self) -> ViewMode {
        self.state.view
    }

    pub fn selection(&self) -> Option<DayKey> {
        self.selection
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    pub fn sticker_for(&self, key: DayKey) -> Option<&str> {
        self.state.placements.get(key)
    }

    pub fn count_for_month(&self, cursor: MonthCursor) -> usize {
        self.state
            .placements
            .count_for_month(cursor.year(), cursor.month0())
    }

    pub fn shift_month(&mut self, delta: i32) {
        self.state.cursor = self.state.cursor.shifted(delta);
        self.persist();
    }

    pub fn jump_to_today(&mut self) {
        self.state.cursor = MonthCursor::containing(self.clock.today());
        self.persist();
    }

    pub fn toggle_view(&mut self) {
        self.state.view = self.state.view.toggled();
        self.persist();
    }

    pub fn set_month(&mut self, month0: u32) {
        self.state.cursor = self.state.cursor.with_month(month0);
        self.persist();
    }

    pub fn set_year(&mut self, year: i32) {
        self.state.cursor = self.state.cursor.with_year(year);
        self.persist();
    }

    /// Opens an edit on `key`, first moving the cursor to its month and the
    /// view to Month when either differs.
    pub fn select_day(&mut self, key: DayKey) {
        let target = MonthCursor::containing(key.date());
        let mut moved = false;

        if target != self.state.cursor {
            self.state.cursor = target;
            moved = true;
        }
        if self.state.view != ViewMode::Month {
            self.state.view = ViewMode::Month;
            moved = true;
        }
        if moved {
            self.persist();
        }

        self.selection = Some(key);
    }

    pub fn pick_sticker(&mut self, sticker_id: &str) -> bool {
        let Some(key) = self.selection.take() else {
            return false;
        };
        self.state.placements.set(key, sticker_id);
        tracing::debug!(day = %key, sticker = sticker_id, "placed sticker");
        self.persist();
        true
    }

    pub fn remove_selected_sticker(&mut self) -> bool {
        let Some(key) = self.selection.take() else {
            return false;
        };
        self.state.placements.remove(key);
        tracing::debug!(day = %key, "removed sticker");
        self.persist();
        true
    }

    pub fn close_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_sticker(&mut self, key: DayKey, sticker_id: &str) {
        self.state.placements.set(key, sticker_id);
        self.persist();
    }

    pub fn remove_sticker(&mut self, key: DayKey) -> bool {
        let removed = self.state.placements.remove(key).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_year(&mut self, year: i32) -> usize {
        self.backup_before_replace();
        let removed = self.state.placements.clear_year(year);
        tracing::info!(year, removed, "cleared year");
        self.persist();
        removed
    }

    pub fn export(&self) -> Result<String, StorageError> {
        codec::encode(&self.state)
    }

    pub fn export_file_name(&self) -> String {
        codec::export_file_name(self.state.cursor.year())
    }

    /// Validates `text` before touching anything; a rejected document leaves
    /// both memory and storage as they were.
    pub fn import(&mut self, text: &str) -> Result<(), ImportValidationError> {
        let patch = codec::parse_import(text)?;
        self.backup_before_replace();
        self.state = patch.apply_to(&self.state);
        tracing::info!(
            placements = self.state.placements.len(),
            "imported sticker state"
        );
        self.persist();
        Ok(())
    }

    fn backup_before_replace(&self) {
        if !self.storage_available {
            return;
        }
        if let Err(e) = self.store.backup() {
            tracing::warn!("could not back up state: {e}");
        }
    }

    fn persist(&mut self) {
        let encoded = match codec::encode(&self.state) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("could not encode state: {e}");
                return;
            }
        };

        if let Err(e) = self.store.save(&encoded) {
            tracing::warn!(
                store = %self.store.describe(),
                "saving failed, keeping this session in memory: {e}"
            );
            self.storage_available = false;
            self.store = Box::new(MemoryStore::with_contents(encoded));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fs, rc::Rc};

    use tempfile::TempDir;

    use crate::{domain::FixedClock, storage::FileStore};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedStore {
        contents: Rc<RefCell<Option<String>>>,
        writes: Rc<RefCell<usize>>,
    }

    impl SharedStore {
        fn contents(&self) -> Option<String> {
            self.contents.borrow().clone()
        }

        fn writes(&self) -> usize {
            *self.writes.borrow()
        }
    }

    impl StateStore for SharedStore {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Ok(self.contents.borrow().clone())
        }

        fn save(&mut self, contents: &str) -> Result<(), StorageError> {
            *self.contents.borrow_mut() = Some(contents.to_string());
            *self.writes.borrow_mut() += 1;
            Ok(())
        }

        fn describe(&self) -> String {
            "shared".to_string()
        }
    }

    struct FailingStore;

    impl StateStore for FailingStore {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _contents: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable {
                path: "quota".into(),
                source: std::io::Error::other("quota exceeded"),
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn book_with(store: SharedStore) -> StickerBook {
        StickerBook::open(Box::new(store), Box::new(FixedClock(today())))
    }

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_fresh_book_starts_at_today() {
        let book = book_with(SharedStore::default());
        assert_eq!(book.cursor(), MonthCursor::new(2026, 9));
        assert_eq!(book.view(), ViewMode::Month);
        assert!(book.selection().is_none());
        assert!(book.storage_available());
    }

    #[test]
    fn test_navigation_persists_every_step() {
        let store = SharedStore::default();
        let mut book = book_with(store.clone());

        book.shift_month(1);
        book.shift_month(1);
        book.shift_month(1);
        assert_eq!(book.cursor(), MonthCursor::new(2027, 0));
        assert_eq!(store.writes(), 3);

        book.shift_month(-1);
        assert_eq!(book.cursor(), MonthCursor::new(2026, 11));

        book.toggle_view();
        assert_eq!(book.view(), ViewMode::Year);

        book.jump_to_today();
        assert_eq!(book.cursor(), MonthCursor::new(2026, 9));
        assert_eq!(book.view(), ViewMode::Year);

        let reopened = book_with(store.clone());
        assert_eq!(reopened.state(), book.state());
    }

    #[test]
    fn test_set_month_and_year_directly() {
        let mut book = book_with(SharedStore::default());
        book.set_month(1);
        book.set_year(2024);
        assert_eq!(book.cursor(), MonthCursor::new(2024, 1));
    }

    #[test]
    fn test_select_outside_day_retargets_cursor() {
        let store = SharedStore::default();
        let mut book = book_with(store.clone());

        book.select_day(key("2026-11-01"));
        assert_eq!(book.cursor(), MonthCursor::new(2026, 10));
        assert_eq!(book.view(), ViewMode::Month);
        assert_eq!(book.selection(), Some(key("2026-11-01")));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_select_in_month_day_does_not_persist() {
        let store = SharedStore::default();
        let mut book = book_with(store.clone());

        book.select_day(key("2026-10-03"));
        assert_eq!(book.selection(), Some(key("2026-10-03")));
        assert_eq!(store.writes(), 0);

        book.close_selection();
        assert!(book.selection().is_none());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_select_from_year_view_switches_to_month() {
        let mut book = book_with(SharedStore::default());
        book.toggle_view();

        book.select_day(key("2026-03-14"));
        assert_eq!(book.view(), ViewMode::Month);
        assert_eq!(book.cursor(), MonthCursor::new(2026, 2));
    }

    #[test]
    fn test_pick_and_remove_require_selection() {
        let store = SharedStore::default();
        let mut book = book_with(store.clone());

        assert!(!book.pick_sticker("sun"));
        assert!(!book.remove_selected_sticker());
        assert_eq!(store.writes(), 0);

        book.select_day(key("2026-10-05"));
        assert!(book.pick_sticker("sun"));
        assert!(book.selection().is_none());
        assert_eq!(book.sticker_for(key("2026-10-05")), Some("sun"));
        assert!(store.contents().unwrap().contains("\"2026-10-05\": \"sun\""));

        book.select_day(key("2026-10-05"));
        assert!(book.remove_selected_sticker());
        assert_eq!(book.sticker_for(key("2026-10-05")), None);
        assert!(book.selection().is_none());
    }

    #[test]
    fn test_clear_year_and_month_counts() {
        let mut book = book_with(SharedStore::default());
        for day in ["2024-12-31", "2025-01-01", "2025-12-31", "2026-01-01"] {
            book.set_sticker(key(day), "star");
        }
        assert_eq!(book.count_for_month(MonthCursor::new(2025, 11)), 1);

        assert_eq!(book.clear_year(2025), 2);
        assert_eq!(book.sticker_for(key("2024-12-31")), Some("star"));
        assert_eq!(book.sticker_for(key("2026-01-01")), Some("star"));
        assert_eq!(book.count_for_month(MonthCursor::new(2025, 11)), 0);

        assert!(book.remove_sticker(key("2024-12-31")));
        assert!(!book.remove_sticker(key("2024-12-31")));
    }

    #[test]
    fn test_rejected_import_leaves_storage_untouched() {
        let store = SharedStore::default();
        let mut book = book_with(store.clone());
        book.set_sticker(key("2026-10-01"), "moon");
        let before_state = book.state().clone();
        let before_bytes = store.contents();
        let before_writes = store.writes();

        let result = book.import(r#"{"year": 1999, "month": 0, "view": "year"}"#);
        assert!(matches!(
            result,
            Err(ImportValidationError::MissingPlacements)
        ));
        assert_eq!(book.state(), &before_state);
        assert_eq!(store.contents(), before_bytes);
        assert_eq!(store.writes(), before_writes);
    }

    #[test]
    fn test_export_then_import_round_trips() {
        let mut book = book_with(SharedStore::default());
        book.set_sticker(key("2026-10-01"), "moon");
        book.set_sticker(key("2026-10-02"), "retired-sticker");
        let exported = book.export().unwrap();
        assert_eq!(book.export_file_name(), "sticker-year-2026.json");

        let mut other = book_with(SharedStore::default());
        other.shift_month(-5);
        other.import(&exported).unwrap();
        assert_eq!(other.state(), book.state());
    }

    #[test]
    fn test_corrupt_stored_state_falls_back_to_defaults() {
        let store = SharedStore::default();
        *store.contents.borrow_mut() = Some("{ broken".to_string());

        let book = book_with(store);
        assert_eq!(book.cursor(), MonthCursor::new(2026, 9));
        assert!(book.storage_available());
    }

    #[test]
    fn test_rejected_stored_state_is_backed_up_and_placements_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stickerYear.v1.json");
        let stored = r#"{"year": 2026, "month": 9, "view": "Month",
            "placements": {"2026-10-01": "sun", "2026-10-02": "moon"}}"#;
        fs::write(&path, stored).unwrap();

        let mut book = StickerBook::open(
            Box::new(FileStore::new(path.clone())),
            Box::new(FixedClock(today())),
        );
        assert_eq!(book.sticker_for(key("2026-10-01")), Some("sun"));
        assert_eq!(book.view(), ViewMode::Month);

        book.shift_month(1);
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"2026-10-01\": \"sun\""));
        assert!(saved.contains("\"2026-10-02\": \"moon\""));

        let backups: Vec<_> = fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), stored);
    }

    #[test]
    fn test_storage_failure_degrades_to_memory() {
        let mut book = StickerBook::open(Box::new(FailingStore), Box::new(FixedClock(today())));
        assert!(book.storage_available());

        book.set_sticker(key("2026-10-10"), "star");
        assert!(!book.storage_available());
        assert_eq!(book.sticker_for(key("2026-10-10")), Some("star"));

        book.shift_month(1);
        book.set_sticker(key("2026-11-10"), "moon");
        assert_eq!(book.sticker_for(key("2026-11-10")), Some("moon"));
        assert_eq!(book.cursor(), MonthCursor::new(2026, 10));
    }
}

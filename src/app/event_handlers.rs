use std::fs;

use crossterm::event::{KeyCode, KeyEvent};

use crate::{
    domain::{DayKey, ViewMode},
    storage,
};

use super::{App, UiMode, ui_helpers};

impl App {
    /// Returns `true` when the app should quit.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        let quit = match self.ui_mode {
            UiMode::StickerPicker => {
                self.handle_picker_key(key);
                false
            }
            UiMode::ConfirmClear => {
                self.handle_confirm_clear_key(key);
                false
            }
            UiMode::ImportPrompt => {
                self.handle_import_key(key);
                false
            }
            UiMode::Main => self.handle_normal_key(key),
        };
        self.render_needed = true;
        quit
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_picker(),
            KeyCode::Up => self.move_picker_selection(false),
            KeyCode::Down => self.move_picker_selection(true),
            KeyCode::Tab => self.cycle_picker_category(true),
            KeyCode::BackTab => self.cycle_picker_category(false),
            KeyCode::Enter => self.pick_highlighted(),
            KeyCode::Delete => self.remove_from_selection(),
            KeyCode::Backspace => self.edit_picker_query(None),
            KeyCode::Char(c) => self.edit_picker_query(Some(c)),
            _ => {}
        }
    }

    fn handle_confirm_clear_key(&mut self, key: KeyEvent) {
        let year = self.book.cursor().year();
        self.ui_mode = UiMode::Main;
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = self.book.clear_year(year);
                self.set_status(format!("Cleared {} stickers from {}", removed, year));
            }
            _ => self.set_status("Clear cancelled"),
        }
    }

    fn handle_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui_mode = UiMode::Main;
                self.import_path.clear();
            }
            KeyCode::Enter => {
                self.ui_mode = UiMode::Main;
                let path = std::mem::take(&mut self.import_path);
                self.import_from(path.trim());
            }
            KeyCode::Backspace => {
                self.import_path.pop();
            }
            KeyCode::Char(c) => self.import_path.push(c),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        self.status = None;

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.move_focus(-1),
            KeyCode::Right => self.move_focus(1),
            KeyCode::Up => self.move_focus(-7),
            KeyCode::Down => self.move_focus(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.shift_page(-1),
            KeyCode::Char(']') | KeyCode::PageDown => self.shift_page(1),
            KeyCode::Char('t') => {
                self.book.jump_to_today();
                self.focus = DayKey::new(self.book.today());
            }
            KeyCode::Char('v') => {
                self.book.toggle_view();
                self.refocus();
            }
            KeyCode::Enter => self.open_picker(),
            KeyCode::Char('x') | KeyCode::Delete => {
                if self.book.remove_sticker(self.focus) {
                    self.set_status(format!("Removed sticker from {}", self.focus));
                }
            }
            KeyCode::Char('e') => self.export_to_data_dir(),
            KeyCode::Char('X') => self.ui_mode = UiMode::ConfirmClear,
            KeyCode::Char('i') => {
                self.import_path.clear();
                self.ui_mode = UiMode::ImportPrompt;
            }
            _ => {}
        }
        false
    }

    fn move_focus(&mut self, days: i64) {
        let cursor = self.book.cursor();
        let next = match self.book.view() {
            ViewMode::Month => ui_helpers::step_in_month_grid(self.focus.date(), days, cursor),
            ViewMode::Year => ui_helpers::step_in_year(self.focus.date(), days, cursor.year()),
        };
        self.focus = DayKey::new(next);
    }

    /// One month in month view, one year in year view.
    fn shift_page(&mut self, direction: i32) {
        let step = match self.book.view() {
            ViewMode::Month => 1,
            ViewMode::Year => 12,
        };
        self.book.shift_month(direction * step);
        self.refocus();
    }

    fn export_to_data_dir(&mut self) {
        let json = match self.book.export() {
            Ok(json) => json,
            Err(e) => {
                self.set_status(format!("Export failed: {e}"));
                return;
            }
        };

        let path = self.export_dir.join(self.book.export_file_name());
        match storage::write_text_file(&path, &json) {
            Ok(()) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => {
                tracing::warn!("export failed: {e}");
                self.set_status(format!("Export failed: {e}"));
            }
        }
    }

    fn import_from(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                self.set_status(format!("Could not read {path}: {e}"));
                return;
            }
        };

        match self.book.import(&text) {
            Ok(()) => {
                self.refocus();
                let count = self.book.state().placements.len();
                self.set_status(format!("Imported! {count} days stickered"));
            }
            Err(e) => self.set_status(format!("Import failed: {e}")),
        }
    }
}

use crate::catalog::StickerRecord;

use super::{App, ui_helpers};

impl App {
    pub(super) fn active_category(&self) -> Option<&str> {
        self.picker_category
            .and_then(|i| self.categories.get(i))
            .map(String::as_str)
    }

    pub(super) fn picker_results(&self) -> Vec<&StickerRecord> {
        self.catalog
            .search(&self.picker_query, self.active_category())
    }

    pub(super) fn cycle_picker_category(&mut self, forward: bool) {
        self.picker_category =
            ui_helpers::cycle_optional_index(self.picker_category, self.categories.len(), forward);
        self.picker_selected_index = 0;
    }

    pub(super) fn move_picker_selection(&mut self, forward: bool) {
        let len = self.picker_results().len();
        self.picker_selected_index = if forward {
            ui_helpers::wrap_next_index(self.picker_selected_index, len)
        } else {
            ui_helpers::wrap_prev_index(self.picker_selected_index, len)
        };
    }

    pub(super) fn edit_picker_query(&mut self, c: Option<char>) {
        match c {
            Some(c) => self.picker_query.push(c),
            None => {
                self.picker_query.pop();
            }
        }
        self.picker_selected_index = 0;
    }

    /// Places the highlighted sticker on the selected day and closes the picker.
    pub(super) fn pick_highlighted(&mut self) {
        let Some(id) = self
            .picker_results()
            .get(self.picker_selected_index)
            .map(|record| record.id.clone())
        else {
            return;
        };

        let day = self.book.selection();
        if self.book.pick_sticker(&id) {
            if let Some(day) = day {
                self.focus = day;
            }
            self.ui_mode = super::UiMode::Main;
            self.render_needed = true;
        }
    }

    pub(super) fn remove_from_selection(&mut self) {
        let day = self.book.selection();
        if self.book.remove_selected_sticker() {
            if let Some(day) = day {
                self.focus = day;
            }
            self.ui_mode = super::UiMode::Main;
            self.render_needed = true;
        }
    }
}

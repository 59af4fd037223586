use std::{io, path::PathBuf, time::Duration};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use crate::{
    book::StickerBook,
    catalog::Catalog,
    cli,
    config::Config,
    constants::TIME_SETTINGS,
    domain::{DayKey, ViewMode},
    error::Result,
};

mod event_handlers;
mod picker_modal_view;
mod picker_state;
mod prompt_view;
mod render_views;
mod ui_helpers;
mod view_style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UiMode {
    Main,
    StickerPicker,
    ConfirmClear,
    ImportPrompt,
}

struct App {
    book: StickerBook,
    catalog: Catalog,
    categories: Vec<String>,
    ui_mode: UiMode,
    focus: DayKey,
    picker_query: String,
    picker_category: Option<usize>,
    picker_selected_index: usize,
    import_path: String,
    export_dir: PathBuf,
    status: Option<String>,
    render_needed: bool,
}

impl App {
    fn new(book: StickerBook, catalog: Catalog, export_dir: PathBuf) -> Self {
        let categories = catalog
            .categories()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let mut app = Self {
            focus: DayKey::new(book.today()),
            book,
            catalog,
            categories,
            ui_mode: UiMode::Main,
            picker_query: String::new(),
            picker_category: None,
            picker_selected_index: 0,
            import_path: String::new(),
            export_dir,
            status: None,
            render_needed: true,
        };
        app.refocus();
        app
    }

    /// Keeps the focused day inside the month or year on screen.
    fn refocus(&mut self) {
        let cursor = self.book.cursor();
        let visible = match self.book.view() {
            ViewMode::Month => cursor.contains(self.focus.date()),
            ViewMode::Year => self.focus.year() == cursor.year(),
        };
        if visible {
            return;
        }

        let today = self.book.today();
        self.focus = if cursor.contains(today) {
            DayKey::new(today)
        } else {
            DayKey::new(cursor.first_day())
        };
    }

    fn open_picker(&mut self) {
        self.book.select_day(self.focus);
        self.ui_mode = UiMode::StickerPicker;
        self.picker_query.clear();
        self.picker_category = None;
        self.picker_selected_index = 0;
        self.render_needed = true;
    }

    fn close_picker(&mut self) {
        self.book.close_selection();
        self.ui_mode = UiMode::Main;
        self.render_needed = true;
    }

    fn in_picker(&self) -> bool {
        matches!(self.ui_mode, UiMode::StickerPicker)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
        self.render_needed = true;
    }

    fn modal_rect(&self, terminal_size: Rect) -> Rect {
        self.modal_rect_ratio(terminal_size, 1, 2)
    }

    fn modal_rect_ratio(&self, terminal_size: Rect, numerator: u16, denominator: u16) -> Rect {
        let target_width = terminal_size.width.saturating_mul(numerator) / denominator;
        let target_height = (terminal_size.height.saturating_mul(numerator) / denominator).max(10);

        let max_width = terminal_size.width.saturating_sub(2).max(1);
        let max_height = terminal_size.height.saturating_sub(2).max(1);

        let modal_width = target_width.clamp(1, max_width);
        let modal_height = target_height.clamp(1, max_height);

        let modal_x = (terminal_size.width.saturating_sub(modal_width)) / 2;
        let modal_y = (terminal_size.height.saturating_sub(modal_height)) / 2;

        Rect::new(modal_x, modal_y, modal_width, modal_height)
    }
}

pub fn run_ui(config: &Config) -> Result<()> {
    let catalog =
        Catalog::load(&config.catalog_path)?.with_asset_base(config.asset_base.clone());
    if catalog.is_empty() {
        tracing::warn!(path = %config.catalog_path.display(), "sticker catalog is empty");
    }
    let book = cli::open_book(config);
    if !book.storage_available() {
        tracing::warn!("running without saved state");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(book, catalog, config.data_dir.clone());
    let poll_rate = Duration::from_millis(TIME_SETTINGS.poll_ms);

    let outcome = loop {
        if app.render_needed {
            if let Err(e) = terminal.draw(|f| app.draw_frame(f)) {
                break Err(e);
            }
            app.render_needed = false;
        }

        match event::poll(poll_rate) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break Ok(());
                    }
                }
                Ok(Event::Resize(_, _)) => app.render_needed = true,
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{domain::FixedClock, storage::MemoryStore};

    use super::*;

    pub(super) const FEED: &str = r#"[
        {"category": "Sky", "items": [
            {"id": "moon", "file": "moon.png", "label": "Moon"},
            {"id": "sun", "file": "sun.png", "label": "Sun", "tags": ["bright"]}
        ]},
        {"category": "Animals", "items": [
            {"id": "cat", "file": "cat.png", "label": "Cat"}
        ]}
    ]"#;

    pub(super) fn test_app() -> App {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let book = StickerBook::open(Box::new(MemoryStore::new()), Box::new(FixedClock(today)));
        let catalog = Catalog::from_json_str(FEED).unwrap();
        App::new(book, catalog, std::env::temp_dir())
    }

    #[test]
    fn test_app_focuses_today() {
        let app = test_app();
        assert_eq!(app.focus.to_string(), "2026-10-19");
        assert_eq!(app.categories, vec!["Animals", "Sky"]);
    }

    #[test]
    fn test_refocus_follows_month() {
        let mut app = test_app();
        app.book.shift_month(1);
        app.refocus();
        assert_eq!(app.focus.to_string(), "2026-11-01");

        app.book.jump_to_today();
        app.refocus();
        assert_eq!(app.focus.to_string(), "2026-10-19");
    }

    #[test]
    fn test_picker_opens_and_closes_selection() {
        let mut app = test_app();
        app.open_picker();
        assert!(app.in_picker());
        assert_eq!(app.book.selection(), Some(app.focus));

        app.close_picker();
        assert!(!app.in_picker());
        assert!(app.book.selection().is_none());
    }

    #[test]
    fn test_modal_rect_stays_inside_terminal() {
        let app = test_app();
        let area = Rect::new(0, 0, 80, 24);
        let modal = app.modal_rect(area);
        assert!(modal.x + modal.width <= area.width);
        assert!(modal.y + modal.height <= area.height);
        assert!(modal.height >= 10);
    }
}

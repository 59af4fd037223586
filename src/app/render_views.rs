use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{
        Block, BorderType, Borders, Paragraph,
        block::{Position, Title},
    },
};

use crate::{
    calendar::{self, DayCell, YearCell},
    constants::{GRID, MONTHS, WEEKDAYS},
    domain::{MonthCursor, ViewMode},
};

use super::{App, UiMode, ui_helpers, view_style};

const MAIN_HELP: &str =
    "←↑↓→ move  enter sticker  x remove  [ ] page  t today  v view  e export  i import  X clear  q quit";

impl App {
    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let cursor = self.book.cursor();

        let (heading, count) = match self.book.view() {
            ViewMode::Month => (
                format!("{} {}", MONTHS[cursor.month0() as usize], cursor.year()),
                self.book.count_for_month(cursor),
            ),
            ViewMode::Year => (
                cursor.year().to_string(),
                (0..12)
                    .map(|m| self.book.count_for_month(MonthCursor::new(cursor.year(), m)))
                    .sum::<usize>(),
            ),
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    "Sticker Year",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(
                Line::from(Span::styled(heading, Style::default().fg(Color::White)))
                    .alignment(Alignment::Center),
            )
            .title(
                Line::from(Span::styled(
                    format!("{} days stickered", count),
                    Style::default().fg(Color::White),
                ))
                .alignment(Alignment::Right),
            )
            .border_style(Style::default().fg(Color::Gray));
        if !self.book.storage_available() {
            block = block.title(
                Title::from(Line::from(
                    Span::raw(" not saving: storage unavailable ").fg(Color::Red),
                ))
                .position(Position::Bottom)
                .alignment(Alignment::Right),
            );
        }

        let inner = block.inner(size);
        f.render_widget(block, size);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);

        match self.book.view() {
            ViewMode::Month => self.render_month(f, vertical[0], cursor),
            ViewMode::Year => self.render_year(f, vertical[0], cursor.year()),
        }

        let footer = match &self.status {
            Some(status) => Line::from(Span::raw(status.as_str()).fg(Color::Yellow)),
            None => Line::from(Span::raw(MAIN_HELP).fg(Color::DarkGray)),
        };
        f.render_widget(Paragraph::new(footer), vertical[1]);

        match self.ui_mode {
            UiMode::StickerPicker => self.render_picker_modal(f, size),
            UiMode::ConfirmClear => self.render_confirm_clear(f, size),
            UiMode::ImportPrompt => self.render_import_prompt(f, size),
            UiMode::Main => {}
        }
    }

    fn render_month(&self, f: &mut Frame, area: Rect, cursor: MonthCursor) {
        let grid = calendar::build_month_grid(cursor);

        let mut row_constraints = vec![Constraint::Length(1)];
        row_constraints.extend(std::iter::repeat_n(
            Constraint::Ratio(1, GRID.weeks as u32),
            GRID.weeks,
        ));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        let header = columns(rows[0]);
        for (name, rect) in WEEKDAYS.iter().zip(header.iter()) {
            f.render_widget(
                Paragraph::new(Span::raw(*name).fg(Color::Gray)).alignment(Alignment::Center),
                *rect,
            );
        }

        for (week, row) in grid.weeks().zip(rows.iter().skip(1)) {
            for (cell, rect) in week.iter().zip(columns(*row).iter()) {
                self.render_day_cell(f, *rect, cell);
            }
        }
    }

    fn render_day_cell(&self, f: &mut Frame, area: Rect, cell: &DayCell) {
        let record = self
            .book
            .sticker_for(cell.key)
            .and_then(|id| self.catalog.get(id));
        let color = record.map(|r| view_style::category_color(&r.category, &self.categories));
        let style = view_style::day_style(
            color,
            cell.is_outside_month,
            cell.is_today(self.book.today()),
            cell.key == self.focus,
        );

        let width = area.width.saturating_sub(2) as usize;
        let mut lines = vec![Line::from(format!("{:>2}", cell.key.day()))];
        match (record, self.book.sticker_for(cell.key)) {
            (Some(record), _) => lines.push(Line::from(ui_helpers::truncate_label(
                &record.label,
                width,
            ))),
            // Placed but no longer in the catalog.
            (None, Some(_)) => lines.push(Line::from("?")),
            (None, None) => {}
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(lines).block(block).style(style), area);
    }

    fn render_year(&self, f: &mut Frame, area: Rect, year: i32) {
        let months = calendar::build_year_grid(year);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (quarter, row) in months.chunks(3).zip(rows.iter()) {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 3); 3])
                .split(*row);
            for (mini, rect) in quarter.iter().zip(cols.iter()) {
                self.render_mini_month(f, *rect, year, mini);
            }
        }
    }

    fn render_mini_month(&self, f: &mut Frame, area: Rect, year: i32, mini: &calendar::MiniMonth) {
        let today = self.book.today();
        let count = self.book.count_for_month(MonthCursor::new(year, mini.month0));
        let is_current = self.focus.month0() == mini.month0 && self.focus.year() == year;

        let mut lines = vec![Line::from(
            WEEKDAYS
                .iter()
                .map(|w| Span::raw(format!("{:>3}", &w[..2])).fg(Color::Gray))
                .collect::<Vec<_>>(),
        )];
        for week in mini.cells.chunks(GRID.days_per_week) {
            let spans = week
                .iter()
                .map(|cell| match cell {
                    YearCell::Placeholder => Span::raw("   "),
                    YearCell::Day(day) => {
                        let color = self
                            .book
                            .sticker_for(day.key)
                            .and_then(|id| self.catalog.get(id))
                            .map(|r| view_style::category_color(&r.category, &self.categories));
                        Span::styled(
                            format!("{:>3}", day.key.day()),
                            view_style::day_style(
                                color,
                                false,
                                day.is_today(today),
                                day.key == self.focus,
                            ),
                        )
                    }
                })
                .collect::<Vec<_>>();
            lines.push(Line::from(spans));
        }

        let border_color = if is_current {
            Color::White
        } else {
            Color::DarkGray
        };
        let title = format!(" {} ({}) ", MONTHS[mini.month0 as usize], count);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(Span::raw(title).fg(Color::White)))
            .border_style(Style::default().fg(border_color));
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area)
}

use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
};

use super::{App, view_style};

const PICKER_HELP: &str = "type to search  ↑↓ choose  tab category  enter place  del remove  esc close";

impl App {
    pub(super) fn render_picker_modal(&self, f: &mut Frame, terminal_size: Rect) {
        let modal_rect = self.modal_rect_ratio(terminal_size, 2, 3);
        let day = self
            .book
            .selection()
            .map(|key| key.to_string())
            .unwrap_or_default();
        let current = self.book.selection().and_then(|key| self.book.sticker_for(key));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(Span::styled(
                format!(" Sticker for {} ", day),
                Style::default().fg(Color::White),
            )))
            .title_alignment(ratatui::layout::Alignment::Center)
            .border_style(Style::default().fg(Color::White));
        let inner = block.inner(modal_rect);

        f.render_widget(ratatui::widgets::Clear, modal_rect);
        f.render_widget(block, modal_rect);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        let query = Line::from(vec![
            Span::raw("Search: ").fg(Color::Gray),
            Span::raw(self.picker_query.as_str()).fg(Color::White),
            Span::raw("_").fg(Color::DarkGray),
        ]);
        f.render_widget(Paragraph::new(query), vertical[0]);

        let mut tabs = vec![view_style::category_tab_span(
            "All",
            self.picker_category.is_none(),
        )];
        for (i, category) in self.categories.iter().enumerate() {
            tabs.push(Span::raw(" · ").fg(Color::DarkGray));
            tabs.push(view_style::category_tab_span(
                category,
                self.picker_category == Some(i),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(tabs)), vertical[1]);

        let results = self.picker_results();
        let items: Vec<ListItem> = if results.is_empty() {
            vec![ListItem::new(Line::from(
                Span::raw("No stickers match").fg(Color::DarkGray),
            ))]
        } else {
            results
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    let color = view_style::category_color(&record.category, &self.categories);
                    let mark = if current == Some(record.id.as_str()) {
                        "✓ "
                    } else {
                        "  "
                    };
                    let line = Line::from(vec![
                        Span::raw(mark).fg(Color::Green),
                        Span::raw("● ").fg(color),
                        Span::raw(record.label.as_str()),
                        Span::raw(format!("  {}", self.catalog.image_path(record)))
                            .fg(Color::DarkGray),
                    ]);
                    if i == self.picker_selected_index {
                        ListItem::new(line).style(
                            Style::default()
                                .fg(view_style::text_color_for_bg(color))
                                .bg(color)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        ListItem::new(line).style(Style::default().fg(Color::White))
                    }
                })
                .collect()
        };

        let mut list_state = ListState::default();
        if !results.is_empty() {
            list_state.select(Some(self.picker_selected_index));
        }
        let list = List::new(items).highlight_style(Style::default());
        f.render_stateful_widget(list, vertical[2], &mut list_state);

        let footer = Paragraph::new(Line::from(Span::raw(PICKER_HELP).fg(Color::DarkGray)));
        f.render_widget(footer, vertical[3]);
    }
}

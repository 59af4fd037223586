use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use super::App;

impl App {
    pub(super) fn render_confirm_clear(&self, f: &mut Frame, terminal_size: Rect) {
        let year = self.book.cursor().year();
        let lines = vec![
            Line::from(format!("Remove every sticker placed in {}?", year)),
            Line::from(""),
            Line::from(Span::raw("y confirm  any other key cancels").fg(Color::DarkGray)),
        ];
        self.render_prompt(f, terminal_size, " Clear year ", Color::Red, lines);
    }

    pub(super) fn render_import_prompt(&self, f: &mut Frame, terminal_size: Rect) {
        let lines = vec![
            Line::from("Path to a Sticker Year export:"),
            Line::from(vec![
                Span::raw(self.import_path.as_str()).fg(Color::White),
                Span::raw("_").fg(Color::DarkGray),
            ]),
            Line::from(""),
            Line::from(Span::raw("enter import  esc cancel").fg(Color::DarkGray)),
        ];
        self.render_prompt(f, terminal_size, " Import ", Color::White, lines);
    }

    fn render_prompt(
        &self,
        f: &mut Frame,
        terminal_size: Rect,
        title: &str,
        border_color: Color,
        lines: Vec<Line>,
    ) {
        let modal_rect = self.modal_rect(terminal_size);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(Span::styled(
                title.to_string(),
                Style::default().fg(Color::White),
            )))
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(border_color));

        f.render_widget(ratatui::widgets::Clear, modal_rect);
        f.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false }),
            modal_rect,
        );
    }
}

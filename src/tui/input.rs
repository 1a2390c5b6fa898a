use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

pub const PLACEHOLDER: &str = "Search movies...";

/// Single-line search bar wrapper around tui-textarea
pub struct SearchBar {
    textarea: TextArea<'static>,
}

impl SearchBar {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    " 🔍 Search ",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        textarea.set_placeholder_text(PLACEHOLDER);
        textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
        textarea.set_cursor_line_style(Style::default());

        Self { textarea }
    }

    /// Feed a key to the text area. Returns true if the text changed.
    ///
    /// Newlines are swallowed so the bar stays on one line.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let is_newline = key.code == KeyCode::Enter
            || (key.code == KeyCode::Char('m') && key.modifiers.contains(KeyModifiers::CONTROL));
        if is_newline {
            return false;
        }
        self.textarea.input(key)
    }

    pub fn text(&self) -> &str {
        self.textarea
            .lines()
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&self.textarea, area);
    }
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}

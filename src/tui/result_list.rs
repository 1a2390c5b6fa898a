use crate::controller::SearchResultItem;
use crate::presenter::{self, ListEntry};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Selectable list of search results
pub struct ResultList {
    state: ListState,
    len: usize,
    viewport_rows: usize,
}

impl ResultList {
    pub fn new() -> Self {
        Self {
            state: ListState::default(),
            len: 0,
            viewport_rows: 0,
        }
    }

    /// Track a new result count, keeping the selection in range
    pub fn sync_len(&mut self, len: usize) {
        self.len = len;
        let selected = match (len, self.state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.state.select(selected);
    }

    /// Back to the first row, used when a fresh result set arrives
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.state.select(if len == 0 { None } else { Some(0) });
        *self.state.offset_mut() = 0;
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn select_next(&mut self, step: usize) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some((i + step).min(self.len.saturating_sub(1))));
        }
    }

    pub fn select_previous(&mut self, step: usize) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(step)));
        }
    }

    pub fn select_first(&mut self) {
        if self.len > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if self.len > 0 {
            self.state.select(Some(self.len - 1));
        }
    }

    /// Rows per page, as of the last render
    pub fn page_size(&self) -> usize {
        self.viewport_rows.max(1)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, results: &[SearchResultItem]) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(vec![
                Span::styled(
                    format!(" {} ", presenter::SECTION_TITLE),
                    Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ", presenter::section_subtitle(results)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
            .border_style(Style::default().fg(Color::DarkGray));

        let inner_width = block.inner(area).width as usize;
        // Two lines per entry
        self.viewport_rows = (block.inner(area).height as usize / 2).max(1);

        let items: Vec<ListItem> = results
            .iter()
            .map(|item| entry_item(presenter::present(item), inner_width))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Rgb(40, 44, 52)))
            .highlight_symbol("▌ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

impl Default for ResultList {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_item(entry: ListEntry<'_>, width: usize) -> ListItem<'static> {
    // Room for the highlight symbol
    let width = width.saturating_sub(2);
    let accessory_width = entry.accessory_title.width();
    let title = truncate(entry.title, width);

    let mut first = vec![Span::styled(
        title.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    let gap = width.saturating_sub(title.width() + accessory_width);
    if gap >= 2 {
        first.push(Span::raw(" ".repeat(gap)));
        first.push(Span::styled(
            entry.accessory_title.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let subtitle = Line::from(Span::styled(
        truncate(entry.subtitle, width),
        Style::default().fg(Color::Gray),
    ));

    ListItem::new(vec![Line::from(first), subtitle])
}

/// Cut `text` to `max` display columns, ending in an ellipsis when shortened
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

use crate::controller::{Notification, SearchController, SearchResultItem};
use crate::event::{Event, EventResult};
use crate::presenter::{self, BrowserOpener};
use crate::tui::{ResultList, SearchBar};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// Main application state
pub struct App {
    /// Owns requests and search state
    controller: SearchController,
    /// Search bar; every edit triggers a search
    pub input: SearchBar,
    /// Result list selection
    results: ResultList,
    /// Where "Open in Browser" goes
    opener: Box<dyn BrowserOpener>,
    /// Last notification, shown until the next edit
    toast: Option<Notification>,
    /// Whether the application should quit
    should_quit: bool,
}

impl App {
    pub fn new(controller: SearchController, opener: Box<dyn BrowserOpener>) -> Self {
        Self {
            controller,
            input: SearchBar::new(),
            results: ResultList::new(),
            opener,
            toast: None,
            should_quit: false,
        }
    }

    /// Kick off the initial search
    pub fn start(&mut self) {
        self.controller.start();
    }

    /// Cancel whatever is in flight before exiting
    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn toast(&self) -> Option<&Notification> {
        self.toast.as_ref()
    }

    pub fn selected_item(&self) -> Option<&SearchResultItem> {
        self.results
            .selected()
            .and_then(|i| self.controller.state().results.get(i))
    }

    /// Pick up finished searches and notifications
    pub fn poll(&mut self) {
        let summary = self.controller.poll();
        let len = self.controller.state().results.len();
        if summary.results_replaced {
            self.results.reset(len);
        } else if summary.failed {
            // Results were kept, so the selection stays where the user left it
            self.results.sync_len(len);
        }
        if let Some(notification) = self.controller.take_notifications().pop() {
            self.toast = Some(notification);
        }
    }

    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick | Event::Resize(..) => {
                self.poll();
                Ok(())
            }
            Event::Quit => {
                self.should_quit = true;
                Ok(())
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.results.select_previous(1),
            KeyCode::Down => self.results.select_next(1),
            KeyCode::PageUp => self.results.select_previous(self.results.page_size()),
            KeyCode::PageDown => self.results.select_next(self.results.page_size()),
            KeyCode::Home => self.results.select_first(),
            KeyCode::End => self.results.select_last(),
            KeyCode::Enter => self.open_selected(),
            _ => {
                if self.input.handle_key(key) {
                    self.toast = None;
                    let text = self.input.text().to_string();
                    self.controller.search(&text);
                }
            }
        }
        Ok(())
    }

    fn open_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let action = presenter::present(item).action;
        if let Err(e) = action.run(self.opener.as_ref()) {
            tracing::warn!(error = %e, url = %action.url, "failed to open browser");
            self.toast = Some(Notification::failure("Could not open browser", e.to_string()));
        }
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(4),    // Results + details
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        self.input.render(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        self.results
            .render(frame, body[0], &self.controller.state().results);
        self.render_details(frame, body[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Details ")
            .border_style(Style::default().fg(Color::DarkGray));

        let lines = match self.selected_item() {
            Some(item) => {
                let width = block.inner(area).width.max(10) as usize;
                let mut lines = vec![
                    Line::from(Span::styled(
                        item.title().to_string(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        item.url().to_string(),
                        Style::default().fg(Color::LightBlue),
                    )),
                    Line::default(),
                ];
                let overview = if item.overview().is_empty() {
                    "No overview available."
                } else {
                    item.overview()
                };
                lines.extend(
                    textwrap::wrap(overview, width)
                        .into_iter()
                        .map(|line| Line::from(line.into_owned())),
                );
                lines
            }
            None => vec![Line::from(Span::styled(
                "No result selected",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let details = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(details, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.toast {
            Some(toast) => Line::from(vec![
                Span::styled(
                    format!(" ⚠️  {}: ", toast.title),
                    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                ),
                Span::raw(toast.message.clone()),
            ]),
            None => Line::from(vec![
                Span::styled(" Status: ", Style::default().fg(Color::Yellow)),
                Span::raw(if self.controller.state().is_loading {
                    "Searching..."
                } else {
                    "Ready"
                }),
                Span::styled(
                    "  │ ↑↓ select │ Enter open in browser │ Esc quit",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

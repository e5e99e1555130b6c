//! TUI module using ratatui.
//!
//! A read-only viewer for one analysis: five bordered panels, one of which
//! has focus and scrolls.

use crate::analysis::{AnalysisRecord, Item, Section};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};

/// Viewer state
pub struct App {
    title: String,
    record: AnalysisRecord,
    focus: usize,
    scroll: [u16; Section::ALL.len()],
    quit: bool,
}

impl App {
    pub fn new(title: impl Into<String>, record: AnalysisRecord) -> Self {
        Self {
            title: title.into(),
            record,
            focus: 0,
            scroll: [0; Section::ALL.len()],
            quit: false,
        }
    }

    pub fn focused(&self) -> Section {
        Section::ALL[self.focus]
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let count = Section::ALL.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.focus = (self.focus + 1) % count,
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.focus = (self.focus + count - 1) % count
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = self.line_count(self.focused()).saturating_sub(1);
                let scroll = &mut self.scroll[self.focus];
                *scroll = (*scroll + 1).min(max);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let scroll = &mut self.scroll[self.focus];
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Home | KeyCode::Char('g') => self.scroll[self.focus] = 0,
            _ => {}
        }
    }

    fn line_count(&self, section: Section) -> u16 {
        let lines = section_lines(section, self.record.items(section)).len();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }
}

/// Run the viewer until the user quits
pub fn run(app: App) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, mut app: App) -> std::io::Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| draw(frame, &app))?;
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}

pub fn draw(frame: &mut Frame, app: &App) {
    let [header, body, summary, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Percentage(60),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);
    let [actions, deadlines] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(left);
    let [decisions, participants] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(right);

    frame.render_widget(
        Line::from(vec![
            Span::raw("🎯 "),
            Span::styled(app.title.as_str(), Style::new().add_modifier(Modifier::BOLD)),
        ]),
        header,
    );

    let areas: [(Section, Rect); 5] = [
        (Section::ActionItems, actions),
        (Section::Deadlines, deadlines),
        (Section::Decisions, decisions),
        (Section::Participants, participants),
        (Section::Summary, summary),
    ];
    for (section, area) in areas {
        draw_section(frame, app, section, area);
    }

    frame.render_widget(
        Line::from("Tab/←→ switch panel · ↑↓ scroll · q quit").dark_gray(),
        footer,
    );
}

fn draw_section(frame: &mut Frame, app: &App, section: Section, area: Rect) {
    let index = Section::ALL
        .iter()
        .position(|s| *s == section)
        .unwrap_or_default();
    let focused = index == app.focus;
    let border = if focused {
        Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::DarkGray)
    };

    let items = app.record.items(section);
    let block = Block::bordered()
        .title(format!(" {} ({}) ", section.title(), items.len()))
        .border_style(border);
    let paragraph = Paragraph::new(section_lines(section, items))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll[index], 0));
    frame.render_widget(paragraph, area);
}

fn section_lines(section: Section, items: &[Item]) -> Vec<Line<'static>> {
    if items.is_empty() {
        return vec![Line::from(section.empty_message()).italic().dark_gray()];
    }
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", i + 1), Style::new().add_modifier(Modifier::BOLD)),
            Span::raw(item.text.clone()),
        ]));
        for (label, value) in item.details() {
            lines.push(Line::from(vec![
                Span::styled(format!("   {label}: "), Style::new().fg(Color::DarkGray)),
                Span::raw(value.to_string()),
            ]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample() -> AnalysisRecord {
        AnalysisRecord {
            action_items: vec![
                Item::new("Book room").with_assignee("Noa"),
                Item::new("Send invite"),
            ],
            participants: vec![Item::new("Noa")],
            ..AnalysisRecord::default()
        }
    }

    #[test]
    fn tab_cycles_focus_and_wraps() {
        let mut app = App::new("Weekly sync", sample());
        assert_eq!(app.focused(), Section::ActionItems);
        for _ in 0..4 {
            app.handle_key(press(KeyCode::Tab));
        }
        assert_eq!(app.focused(), Section::Summary);
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.focused(), Section::ActionItems);
        app.handle_key(press(KeyCode::BackTab));
        assert_eq!(app.focused(), Section::Summary);
    }

    #[test]
    fn scrolling_is_clamped_to_content() {
        let mut app = App::new("Weekly sync", sample());
        // Three lines: two items plus one detail line
        for _ in 0..10 {
            app.handle_key(press(KeyCode::Down));
        }
        assert_eq!(app.scroll[0], 2);
        app.handle_key(press(KeyCode::Up));
        assert_eq!(app.scroll[0], 1);
        app.handle_key(press(KeyCode::Home));
        assert_eq!(app.scroll[0], 0);
    }

    #[test]
    fn quit_keys_stop_the_viewer() {
        let mut app = App::new("Weekly sync", sample());
        app.handle_key(press(KeyCode::Char('x')));
        assert!(!app.should_quit());
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit());

        let mut app = App::new("Weekly sync", sample());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn draw_renders_all_panels() {
        let app = App::new("Weekly sync", sample());
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        for section in Section::ALL {
            assert!(screen.contains(section.title()), "missing {}", section.title());
        }
        assert!(screen.contains("Book room"));
        assert!(screen.contains(Section::Decisions.empty_message()));
    }
}

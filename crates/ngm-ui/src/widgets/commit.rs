//! Commit message editor and the per-repository commit report

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ngm_core::Theme;
use ngm_git::GitResult;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui_textarea::{Input, Key, TextArea};

fn to_textarea_input(key: KeyEvent) -> Input {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        KeyCode::F(n) => Key::F(n),
        _ => Key::Null,
    };

    Input {
        key: code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}

/// Commit message input plus the validation error shown under it
pub struct CommitEditor {
    textarea: TextArea<'static>,
    error: Option<String>,
}

impl Default for CommitEditor {
    fn default() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        CommitEditor {
            textarea,
            error: None,
        }
    }
}

impl CommitEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base style of the text
    pub fn style(mut self, style: Style) -> Self {
        self.textarea.set_style(style);
        self
    }

    pub fn lines(&self) -> &[String] {
        self.textarea.lines()
    }

    /// `(row, column)` of the cursor
    pub fn cursor(&self) -> (usize, usize) {
        let c = self.textarea.cursor();
        (c.0, c.1)
    }

    /// The full text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// The text with surrounding whitespace removed, as passed to git
    pub fn message(&self) -> String {
        self.text().trim().to_string()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Insert pasted text, keeping its line breaks
    pub fn insert_str(&mut self, text: &str) {
        let text: String = text.replace("\r\n", "\n").chars().filter(|c| *c != '\r').collect();
        if self.textarea.insert_str(&text) {
            self.error = None;
        }
    }

    /// Apply an editing key; returns whether the text changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let changed = self.textarea.input(to_textarea_input(key));
        if changed {
            self.error = None;
        }
        changed
    }
}

/// The editor screen
pub struct CommitView<'a> {
    editor: &'a CommitEditor,
    theme: &'a Theme,
    targets: usize,
}

impl<'a> CommitView<'a> {
    /// `targets` is the number of repositories the commit will run in
    pub fn new(editor: &'a CommitEditor, theme: &'a Theme, targets: usize) -> Self {
        CommitView {
            editor,
            theme,
            targets,
        }
    }
}

impl Widget for CommitView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let title = format!(
            " Commit message ({} {}) ",
            self.targets,
            if self.targets == 1 { "repository" } else { "repositories" }
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.muted())
            .title(Span::styled(title, self.theme.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let error_rows = if self.editor.error().is_some() { 2 } else { 0 };
        let text_area = Rect {
            height: inner.height.saturating_sub(error_rows),
            ..inner
        };
        Widget::render(&self.editor.textarea, text_area, buf);

        if let Some(error) = self.editor.error() {
            let error_area = Rect {
                y: text_area.bottom(),
                height: inner.height - text_area.height,
                ..inner
            };
            Paragraph::new(vec![
                Line::default(),
                Line::styled(format!("✗ {error}"), self.theme.error()),
            ])
            .render(error_area, buf);
        }
    }
}

/// Outcome of committing in one repository
#[derive(Debug)]
pub struct CommitOutcome {
    /// Repository path as shown to the user
    pub path: String,
    pub result: GitResult<String>,
}

impl CommitOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// `[OK] path` or `[ERROR] path`, followed by git's output
    pub fn report(&self) -> (String, String) {
        match &self.result {
            Ok(output) => (format!("[OK] {}", self.path), output.clone()),
            Err(e) => (format!("[ERROR] {}", self.path), e.to_string()),
        }
    }
}

/// The report shown after a commit, until any key is pressed
pub struct CommitResults<'a> {
    outcomes: &'a [CommitOutcome],
    theme: &'a Theme,
}

impl<'a> CommitResults<'a> {
    pub fn new(outcomes: &'a [CommitOutcome], theme: &'a Theme) -> Self {
        CommitResults { outcomes, theme }
    }
}

impl Widget for CommitResults<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut lines = Vec::new();
        if self.outcomes.is_empty() {
            lines.push(Line::styled("Committing…", self.theme.muted()));
        }
        for outcome in self.outcomes {
            let (heading, output) = outcome.report();
            let style = if outcome.is_ok() {
                Style::default()
                    .fg(self.theme.colors.success)
                    .add_modifier(Modifier::BOLD)
            } else {
                self.theme.error().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::styled(heading, style));
            for text in output.lines() {
                lines.push(Line::styled(format!("  {text}"), self.theme.base()));
            }
            lines.push(Line::default());
        }
        if !self.outcomes.is_empty() {
            lines.push(Line::styled("Press any key to continue", self.theme.muted()));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.muted())
            .title(Span::styled(" Commit ", self.theme.accent()));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

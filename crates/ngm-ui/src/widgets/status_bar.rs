//! Status bar widget
//!
//! A one-line bar at the bottom of the screen with three sections: the
//! mode on the left, the cursor position in the middle and key hints on the
//! right. An error replaces the hints until the next action.

use ngm_core::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Widget;

/// Status bar with left, center, and right sections
pub struct StatusBar<'a> {
    left: &'a str,
    center: &'a str,
    right: &'a str,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Creates a new status bar with empty sections
    pub fn new(theme: &'a Theme) -> Self {
        StatusBar {
            left: "",
            center: "",
            right: "",
            error: None,
            theme,
        }
    }

    /// Mode, styled with the accent color
    pub fn left(mut self, text: &'a str) -> Self {
        self.left = text;
        self
    }

    /// Context, centered
    pub fn center(mut self, text: &'a str) -> Self {
        self.center = text;
        self
    }

    /// Key hints, right-aligned and muted
    pub fn right(mut self, text: &'a str) -> Self {
        self.right = text;
        self
    }

    /// Error shown in place of the right section
    pub fn error(mut self, text: Option<&'a str>) -> Self {
        self.error = text;
        self
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let bg = self.theme.colors.selection;
        for x in area.left()..area.right() {
            buf[(x, area.y)].set_bg(bg);
        }

        let width = area.width as usize;
        let mut used_left = 0;

        if !self.left.is_empty() {
            let text = format!(" {} ", self.left);
            if width_of(&text) <= width {
                let style = Style::default()
                    .fg(self.theme.colors.accent)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD);
                buf.set_string(area.x, area.y, &text, style);
                used_left = width_of(&text);
            }
        }

        let (right, right_fg) = match self.error {
            Some(err) => (err, self.theme.colors.error),
            None => (self.right, self.theme.colors.muted),
        };
        let mut used_right = 0;
        if !right.is_empty() {
            let available = width.saturating_sub(used_left);
            let text: String = format!(" {} ", right).chars().take(available).collect();
            let len = width_of(&text);
            if len > 0 {
                let start_x = area.right().saturating_sub(len as u16);
                buf.set_string(start_x, area.y, &text, Style::default().fg(right_fg).bg(bg));
                used_right = len;
            }
        }

        if !self.center.is_empty() {
            let len = width_of(self.center);
            let start = width.saturating_sub(len) / 2;
            if start >= used_left && start + len + used_right <= width {
                let style = Style::default().fg(self.theme.colors.foreground).bg(bg);
                buf.set_string(area.x + start as u16, area.y, self.center, style);
            }
        }
    }
}

//! Key reference screen

use ngm_core::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Key bindings in browse mode, as `(keys, action)`
pub const BINDINGS: &[(&str, &str)] = &[
    ("↑ / k", "move up"),
    ("↓ / j", "move down"),
    ("PgUp / PgDn", "move one page"),
    ("g / G", "jump to top / bottom"),
    ("Tab / Space / =", "expand or collapse"),
    ("s", "stage file"),
    ("u", "unstage file"),
    ("c", "commit staged changes"),
    ("r", "refresh all repositories"),
    ("h / ?", "toggle this help"),
    ("q / Ctrl+C", "quit"),
];

/// Key bindings inside the commit editor
pub const EDITOR_BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+S", "commit in every repository with staged changes"),
    ("Esc", "cancel"),
];

pub struct HelpView<'a> {
    theme: &'a Theme,
}

impl<'a> HelpView<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        HelpView { theme }
    }

    fn section(&self, title: &'static str, bindings: &[(&'static str, &'static str)]) -> Vec<Line<'static>> {
        let width = bindings
            .iter()
            .map(|(keys, _)| keys.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = vec![Line::from(Span::styled(title, self.theme.accent()))];
        for (keys, action) in bindings {
            let pad = width - keys.chars().count();
            lines.push(Line::from(vec![
                Span::styled(format!("  {}{}", keys, " ".repeat(pad)), self.theme.base()),
                Span::styled(format!("  {action}"), self.theme.muted()),
            ]));
        }
        lines
    }
}

impl Widget for HelpView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut lines = self.section("Browse", BINDINGS);
        lines.push(Line::default());
        lines.extend(self.section("Commit message", EDITOR_BINDINGS));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.muted())
            .title(Span::styled(" Help ", self.theme.accent()));
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_help_lists_every_binding() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 20);
        let mut buf = Buffer::empty(area);
        HelpView::new(&theme).render(area, &mut buf);

        let rendered = text(&buf);
        assert!(rendered.contains("Help"));
        for (keys, action) in BINDINGS.iter().chain(EDITOR_BINDINGS) {
            assert!(rendered.contains(keys), "missing {keys}");
            assert!(rendered.contains(action), "missing {action}");
        }
    }

    #[test]
    fn test_help_zero_size() {
        let theme = Theme::default();
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        HelpView::new(&theme).render(Rect::new(0, 0, 0, 0), &mut buf);
    }
}

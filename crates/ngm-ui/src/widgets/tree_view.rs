//! Tree view widget
//!
//! Draws the rows of a [`Tree`] that fall inside its viewport, one row per
//! line, highlighting the cursor row.

use crate::tree::{Node, NodeKind, Tree};
use ngm_core::Theme;
use ngm_git::discovery::relative;
use ngm_git::ChangeKind;
use ratatui::prelude::*;
use ratatui::widgets::Widget;

const BRANCH_ICON: &str = "\u{e725}";

/// Renders the visible part of a [`Tree`]
pub struct TreeView<'a> {
    tree: &'a Tree,
    theme: &'a Theme,
    nerd_font: bool,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a Tree, theme: &'a Theme) -> Self {
        TreeView {
            tree,
            theme,
            nerd_font: false,
        }
    }

    /// Use nerd-font glyphs instead of plain status letters
    pub fn nerd_font(mut self, enabled: bool) -> Self {
        self.nerd_font = enabled;
        self
    }

    fn marker(&self, kind: ChangeKind) -> String {
        if self.nerd_font {
            kind.icon().to_string()
        } else {
            kind.indicator().to_string()
        }
    }

    /// The styled line for one node
    pub fn line(&self, node: &Node) -> Line<'static> {
        let colors = &self.theme.colors;
        match &node.kind {
            NodeKind::Repository { repo, open } => {
                let entry = &self.tree.repos()[*repo];
                let path = relative(self.tree.root(), &entry.path);
                let fold = if *open { "▾ " } else { "▸ " };
                match &entry.state {
                    Ok(repository) => {
                        let status = &repository.status;
                        let branch = if self.nerd_font {
                            format!("{} {}", BRANCH_ICON, status.branch.summary())
                        } else {
                            status.branch.summary()
                        };
                        let mut spans = vec![
                            Span::styled(fold, self.theme.muted()),
                            Span::styled("✔ ", Style::default().fg(colors.success)),
                            Span::styled(path, self.theme.accent()),
                            Span::raw("  "),
                            Span::styled(branch, self.theme.muted()),
                        ];
                        let glance = status.glance();
                        if !glance.is_empty() {
                            spans.push(Span::raw("  "));
                            spans.push(Span::styled(glance, Style::default().fg(colors.warning)));
                        }
                        Line::from(spans)
                    }
                    Err(e) => Line::from(vec![
                        Span::styled(fold, self.theme.muted()),
                        Span::styled("✗ ", self.theme.error()),
                        Span::styled(path, self.theme.accent()),
                        Span::raw("  "),
                        Span::styled(e.to_string(), self.theme.error()),
                    ]),
                }
            }
            NodeKind::SectionHeader { title } => {
                Line::from(Span::styled(format!("  {title}"), self.theme.accent()))
            }
            NodeKind::UntrackedFile { path, .. } => {
                let marker = if self.nerd_font {
                    ChangeKind::Added.icon().to_string()
                } else {
                    "?".to_string()
                };
                Line::from(Span::styled(
                    format!("    {marker} {path}"),
                    Style::default().fg(colors.untracked),
                ))
            }
            NodeKind::UnstagedChange { change, open, .. } => Line::from(Span::styled(
                format!("  {} {}", fold(*open), change.label(&self.marker(change.kind))),
                Style::default().fg(colors.unstaged),
            )),
            NodeKind::StagedChange { change, open, .. } => Line::from(Span::styled(
                format!("  {} {}", fold(*open), change.label(&self.marker(change.kind))),
                Style::default().fg(colors.staged),
            )),
            NodeKind::UnmergedFile { entry, .. } => {
                Line::from(Span::styled(format!("    {entry}"), self.theme.error()))
            }
            NodeKind::DiffHunkLine { text } => Line::from(Span::styled(
                format!("      {}", text.replace('\t', "    ")),
                self.theme.diff_line(text),
            )),
            NodeKind::Blank { text } => {
                Line::from(Span::styled(format!("    {text}"), self.theme.muted()))
            }
            NodeKind::Message { text } => {
                Line::from(Span::styled(format!("    ✗ {text}"), self.theme.error()))
            }
        }
    }
}

fn fold(open: bool) -> &'static str {
    if open {
        "▾"
    } else {
        "▸"
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        if self.tree.is_empty() {
            buf.set_stringn(
                area.x,
                area.y,
                "No repositories found (press r to refresh)",
                area.width as usize,
                self.theme.muted(),
            );
            return;
        }

        let cursor = self.tree.cursor();
        for (offset, (row, node)) in self.tree.visible().enumerate() {
            if offset >= area.height as usize {
                break;
            }
            let y = area.y + offset as u16;
            if row == cursor {
                buf.set_style(Rect::new(area.x, y, area.width, 1), self.theme.selected());
            }
            buf.set_line(area.x, y, &self.line(node), area.width);
        }
    }
}

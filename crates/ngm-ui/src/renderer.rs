//! Screen layout
//!
//! Splits the terminal into a title line, the content area and the status
//! bar via [`AppLayout`].

use ratatui::prelude::*;

/// Main application layout areas
///
/// ```text
/// +---------------------------------+
/// | Header (1 line)                 |
/// +---------------------------------+
/// |                                 |
/// | Content Area                    |
/// | (remaining space)               |
/// |                                 |
/// +---------------------------------+
/// | Status Bar (1 line)             |
/// +---------------------------------+
/// ```
///
/// # Example
///
/// ```
/// use ngm_ui::renderer::AppLayout;
/// use ratatui::prelude::Rect;
///
/// let layout = AppLayout::new(Rect::new(0, 0, 80, 24));
///
/// assert_eq!(layout.header, Rect::new(0, 0, 80, 1));
/// assert_eq!(layout.content, Rect::new(0, 1, 80, 22));
/// assert_eq!(layout.status_bar, Rect::new(0, 23, 80, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppLayout {
    /// Root directory and repository count (top)
    pub header: Rect,
    /// Tree, help or commit screen (middle)
    pub content: Rect,
    /// Status bar (bottom)
    pub status_bar: Rect,
}

impl AppLayout {
    /// Calculate layout areas from the total terminal area.
    ///
    /// Below three rows the header and status bar are dropped and the
    /// content gets everything.
    #[must_use]
    pub fn new(area: Rect) -> Self {
        if area.height < 3 {
            return AppLayout {
                header: Rect::default(),
                content: area,
                status_bar: Rect::default(),
            };
        }

        AppLayout {
            header: Rect::new(area.x, area.y, area.width, 1),
            content: Rect::new(area.x, area.y + 1, area.width, area.height - 2),
            status_bar: Rect::new(area.x, area.y + area.height - 1, area.width, 1),
        }
    }

    /// Total height of the three regions
    ///
    /// ```
    /// use ngm_ui::renderer::AppLayout;
    /// use ratatui::prelude::Rect;
    ///
    /// assert_eq!(AppLayout::new(Rect::new(0, 0, 80, 24)).height(), 24);
    /// assert_eq!(AppLayout::new(Rect::new(0, 0, 80, 2)).height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> u16 {
        self.header.height + self.content.height + self.status_bar.height
    }
}

//! Widgets drawn by the ngm TUI
//!
//! - [`TreeView`] - the repository tree
//! - [`StatusBar`] - three-section status bar for mode, position, and hints
//! - [`HelpView`] - key reference
//! - [`CommitView`] / [`CommitResults`] - commit message editor and report
//!
//! ## Example
//!
//! ```
//! use ngm_core::Theme;
//! use ngm_ui::widgets::StatusBar;
//! use ratatui::prelude::*;
//! use ratatui::widgets::Widget;
//!
//! let theme = Theme::default();
//! let area = Rect::new(0, 0, 40, 1);
//! let mut buf = Buffer::empty(area);
//! StatusBar::new(&theme)
//!     .left("BROWSE")
//!     .center("1/3")
//!     .right("h:help")
//!     .render(area, &mut buf);
//! assert_eq!(buf[(1, 0)].symbol(), "B");
//! ```

pub mod commit;
pub mod help;
pub mod status_bar;
pub mod tree_view;

pub use commit::{CommitEditor, CommitOutcome, CommitResults, CommitView};
pub use help::HelpView;
pub use status_bar::StatusBar;
pub use tree_view::TreeView;

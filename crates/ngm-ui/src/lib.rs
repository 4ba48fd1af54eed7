//! # ngm-ui
//!
//! The interactive side of ngm, built on [`ngm_core`] and [`ngm_git`]:
//!
//! - [`Tree`] - expandable model of repositories, changes and diff hunks
//! - [`App`] - the coordinator implementing [`ngm_core::AppCoordinator`]
//! - [`widgets`] - ratatui widgets drawing the tree, help, commit screens and
//!   status bar
//! - [`AppLayout`] - screen layout
//!
//! ## Example
//!
//! ```ignore
//! use ngm_ui::App;
//! use ngm_core::{AppCoordinator, Message};
//!
//! let mut app = App::new(root, &repos, backend, runner, theme);
//!
//! loop {
//!     terminal.draw(|f| app.render(f))?;
//!
//!     if let Event::Key(key) = event::read()? {
//!         app.dispatch(Message::Key(key));
//!     }
//!     app.tick();
//!
//!     if app.should_quit() {
//!         break;
//!     }
//! }
//! ```

pub mod app;
pub mod renderer;
pub mod tree;
pub mod widgets;

pub use app::{App, Mode};
pub use renderer::AppLayout;
pub use tree::{Node, NodeId, NodeKind, Tree};
pub use widgets::{StatusBar, TreeView};

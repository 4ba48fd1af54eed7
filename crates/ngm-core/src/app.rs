//! Application coordinator trait
//!
//! The terminal loop in the binary only knows this trait: it feeds
//! [`Message`]s in, calls [`AppCoordinator::tick`] between events and stops
//! once [`AppCoordinator::should_quit`] turns true.

use crate::event::Message;
use crate::theme::Theme;

/// Trait for the main application coordinator
///
/// # Example
///
/// ```
/// use ngm_core::{AppCoordinator, Message, Theme};
///
/// struct Counter {
///     theme: Theme,
///     moves: isize,
///     quit: bool,
/// }
///
/// impl AppCoordinator for Counter {
///     fn theme(&self) -> &Theme { &self.theme }
///     fn dispatch(&mut self, msg: Message) {
///         match msg {
///             Message::MoveCursor(n) => self.moves += n,
///             Message::Quit => self.quit = true,
///             _ => {}
///         }
///     }
///     fn tick(&mut self) {}
///     fn should_quit(&self) -> bool { self.quit }
/// }
///
/// let mut app = Counter { theme: Theme::default(), moves: 0, quit: false };
/// app.dispatch(Message::MoveCursor(2));
/// app.dispatch(Message::Quit);
/// assert_eq!(app.moves, 2);
/// assert!(app.should_quit());
/// ```
pub trait AppCoordinator {
    /// Returns the current theme
    fn theme(&self) -> &Theme;

    /// Dispatch a message to be processed
    fn dispatch(&mut self, msg: Message);

    /// Called on each iteration of the main loop after input was handled
    fn tick(&mut self);

    /// Returns true if the application should quit
    fn should_quit(&self) -> bool;
}

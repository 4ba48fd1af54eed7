//! Messages flowing from the terminal into the application
//!
//! Raw terminal events are wrapped in [`Message::Key`] / [`Message::Resize`];
//! the coordinator turns keys into the semantic variants depending on its
//! current mode.

use crossterm::event::{Event, KeyEvent};

/// Messages understood by the application coordinator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Message {
    // === Navigation ===
    /// Move the cursor by a signed number of rows
    MoveCursor(isize),
    /// Move the cursor by one viewport
    PageUp,
    PageDown,
    /// Jump to the first row
    Top,
    /// Jump to the last row
    Bottom,

    // === Tree actions ===
    /// Expand or collapse the node under the cursor
    Toggle,
    /// Stage the change under the cursor
    Stage,
    /// Unstage the change under the cursor
    Unstage,
    /// Re-fetch every repository
    Refresh,

    // === Commit ===
    /// Open the commit message editor
    StartCommit,
    /// Commit the edited message in every repository with staged changes
    SubmitCommit,
    /// Leave the editor or results screen
    CancelCommit,

    // === Global ===
    /// Quit the application
    Quit,
    /// Toggle the help screen
    ToggleHelp,

    // === Input ===
    /// Keyboard input event
    Key(KeyEvent),
    /// Bracketed paste
    Paste(String),
    /// Terminal resize event
    Resize(u16, u16),

    // === Batch ===
    /// Multiple messages to process in sequence
    Batch(Vec<Message>),

    /// No operation (used for optional returns)
    #[default]
    None,
}

impl Message {
    /// Creates a batch of messages
    pub fn batch(messages: Vec<Message>) -> Self {
        Message::Batch(messages)
    }

    /// Returns true if this is a no-op message
    pub fn is_none(&self) -> bool {
        matches!(self, Message::None)
    }

    /// Flattens nested batch messages into a single level, dropping no-ops
    pub fn flatten(self) -> Vec<Message> {
        match self {
            Message::Batch(msgs) => msgs.into_iter().flat_map(|m| m.flatten()).collect(),
            Message::None => vec![],
            other => vec![other],
        }
    }
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Message::Key(key),
            Event::Paste(text) => Message::Paste(text),
            Event::Resize(w, h) => Message::Resize(w, h),
            _ => Message::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_message_none_is_default() {
        assert!(Message::default().is_none());
        assert!(!Message::Quit.is_none());
    }

    #[test]
    fn test_message_flatten_nested_batch() {
        let msg = Message::batch(vec![
            Message::Quit,
            Message::None,
            Message::Batch(vec![Message::Toggle, Message::MoveCursor(1)]),
        ]);
        assert_eq!(
            msg.flatten(),
            vec![Message::Quit, Message::Toggle, Message::MoveCursor(1)]
        );
    }

    #[test]
    fn test_message_from_key_event() {
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(Message::from(Event::Key(key)), Message::Key(key));
    }

    #[test]
    fn test_message_from_resize_and_focus() {
        assert_eq!(Message::from(Event::Resize(80, 24)), Message::Resize(80, 24));
        assert_eq!(Message::from(Event::FocusGained), Message::None);
    }

    #[test]
    fn test_message_from_paste() {
        assert_eq!(
            Message::from(Event::Paste("fix: typo".into())),
            Message::Paste("fix: typo".into())
        );
    }
}

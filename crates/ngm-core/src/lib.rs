//! # ngm-core
//!
//! Shared building blocks for the ngm terminal interface.
//!
//! - [`AppCoordinator`] - Trait driven by the terminal loop
//! - [`Message`] - Input and action messages
//! - [`Theme`] - Built-in and file-based colour themes
//! - [`CoreError`] - Error types for the above

pub mod app;
pub mod error;
pub mod event;
pub mod theme;

pub use app::AppCoordinator;
pub use error::{CoreError, CoreResult};
pub use event::Message;
pub use theme::{Theme, ThemeColors};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _ = Message::Quit;
        let _ = CoreError::UnknownTheme("x".into());
        let theme = Theme::default();
        let _: &ThemeColors = &theme.colors;
    }

    #[test]
    fn test_core_result_usage() {
        fn pick(name: &str) -> CoreResult<String> {
            Ok(Theme::by_name(name)?.name)
        }

        assert_eq!(pick("light").ok().as_deref(), Some("Light"));
        assert!(pick("sepia").is_err());
    }
}

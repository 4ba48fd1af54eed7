//! Colour themes
//!
//! Themes are either built in (`frappe`, `dark`, `light`, `nord`) or loaded
//! from a TOML file with the same shape as [`Theme`].

use crate::error::{CoreError, CoreResult};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete theme definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    /// Theme display name
    pub name: String,
    /// Color palette
    pub colors: ThemeColors,
}

/// Color palette for the theme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeColors {
    #[serde(with = "color_serde")]
    pub background: Color,
    #[serde(with = "color_serde")]
    pub foreground: Color,
    /// Repository rows and branch glyphs
    #[serde(with = "color_serde")]
    pub accent: Color,
    /// Cursor row background
    #[serde(with = "color_serde")]
    pub selection: Color,
    #[serde(with = "color_serde")]
    pub error: Color,
    #[serde(with = "color_serde")]
    pub warning: Color,
    #[serde(with = "color_serde")]
    pub success: Color,
    /// Section headers, placeholders and hints
    #[serde(with = "color_serde")]
    pub muted: Color,
    #[serde(with = "color_serde")]
    pub staged: Color,
    #[serde(with = "color_serde")]
    pub unstaged: Color,
    #[serde(with = "color_serde")]
    pub untracked: Color,
    /// `@@` lines
    #[serde(with = "color_serde")]
    pub hunk_header: Color,
    /// `+` lines
    #[serde(with = "color_serde")]
    pub added: Color,
    /// `-` lines
    #[serde(with = "color_serde")]
    pub removed: Color,
}

/// Custom serde module for ratatui Color
mod color_serde {
    use ratatui::style::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Color, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match color {
            Color::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
            Color::Indexed(i) => format!("indexed:{}", i),
            Color::Reset => "reset".to_string(),
            Color::DarkGray => "darkgray".to_string(),
            Color::LightRed => "lightred".to_string(),
            Color::LightGreen => "lightgreen".to_string(),
            Color::LightYellow => "lightyellow".to_string(),
            Color::LightBlue => "lightblue".to_string(),
            Color::LightMagenta => "lightmagenta".to_string(),
            Color::LightCyan => "lightcyan".to_string(),
            named => format!("{:?}", named).to_lowercase(),
        };
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_color(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_color(s: &str) -> Result<Color, String> {
        let lower = s.to_lowercase();
        if let Some(hex) = lower.strip_prefix('#') {
            let channel = |range: std::ops::Range<usize>| {
                hex.get(range)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| format!("invalid hex color: {}", s))
            };
            if hex.len() != 6 {
                return Err(format!("invalid hex color: {}", s));
            }
            return Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }
        if let Some(idx) = lower.strip_prefix("indexed:") {
            return idx
                .parse::<u8>()
                .map(Color::Indexed)
                .map_err(|_| format!("invalid indexed color: {}", s));
        }
        match lower.as_str() {
            "reset" => Ok(Color::Reset),
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "gray" | "grey" => Ok(Color::Gray),
            "darkgray" | "darkgrey" => Ok(Color::DarkGray),
            "lightred" => Ok(Color::LightRed),
            "lightgreen" => Ok(Color::LightGreen),
            "lightyellow" => Ok(Color::LightYellow),
            "lightblue" => Ok(Color::LightBlue),
            "lightmagenta" => Ok(Color::LightMagenta),
            "lightcyan" => Ok(Color::LightCyan),
            "white" => Ok(Color::White),
            _ => Err(format!("unknown color: {}", s)),
        }
    }
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

impl Theme {
    /// Names accepted by [`Theme::by_name`]
    pub const BUILT_IN: [&'static str; 4] = ["frappe", "dark", "light", "nord"];

    /// Catppuccin Frappé, the default
    pub fn frappe() -> Self {
        Theme {
            name: "Frappe".to_string(),
            colors: ThemeColors {
                background: hex(0x303446),  // base
                foreground: hex(0xc6d0f5),  // text
                accent: hex(0xca9ee6),      // mauve
                selection: hex(0x51576d),   // surface1
                error: hex(0xe78284),       // red
                warning: hex(0xe5c890),     // yellow
                success: hex(0xa6d189),     // green
                muted: hex(0x838ba7),       // overlay1
                staged: hex(0xa6d189),      // green
                unstaged: hex(0xe78284),    // red
                untracked: hex(0xea999c),   // maroon
                hunk_header: hex(0x85c1dc), // sapphire
                added: hex(0xa6d189),       // green
                removed: hex(0xe78284),     // red
            },
        }
    }

    /// Catppuccin Mocha
    pub fn dark() -> Self {
        Theme {
            name: "Dark".to_string(),
            colors: ThemeColors {
                background: hex(0x1e1e2e),
                foreground: hex(0xcdd6f4),
                accent: hex(0x89b4fa),
                selection: hex(0x585b70),
                error: hex(0xf38ba8),
                warning: hex(0xf9e2af),
                success: hex(0xa6e3a1),
                muted: hex(0x9399b2),
                staged: hex(0xa6e3a1),
                unstaged: hex(0xf38ba8),
                untracked: hex(0xeba0ac),
                hunk_header: hex(0x74c7ec),
                added: hex(0xa6e3a1),
                removed: hex(0xf38ba8),
            },
        }
    }

    /// Catppuccin Latte
    pub fn light() -> Self {
        Theme {
            name: "Light".to_string(),
            colors: ThemeColors {
                background: hex(0xeff1f5),
                foreground: hex(0x4c4f69),
                accent: hex(0x1e66f5),
                selection: hex(0xbcc0cc),
                error: hex(0xd20f39),
                warning: hex(0xdf8e1d),
                success: hex(0x40a02b),
                muted: hex(0x6c6f85),
                staged: hex(0x40a02b),
                unstaged: hex(0xd20f39),
                untracked: hex(0xe64553),
                hunk_header: hex(0x209fb5),
                added: hex(0x40a02b),
                removed: hex(0xd20f39),
            },
        }
    }

    pub fn nord() -> Self {
        Theme {
            name: "Nord".to_string(),
            colors: ThemeColors {
                background: hex(0x2e3440),  // polar night
                foreground: hex(0xeceff4),  // snow storm
                accent: hex(0x88c0d0),      // frost
                selection: hex(0x434c5e),
                error: hex(0xbf616a),       // aurora red
                warning: hex(0xebcb8b),     // aurora yellow
                success: hex(0xa3be8c),     // aurora green
                muted: hex(0x4c566a),
                staged: hex(0xa3be8c),
                unstaged: hex(0xbf616a),
                untracked: hex(0xd08770),
                hunk_header: hex(0x81a1c1),
                added: hex(0xa3be8c),
                removed: hex(0xbf616a),
            },
        }
    }

    /// Look up a built-in theme by (case-insensitive) name
    pub fn by_name(name: &str) -> CoreResult<Self> {
        match name.to_lowercase().as_str() {
            "frappe" | "frappé" => Ok(Theme::frappe()),
            "dark" | "mocha" => Ok(Theme::dark()),
            "light" | "latte" => Ok(Theme::light()),
            "nord" => Ok(Theme::nord()),
            _ => Err(CoreError::UnknownTheme(name.to_string())),
        }
    }

    /// Resolve a configured theme: a built-in name or a path to a `.toml` file
    pub fn resolve(value: &str) -> CoreResult<Self> {
        if value.ends_with(".toml") {
            Theme::load(Path::new(value))
        } else {
            Theme::by_name(value)
        }
    }

    /// Load a theme file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Theme::from_toml(&content)?)
    }

    /// Parses a theme from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serializes the theme to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // Style helpers shared by the widgets

    pub fn base(&self) -> Style {
        Style::default().fg(self.colors.foreground)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.muted)
    }

    pub fn accent(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.colors.error)
    }

    pub fn selected(&self) -> Style {
        Style::default().bg(self.colors.selection)
    }

    /// Style for a diff line, picked from its first character
    pub fn diff_line(&self, line: &str) -> Style {
        match line.as_bytes().first() {
            Some(b'@') => Style::default().fg(self.colors.hunk_header),
            Some(b'+') => Style::default().fg(self.colors.added),
            Some(b'-') => Style::default().fg(self.colors.removed),
            _ => self.base(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::frappe()
    }
}

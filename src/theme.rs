// Theme support for the TUI host
//
// Color palettes for transcript rendering. "auto" uses the terminal's ANSI
// palette; named themes use true color (RGB).

use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Color palette used by `TuiHost`.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_type: BorderType,
    pub highlight: Color,

    // Component colors
    pub error: Color,
    pub heading: Color,
    pub code_inline: Color,
    pub code_block: Color,
    pub metric_value: Color,
    pub delta_up: Color,
    pub delta_down: Color,

    // Message-group identity colors
    pub role_user: Color,
    pub role_assistant: Color,
}

impl Theme {
    /// Load theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::dracula(),
            "nord" => Self::nord(),
            _ => Self::auto(), // "auto" or unknown
        }
    }

    /// Auto theme - uses terminal's ANSI palette
    pub fn auto() -> Self {
        Self {
            name: "auto".to_string(),
            background: Color::Reset,
            foreground: Color::Reset,
            border: Color::DarkGray,
            border_type: BorderType::Rounded,
            highlight: Color::Yellow,
            error: Color::Red,
            heading: Color::Cyan,
            code_inline: Color::Green,
            code_block: Color::Green,
            metric_value: Color::Cyan,
            delta_up: Color::Green,
            delta_down: Color::Red,
            role_user: Color::Blue,
            role_assistant: Color::Magenta,
        }
    }

    /// Dracula theme - https://draculatheme.com
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            background: Color::Rgb(0x28, 0x2a, 0x36),
            foreground: Color::Rgb(0xf8, 0xf8, 0xf2),
            border: Color::Rgb(0x62, 0x72, 0xa4), // comment
            border_type: BorderType::Rounded,
            highlight: Color::Rgb(0xf1, 0xfa, 0x8c), // yellow
            error: Color::Rgb(0xff, 0x55, 0x55),     // red
            heading: Color::Rgb(0x8b, 0xe9, 0xfd),   // cyan
            code_inline: Color::Rgb(0x50, 0xfa, 0x7b), // green
            code_block: Color::Rgb(0x50, 0xfa, 0x7b), // green
            metric_value: Color::Rgb(0x8b, 0xe9, 0xfd), // cyan
            delta_up: Color::Rgb(0x50, 0xfa, 0x7b),  // green
            delta_down: Color::Rgb(0xff, 0x55, 0x55), // red
            role_user: Color::Rgb(0xbd, 0x93, 0xf9), // purple
            role_assistant: Color::Rgb(0xff, 0x79, 0xc6), // pink
        }
    }

    /// Nord theme - https://nordtheme.com
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::Rgb(0x2e, 0x34, 0x40),
            foreground: Color::Rgb(0xd8, 0xde, 0xe9),
            border: Color::Rgb(0x4c, 0x56, 0x6a),
            border_type: BorderType::Plain,
            highlight: Color::Rgb(0xeb, 0xcb, 0x8b), // yellow
            error: Color::Rgb(0xbf, 0x61, 0x6a),     // red
            heading: Color::Rgb(0x88, 0xc0, 0xd0),   // frost
            code_inline: Color::Rgb(0xa3, 0xbe, 0x8c), // green
            code_block: Color::Rgb(0xa3, 0xbe, 0x8c), // green
            metric_value: Color::Rgb(0x88, 0xc0, 0xd0), // frost
            delta_up: Color::Rgb(0xa3, 0xbe, 0x8c),  // green
            delta_down: Color::Rgb(0xbf, 0x61, 0x6a), // red
            role_user: Color::Rgb(0x81, 0xa1, 0xc1), // blue
            role_assistant: Color::Rgb(0xb4, 0x8e, 0xad), // purple
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::auto()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(Theme::by_name("DRACULA").name, "dracula");
        assert_eq!(Theme::by_name("Nord").name, "nord");
    }

    #[test]
    fn test_unknown_name_falls_back_to_auto() {
        assert_eq!(Theme::by_name("no-such-theme").name, "auto");
    }
}

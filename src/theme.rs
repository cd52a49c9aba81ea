//! Theme colors, with optional hex overrides from the config file

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,           // Focused control, time display
    pub warning: Color,          // Status line, paused display
    pub danger: Color,           // Final seconds
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, placeholder
    pub inactive: Color,         // Unfocused borders
    pub bg_selected: Color,      // Focused button background
    pub header: Color,           // Title and help headings
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired
        Self {
            accent: Color::Rgb(250, 179, 135),
            warning: Color::Rgb(249, 226, 175),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Build a theme from config; unset or unparsable entries keep the default
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();

        let pick = |name: &str, value: &Option<String>, fallback: Color| -> Color {
            match value.as_deref() {
                None => fallback,
                Some(s) => Self::parse_hex_color(s).unwrap_or_else(|| {
                    tracing::warn!("Ignoring invalid theme color {} = {:?}", name, s);
                    fallback
                }),
            }
        };

        Self {
            accent: pick("accent", &config.accent, base.accent),
            warning: pick("warning", &config.warning, base.warning),
            danger: pick("danger", &config.danger, base.danger),
            text: pick("text", &config.text, base.text),
            text_dim: pick("text_dim", &config.text_dim, base.text_dim),
            inactive: pick("inactive", &config.inactive, base.inactive),
            bg_selected: pick("bg_selected", &config.bg_selected, base.bg_selected),
            header: pick("header", &config.header, base.header),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12"), None);
        assert_eq!(Theme::parse_hex_color("#GGGGGG"), None);
        assert_eq!(Theme::parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_from_config_overrides_and_fallbacks() {
        let config = ThemeConfig {
            accent: Some("#010203".to_string()),
            danger: Some("not a color".to_string()),
            ..Default::default()
        };
        let theme = Theme::from_config(&config);
        let base = Theme::default();

        assert_eq!(theme.accent, Color::Rgb(1, 2, 3));
        assert_eq!(theme.danger, base.danger);
        assert_eq!(theme.text, base.text);
    }
}

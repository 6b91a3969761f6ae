//! UI Theme Module - color palette and the status-to-theme table
//!
//! Every status maps to a small set of colors (text, accent, border) the
//! way the web version mapped them to emerald, amber and rose shades.
//! Anything without a status uses the neutral zinc entry.

use ratatui::style::{Color, Modifier, Style};

use statuslite_core::model::ServiceStatus;

/// Colors used to render one status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusColors {
    /// Badge and label text
    pub text: Color,
    /// Dots, bars and glow
    pub accent: Color,
    /// Card and banner borders
    pub border: Color,
}

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (tertiary info, disabled)
    pub text_muted: Color,
    /// Accent color (highlights, focus)
    pub accent: Color,
    /// Selection background
    pub selection_bg: Color,
    /// Key hint text
    pub key_hint: Color,
    pub operational: StatusColors,
    pub degraded: StatusColors,
    pub outage: StatusColors,
    pub neutral: StatusColors,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// Zinc-on-black dark theme
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(39, 39, 42),
            text: Color::Rgb(244, 244, 245),
            text_dim: Color::Rgb(161, 161, 170),
            text_muted: Color::Rgb(113, 113, 122),
            accent: Color::White,
            selection_bg: Color::Rgb(39, 39, 42),
            key_hint: Color::Rgb(212, 212, 216),
            // emerald-400 / emerald-500 / emerald-900
            operational: StatusColors {
                text: Color::Rgb(52, 211, 153),
                accent: Color::Rgb(16, 185, 129),
                border: Color::Rgb(6, 78, 59),
            },
            // amber-400 / amber-500 / amber-900
            degraded: StatusColors {
                text: Color::Rgb(251, 191, 36),
                accent: Color::Rgb(245, 158, 11),
                border: Color::Rgb(120, 53, 15),
            },
            // rose-400 / rose-500 / rose-900
            outage: StatusColors {
                text: Color::Rgb(251, 113, 133),
                accent: Color::Rgb(244, 63, 94),
                border: Color::Rgb(136, 19, 55),
            },
            // zinc-400 / zinc-500 / zinc-800
            neutral: StatusColors {
                text: Color::Rgb(161, 161, 170),
                accent: Color::Rgb(113, 113, 122),
                border: Color::Rgb(39, 39, 42),
            },
        }
    }

    /// Plain ANSI colors for terminals without truecolor
    pub fn basic() -> Self {
        Self {
            panel_border: Color::DarkGray,
            text: Color::White,
            text_dim: Color::Gray,
            text_muted: Color::DarkGray,
            accent: Color::White,
            selection_bg: Color::DarkGray,
            key_hint: Color::Yellow,
            operational: StatusColors {
                text: Color::Green,
                accent: Color::Green,
                border: Color::Green,
            },
            degraded: StatusColors {
                text: Color::Yellow,
                accent: Color::Yellow,
                border: Color::Yellow,
            },
            outage: StatusColors {
                text: Color::Red,
                accent: Color::Red,
                border: Color::Red,
            },
            neutral: StatusColors {
                text: Color::Gray,
                accent: Color::DarkGray,
                border: Color::DarkGray,
            },
        }
    }
}

/// Theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(Self::detect_palette())
    }
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Truecolor terminals get the dark palette, everything else basic colors
    fn detect_palette() -> Palette {
        match std::env::var("COLORTERM") {
            Ok(v) if v == "truecolor" || v == "24bit" => Palette::dark(),
            _ => Palette::basic(),
        }
    }

    /// Colors for a status; `None` means neutral
    pub fn colors(&self, status: Option<ServiceStatus>) -> StatusColors {
        match status {
            Some(ServiceStatus::Operational) => self.palette.operational,
            Some(ServiceStatus::Degraded) => self.palette.degraded,
            Some(ServiceStatus::Outage) => self.palette.outage,
            None => self.palette.neutral,
        }
    }

    pub fn status_style(&self, status: ServiceStatus) -> Style {
        Style::default().fg(self.colors(Some(status)).text)
    }

    /// Bold uppercase badge style
    pub fn badge_style(&self, status: ServiceStatus) -> Style {
        self.status_style(status).add_modifier(Modifier::BOLD)
    }

    pub fn status_icon(&self, status: ServiceStatus) -> &'static str {
        match status {
            ServiceStatus::Operational => "●",
            ServiceStatus::Degraded => "◐",
            ServiceStatus::Outage => "✗",
        }
    }

    pub fn status_border_style(&self, status: ServiceStatus) -> Style {
        Style::default().fg(self.colors(Some(status)).border)
    }

    /// Style for key hints in footer
    pub fn key_hint_style(&self) -> Style {
        Style::default()
            .fg(self.palette.key_hint)
            .add_modifier(Modifier::BOLD)
    }

    pub fn subtle_border_style(&self) -> Style {
        Style::default().fg(self.palette.panel_border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }

    pub fn text_muted_style(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.palette.outage.text)
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

/// Get the default theme
pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

/// Convenience re-exports for common use cases
pub mod styles {
    use super::*;

    pub fn badge(status: ServiceStatus) -> Style {
        theme().badge_style(status)
    }

    pub fn status_icon(status: ServiceStatus) -> &'static str {
        theme().status_icon(status)
    }

    pub fn status_border(status: ServiceStatus) -> Style {
        theme().status_border_style(status)
    }

    /// Colors for an optional status; `None` gets the neutral entry
    pub fn tone(status: Option<ServiceStatus>) -> StatusColors {
        theme().colors(status)
    }

    pub fn key_hint() -> Style {
        theme().key_hint_style()
    }

    pub fn border_subtle() -> Style {
        theme().subtle_border_style()
    }

    pub fn border_focused() -> Style {
        theme().focused_border_style()
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn text() -> Style {
        theme().text_style()
    }

    pub fn text_dim() -> Style {
        theme().text_dim_style()
    }

    pub fn text_muted() -> Style {
        theme().text_muted_style()
    }

    pub fn title() -> Style {
        theme().title_style()
    }

    pub fn error() -> Style {
        theme().error_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_status_has_distinct_colors() {
        let theme = Theme::new(Palette::dark());
        let op = theme.colors(Some(ServiceStatus::Operational));
        let deg = theme.colors(Some(ServiceStatus::Degraded));
        let out = theme.colors(Some(ServiceStatus::Outage));

        assert_ne!(op.text, deg.text);
        assert_ne!(deg.text, out.text);
        assert_ne!(op.accent, out.accent);
        assert_eq!(op.accent, Color::Rgb(16, 185, 129));
    }

    #[test]
    fn test_neutral_fallback() {
        let theme = Theme::new(Palette::basic());
        assert_eq!(theme.colors(None), theme.palette.neutral);
        assert_eq!(theme.colors(None).text, Color::Gray);
    }

    #[test]
    fn test_badge_is_bold() {
        let theme = Theme::new(Palette::dark());
        let style = theme.badge_style(ServiceStatus::Outage);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style.fg, Some(Color::Rgb(251, 113, 133)));
    }
}

use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Application theme.
///
/// Holds all color values directly, independent of any specific palette.
/// Use [`theme_from_name`] to pick a pre-configured Catppuccin flavor.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub subtext: Color,
    pub overlay: Color,
    pub surface: Color,

    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub mauve: Color,
    pub peach: Color,
    pub lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            text: catppuccin_to_color(&c.text),
            subtext: catppuccin_to_color(&c.subtext1),
            overlay: catppuccin_to_color(&c.overlay0),
            surface: catppuccin_to_color(&c.surface1),
            red: catppuccin_to_color(&c.red),
            green: catppuccin_to_color(&c.green),
            yellow: catppuccin_to_color(&c.yellow),
            blue: catppuccin_to_color(&c.blue),
            mauve: catppuccin_to_color(&c.mauve),
            peach: catppuccin_to_color(&c.peach),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    pub const fn mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    pub const fn macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    pub const fn frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    pub const fn latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }
}

/// Resolve a configured theme name; unknown names fall back to Mocha.
pub fn theme_from_name(name: &str) -> Theme {
    match name.to_ascii_lowercase().as_str() {
        "catppuccin latte" | "latte" => Theme::latte(),
        "catppuccin frappe" | "frappe" => Theme::frappe(),
        "catppuccin macchiato" | "macchiato" => Theme::macchiato(),
        _ => Theme::mocha(),
    }
}

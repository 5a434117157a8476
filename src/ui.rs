// src/ui.rs
use iced::widget::{button, container};
use iced::{Background, Color, Theme};
use once_cell::sync::Lazy;

pub struct Palette {
    pub success_bg: Color,
    pub success_fg: Color,
    pub error_bg: Color,
    pub error_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub accent: Color,
}

pub static PALETTE: Lazy<Palette> = Lazy::new(|| Palette {
    success_bg: Color::from_rgb(0.13, 0.38, 0.20),
    success_fg: Color::from_rgb(0.85, 1.0, 0.9),
    error_bg: Color::from_rgb(0.45, 0.12, 0.12),
    error_fg: Color::from_rgb(1.0, 0.88, 0.88),
    header_bg: Color::from_rgb(0.0078, 0.325, 0.6118), // #02539c
    header_fg: Color::from_rgb(1.0, 1.0, 1.0),
    accent: Color::from_rgb(0.35, 0.62, 0.95),
});

/// Flat colored container used for banners and table header cells.
pub struct PanelStyle {
    pub bg: Color,
    pub fg: Color,
}

impl container::StyleSheet for PanelStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.bg)),
            text_color: Some(self.fg),
            border_radius: 4.0.into(),
            border_width: 0.0,
            border_color: Color::TRANSPARENT,
        }
    }
}

/// Accent-colored button, brightened on hover.
pub struct AccentButton;

impl button::StyleSheet for AccentButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(PALETTE.accent)),
            border_radius: 4.0.into(),
            text_color: Color::WHITE,
            ..button::Appearance::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(Color {
                a: 0.85,
                ..PALETTE.accent
            })),
            ..self.active(style)
        }
    }
}

pub fn accent_style() -> iced::theme::Button {
    iced::theme::Button::Custom(Box::new(AccentButton))
}

pub fn success_style() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(PanelStyle {
        bg: PALETTE.success_bg,
        fg: PALETTE.success_fg,
    }))
}

pub fn error_style() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(PanelStyle {
        bg: PALETTE.error_bg,
        fg: PALETTE.error_fg,
    }))
}

pub fn header_style() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(PanelStyle {
        bg: PALETTE.header_bg,
        fg: PALETTE.header_fg,
    }))
}

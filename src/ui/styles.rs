//! # UI Styling Module
//!
//! Centralized styling utilities for consistent UI appearance across components.
//! Extracts complex button and widget styling logic for reusability.

use crate::body::BodyRegion;
use iced::widget::button;
use iced::{Background, Border, Color};

fn darken(color: Color, factor: f32) -> Color {
    Color {
        r: color.r * factor,
        g: color.g * factor,
        b: color.b * factor,
        a: color.a,
    }
}

/// Style for body-region buttons.
///
/// Idle regions are neutral; hovering (or selecting) a region fills it
/// with that region's fixed highlight color.
pub fn body_region_style(
    region: BodyRegion,
    is_selected: bool,
) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme: &iced::Theme, status: button::Status| {
        let highlight = region.highlight_color();
        match status {
            button::Status::Active => {
                if is_selected {
                    button::Style {
                        background: Some(Background::Color(highlight)),
                        text_color: Color::from_rgb(0.15, 0.15, 0.15),
                        border: Border {
                            color: darken(highlight, 0.8),
                            width: 2.0,
                            radius: 8.0.into(),
                        },
                        ..Default::default()
                    }
                } else {
                    button::Style {
                        background: Some(Background::Color(Color::from_rgb(0.92, 0.93, 0.95))),
                        text_color: Color::from_rgb(0.25, 0.25, 0.3),
                        border: Border {
                            color: Color::from_rgb(0.8, 0.82, 0.85),
                            width: 1.0,
                            radius: 8.0.into(),
                        },
                        ..Default::default()
                    }
                }
            }
            button::Status::Hovered => button::Style {
                background: Some(Background::Color(highlight)),
                text_color: Color::from_rgb(0.15, 0.15, 0.15),
                border: Border {
                    color: darken(highlight, 0.75),
                    width: 2.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            },
            button::Status::Pressed => button::Style {
                background: Some(Background::Color(darken(highlight, 0.85))),
                text_color: Color::from_rgb(0.1, 0.1, 0.1),
                border: Border {
                    color: darken(highlight, 0.7),
                    width: 2.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            },
            button::Status::Disabled => button::Style {
                background: Some(Background::Color(Color::from_rgb(0.85, 0.85, 0.85))),
                text_color: Color::from_rgb(0.6, 0.6, 0.6),
                border: Border {
                    color: Color::from_rgb(0.75, 0.75, 0.75),
                    width: 1.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            },
        }
    }
}

/// Style for the primary action button (green theme)
pub fn primary_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |_theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.2, 0.7, 0.2))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.3, 0.8, 0.3),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.3, 0.8, 0.3))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.4, 0.9, 0.4),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.15, 0.6, 0.15))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.2, 0.7, 0.2),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        _ => button::Style::default(),
    }
}

/// Style for destructive actions like reset (red theme)
pub fn danger_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |_theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.8, 0.2, 0.2))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.9, 0.3, 0.3),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.9, 0.3, 0.3))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(1.0, 0.4, 0.4),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.7, 0.15, 0.15))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.8, 0.2, 0.2),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        _ => button::Style::default(),
    }
}

/// Style for secondary controls like play/pause and exports (teal theme)
pub fn control_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |_theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.2, 0.6, 0.7))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.3, 0.7, 0.8),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.3, 0.7, 0.8))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.4, 0.8, 0.9),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Pressed => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.15, 0.5, 0.6))),
            text_color: Color::WHITE,
            border: Border {
                color: Color::from_rgb(0.2, 0.6, 0.7),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
        button::Status::Disabled => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.3, 0.3, 0.3))),
            text_color: Color::from_rgb(0.6, 0.6, 0.6),
            border: Border {
                color: Color::from_rgb(0.4, 0.4, 0.4),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        },
    }
}

/// Status line color: ready is green, processing amber, errors red
pub fn status_color(is_error: bool, is_processing: bool) -> Color {
    if is_error {
        Color::from_rgb(0.8, 0.2, 0.2)
    } else if is_processing {
        Color::from_rgb(0.85, 0.6, 0.1)
    } else {
        Color::from_rgb(0.2, 0.6, 0.3)
    }
}

use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

/// Error banner above the customer table
pub fn banner_style() -> Style {
    Style::default()
        .bg(Color::Rgb(72, 24, 24))
        .fg(Color::Rgb(255, 205, 210))
}

/// Typed text inside a dialog input
pub fn input_style(focused: bool) -> Style {
    if focused {
        Style::default().bg(HIGHLIGHT).fg(Color::White)
    } else {
        list_item_style()
    }
}

/// The `*` after a required field's label
pub fn required_marker_style() -> Style {
    Style::default().fg(ERROR)
}

/// Dialog buttons; the focused one is filled with the primary color
pub fn button_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .bg(PRIMARY)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(PRIMARY)
    }
}

/// Text input box; red border when the field failed validation
pub fn field_border_style(focused: bool, invalid: bool) -> Style {
    if invalid {
        error_style()
    } else {
        border_style(focused)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

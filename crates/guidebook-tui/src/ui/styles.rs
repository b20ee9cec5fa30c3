use ratatui::style::{Color, Modifier, Style};

// Color palette
pub const BACKGROUND: Color = Color::Rgb(7, 10, 16);
pub const PRIMARY: Color = Color::Rgb(88, 166, 255);
pub const SECONDARY: Color = Color::Rgb(96, 176, 120);
pub const ACCENT: Color = Color::Rgb(214, 176, 84);
pub const DANGER: Color = Color::Rgb(224, 82, 82);
pub const MUTED: Color = Color::Rgb(128, 132, 144);
pub const HIGHLIGHT: Color = Color::Rgb(36, 44, 60);

// Styles
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

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn danger_style() -> Style {
    Style::default().fg(DANGER).add_modifier(Modifier::BOLD)
}

pub fn lang_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BACKGROUND).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

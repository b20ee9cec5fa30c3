//! One module per guide view, plus the screens shown when no guide is loaded.

pub mod emergency;
pub mod find;
pub mod home;
pub mod info;
pub mod screens;
pub mod wifi;

use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::app::App;
use crate::ui::styles;

/// Bordered panel with a styled title.
pub(crate) fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

/// Placeholder line for an item's photo. `None` when there is no photo or it
/// has loaded.
pub(crate) fn image_line(app: &App, url: Option<&str>, indent: &str) -> Option<Line<'static>> {
    let placeholder = app.images.placeholder(url?, app.online)?;
    Some(Line::from(Span::styled(
        format!("{}[{}]", indent, placeholder.message(app.view.lang)),
        styles::muted_style(),
    )))
}

pub(crate) fn bullet_lines(values: &[&str], indent: &str) -> Vec<Line<'static>> {
    values
        .iter()
        .map(|v| Line::from(format!("{}• {}", indent, v)))
        .collect()
}

pub(crate) fn numbered_lines(values: &[&str], indent: &str) -> Vec<Line<'static>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Line::from(vec![
                Span::styled(format!("{}{}. ", indent, i + 1), styles::highlight_style()),
                Span::raw(v.to_string()),
            ])
        })
        .collect()
}

/// Heading line followed by `lines`, skipped entirely when `lines` is empty.
pub(crate) fn section(out: &mut Vec<Line<'static>>, heading: &str, lines: Vec<Line<'static>>) {
    if lines.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push(Line::from(""));
    }
    out.push(Line::from(Span::styled(heading.to_string(), styles::highlight_style())));
    out.extend(lines);
}

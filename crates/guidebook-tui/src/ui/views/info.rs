//! House rules and checkout: both are ordered lists of localizable lines.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use guidebook_core::View;

use crate::app::App;
use crate::ui::styles;

use super::{numbered_lines, panel};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let (Some(loaded), Some(l)) = (app.loaded(), app.localizer()) else {
        return;
    };
    let entries = match app.view.view {
        View::Checkout => &loaded.guide.checkout,
        _ => &loaded.guide.rules,
    };

    let mut lines = vec![Line::from("")];
    let resolved = l.list(entries);
    if resolved.is_empty() {
        lines.push(Line::from(Span::styled(
            lang.pick("  Nothing listed.", "  Ingenting oppført."),
            styles::muted_style(),
        )));
    } else {
        lines.extend(numbered_lines(&resolved, "  "));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(app.view.view.title(lang).to_string(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

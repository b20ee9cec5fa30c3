use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, MENU};
use crate::ui::styles;

use super::panel;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(7)])
        .split(area);

    render_intro(frame, app, chunks[0]);
    render_menu(frame, app, chunks[1]);
}

fn render_intro(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(loaded), Some(l)) = (app.loaded(), app.localizer()) else {
        return;
    };
    let guide = &loaded.guide;

    let mut lines = vec![Line::from(Span::styled(
        l.text(&guide.name).to_string(),
        styles::title_style(),
    ))];
    let location = l.opt_text(guide.location.as_ref());
    if !location.is_empty() {
        lines.push(Line::from(Span::styled(location.to_string(), styles::muted_style())));
    }
    let description = l.opt_text(guide.description.as_ref());
    if !description.is_empty() {
        lines.push(Line::from(description.to_string()));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area.inner(Margin::new(2, 1)));
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let items: Vec<ListItem> = MENU
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let title_style = if i == 0 {
                styles::danger_style()
            } else {
                styles::highlight_style()
            };
            let line = Line::from(vec![
                Span::styled(format!(" {}  ", i + 1), styles::muted_style()),
                Span::styled(format!("{:<16}", view.title(lang)), title_style),
                Span::styled(view.hint(lang), styles::muted_style()),
            ]);
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(panel(lang.pick("Menu", "Meny").to_string(), true));

    let mut state = ListState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(list, area, &mut state);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use guidebook_core::utils::format::{clamp_text, CLAMP_LENGTH};

use crate::app::{App, AppState};
use crate::ui::styles;

use super::{image_line, panel};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let hint_height = if app.online { 0 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(hint_height),
            Constraint::Min(4),
        ])
        .split(area);

    render_search_box(frame, app, chunks[0]);
    if !app.online {
        let hint = app.view.lang.pick(
            " Offline: showing saved results, photos may be missing",
            " Uten nett: viser lagrede resultater, bilder kan mangle",
        );
        frame.render_widget(Paragraph::new(Span::styled(hint, styles::highlight_style())), chunks[1]);
    }
    render_results(frame, app, chunks[2]);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let searching = app.state == AppState::Searching;
    let line = if app.view.query.is_empty() && !searching {
        Line::from(Span::styled(
            lang.pick(" Press / to search", " Trykk / for å søke"),
            styles::muted_style(),
        ))
    } else {
        let cursor = if searching { "▌" } else { "" };
        Line::from(Span::styled(format!(" {}{}", app.view.query, cursor), styles::search_style()))
    };

    let block = panel(lang.pick("Search", "Søk").to_string(), searching);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let results = app.search_results();

    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(clamp_text(&entry.title, CLAMP_LENGTH), styles::highlight_style()),
                    Span::styled(format!("  {}", entry.category_name), styles::muted_style()),
                ]),
                Line::from(format!("  {}", clamp_text(&entry.location_text, CLAMP_LENGTH))),
            ];
            lines.extend(image_line(app, entry.image_url.as_deref(), "  "));
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(lines).style(style)
        })
        .collect();

    if items.is_empty() {
        let message = if app.search.is_empty() {
            lang.pick(" This guide lists no items yet.", " Guiden har ingen ting ennå.")
        } else {
            lang.pick(" Nothing matches your search.", " Ingenting passer søket.")
        };
        let block = panel(lang.pick("Results", "Resultater").to_string(), false);
        frame.render_widget(
            Paragraph::new(Span::styled(message, styles::muted_style())).block(block),
            area,
        );
        return;
    }

    let title = format!("{} ({})", lang.pick("Results", "Resultater"), results.len());
    let list = List::new(items).block(panel(title, app.state != AppState::Searching));

    let mut state = ListState::default();
    state.select(Some(app.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

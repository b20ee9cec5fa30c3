use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::{bullet_lines, panel, section};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let (Some(loaded), Some(l)) = (app.loaded(), app.localizer()) else {
        return;
    };
    let Some(wifi) = loaded.guide.wifi.as_ref() else {
        let paragraph = Paragraph::new(Span::styled(
            lang.pick(" This guide has no Wi-Fi details.", " Guiden har ingen Wi-Fi-info."),
            styles::muted_style(),
        ))
        .block(panel("Wi-Fi".to_string(), false));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let rows = [
        (lang.pick("Network", "Nettverk"), wifi.name.as_str()),
        (lang.pick("Password", "Passord"), wifi.password.as_str()),
    ];
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let line = Line::from(vec![
                Span::styled(format!(" {:<10}", label), styles::muted_style()),
                Span::styled(value.to_string(), styles::success_style()),
            ]);
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = format!("Wi-Fi  {}", lang.pick("(Enter copies)", "(Enter kopierer)"));
    let list = List::new(items).block(panel(title, true));
    let mut state = ListState::default();
    state.select(Some(app.selection));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let mut lines = Vec::new();
    section(
        &mut lines,
        lang.pick("Trouble connecting?", "Problemer med tilkobling?"),
        bullet_lines(&l.list(&wifi.troubleshooting), "  "),
    );
    let paragraph = Paragraph::new(lines)
        .block(panel(lang.pick("Help", "Hjelp").to_string(), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);
}

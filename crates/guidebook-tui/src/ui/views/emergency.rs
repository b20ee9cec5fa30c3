use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use guidebook_core::models::Guide;
use guidebook_core::i18n::Localizer;

use crate::app::App;
use crate::ui::styles;

use super::{bullet_lines, image_line, numbered_lines, panel, section};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(loaded), Some(l)) = (app.loaded(), app.localizer()) else {
        return;
    };
    let guide = &loaded.guide;

    let contacts_height = (guide.emergency.contacts.len() as u16 + 2).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(contacts_height), Constraint::Min(5)])
        .split(area);

    render_contacts(frame, app, guide, l, chunks[0]);
    render_details(frame, app, guide, l, chunks[1]);
}

fn render_contacts(frame: &mut Frame, app: &App, guide: &Guide, l: Localizer, area: Rect) {
    let lang = app.view.lang;
    let items: Vec<ListItem> = guide
        .emergency
        .contacts
        .iter()
        .enumerate()
        .map(|(i, contact)| {
            let line = Line::from(vec![
                Span::styled(format!(" {:<24}", l.text(&contact.label)), styles::danger_style()),
                Span::styled(format!("{:<10}", contact.kind.display_name()), styles::muted_style()),
                Span::raw(contact.value.clone()),
            ]);
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = format!("{} ({})", lang.pick("Contacts", "Kontakter"), guide.emergency.contacts.len());
    let list = List::new(items).block(panel(title, true));

    let mut state = ListState::default();
    if !guide.emergency.contacts.is_empty() {
        state.select(Some(app.selection));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_details(frame: &mut Frame, app: &App, guide: &Guide, l: Localizer, area: Rect) {
    let lang = app.view.lang;
    let emergency = &guide.emergency;
    let mut lines: Vec<Line> = Vec::new();

    section(
        &mut lines,
        lang.pick("Safety", "Sikkerhet"),
        bullet_lines(&l.list(&emergency.safety_notes), "  "),
    );
    section(
        &mut lines,
        lang.pick("Do not", "Ikke gjør"),
        bullet_lines(&l.list(&emergency.do_not), "  "),
    );

    for item in &emergency.items {
        let mut body = vec![Line::from(vec![
            Span::styled(format!("  {} ", lang.pick("Where:", "Hvor:")), styles::muted_style()),
            Span::raw(l.text(&item.location_text).to_string()),
        ])];
        body.extend(image_line(app, item.image_url.as_deref(), "  "));
        body.extend(numbered_lines(&l.list(&item.steps), "  "));
        let stop = l.list(&item.stop_and_call);
        if !stop.is_empty() {
            body.push(Line::from(Span::styled(
                format!("  {}", lang.pick("Stop and call if:", "Stopp og ring hvis:")),
                styles::danger_style(),
            )));
            body.extend(bullet_lines(&stop, "    "));
        }
        section(&mut lines, l.text(&item.title), body);
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            lang.pick("  No emergency instructions.", "  Ingen nødinstrukser."),
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(lang.pick("What to do", "Hva du gjør").to_string(), false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

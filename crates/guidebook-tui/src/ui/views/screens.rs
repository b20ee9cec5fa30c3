//! Screens shown while no guide is on display.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use guidebook_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

use super::panel;

pub fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            lang.pick("No guide open", "Ingen guide åpen"),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(lang.pick("Press ", "Trykk "), styles::muted_style()),
            Span::styled("g", styles::help_key_style()),
            Span::styled(
                lang.pick(" to open a guide", " for å åpne en guide"),
                styles::muted_style(),
            ),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(guidebook_core::manifest::APP_SHORT_NAME.to_string(), false));
    frame.render_widget(paragraph, area);
}

pub fn render_loading(frame: &mut Frame, app: &App, slug: &str, area: Rect) {
    let lang = app.view.lang;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}…", lang.pick("Loading", "Laster"), truncate_string(slug, 40)),
            styles::highlight_style(),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(guidebook_core::manifest::APP_SHORT_NAME.to_string(), false));
    frame.render_widget(paragraph, area);
}

pub fn render_not_found(frame: &mut Frame, app: &App, slug: &str, area: Rect) {
    let lang = app.view.lang;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            lang.pick("Guide not found", "Fant ikke guiden"),
            styles::danger_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} \"{}\"",
                lang.pick("We couldn't load", "Vi kunne ikke laste"),
                truncate_string(slug, 40)
            ),
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            lang.pick(
                "Check the link, or try again when you're back online.",
                "Sjekk lenken, eller prøv igjen når du er på nett.",
            ),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(lang.pick(" Retry    ", " Prøv igjen    "), styles::list_item_style()),
            Span::styled("[h]", styles::help_key_style()),
            Span::styled(lang.pick(" Go home", " Til start"), styles::list_item_style()),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(guidebook_core::manifest::APP_SHORT_NAME.to_string(), false));
    frame.render_widget(paragraph, area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use guidebook_core::{Lang, View};

use crate::app::{App, AppState, GuideStatus};

use super::styles;
use super::views::{emergency, find, home, info, screens, wifi};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame, app.view.lang),
        AppState::EnteringSlug => render_slug_overlay(frame, app),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.view.lang;
    let title = match (app.loaded(), app.localizer()) {
        (Some(loaded), Some(l)) => format!("  {}", l.text(&loaded.guide.name)),
        _ => format!("  {}", guidebook_core::manifest::APP_NAME),
    };
    let section = match app.loaded() {
        Some(_) if app.view.view != View::Home => format!("  ›  {}", app.view.view.title(lang)),
        _ => String::new(),
    };

    let mut right: Vec<Span> = Vec::new();
    let langs = app.switchable_langs();
    if !langs.is_empty() {
        for (i, l) in langs.iter().enumerate() {
            if i > 0 {
                right.push(Span::styled("/", styles::muted_style()));
            }
            right.push(Span::styled(l.label(), styles::lang_style(*l == lang)));
        }
        right.push(Span::styled(" [l]   ", styles::muted_style()));
    }
    right.push(Span::styled("[?] Help", styles::muted_style()));

    let used = title.chars().count()
        + section.chars().count()
        + right.iter().map(|s| s.content.chars().count()).sum::<usize>()
        + 2;
    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::styled(section, styles::highlight_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
    ];
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.guide {
        GuideStatus::Empty => screens::render_empty(frame, app, area),
        GuideStatus::Loading { slug } => screens::render_loading(frame, app, slug, area),
        GuideStatus::NotFound { slug } => screens::render_not_found(frame, app, slug, area),
        GuideStatus::Loaded(_) => match app.view.view {
            View::Home => home::render(frame, app, area),
            View::Emergency => emergency::render(frame, app, area),
            View::Find => find::render(frame, app, area),
            View::Wifi => wifi::render(frame, app, area),
            View::Rules | View::Checkout => info::render(frame, app, area),
        },
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = shortcuts(app);

    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None => format!(" {} ", connection_summary(app)),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let left_style = if app.online {
        styles::muted_style()
    } else {
        styles::highlight_style()
    };
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Key hints; history keys only appear when there is somewhere to go.
fn shortcuts(app: &App) -> String {
    let lang = app.view.lang;
    if !matches!(app.guide, GuideStatus::Loaded(_)) {
        return lang.pick("[g]uide | [q]uit", "[g] guide | [q] avslutt").to_string();
    }

    let mut keys = vec![
        lang.pick("[e]mergency", "[e] nødhjelp"),
        lang.pick("[m]enu", "[m]eny"),
    ];
    if app.history.can_go_back() {
        keys.push(lang.pick("[b]ack", "[b] tilbake"));
    }
    if app.history.can_go_forward() {
        keys.push(lang.pick("[f]orward", "[f] frem"));
    }
    keys.push(lang.pick("[g]uide", "[g] guide"));
    keys.push(lang.pick("[q]uit", "[q] avslutt"));
    keys.join(" | ")
}

/// Online state plus where the guide came from.
fn connection_summary(app: &App) -> String {
    let lang = app.view.lang;
    let mut parts = vec![if app.online {
        lang.pick("Online", "Tilkoblet")
    } else {
        lang.pick("Offline", "Frakoblet")
    }
    .to_string()];

    if let Some(loaded) = app.loaded() {
        if loaded.from_cache() {
            parts.push(lang.pick("saved copy", "lagret kopi").to_string());
        }
    }
    if app.controller().is_some() {
        parts.push(lang.pick("offline ready", "klar uten nett").to_string());
    }
    let pending = app.images.pending();
    if pending > 0 {
        parts.push(format!("{} {}", pending, lang.pick("photos loading", "bilder laster")));
    }
    parts.join(" • ")
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let lang = app.view.lang;
    let area = centered_rect_fixed(54, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  {}  ", guidebook_core::manifest::APP_NAME),
            styles::title_style(),
        )),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(lang.pick(" Navigation", " Navigasjon"), styles::highlight_style())),
        help_line("1-5", lang.pick("Open a section", "Åpne en seksjon")),
        help_line("e", lang.pick("Emergency shortcut", "Snarvei til nødhjelp")),
        help_line("m / Esc", lang.pick("Back to menu", "Tilbake til menyen")),
        help_line("b / ]", lang.pick("History back / forward", "Historikk tilbake / frem")),
        help_line("↑/↓", lang.pick("Move selection", "Flytt markering")),
        help_line("Enter", lang.pick("Open / copy selected", "Åpne / kopier valgt")),
        Line::from(""),
        Line::from(Span::styled(lang.pick(" Actions", " Handlinger"), styles::highlight_style())),
        help_line("/", lang.pick("Search items", "Søk etter ting")),
        help_line("l", lang.pick("Switch language", "Bytt språk")),
        help_line("c", lang.pick("Copy Wi-Fi password", "Kopier Wi-Fi-passord")),
        help_line("r", lang.pick("Reload guide", "Last guiden på nytt")),
        help_line("g", lang.pick("Open another guide", "Åpne en annen guide")),
        help_line("q", lang.pick("Quit", "Avslutt")),
        Line::from(""),
        Line::from(vec![
            Span::styled(lang.pick("       Press ", "       Trykk "), styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(lang.pick(" or ", " eller "), styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(lang.pick(" to close", " for å lukke"), styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_slug_overlay(frame: &mut Frame, app: &App) {
    let lang = app.view.lang;
    let area = centered_rect_fixed(56, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            lang.pick("  Which guide do you want to open?", "  Hvilken guide vil du åpne?"),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Guide: [", styles::muted_style()),
            Span::styled(format!("{:<32}▌", app.slug_input), styles::selected_style()),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            lang.pick("  Enter to open, Esc to cancel", "  Enter for å åpne, Esc for å avbryte"),
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .title(lang.pick(" Open guide ", " Åpne guide "))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame, lang: Lang) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            lang.pick("   Are you sure you want to quit?", "   Vil du avslutte?"),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(lang.pick("   Press ", "   Trykk "), styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(lang.pick(" to quit, ", " for å avslutte, "), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(lang.pick(" to cancel", " for å avbryte"), styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

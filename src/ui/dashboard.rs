// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Catalogue des instruments groupés par marché ; Enter ouvre le graphique
//
// CONCEPTS RATATUI :
// 1. Layout : header / contenu / footer
// 2. List : un ListItem par ligne (titres de marché + instruments)
// 3. Style : surlignage de l'instrument sélectionné
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::ui::chart;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit que chaque écran est géré
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Dashboard => render_dashboard(frame, app),
        Screen::ChartView => chart::render_chart(frame, app, frame.size()),
    }
}

fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Catalogue
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyChart ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Indices et crypto : courbe, survol, analytics",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le catalogue
///
/// Les titres de marché ne sont pas sélectionnables : l'index de sélection
/// compte uniquement les instruments.
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Marchés ");

    let mut items = Vec::new();
    let mut index = 0;

    for market in &app.markets {
        items.push(ListItem::new(Line::from(Span::styled(
            format!(" {}", market.name),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))));

        for instrument in &market.instruments {
            let calendar = instrument.calendar;
            let line = format!(
                "   {:<10} {:<20} {:>5}h x {}j",
                instrument.symbol, instrument.name, calendar.hours_per_day, calendar.days_per_week
            );

            let mut style = Style::default().fg(Color::White);
            if index == app.selected_index {
                style = style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED);
            }
            items.push(ListItem::new(line).style(style));
            index += 1;
        }
    }

    frame.render_widget(List::new(items).block(block), area);
}

/// Ligne d'avertissement du two-step quit (partagée avec la vue graphique)
pub(crate) fn quit_confirmation_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "⚠  Appuyez sur ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(
            " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        quit_confirmation_line()
    } else {
        let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quitter  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Naviguer  "),
            Span::styled("[Enter]", key),
            Span::raw(" Graphique"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

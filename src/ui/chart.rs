// ============================================================================
// Chart - Rendu du graphique pour l'instrument ouvert
// ============================================================================
// Dessine le ChartFrame calculé par le moteur et l'état de survol
//
// Zones :
// ┌ header : symbole, dernier prix, variation, statut ──────────┐
// ├ canvas braille (courbe + zone)      │ panneau analytics     │
// └ barre des presets / intervalles ────────────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Canvas + Marker::Braille : 2 x 4 points par cellule
// 2. Les bornes du canvas sont celles du moteur (pixels virtuels, 8 x 16
//    par cellule), un point braille couvre donc 4 x 4 pixels
// 3. ctx.layer() : la courbe est dessinée par-dessus la zone remplie
// 4. Le canvas a l'axe Y vers le haut, le moteur vers le bas :
//    y_canvas = hauteur - y_pixel
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::app::{App, PlotArea};
use crate::engine::{
    format_large_number, AnalyticsSnapshot, ChartFrame, HoverState, Rgb, Selection, TooltipAnchor,
};
use crate::models::{Interval, ZoomPreset};

/// Largeur du panneau analytics, en colonnes
const PANEL_WIDTH: u16 = 34;

/// Nombre de bandes du dégradé sous la courbe
const GRADIENT_BANDS: usize = 4;

/// Largeur d'un point braille, en pixels virtuels
const DOT_WIDTH: f64 = PlotArea::PIXELS_PER_CELL_X / 2.0;

// ============================================================================
// Layout
// ============================================================================

/// Zones de l'écran graphique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub header: Rect,
    pub plot_block: Rect,
    pub plot: Rect,
    pub panel: Rect,
    pub footer: Rect,
}

/// Découpe l'écran graphique
///
/// Partagé par le rendu et par l'event loop (conversion souris -> pixels).
pub fn chart_layout(area: Rect) -> ChartLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Graphique + panneau
            Constraint::Length(3), // Presets
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
        .split(rows[1]);

    let plot_block = body[0];
    ChartLayout {
        header: rows[0],
        plot_block,
        plot: plot_block_widget().inner(plot_block),
        panel: body[1],
        footer: rows[2],
    }
}

/// Zone du canvas (intérieur de la bordure du graphique)
pub fn plot_area(area: Rect) -> Rect {
    chart_layout(area).plot
}

fn plot_block_widget<'a>() -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
}

// ============================================================================
// Fonction principale de rendu du graphique
// ============================================================================

/// Dessine la vue graphique
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let layout = chart_layout(area);

    render_chart_header(frame, app, layout.header);
    render_footer(frame, app, layout.footer);

    let title = match app.displayed_request() {
        Some(request) => format!(" {} - {} ", app.instrument.name, request.scale.label()),
        None => format!(" {} ", app.instrument.name),
    };
    frame.render_widget(plot_block_widget().title(title), layout.plot_block);

    match app.frame() {
        Some(chart) => {
            let interval = app
                .displayed_request()
                .map(|request| request.scale)
                .unwrap_or_else(|| app.range.active_interval(&app.instrument));
            render_canvas(frame, chart, app.hover(), interval, app.compact_axis, layout.plot);
            render_analytics_panel(frame, chart.analytics(), layout.panel);
        }
        None => {
            let message = if app.is_loading_data() {
                "Chargement..."
            } else {
                "Pas de données à afficher"
            };
            render_no_data(frame, layout.plot, message);
            render_analytics_panel(frame, None, layout.panel);
        }
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_chart_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📈 {} - {} ", app.instrument.symbol, app.instrument.name));

    let mut spans = Vec::new();

    if let Some(chart) = app.frame() {
        let series = chart.series();
        if let (Some(last), Some(change)) = (series.last(), series.change()) {
            let color = if change.is_positive { Color::Green } else { Color::Red };
            let arrow = if change.is_positive { "▲" } else { "▼" };
            spans.push(Span::raw("Prix: "));
            spans.push(Span::styled(
                format!("{:.2}", last.close),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} {:+.2} ({:+.2}%)", arrow, change.amount, change.percent),
                Style::default().fg(color),
            ));
            spans.push(Span::raw("  "));
        }
    }

    if let Some(message) = &app.loading_message {
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw("  "));
    } else if let Some(error) = &app.last_error {
        spans.push(Span::styled(format!("⚠ {}", error), Style::default().fg(Color::Red)));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(
        "[ESC]",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" Retour"));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Canvas : zone, courbe, axes, survol
// ============================================================================

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Prix court pour les labels d'axe
fn format_price(price: f64) -> String {
    if price.abs() >= 1000.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

fn render_canvas(
    frame: &mut Frame,
    chart: &ChartFrame,
    hover: Option<&HoverState>,
    interval: Interval,
    compact: bool,
    area: Rect,
) {
    let viewport = chart.viewport();
    let (width, height) = (viewport.width, viewport.height);
    let palette = chart.trend_color().palette();
    let scale = chart.scale();
    let points = chart.line_points();

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            // 1. Zone sous la courbe, en dégradé (start en bas, end en haut)
            fill_area(ctx, &points, scale.baseline_px(), height, palette.start, palette.end);
            ctx.layer();

            // 2. Courbe
            for pair in points.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: height - pair[0].1,
                    x2: pair[1].0,
                    y2: height - pair[1].1,
                    color: color(palette.line),
                });
            }
            if let [(x, y)] = points.as_slice() {
                ctx.draw(&Points {
                    coords: &[(*x, height - *y)],
                    color: color(palette.line),
                });
            }
            ctx.layer();

            // 3. Axes
            for tick in scale.y_ticks(height) {
                ctx.print(
                    0.0,
                    height - scale.y_px(tick),
                    Span::styled(format_price(tick), Style::default().fg(Color::DarkGray)),
                );
            }
            let series = chart.series();
            for index in scale.x_tick_indices(compact) {
                if let Some(bar) = series.get(index) {
                    ctx.print(
                        scale.x_px(index),
                        chart.margins().bottom / 2.0,
                        Span::styled(
                            interval.format_bar(bar),
                            Style::default().fg(Color::DarkGray),
                        ),
                    );
                }
            }

            // 4. Survol : ligne guide, point, tooltip
            if let Some(hover) = hover {
                draw_hover(ctx, chart, hover, interval, width, height);
            }
        });

    frame.render_widget(canvas, area);
}

/// Remplit la zone entre la ligne de base et la courbe
///
/// Une ligne verticale par point braille, découpée en bandes de couleur.
fn fill_area(ctx: &mut Context, points: &[(f64, f64)], baseline: f64, height: f64, start: Rgb, end: Rgb) {
    if points.len() < 2 {
        return;
    }

    let top = points.iter().map(|&(_, y)| y).fold(f64::INFINITY, f64::min);
    let span = (baseline - top).max(1.0);

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let mut x = x0;
        while x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
            let curve_y = y0 + (y1 - y0) * t;

            for band in 0..GRADIENT_BANDS {
                let band_low = baseline - span * band as f64 / GRADIENT_BANDS as f64;
                let band_high = baseline - span * (band + 1) as f64 / GRADIENT_BANDS as f64;
                if curve_y >= band_low {
                    break;
                }
                let segment_top = band_high.max(curve_y);
                let shade = start.lerp(end, band as f64 / (GRADIENT_BANDS - 1) as f64);
                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: height - band_low,
                    x2: x,
                    y2: height - segment_top,
                    color: color(shade),
                });
            }
            x += DOT_WIDTH;
        }
    }
}

fn draw_hover(ctx: &mut Context, chart: &ChartFrame, hover: &HoverState, interval: Interval, width: f64, height: f64) {
    // Ligne guide : de la ligne de base jusqu'au point survolé
    ctx.draw(&CanvasLine {
        x1: hover.pixel_x,
        y1: height - chart.scale().baseline_px(),
        x2: hover.pixel_x,
        y2: height - hover.pixel_y,
        color: Color::Gray,
    });
    ctx.draw(&Points {
        coords: &[(hover.pixel_x, height - hover.pixel_y)],
        color: Color::White,
    });

    let Some(bar) = chart.series().get(hover.index) else {
        return;
    };

    let lines = [
        interval.format_bar(bar),
        format!("{:.2}", bar.close),
    ];
    let text_width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as f64 * PlotArea::PIXELS_PER_CELL_X;

    // Position du coin haut-gauche du texte, en pixels moteur
    let (left, top) = match hover.tooltip_anchor(width) {
        TooltipAnchor::Left { left, top } => (left, top),
        TooltipAnchor::Right { right, top } => (width - right - text_width, top),
    };
    let left = left.clamp(0.0, (width - text_width).max(0.0));
    let text_height = lines.len() as f64 * PlotArea::PIXELS_PER_CELL_Y;
    let top = top.clamp(0.0, (height - text_height).max(0.0));

    for (row, text) in lines.into_iter().enumerate() {
        ctx.print(
            left,
            height - top - row as f64 * PlotArea::PIXELS_PER_CELL_Y,
            Span::styled(
                text,
                Style::default().fg(Color::White).bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            ),
        );
    }
}

// ============================================================================
// Panneau analytics
// ============================================================================

fn signed_style(value: f64) -> Style {
    if value >= 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

fn metric<'a>(label: &'a str, value: String, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, style),
    ])
}

fn render_analytics_panel(frame: &mut Frame, analytics: Option<&AnalyticsSnapshot>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Analytics ");

    let Some(stats) = analytics else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Pas assez de données", Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let plain = Style::default().fg(Color::White);
    let returns = stats.period_returns;

    let mut lines = vec![
        metric("Rendement", format!("{:+.2}%", stats.total_return), signed_style(stats.total_return)),
        metric(
            "Volatilité",
            format!("{:.2}% ({})", stats.volatility, stats.volatility_level().label()),
            plain,
        ),
        metric("Drawdown max", format!("-{:.2}%", stats.max_drawdown), Style::default().fg(Color::Red)),
        metric("Support", format!("{:.2}", stats.support_level), plain),
        metric("Résistance", format!("{:.2}", stats.resistance_level), plain),
        metric("Volume moyen", format_large_number(stats.average_volume), plain),
        Line::from(""),
        metric("1S", format!("{:+.2}%", returns.week), signed_style(returns.week)),
        metric("1M", format!("{:+.2}%", returns.month), signed_style(returns.month)),
        metric("3M", format!("{:+.2}%", returns.quarter), signed_style(returns.quarter)),
        metric("1A", format!("{:+.2}%", returns.year), signed_style(returns.year)),
        Line::from(""),
    ];

    match stats.trend {
        Some(trend) => {
            let style = signed_style(trend.slope);
            lines.push(metric(
                "Tendance",
                format!("{} {}", trend.direction.arrow(), trend.direction.label()),
                style.add_modifier(Modifier::BOLD),
            ));
            lines.push(metric("Force", format!("{:.1}", trend.strength), plain));
            lines.push(metric("Momentum", format!("{:+.2}%", trend.momentum), signed_style(trend.momentum)));
        }
        None => lines.push(metric("Tendance", "n/d (< 10 barres)".to_string(), Style::default().fg(Color::Gray))),
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Footer : presets et intervalles
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        super::dashboard::quit_confirmation_line()
    } else {
        let selection = app.range.selection();
        let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let active = Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        for (i, preset) in ZoomPreset::all().into_iter().enumerate() {
            let style = if selection == Selection::Preset(preset) { active } else { Style::default() };
            spans.push(Span::styled(format!("[{}]", i + 1), key));
            spans.push(Span::styled(format!("{} ", preset.label()), style));
        }

        spans.push(Span::styled(" [h/l] ", key));
        for interval in Interval::all() {
            let style = if selection == Selection::Interval(interval) { active } else { Style::default() };
            spans.push(Span::styled(interval.label(), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled("[ESC] Retour", Style::default().fg(Color::Gray))),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::models::{Bar, Series};

    #[test]
    fn test_layout_nests_plot_inside_block() {
        let layout = chart_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.footer.height, 3);
        assert_eq!(layout.panel.width, PANEL_WIDTH);
        assert_eq!(layout.plot.x, layout.plot_block.x + 1);
        assert_eq!(layout.plot.width, layout.plot_block.width - 2);
        assert_eq!(plot_area(Rect::new(0, 0, 120, 40)), layout.plot);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(4512.37), "4512");
        assert_eq!(format_price(98.456), "98.46");
    }

    #[test]
    fn test_render_chart_with_hover() {
        let mut app = App::default();
        let area = Rect::new(0, 0, 120, 40);
        app.set_plot_area(plot_area(area));

        let ticket = app.select_preset(ZoomPreset::OneMonth);
        let series = Series::normalize(
            (0..20).map(|i| {
                let c = 100.0 + (i as f64).sin() * 5.0 + i as f64;
                Bar::new(1_700_000_000 + i * 86_400, c, c, c, c, 1_000)
            }),
        );
        app.accept_series(&ticket, series);
        let plot = app.plot_area().unwrap().rect;
        app.pointer_move(plot.x + plot.width - 2, plot.y + 3);
        assert!(app.hover().is_some());

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render_chart(frame, &app, frame.size())).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Analytics"));
        assert!(content.contains("Rendement"));
    }

    #[test]
    fn test_panel_and_presets_are_french() {
        let mut app = App::default();
        let ticket = app.select_preset(ZoomPreset::OneYear);
        let series = Series::normalize((0..12).map(|i| {
            let c = 100.0 + i as f64;
            Bar::new(1_700_000_000 + i * 86_400, c, c, c, c, 1_000)
        }));
        app.accept_series(&ticket, series);

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render_chart(frame, &app, frame.size())).unwrap();

        let content: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Tendance"));
        assert!(content.contains("Volume moyen"));
        assert!(content.contains("1 Semaine"));
        assert!(!content.contains("Total return"));
    }

    #[test]
    fn test_render_without_data() {
        let app = App::default();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render_chart(frame, &app, frame.size())).unwrap();

        let content: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Pas de données"));
    }
}

// ============================================================================
// LazyChart - Graphique interactif d'indices boursiers
// ============================================================================
// Programme TUI : catalogue d'indices, graphique braille avec survol souris,
// presets de zoom et panneau d'analytics
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : résultats du worker -> rendu -> événements
// 3. Async dans sync : un worker thread avec son propre runtime tokio
// 4. Tickets : seule la réponse de la dernière requête est acceptée
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, error, info, warn};

use lazychart::api::yahoo::{build_client, fetch_series};
use lazychart::app::{App, FetchTicket};
use lazychart::config::Config;
use lazychart::models::Series;
use lazychart::ui::{chart::plot_area, events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : messages entre l'event loop et le worker
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupère la série décrite par le ticket
    FetchSeries { ticket: FetchTicket },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Série chargée (le ticket dit pour quelle requête)
    SeriesLoaded { ticket: FetchTicket, series: Series },

    /// Erreur lors du chargement
    LoadError { ticket: FetchTicket, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans :
/// - Linux : ~/.local/share/lazychart/logs/lazychart.log.AAAA-MM-JJ
/// - macOS : ~/Library/Application Support/lazychart/logs/
/// - Repli : ./logs
///
/// ```bash
/// tail -f ~/.local/share/lazychart/logs/lazychart.log.*
/// RUST_LOG=lazychart=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.resolved_log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazychart.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prend le pas sur le filtre de la config
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::load()?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(symbol = %config.default_symbol, "LazyChart starting up");

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(&config);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, config.user_agent.clone());

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + runtime tokio
// - std::thread::spawn() : thread OS dédié au réseau
// - block_on() bloque le worker, jamais l'UI
// - Les réponses repartent avec leur ticket : l'App décide si elles
//   sont encore d'actualité
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    user_agent: String,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime, worker exiting");
                return;
            }
        };

        let client = match build_client(&user_agent) {
            Ok(client) => client,
            Err(e) => {
                error!(error = ?e, "Failed to create HTTP client, worker exiting");
                return;
            }
        };

        // Channel fermé (event loop terminée) => fin de la boucle
        while let Ok(command) = command_rx.recv() {
            let command = newest_command(command, &command_rx);
            info!(?command, "Worker received command");

            match command {
                AppCommand::FetchSeries { ticket } => {
                    let result = runtime.block_on(fetch_series(&client, &ticket.symbol, ticket.request));

                    let message = match result {
                        Ok(series) => {
                            info!(id = ticket.id, symbol = %ticket.symbol, bars = series.len(), "Series loaded");
                            AppResult::SeriesLoaded { ticket, series }
                        }
                        Err(e) => {
                            error!(id = ticket.id, symbol = %ticket.symbol, error = ?e, "Failed to load series");
                            AppResult::LoadError {
                                ticket,
                                error: format!("{:#}", e),
                            }
                        }
                    };

                    if result_tx.send(message).is_err() {
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Garde uniquement la commande la plus récente de la file
///
/// Les tickets sautés sont déjà périmés côté App : leur réponse serait jetée.
fn newest_command(first: AppCommand, command_rx: &mpsc::Receiver<AppCommand>) -> AppCommand {
    let mut latest = first;
    while let Ok(next) = command_rx.try_recv() {
        let AppCommand::FetchSeries { ticket } = &latest;
        debug!(id = ticket.id, symbol = %ticket.symbol, "Skipping superseded fetch");
        latest = next;
    }
    latest
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Mesure de la zone de dessin (recalcule le frame si elle a changé)
//   2. Rendu
//   3. Événements
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS (non bloquant)
        loop {
            match result_rx.try_recv() {
                Ok(AppResult::SeriesLoaded { ticket, series }) => {
                    app.accept_series(&ticket, series);
                }
                Ok(AppResult::LoadError { ticket, error }) => {
                    app.reject_request(&ticket, error);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. LAYOUT
        let size = terminal.size().context("Impossible de lire la taille du terminal")?;
        app.set_plot_area(plot_area(size));

        // 2. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 3. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, &command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Envoie un ticket au worker
fn send_fetch(command_tx: &mpsc::Sender<AppCommand>, ticket: FetchTicket) {
    if command_tx.send(AppCommand::FetchSeries { ticket }).is_err() {
        error!("Worker channel closed, cannot send fetch request");
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Les guards filtrent selon la touche ET l'écran courant
/// - Toute action qui change la plage renvoie un ticket à envoyer au worker
fn handle_event(app: &mut App, event: lazychart::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use lazychart::ui::events::{
        is_back_event, is_down_event, is_enter_event, is_next_interval_event, is_previous_interval_event,
        is_quit_event, is_up_event, pointer_position, preset_from_event, Event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step quit : première pression => confirmation
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Dashboard : navigation et ouverture
        Event::Key(_) if is_up_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            app.navigate_down();
        }
        Event::Key(_) if is_enter_event(&event) && app.is_on_dashboard() => {
            app.cancel_quit();
            if let Some(ticket) = app.open_selected() {
                send_fetch(command_tx, ticket);
            }
        }

        // ChartView : retour, presets, intervalles
        Event::Key(_) if is_back_event(&event) && app.is_on_chart() => {
            app.cancel_quit();
            debug!("User returned to dashboard");
            app.show_dashboard();
        }
        Event::Key(_) if app.is_on_chart() && preset_from_event(&event).is_some() => {
            app.cancel_quit();
            if let Some(preset) = preset_from_event(&event) {
                info!(preset = preset.label(), "User picked zoom preset");
                let ticket = app.select_preset(preset);
                send_fetch(command_tx, ticket);
            }
        }
        Event::Key(_) if is_next_interval_event(&event) && app.is_on_chart() => {
            app.cancel_quit();
            let ticket = app.next_interval();
            info!(interval = ticket.request.scale.label(), "User changed to next interval");
            send_fetch(command_tx, ticket);
        }
        Event::Key(_) if is_previous_interval_event(&event) && app.is_on_chart() => {
            app.cancel_quit();
            let ticket = app.previous_interval();
            info!(interval = ticket.request.scale.label(), "User changed to previous interval");
            send_fetch(command_tx, ticket);
        }

        // Souris : survol du graphique
        Event::Mouse(_) if app.is_on_chart() => {
            if let Some((column, row)) = pointer_position(&event) {
                app.pointer_move(column, row);
            }
        }

        Event::Resize(columns, rows) => {
            debug!(columns, rows, "Terminal resized");
            app.set_plot_area(plot_area(Rect::new(0, 0, columns, rows)));
        }

        Event::Key(_) => {
            // Toute autre touche annule la confirmation de quit
            app.cancel_quit();
        }

        _ => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    // La capture souris est nécessaire pour le survol du graphique
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    terminal.show_cursor()?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

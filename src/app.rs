// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : le moteur (ChartFrame, HoverTracker) n'est modifié
//    que par les méthodes de App
//
// PATTERN : "Application State"
// - L'UI lit App (&App), ne le modifie jamais
// - L'event loop appelle les méthodes de App, qui renvoient des tickets
//   de fetch à transmettre au worker
// ============================================================================

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{
    ChartFrame, HoverState, HoverTracker, IntervalRangeController, Margins, PointerEvent, Viewport,
};
use crate::models::{catalog, InstrumentContext, Interval, IntervalRequest, Market, Series, ZoomPreset};

/// Taille de vue utilisée tant que le terminal n'a pas encore été mesuré
const FALLBACK_VIEWPORT: Viewport = Viewport {
    width: 800.0,
    height: 400.0,
};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : catalogue des instruments
    Dashboard,

    /// Vue graphique : courbe + analytics de l'instrument ouvert
    ChartView,
}

// ============================================================================
// FetchTicket : identité d'une requête en vol
// ============================================================================
// CONCEPT : Annulation par ticket
// - Chaque requête émise reçoit un id croissant
// - Seule la réponse du ticket actif est acceptée
// - Une réponse plus ancienne arrivée en retard est jetée, elle n'écrase
//   jamais une série plus récente
// ============================================================================

/// Requête émise vers le worker de fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub id: u64,
    pub symbol: String,
    pub request: IntervalRequest,
}

// ============================================================================
// PlotArea : zone de dessin en cellules terminal
// ============================================================================
// CONCEPT : Pixels virtuels
// - Le moteur raisonne en pixels (marges de 20 à 35 px)
// - Une cellule vaut 8 x 16 pixels virtuels, comme une police à chasse fixe
// - Le canvas braille (2 x 4 points par cellule) utilise les mêmes bornes :
//   un point braille couvre 4 x 4 pixels virtuels
// ============================================================================

/// Zone du canvas du graphique, en cellules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub rect: Rect,
}

impl PlotArea {
    /// Pixels virtuels par cellule, horizontalement
    pub const PIXELS_PER_CELL_X: f64 = 8.0;

    /// Pixels virtuels par cellule, verticalement
    pub const PIXELS_PER_CELL_Y: f64 = 16.0;

    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Taille de vue en pixels virtuels
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.rect.width as f64 * Self::PIXELS_PER_CELL_X,
            self.rect.height as f64 * Self::PIXELS_PER_CELL_Y,
        )
    }

    /// X pixel du centre d'une cellule (None hors de la zone)
    pub fn pointer_x(&self, column: u16, row: u16) -> Option<f64> {
        let inside_x = column >= self.rect.x && column < self.rect.x + self.rect.width;
        let inside_y = row >= self.rect.y && row < self.rect.y + self.rect.height;
        if !(inside_x && inside_y) {
            return None;
        }
        Some((column - self.rect.x) as f64 * Self::PIXELS_PER_CELL_X + Self::PIXELS_PER_CELL_X / 2.0)
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Catalogue des marchés et de leurs indices
    pub markets: Vec<Market>,

    /// Index de l'instrument sélectionné (catalogue aplati)
    pub selected_index: usize,

    /// Instrument ouvert dans la vue graphique
    pub instrument: InstrumentContext,

    /// Preset / intervalle courant
    pub range: IntervalRangeController,

    /// Marges du graphique (config)
    pub margins: Margins,

    /// Axe X compact (config)
    pub compact_axis: bool,

    /// Two-step quit : première pression de 'q' => true
    pub confirm_quit: bool,

    /// Une requête est en vol
    pub is_loading: bool,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,

    /// Dernière erreur de fetch (ligne de statut)
    pub last_error: Option<String>,

    next_ticket_id: u64,
    active_ticket: Option<FetchTicket>,
    frame: Option<ChartFrame>,
    displayed: Option<IntervalRequest>,
    hover: HoverTracker,
    plot: Option<PlotArea>,
}

impl App {
    /// Crée l'application à partir de la configuration
    pub fn new(config: &Config) -> Self {
        let markets = catalog();
        let instrument = InstrumentContext::lookup(&config.default_symbol);
        let selected_index = markets
            .iter()
            .flat_map(|market| market.instruments.iter())
            .position(|candidate| candidate.symbol == instrument.symbol)
            .unwrap_or(0);

        Self {
            running: true,
            current_screen: Screen::Dashboard,
            markets,
            selected_index,
            instrument,
            range: IntervalRangeController::new(),
            margins: config.margins,
            compact_axis: config.compact_axis,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            last_error: None,
            next_ticket_id: 0,
            active_ticket: None,
            frame: None,
            displayed: None,
            hover: HoverTracker::new(),
            plot: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Catalogue et navigation
    // ========================================================================

    /// Instruments du catalogue, dans l'ordre d'affichage
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentContext> {
        self.markets.iter().flat_map(|market| market.instruments.iter())
    }

    pub fn instrument_count(&self) -> usize {
        self.markets.iter().map(|market| market.instruments.len()).sum()
    }

    pub fn selected_instrument(&self) -> Option<&InstrumentContext> {
        self.instruments().nth(self.selected_index)
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.instrument_count().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    // ========================================================================
    // Transitions d'écran
    // ========================================================================

    /// Ouvre le graphique de l'instrument sélectionné
    ///
    /// Retourne le ticket de la requête à envoyer au worker.
    pub fn open_selected(&mut self) -> Option<FetchTicket> {
        let instrument = self.selected_instrument()?.clone();
        info!(symbol = %instrument.symbol, "Opening chart view");

        if instrument != self.instrument {
            self.frame = None;
            self.displayed = None;
        }
        self.instrument = instrument;
        self.current_screen = Screen::ChartView;

        let request = self.range.current_request(&self.instrument);
        Some(self.issue_request(request))
    }

    pub fn show_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.hover.reset();
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::ChartView
    }

    // ========================================================================
    // Sélection de plage
    // ========================================================================

    pub fn select_preset(&mut self, preset: ZoomPreset) -> FetchTicket {
        let request = self.range.select_preset(preset, &self.instrument);
        self.issue_request(request)
    }

    pub fn select_interval(&mut self, interval: Interval) -> FetchTicket {
        let request = self.range.select_interval(interval);
        self.issue_request(request)
    }

    /// Intervalle direct suivant (touche 'l')
    pub fn next_interval(&mut self) -> FetchTicket {
        let interval = self.range.active_interval(&self.instrument).next();
        self.select_interval(interval)
    }

    /// Intervalle direct précédent (touche 'h')
    pub fn previous_interval(&mut self) -> FetchTicket {
        let interval = self.range.active_interval(&self.instrument).previous();
        self.select_interval(interval)
    }

    // ========================================================================
    // Tickets de fetch
    // ========================================================================

    /// Émet une requête : le ticket précédent devient périmé
    pub fn issue_request(&mut self, request: IntervalRequest) -> FetchTicket {
        self.next_ticket_id += 1;
        let ticket = FetchTicket {
            id: self.next_ticket_id,
            symbol: self.instrument.symbol.clone(),
            request,
        };

        debug!(id = ticket.id, symbol = %ticket.symbol, ?request, "Fetch request issued");
        self.active_ticket = Some(ticket.clone());
        self.start_loading(Some(format!(
            "Chargement {} ({})...",
            self.instrument.name,
            request.scale.label()
        )));
        ticket
    }

    pub fn active_ticket(&self) -> Option<&FetchTicket> {
        self.active_ticket.as_ref()
    }

    fn is_active(&self, ticket: &FetchTicket) -> bool {
        self.active_ticket.as_ref().map(|active| active.id) == Some(ticket.id)
    }

    /// Accepte une série reçue du worker
    ///
    /// Retourne false (et ne touche à rien) si le ticket est périmé.
    pub fn accept_series(&mut self, ticket: &FetchTicket, series: Series) -> bool {
        if !self.is_active(ticket) {
            debug!(id = ticket.id, symbol = %ticket.symbol, "Discarding stale response");
            return false;
        }

        self.active_ticket = None;
        self.stop_loading();
        self.last_error = None;
        self.hover.reset();

        if series.is_empty() {
            warn!(symbol = %ticket.symbol, "Fetched series is empty");
        }
        self.frame = ChartFrame::compute(series, self.viewport(), self.margins);
        self.displayed = Some(ticket.request);

        info!(
            symbol = %ticket.symbol,
            bars = self.frame.as_ref().map(|frame| frame.series().len()).unwrap_or(0),
            "Chart frame recomputed"
        );
        true
    }

    /// Enregistre l'échec d'une requête
    ///
    /// La série courante reste affichée. Ignoré si le ticket est périmé.
    pub fn reject_request(&mut self, ticket: &FetchTicket, error: String) -> bool {
        if !self.is_active(ticket) {
            debug!(id = ticket.id, symbol = %ticket.symbol, "Discarding stale error");
            return false;
        }

        self.active_ticket = None;
        self.stop_loading();
        self.last_error = Some(error);
        true
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Frame, vue et survol
    // ========================================================================

    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    /// Requête de la série affichée (format des labels de l'axe X)
    pub fn displayed_request(&self) -> Option<IntervalRequest> {
        self.displayed
    }

    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.current()
    }

    pub fn plot_area(&self) -> Option<PlotArea> {
        self.plot
    }

    /// Taille de vue courante (pixels virtuels)
    pub fn viewport(&self) -> Viewport {
        self.plot.map(|plot| plot.viewport()).unwrap_or(FALLBACK_VIEWPORT)
    }

    /// Met à jour la zone de dessin ; recalcule le frame si elle a changé
    pub fn set_plot_area(&mut self, rect: Rect) {
        let plot = PlotArea::new(rect);
        if self.plot == Some(plot) {
            return;
        }

        self.plot = Some(plot);
        self.hover.reset();

        let viewport = plot.viewport();
        if let Some(frame) = self.frame.take() {
            debug!(width = viewport.width, height = viewport.height, "Viewport resized, recomputing frame");
            self.frame = frame.resized(viewport);
        }
    }

    /// Mouvement de souris (coordonnées terminal)
    pub fn pointer_move(&mut self, column: u16, row: u16) {
        match self.plot.and_then(|plot| plot.pointer_x(column, row)) {
            Some(x) => {
                self.hover.apply(PointerEvent::Move(x), self.frame.as_ref());
            }
            None => self.pointer_leave(),
        }
    }

    /// Le pointeur a quitté la zone de dessin
    pub fn pointer_leave(&mut self) {
        self.hover.apply(PointerEvent::Leave, self.frame.as_ref());
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

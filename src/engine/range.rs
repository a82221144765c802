// ============================================================================
// Plage affichée : intention utilisateur -> IntervalRequest
// ============================================================================
// Deux familles de boutons produisent la même sortie :
// - Choix direct d'intervalle (5M, 15M, ..., 3MO)
// - Preset de zoom (1 Day, 1 Week, ..., MAX)
//
// CONCEPT : Fonction pure + sélection
// - request_for(selection, instrument) ne dépend que de ses arguments
// - Le contrôleur ne retient que la sélection courante (surlignage UI)
// ============================================================================

use tracing::debug;

use crate::models::{InstrumentContext, Interval, IntervalRequest, ZoomPreset, END_FIX_NONE, END_FIX_NOW};

/// Ce que l'utilisateur a choisi en dernier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Preset(ZoomPreset),
    Interval(Interval),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Preset(ZoomPreset::default())
    }
}

/// Requête pour un choix direct d'intervalle
///
/// start = 0 (pas de coupe au début), end_fix selon la granularité.
pub fn request_for_interval(interval: Interval) -> IntervalRequest {
    IntervalRequest::new(interval, 0, interval.pick_end_fix())
}

/// Requête pour un preset de zoom
///
/// | preset   | scale | start                      | end_fix |
/// |----------|-------|----------------------------|---------|
/// | 1 Day    | 5m    | hours * 12                 | 0       |
/// | 1 Week   | 30m   | hours * 2 * days           | 0       |
/// | 1 Month  | 1d    | days * 4                   | 0       |
/// | 3 Months | 1d    | days * 4 * 3               | 0       |
/// | 1 Year   | 1d    | days * 4 * 12              | 0       |
/// | 5 Years  | 1mo   | 60                         | -1      |
/// | MAX      | 3mo   | 42                         | -1      |
///
/// Les heures de cotation peuvent être fractionnaires (6.5) : le nombre de
/// barres est arrondi à l'entier le plus proche.
pub fn request_for_preset(preset: ZoomPreset, instrument: &InstrumentContext) -> IntervalRequest {
    let hours = instrument.calendar.hours_per_day;
    let days = instrument.calendar.days_per_week;

    match preset {
        ZoomPreset::OneDay => IntervalRequest::new(Interval::M5, bars(hours * 12.0), END_FIX_NOW),
        ZoomPreset::OneWeek => IntervalRequest::new(Interval::M30, bars(hours * 2.0 * days as f64), END_FIX_NOW),
        ZoomPreset::OneMonth => IntervalRequest::new(Interval::D1, days * 4, END_FIX_NOW),
        ZoomPreset::ThreeMonths => IntervalRequest::new(Interval::D1, days * 4 * 3, END_FIX_NOW),
        ZoomPreset::OneYear => IntervalRequest::new(Interval::D1, days * 4 * 12, END_FIX_NOW),
        ZoomPreset::FiveYears => IntervalRequest::new(Interval::Mo1, 60, END_FIX_NONE),
        ZoomPreset::Max => IntervalRequest::new(Interval::Mo3, 42, END_FIX_NONE),
    }
}

/// Requête pour une sélection quelconque
pub fn request_for(selection: Selection, instrument: &InstrumentContext) -> IntervalRequest {
    match selection {
        Selection::Preset(preset) => request_for_preset(preset, instrument),
        Selection::Interval(interval) => request_for_interval(interval),
    }
}

fn bars(count: f64) -> u32 {
    count.round().max(0.0) as u32
}

/// Contrôleur de plage : retient la sélection courante
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalRangeController {
    selection: Selection,
}

impl IntervalRangeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Preset actif (None si le dernier choix est un intervalle direct)
    pub fn active_preset(&self) -> Option<ZoomPreset> {
        match self.selection {
            Selection::Preset(preset) => Some(preset),
            Selection::Interval(_) => None,
        }
    }

    /// Intervalle des barres de la sélection courante
    pub fn active_interval(&self, instrument: &InstrumentContext) -> Interval {
        self.current_request(instrument).scale
    }

    /// Sélectionne un preset et renvoie la requête correspondante
    pub fn select_preset(&mut self, preset: ZoomPreset, instrument: &InstrumentContext) -> IntervalRequest {
        self.selection = Selection::Preset(preset);
        let request = request_for_preset(preset, instrument);
        debug!(preset = preset.label(), symbol = %instrument.symbol, ?request, "Zoom preset selected");
        request
    }

    /// Sélectionne un intervalle direct et renvoie la requête correspondante
    pub fn select_interval(&mut self, interval: Interval) -> IntervalRequest {
        self.selection = Selection::Interval(interval);
        let request = request_for_interval(interval);
        debug!(interval = interval.label(), ?request, "Interval picked");
        request
    }

    /// Requête de la sélection courante (changement d'instrument)
    pub fn current_request(&self, instrument: &InstrumentContext) -> IntervalRequest {
        request_for(self.selection, instrument)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradingCalendar;

    fn equities() -> InstrumentContext {
        InstrumentContext::new("^GSPC", "S&P 500", TradingCalendar::new(6.5, 5))
    }

    #[test]
    fn test_one_week_on_equities() {
        let request = request_for_preset(ZoomPreset::OneWeek, &equities());
        assert_eq!(request, IntervalRequest::new(Interval::M30, 65, 0));
    }

    #[test]
    fn test_preset_table_on_equities() {
        let ctx = equities();
        let expected = [
            (ZoomPreset::OneDay, Interval::M5, 78, 0),
            (ZoomPreset::OneWeek, Interval::M30, 65, 0),
            (ZoomPreset::OneMonth, Interval::D1, 20, 0),
            (ZoomPreset::ThreeMonths, Interval::D1, 60, 0),
            (ZoomPreset::OneYear, Interval::D1, 240, 0),
            (ZoomPreset::FiveYears, Interval::Mo1, 60, -1),
            (ZoomPreset::Max, Interval::Mo3, 42, -1),
        ];

        for (preset, scale, start, end_fix) in expected {
            assert_eq!(
                request_for_preset(preset, &ctx),
                IntervalRequest::new(scale, start, end_fix),
                "{}",
                preset.label()
            );
        }
    }

    #[test]
    fn test_presets_follow_the_calendar() {
        let crypto = InstrumentContext::new("BTC-USD", "Bitcoin", TradingCalendar::crypto());
        assert_eq!(request_for_preset(ZoomPreset::OneDay, &crypto).start, 288);
        assert_eq!(request_for_preset(ZoomPreset::OneWeek, &crypto).start, 336);
        assert_eq!(request_for_preset(ZoomPreset::OneMonth, &crypto).start, 28);
    }

    #[test]
    fn test_fractional_bar_counts_are_rounded() {
        let hk = InstrumentContext::new("^HSI", "Hang Seng", TradingCalendar::new(5.5, 5));
        assert_eq!(request_for_preset(ZoomPreset::OneDay, &hk).start, 66);
        let odd = InstrumentContext::new("X", "X", TradingCalendar::new(6.25, 5));
        assert_eq!(request_for_preset(ZoomPreset::OneWeek, &odd).start, 63); // 62.5
    }

    #[test]
    fn test_direct_picks() {
        for interval in [Interval::M5, Interval::M15, Interval::M30, Interval::H1] {
            assert_eq!(request_for_interval(interval), IntervalRequest::new(interval, 0, -1));
        }
        for interval in [Interval::D1, Interval::W1, Interval::Mo1, Interval::Mo3] {
            assert_eq!(request_for_interval(interval), IntervalRequest::new(interval, 0, 0));
        }
    }

    #[test]
    fn test_controller_remembers_selection() {
        let ctx = equities();
        let mut controller = IntervalRangeController::new();
        assert_eq!(controller.active_preset(), Some(ZoomPreset::Max));
        assert_eq!(controller.active_interval(&ctx), Interval::Mo3);

        controller.select_interval(Interval::H1);
        assert_eq!(controller.selection(), Selection::Interval(Interval::H1));
        assert_eq!(controller.active_preset(), None);

        let request = controller.select_preset(ZoomPreset::OneYear, &ctx);
        assert_eq!(controller.current_request(&ctx), request);
    }
}

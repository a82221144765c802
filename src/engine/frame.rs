// ============================================================================
// ChartFrame : tout ce que le rendu consomme pour une série
// ============================================================================
// Série -> { échelles, couleur, analytics } calculés ensemble.
//
// CONCEPT : Recalcul complet
// - Nouvelle série ou nouvelle taille de vue => nouveau ChartFrame
// - Pas de mise à jour incrémentale : les séries font quelques centaines de
//   barres, tout recalculer reste instantané
// ============================================================================

use crate::engine::analytics::AnalyticsSnapshot;
use crate::engine::scale::{ChartScale, Margins, Viewport};
use crate::engine::trend_color::TrendColor;
use crate::models::Series;

/// Valeurs dérivées d'une série, immuables
#[derive(Debug, Clone)]
pub struct ChartFrame {
    series: Series,
    viewport: Viewport,
    margins: Margins,
    scale: ChartScale,
    trend_color: TrendColor,
    analytics: Option<AnalyticsSnapshot>,
}

impl ChartFrame {
    /// Calcule le frame d'une série
    ///
    /// Retourne None pour une série vide : le rendu n'affiche rien.
    pub fn compute(series: Series, viewport: Viewport, margins: Margins) -> Option<Self> {
        let scale = ChartScale::build(&series, viewport, margins)?;
        let trend_color = TrendColor::classify(&series)?;
        let analytics = AnalyticsSnapshot::compute(&series);

        Some(Self {
            series,
            viewport,
            margins,
            scale,
            trend_color,
            analytics,
        })
    }

    /// Recalcule le frame pour une nouvelle taille de vue
    pub fn resized(self, viewport: Viewport) -> Option<Self> {
        let margins = self.margins;
        Self::compute(self.series, viewport, margins)
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn scale(&self) -> &ChartScale {
        &self.scale
    }

    pub fn trend_color(&self) -> TrendColor {
        self.trend_color
    }

    /// None si la série a moins de 2 barres
    pub fn analytics(&self) -> Option<&AnalyticsSnapshot> {
        self.analytics.as_ref()
    }

    /// Points (x, y) de la courbe en pixels
    pub fn line_points(&self) -> Vec<(f64, f64)> {
        self.series
            .closes()
            .enumerate()
            .map(|(i, close)| (self.scale.x_px(i), self.scale.y_px(close)))
            .collect()
    }
}

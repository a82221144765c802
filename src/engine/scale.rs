// ============================================================================
// Échelles : projection de la série dans l'espace pixel
// ============================================================================
// Deux fonctions linéaires pures :
// - x(i) : index de barre -> pixel horizontal
// - y(close) : prix -> pixel vertical (l'axe pixel descend)
//
// CONCEPT : Espace d'index, pas de temps
// - Le domaine X est [0, len - 1]
// - Les barres irrégulières (week-ends, nuits) sont linéarisées
//
// CONCEPT : Marges internes
// - Domaine Y : [min(close) * 0.999, max(close)]
// - Plage Y : [height - bottom - 20, top + 20]
// - Les 20px gardent les extrêmes loin du bord du graphique
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Series;

/// Marge supplémentaire en pixels au-dessus et au-dessous de la courbe
pub const EDGE_INSET: f64 = 20.0;

/// Le bas du domaine Y est abaissé de 0.1% pour que le creux ne touche pas l'axe
pub const LOW_PAD: f64 = 0.999;

/// En dessous de cette étendue, un domaine ou une plage est considéré comme nul
const EPSILON: f64 = 1e-12;

/// Taille de la zone de dessin en pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Marges autour du graphique, en pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 0.0,
            bottom: 20.0,
            left: 35.0,
        }
    }
}

/// Interpolation linéaire domaine -> plage
///
/// CONCEPT : Échelle dégénérée
/// - Si le domaine est réduit à un point (série d'une seule barre), map()
///   renvoie le début de la plage au lieu de diviser par zéro
/// - Même garde pour invert() quand la plage est nulle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Vrai si le domaine est réduit à un point
    pub fn is_degenerate(&self) -> bool {
        (self.domain.1 - self.domain.0).abs() < EPSILON
    }

    /// Domaine -> pixel
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < EPSILON {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Pixel -> domaine
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span.abs() < EPSILON {
            return d0;
        }
        d0 + (pixel - r0) / span * (d1 - d0)
    }

    /// Vrai si le pixel tombe dans la plage (bornes incluses, dans les deux sens)
    pub fn contains_pixel(&self, pixel: f64) -> bool {
        let (r0, r1) = self.range;
        pixel >= r0.min(r1) && pixel <= r0.max(r1)
    }
}

/// Paire d'échelles X/Y pour une série et une taille de vue
///
/// Jamais modifiée : recalculée et remplacée quand la série ou la vue change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartScale {
    pub x: LinearScale,
    pub y: LinearScale,
    baseline: f64,
    len: usize,
}

impl ChartScale {
    /// Construit les échelles X et Y de la série
    ///
    /// Retourne None pour une série vide (rien à dessiner).
    pub fn build(series: &Series, viewport: Viewport, margins: Margins) -> Option<Self> {
        let min = series.min_close()?;
        let max = series.max_close()?;
        let last_index = (series.len() - 1) as f64;

        let x = LinearScale::new((0.0, last_index), (margins.left, viewport.width));
        let y = LinearScale::new(
            (min * LOW_PAD, max),
            (
                viewport.height - margins.bottom - EDGE_INSET,
                margins.top + EDGE_INSET,
            ),
        );

        Some(Self {
            x,
            y,
            baseline: viewport.height - margins.bottom,
            len: series.len(),
        })
    }

    /// Pixel X de la barre `index`
    pub fn x_px(&self, index: usize) -> f64 {
        self.x.map(index as f64)
    }

    /// Pixel Y d'un prix
    pub fn y_px(&self, close: f64) -> f64 {
        self.y.map(close)
    }

    /// Bas de la zone remplie sous la courbe
    pub fn baseline_px(&self) -> f64 {
        self.baseline
    }

    /// Nombre de barres couvertes par l'échelle
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Valeurs de graduation de l'axe Y, réparties sur le domaine
    ///
    /// Une graduation toutes les ~60px (au moins deux).
    pub fn y_ticks(&self, height: f64) -> Vec<f64> {
        let count = ((height / 60.0).floor() as usize).max(2);
        let (d0, d1) = self.y.domain();
        let step = (d1 - d0) / (count - 1) as f64;
        (0..count).map(|i| d0 + step * i as f64).collect()
    }

    /// Index des barres qui portent un label sur l'axe X
    pub fn x_tick_indices(&self, compact: bool) -> Vec<usize> {
        let stride = x_tick_stride(self.len, compact);
        (0..self.len).step_by(stride).collect()
    }
}

/// Espacement des labels de l'axe X selon le nombre de barres
///
/// - <= 8 barres : chaque barre
/// - <= 15 : une sur deux
/// - <= 30 : une sur trois
/// - <= 60 : une sur quatre
/// - au-delà : ~8 labels (6 en mode compact)
pub fn x_tick_stride(len: usize, compact: bool) -> usize {
    match len {
        0..=8 => 1,
        9..=15 => 2,
        16..=30 => 3,
        31..=60 => 4,
        _ => {
            let labels = if compact { 6 } else { 8 };
            (len / labels).max(1)
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;

    fn series(closes: &[f64]) -> Series {
        Series::normalize(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(i as i64, c, c, c, c, 10)),
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linear_scale_map_and_invert() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0));
        assert!(approx(scale.map(5.0), 150.0));
        assert!(approx(scale.invert(150.0), 5.0));
        assert!(approx(scale.invert(scale.map(7.5)), 7.5));
    }

    #[test]
    fn test_degenerate_scale_does_not_divide_by_zero() {
        let scale = LinearScale::new((3.0, 3.0), (10.0, 50.0));
        assert!(scale.is_degenerate());
        assert_eq!(scale.map(3.0), 10.0);
        assert_eq!(scale.map(100.0), 10.0);

        let flat = LinearScale::new((0.0, 10.0), (10.0, 10.0));
        assert_eq!(flat.invert(42.0), 0.0);
    }

    #[test]
    fn test_empty_series_has_no_scale() {
        let scale = ChartScale::build(&Series::default(), Viewport::new(800.0, 400.0), Margins::default());
        assert!(scale.is_none());
    }

    #[test]
    fn test_build_ranges() {
        let margins = Margins::default();
        let scale = ChartScale::build(&series(&[100.0, 105.0, 95.0, 120.0]), Viewport::new(800.0, 400.0), margins).unwrap();

        assert_eq!(scale.x.domain(), (0.0, 3.0));
        assert_eq!(scale.x.range(), (35.0, 800.0));
        assert!(approx(scale.y.domain().0, 95.0 * 0.999));
        assert_eq!(scale.y.domain().1, 120.0);
        assert_eq!(scale.y.range(), (400.0 - 20.0 - 20.0, 20.0 + 20.0));
        assert_eq!(scale.baseline_px(), 380.0);
    }

    #[test]
    fn test_y_extremes_land_on_insets() {
        let margins = Margins::default();
        let viewport = Viewport::new(640.0, 300.0);
        let s = series(&[12.0, 18.5, 9.25, 14.0, 11.0]);
        let scale = ChartScale::build(&s, viewport, margins).unwrap();

        let bottom_inset = viewport.height - margins.bottom - EDGE_INSET;
        let top_inset = margins.top + EDGE_INSET;

        let low = scale.y_px(9.25 * LOW_PAD);
        let high = scale.y_px(18.5);
        assert!(low >= bottom_inset - 1e-9);
        assert!(high <= top_inset + 1e-9);

        // Le creux reste au-dessus de l'axe grâce au padding de 0.1%
        assert!(scale.y_px(9.25) < bottom_inset);
    }

    #[test]
    fn test_x_maps_first_and_last_bar_to_range_ends() {
        let scale = ChartScale::build(&series(&[1.0, 2.0, 3.0]), Viewport::new(500.0, 200.0), Margins::default()).unwrap();
        assert!(approx(scale.x_px(0), 35.0));
        assert!(approx(scale.x_px(2), 500.0));
    }

    #[test]
    fn test_single_bar_scale_is_degenerate() {
        let scale = ChartScale::build(&series(&[50.0]), Viewport::new(500.0, 200.0), Margins::default()).unwrap();
        assert!(scale.x.is_degenerate());
        assert_eq!(scale.x_px(0), 35.0);
        assert!(scale.y_px(50.0).is_finite());
    }

    #[test]
    fn test_y_ticks_span_domain() {
        let scale = ChartScale::build(&series(&[10.0, 20.0]), Viewport::new(500.0, 240.0), Margins::default()).unwrap();
        let ticks = scale.y_ticks(240.0);
        assert_eq!(ticks.len(), 4);
        assert!(approx(ticks[0], 10.0 * LOW_PAD));
        assert!(approx(ticks[3], 20.0));
    }

    #[test]
    fn test_x_tick_stride() {
        assert_eq!(x_tick_stride(5, false), 1);
        assert_eq!(x_tick_stride(12, false), 2);
        assert_eq!(x_tick_stride(30, false), 3);
        assert_eq!(x_tick_stride(60, false), 4);
        assert_eq!(x_tick_stride(240, false), 30);
        assert_eq!(x_tick_stride(240, true), 40);
    }
}

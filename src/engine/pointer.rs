// ============================================================================
// Survol : position du pointeur -> barre survolée
// ============================================================================
// CONCEPT : Machine à états explicite
// - Idle : rien n'est survolé
// - Hovering(HoverState) : une barre est survolée
// - Transitions : PointerMove(x), PointerLeave
//
// Le survol est un état de présentation : il lit la série et les échelles
// courantes mais ne les modifie jamais. Recalculé à chaque mouvement (pas de
// debounce), effacé immédiatement quand le pointeur sort.
// ============================================================================

use serde::Serialize;

use crate::engine::frame::ChartFrame;
use crate::engine::scale::ChartScale;
use crate::models::Series;

/// Décalage horizontal du tooltip par rapport à la barre survolée
pub const TOOLTIP_OFFSET_X: f64 = 30.0;

/// Décalage vertical du tooltip par rapport au point survolé
pub const TOOLTIP_OFFSET_Y: f64 = 28.0;

/// Barre survolée, projetée en pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoverState {
    /// Index de la barre dans la série
    pub index: usize,
    /// X de la barre (aligné sur la barre, pas sur le pointeur)
    pub pixel_x: f64,
    /// Y du prix de clôture de la barre
    pub pixel_y: f64,
    /// Le pointeur est dans la moitié droite : le tooltip s'affiche à gauche
    pub is_right_half: bool,
}

/// Ancrage du tooltip, choisi pour qu'il ne sorte pas de l'écran
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TooltipAnchor {
    /// Bord gauche du tooltip à `left` pixels du bord gauche
    Left { left: f64, top: f64 },
    /// Bord droit du tooltip à `right` pixels du bord droit
    Right { right: f64, top: f64 },
}

impl HoverState {
    /// Calcule l'ancrage du tooltip pour une largeur de vue
    pub fn tooltip_anchor(&self, width: f64) -> TooltipAnchor {
        let top = self.pixel_y + TOOLTIP_OFFSET_Y;
        if self.is_right_half {
            TooltipAnchor::Right {
                right: width - self.pixel_x + TOOLTIP_OFFSET_X,
                top,
            }
        } else {
            TooltipAnchor::Left {
                left: self.pixel_x + TOOLTIP_OFFSET_X,
                top,
            }
        }
    }
}

/// Projette un X pixel sur la barre la plus proche
///
/// Algorithme :
/// 1. Rejette un pointeur hors de la plage X du graphique
/// 2. Inverse X en index fractionnaire, arrondit à l'entier le plus proche
/// 3. Rejette un index hors de [0, len - 1]
/// 4. Renvoie les pixels de la barre et le demi-plan du pointeur
///
/// CONCEPT RUST : Option au lieu d'une erreur
/// - Hors graphique n'est pas une faute, juste "rien à survoler"
pub fn project(pointer_x: f64, scale: &ChartScale, series: &Series, width: f64) -> Option<HoverState> {
    if series.is_empty() || !pointer_x.is_finite() || !scale.x.contains_pixel(pointer_x) {
        return None;
    }

    let last_index = series.len().min(scale.len()).checked_sub(1)?;
    let rounded = scale.x.invert(pointer_x).round();
    if rounded < 0.0 || rounded > last_index as f64 {
        return None;
    }

    let index = (rounded as usize).min(last_index);
    let bar = series.get(index)?;

    Some(HoverState {
        index,
        pixel_x: scale.x_px(index),
        pixel_y: scale.y_px(bar.close),
        is_right_half: pointer_x > width / 2.0,
    })
}

/// Événements pointeur transmis par l'event loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Déplacement, X en pixels dans la zone de dessin
    Move(f64),
    /// Le pointeur a quitté la zone de dessin
    Leave,
}

/// États de la machine de survol
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoverPhase {
    #[default]
    Idle,
    Hovering(HoverState),
}

/// Machine à états du survol
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverTracker {
    phase: HoverPhase,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    /// Barre survolée, si il y en a une
    pub fn current(&self) -> Option<&HoverState> {
        match &self.phase {
            HoverPhase::Hovering(state) => Some(state),
            HoverPhase::Idle => None,
        }
    }

    /// Applique une transition
    ///
    /// Table de transitions :
    /// - (*, Leave) -> Idle
    /// - (*, Move(x)) sans frame -> Idle
    /// - (*, Move(x)) hors graphique -> Idle
    /// - (*, Move(x)) sur une barre -> Hovering(barre)
    pub fn apply(&mut self, event: PointerEvent, frame: Option<&ChartFrame>) -> HoverPhase {
        self.phase = match (event, frame) {
            (PointerEvent::Leave, _) | (PointerEvent::Move(_), None) => HoverPhase::Idle,
            (PointerEvent::Move(x), Some(frame)) => {
                match project(x, frame.scale(), frame.series(), frame.viewport().width) {
                    Some(state) => HoverPhase::Hovering(state),
                    None => HoverPhase::Idle,
                }
            }
        };
        self.phase
    }

    /// Revient à Idle (nouvelle série, changement de vue)
    pub fn reset(&mut self) {
        self.phase = HoverPhase::Idle;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scale::{Margins, Viewport};
    use crate::models::Bar;

    fn series(n: usize) -> Series {
        Series::normalize((0..n).map(|i| {
            let c = 100.0 + i as f64;
            Bar::new(i as i64, c, c, c, c, 1)
        }))
    }

    fn frame(n: usize) -> ChartFrame {
        ChartFrame::compute(series(n), Viewport::new(800.0, 400.0), Margins::default()).unwrap()
    }

    #[test]
    fn test_pixel_at_bar_returns_that_bar() {
        let frame = frame(20);
        for k in 0..20 {
            let x = frame.scale().x_px(k);
            let hover = project(x, frame.scale(), frame.series(), 800.0).unwrap();
            assert_eq!(hover.index, k);
            assert_eq!(hover.pixel_x, x);
        }
    }

    #[test]
    fn test_index_always_in_range() {
        let frame = frame(7);
        let mut x = -50.0;
        while x < 900.0 {
            if let Some(hover) = project(x, frame.scale(), frame.series(), 800.0) {
                assert!(hover.index < 7);
            }
            x += 3.3;
        }
    }

    #[test]
    fn test_pointer_beyond_right_edge_is_none() {
        let frame = frame(10);
        assert!(project(800.5, frame.scale(), frame.series(), 800.0).is_none());
        assert!(project(10.0, frame.scale(), frame.series(), 800.0).is_none());
    }

    #[test]
    fn test_half_plane_flip() {
        let frame = frame(10);
        let left = project(100.0, frame.scale(), frame.series(), 800.0).unwrap();
        let right = project(700.0, frame.scale(), frame.series(), 800.0).unwrap();
        assert!(!left.is_right_half);
        assert!(right.is_right_half);
    }

    #[test]
    fn test_tooltip_anchor() {
        let hover = HoverState {
            index: 3,
            pixel_x: 600.0,
            pixel_y: 100.0,
            is_right_half: true,
        };
        assert_eq!(hover.tooltip_anchor(800.0), TooltipAnchor::Right { right: 230.0, top: 128.0 });

        let hover = HoverState { is_right_half: false, pixel_x: 50.0, ..hover };
        assert_eq!(hover.tooltip_anchor(800.0), TooltipAnchor::Left { left: 80.0, top: 128.0 });
    }

    #[test]
    fn test_tracker_transitions() {
        let frame = frame(10);
        let mut tracker = HoverTracker::new();
        assert_eq!(tracker.phase(), HoverPhase::Idle);

        let x = frame.scale().x_px(4);
        tracker.apply(PointerEvent::Move(x), Some(&frame));
        assert_eq!(tracker.current().map(|h| h.index), Some(4));

        tracker.apply(PointerEvent::Move(2000.0), Some(&frame));
        assert_eq!(tracker.phase(), HoverPhase::Idle);

        tracker.apply(PointerEvent::Move(x), Some(&frame));
        tracker.apply(PointerEvent::Leave, Some(&frame));
        assert!(tracker.current().is_none());

        tracker.apply(PointerEvent::Move(x), None);
        assert_eq!(tracker.phase(), HoverPhase::Idle);
    }

    #[test]
    fn test_single_bar_series() {
        let frame = frame(1);
        let hover = project(400.0, frame.scale(), frame.series(), 800.0).unwrap();
        assert_eq!(hover.index, 0);
    }
}

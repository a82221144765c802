// ============================================================================
// Gestion des événements
// ============================================================================
// Convertit les événements crossterm
// (clavier, souris, redimensionnement) en événements de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : identifier une touche ou un mouvement de souris
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};

use crate::models::ZoomPreset;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Souris : mouvement, glisser, clic
    Mouse(MouseEvent),

    /// Terminal redimensionné (colonnes, lignes)
    Resize(u16, u16),

    /// Tick régulier (pas d'événement pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        Ok(match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
            CrosstermEvent::Resize(columns, rows) => Event::Resize(columns, rows),
            _ => Event::Tick,
        })
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers clavier
// ============================================================================

/// Touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Échap ou Espace (retour au dashboard)
pub fn is_back_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc | KeyCode::Char(' '))
    } else {
        false
    }
}

pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// 'l' ou flèche droite (intervalle suivant)
pub fn is_next_interval_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('l') | KeyCode::Right)
    } else {
        false
    }
}

/// 'h' ou flèche gauche (intervalle précédent)
pub fn is_previous_interval_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('h') | KeyCode::Left)
    } else {
        false
    }
}

/// Touches '1' à '7' : preset de zoom correspondant
///
/// CONCEPT RUST : to_digit + checked_sub
/// - '0', '8', '9' et les autres touches donnent None
pub fn preset_from_event(event: &Event) -> Option<ZoomPreset> {
    let Event::Key(key) = event else {
        return None;
    };
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    ZoomPreset::all().get(digit.checked_sub(1)?).copied()
}

// ============================================================================
// Helpers souris
// ============================================================================

/// Position (colonne, ligne) d'un mouvement de souris
///
/// Le glisser compte comme un mouvement (certains terminaux n'envoient les
/// mouvements qu'avec un bouton enfoncé).
pub fn pointer_position(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_preset_keys() {
        assert_eq!(preset_from_event(&key(KeyCode::Char('1'))), Some(ZoomPreset::OneDay));
        assert_eq!(preset_from_event(&key(KeyCode::Char('2'))), Some(ZoomPreset::OneWeek));
        assert_eq!(preset_from_event(&key(KeyCode::Char('7'))), Some(ZoomPreset::Max));
        assert_eq!(preset_from_event(&key(KeyCode::Char('0'))), None);
        assert_eq!(preset_from_event(&key(KeyCode::Char('8'))), None);
        assert_eq!(preset_from_event(&key(KeyCode::Char('x'))), None);
        assert_eq!(preset_from_event(&Event::Tick), None);
    }

    #[test]
    fn test_interval_keys() {
        assert!(is_next_interval_event(&key(KeyCode::Char('l'))));
        assert!(is_previous_interval_event(&key(KeyCode::Char('h'))));
        assert!(!is_next_interval_event(&key(KeyCode::Char('h'))));
    }

    #[test]
    fn test_pointer_position() {
        assert_eq!(pointer_position(&mouse(MouseEventKind::Moved, 12, 4)), Some((12, 4)));
        assert_eq!(
            pointer_position(&mouse(MouseEventKind::Drag(MouseButton::Left), 3, 9)),
            Some((3, 9))
        );
        assert_eq!(pointer_position(&mouse(MouseEventKind::ScrollDown, 1, 1)), None);
        assert_eq!(pointer_position(&key(KeyCode::Enter)), None);
    }
}

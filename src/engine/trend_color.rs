// ============================================================================
// Couleur de tendance : palette gain / perte
// ============================================================================
// Règle unique : première clôture > dernière clôture => Lose, sinon Gain.
// Pas de cas "neutre" ici (l'analyse de tendance fine est dans analytics).
// ============================================================================

use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::Series;

/// Couleur RGB (affichée en hexadécimal "#rrggbb")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Construit une couleur depuis 0xRRGGBB
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Interpolation linéaire vers `other` (t borné à [0, 1])
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Palette d'un graphique : dégradé de la zone + couleur de la ligne
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Couleur du bas du dégradé
    pub start: Rgb,
    /// Couleur du haut du dégradé
    pub end: Rgb,
    /// Couleur de la courbe
    pub line: Rgb,
}

const GAIN: Palette = Palette {
    start: Rgb::from_hex(0x90e0ef),
    end: Rgb::from_hex(0xcaf0f8),
    line: Rgb::from_hex(0x48cae4),
};

const LOSE: Palette = Palette {
    start: Rgb::from_hex(0xffccd5),
    end: Rgb::from_hex(0xff8fa3),
    line: Rgb::from_hex(0xc9184a),
};

/// Sens de la série visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendColor {
    Gain,
    Lose,
}

impl TrendColor {
    /// Classe une série (None si la série est vide)
    pub fn classify(series: &Series) -> Option<Self> {
        let first = series.first()?.close;
        let last = series.last()?.close;
        Some(if first > last {
            TrendColor::Lose
        } else {
            TrendColor::Gain
        })
    }

    pub fn palette(&self) -> Palette {
        match self {
            TrendColor::Gain => GAIN,
            TrendColor::Lose => LOSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;

    fn series(closes: &[f64]) -> Series {
        Series::normalize(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(i as i64, c, c, c, c, 0)),
        )
    }

    #[test]
    fn test_classify_two_way_partition() {
        let cases: &[(&[f64], TrendColor)] = &[
            (&[100.0, 120.0], TrendColor::Gain),
            (&[120.0, 100.0], TrendColor::Lose),
            (&[100.0, 50.0, 100.0], TrendColor::Gain),
            (&[100.0, 150.0, 99.0], TrendColor::Lose),
            (&[42.0], TrendColor::Gain),
        ];

        for (closes, expected) in cases {
            assert_eq!(TrendColor::classify(&series(closes)), Some(*expected), "{closes:?}");
        }
    }

    #[test]
    fn test_empty_series_has_no_color() {
        assert_eq!(TrendColor::classify(&Series::default()), None);
    }

    #[test]
    fn test_palettes() {
        assert_eq!(TrendColor::Gain.palette().line.to_string(), "#48cae4");
        assert_eq!(TrendColor::Lose.palette().line.to_string(), "#c9184a");
        assert_eq!(TrendColor::Lose.palette().start, Rgb(0xff, 0xcc, 0xd5));
    }

    #[test]
    fn test_lerp() {
        let black = Rgb(0, 0, 0);
        let white = Rgb(255, 255, 255);
        assert_eq!(black.lerp(white, 0.0), black);
        assert_eq!(black.lerp(white, 1.0), white);
        assert_eq!(black.lerp(white, 0.5), Rgb(128, 128, 128));
        assert_eq!(black.lerp(white, 7.0), white);
    }

    #[test]
    fn test_palette_serializes_as_hex() {
        let json = serde_json::to_value(TrendColor::Gain.palette()).unwrap();
        assert_eq!(json["end"], "#caf0f8");
    }
}

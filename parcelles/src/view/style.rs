//! Styles des parcelles selon la nature du lot, et mise en évidence au survol

use serde::Serialize;

/// Style complet d'une forme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl ShapeStyle {
    const fn land_use(color: &'static str) -> Self {
        Self {
            color,
            fill_color: color,
            weight: 1.0,
            opacity: 0.6,
            fill_opacity: 0.4,
        }
    }

    /// Applique une mise en évidence (la couleur de remplissage est conservée)
    pub fn emphasized(self, emphasis: Emphasis) -> Self {
        Self {
            color: emphasis.color,
            weight: emphasis.weight,
            opacity: emphasis.opacity,
            fill_opacity: emphasis.fill_opacity,
            ..self
        }
    }
}

/// Couleur associée à une nature de lot
pub fn land_use_color(land_use: Option<&str>) -> &'static str {
    match land_use {
        Some("Bâti") => "#2ecc71",
        Some("Non Bâti") => "#f39c12",
        Some("En Construction") => "#e74c3c",
        Some("Inachevé") => "#9b59b6",
        Some("Abandonné") => "#e67e22",
        Some("Terrain Nu Clôturé") => "#f1c40f",
        _ => DEFAULT_COLOR,
    }
}

const DEFAULT_COLOR: &str = "#95a5a6";

/// Style de base d'une parcelle
pub fn style_for_land_use(land_use: Option<&str>) -> ShapeStyle {
    ShapeStyle::land_use(land_use_color(land_use))
}

/// Surcharge temporaire du trait (survol, clic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Emphasis {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

/// Interaction de l'utilisateur sur une forme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Hover,
    Leave,
    Click,
}

impl Interaction {
    pub fn emphasis(self) -> Emphasis {
        match self {
            Interaction::Hover => Emphasis {
                color: "#2c3e50",
                weight: 3.0,
                opacity: 0.9,
                fill_opacity: 0.8,
            },
            Interaction::Leave => Emphasis {
                color: "#2c3e50",
                weight: 1.0,
                opacity: 0.6,
                fill_opacity: 0.6,
            },
            Interaction::Click => Emphasis {
                color: "#e74c3c",
                weight: 2.0,
                opacity: 1.0,
                fill_opacity: 0.7,
            },
        }
    }
}

//! Rapport de chargement et de filtrage
//!
//! Collecte la provenance des données, les compteurs de l'état final et les
//! notifications émises pendant la session.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use parcelles::view::notify::{Level, Notification};
use parcelles::{LoadOrigin, StateSummary};

/// Statut global
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewStatus {
    /// Données du serveur chargées
    Success,
    /// Données de démonstration affichées
    Degraded,
    /// Aucune donnée chargée
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMessage {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl From<&Notification> for ReportMessage {
    fn from(notification: &Notification) -> Self {
        Self {
            level: notification.level,
            title: notification.title.clone(),
            message: notification.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewReport {
    /// Description de la source
    pub source: String,
    pub duration_secs: f64,
    pub status: ViewStatus,
    pub origin: Option<LoadOrigin>,
    /// Compteurs de l'état final (sélection comprise)
    pub state: Option<StateSummary>,
    /// Fichier GeoJSON produit
    pub output: Option<String>,
    pub messages: Vec<ReportMessage>,
}

impl ViewReport {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            duration_secs: 0.0,
            status: ViewStatus::Success,
            origin: None,
            state: None,
            output: None,
            messages: Vec::new(),
        }
    }

    pub fn record_notification(&mut self, notification: &Notification) {
        self.messages.push(notification.into());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = match self.origin {
            None => ViewStatus::Failed,
            Some(LoadOrigin::Fallback) => ViewStatus::Degraded,
            Some(_) if self.messages.iter().any(|m| m.level == Level::Error) => {
                ViewStatus::Degraded
            }
            Some(_) => ViewStatus::Success,
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RAPPORT - {}", self.source);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        if let Some(origin) = &self.origin {
            println!("Origin: {origin:?}");
        }

        if let Some(state) = &self.state {
            println!("\n--- PARCELLES ---");
            println!("{} chargées, {} affichées", state.total, state.visible);
            println!(
                "Filtres: {} quartiers, {} ilots, {} lots",
                state.districts, state.blocks, state.lots
            );
            let selection = &state.selection;
            if !selection.is_empty() {
                println!(
                    "Sélection: quartier={} ilot={} lot={}",
                    selection.district.as_deref().unwrap_or("-"),
                    selection.block.as_deref().unwrap_or("-"),
                    selection.lot.as_deref().unwrap_or("-")
                );
            }
        }

        if let Some(output) = &self.output {
            println!("\nOutput: {output}");
        }

        if !self.messages.is_empty() {
            println!("\n--- MESSAGES ({}) ---", self.messages.len());
            for m in &self.messages {
                println!("  {:?} {}: {}", m.level, m.title, m.message);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact
    pub fn summary(&self) -> String {
        let (total, visible) = self
            .state
            .as_ref()
            .map_or((0, 0), |s| (s.total, s.visible));
        format!(
            "{}: {:?}, {} chargées, {} affichées, {} messages",
            self.source,
            self.status,
            total,
            visible,
            self.messages.len()
        )
    }
}

//! Notifications (avertissements, erreurs) affichées à l'utilisateur

use std::time::{Duration, Instant};

use serde::Serialize;

/// Durée d'affichage d'une notification
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub title: String,
    pub message: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Notifications actives, dans l'ordre d'émission
#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    active: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre une notification et la retourne
    pub fn notify(
        &mut self,
        level: Level,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> &Notification {
        self.next_id += 1;
        let index = self.active.len();
        self.active.push(Notification {
            id: self.next_id,
            level,
            title: title.into(),
            message: message.into(),
            created_at: Instant::now(),
            ttl: NOTIFICATION_TTL,
        });
        &self.active[index]
    }

    /// Ferme une notification; false si elle n'est plus active
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Retire les notifications expirées et retourne leurs identifiants
    pub fn prune_expired(&mut self, now: Instant) -> Vec<u64> {
        let (expired, kept): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|n| n.is_expired(now));
        self.active = kept;
        expired.into_iter().map(|n| n.id).collect()
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

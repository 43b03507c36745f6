//! Player settings and preferences
//!
//! Read once at startup and written back whenever something changes.
//! Missing fields fall back to their defaults, so older saves keep loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::GameId;
use crate::wallet::Shop;

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sound off
    pub muted: bool,
    /// Owned cosmetic item ids
    pub purchased: Vec<String>,
    /// Active cosmetic item ids (at most one per category)
    pub active: Vec<String>,
    /// Best score per game
    pub high_scores: BTreeMap<GameId, u64>,
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "pocket_arcade_settings";

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn high_score(&self, game: GameId) -> u64 {
        self.high_scores.get(&game).copied().unwrap_or(0)
    }

    /// Keep `score` if it beats the stored best; returns true on a new best
    pub fn record_score(&mut self, game: GameId, score: u64) -> bool {
        let best = self.high_scores.entry(game).or_insert(0);
        if score > *best {
            *best = score;
            true
        } else {
            false
        }
    }

    /// Copy ownership flags out of the shop
    pub fn sync_from_shop(&mut self, shop: &Shop) {
        self.purchased = shop.purchased_ids();
        self.active = shop.active_ids();
    }

    /// Apply stored ownership flags to a shop catalog
    pub fn apply_to_shop(&self, shop: &mut Shop) {
        shop.restore(&self.purchased, &self.active);
    }

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::tests::BrokenStore;
    use crate::wallet::Wallet;

    #[test]
    fn test_record_score_keeps_best() {
        let mut settings = Settings::default();
        assert!(settings.record_score(GameId::Snake, 30));
        assert!(!settings.record_score(GameId::Snake, 20));
        assert!(!settings.record_score(GameId::Snake, 30));
        assert!(settings.record_score(GameId::Snake, 40));
        assert_eq!(settings.high_score(GameId::Snake), 40);
        assert_eq!(settings.high_score(GameId::Puzzle), 0);
    }

    #[test]
    fn test_save_load() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.toggle_mute();
        settings.record_score(GameId::Puzzle, 2048);
        settings.save(&mut store);

        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"muted":true,"high_scores":{"2048":512}}"#)
            .unwrap();

        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert!(settings.purchased.is_empty());
        assert_eq!(settings.high_score(GameId::Puzzle), 512);
    }

    #[test]
    fn test_unavailable_storage_falls_back() {
        let mut store = BrokenStore;
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        // Must not panic
        settings.save(&mut store);
    }

    #[test]
    fn test_shop_flags_round_trip() {
        let mut shop = Shop::default();
        let mut wallet = Wallet::new(1000);
        shop.buy_or_activate("theme_dark", &mut wallet).unwrap();

        let mut settings = Settings::default();
        settings.sync_from_shop(&shop);
        assert_eq!(settings.purchased, vec!["theme_dark".to_string()]);

        let mut fresh = Shop::default();
        settings.apply_to_shop(&mut fresh);
        assert_eq!(fresh, shop);
    }
}

//! Coin wallet and cosmetic shop
//!
//! Finished runs convert their score into coins through a [`RewardRule`].
//! The [`Shop`] spends coins on cosmetic items; owning an item lets the
//! player make it the active one of its category. The [`Clicker`] pays coins
//! per tap and sells upgrades to its payout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::{GameId, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("insufficient funds: need {needed}, have {balance}")]
    InsufficientFunds { needed: u64, balance: u64 },
    #[error("unknown shop item '{0}'")]
    UnknownItem(String),
}

/// Score to coin conversion: `score * multiplier / divisor`, rounded down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRule {
    pub multiplier: u64,
    pub divisor: u64,
}

impl RewardRule {
    pub const fn new(multiplier: u64, divisor: u64) -> Self {
        Self {
            multiplier,
            divisor,
        }
    }

    /// Default payout for each game
    pub fn for_game(game: GameId) -> Self {
        match game {
            // 10 points per food: one coin per food
            GameId::Snake => Self::new(1, 10),
            GameId::Puzzle => Self::new(1, 20),
            // One point per obstacle
            GameId::Scroller => Self::new(5, 1),
            GameId::Platformer => Self::new(1, 10),
        }
    }

    /// Coins earned for `score`; a zero divisor pays nothing
    pub fn apply(&self, score: u64) -> u64 {
        if self.divisor == 0 {
            return 0;
        }
        score.saturating_mul(self.multiplier) / self.divisor
    }
}

/// Persistent coin balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    const STORAGE_KEY: &'static str = "pocket_arcade_wallet";

    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Convert a score into coins and credit them; returns the coins earned
    pub fn reward(&mut self, score: u64, rule: RewardRule) -> u64 {
        let earned = rule.apply(score);
        self.credit(earned);
        earned
    }

    /// Reward a finished run with its game's default rule
    pub fn reward_outcome(&mut self, outcome: &Outcome) -> u64 {
        let earned = self.reward(outcome.score, RewardRule::for_game(outcome.game));
        log::info!(
            "{} run paid {} coins (balance {})",
            outcome.game.as_str(),
            earned,
            self.balance
        );
        earned
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.balance
    }

    /// Debit `amount`; never overdraws
    pub fn spend(&mut self, amount: u64) -> Result<(), WalletError> {
        if !self.can_afford(amount) {
            return Err(WalletError::InsufficientFunds {
                needed: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Wallet>(store, Self::STORAGE_KEY) {
            Some(wallet) => {
                log::info!("Loaded wallet ({} coins)", wallet.balance);
                wallet
            }
            None => Self::default(),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, self) {
            log::debug!("Wallet saved");
        }
    }
}

/// Price of one clicker upgrade
pub const UPGRADE_COST: u64 = 100;

/// Tap-to-earn clicker. Each tap pays `multiplier` coins; each upgrade
/// raises the multiplier by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clicker {
    multiplier: u32,
}

impl Default for Clicker {
    fn default() -> Self {
        Self { multiplier: 1 }
    }
}

impl Clicker {
    /// Stored as a bare number
    const STORAGE_KEY: &'static str = "multiplier";

    pub fn new(multiplier: u32) -> Self {
        Self {
            multiplier: multiplier.max(1),
        }
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Credit one tap; returns the coins earned
    pub fn tap(&self, wallet: &mut Wallet) -> u64 {
        let earned = u64::from(self.multiplier);
        wallet.credit(earned);
        earned
    }

    /// Buy one more coin per tap. Returns the new multiplier; a failed
    /// upgrade leaves both sides untouched.
    pub fn upgrade(&mut self, wallet: &mut Wallet) -> Result<u32, WalletError> {
        wallet.spend(UPGRADE_COST)?;
        self.multiplier = self.multiplier.saturating_add(1);
        log::info!("Clicker upgraded to x{}", self.multiplier);
        Ok(self.multiplier)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        load_json::<u32>(store, Self::STORAGE_KEY)
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, &self.multiplier) {
            log::debug!("Clicker saved");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Theme,
    Skin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u64,
    pub icon: String,
    pub category: ItemCategory,
    pub purchased: bool,
    pub active: bool,
}

impl ShopItem {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        cost: u64,
        icon: &str,
        category: ItemCategory,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost,
            icon: icon.to_string(),
            category,
            purchased: false,
            active: false,
        }
    }
}

/// What a buy-or-activate request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    /// Coins were spent and the item is now owned and active
    Bought,
    /// Already owned; made active
    Activated,
}

/// Cosmetic catalog with ownership flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    items: Vec<ShopItem>,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(vec![
            ShopItem::new(
                "theme_dark",
                "Night Mode",
                "Dark background for every game",
                500,
                "🌙",
                ItemCategory::Theme,
            ),
            ShopItem::new(
                "theme_neon",
                "Neon",
                "Bright neon palette",
                1500,
                "💡",
                ItemCategory::Theme,
            ),
            ShopItem::new(
                "skin_snake_golden",
                "Golden Snake",
                "A snake made of gold",
                1000,
                "🐍",
                ItemCategory::Skin,
            ),
        ])
    }
}

impl Shop {
    pub fn new(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ShopItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.item(id).map(|i| i.active).unwrap_or(false)
    }

    /// Buy an item (if not owned yet) and make it the active one of its
    /// category. A failed purchase leaves the wallet and shop untouched.
    pub fn buy_or_activate(&mut self, id: &str, wallet: &mut Wallet) -> Result<Purchase, WalletError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| WalletError::UnknownItem(id.to_string()))?;

        let result = if self.items[index].purchased {
            Purchase::Activated
        } else {
            wallet.spend(self.items[index].cost)?;
            self.items[index].purchased = true;
            log::info!("Bought {} for {} coins", id, self.items[index].cost);
            Purchase::Bought
        };

        let category = self.items[index].category;
        for (i, item) in self.items.iter_mut().enumerate() {
            if item.category == category {
                item.active = i == index;
            }
        }
        Ok(result)
    }

    /// Ids of owned items
    pub fn purchased_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.purchased)
            .map(|i| i.id.clone())
            .collect()
    }

    /// Ids of active items
    pub fn active_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.active)
            .map(|i| i.id.clone())
            .collect()
    }

    /// Restore ownership flags from saved ids. Unknown ids are skipped and
    /// only owned items can be active.
    pub fn restore(&mut self, purchased: &[String], active: &[String]) {
        for item in &mut self.items {
            item.purchased = purchased.contains(&item.id);
            item.active = false;
        }
        for id in active {
            let category = match self.item(id) {
                Some(item) if item.purchased => item.category,
                _ => continue,
            };
            for item in self.items.iter_mut().filter(|i| i.category == category) {
                item.active = item.id == *id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::OutcomeKind;

    #[test]
    fn test_reward_rule() {
        assert_eq!(RewardRule::new(1, 10).apply(95), 9);
        assert_eq!(RewardRule::new(5, 1).apply(3), 15);
        assert_eq!(RewardRule::new(3, 0).apply(100), 0);
        assert_eq!(RewardRule::new(2, 1).apply(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_reward_credits_balance() {
        let mut wallet = Wallet::default();
        assert_eq!(wallet.reward(120, RewardRule::new(1, 10)), 12);
        let outcome = Outcome {
            game: GameId::Scroller,
            kind: OutcomeKind::Lost,
            score: 4,
        };
        assert_eq!(wallet.reward_outcome(&outcome), 20);
        assert_eq!(wallet.balance(), 32);
    }

    #[test]
    fn test_spend_never_overdraws() {
        let mut wallet = Wallet::new(100);
        assert_eq!(
            wallet.spend(150),
            Err(WalletError::InsufficientFunds {
                needed: 150,
                balance: 100
            })
        );
        assert_eq!(wallet.balance(), 100);
        assert!(wallet.spend(100).is_ok());
        assert_eq!(wallet.balance(), 0);
    }

    #[test]
    fn test_buy_then_activate() {
        let mut shop = Shop::default();
        let mut wallet = Wallet::new(2000);

        assert_eq!(shop.buy_or_activate("theme_dark", &mut wallet), Ok(Purchase::Bought));
        assert_eq!(wallet.balance(), 1500);
        assert!(shop.is_active("theme_dark"));

        assert_eq!(shop.buy_or_activate("theme_neon", &mut wallet), Ok(Purchase::Bought));
        assert_eq!(wallet.balance(), 0);
        // One active item per category
        assert!(shop.is_active("theme_neon"));
        assert!(!shop.is_active("theme_dark"));

        // Owned items switch back for free
        assert_eq!(shop.buy_or_activate("theme_dark", &mut wallet), Ok(Purchase::Activated));
        assert_eq!(wallet.balance(), 0);
        assert!(shop.is_active("theme_dark"));
    }

    #[test]
    fn test_failed_purchase_changes_nothing() {
        let mut shop = Shop::default();
        let mut wallet = Wallet::new(10);
        let before = shop.clone();

        assert!(matches!(
            shop.buy_or_activate("skin_snake_golden", &mut wallet),
            Err(WalletError::InsufficientFunds { .. })
        ));
        assert_eq!(
            shop.buy_or_activate("nope", &mut wallet),
            Err(WalletError::UnknownItem("nope".into()))
        );
        assert_eq!(shop, before);
        assert_eq!(wallet.balance(), 10);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut shop = Shop::default();
        let mut wallet = Wallet::new(5000);
        shop.buy_or_activate("theme_dark", &mut wallet).unwrap();
        shop.buy_or_activate("skin_snake_golden", &mut wallet).unwrap();
        assert!(shop.is_active("theme_dark"));
        assert!(shop.is_active("skin_snake_golden"));
    }

    #[test]
    fn test_restore_from_ids() {
        let mut shop = Shop::default();
        shop.restore(
            &["theme_dark".into(), "ghost".into()],
            &["theme_dark".into(), "theme_neon".into()],
        );
        assert_eq!(shop.purchased_ids(), vec!["theme_dark".to_string()]);
        // theme_neon is not owned, so it cannot be active
        assert_eq!(shop.active_ids(), vec!["theme_dark".to_string()]);
    }

    #[test]
    fn test_tap_pays_multiplier() {
        let mut wallet = Wallet::default();
        let clicker = Clicker::default();
        assert_eq!(clicker.tap(&mut wallet), 1);
        assert_eq!(Clicker::new(4).tap(&mut wallet), 4);
        assert_eq!(wallet.balance(), 5);
        // A zero multiplier would make taps worthless
        assert_eq!(Clicker::new(0).multiplier(), 1);
    }

    #[test]
    fn test_upgrade_costs_coins() {
        let mut wallet = Wallet::new(250);
        let mut clicker = Clicker::default();
        assert_eq!(clicker.upgrade(&mut wallet), Ok(2));
        assert_eq!(clicker.upgrade(&mut wallet), Ok(3));
        assert_eq!(wallet.balance(), 50);
        assert_eq!(clicker.tap(&mut wallet), 3);
    }

    #[test]
    fn test_upgrade_needs_funds() {
        let mut wallet = Wallet::new(99);
        let mut clicker = Clicker::default();
        assert_eq!(
            clicker.upgrade(&mut wallet),
            Err(WalletError::InsufficientFunds {
                needed: UPGRADE_COST,
                balance: 99
            })
        );
        assert_eq!(clicker.multiplier(), 1);
        assert_eq!(wallet.balance(), 99);
    }

    #[test]
    fn test_clicker_persists() {
        let mut store = MemoryStore::new();
        assert_eq!(Clicker::load(&store), Clicker::default());

        Clicker::new(7).save(&mut store);
        assert_eq!(store.get("multiplier").unwrap().as_deref(), Some("7"));
        assert_eq!(Clicker::load(&store).multiplier(), 7);

        store.set("multiplier", "lots").unwrap();
        assert_eq!(Clicker::load(&store), Clicker::default());
    }

    #[test]
    fn test_wallet_persists() {
        let mut store = MemoryStore::new();
        Wallet::new(321).save(&mut store);
        assert_eq!(Wallet::load(&store).balance(), 321);
        assert_eq!(Wallet::load(&MemoryStore::new()).balance(), 0);
    }
}

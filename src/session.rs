//! Player session: where finished runs end up
//!
//! Owns the scoring sink, wallet, clicker, shop and settings for one player and
//! writes the persistent parts back after every change.

use std::cell::RefCell;
use std::rc::Rc;

use crate::highscores::ScoreBoard;
use crate::persistence::KeyValueStore;
use crate::platform::now_ms;
use crate::settings::Settings;
use crate::sim::Outcome;
use crate::wallet::{Clicker, Purchase, Shop, Wallet, WalletError};

/// What reporting a run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Leaderboard rank (1-indexed), None when the score did not place
    pub rank: Option<usize>,
    pub coins: u64,
    /// The score beat the stored best for its game
    pub new_best: bool,
}

pub struct Session {
    store: Box<dyn KeyValueStore>,
    pub scores: ScoreBoard,
    pub wallet: Wallet,
    pub clicker: Clicker,
    pub shop: Shop,
    pub settings: Settings,
}

impl Session {
    /// Load settings and wallet from `store` (defaults when unreadable)
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        let wallet = Wallet::load(store.as_ref());
        let clicker = Clicker::load(store.as_ref());
        let mut shop = Shop::default();
        settings.apply_to_shop(&mut shop);

        Self {
            store,
            scores: ScoreBoard::new(),
            wallet,
            clicker,
            shop,
            settings,
        }
    }

    /// Record a finished run: leaderboard, coins and best score
    pub fn report(&mut self, outcome: &Outcome) -> RunReport {
        let rank = self.scores.record(outcome, now_ms());
        let coins = self.wallet.reward_outcome(outcome);
        let new_best = self.settings.record_score(outcome.game, outcome.score);

        self.wallet.save(self.store.as_mut());
        if new_best {
            self.settings.save(self.store.as_mut());
        }

        RunReport {
            rank,
            coins,
            new_best,
        }
    }

    pub fn buy_or_activate(&mut self, id: &str) -> Result<Purchase, WalletError> {
        let purchase = self.shop.buy_or_activate(id, &mut self.wallet)?;
        self.settings.sync_from_shop(&self.shop);
        self.settings.save(self.store.as_mut());
        if purchase == Purchase::Bought {
            self.wallet.save(self.store.as_mut());
        }
        Ok(purchase)
    }

    /// One clicker tap; returns the coins earned
    pub fn tap(&mut self) -> u64 {
        let earned = self.clicker.tap(&mut self.wallet);
        self.wallet.save(self.store.as_mut());
        earned
    }

    /// Spend coins on a clicker upgrade; returns the new multiplier
    pub fn upgrade_clicker(&mut self) -> Result<u32, WalletError> {
        let multiplier = self.clicker.upgrade(&mut self.wallet)?;
        self.clicker.save(self.store.as_mut());
        self.wallet.save(self.store.as_mut());
        Ok(multiplier)
    }

    /// Close the session, handing back its store
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.toggle_mute();
        self.settings.save(self.store.as_mut());
        muted
    }
}

/// Terminal callback for a [`Runner`](crate::sim::Runner) that reports each
/// finished run into a shared session
pub fn reporter(session: &Rc<RefCell<Session>>) -> impl FnMut(Outcome) + 'static {
    let session = Rc::clone(session);
    move |outcome| {
        let report = session.borrow_mut().report(&outcome);
        log::info!(
            "{} {:?} with {} points (rank {:?}, +{} coins{})",
            outcome.game.as_str(),
            outcome.kind,
            outcome.score,
            report.rank,
            report.coins,
            if report.new_best { ", new best" } else { "" }
        );
    }
}

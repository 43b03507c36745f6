//! Per-game leaderboards
//!
//! The scoring sink every engine reports into. Keeps the top 10 entries per
//! game; repeated submissions from the same player are all kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGH_SCORES;
use crate::sim::{GameId, Outcome};

/// Name recorded for the local player
pub const DEFAULT_PLAYER: &str = "You";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: u64,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(rename = "date")]
    pub timestamp: f64,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

/// Ranked top-N lists keyed by game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    boards: BTreeMap<GameId, Vec<ScoreEntry>>,
    #[serde(default)]
    next_id: u64,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for a game, best first
    pub fn entries(&self, game: GameId) -> &[ScoreEntry] {
        self.boards.get(&game).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a score would make the board. Ties with the last entry of a
    /// full board do not: earlier entries keep their place.
    pub fn qualifies(&self, game: GameId, score: u64) -> bool {
        let entries = self.entries(game);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, game: GameId, score: u64) -> Option<usize> {
        if !self.qualifies(game, score) {
            return None;
        }
        let entries = self.entries(game);
        let pos = entries.iter().position(|e| score > e.score);
        Some(pos.unwrap_or(entries.len()) + 1)
    }

    /// Record a score. Returns the rank achieved (1-indexed) or None if it
    /// fell off the end of the board.
    pub fn submit(
        &mut self,
        game: GameId,
        score: u64,
        player_name: &str,
        timestamp: f64,
    ) -> Option<usize> {
        let rank = self.potential_rank(game, score)?;

        self.next_id += 1;
        let entry = ScoreEntry {
            id: self.next_id,
            score,
            timestamp,
            player_name: player_name.to_string(),
        };

        let entries = self.boards.entry(game).or_default();
        entries.insert(rank - 1, entry);
        entries.truncate(MAX_HIGH_SCORES);

        log::info!("{} score {} ranked #{}", game.as_str(), score, rank);
        Some(rank)
    }

    /// Record a finished run for the local player
    pub fn record(&mut self, outcome: &Outcome, timestamp: f64) -> Option<usize> {
        self.submit(outcome.game, outcome.score, DEFAULT_PLAYER, timestamp)
    }

    /// Get the top score (if any)
    pub fn top_score(&self, game: GameId) -> Option<u64> {
        self.entries(game).first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self, game: GameId) {
        self.boards.remove(&game);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::OutcomeKind;
    use proptest::prelude::*;

    #[test]
    fn test_ranked_descending() {
        let mut board = ScoreBoard::new();
        assert_eq!(board.submit(GameId::Snake, 50, "a", 1.0), Some(1));
        assert_eq!(board.submit(GameId::Snake, 80, "b", 2.0), Some(1));
        assert_eq!(board.submit(GameId::Snake, 60, "c", 3.0), Some(2));

        let scores: Vec<u64> = board.entries(GameId::Snake).iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![80, 60, 50]);
        assert_eq!(board.top_score(GameId::Snake), Some(80));
        assert_eq!(board.top_score(GameId::Puzzle), None);
    }

    #[test]
    fn test_duplicates_kept_in_submission_order() {
        let mut board = ScoreBoard::new();
        board.submit(GameId::Puzzle, 100, "You", 1.0);
        assert_eq!(board.submit(GameId::Puzzle, 100, "You", 2.0), Some(2));

        let entries = board.entries(GameId::Puzzle);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, 1.0);
        assert_ne!(entries[0].id, entries[1].id);
    }

    #[test]
    fn test_full_board_drops_lowest() {
        let mut board = ScoreBoard::new();
        for score in 1..=10 {
            board.submit(GameId::Scroller, score * 10, "p", 0.0);
        }
        // Ties with the last entry do not displace it
        assert_eq!(board.submit(GameId::Scroller, 10, "late", 0.0), None);
        assert_eq!(board.submit(GameId::Scroller, 5, "low", 0.0), None);

        assert_eq!(board.submit(GameId::Scroller, 15, "new", 0.0), Some(10));
        let entries = board.entries(GameId::Scroller);
        assert_eq!(entries.len(), MAX_HIGH_SCORES);
        assert_eq!(entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_games_are_independent() {
        let mut board = ScoreBoard::new();
        board.submit(GameId::Snake, 10, "p", 0.0);
        assert!(board.entries(GameId::Platformer).is_empty());
        board.clear(GameId::Snake);
        assert!(board.is_empty());
    }

    #[test]
    fn test_record_outcome() {
        let mut board = ScoreBoard::new();
        let outcome = Outcome {
            game: GameId::Platformer,
            kind: OutcomeKind::Won,
            score: 1230,
        };
        assert_eq!(board.record(&outcome, 42.0), Some(1));
        let entry = &board.entries(GameId::Platformer)[0];
        assert_eq!(entry.player_name, DEFAULT_PLAYER);
        assert_eq!(entry.score, 1230);
    }

    #[test]
    fn test_json_shape() {
        let mut board = ScoreBoard::new();
        board.submit(GameId::Puzzle, 64, "You", 1000.0);
        let json = serde_json::to_value(&board).unwrap();
        let entry = &json["boards"]["2048"][0];
        assert_eq!(entry["score"], 64);
        assert_eq!(entry["playerName"], "You");
        assert_eq!(entry["date"], 1000.0);

        let back: ScoreBoard = serde_json::from_value(json).unwrap();
        assert_eq!(back.entries(GameId::Puzzle), board.entries(GameId::Puzzle));
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_bounded(scores in prop::collection::vec(0u64..500, 0..40)) {
            let mut board = ScoreBoard::new();
            for score in &scores {
                board.submit(GameId::Snake, *score, "p", 0.0);
            }
            let entries = board.entries(GameId::Snake);
            prop_assert!(entries.len() <= MAX_HIGH_SCORES);
            prop_assert_eq!(entries.len(), scores.len().min(MAX_HIGH_SCORES));
            prop_assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));

            let mut sorted = scores.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            let expected: Vec<u64> = sorted.into_iter().take(MAX_HIGH_SCORES).collect();
            let actual: Vec<u64> = entries.iter().map(|e| e.score).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}

//! Run lifecycle and shared simulation types
//!
//! Every engine owns one [`Lifecycle`]. Terminal outcomes are produced only on
//! the transition into `Won`/`Lost`, so a host that drains them after each
//! tick sees each run end exactly once.

use serde::{Deserialize, Serialize};

/// Identifier of each mini-game (also the scoring sink key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameId {
    #[serde(rename = "snake")]
    Snake,
    #[serde(rename = "2048")]
    Puzzle,
    #[serde(rename = "flappybird")]
    Scroller,
    #[serde(rename = "platformer")]
    Platformer,
}

impl GameId {
    pub const ALL: [GameId; 4] = [
        GameId::Snake,
        GameId::Puzzle,
        GameId::Scroller,
        GameId::Platformer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Puzzle => "2048",
            GameId::Scroller => "flappybird",
            GameId::Platformer => "platformer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameId::Snake),
            "2048" | "game2048" => Some(GameId::Puzzle),
            "flappybird" | "flappy" => Some(GameId::Scroller),
            "platformer" => Some(GameId::Platformer),
            _ => None,
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first input (scroller before its first jump)
    Idle,
    /// Active gameplay
    Running,
    /// Suspended, state untouched
    Paused,
    /// Run ended in a win
    Won,
    /// Run ended in a loss
    Lost,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Won | RunPhase::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Won,
    Lost,
}

/// Terminal report of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub game: GameId,
    pub kind: OutcomeKind,
    pub score: u64,
}

/// Run state machine: Idle -> Running <-> Paused -> Won | Lost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifecycle {
    game: GameId,
    phase: RunPhase,
    /// Final outcome of the current run (kept for inspection after delivery)
    outcome: Option<Outcome>,
    delivered: bool,
}

impl Lifecycle {
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            phase: RunPhase::Idle,
            outcome: None,
            delivered: false,
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Start a fresh run, either waiting for input or already running
    pub fn reset(&mut self, running: bool) {
        self.phase = if running {
            RunPhase::Running
        } else {
            RunPhase::Idle
        };
        self.outcome = None;
        self.delivered = false;
    }

    /// Idle -> Running. Returns false from any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != RunPhase::Idle {
            return false;
        }
        self.phase = RunPhase::Running;
        log::info!("{} run started", self.game.as_str());
        true
    }

    /// Running <-> Paused; no effect in other phases
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            RunPhase::Running => RunPhase::Paused,
            RunPhase::Paused => RunPhase::Running,
            other => other,
        };
    }

    /// Enter a terminal phase. Only a running game can finish; later calls
    /// are ignored so the first terminal condition wins.
    pub fn finish(&mut self, kind: OutcomeKind, score: u64) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.phase = match kind {
            OutcomeKind::Won => RunPhase::Won,
            OutcomeKind::Lost => RunPhase::Lost,
        };
        self.outcome = Some(Outcome {
            game: self.game,
            kind,
            score,
        });
        log::info!("{} run ended: {:?} with score {}", self.game.as_str(), kind, score);
        true
    }

    /// Final outcome of this run, if it has ended
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Hand out the outcome once; every later call returns `None`
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        if self.delivered {
            return None;
        }
        let outcome = self.outcome?;
        self.delivered = true;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_round_trip_names() {
        for game in GameId::ALL {
            assert_eq!(GameId::from_str(game.as_str()), Some(game));
        }
        assert_eq!(GameId::from_str("tetris"), None);
        let json = serde_json::to_string(&GameId::Puzzle).unwrap();
        assert_eq!(json, "\"2048\"");
    }

    #[test]
    fn test_lifecycle_finish_once() {
        let mut life = Lifecycle::new(GameId::Snake);
        life.reset(true);
        assert!(life.finish(OutcomeKind::Lost, 30));
        assert!(!life.finish(OutcomeKind::Won, 99));
        assert_eq!(life.phase(), RunPhase::Lost);

        let outcome = life.take_outcome().unwrap();
        assert_eq!(outcome.score, 30);
        assert_eq!(outcome.kind, OutcomeKind::Lost);
        assert!(life.take_outcome().is_none());
        assert!(life.take_outcome().is_none());
    }

    #[test]
    fn test_lifecycle_pause_gate() {
        let mut life = Lifecycle::new(GameId::Puzzle);
        life.toggle_pause();
        assert_eq!(life.phase(), RunPhase::Idle);
        assert!(life.start());
        life.toggle_pause();
        assert_eq!(life.phase(), RunPhase::Paused);
        // Cannot finish while paused
        assert!(!life.finish(OutcomeKind::Lost, 0));
        life.toggle_pause();
        assert!(life.is_running());
    }

    #[test]
    fn test_lifecycle_reset_rearms_delivery() {
        let mut life = Lifecycle::new(GameId::Scroller);
        life.reset(true);
        life.finish(OutcomeKind::Lost, 4);
        assert!(life.take_outcome().is_some());
        life.reset(false);
        assert_eq!(life.phase(), RunPhase::Idle);
        assert!(life.outcome().is_none());
        life.start();
        life.finish(OutcomeKind::Lost, 2);
        assert_eq!(life.take_outcome().map(|o| o.score), Some(2));
    }
}

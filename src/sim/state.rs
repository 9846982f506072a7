//! Run state and core simulation types
//!
//! `GameState` is the single owner of everything that lives for one run.
//! It is only mutated by `tick` and the run transitions below.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::avatar::{Avatar, Escape};
use super::difficulty::{Difficulty, SpeedController};
use crate::consts::*;

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Before the first run; avatar at rest
    Idle,
    /// Active gameplay
    Running,
    /// Run over, waiting for restart
    Ended,
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    HitObstacle,
    Escaped(Escape),
}

/// Something the outside world may want to react to (sound, economy, UI).
///
/// Drained by the owner after each tick; the simulation never waits on
/// anyone handling them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { difficulty: Difficulty, restart: bool },
    Jumped,
    ObstaclePassed { score: u32 },
    CoinCollected { pos: Vec2 },
    RunEnded { score: u32, difficulty: Difficulty, cause: EndCause },
}

/// A pillar pair with a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Bottom edge of the upper segment
    pub top: f32,
    /// Top edge of the lower segment
    pub bottom: f32,
    pub passed: bool,
}

impl Obstacle {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn gap_center(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// A coin sitting in an obstacle gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
}

/// Pickup sparkle (cosmetic only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
}

/// Rules that vary between builds/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunRules {
    /// Touching the top edge ends the run
    pub ceiling_is_fatal: bool,
}

/// Complete per-run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    /// Tier used by the current (or next) run
    pub difficulty: Difficulty,
    pub rules: RunRules,
    /// Playable area
    pub width: f32,
    pub height: f32,
    /// Fixed gap height shared by all obstacles
    pub gap_height: f32,
    pub score: u32,
    pub speed: SpeedController,
    /// Time accumulated toward the next obstacle spawn
    pub since_spawn_ms: f32,
    /// Simulated time since the run started
    pub elapsed_ms: f64,
    pub time_ticks: u64,
    pub avatar: Avatar,
    /// Active obstacles (oldest first)
    pub obstacles: Vec<Obstacle>,
    /// Active coins (oldest first)
    pub coins: Vec<Coin>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Pending events for the owner
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle game with the given seed
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            difficulty: Difficulty::default(),
            rules: RunRules::default(),
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            gap_height: GAP_HEIGHT,
            score: 0,
            speed: SpeedController::new(Difficulty::default()),
            since_spawn_ms: 0.0,
            elapsed_ms: 0.0,
            time_ticks: 0,
            avatar: Avatar::default(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.avatar.reset(state.idle_y());
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Height the avatar rests at on the idle screen
    pub fn idle_y(&self) -> f32 {
        self.height * AVATAR_IDLE_FRACTION
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Pick the tier for the next run.
    ///
    /// Rejected while a run is in progress.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.is_running() {
            return false;
        }
        self.difficulty = difficulty;
        self.speed.reset(difficulty);
        true
    }

    /// Begin a run from Idle or Ended. Returns false if already running.
    pub fn start(&mut self) -> bool {
        let restart = match self.phase {
            RunPhase::Running => return false,
            RunPhase::Idle => false,
            RunPhase::Ended => true,
        };

        self.avatar.reset(AVATAR_START_Y);
        self.obstacles.clear();
        self.coins.clear();
        self.particles.clear();
        self.score = 0;
        self.speed.reset(self.difficulty);
        self.since_spawn_ms = 0.0;
        self.elapsed_ms = 0.0;
        self.time_ticks = 0;
        self.phase = RunPhase::Running;
        self.events.push(GameEvent::RunStarted {
            difficulty: self.difficulty,
            restart,
        });
        true
    }

    /// Stop the run. Only the first call per run has any effect.
    pub fn end(&mut self, cause: EndCause) {
        if self.phase != RunPhase::Running {
            return;
        }
        self.phase = RunPhase::Ended;
        self.events.push(GameEvent::RunEnded {
            score: self.score,
            difficulty: self.difficulty,
            cause,
        });
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

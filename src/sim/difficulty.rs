//! Difficulty tiers and the in-run speed ramp

use serde::{Deserialize, Serialize};

/// Difficulty tier presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Storage/wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Scroll speed at the start of a run (units/tick)
    pub fn base_speed(&self) -> f32 {
        match self {
            Difficulty::Easy => 2.0,
            Difficulty::Medium => 4.0,
            Difficulty::Hard => 6.0,
        }
    }

    /// Time between obstacle spawns
    pub fn spawn_interval_ms(&self) -> f32 {
        match self {
            Difficulty::Easy => 2500.0,
            Difficulty::Medium => 1800.0,
            Difficulty::Hard => 1200.0,
        }
    }

    /// Time between speed increments
    pub fn ramp_interval_ms(&self) -> f32 {
        match self {
            Difficulty::Easy => 1000.0,
            Difficulty::Medium => 900.0,
            Difficulty::Hard => 700.0,
        }
    }

    /// Speed added per ramp step
    pub fn ramp_step(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.01,
            Difficulty::Medium => 0.02,
            Difficulty::Hard => 0.03,
        }
    }
}

/// Scroll speed for the current run.
///
/// Speed only ever grows during a run; there is no cap.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedController {
    difficulty: Difficulty,
    speed: f32,
    since_ramp_ms: f32,
}

impl SpeedController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            speed: difficulty.base_speed(),
            since_ramp_ms: 0.0,
        }
    }

    /// Back to the tier's base speed with an empty ramp accumulator
    pub fn reset(&mut self, difficulty: Difficulty) {
        *self = Self::new(difficulty);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current scroll speed (units/tick)
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Accumulate elapsed time; returns how many ramp steps were applied
    pub fn advance(&mut self, dt_ms: f32) -> u32 {
        let interval = self.difficulty.ramp_interval_ms();
        self.since_ramp_ms += dt_ms;

        let mut steps = 0;
        while self.since_ramp_ms > interval {
            self.since_ramp_ms -= interval;
            self.speed += self.difficulty.ramp_step();
            steps += 1;
        }
        steps
    }
}

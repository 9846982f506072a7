//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform
//! dependencies:
//! - Seeded RNG only
//! - Time only via the `dt_ms` handed to `tick`
//! - Side effects reported as `GameEvent`s, never performed directly

pub mod avatar;
pub mod collision;
pub mod difficulty;
pub mod spawn;
pub mod state;
pub mod tick;

pub use avatar::{Avatar, Escape};
pub use collision::{fits_in_gap, has_passed, hits_obstacle, overlaps_horizontally, touches_coin};
pub use difficulty::{Difficulty, SpeedController};
pub use spawn::{random_gap_center, spawn_obstacle, spawn_particles};
pub use state::{
    Coin, EndCause, GameEvent, GameState, Obstacle, Particle, RunPhase, RunRules,
};
pub use tick::{TickInput, scroll, tick};

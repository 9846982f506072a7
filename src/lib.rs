//! Coin Flap - A side-scrolling gap-flying arcade game with a coin shop
//!
//! Core modules:
//! - `sim`: Simulation (avatar physics, obstacle/coin generation, collisions, run state)
//! - `progression`: Coin balance, purchased skins, lifetime stats, achievements
//! - `app`: Application state, run state machine and frame driver
//! - `renderer`: Drawing surface abstraction
//! - `audio`: Sound cues
//! - `leaderboard`: Shared per-difficulty score board
//! - `persistence`: Key-value storage (LocalStorage on web)

pub mod app;
pub mod audio;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod skins;

pub use app::App;
pub use progression::{Achievement, Progression, ShopError};
pub use settings::Settings;
pub use sim::Difficulty;

/// Game configuration constants
///
/// Distances are in playfield units (canvas pixels at the reference size),
/// velocities in units per simulation tick.
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz reference rate)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (tab switches, breakpoints)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1200.0;
    pub const PLAYFIELD_HEIGHT: f32 = 800.0;

    /// Avatar defaults
    pub const AVATAR_X: f32 = 25.0;
    pub const AVATAR_START_Y: f32 = 150.0;
    /// Resting height on the idle screen, as a fraction of playfield height
    pub const AVATAR_IDLE_FRACTION: f32 = 0.4;
    pub const AVATAR_WIDTH: f32 = 40.0;
    pub const AVATAR_HEIGHT: f32 = 40.0;
    /// Downward acceleration per tick²
    pub const GRAVITY: f32 = 0.10;
    /// Velocity set by a jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -4.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 100.0;
    pub const GAP_HEIGHT: f32 = 200.0;

    /// Coin defaults
    pub const COIN_RADIUS: f32 = 15.0;

    /// Coin pickup particle burst
    pub const PARTICLE_BURST: usize = 10;
    pub const PARTICLE_LIFE_TICKS: u32 = 30;
    /// Particle velocity components are drawn from [-SPREAD/2, SPREAD/2)
    pub const PARTICLE_SPREAD: f32 = 4.0;
}

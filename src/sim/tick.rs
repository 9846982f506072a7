//! Fixed timestep simulation tick
//!
//! Order within a tick: avatar physics, obstacle/coin spawning, scrolling,
//! pass detection, coin pickup, fatal collision, speed ramp. A run that ends
//! part way through stops processing immediately.

use super::collision::{has_passed, hits_obstacle, touches_coin};
use super::spawn::{spawn_obstacle, spawn_particles, update_particles};
use super::state::{EndCause, GameEvent, GameState, RunPhase};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (space/click/tap while running)
    pub jump: bool,
}

/// Advance the game state by one tick of `dt_ms` simulated milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    // Particles keep fading after a crash
    update_particles(&mut state.particles);

    if state.phase != RunPhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.elapsed_ms += dt_ms as f64;

    // Avatar physics
    if input.jump {
        state.avatar.jump();
        state.events.push(GameEvent::Jumped);
    }
    state.avatar.apply_gravity();
    if let Some(escape) = state
        .avatar
        .escape(state.height, state.rules.ceiling_is_fatal)
    {
        state.end(EndCause::Escaped(escape));
        return;
    }

    // Spawn cadence
    state.since_spawn_ms += dt_ms;
    let interval = state.difficulty.spawn_interval_ms();
    while state.since_spawn_ms > interval {
        state.since_spawn_ms -= interval;
        spawn_obstacle(state);
    }

    scroll(state);

    // Pass detection
    let mut passes = 0;
    for obstacle in state.obstacles.iter_mut() {
        if has_passed(&state.avatar, obstacle) {
            obstacle.passed = true;
            passes += 1;
        }
    }
    for _ in 0..passes {
        state.score += 1;
        state.events.push(GameEvent::ObstaclePassed { score: state.score });
    }

    // Coin pickup
    let mut picked = Vec::new();
    for coin in state.coins.iter_mut() {
        if touches_coin(&state.avatar, coin) {
            coin.collected = true;
            picked.push(coin.pos);
        }
    }
    for pos in picked {
        state.events.push(GameEvent::CoinCollected { pos });
        spawn_particles(state, pos);
    }

    // Fatal collision
    if state
        .obstacles
        .iter()
        .any(|o| hits_obstacle(&state.avatar, o))
    {
        state.end(EndCause::HitObstacle);
        return;
    }

    state.speed.advance(dt_ms);
}

/// Move the world left by the current speed, then drop whatever has left
/// the playfield (and coins already picked up).
pub fn scroll(state: &mut GameState) {
    let speed = state.speed.speed();
    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= speed;
    }
    for coin in state.coins.iter_mut() {
        coin.pos.x -= speed;
    }

    state.obstacles.retain(|o| o.right() >= 0.0);
    state
        .coins
        .retain(|c| !c.collected && c.pos.x + c.radius >= 0.0);
}

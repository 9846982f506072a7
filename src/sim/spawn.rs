//! Obstacle and coin generation
//!
//! Every obstacle is spawned together with exactly one coin centered in its
//! gap. Both enter at the right edge of the playfield.

use glam::Vec2;
use rand::Rng;

use super::state::{Coin, GameState, Obstacle, Particle};
use crate::consts::*;

/// Pick a random gap center for an obstacle.
///
/// Uniform in `[gap/2, height - gap/2]`; falls back to the middle when the
/// playfield is too short to fit a gap.
pub fn random_gap_center<R: Rng>(rng: &mut R, height: f32, gap_height: f32) -> f32 {
    let lo = gap_height / 2.0;
    let hi = height - gap_height / 2.0;
    if hi <= lo {
        return height / 2.0;
    }
    rng.random_range(lo..=hi)
}

/// Spawn an obstacle and its coin at the right edge
pub fn spawn_obstacle(state: &mut GameState) {
    let center = random_gap_center(&mut state.rng, state.height, state.gap_height);
    // The gap sits directly above its center line
    let top = center - state.gap_height;
    let bottom = center;
    let x = state.width;

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        x,
        width: OBSTACLE_WIDTH,
        top,
        bottom,
        passed: false,
    });

    let id = state.next_entity_id();
    state.coins.push(Coin {
        id,
        pos: Vec2::new(x + OBSTACLE_WIDTH / 2.0, top + state.gap_height / 2.0),
        radius: COIN_RADIUS,
        collected: false,
    });
}

/// Burst of sparkles where a coin was picked up
pub fn spawn_particles(state: &mut GameState, pos: Vec2) {
    for _ in 0..PARTICLE_BURST {
        let vel = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * PARTICLE_SPREAD,
            (state.rng.random::<f32>() - 0.5) * PARTICLE_SPREAD,
        );
        state.particles.push(Particle {
            pos,
            vel,
            life: PARTICLE_LIFE_TICKS,
        });
    }
}

/// Move particles and drop expired ones
pub fn update_particles(particles: &mut Vec<Particle>) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.life = p.life.saturating_sub(1);
    }
    particles.retain(|p| p.life > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_gap_center_range_over_many_spawns() {
        let mut state = GameState::new(2024);
        let lo = state.gap_height / 2.0;
        let hi = state.height - state.gap_height / 2.0;

        for _ in 0..1000 {
            spawn_obstacle(&mut state);
        }
        assert_eq!(state.obstacles.len(), 1000);
        for o in &state.obstacles {
            assert!(o.bottom >= lo && o.bottom <= hi, "center {} out of range", o.bottom);
            assert_eq!(o.top, o.bottom - state.gap_height);
            assert!(o.top < o.bottom);
            assert!((o.bottom - o.top - GAP_HEIGHT).abs() < 1e-3);
        }
    }

    #[test]
    fn test_coin_sits_in_its_gap() {
        let mut state = GameState::new(5);
        spawn_obstacle(&mut state);
        let o = &state.obstacles[0];
        let c = &state.coins[0];
        assert_eq!(o.x, state.width);
        assert!(!o.passed);
        assert!(!c.collected);
        assert_eq!(c.pos.x, o.x + o.width / 2.0);
        assert!((c.pos.y - o.gap_center()).abs() < 1e-3);
        assert_eq!(c.radius, COIN_RADIUS);
        assert_ne!(o.id, c.id);
    }

    #[test]
    fn test_short_playfield_uses_middle() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(random_gap_center(&mut rng, 150.0, 200.0), 75.0);
    }

    #[test]
    fn test_particle_burst_and_decay() {
        let mut state = GameState::new(9);
        spawn_particles(&mut state, Vec2::new(300.0, 300.0));
        assert_eq!(state.particles.len(), PARTICLE_BURST);
        for p in &state.particles {
            assert!(p.vel.x.abs() <= PARTICLE_SPREAD / 2.0);
            assert!(p.vel.y.abs() <= PARTICLE_SPREAD / 2.0);
        }

        for _ in 0..PARTICLE_LIFE_TICKS - 1 {
            update_particles(&mut state.particles);
        }
        assert_eq!(state.particles.len(), PARTICLE_BURST);
        update_particles(&mut state.particles);
        assert!(state.particles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_gap_center_in_range(seed in any::<u64>(), height in 200.0f32..2000.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let center = random_gap_center(&mut rng, height, GAP_HEIGHT);
            prop_assert!(center >= GAP_HEIGHT / 2.0);
            prop_assert!(center <= height - GAP_HEIGHT / 2.0);
        }
    }
}

//! Avatar physics
//!
//! Explicit Euler integration, one step per simulation tick. Nothing is
//! clamped: velocity grows without bound while falling.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why the avatar left the playable area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Escape {
    /// Bottom edge crossed the floor
    Floor,
    /// Top edge went above the ceiling
    Ceiling,
}

/// The player-controlled flyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner; `x` never changes
    pub pos: Vec2,
    /// Vertical velocity (positive is down)
    pub velocity: f32,
    pub size: Vec2,
    pub gravity: f32,
    pub jump_velocity: f32,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            pos: Vec2::new(AVATAR_X, AVATAR_START_Y),
            velocity: 0.0,
            size: Vec2::new(AVATAR_WIDTH, AVATAR_HEIGHT),
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
        }
    }
}

impl Avatar {
    /// Place at a height with zero velocity
    pub fn reset(&mut self, y: f32) {
        self.pos.y = y;
        self.velocity = 0.0;
    }

    /// One tick of gravity
    pub fn apply_gravity(&mut self) {
        self.velocity += self.gravity;
        self.pos.y += self.velocity;
    }

    /// Replace the current velocity with the jump impulse
    pub fn jump(&mut self) {
        self.velocity = self.jump_velocity;
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Radius used for coin pickup (the avatar is treated as a circle)
    pub fn pickup_radius(&self) -> f32 {
        self.size.x / 2.0
    }

    /// Check the vertical bounds of the playfield
    pub fn escape(&self, playfield_height: f32, ceiling_is_fatal: bool) -> Option<Escape> {
        if self.bottom() > playfield_height {
            Some(Escape::Floor)
        } else if ceiling_is_fatal && self.top() < 0.0 {
            Some(Escape::Ceiling)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_jump_overrides_velocity() {
        let mut avatar = Avatar::default();
        avatar.velocity = 12.5;
        avatar.jump();
        assert_eq!(avatar.velocity, JUMP_VELOCITY);

        // No stacking
        avatar.jump();
        assert_eq!(avatar.velocity, JUMP_VELOCITY);
    }

    #[test]
    fn test_reset_zeroes_velocity() {
        let mut avatar = Avatar::default();
        avatar.velocity = 3.0;
        avatar.pos.y = 700.0;
        avatar.reset(AVATAR_START_Y);
        assert_eq!(avatar.pos, Vec2::new(AVATAR_X, AVATAR_START_Y));
        assert_eq!(avatar.velocity, 0.0);
    }

    #[test]
    fn test_floor_escape() {
        let mut avatar = Avatar::default();
        avatar.pos.y = 760.0;
        assert_eq!(avatar.escape(800.0, false), None);
        avatar.pos.y = 760.5;
        assert_eq!(avatar.escape(800.0, false), Some(Escape::Floor));
    }

    #[test]
    fn test_ceiling_escape_is_optional() {
        let mut avatar = Avatar::default();
        avatar.pos.y = -5.0;
        assert_eq!(avatar.escape(800.0, false), None);
        assert_eq!(avatar.escape(800.0, true), Some(Escape::Ceiling));
    }

    #[test]
    fn test_center_and_pickup_radius() {
        let avatar = Avatar::default();
        assert_eq!(avatar.center(), Vec2::new(45.0, 170.0));
        assert_eq!(avatar.pickup_radius(), 20.0);
    }

    proptest! {
        #[test]
        fn prop_gravity_is_euler_step(y in -500.0f32..1500.0, v in -20.0f32..20.0) {
            let mut avatar = Avatar::default();
            avatar.pos.y = y;
            avatar.velocity = v;
            avatar.apply_gravity();

            let expected_v = v + GRAVITY;
            prop_assert_eq!(avatar.velocity, expected_v);
            prop_assert_eq!(avatar.pos.y, y + expected_v);
        }
    }
}

//! Collision predicates between the avatar and world entities
//!
//! Obstacles use axis-aligned boxes. Coins use circle-vs-circle with the
//! avatar approximated as a circle of half its width.

use super::avatar::Avatar;
use super::state::{Coin, Obstacle};

/// Whether the avatar's horizontal span overlaps the obstacle's
#[inline]
pub fn overlaps_horizontally(avatar: &Avatar, obstacle: &Obstacle) -> bool {
    avatar.left() < obstacle.right() && avatar.right() > obstacle.x
}

/// Whether the avatar's vertical span fits inside the obstacle's gap
#[inline]
pub fn fits_in_gap(avatar: &Avatar, obstacle: &Obstacle) -> bool {
    obstacle.top <= avatar.top() && avatar.bottom() <= obstacle.bottom
}

/// Avatar touches a pillar segment
pub fn hits_obstacle(avatar: &Avatar, obstacle: &Obstacle) -> bool {
    overlaps_horizontally(avatar, obstacle) && !fits_in_gap(avatar, obstacle)
}

/// Obstacle's trailing edge is behind the avatar's leading edge and it
/// hasn't been counted yet
pub fn has_passed(avatar: &Avatar, obstacle: &Obstacle) -> bool {
    !obstacle.passed && obstacle.right() < avatar.left()
}

/// Avatar is close enough to pick the coin up
pub fn touches_coin(avatar: &Avatar, coin: &Coin) -> bool {
    if coin.collected {
        return false;
    }
    avatar.center().distance(coin.pos) < coin.radius + avatar.pickup_radius()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;

    fn avatar_at(y: f32) -> Avatar {
        let mut avatar = Avatar::default();
        avatar.pos.y = y;
        avatar
    }

    fn obstacle(x: f32, top: f32, bottom: f32) -> Obstacle {
        Obstacle {
            id: 1,
            x,
            width: OBSTACLE_WIDTH,
            top,
            bottom,
            passed: false,
        }
    }

    #[test]
    fn test_avatar_below_gap_is_fatal() {
        // Avatar spans 100..140, gap is 50..90
        let avatar = avatar_at(100.0);
        let o = obstacle(0.0, 50.0, 90.0);
        assert!(overlaps_horizontally(&avatar, &o));
        assert!(hits_obstacle(&avatar, &o));
    }

    #[test]
    fn test_avatar_inside_gap_is_safe() {
        // Avatar spans 100..140, gap is 80..160
        let avatar = avatar_at(100.0);
        let o = obstacle(0.0, 80.0, 160.0);
        assert!(fits_in_gap(&avatar, &o));
        assert!(!hits_obstacle(&avatar, &o));
    }

    #[test]
    fn test_gap_edges_are_inclusive() {
        let avatar = avatar_at(100.0);
        let o = obstacle(0.0, 100.0, 140.0);
        assert!(!hits_obstacle(&avatar, &o));
    }

    #[test]
    fn test_no_horizontal_overlap_is_safe() {
        let avatar = avatar_at(100.0);
        // Entirely to the right
        let o = obstacle(AVATAR_X + AVATAR_WIDTH, 500.0, 700.0);
        assert!(!hits_obstacle(&avatar, &o));
        // Entirely to the left
        let o = obstacle(AVATAR_X - OBSTACLE_WIDTH, 500.0, 700.0);
        assert!(!hits_obstacle(&avatar, &o));
    }

    #[test]
    fn test_pass_needs_trailing_edge_behind_avatar() {
        let avatar = avatar_at(100.0);
        let mut o = obstacle(AVATAR_X - OBSTACLE_WIDTH, 0.0, 200.0);
        // Trailing edge exactly at avatar.x: not yet
        assert!(!has_passed(&avatar, &o));
        o.x -= 0.5;
        assert!(has_passed(&avatar, &o));
        o.passed = true;
        assert!(!has_passed(&avatar, &o));
    }

    #[test]
    fn test_coin_pickup_distance() {
        let avatar = avatar_at(100.0);
        let center = avatar.center();
        let mut coin = Coin {
            id: 2,
            pos: center + Vec2::new(COIN_RADIUS + AVATAR_WIDTH / 2.0 - 0.1, 0.0),
            radius: COIN_RADIUS,
            collected: false,
        };
        assert!(touches_coin(&avatar, &coin));

        coin.pos = center + Vec2::new(COIN_RADIUS + AVATAR_WIDTH / 2.0, 0.0);
        assert!(!touches_coin(&avatar, &coin));

        coin.pos = center;
        coin.collected = true;
        assert!(!touches_coin(&avatar, &coin));
    }
}

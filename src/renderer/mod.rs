//! Rendering boundary
//!
//! The game decides what exists and where; a `Surface` decides how it looks.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use crate::sim::{GameState, RunPhase};

/// Drawing primitives the frame walk needs
pub trait Surface {
    /// Clear and paint the backdrop for a `width` x `height` playfield
    fn clear(&mut self, width: f32, height: f32);
    /// Top-left corner and size, with the skin's image reference
    fn draw_avatar(&mut self, x: f32, y: f32, w: f32, h: f32, image: &str);
    /// Upper segment spans `0..top`, lower segment spans `bottom..height`
    fn draw_obstacle(&mut self, x: f32, width: f32, top: f32, bottom: f32, height: f32);
    fn draw_coin(&mut self, x: f32, y: f32, radius: f32);
    fn draw_particle(&mut self, x: f32, y: f32);
    /// Centered status line at the top
    fn draw_hud(&mut self, text: &str);
}

/// Status line shown during play
pub fn hud_text(score: u32, coins: u64) -> String {
    format!("Score: {score} | Coins: {coins}")
}

/// Paint one frame of the game
pub fn draw_frame(surface: &mut dyn Surface, state: &GameState, skin_image: &str, coins: u64) {
    surface.clear(state.width, state.height);

    let avatar = &state.avatar;
    surface.draw_avatar(avatar.pos.x, avatar.pos.y, avatar.size.x, avatar.size.y, skin_image);

    // The idle screen shows only the avatar
    if state.phase == RunPhase::Idle {
        return;
    }

    for o in &state.obstacles {
        surface.draw_obstacle(o.x, o.width, o.top, o.bottom, state.height);
    }
    for c in state.coins.iter().filter(|c| !c.collected) {
        surface.draw_coin(c.pos.x, c.pos.y, c.radius);
    }
    for p in &state.particles {
        surface.draw_particle(p.pos.x, p.pos.y);
    }

    surface.draw_hud(&hud_text(state.score, coins));
}

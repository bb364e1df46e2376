//! Planet Defense - A turret-versus-waves arcade game core
//!
//! Core modules:
//! - `sim`: Simulation (spawn director, weapons, projectiles, collisions, economy)
//! - `levels`: Data-driven level balance
//! - `settings`: Runtime configuration
//!
//! Drawing, windowing and input capture live outside this crate. The
//! simulation consumes a [`sim::TickInput`] per frame and exposes read-only
//! state through [`sim::GameState::snapshot`].

pub mod levels;
pub mod settings;
pub mod sim;

pub use levels::{LevelDef, LevelTable};
pub use settings::{DebugSpeed, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play area dimensions (pixels)
    pub const WINDOW_WIDTH: f32 = 600.0;
    pub const WINDOW_HEIGHT: f32 = 800.0;

    /// Pool capacities
    pub const ENEMY_CAPACITY: usize = 128;
    pub const PLAYER_PROJECTILE_CAPACITY: usize = 512;
    pub const ENEMY_PROJECTILE_CAPACITY: usize = 128;
    pub const EXPLOSION_CAPACITY: usize = 50;

    /// Player station: distance from the bottom edge to its center
    pub const PLAYER_OFFSET_Y: f32 = 200.0;
    pub const PLAYER_HITBOX_RADIUS: f32 = 35.0;
    pub const PLAYER_MAX_HEALTH: i32 = 20;
    pub const PLANET_MAX_HEALTH: i32 = 30;
    /// Turret spin (degrees per second)
    pub const PLAYER_ROTATION_SPEED: f32 = 30.0;
    /// Health granted to player and planet once a defeat is registered,
    /// so the defeat check cannot fire twice during the fade-out.
    pub const DEFEAT_HEALTH_BONUS: i32 = 9999;

    /// Height of the weapon panel at the bottom of the screen. Enemies that
    /// descend past its top edge breach the planet.
    pub const WEAPON_PANEL_HEIGHT: f32 = 125.0;
    pub const BREACH_Y: f32 = WINDOW_HEIGHT - WEAPON_PANEL_HEIGHT;

    /// Base descent speed used by the spawn front (pixels/s)
    pub const ENEMY_SPEED: f32 = 25.0;
    /// Resting offset of the spawn front above the screen
    pub const SPAWN_Y_MIN: f32 = -100.0;
    /// Repositioning attempts when a new enemy overlaps an existing one
    pub const SPAWN_PLACEMENT_ATTEMPTS: usize = 10;
    /// Random portion of the first-shot cooldown (seconds)
    pub const FIRST_SHOT_JITTER: f32 = 3.0;

    /// Currency animation length (seconds)
    pub const TRANSACTION_DURATION: f32 = 0.33;

    /// Weapon upgrades
    pub const WEAPON_MAX_LEVEL: u32 = 10;
    pub const UPGRADE_COST_SCALING: f32 = 1.1;
    /// Ready-alert blink window after a weapon regains ammo (seconds)
    pub const READY_ALERT_DURATION: f32 = 0.2;

    /// Screen transition durations (seconds)
    pub const MENU_TRANSITION_DURATION: f32 = 0.5;
    pub const LEVEL_TRANSITION_DURATION: f32 = 4.0;
    pub const GIVE_UP_TRANSITION_DURATION: f32 = 2.0;

    /// Debug cheat amounts
    pub const DEBUG_MONEY_GRANT: i32 = 1000;
    pub const DEBUG_HEALTH_GRANT: i32 = 100;
}

/// Center of an axis-aligned box anchored at its top-left corner
#[inline]
pub fn rect_center(top_left: Vec2, size: Vec2) -> Vec2 {
    top_left + size / 2.0
}

/// Rotate a vector by an angle in degrees (counter-clockwise in math
/// convention, clockwise on a y-down screen)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center_is_half_size_from_corner() {
        let c = rect_center(Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0));
        assert_eq!(c, Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_degrees(Vec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let v = Vec2::new(3.0, -4.0);
        assert_eq!(rotate_degrees(v, 0.0), v);
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame time only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod director;
pub mod economy;
pub mod entities;
pub mod pool;
pub mod rng;
pub mod state;
pub mod tick;
pub mod weapons;

pub use collision::{Rect, circle_circle, circle_rect, rect_overlap, splash_damage};
pub use director::{DirectorEvent, SpawnDirector, pick};
pub use economy::Wallet;
pub use entities::{
    Color, Enemy, EnemyKind, EnemyProjectile, EnemyProjectileKind, Explosion, PlayerProjectile,
    PlayerProjectileKind,
};
pub use pool::{Pool, Slot};
pub use rng::SimRng;
pub use state::{GameEvent, GameState, Player, Screen, Snapshot, Transition};
pub use tick::{DebugCommand, MenuAction, TickInput, tick};
pub use weapons::{Armory, Purchase, Weapon, WeaponKind};

//! Entity records and their static definitions
//!
//! Per-instance state lives in the pooled records (`Enemy`, `PlayerProjectile`,
//! `EnemyProjectile`, `Explosion`). Everything shared by all instances of a
//! kind lives in the `*Def` tables returned by each kind's `def()`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Slot;
use crate::rect_center;

/// RGB color carried by explosions for the drawing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const ORANGE: Color = Color::rgb(255, 161, 0);
    pub const PALE_YELLOW: Color = Color::rgb(255, 255, 175);
    pub const AMBER: Color = Color::rgb(255, 160, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// === Enemies ===

pub const ENEMY_KIND_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Light,
    Medium,
    Shooter,
    HeavyShooter,
}

/// Ranged attack for enemies that shoot back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedAttack {
    /// Maximum distance from enemy center to player center
    pub range: f32,
    /// Seconds between shots
    pub cooldown: f32,
    pub projectile: EnemyProjectileKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDef {
    pub size: Vec2,
    pub max_health: i32,
    /// Descent speed (pixels/s)
    pub speed: f32,
    /// Planet damage on breach
    pub damage: i32,
    /// Spawn credits consumed, also the kill bounty
    pub cost: f32,
    pub attack: Option<RangedAttack>,
}

const LIGHT: EnemyDef = EnemyDef {
    size: Vec2::new(25.0, 40.0),
    max_health: 25,
    speed: 25.0,
    damage: 4,
    cost: 10.0,
    attack: None,
};

const MEDIUM: EnemyDef = EnemyDef {
    size: Vec2::new(35.0, 60.0),
    max_health: 60,
    speed: 25.0,
    damage: 10,
    cost: 20.0,
    attack: None,
};

const SHOOTER: EnemyDef = EnemyDef {
    size: Vec2::new(35.0, 40.0),
    max_health: 30,
    speed: 25.0,
    damage: 4,
    cost: 20.0,
    attack: Some(RangedAttack {
        range: 250.0,
        cooldown: 999.0,
        projectile: EnemyProjectileKind::Bolt,
    }),
};

const HEAVY_SHOOTER: EnemyDef = EnemyDef {
    size: Vec2::new(40.0, 50.0),
    max_health: 45,
    speed: 25.0,
    damage: 5,
    cost: 30.0,
    attack: Some(RangedAttack {
        range: 9999.0,
        cooldown: 999.0,
        projectile: EnemyProjectileKind::HeavyShell,
    }),
};

impl EnemyKind {
    /// All kinds in declaration order. Pick ties favor earlier entries.
    pub const ALL: [EnemyKind; ENEMY_KIND_COUNT] = [
        EnemyKind::Light,
        EnemyKind::Medium,
        EnemyKind::Shooter,
        EnemyKind::HeavyShooter,
    ];

    pub fn def(self) -> &'static EnemyDef {
        match self {
            EnemyKind::Light => &LIGHT,
            EnemyKind::Medium => &MEDIUM,
            EnemyKind::Shooter => &SHOOTER,
            EnemyKind::HeavyShooter => &HEAVY_SHOOTER,
        }
    }

    /// Position in `ALL` (and in per-level weight vectors)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn cost(self) -> f32 {
        self.def().cost
    }
}

/// A descending enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: i32,
    /// Top-left corner of the body
    pub pos: Vec2,
    /// Fire cooldown accumulator (seconds)
    pub fire_timer: f32,
    /// Set once the randomized first-shot delay has been armed
    pub first_shot_armed: bool,
    /// Seconds since the last hit, for health bar display
    pub since_damaged: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        let def = kind.def();
        Self {
            kind,
            health: def.max_health,
            pos,
            fire_timer: def.attack.map_or(0.0, |a| a.cooldown),
            first_shot_armed: false,
            since_damaged: f32::MAX,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.kind.def().size
    }

    pub fn center(&self) -> Vec2 {
        rect_center(self.pos, self.size())
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
        self.since_damaged = 0.0;
    }
}

impl Slot for Enemy {}

// === Player projectiles ===

/// Visual/gameplay effect spawned when something detonates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionTemplate {
    pub size: f32,
    pub lifetime: f32,
    pub color: Color,
}

impl ExplosionTemplate {
    pub fn at(&self, pos: Vec2) -> Explosion {
        Explosion::new(pos, self.size, self.lifetime, self.color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerProjectileKind {
    Burst,
    Cannon,
    Autocannon,
    Torpedo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerProjectileDef {
    pub radius: f32,
    /// Explosive rounds damage everything inside the explosion radius
    pub explosive: bool,
    pub explosion: ExplosionTemplate,
}

impl PlayerProjectileKind {
    pub fn def(self) -> &'static PlayerProjectileDef {
        const BURST: PlayerProjectileDef = PlayerProjectileDef {
            radius: 3.0,
            explosive: false,
            explosion: ExplosionTemplate {
                size: 15.0,
                lifetime: 0.10,
                color: Color::PALE_YELLOW,
            },
        };
        const CANNON: PlayerProjectileDef = PlayerProjectileDef {
            radius: 8.0,
            explosive: false,
            explosion: ExplosionTemplate {
                size: 20.0,
                lifetime: 0.10,
                color: Color::WHITE,
            },
        };
        const AUTOCANNON: PlayerProjectileDef = PlayerProjectileDef {
            radius: 5.0,
            explosive: true,
            explosion: ExplosionTemplate {
                size: 50.0,
                lifetime: 0.15,
                color: Color::AMBER,
            },
        };
        const TORPEDO: PlayerProjectileDef = PlayerProjectileDef {
            radius: 20.0,
            explosive: true,
            explosion: ExplosionTemplate {
                size: 150.0,
                lifetime: 0.30,
                color: Color::ORANGE,
            },
        };

        match self {
            PlayerProjectileKind::Burst => &BURST,
            PlayerProjectileKind::Cannon => &CANNON,
            PlayerProjectileKind::Autocannon => &AUTOCANNON,
            PlayerProjectileKind::Torpedo => &TORPEDO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProjectile {
    pub kind: PlayerProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Damage stamped from the firing weapon's level
    pub damage: i32,
    /// Delay before the pellet starts moving (staggered volleys)
    pub wait: f32,
    /// Hit something this tick; freed at the start of the next one
    pub spent: bool,
}

impl PlayerProjectile {
    pub fn radius(&self) -> f32 {
        self.kind.def().radius
    }

    /// Still waiting for its staggered launch
    pub fn is_waiting(&self) -> bool {
        self.wait > 0.0
    }
}

impl Slot for PlayerProjectile {}

// === Enemy projectiles ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyProjectileKind {
    /// Light shot from `Shooter`
    Bolt,
    /// Slow shell from `HeavyShooter`; burst pellets can shoot it down
    HeavyShell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProjectileDef {
    pub damage: i32,
    pub radius: f32,
    pub speed: f32,
    /// Hit points when it can be shot down
    pub destroyable: Option<i32>,
}

impl EnemyProjectileKind {
    pub fn def(self) -> &'static EnemyProjectileDef {
        const BOLT: EnemyProjectileDef = EnemyProjectileDef {
            damage: 5,
            radius: 4.0,
            speed: 60.0,
            destroyable: None,
        };
        const HEAVY_SHELL: EnemyProjectileDef = EnemyProjectileDef {
            damage: 8,
            radius: 15.0,
            speed: 50.0,
            destroyable: Some(15),
        };

        match self {
            EnemyProjectileKind::Bolt => &BOLT,
            EnemyProjectileKind::HeavyShell => &HEAVY_SHELL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub kind: EnemyProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Only meaningful for destroyable kinds
    pub health: i32,
}

impl EnemyProjectile {
    /// Projectile leaving `from` toward `target` at the kind's speed
    pub fn aimed(kind: EnemyProjectileKind, from: Vec2, target: Vec2) -> Self {
        let def = kind.def();
        Self {
            kind,
            pos: from,
            vel: (target - from).normalize_or_zero() * def.speed,
            health: def.destroyable.unwrap_or(0),
        }
    }

    pub fn radius(&self) -> f32 {
        self.kind.def().radius
    }
}

impl Slot for EnemyProjectile {}

// === Explosions ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    /// Final radius
    pub size: f32,
    pub lifetime: f32,
    pub elapsed: f32,
    pub color: Color,
}

impl Explosion {
    pub fn new(pos: Vec2, size: f32, lifetime: f32, color: Color) -> Self {
        Self {
            pos,
            size,
            lifetime,
            elapsed: 0.0,
            color,
        }
    }

    /// Growth fraction in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.lifetime).clamp(0.0, 1.0)
    }
}

impl Slot for Explosion {
    fn is_live(&self) -> bool {
        self.elapsed < self.lifetime
    }
}

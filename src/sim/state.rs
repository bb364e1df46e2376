//! Game state and screen flow
//!
//! Everything the simulation mutates lives in `GameState`. The drawing layer
//! reads it through `snapshot()` and never writes to it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::director::SpawnDirector;
use super::economy::Wallet;
use super::entities::{Enemy, EnemyKind, EnemyProjectile, Explosion, PlayerProjectile};
use super::pool::Pool;
use super::rng::SimRng;
use super::weapons::{Armory, WeaponKind};
use crate::consts::*;
use crate::levels::{LevelDef, LevelTable};
use crate::settings::Settings;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    MainMenu,
    LevelSelection,
    Level,
    Upgrade,
    GameOver,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::MainMenu => "MainMenu",
            Screen::LevelSelection => "LevelSelection",
            Screen::Level => "Level",
            Screen::Upgrade => "Upgrade",
            Screen::GameOver => "GameOver",
        }
    }
}

/// A timed hand-over between two screens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
    pub elapsed: f32,
    pub duration: f32,
}

impl Transition {
    pub fn new(from: Screen, to: Screen, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    /// Completion ratio in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_running(&self) -> bool {
        self.elapsed < self.duration
    }
}

/// Which subsystems advance this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveSystems {
    pub money: bool,
    pub player: bool,
    pub weapons: bool,
    pub enemies: bool,
    pub projectiles: bool,
    pub explosions: bool,
    pub director: bool,
}

impl ActiveSystems {
    const NONE: ActiveSystems = ActiveSystems {
        money: false,
        player: false,
        weapons: false,
        enemies: false,
        projectiles: false,
        explosions: false,
        director: false,
    };

    /// Gate subsystems by the current screen and any running transition
    /// (`progress` is the transition's completion ratio after this frame's
    /// advance).
    pub fn select(screen: Screen, transition: Option<(Transition, f32)>) -> Self {
        let Some((t, progress)) = transition else {
            return match screen {
                Screen::Level => ActiveSystems {
                    money: true,
                    player: true,
                    weapons: true,
                    enemies: true,
                    projectiles: true,
                    explosions: true,
                    director: true,
                },
                Screen::Upgrade => ActiveSystems {
                    money: true,
                    ..Self::NONE
                },
                _ => Self::NONE,
            };
        };

        let fading_out = progress <= 0.75;
        match (t.from, t.to) {
            (Screen::Level, Screen::GameOver) => ActiveSystems {
                money: true,
                player: fading_out,
                weapons: fading_out,
                enemies: fading_out,
                projectiles: fading_out,
                explosions: fading_out,
                director: false,
            },
            (Screen::Level, Screen::Upgrade) => ActiveSystems {
                player: fading_out,
                weapons: fading_out,
                projectiles: fading_out,
                explosions: fading_out,
                ..Self::NONE
            },
            (_, Screen::Level) => ActiveSystems {
                player: progress > 0.25,
                ..Self::NONE
            },
            _ => Self::NONE,
        }
    }
}

/// The defended station and the planet behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub center: Vec2,
    pub hitbox_radius: f32,
    pub health: i32,
    pub planet_health: i32,
    /// Turret rotation (degrees)
    pub rotation: f32,
    /// Cleared once the station has been destroyed this level
    pub intact: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            center: Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT - PLAYER_OFFSET_Y),
            hitbox_radius: PLAYER_HITBOX_RADIUS,
            health: PLAYER_MAX_HEALTH,
            planet_health: PLANET_MAX_HEALTH,
            rotation: 0.0,
            intact: true,
        }
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: usize },
    WaveSpawned { count: usize },
    EnemyDestroyed { kind: EnemyKind, bounty: i32 },
    PlanetBreached { kind: EnemyKind, damage: i32 },
    PlayerHit { damage: i32 },
    /// A weapon regained a round (drives the ready alert)
    AmmoRegained { weapon: WeaponKind },
    LevelCleared { level: usize },
    LevelFailed { level: usize },
    WeaponUnlocked { weapon: WeaponKind },
    WeaponUpgraded { weapon: WeaponKind, level: u32 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub levels: LevelTable,
    pub rng: SimRng,
    pub screen: Screen,
    pub transition: Option<Transition>,
    pub player: Player,
    pub wallet: Wallet,
    pub armory: Armory,
    pub director: SpawnDirector,
    pub enemies: Pool<Enemy>,
    pub player_projectiles: Pool<PlayerProjectile>,
    pub enemy_projectiles: Pool<EnemyProjectile>,
    pub explosions: Pool<Explosion>,
    /// Last known pointer position (aim target)
    pub pointer: Vec2,
    /// Simulated seconds since creation
    pub time: f32,
    /// Events recorded during the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game on the main menu with default settings and levels
    pub fn new(seed: u64) -> Self {
        Self::with_config(Settings::default(), LevelTable::default(), seed)
    }

    pub fn with_config(settings: Settings, levels: LevelTable, seed: u64) -> Self {
        let armory = Armory::new(settings.fire_keys);
        let director = SpawnDirector::new(levels.max_index());
        let player = Player::default();
        let pointer = player.center - Vec2::new(0.0, 1.0);

        Self {
            settings,
            levels,
            rng: SimRng::new(seed),
            screen: Screen::MainMenu,
            transition: None,
            player,
            wallet: Wallet::default(),
            armory,
            director,
            enemies: Pool::new(ENEMY_CAPACITY),
            player_projectiles: Pool::new(PLAYER_PROJECTILE_CAPACITY),
            enemy_projectiles: Pool::new(ENEMY_PROJECTILE_CAPACITY),
            explosions: Pool::new(EXPLOSION_CAPACITY),
            pointer,
            time: 0.0,
            events: Vec::new(),
        }
    }

    /// Tuning for the level being played
    pub fn level_def(&self) -> &LevelDef {
        self.levels.get(self.director.level)
    }

    /// Whether a screen transition is still playing
    pub fn in_transition(&self) -> bool {
        self.transition.is_some_and(|t| t.is_running())
    }

    /// Switch screens through a timed transition
    pub fn go_to(&mut self, to: Screen, duration: f32) {
        let from = self.screen;
        log::debug!("Screen {} -> {}", from.as_str(), to.as_str());
        self.screen = to;
        self.transition = Some(Transition::new(from, to, duration));
    }

    /// Begin a level (clamped to the last level) with a fresh field
    pub fn start_level(&mut self, level: usize) {
        let level = self.director.start_level(level, &self.levels);

        self.player = Player::default();
        self.player_projectiles.clear();
        self.enemy_projectiles.clear();
        self.enemies.clear();
        self.armory.reset_for_level();

        self.go_to(Screen::Level, LEVEL_TRANSITION_DURATION);
        self.events.push(GameEvent::LevelStarted { level });
    }

    /// Current game state snapshot for the drawing layer
    pub fn snapshot(&self) -> Snapshot {
        let def = self.level_def();
        Snapshot {
            seed: self.rng.seed(),
            screen: self.screen,
            transition_progress: self.transition.filter(Transition::is_running).map(|t| t.progress()),
            level: self.director.level,
            unlocked_level: self.director.unlocked,
            level_progress: self.director.progress(def),
            money: self.wallet.displayed(),
            player_health: self.player.health,
            planet_health: self.player.planet_health,
            player_rotation: self.player.rotation,
            weapons: self
                .armory
                .weapons
                .iter()
                .map(|w| WeaponView {
                    kind: w.kind,
                    unlocked: w.unlocked,
                    level: w.level,
                    ammo: w.ammo,
                    ammo_max: w.ammo_max,
                    reload: w.reload_fraction(),
                    upgrade_cost: w.upgrade_cost,
                    ready_alert: self.settings.weapon_ready_alert && w.ready_alert_lit(),
                })
                .collect(),
            enemies: self.enemies.iter().map(|(_, e)| e.clone()).collect(),
            player_projectiles: self
                .player_projectiles
                .iter()
                .map(|(_, p)| p.clone())
                .collect(),
            enemy_projectiles: self
                .enemy_projectiles
                .iter()
                .map(|(_, p)| p.clone())
                .collect(),
            explosions: self.explosions.iter().map(|(_, e)| e.clone()).collect(),
        }
    }
}

/// Per-weapon HUD data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponView {
    pub kind: WeaponKind,
    pub unlocked: bool,
    pub level: u32,
    pub ammo: i32,
    pub ammo_max: i32,
    /// Progress toward the next round in [0, 1]
    pub reload: f32,
    pub upgrade_cost: i32,
    pub ready_alert: bool,
}

/// Read-only view of everything the drawing layer needs. Pool contents are
/// listed in slot order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Seed of the run, for replays
    pub seed: u64,
    pub screen: Screen,
    pub transition_progress: Option<f32>,
    pub level: usize,
    pub unlocked_level: usize,
    pub level_progress: f32,
    pub money: i32,
    pub player_health: i32,
    pub planet_health: i32,
    pub player_rotation: f32,
    pub weapons: Vec<WeaponView>,
    pub enemies: Vec<Enemy>,
    pub player_projectiles: Vec<PlayerProjectile>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub explosions: Vec<Explosion>,
}

//! Planet Defense headless driver
//!
//! Runs the simulation without a window, steered by a simple autopilot.
//! Usage: `planet-defense [settings.json] [frames]`

use planet_defense::LevelTable;
use planet_defense::settings::Settings;
use planet_defense::sim::{GameEvent, GameState, MenuAction, Screen, TickInput, tick};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Planet Defense (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!("Game initialized with seed: {}", seed);

    let levels = match &settings.levels_path {
        Some(path) => LevelTable::load(path),
        None => LevelTable::default(),
    };

    let mut state = GameState::with_config(settings, levels, seed);
    state.start_level(0);

    let mut autopilot = Autopilot::default();
    for _ in 0..frames {
        let input = autopilot.input(&state);
        tick(&mut state, &input, FRAME_DT);
        autopilot.observe(&state.events);
    }

    let snapshot = state.snapshot();
    log::info!(
        "Finished after {:.0}s: level {} (unlocked {}), {} cleared, {} failed, {} kills, money {}",
        state.time,
        snapshot.level + 1,
        snapshot.unlocked_level + 1,
        autopilot.cleared,
        autopilot.failed,
        autopilot.kills,
        snapshot.money
    );
    match serde_json::to_string(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Snapshot serialization failed: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless driver only targets native platforms
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Plays the game well enough to move through the levels
#[derive(Debug, Default)]
struct Autopilot {
    cleared: u32,
    failed: u32,
    kills: u32,
}

impl Autopilot {
    fn input(&self, state: &GameState) -> TickInput {
        if state.in_transition() {
            return TickInput::default();
        }

        match state.screen {
            Screen::Level => self.fight(state),
            Screen::Upgrade => TickInput {
                menu: Some(self.shop(state)),
                ..Default::default()
            },
            Screen::GameOver => TickInput {
                menu: Some(MenuAction::Retry),
                ..Default::default()
            },
            Screen::MainMenu => TickInput {
                menu: Some(MenuAction::OpenLevelSelection),
                ..Default::default()
            },
            Screen::LevelSelection => TickInput {
                menu: Some(MenuAction::StartLevel(state.director.unlocked)),
                ..Default::default()
            },
        }
    }

    /// Aim at the enemy closest to the planet and fire whatever is loaded
    fn fight(&self, state: &GameState) -> TickInput {
        let target = state
            .enemies
            .iter()
            .filter(|(_, e)| e.pos.y > -e.size().y)
            .max_by(|(_, a), (_, b)| a.pos.y.total_cmp(&b.pos.y))
            .map(|(_, e)| e.center());

        let Some(target) = target else {
            return TickInput::default();
        };

        let keys_pressed = state
            .armory
            .weapons
            .iter()
            .filter(|w| w.unlocked && w.ammo > 0)
            .map(|w| w.key)
            .collect();

        TickInput {
            pointer: Some(target),
            keys_pressed,
            ..Default::default()
        }
    }

    /// Buy the cheapest affordable upgrade, one per frame, then move on
    fn shop(&self, state: &GameState) -> MenuAction {
        let balance = state.wallet.balance;
        state
            .armory
            .weapons
            .iter()
            .enumerate()
            .filter(|(_, w)| w.can_purchase(balance))
            .min_by_key(|(_, w)| w.upgrade_cost)
            .map_or(MenuAction::NextLevel, |(i, _)| MenuAction::Purchase(i))
    }

    fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::EnemyDestroyed { .. } => self.kills += 1,
                GameEvent::LevelCleared { level } => {
                    self.cleared += 1;
                    log::info!("Autopilot cleared level {}", level + 1);
                }
                GameEvent::LevelFailed { level } => {
                    self.failed += 1;
                    log::info!("Autopilot failed level {}, retrying", level + 1);
                }
                _ => {}
            }
        }
    }
}

//! Per-frame simulation tick
//!
//! One call to `tick` advances the whole game by one frame: debug commands,
//! screen transitions, the gated gameplay systems, then menu actions.

use glam::Vec2;

use super::collision::{Rect, circle_circle, circle_rect, splash_damage};
use super::director::DirectorEvent;
use super::entities::{Color, EnemyProjectile, Explosion, PlayerProjectile, PlayerProjectileKind};
use super::state::{ActiveSystems, GameEvent, GameState, Screen};
use super::weapons::Purchase;
use crate::consts::*;
use crate::settings::DebugSpeed;

/// One-shot screen actions coming from the menu layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenMainMenu,
    OpenLevelSelection,
    OpenUpgrades,
    /// Start a level from the level selection screen
    StartLevel(usize),
    /// Start the highest unlocked level from the upgrade screen
    NextLevel,
    /// Buy an upgrade (or unlock) for a weapon on the upgrade screen
    Purchase(usize),
    /// Replay the failed level
    Retry,
    /// Leave the game over screen for the upgrade screen
    GiveUp,
}

/// One-shot cheats, honoured only with `Settings::debug_commands`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    AddMoney,
    HealPlayer,
    HealPlanet,
    KillAllEnemies,
    EndLevel,
    UnlockNextLevel,
    UnlockAllLevels,
    ResetUnlockedLevels,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position (aim target); `None` keeps the last one
    pub pointer: Option<Vec2>,
    /// Keys pressed this frame (edge triggered)
    pub keys_pressed: Vec<char>,
    /// Menu button pressed this frame
    pub menu: Option<MenuAction>,
    /// Debug commands pressed this frame
    pub debug: Vec<DebugCommand>,
    /// Held time-scale key
    pub speed: DebugSpeed,
}

impl TickInput {
    fn has_debug(&self, command: DebugCommand) -> bool {
        self.debug.contains(&command)
    }
}

/// Advance the game state by one frame of `raw_dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, raw_dt: f32) {
    state.events.clear();

    let dt = state.settings.effective_dt(raw_dt, input.speed);
    state.time += dt;

    if let Some(pointer) = input.pointer {
        state.pointer = pointer;
    }

    let debug = state.settings.debug_commands;
    if debug {
        apply_global_debug(state, input);
    }

    let running = state.transition.filter(|t| t.is_running());
    let systems = match running {
        Some(mut t) => {
            t.elapsed += dt;
            state.transition = Some(t);
            ActiveSystems::select(state.screen, Some((t, t.progress())))
        }
        None => ActiveSystems::select(state.screen, None),
    };

    if systems.money {
        state.wallet.update(dt);
    }
    if systems.player {
        if debug {
            if input.has_debug(DebugCommand::HealPlayer) {
                state.player.health += DEBUG_HEALTH_GRANT;
            }
            if input.has_debug(DebugCommand::HealPlanet) {
                state.player.planet_health += DEBUG_HEALTH_GRANT;
            }
        }
        update_player(state, dt);
    }
    if systems.weapons {
        update_weapons(state, input, dt);
    }
    if systems.enemies {
        update_enemies(state, dt);
    }
    if systems.projectiles {
        update_projectiles(state, dt);
    }
    if systems.explosions {
        for (_, explosion) in state.explosions.iter_mut() {
            explosion.elapsed += dt;
        }
    }
    if systems.director {
        if debug {
            if input.has_debug(DebugCommand::KillAllEnemies) {
                log::info!("Debug: kill all enemies");
                state.director.kill_all(&mut state.enemies);
            }
            if input.has_debug(DebugCommand::EndLevel) {
                log::info!("Debug: end level");
                let def = state.levels.get(state.director.level);
                state.director.end_level(def, &mut state.enemies);
            }
        }
        update_director(state, dt);
    }

    // Menus only respond on a settled screen, including transitions the
    // systems above just started
    if !state.in_transition() {
        if let Some(action) = input.menu {
            apply_menu_action(state, action);
        }
    }
}

fn apply_global_debug(state: &mut GameState, input: &TickInput) {
    for &command in &input.debug {
        match command {
            DebugCommand::AddMoney => {
                log::info!("Debug: +{DEBUG_MONEY_GRANT} money");
                state.wallet.add(DEBUG_MONEY_GRANT);
            }
            DebugCommand::UnlockNextLevel => {
                state.director.unlock_next();
                log::info!("Debug: unlocked up to level {}", state.director.unlocked + 1);
            }
            DebugCommand::UnlockAllLevels => {
                state.director.unlock_all();
                log::info!("Debug: unlocked all levels");
            }
            DebugCommand::ResetUnlockedLevels => {
                state.director.reset_unlocks();
                log::info!("Debug: reset unlocked levels");
            }
            // Applied by the subsystem they affect
            DebugCommand::HealPlayer
            | DebugCommand::HealPlanet
            | DebugCommand::KillAllEnemies
            | DebugCommand::EndLevel => {}
        }
    }
}

fn apply_menu_action(state: &mut GameState, action: MenuAction) {
    let screen = state.screen;
    let menu_screen = matches!(
        screen,
        Screen::MainMenu | Screen::LevelSelection | Screen::Upgrade
    );

    match action {
        MenuAction::OpenMainMenu | MenuAction::OpenLevelSelection | MenuAction::OpenUpgrades
            if menu_screen =>
        {
            let to = match action {
                MenuAction::OpenMainMenu => Screen::MainMenu,
                MenuAction::OpenLevelSelection => Screen::LevelSelection,
                _ => Screen::Upgrade,
            };
            if to != screen {
                state.go_to(to, MENU_TRANSITION_DURATION);
            }
        }
        MenuAction::StartLevel(level) if screen == Screen::LevelSelection => {
            let level = level.min(state.director.unlocked);
            state.start_level(level);
        }
        MenuAction::NextLevel if screen == Screen::Upgrade => {
            state.start_level(state.director.unlocked);
        }
        MenuAction::Purchase(index) if screen == Screen::Upgrade => {
            match state.armory.purchase(index, &mut state.wallet) {
                Some(Purchase::Unlocked) => {
                    let weapon = state.armory.weapons[index].kind;
                    state.events.push(GameEvent::WeaponUnlocked { weapon });
                }
                Some(Purchase::Upgraded { level }) => {
                    let weapon = state.armory.weapons[index].kind;
                    state.events.push(GameEvent::WeaponUpgraded { weapon, level });
                }
                None => log::debug!("Purchase of weapon {index} refused"),
            }
        }
        MenuAction::Retry if screen == Screen::GameOver => {
            state.start_level(state.director.level);
        }
        MenuAction::GiveUp if screen == Screen::GameOver => {
            state.go_to(Screen::Upgrade, GIVE_UP_TRANSITION_DURATION);
        }
        _ => log::debug!("Ignoring {action:?} on {}", screen.as_str()),
    }
}

fn update_player(state: &mut GameState, dt: f32) {
    let player = &mut state.player;
    player.rotation += PLAYER_ROTATION_SPEED * dt;
    if player.rotation > 360.0 {
        player.rotation -= 360.0;
    }

    if player.health <= 0 {
        player.intact = false;
        let center = player.center;
        fail_level(state, Explosion::new(center, 250.0, 2.5, Color::ORANGE));
    } else if player.planet_health <= 0 {
        let planet = Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT);
        fail_level(state, Explosion::new(planet, 800.0, 3.0, Color::ORANGE));
    }
}

fn fail_level(state: &mut GameState, explosion: Explosion) {
    // Keep the defeat check from firing again while the level fades out
    state.player.health += DEFEAT_HEALTH_BONUS;
    state.player.planet_health += DEFEAT_HEALTH_BONUS;
    state.explosions.acquire(explosion);

    let level = state.director.level;
    log::info!("Level {} failed", level + 1);
    state.events.push(GameEvent::LevelFailed { level });
    state.go_to(Screen::GameOver, LEVEL_TRANSITION_DURATION);
}

fn update_weapons(state: &mut GameState, input: &TickInput, dt: f32) {
    for index in state.armory.update(dt) {
        let weapon = state.armory.weapons[index].kind;
        state.events.push(GameEvent::AmmoRegained { weapon });
    }
    state.armory.fire_pressed(
        &input.keys_pressed,
        state.player.center,
        state.pointer,
        &mut state.rng,
        &mut state.player_projectiles,
    );
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let target = state.player.center;

    for i in 0..state.enemies.capacity() {
        let Some(enemy) = state.enemies.get_mut(i) else {
            continue;
        };
        let def = enemy.kind.def();

        if enemy.is_dead() {
            let kind = enemy.kind;
            let bounty = kind.cost().floor() as i32;
            state
                .explosions
                .acquire(Explosion::new(enemy.center(), 60.0, 0.30, Color::ORANGE));
            state.wallet.add(bounty);
            state.enemies.release(i);
            state.events.push(GameEvent::EnemyDestroyed { kind, bounty });
            continue;
        }

        enemy.since_damaged += dt;
        enemy.pos.y += def.speed * dt;

        if enemy.pos.y > 0.0 {
            if let Some(attack) = def.attack {
                enemy.fire_timer += dt;

                let center = enemy.center();
                let in_range = center.distance(target) < attack.range;
                let ready = enemy.fire_timer > attack.cooldown;
                let above = enemy.pos.y < target.y || enemy.first_shot_armed;

                if in_range && ready && above {
                    if !enemy.first_shot_armed {
                        // First eligible tick only arms a shortened cooldown
                        enemy.first_shot_armed = true;
                        enemy.fire_timer = attack.cooldown - FIRST_SHOT_JITTER * state.rng.float();
                        continue;
                    }

                    let shot = EnemyProjectile::aimed(attack.projectile, center, target);
                    state.enemy_projectiles.acquire(shot);
                    enemy.fire_timer -= attack.cooldown;
                }
            }
        }

        if enemy.pos.y > BREACH_Y {
            let kind = enemy.kind;
            state.player.planet_health -= def.damage;
            state.enemies.release(i);
            state.events.push(GameEvent::PlanetBreached {
                kind,
                damage: def.damage,
            });
        }
    }
}

fn out_of_bounds(pos: Vec2, radius: f32) -> bool {
    pos.x + radius < 0.0
        || pos.x - radius >= WINDOW_WIDTH
        || pos.y + radius < 0.0
        || pos.y - radius >= WINDOW_HEIGHT
}

fn update_projectiles(state: &mut GameState, dt: f32) {
    for i in 0..state.player_projectiles.capacity() {
        let Some(projectile) = state.player_projectiles.get_mut(i) else {
            continue;
        };

        // Hit something last tick
        if projectile.spent {
            state.player_projectiles.release(i);
            continue;
        }

        if projectile.is_waiting() {
            projectile.wait -= dt;
            continue;
        }

        projectile.pos += projectile.vel * dt;
        if out_of_bounds(projectile.pos, projectile.radius()) {
            state.player_projectiles.release(i);
            continue;
        }

        let impact = projectile_snapshot(projectile);
        if detonate(state, impact) {
            if let Some(projectile) = state.player_projectiles.get_mut(i) {
                projectile.spent = true;
            }
        }
    }

    for i in 0..state.enemy_projectiles.capacity() {
        let Some(shot) = state.enemy_projectiles.get_mut(i) else {
            continue;
        };

        if shot.kind.def().destroyable.is_some() {
            let (shot_pos, shot_radius) = (shot.pos, shot.radius());
            let mut damage_taken = 0;

            for j in 0..state.player_projectiles.capacity() {
                let Some(pellet) = state.player_projectiles.get(j) else {
                    continue;
                };
                if pellet.kind != PlayerProjectileKind::Burst || pellet.is_waiting() || pellet.spent
                {
                    continue;
                }
                if !circle_circle(shot_pos, shot_radius, pellet.pos, pellet.radius()) {
                    continue;
                }

                damage_taken += pellet.damage;
                let explosion = pellet.kind.def().explosion.at(pellet.pos);
                state.explosions.acquire(explosion);
                state.player_projectiles.release(j);
            }

            let Some(shot) = state.enemy_projectiles.get_mut(i) else {
                continue;
            };
            shot.health -= damage_taken;
            if shot.health <= 0 {
                state.enemy_projectiles.release(i);
                continue;
            }
        }

        let Some(shot) = state.enemy_projectiles.get_mut(i) else {
            continue;
        };
        shot.pos += shot.vel * dt;
        if out_of_bounds(shot.pos, shot.radius()) {
            state.enemy_projectiles.release(i);
            continue;
        }

        if circle_circle(
            shot.pos,
            shot.radius(),
            state.player.center,
            state.player.hitbox_radius,
        ) {
            let damage = shot.kind.def().damage;
            state.player.health -= damage;
            state.enemy_projectiles.release(i);
            state.events.push(GameEvent::PlayerHit { damage });
        }
    }
}

/// The parts of a player projectile needed to resolve a hit
#[derive(Debug, Clone, Copy)]
struct Impact {
    kind: PlayerProjectileKind,
    pos: Vec2,
    damage: i32,
}

fn projectile_snapshot(projectile: &PlayerProjectile) -> Impact {
    Impact {
        kind: projectile.kind,
        pos: projectile.pos,
        damage: projectile.damage,
    }
}

/// Test a projectile against every enemy and apply damage on the first hit.
/// Returns true if it struck something.
fn detonate(state: &mut GameState, impact: Impact) -> bool {
    let def = impact.kind.def();

    let struck = state.enemies.iter().find_map(|(index, enemy)| {
        let size = enemy.size();
        let targetable = !enemy.is_dead() && enemy.pos.y > -size.y;
        (targetable && circle_rect(impact.pos, def.radius, Rect::new(enemy.pos, size)))
            .then_some(index)
    });
    let Some(struck) = struck else {
        return false;
    };

    state.explosions.acquire(def.explosion.at(impact.pos));

    if def.explosive {
        let blast = def.explosion.size;
        for (_, enemy) in state.enemies.iter_mut() {
            if circle_rect(impact.pos, blast, Rect::new(enemy.pos, enemy.size())) {
                let distance = enemy.center().distance(impact.pos);
                enemy.take_damage(splash_damage(impact.damage, distance, blast));
            }
        }
    } else if let Some(enemy) = state.enemies.get_mut(struck) {
        enemy.take_damage(impact.damage);
    }

    true
}

fn update_director(state: &mut GameState, dt: f32) {
    let def = state.levels.get(state.director.level);
    let event = state
        .director
        .update(dt, def, &mut state.enemies, &mut state.rng);

    match event {
        DirectorEvent::Idle => {}
        DirectorEvent::Wave { spawned } => {
            state.events.push(GameEvent::WaveSpawned { count: spawned });
        }
        DirectorEvent::LevelCleared => {
            state.player_projectiles.clear();
            state.enemy_projectiles.clear();
            state.events.push(GameEvent::LevelCleared {
                level: state.director.level,
            });
            state.go_to(Screen::Upgrade, LEVEL_TRANSITION_DURATION);
        }
    }
}

//! Spawn director: the per-level wave economy
//!
//! The director banks spawn credits over time and spends them on waves of
//! enemies picked by weighted chance. A second counter tracks total credits
//! earned; once it reaches the level's target the director fires one last
//! wave, locks spending (`spawn_credits < 0`) and waits for the field to
//! clear.
//!
//! Pick weights persist across waves within a level. Every pick multiplies
//! the chosen kind's weight by the level's decay factor and renormalizes the
//! whole vector, so long runs of the same kind become less likely.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, rect_overlap};
use super::entities::{ENEMY_KIND_COUNT, Enemy, EnemyKind};
use super::pool::Pool;
use super::rng::SimRng;
use crate::consts::*;
use crate::levels::{LevelDef, LevelTable};

/// What happened during one director update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    /// Still accruing, or waiting for the field to clear
    Idle,
    /// A wave was triggered (possibly spawning nothing)
    Wave { spawned: usize },
    /// Target reached, spending locked, no enemies left
    LevelCleared,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnDirector {
    /// Level being played (index into the level table)
    pub level: usize,
    /// Highest level the player may select
    pub unlocked: usize,
    /// Last level index in the campaign
    pub max_level: usize,
    /// Spendable budget; negative once the level stops spawning
    pub spawn_credits: f32,
    /// Credits earned this level, compared against the clear target
    pub total_credits: f32,
    /// Current pick weights, in `EnemyKind::ALL` order
    pub chances: [f32; ENEMY_KIND_COUNT],
    /// Countdown to the next wave (seconds)
    pub next_wave_in: f32,
    /// Top of the band new enemies are placed in (negative = above screen)
    pub spawn_y: f32,
}

impl SpawnDirector {
    pub fn new(max_level: usize) -> Self {
        Self {
            level: 0,
            unlocked: 0,
            max_level,
            spawn_credits: 0.0,
            total_credits: 0.0,
            chances: [0.0; ENEMY_KIND_COUNT],
            next_wave_in: 0.0,
            spawn_y: SPAWN_Y_MIN,
        }
    }

    /// Reset the economy for a level. Returns the level actually started
    /// (requests past the last level are clamped).
    pub fn start_level(&mut self, level: usize, table: &LevelTable) -> usize {
        let level = level.min(self.max_level);
        let def = table.get(level);

        self.level = level;
        self.chances = def.spawn_chances;
        self.spawn_y = SPAWN_Y_MIN;
        self.next_wave_in = 0.0;
        self.spawn_credits = def.wave_interval_min * def.build_rate;
        self.total_credits = 0.0;

        log::info!(
            "Level {} started ({} credits, target {})",
            level + 1,
            self.spawn_credits,
            def.credit_target
        );
        level
    }

    /// Fraction of the clear target earned so far
    pub fn progress(&self, def: &LevelDef) -> f32 {
        if def.credit_target <= 0.0 {
            return 1.0;
        }
        (self.total_credits / def.credit_target).clamp(0.0, 1.0)
    }

    /// Whether the level has stopped spawning and is waiting to clear
    pub fn is_winding_down(&self, def: &LevelDef) -> bool {
        self.total_credits >= def.credit_target && self.spawn_credits < 0.0
    }

    /// Kinds whose cost fits the spendable budget, paired with their weight
    pub fn affordable(&self, weights: &[f32; ENEMY_KIND_COUNT]) -> Vec<(EnemyKind, f32)> {
        EnemyKind::ALL
            .iter()
            .filter(|kind| kind.cost() <= self.spawn_credits)
            .map(|&kind| (kind, weights[kind.index()]))
            .collect()
    }

    /// Advance the economy by `dt` and spawn a wave when one is due
    pub fn update(
        &mut self,
        dt: f32,
        def: &LevelDef,
        enemies: &mut Pool<Enemy>,
        rng: &mut SimRng,
    ) -> DirectorEvent {
        if self.total_credits >= def.credit_target {
            if self.is_winding_down(def) {
                if enemies.is_empty() {
                    self.unlock_next();
                    log::info!("Level {} cleared", self.level + 1);
                    return DirectorEvent::LevelCleared;
                }
                return DirectorEvent::Idle;
            }

            // Target reached: spend what is left right away, then lock spending
            self.schedule_next_wave(def, rng);
            let spawned = self.spawn_wave(def, enemies, rng);
            self.spawn_credits = -1.0;
            return DirectorEvent::Wave { spawned };
        }

        self.spawn_y = (self.spawn_y + ENEMY_SPEED * dt).min(SPAWN_Y_MIN);
        self.next_wave_in -= dt;
        self.spawn_credits += def.build_rate * dt;
        self.total_credits += def.build_rate * dt;

        if self.next_wave_in > 0.0 {
            return DirectorEvent::Idle;
        }

        self.schedule_next_wave(def, rng);
        let spawned = self.spawn_wave(def, enemies, rng);
        DirectorEvent::Wave { spawned }
    }

    fn schedule_next_wave(&mut self, def: &LevelDef, rng: &mut SimRng) {
        self.next_wave_in += rng.range_float(def.wave_interval_min, def.wave_interval_max);
    }

    /// Spend spawn credits on enemies until nothing is affordable.
    /// Returns the number of enemies placed.
    pub fn spawn_wave(&mut self, def: &LevelDef, enemies: &mut Pool<Enemy>, rng: &mut SimRng) -> usize {
        let band = ENEMY_SPEED * self.next_wave_in;
        let mut spawned = 0;

        // First pick of a wave uses the level's base weights
        let mut candidates = self.affordable(&def.spawn_chances);
        while !candidates.is_empty() {
            let Some(kind) = pick(&candidates, rng.float()) else {
                break;
            };

            self.decay(kind, def);

            if !enemies.has_free_slot() {
                log::debug!("Enemy pool full, wave cut short after {spawned}");
                return spawned;
            }

            let pos = self.place(kind, band, enemies, rng);
            enemies.acquire(Enemy::new(kind, pos));
            self.spawn_credits -= kind.cost();
            spawned += 1;

            candidates = self.affordable(&self.chances);
        }

        self.spawn_y -= band;
        log::debug!(
            "Wave spawned {spawned} enemies, {:.1} credits left",
            self.spawn_credits
        );
        spawned
    }

    /// Lower a kind's weight after it was picked and renormalize
    fn decay(&mut self, kind: EnemyKind, def: &LevelDef) {
        self.chances[kind.index()] *= def.chance_decay[kind.index()];

        let total: f32 = self.chances.iter().sum();
        if total > 0.0 && total.is_finite() {
            self.chances.iter_mut().for_each(|c| *c /= total);
        }
    }

    /// Random position in the spawn band, re-rolled a few times to avoid
    /// overlapping enemies already on the field
    fn place(&self, kind: EnemyKind, band: f32, enemies: &Pool<Enemy>, rng: &mut SimRng) -> Vec2 {
        let size = kind.def().size;
        let roll = |rng: &mut SimRng| {
            let x = rng.range_int(0, (WINDOW_WIDTH - size.x) as i32) as f32;
            let y = -rng.range_int(-self.spawn_y as i32, (-self.spawn_y + band) as i32) as f32;
            Vec2::new(x, y)
        };

        let mut pos = roll(rng);
        for _ in 0..SPAWN_PLACEMENT_ATTEMPTS {
            let candidate = Rect::new(pos, size);
            let blocked = enemies
                .iter()
                .any(|(_, other)| rect_overlap(Rect::new(other.pos, other.size()), candidate));
            if !blocked {
                break;
            }
            pos = roll(rng);
        }
        pos
    }

    /// Remove every enemy without bounty
    pub fn kill_all(&self, enemies: &mut Pool<Enemy>) {
        enemies.clear();
    }

    /// Force the level into its clear check: no enemies, spending locked,
    /// target reached
    pub fn end_level(&mut self, def: &LevelDef, enemies: &mut Pool<Enemy>) {
        self.kill_all(enemies);
        self.spawn_credits = -1.0;
        self.total_credits = self.total_credits.max(def.credit_target);
    }

    pub fn unlock_next(&mut self) {
        self.unlocked = (self.unlocked + 1).min(self.max_level);
    }

    pub fn unlock_all(&mut self) {
        self.unlocked = self.max_level;
    }

    pub fn reset_unlocks(&mut self) {
        self.unlocked = 0;
    }
}

/// Weighted pick over `candidates` with a uniform `sample` in [0, 1).
///
/// Weights are renormalized over the candidates first. The first candidate
/// whose cumulative interval contains the sample wins, so boundary ties go to
/// the earlier kind. Returns `None` when no candidate has positive weight.
pub fn pick(candidates: &[(EnemyKind, f32)], sample: f32) -> Option<EnemyKind> {
    let total: f32 = candidates.iter().map(|(_, w)| w).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mut running = 0.0;
    let mut last_positive = None;
    for &(kind, weight) in candidates {
        let chance = weight / total;
        if chance <= 0.0 {
            continue;
        }
        if sample >= running && sample <= running + chance {
            return Some(kind);
        }
        running += chance;
        last_positive = Some(kind);
    }

    // Rounding left the sample just past the final interval
    last_positive
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup(level: usize) -> (SpawnDirector, LevelTable, Pool<Enemy>, SimRng) {
        let table = LevelTable::default();
        let mut director = SpawnDirector::new(table.max_index());
        director.start_level(level, &table);
        (director, table, Pool::new(ENEMY_CAPACITY), SimRng::new(2024))
    }

    #[test]
    fn test_start_level_resets_economy() {
        let (director, table, _, _) = setup(0);
        assert_eq!(director.level, 0);
        assert_eq!(director.spawn_credits, 30.0);
        assert_eq!(director.total_credits, 0.0);
        assert_eq!(director.chances, table.get(0).spawn_chances);
        assert_eq!(director.spawn_y, SPAWN_Y_MIN);
        assert_eq!(director.next_wave_in, 0.0);
    }

    #[test]
    fn test_start_level_clamps_index() {
        let table = LevelTable::default();
        let mut director = SpawnDirector::new(table.max_index());
        assert_eq!(director.start_level(99, &table), 29);
    }

    #[test]
    fn test_unaffordable_wave_spawns_nothing() {
        let (mut director, table, mut enemies, mut rng) = setup(29);
        director.spawn_credits = 5.0;
        let chances = director.chances;

        assert!(director.affordable(&director.chances).is_empty());
        let spawned = director.spawn_wave(table.get(29), &mut enemies, &mut rng);

        assert_eq!(spawned, 0);
        assert!(enemies.is_empty());
        assert_eq!(director.spawn_credits, 5.0);
        assert_eq!(director.chances, chances);
    }

    #[test]
    fn test_only_affordable_kinds_spawn() {
        let (mut director, table, mut enemies, mut rng) = setup(29);
        director.spawn_credits = 15.0;
        let spawned = director.spawn_wave(table.get(29), &mut enemies, &mut rng);
        assert_eq!(spawned, 1);
        let (_, enemy) = enemies.iter().next().unwrap();
        assert_eq!(enemy.kind, EnemyKind::Light);
        assert_eq!(director.spawn_credits, 5.0);
    }

    #[test]
    fn test_wave_spends_until_broke() {
        let (mut director, table, mut enemies, mut rng) = setup(0);
        director.next_wave_in = 10.0;
        let spawned = director.spawn_wave(table.get(0), &mut enemies, &mut rng);
        // 30 credits of 10-credit enemies
        assert_eq!(spawned, 3);
        assert_eq!(director.spawn_credits, 0.0);
        // Front moved up by one band
        assert_eq!(director.spawn_y, SPAWN_Y_MIN - ENEMY_SPEED * 10.0);

        for (_, enemy) in enemies.iter() {
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x + enemy.size().x <= WINDOW_WIDTH);
            assert!(enemy.pos.y <= 100.0 && enemy.pos.y > -350.0);
        }
    }

    #[test]
    fn test_full_pool_aborts_wave() {
        let (mut director, table, _, mut rng) = setup(0);
        let mut enemies = Pool::new(2);
        director.spawn_credits = 100.0;
        let spawn_y = director.spawn_y;
        let spawned = director.spawn_wave(table.get(0), &mut enemies, &mut rng);
        assert_eq!(spawned, 2);
        assert_eq!(enemies.live_count(), 2);
        assert_eq!(director.spawn_credits, 80.0);
        // Aborted waves leave the front where it was
        assert_eq!(director.spawn_y, spawn_y);
    }

    #[test]
    fn test_pick_first_interval_wins_ties() {
        let c = [(EnemyKind::Light, 0.5), (EnemyKind::Medium, 0.5)];
        assert_eq!(pick(&c, 0.0), Some(EnemyKind::Light));
        assert_eq!(pick(&c, 0.5), Some(EnemyKind::Light));
        assert_eq!(pick(&c, 0.51), Some(EnemyKind::Medium));
        assert_eq!(pick(&c, 0.999), Some(EnemyKind::Medium));
    }

    #[test]
    fn test_pick_renormalizes_subset() {
        // Weights 0.2 and 0.2 behave like 0.5 / 0.5
        let c = [(EnemyKind::Medium, 0.2), (EnemyKind::Shooter, 0.2)];
        assert_eq!(pick(&c, 0.45), Some(EnemyKind::Medium));
        assert_eq!(pick(&c, 0.55), Some(EnemyKind::Shooter));
    }

    #[test]
    fn test_pick_zero_total_is_no_spawn() {
        let c = [(EnemyKind::Light, 0.0), (EnemyKind::Medium, 0.0)];
        assert_eq!(pick(&c, 0.3), None);
        assert_eq!(pick(&[], 0.3), None);
    }

    #[test]
    fn test_pick_skips_zero_weight() {
        let c = [(EnemyKind::Light, 0.0), (EnemyKind::Medium, 1.0)];
        assert_eq!(pick(&c, 0.0), Some(EnemyKind::Medium));
    }

    #[test]
    fn test_decay_renormalizes_full_vector() {
        let (mut director, table, _, _) = setup(1);
        director.decay(EnemyKind::Light, table.get(1));
        assert!((director.chances[0] - 0.5).abs() < 1e-5);
        assert!((director.chances[1] - 0.5).abs() < 1e-5);
        let total: f32 = director.chances.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_decay_to_zero_stops_wave() {
        let (mut director, _, mut enemies, mut rng) = setup(0);
        let mut def = LevelTable::default().get(0).clone();
        def.chance_decay = [0.0; ENEMY_KIND_COUNT];
        director.spawn_credits = 100.0;
        // First pick uses base weights, then every weight is zero
        let spawned = director.spawn_wave(&def, &mut enemies, &mut rng);
        assert_eq!(spawned, 1);
        assert_eq!(director.spawn_credits, 90.0);
    }

    #[test]
    fn test_first_update_spawns_opening_wave() {
        let (mut director, table, mut enemies, mut rng) = setup(0);
        let event = director.update(1.0 / 60.0, table.get(0), &mut enemies, &mut rng);
        assert_eq!(event, DirectorEvent::Wave { spawned: 3 });
        assert!(director.next_wave_in > 9.9);
    }

    #[test]
    fn test_target_forces_final_wave_then_locks() {
        let (mut director, table, mut enemies, mut rng) = setup(0);
        let def = table.get(0);
        director.total_credits = def.credit_target;
        director.spawn_credits = 25.0;

        let event = director.update(0.1, def, &mut enemies, &mut rng);
        assert_eq!(event, DirectorEvent::Wave { spawned: 2 });
        assert_eq!(director.spawn_credits, -1.0);
        assert!(director.is_winding_down(def));

        // Enemies still alive: keep waiting
        assert_eq!(director.update(0.1, def, &mut enemies, &mut rng), DirectorEvent::Idle);

        enemies.clear();
        let unlocked = director.unlocked;
        assert_eq!(
            director.update(0.1, def, &mut enemies, &mut rng),
            DirectorEvent::LevelCleared
        );
        assert_eq!(director.unlocked, unlocked + 1);
    }

    #[test]
    fn test_clear_requires_all_three_conditions() {
        let (mut director, table, mut enemies, mut rng) = setup(0);
        let def = table.get(0);

        // Below target, spending locked, empty field: not cleared
        director.spawn_credits = -1.0;
        director.total_credits = def.credit_target - 1.0;
        director.next_wave_in = 100.0;
        assert_ne!(director.update(0.01, def, &mut enemies, &mut rng), DirectorEvent::LevelCleared);

        // Target reached, spending locked, one enemy alive: not cleared
        director.total_credits = def.credit_target;
        director.spawn_credits = -1.0;
        enemies.acquire(Enemy::new(EnemyKind::Light, Vec2::ZERO));
        assert_eq!(director.update(0.01, def, &mut enemies, &mut rng), DirectorEvent::Idle);
    }

    #[test]
    fn test_end_level_forces_clear() {
        let (mut director, table, mut enemies, mut rng) = setup(3);
        let def = table.get(3);
        director.update(0.1, def, &mut enemies, &mut rng);
        assert!(!enemies.is_empty());

        director.end_level(def, &mut enemies);
        assert!(enemies.is_empty());
        assert_eq!(
            director.update(0.1, def, &mut enemies, &mut rng),
            DirectorEvent::LevelCleared
        );
    }

    #[test]
    fn test_unlock_counter_caps() {
        let mut director = SpawnDirector::new(29);
        director.unlock_all();
        director.unlock_next();
        assert_eq!(director.unlocked, 29);
        director.reset_unlocks();
        assert_eq!(director.unlocked, 0);
    }

    #[test]
    fn test_spawn_front_returns_to_rest() {
        let (mut director, table, mut enemies, mut rng) = setup(0);
        director.update(0.01, table.get(0), &mut enemies, &mut rng);
        assert!(director.spawn_y < SPAWN_Y_MIN);
        for _ in 0..200 {
            director.next_wave_in = 100.0;
            director.update(0.1, table.get(0), &mut enemies, &mut rng);
        }
        assert_eq!(director.spawn_y, SPAWN_Y_MIN);
    }

    proptest! {
        #[test]
        fn prop_total_credits_non_decreasing(
            seed in any::<u64>(),
            level in 0usize..30,
            steps in prop::collection::vec(0.0f32..0.5, 1..400),
        ) {
            let table = LevelTable::default();
            let mut director = SpawnDirector::new(table.max_index());
            director.start_level(level, &table);
            let mut enemies = Pool::new(ENEMY_CAPACITY);
            let mut rng = SimRng::new(seed);

            let mut last = director.total_credits;
            for dt in steps {
                let event = director.update(dt, table.get(level), &mut enemies, &mut rng);
                if event == DirectorEvent::LevelCleared {
                    break;
                }
                prop_assert!(director.total_credits >= last);
                prop_assert!(enemies.live_count() <= ENEMY_CAPACITY);
                last = director.total_credits;
            }
        }

        #[test]
        fn prop_pick_always_returns_candidate(
            weights in prop::array::uniform4(0.0f32..1.0),
            sample in 0.0f32..1.0,
        ) {
            let candidates: Vec<_> = EnemyKind::ALL.iter().copied().zip(weights).collect();
            let total: f32 = weights.iter().sum();
            match pick(&candidates, sample) {
                Some(kind) => prop_assert!(weights[kind.index()] > 0.0),
                None => prop_assert!(total <= 0.0),
            }
        }
    }
}

//! Player weapons: ammo regeneration, firing and upgrades
//!
//! Each weapon is a small state machine over `(ammo, reload_elapsed)`. Ammo
//! regenerates one round per `reload_time` while below `ammo_max`; a key press
//! spends one round and launches a volley of staggered pellets.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::economy::Wallet;
use super::entities::{PlayerProjectile, PlayerProjectileKind};
use super::pool::Pool;
use super::rng::SimRng;
use crate::consts::*;
use crate::rotate_degrees;

pub const WEAPON_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Burst,
    Cannon,
    Autocannon,
    Torpedo,
}

/// Stats that scale with upgrade level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub ammo_max: i32,
    /// Delay between pellets of one volley (seconds)
    pub pellet_interval: f32,
    pub pellet_count: i32,
    pub speed: f32,
    pub reload_time: f32,
    pub damage: i32,
    /// Full spread cone (degrees)
    pub spread: i32,
}

/// Per-level growth factor for each stat: `base * (1 + factor * level)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatGrowth {
    pub ammo_max: f32,
    pub pellet_interval: f32,
    pub pellet_count: f32,
    pub speed: f32,
    pub reload_time: f32,
    pub damage: f32,
    pub spread: f32,
}

pub const STAT_GROWTH: StatGrowth = StatGrowth {
    ammo_max: 0.1,
    pellet_interval: 0.0,
    pellet_count: 0.05,
    speed: 0.0,
    reload_time: -0.05,
    damage: 0.12,
    spread: -0.03,
};

impl WeaponKind {
    pub const ALL: [WeaponKind; WEAPON_COUNT] = [
        WeaponKind::Burst,
        WeaponKind::Cannon,
        WeaponKind::Autocannon,
        WeaponKind::Torpedo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Burst => "Burst",
            WeaponKind::Cannon => "Cannon",
            WeaponKind::Autocannon => "Autocannon",
            WeaponKind::Torpedo => "Torpedo",
        }
    }

    pub fn projectile(self) -> PlayerProjectileKind {
        match self {
            WeaponKind::Burst => PlayerProjectileKind::Burst,
            WeaponKind::Cannon => PlayerProjectileKind::Cannon,
            WeaponKind::Autocannon => PlayerProjectileKind::Autocannon,
            WeaponKind::Torpedo => PlayerProjectileKind::Torpedo,
        }
    }

    pub fn base_stats(self) -> WeaponStats {
        match self {
            WeaponKind::Burst => WeaponStats {
                ammo_max: 4,
                pellet_interval: 0.05,
                pellet_count: 6,
                speed: 200.0,
                reload_time: 2.0,
                damage: 3,
                spread: 15,
            },
            WeaponKind::Cannon => WeaponStats {
                ammo_max: 2,
                pellet_interval: 0.0,
                pellet_count: 1,
                speed: 320.0,
                reload_time: 3.5,
                damage: 30,
                spread: 0,
            },
            WeaponKind::Autocannon => WeaponStats {
                ammo_max: 2,
                pellet_interval: 0.04,
                pellet_count: 3,
                speed: 260.0,
                reload_time: 3.0,
                damage: 8,
                spread: 3,
            },
            WeaponKind::Torpedo => WeaponStats {
                ammo_max: 1,
                pellet_interval: 0.0,
                pellet_count: 1,
                speed: 120.0,
                reload_time: 6.0,
                damage: 60,
                spread: 0,
            },
        }
    }

    /// Price of the first purchase (unlock, or first upgrade for Burst)
    pub fn base_cost(self) -> i32 {
        match self {
            WeaponKind::Burst => 30,
            WeaponKind::Cannon => 50,
            WeaponKind::Autocannon => 75,
            WeaponKind::Torpedo => 125,
        }
    }

    /// Stats at an upgrade level. Integer stats truncate toward zero.
    pub fn stats_at(self, level: u32) -> WeaponStats {
        let base = self.base_stats();
        let g = STAT_GROWTH;
        let lvl = level as f32;
        let scale_f = |value: f32, factor: f32| value * (1.0 + factor * lvl);
        let scale_i = |value: i32, factor: f32| scale_f(value as f32, factor) as i32;

        WeaponStats {
            ammo_max: scale_i(base.ammo_max, g.ammo_max),
            pellet_interval: scale_f(base.pellet_interval, g.pellet_interval),
            pellet_count: scale_i(base.pellet_count, g.pellet_count),
            speed: scale_f(base.speed, g.speed),
            reload_time: scale_f(base.reload_time, g.reload_time),
            damage: scale_i(base.damage, g.damage),
            spread: scale_i(base.spread, g.spread),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub ammo: i32,
    pub ammo_max: i32,
    /// Time banked toward the next round
    pub reload_elapsed: f32,
    pub reload_time: f32,
    pub pellet_interval: f32,
    pub pellet_count: i32,
    pub speed: f32,
    pub spread: i32,
    pub damage: i32,
    /// Key that fires this weapon
    pub key: char,
    pub unlocked: bool,
    pub level: u32,
    pub upgrade_cost: i32,
    /// Seconds since ammo was last regenerated
    pub alert_timer: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind, key: char) -> Self {
        let stats = kind.base_stats();
        Self {
            kind,
            ammo: 0,
            ammo_max: stats.ammo_max,
            reload_elapsed: 0.0,
            reload_time: stats.reload_time,
            pellet_interval: stats.pellet_interval,
            pellet_count: stats.pellet_count,
            speed: stats.speed,
            spread: stats.spread,
            damage: stats.damage,
            key,
            unlocked: kind == WeaponKind::Burst,
            level: 0,
            upgrade_cost: kind.base_cost(),
            alert_timer: 999.0,
        }
    }

    /// Refresh derived stats from the current level
    pub fn recompute_stats(&mut self) {
        let stats = self.kind.stats_at(self.level);
        self.ammo_max = stats.ammo_max;
        self.reload_time = stats.reload_time;
        self.pellet_interval = stats.pellet_interval;
        self.pellet_count = stats.pellet_count;
        self.speed = stats.speed;
        self.spread = stats.spread;
        self.damage = stats.damage;
        self.ammo = self.ammo.min(self.ammo_max);
    }

    /// Level start: fresh stats, empty magazine
    pub fn reset_for_level(&mut self) {
        self.recompute_stats();
        self.ammo = 0;
        self.reload_elapsed = 0.0;
        self.alert_timer = 999.0;
    }

    /// Advance reload. Returns true when at least one round was regained.
    pub fn update(&mut self, dt: f32) -> bool {
        self.alert_timer += dt;

        if self.ammo >= self.ammo_max {
            return false;
        }

        self.reload_elapsed += dt;
        let mut regained = false;
        while self.ammo < self.ammo_max && self.reload_elapsed >= self.reload_time {
            self.reload_elapsed -= self.reload_time;
            self.ammo += 1;
            regained = true;
        }
        if regained {
            self.alert_timer = 0.0;
        }
        regained
    }

    /// Spend one round if available
    pub fn try_fire(&mut self) -> bool {
        if self.ammo <= 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    /// Build pellet `index` of a volley fired from `origin` toward `target`
    pub fn pellet(&self, index: i32, origin: Vec2, target: Vec2, rng: &mut SimRng) -> PlayerProjectile {
        let mut vel = (target - origin).normalize_or_zero() * self.speed;

        if self.spread > 0 {
            let offset = (rng.range_int(0, self.spread) - self.spread / 2) as f32;
            vel = rotate_degrees(vel, offset * rng.float());
        }

        PlayerProjectile {
            kind: self.kind.projectile(),
            pos: origin,
            vel,
            damage: self.damage,
            wait: self.pellet_interval * index as f32,
            spent: false,
        }
    }

    /// Reload progress toward the next round in [0, 1]
    pub fn reload_fraction(&self) -> f32 {
        if self.ammo >= self.ammo_max || self.reload_time <= 0.0 {
            return 1.0;
        }
        (self.reload_elapsed / self.reload_time).clamp(0.0, 1.0)
    }

    /// Blink state of the "ammo regained" indicator: lit in the first and
    /// last third of the alert window
    pub fn ready_alert_lit(&self) -> bool {
        let third = READY_ALERT_DURATION / 3.0;
        self.alert_timer < READY_ALERT_DURATION
            && (self.alert_timer < third || self.alert_timer > 2.0 * third)
    }

    pub fn can_purchase(&self, balance: i32) -> bool {
        balance >= self.upgrade_cost && self.level < WEAPON_MAX_LEVEL
    }
}

/// Result of a shop purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Unlocked,
    Upgraded { level: u32 },
}

/// The player's full set of weapons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armory {
    pub weapons: Vec<Weapon>,
}

impl Armory {
    pub fn new(keys: [char; WEAPON_COUNT]) -> Self {
        Self {
            weapons: WeaponKind::ALL
                .iter()
                .zip(keys)
                .map(|(&kind, key)| Weapon::new(kind, key))
                .collect(),
        }
    }

    pub fn reset_for_level(&mut self) {
        self.weapons.iter_mut().for_each(Weapon::reset_for_level);
    }

    /// Reload every unlocked weapon. Returns the indices that regained ammo.
    pub fn update(&mut self, dt: f32) -> Vec<usize> {
        self.weapons
            .iter_mut()
            .enumerate()
            .filter(|(_, w)| w.unlocked)
            .filter_map(|(i, w)| w.update(dt).then_some(i))
            .collect()
    }

    /// Fire every unlocked weapon whose key was pressed this tick.
    /// Returns the number of pellets placed in the pool.
    pub fn fire_pressed(
        &mut self,
        keys_pressed: &[char],
        origin: Vec2,
        target: Vec2,
        rng: &mut SimRng,
        projectiles: &mut Pool<PlayerProjectile>,
    ) -> usize {
        let mut spawned = 0;
        for weapon in self.weapons.iter_mut().filter(|w| w.unlocked) {
            if !keys_pressed.contains(&weapon.key) || !weapon.try_fire() {
                continue;
            }
            for index in 0..weapon.pellet_count {
                let pellet = weapon.pellet(index, origin, target, rng);
                if projectiles.acquire(pellet).is_some() {
                    spawned += 1;
                }
            }
        }
        spawned
    }

    /// Buy the next upgrade for a weapon, or unlock it if still locked
    pub fn purchase(&mut self, index: usize, wallet: &mut Wallet) -> Option<Purchase> {
        let weapon = self.weapons.get_mut(index)?;
        if !weapon.can_purchase(wallet.balance) {
            return None;
        }

        wallet.remove(weapon.upgrade_cost);

        if !weapon.unlocked {
            weapon.unlocked = true;
            log::info!("Unlocked {}", weapon.kind.as_str());
            return Some(Purchase::Unlocked);
        }

        weapon.upgrade_cost = (weapon.upgrade_cost as f32 * UPGRADE_COST_SCALING) as i32;
        weapon.level += 1;
        weapon.recompute_stats();
        log::info!(
            "Upgraded {} to level {} (next cost {})",
            weapon.kind.as_str(),
            weapon.level,
            weapon.upgrade_cost
        );
        Some(Purchase::Upgraded {
            level: weapon.level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn armory() -> Armory {
        Armory::new(['1', '2', '3', '4'])
    }

    #[test]
    fn test_only_burst_starts_unlocked() {
        let armory = armory();
        let unlocked: Vec<_> = armory.weapons.iter().map(|w| w.unlocked).collect();
        assert_eq!(unlocked, vec![true, false, false, false]);
    }

    #[test]
    fn test_stats_scale_with_level() {
        let s = WeaponKind::Burst.stats_at(10);
        // 4 * 2.0
        assert_eq!(s.ammo_max, 8);
        // 6 * 1.5
        assert_eq!(s.pellet_count, 9);
        // 3 * 2.2 = 6.6 truncated
        assert_eq!(s.damage, 6);
        // 15 * 0.7 = 10.5 truncated
        assert_eq!(s.spread, 10);
        assert!((s.reload_time - 1.0).abs() < 1e-5);
        assert_eq!(s.speed, 200.0);

        let base = WeaponKind::Cannon.stats_at(0);
        assert_eq!(base, WeaponKind::Cannon.base_stats());
    }

    #[test]
    fn test_regenerates_one_round_per_reload() {
        let mut w = Weapon::new(WeaponKind::Cannon, '2');
        assert_eq!(w.ammo, 0);
        assert!(!w.update(3.0));
        assert!(w.update(0.5));
        assert_eq!(w.ammo, 1);
        assert_eq!(w.alert_timer, 0.0);
        assert!(w.ready_alert_lit());
    }

    #[test]
    fn test_reload_stops_at_max() {
        let mut w = Weapon::new(WeaponKind::Torpedo, '4');
        w.update(100.0);
        assert_eq!(w.ammo, 1);
        let banked = w.reload_elapsed;
        w.update(10.0);
        assert_eq!(w.ammo, 1);
        assert_eq!(w.reload_elapsed, banked);
    }

    #[test]
    fn test_fire_spends_ammo_and_spawns_staggered_pellets() {
        let mut armory = armory();
        let mut rng = SimRng::new(1);
        let mut pool = Pool::new(PLAYER_PROJECTILE_CAPACITY);
        armory.weapons[0].ammo = 1;

        let origin = Vec2::new(300.0, 600.0);
        let n = armory.fire_pressed(&['1'], origin, Vec2::new(300.0, 0.0), &mut rng, &mut pool);
        assert_eq!(n, 6);
        assert_eq!(armory.weapons[0].ammo, 0);

        let waits: Vec<f32> = pool.iter().map(|(_, p)| p.wait).collect();
        for (i, wait) in waits.iter().enumerate() {
            assert!((wait - 0.05 * i as f32).abs() < 1e-6);
        }

        // Empty magazine: nothing happens
        let n = armory.fire_pressed(&['1'], origin, Vec2::ZERO, &mut rng, &mut pool);
        assert_eq!(n, 0);
        assert_eq!(pool.live_count(), 6);
    }

    #[test]
    fn test_locked_weapon_does_not_fire() {
        let mut armory = armory();
        let mut rng = SimRng::new(1);
        let mut pool = Pool::new(8);
        armory.weapons[1].ammo = 2;
        let n = armory.fire_pressed(&['2'], Vec2::ZERO, Vec2::X, &mut rng, &mut pool);
        assert_eq!(n, 0);
        assert_eq!(armory.weapons[1].ammo, 2);
    }

    #[test]
    fn test_no_spread_fires_straight_east() {
        let w = Weapon::new(WeaponKind::Cannon, '2');
        let mut rng = SimRng::new(9);
        let origin = Vec2::new(300.0, 600.0);
        let p = w.pellet(0, origin, Vec2::new(500.0, 600.0), &mut rng);
        assert_eq!(p.vel.y, 0.0);
        assert!((p.vel.x - 320.0).abs() < 1e-3);
        assert_eq!(p.damage, 30);
    }

    #[test]
    fn test_spread_stays_inside_cone() {
        let w = Weapon::new(WeaponKind::Burst, '1');
        let mut rng = SimRng::new(3);
        for _ in 0..500 {
            let p = w.pellet(0, Vec2::ZERO, Vec2::new(100.0, 0.0), &mut rng);
            let angle = p.vel.y.atan2(p.vel.x).to_degrees();
            assert!(angle.abs() <= 7.5 + 1e-3);
            assert!((p.vel.length() - 200.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_spread_draws_integer_offset_then_scale() {
        let w = Weapon::new(WeaponKind::Burst, '1');
        let origin = Vec2::new(300.0, 600.0);
        let target = Vec2::new(300.0, 0.0);
        let base = (target - origin).normalize_or_zero() * w.speed;

        for seed in 0..20 {
            let mut rng = SimRng::new(seed);
            let mut expected_rng = rng.clone();

            let p = w.pellet(0, origin, target, &mut rng);

            let offset = (expected_rng.range_int(0, w.spread) - w.spread / 2) as f32;
            let angle = offset * expected_rng.float();
            assert_eq!(p.vel, rotate_degrees(base, angle));
        }
    }

    #[test]
    fn test_purchase_unlocks_then_upgrades() {
        let mut armory = armory();
        let mut wallet = Wallet::default();
        wallet.balance = 200;

        assert_eq!(armory.purchase(1, &mut wallet), Some(Purchase::Unlocked));
        assert_eq!(wallet.balance, 150);
        assert!(armory.weapons[1].unlocked);
        assert_eq!(armory.weapons[1].level, 0);
        assert_eq!(armory.weapons[1].upgrade_cost, 50);

        assert_eq!(
            armory.purchase(1, &mut wallet),
            Some(Purchase::Upgraded { level: 1 })
        );
        assert_eq!(wallet.balance, 100);
        assert_eq!(armory.weapons[1].upgrade_cost, 55);
        assert_eq!(armory.weapons[1].damage, 33);
    }

    #[test]
    fn test_purchase_requires_funds_and_level_room() {
        let mut armory = armory();
        let mut wallet = Wallet::default();
        wallet.balance = 29;
        assert_eq!(armory.purchase(0, &mut wallet), None);
        assert_eq!(wallet.balance, 29);

        wallet.balance = 1_000_000;
        armory.weapons[0].level = WEAPON_MAX_LEVEL;
        assert_eq!(armory.purchase(0, &mut wallet), None);
        assert_eq!(armory.purchase(99, &mut wallet), None);
    }

    #[test]
    fn test_upgrade_cost_compounds_with_truncation() {
        let mut armory = armory();
        let mut wallet = Wallet::default();
        wallet.balance = 10_000;
        let mut costs = Vec::new();
        while armory.purchase(0, &mut wallet).is_some() {
            costs.push(armory.weapons[0].upgrade_cost);
        }
        assert_eq!(armory.weapons[0].level, WEAPON_MAX_LEVEL);
        assert_eq!(&costs[..4], &[33, 36, 39, 42]);
    }

    proptest! {
        #[test]
        fn prop_ammo_stays_in_bounds(
            level in 0u32..=10,
            steps in prop::collection::vec((0.0f32..2.0, any::<bool>()), 1..300),
        ) {
            let mut w = Weapon::new(WeaponKind::Autocannon, '3');
            w.level = level;
            w.reset_for_level();
            for (dt, fire) in steps {
                w.update(dt);
                if fire {
                    w.try_fire();
                }
                prop_assert!(w.ammo >= 0);
                prop_assert!(w.ammo <= w.ammo_max);
            }
        }
    }
}

//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use seedpath_core::{
    EnemyId, ResearchModifiers, SimulationEffects, SupportMultipliers, TargetingMode,
    TowerBehavior, TowerCooldownSnapshot, TowerId, TowerKind, TowerSnapshot, TowerStats,
};

/// Fastest fire interval upgrades may reach.
const MIN_FIRE_INTERVAL: Duration = Duration::from_millis(100);

/// Share of the total investment refunded on sale.
const REFUND_RATIO: f64 = 0.7;

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Centre of the tower.
    pub(crate) position: Vec2,
    pub(crate) level: u32,
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) fire_interval: Duration,
    pub(crate) cost: u32,
    pub(crate) upgrade_cost: u32,
    pub(crate) upgrade_spend: u32,
    pub(crate) last_shot: Option<Duration>,
    pub(crate) target: Option<EnemyId>,
    pub(crate) targeting_mode: TargetingMode,
    pub(crate) support: SupportMultipliers,
    pub(crate) kills: u32,
    pub(crate) total_damage: f32,
}

impl TowerState {
    /// Builds a level one tower with research multipliers folded in.
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        position: Vec2,
        research: ResearchModifiers,
    ) -> Self {
        let profile = kind.profile();
        let interval_ms = profile.fire_interval.as_millis() as f64;
        Self {
            id,
            kind,
            position,
            level: 1,
            damage: (f64::from(profile.damage) * research.damage).floor() as f32,
            range: (f64::from(profile.range) * research.range).floor() as f32,
            fire_interval: Duration::from_millis((interval_ms * research.fire_rate).floor() as u64),
            cost: profile.cost,
            upgrade_cost: profile.upgrade_cost,
            upgrade_spend: 0,
            last_shot: None,
            target: None,
            targeting_mode: TargetingMode::default(),
            support: SupportMultipliers::NEUTRAL,
            kills: 0,
            total_damage: 0.0,
        }
    }

    /// Range after aura multipliers.
    pub(crate) fn effective_range(&self) -> f32 {
        self.range * self.support.range
    }

    /// Damage per hit after aura multipliers.
    pub(crate) fn effective_damage(&self) -> f32 {
        self.damage * self.support.damage
    }

    /// Reports whether the cooldown has elapsed at `now`.
    ///
    /// A tower that never fired is ready. Support towers never are.
    pub(crate) fn is_ready(&self, now: Duration, effects: &SimulationEffects) -> bool {
        if self.kind.is_support() {
            return false;
        }
        let interval = effects.fire_interval(self.fire_interval);
        self.last_shot
            .map_or(true, |last| now.saturating_sub(last) >= interval)
    }

    pub(crate) fn cooldown(&self) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            kind: self.kind,
            fire_interval: self.fire_interval,
            last_shot: self.last_shot,
        }
    }

    /// Raises the tower one level and records the spend.
    pub(crate) fn upgrade(&mut self) {
        self.upgrade_spend += self.upgrade_cost;
        self.level += 1;
        self.damage = (self.damage * 1.5).floor();
        self.range = (self.range * 1.2).floor();
        self.fire_interval = self.fire_interval.mul_f64(0.9).max(MIN_FIRE_INTERVAL);
        self.upgrade_cost = (f64::from(self.upgrade_cost) * 1.5).floor() as u32;
    }

    /// Refund granted if the tower were sold now.
    pub(crate) fn sell_value(&self) -> u32 {
        (f64::from(self.cost + self.upgrade_spend) * REFUND_RATIO).floor() as u32
    }

    /// Damage per second including aura multipliers.
    pub(crate) fn dps(&self) -> f32 {
        let interval_ms = self.fire_interval.as_secs_f32() * 1_000.0;
        if self.kind.is_support() || interval_ms <= 0.0 {
            return 0.0;
        }
        self.effective_damage() * 1_000.0 / interval_ms
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            level: self.level,
            base_range: self.range,
            effective_range: self.effective_range(),
            targeting_mode: self.targeting_mode,
            target: self.target,
            support: self.support,
        }
    }

    pub(crate) fn stats(&self) -> TowerStats {
        TowerStats {
            name: self.kind.name(),
            level: self.level,
            damage: self.damage,
            range: self.effective_range(),
            fire_rate: self.fire_interval,
            dps: self.dps(),
            kills: self.kills,
            total_damage: self.total_damage,
            upgrade_cost: self.upgrade_cost,
            sell_value: self.sell_value(),
            targeting_mode: self.targeting_mode,
        }
    }

    /// Behaviour used when one of this tower's projectiles connects.
    pub(crate) fn behavior(&self) -> TowerBehavior {
        self.kind.profile().behavior
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        research: ResearchModifiers,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, kind, position, research));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    /// Reports whether any tower sits closer than `spacing` to `position`.
    pub(crate) fn crowds(&self, position: Vec2, spacing: f32) -> bool {
        self.entries
            .values()
            .any(|tower| tower.position.distance(position) < spacing)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }
}

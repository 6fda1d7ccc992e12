//! Enemy state machine and the generational arena that owns live enemies.

use std::time::Duration;

use glam::Vec2;
use seedpath_core::{EnemyId, EnemyKind, EnemySnapshot, TowerId};
use seedpath_system_path_generation::Path;

/// Size of split children relative to their parent.
const SPLIT_CHILD_SCALE: f32 = 0.7;

/// Timed slow applied by debuff towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Slow {
    pub(crate) factor: f32,
    pub(crate) until: Duration,
}

/// Result of a single damage application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DamageOutcome {
    /// Damage absorbed by the shield.
    pub(crate) absorbed: f32,
    /// Whether this call moved the enemy from alive to dead.
    pub(crate) killed: bool,
}

/// Authoritative state of one enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) progress: f32,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) shield: f32,
    pub(crate) base_speed: f32,
    pub(crate) reward: u32,
    pub(crate) size: f32,
    pub(crate) angle: f32,
    pub(crate) slow: Option<Slow>,
    regen_ticks: u32,
    dead: bool,
    reached_end: bool,
    pub(crate) killed_by: Option<TowerId>,
}

impl Enemy {
    /// Creates an enemy at the start of the path with scaled health.
    pub(crate) fn spawn(kind: EnemyKind, health_multiplier: f64, path: &Path) -> Self {
        let profile = kind.profile();
        let max_health = (f64::from(profile.max_health) * health_multiplier) as f32;
        Self {
            kind,
            position: path.position_at(0.0),
            progress: 0.0,
            health: max_health,
            max_health,
            shield: profile.shield.unwrap_or(0.0),
            base_speed: profile.speed,
            reward: profile.reward,
            size: profile.size,
            angle: 0.0,
            slow: None,
            regen_ticks: 0,
            dead: false,
            reached_end: false,
            killed_by: None,
        }
    }

    /// Builds the children released when this enemy splits.
    pub(crate) fn split_children(&self) -> Vec<Enemy> {
        let Some(rule) = self.kind.profile().split.filter(|rule| rule.count > 0) else {
            return Vec::new();
        };
        let divisor = rule.count as f32;
        let health = (self.max_health / divisor).floor();
        let reward = self.reward / rule.count;
        (0..rule.count)
            .map(|_| {
                let profile = rule.child.profile();
                Self {
                    kind: rule.child,
                    position: self.position,
                    progress: self.progress,
                    health,
                    max_health: health,
                    shield: profile.shield.unwrap_or(0.0),
                    base_speed: profile.speed,
                    reward,
                    size: self.size * SPLIT_CHILD_SCALE,
                    angle: self.angle,
                    slow: None,
                    regen_ticks: 0,
                    dead: false,
                    reached_end: false,
                    killed_by: None,
                }
            })
            .collect()
    }

    pub(crate) const fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) const fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Alive and still on the path.
    pub(crate) const fn is_active(&self) -> bool {
        !self.dead && !self.reached_end
    }

    pub(crate) fn is_flying(&self) -> bool {
        self.kind.profile().flying
    }

    /// Speed after the slow, before global effects.
    pub(crate) fn speed(&self) -> f32 {
        self.slow
            .map_or(self.base_speed, |slow| self.base_speed * slow.factor)
    }

    /// Moves the enemy along the path and runs its regeneration clock.
    pub(crate) fn advance(&mut self, path: &Path, speed_multiplier: f32) {
        if !self.is_active() {
            return;
        }

        self.progress += self.speed() * speed_multiplier;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.reached_end = true;
        }
        self.position = path.position_at(self.progress);
        if let Some(heading) = path.heading_at(self.progress) {
            self.angle = heading;
        }

        if let Some(regeneration) = self.kind.profile().regeneration {
            self.regen_ticks += 1;
            if self.regen_ticks >= regeneration.interval_ticks {
                self.regen_ticks = 0;
                if self.health < self.max_health {
                    self.health = (self.health + regeneration.amount).min(self.max_health);
                }
            }
        }
    }

    /// Re-derives the position after the path changed shape.
    pub(crate) fn reposition(&mut self, path: &Path) {
        self.position = path.position_at(self.progress);
    }

    /// Applies damage, draining the shield before health.
    pub(crate) fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome {
                absorbed: 0.0,
                killed: false,
            };
        }

        let mut remaining = amount.max(0.0);
        let mut absorbed = 0.0;
        if self.shield > 0.0 {
            absorbed = remaining.min(self.shield);
            self.shield -= absorbed;
            remaining -= absorbed;
        }

        self.health = (self.health - remaining).max(0.0);
        let killed = self.health <= 0.0;
        if killed {
            self.dead = true;
        }
        DamageOutcome { absorbed, killed }
    }

    /// Installs or extends a slow; repeated slows never stack.
    pub(crate) fn apply_slow(&mut self, amount: f32, until: Duration) {
        self.slow = Some(Slow {
            factor: 1.0 - amount,
            until,
        });
    }

    /// Clears the slow once `now` is past its deadline.
    pub(crate) fn expire_slow(&mut self, now: Duration) -> bool {
        match self.slow {
            Some(slow) if now > slow.until => {
                self.slow = None;
                true
            }
            _ => false,
        }
    }

    /// Splitting enemies split once they are dead.
    pub(crate) fn should_split(&self) -> bool {
        self.dead && self.kind.capabilities().splits
    }

    pub(crate) fn snapshot(&self, id: EnemyId) -> EnemySnapshot {
        EnemySnapshot {
            id,
            kind: self.kind,
            position: self.position,
            progress: self.progress,
            health: self.health,
            max_health: self.max_health,
            shield: self.shield,
            size: self.size,
            angle: self.angle,
            flying: self.is_flying(),
            slowed: self.slow.is_some(),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Generational storage for enemies that also remembers spawn order.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnemyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<EnemyId>,
}

impl EnemyArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) -> EnemyId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.enemy = Some(enemy);
            EnemyId::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                enemy: Some(enemy),
            });
            EnemyId::new(index, 0)
        };
        self.order.push(id);
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.enemy.as_mut())
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?;
        let enemy = slot.enemy.take()?;
        self.free.push(id.index());
        self.order.retain(|entry| *entry != id);
        Some(enemy)
    }

    /// Identifiers in spawn order.
    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.order.clone()
    }

    /// Enemies in spawn order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|enemy| (*id, enemy)))
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
    }
}

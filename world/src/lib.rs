#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Seedpath.
//!
//! The world owns every mutable piece of the simulation: the generated path,
//! the enemy arena, towers and their projectiles, ability timers, the economy
//! and the wave lifecycle. It changes only through [`apply`] and exposes
//! read-only snapshots through [`query`].

mod abilities;
mod combat;
mod enemies;
mod projectiles;
mod towers;
mod waves;

use std::time::Duration;

use glam::Vec2;
use seedpath_core::{
    AbilityKind, AirstrikeError, Command, Difficulty, DifficultyError, DifficultyMultipliers,
    EnemyId, EnemyKind, Event, PlacementError, ResearchModifiers, SellError, TargetingError,
    TargetingMode, TowerId, TowerKind, TowerTarget, UpgradeError, BASE_STARTING_CURRENCY,
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, STARTING_BASE_HEALTH,
};
use seedpath_system_path_generation::Path;

use crate::{
    abilities::Abilities,
    combat::Hit,
    enemies::{Enemy, EnemyArena},
    projectiles::Projectile,
    towers::TowerRegistry,
    waves::WaveState,
};

/// Towers must keep at least this distance from the path centre line.
const PATH_CLEARANCE: f32 = 50.0;

/// Minimum distance between two tower centres.
const TOWER_SPACING: f32 = 60.0;

/// Base health lost for every enemy that reaches the end of the path.
const LEAK_PENALTY: u32 = 10;

/// Represents the authoritative Seedpath world state.
#[derive(Debug)]
pub struct World {
    path: Path,
    enemies: EnemyArena,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    abilities: Abilities,
    waves: WaveState,
    difficulty: Difficulty,
    dynamic_difficulty: bool,
    research: ResearchModifiers,
    currency: u32,
    base_health: u32,
    kills: u32,
    now: Duration,
    game_over: bool,
}

impl World {
    /// Creates a world on the default canvas with a path generated from `seed`.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let mut world = Self {
            path: Path::new(seed, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            enemies: EnemyArena::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            abilities: Abilities::new(),
            waves: WaveState::new(),
            difficulty: Difficulty::default(),
            dynamic_difficulty: true,
            research: ResearchModifiers::NEUTRAL,
            currency: 0,
            base_health: STARTING_BASE_HEALTH,
            kills: 0,
            now: Duration::ZERO,
            game_over: false,
        };
        world.currency = world.starting_currency();
        world
    }

    /// Difficulty multipliers combined with the dynamic adjustment.
    fn multipliers(&self) -> DifficultyMultipliers {
        let adjustment = if self.dynamic_difficulty {
            self.waves.adjustment()
        } else {
            DifficultyMultipliers::NEUTRAL
        };
        self.difficulty.multipliers().combine(adjustment)
    }

    fn starting_currency(&self) -> u32 {
        (f64::from(BASE_STARTING_CURRENCY) * self.multipliers().currency).floor() as u32
    }

    fn map_generated(&self) -> Event {
        Event::MapGenerated {
            seed: self.path.seed(),
            width: self.path.width(),
            height: self.path.height(),
            waypoints: self.path.waypoints().len(),
        }
    }

    fn reset(&mut self) {
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.abilities = Abilities::new();
        self.waves = WaveState::new();
        self.base_health = STARTING_BASE_HEALTH;
        self.kills = 0;
        self.game_over = false;
        self.path = Path::new(self.path.seed(), self.path.width(), self.path.height());
        self.currency = self.starting_currency();
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        if self.game_over || !self.waves.take_spawn() {
            return;
        }
        let enemy = Enemy::spawn(kind, self.multipliers().enemy_health, &self.path);
        let health = enemy.health;
        let id = self.enemies.insert(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            health,
        });
    }

    fn advance_enemies(&mut self) {
        if self.game_over {
            return;
        }
        let speed_multiplier = self.abilities.effects().enemy_speed_multiplier;
        for id in self.enemies.ids() {
            if let Some(enemy) = self.enemies.get_mut(id) {
                enemy.advance(&self.path, speed_multiplier);
                let _ = enemy.expire_slow(self.now);
            }
        }
    }

    fn assign_targets(&mut self, targets: Vec<TowerTarget>) {
        for tower in self.towers.iter_mut() {
            tower.target = None;
        }
        for TowerTarget { tower, enemy } in targets {
            let live = self
                .enemies
                .get(enemy)
                .is_some_and(|candidate| candidate.is_active());
            if let Some(state) = self.towers.get_mut(tower).filter(|_| live) {
                state.target = Some(enemy);
            }
        }
    }

    fn fire_projectile(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        let effects = self.abilities.effects();
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        if !tower.is_ready(self.now, &effects) {
            return;
        }
        let Some(enemy) = self.enemies.get(target).filter(|enemy| enemy.is_active()) else {
            return;
        };
        if enemy.is_flying() && !tower.kind.targets_flying() {
            return;
        }

        self.projectiles.push(Projectile::launch(
            tower_id,
            tower.position,
            target,
            enemy.position,
            tower.effective_damage(),
        ));
        tower.last_shot = Some(self.now);
        out_events.push(Event::ProjectileFired {
            tower: tower_id,
            target,
        });
    }

    fn resolve_projectiles(&mut self, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut survivors = Vec::with_capacity(in_flight.len());
        for mut projectile in in_flight {
            let Some(tower) = self.towers.get(projectile.tower) else {
                continue;
            };
            let origin = tower.position;
            let max_travel = tower.effective_range() * 2.0;
            let behavior = tower.behavior();

            projectile.advance();
            let Some(enemy) = self
                .enemies
                .get(projectile.target)
                .filter(|enemy| enemy.is_active())
            else {
                continue;
            };

            if projectile.collides(enemy.position, enemy.size) {
                projectile.mark_hit();
                let summary = combat::resolve_hit(
                    Hit {
                        tower: projectile.tower,
                        behavior,
                        impact: projectile.position,
                        target: projectile.target,
                        damage: projectile.damage,
                    },
                    self.now,
                    &mut self.enemies,
                    out_events,
                );
                if let Some(tower) = self.towers.get_mut(projectile.tower) {
                    tower.total_damage += summary.damage;
                    tower.kills += summary.kills;
                }
                continue;
            }

            if projectile.position.distance(origin) <= max_travel {
                survivors.push(projectile);
            }
        }
        self.projectiles = survivors;
    }

    fn resolve_casualties(&mut self, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        let reward_multiplier = self.multipliers().enemy_reward * self.research.economy;
        for id in self.enemies.ids() {
            let Some(enemy) = self.enemies.get(id) else {
                continue;
            };
            if enemy.reached_end() {
                let Some(enemy) = self.enemies.remove(id) else {
                    continue;
                };
                self.waves.record_leak();
                let blocked = self.abilities.effects().incoming_damage_blocked;
                if !blocked {
                    self.base_health = self.base_health.saturating_sub(LEAK_PENALTY);
                }
                out_events.push(Event::EnemyLeaked {
                    enemy: id,
                    kind: enemy.kind,
                    base_health: self.base_health,
                    blocked,
                });
                if self.base_health == 0 {
                    self.end_game(out_events);
                    return;
                }
            } else if enemy.is_dead() {
                let Some(enemy) = self.enemies.remove(id) else {
                    continue;
                };
                let reward = (f64::from(enemy.reward) * reward_multiplier).floor() as u32;
                self.currency = self.currency.saturating_add(reward);
                self.kills += 1;
                out_events.push(Event::EnemyKilled {
                    enemy: id,
                    kind: enemy.kind,
                    reward,
                    tower: enemy.killed_by,
                });
                if enemy.should_split() {
                    let children = enemy
                        .split_children()
                        .into_iter()
                        .map(|child| self.enemies.insert(child))
                        .collect();
                    out_events.push(Event::EnemySplit {
                        parent: id,
                        children,
                    });
                }
            }
        }

        if self.waves.is_complete(!self.enemies.is_empty()) {
            let outcome = self.waves.complete(self.now, self.dynamic_difficulty);
            self.currency = self.currency.saturating_add(outcome.bonus);
            tracing::info!(
                wave = outcome.wave,
                leaks = outcome.leaks,
                bonus = outcome.bonus,
                "wave completed"
            );
            out_events.push(Event::WaveCompleted {
                wave: outcome.wave,
                leaks: outcome.leaks,
                perfect: outcome.perfect,
                bonus: outcome.bonus,
                research_points: outcome.research_points,
            });
        }
    }

    fn end_game(&mut self, out_events: &mut Vec<Event>) {
        self.game_over = true;
        tracing::info!(wave = self.waves.wave(), kills = self.kills, "game over");
        out_events.push(Event::GameOver {
            wave: self.waves.wave(),
            kills: self.kills,
        });
    }

    fn place_tower(&mut self, kind: TowerKind, position: Vec2, out_events: &mut Vec<Event>) {
        let cost = kind.profile().cost;
        let rejection = if self.path.is_near_path(position, PATH_CLEARANCE) {
            Some(PlacementError::OnPath)
        } else if self.towers.crowds(position, TOWER_SPACING) {
            Some(PlacementError::TooCloseToTower)
        } else if self.currency < cost {
            Some(PlacementError::InsufficientFunds)
        } else {
            None
        };
        if let Some(reason) = rejection {
            reject(
                out_events,
                Event::TowerPlacementRejected {
                    kind,
                    position,
                    reason,
                },
            );
            return;
        }

        self.currency -= cost;
        let tower = self.towers.insert(kind, position, self.research);
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            cost,
        });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get_mut(tower) else {
            reject(
                out_events,
                Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MissingTower,
                },
            );
            return;
        };
        let cost = state.upgrade_cost;
        if self.currency < cost {
            reject(
                out_events,
                Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::InsufficientFunds,
                },
            );
            return;
        }

        self.currency -= cost;
        state.upgrade();
        out_events.push(Event::TowerUpgraded {
            tower,
            level: state.level,
            cost,
        });
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.remove(tower) else {
            reject(
                out_events,
                Event::TowerSaleRejected {
                    tower,
                    reason: SellError::MissingTower,
                },
            );
            return;
        };
        let refund = state.sell_value();
        self.currency = self.currency.saturating_add(refund);
        out_events.push(Event::TowerSold { tower, refund });
    }

    fn set_targeting_mode(
        &mut self,
        tower: TowerId,
        mode: TargetingMode,
        out_events: &mut Vec<Event>,
    ) {
        match self.towers.get_mut(tower) {
            Some(state) => {
                state.targeting_mode = mode;
                out_events.push(Event::TargetingModeChanged { tower, mode });
            }
            None => reject(
                out_events,
                Event::TargetingModeRejected {
                    tower,
                    reason: TargetingError::MissingTower,
                },
            ),
        }
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.waves.check_start(self.now, self.game_over) {
            reject(out_events, Event::WaveStartRejected { reason });
            return;
        }

        let enemy_count = self.waves.start();
        let spawn_interval = waves::spawn_interval(self.multipliers().spawn_rate);
        tracing::info!(wave = self.waves.wave(), enemy_count, "wave started");
        out_events.push(Event::WaveStarted {
            wave: self.waves.wave(),
            seed: self.path.seed(),
            enemy_count,
            spawn_interval,
        });
    }

    fn activate_ability(&mut self, kind: AbilityKind, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.abilities.check(kind, self.now, self.currency) {
            reject(out_events, Event::AbilityRejected { kind, reason });
            return;
        }

        self.currency -= kind.profile().cost;
        let until = self.abilities.activate(kind, self.now);
        out_events.push(Event::AbilityActivated { kind, until });
    }

    fn execute_airstrike(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        if !self.abilities.disarm_airstrike() {
            reject(
                out_events,
                Event::AirstrikeRejected {
                    position,
                    reason: AirstrikeError::NotArmed,
                },
            );
            return;
        }

        let hits = combat::airstrike(&mut self.enemies, position, out_events);
        out_events.push(Event::AirstrikeExecuted { position, hits });
    }

    fn set_difficulty(&mut self, difficulty: Difficulty, out_events: &mut Vec<Event>) {
        if self.waves.has_started() {
            reject(
                out_events,
                Event::DifficultyChangeRejected {
                    difficulty,
                    reason: DifficultyError::Locked,
                },
            );
            return;
        }

        self.difficulty = difficulty;
        self.currency = self.starting_currency();
        out_events.push(Event::DifficultyChanged {
            difficulty,
            currency: self.currency,
        });
    }
}

fn reject(out_events: &mut Vec<Event>, event: Event) {
    tracing::debug!(?event, "command rejected");
    out_events.push(event);
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureCanvas { width, height } => {
            if world.path.set_canvas_size(width, height) {
                for id in world.enemies.ids() {
                    if let Some(enemy) = world.enemies.get_mut(id) {
                        enemy.reposition(&world.path);
                    }
                }
                out_events.push(world.map_generated());
            }
        }
        Command::RegenerateMap { seed } => {
            world.path = Path::new(seed, world.path.width(), world.path.height());
            world.towers.clear();
            world.enemies.clear();
            world.projectiles.clear();
            out_events.push(world.map_generated());
        }
        Command::Restart => {
            world.reset();
            out_events.push(Event::GameRestarted {
                currency: world.currency,
            });
            out_events.push(world.map_generated());
        }
        Command::SetDifficulty { difficulty } => world.set_difficulty(difficulty, out_events),
        Command::SetDynamicDifficulty { enabled } => {
            world.dynamic_difficulty = enabled;
            out_events.push(Event::DynamicDifficultyToggled { enabled });
        }
        Command::ConfigureResearch { modifiers } => {
            world.research = modifiers;
            out_events.push(Event::ResearchConfigured { modifiers });
        }
        Command::Tick { now } => {
            if world.game_over {
                return;
            }
            world.now = world.now.max(now);
            for kind in world.abilities.expire(world.now) {
                out_events.push(Event::AbilityExpired { kind });
            }
            out_events.push(Event::TimeAdvanced { now: world.now });
        }
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::AdvanceEnemies => world.advance_enemies(),
        Command::SetSupportMultipliers { tower, multipliers } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.support = multipliers;
            }
        }
        Command::AssignTargets { targets } => world.assign_targets(targets),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::ResolveProjectiles => world.resolve_projectiles(out_events),
        Command::ResolveCasualties => world.resolve_casualties(out_events),
        Command::PlaceTower { kind, position } => world.place_tower(kind, position, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::SetTargetingMode { tower, mode } => {
            world.set_targeting_mode(tower, mode, out_events);
        }
        Command::StartWave => world.start_wave(out_events),
        Command::ActivateAbility { kind } => world.activate_ability(kind, out_events),
        Command::ExecuteAirstrike { position } => world.execute_airstrike(position, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use seedpath_core::{
        AbilityKind, Difficulty, DifficultyMultipliers, EnemyView, ResearchModifiers,
        SimulationEffects, TowerCooldownView, TowerId, TowerStats, TowerView, WaveStatus,
    };
    use seedpath_system_path_generation::Path;

    use super::World;

    /// Path enemies currently follow.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Seed the current map was generated from.
    #[must_use]
    pub fn seed(world: &World) -> u32 {
        world.path.seed()
    }

    /// Captures a read-only view of the live enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|(_, enemy)| enemy.is_active())
                .map(|(id, enemy)| enemy.snapshot(id))
                .collect(),
        )
    }

    /// Number of enemies still held by the world, including unresolved casualties.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the towers ordered by identifier.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the shot timing of every tower ordered by identifier.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(world.towers.iter().map(|tower| tower.cooldown()).collect())
    }

    /// Player-facing statistics of a single tower.
    #[must_use]
    pub fn tower_stats(world: &World, tower: TowerId) -> Option<TowerStats> {
        world.towers.get(tower).map(|state| state.stats())
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Currency available to the player.
    #[must_use]
    pub fn currency(world: &World) -> u32 {
        world.currency
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.base_health
    }

    /// Enemies killed since the last restart.
    #[must_use]
    pub fn kills(world: &World) -> u32 {
        world.kills
    }

    /// Latest simulated time observed by the world.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Global effects currently applied by abilities.
    #[must_use]
    pub fn effects(world: &World) -> SimulationEffects {
        world.abilities.effects()
    }

    /// Whether the ability is inside its active window.
    #[must_use]
    pub fn ability_active(world: &World, kind: AbilityKind) -> bool {
        world.abilities.is_active(kind)
    }

    /// Whether an activation would be accepted right now.
    #[must_use]
    pub fn can_activate(world: &World, kind: AbilityKind) -> bool {
        world.abilities.check(kind, world.now, world.currency).is_ok()
    }

    /// Selected difficulty level.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Difficulty multipliers in force, dynamic adjustment included.
    #[must_use]
    pub fn difficulty_multipliers(world: &World) -> DifficultyMultipliers {
        world.multipliers()
    }

    /// Whether performance based adjustment is enabled.
    #[must_use]
    pub fn dynamic_difficulty(world: &World) -> bool {
        world.dynamic_difficulty
    }

    /// Research multipliers applied to newly built towers.
    #[must_use]
    pub fn research(world: &World) -> ResearchModifiers {
        world.research
    }

    /// Wave number, spawn quota and countdown.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        world.waves.status(world.now, world.game_over)
    }

    /// Whether base health has run out.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Seedpath tower-defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! Time never comes from a wall clock inside the simulation. Every stateful
//! step receives the current simulated time through [`Command::Tick`].

mod catalog;
mod rng;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    AbilityKind, AbilityProfile, Difficulty, DifficultyMultipliers, EnemyCapabilities, EnemyKind,
    EnemyProfile, Regeneration, ResearchModifiers, SplitRule, TargetingMode, TowerBehavior,
    TowerKind, TowerProfile, UnknownDifficulty,
};
pub use rng::{clock_seed, SeededRandom};

/// Canvas width used when none is configured.
pub const DEFAULT_CANVAS_WIDTH: f32 = 1200.0;

/// Canvas height used when none is configured.
pub const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;

/// Base health the player starts every game with.
pub const STARTING_BASE_HEALTH: u32 = 100;

/// Currency granted at the start of a game before difficulty scaling.
pub const BASE_STARTING_CURRENCY: u32 = 500;

/// Number of enemies scheduled for the provided one-based wave number.
#[must_use]
pub const fn wave_enemy_count(wave: u32) -> u32 {
    10 + wave * 2 + (wave / 3 + 1) * 5
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the canvas and regenerates the path with the current seed.
    ConfigureCanvas {
        /// Requested canvas width in world units.
        width: f32,
        /// Requested canvas height in world units.
        height: f32,
    },
    /// Replaces the map with one generated from a new seed.
    RegenerateMap {
        /// Seed used to generate the new path.
        seed: u32,
    },
    /// Resets economy, waves, towers and enemies and rebuilds the same map.
    Restart,
    /// Selects a difficulty level before the first wave.
    SetDifficulty {
        /// Level to activate.
        difficulty: Difficulty,
    },
    /// Enables or disables performance based difficulty adjustment.
    SetDynamicDifficulty {
        /// Whether adjustments are applied after each wave.
        enabled: bool,
    },
    /// Installs research multipliers applied to subsequently built towers.
    ConfigureResearch {
        /// Multipliers granted by the research layer.
        modifiers: ResearchModifiers,
    },
    /// Advances the simulation clock to the provided time.
    Tick {
        /// Monotonic simulated time supplied by the caller.
        now: Duration,
    },
    /// Spawns an enemy of the provided kind at the start of the path.
    SpawnEnemy {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
    },
    /// Moves every live enemy one step along the path.
    AdvanceEnemies,
    /// Replaces the aura multipliers applied to a tower.
    SetSupportMultipliers {
        /// Tower receiving the multipliers.
        tower: TowerId,
        /// Multipliers to apply.
        multipliers: SupportMultipliers,
    },
    /// Installs the current target of every tower; absent towers lose theirs.
    AssignTargets {
        /// Target selected for each tower that has one.
        targets: Vec<TowerTarget>,
    },
    /// Launches a projectile from a tower towards an enemy's current position.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile is bound to.
        target: EnemyId,
    },
    /// Moves projectiles and resolves their hits.
    ResolveProjectiles,
    /// Pays rewards, splits and removes dead enemies, and charges leaks.
    ResolveCasualties,
    /// Requests construction of a tower at the provided position.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Centre of the tower in world units.
        position: Vec2,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Requests that a tower be sold for a partial refund.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Changes the targeting rule of a tower.
    SetTargetingMode {
        /// Tower to reconfigure.
        tower: TowerId,
        /// Rule to apply.
        mode: TargetingMode,
    },
    /// Starts the next wave.
    StartWave,
    /// Activates a global ability.
    ActivateAbility {
        /// Ability to activate.
        kind: AbilityKind,
    },
    /// Detonates an armed airstrike at the provided position.
    ExecuteAirstrike {
        /// Centre of the strike in world units.
        position: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated time after the tick.
        now: Duration,
    },
    /// Announces that a path was generated.
    MapGenerated {
        /// Seed the path was generated from.
        seed: u32,
        /// Canvas width after clamping.
        width: f32,
        /// Canvas height after clamping.
        height: f32,
        /// Number of smoothed waypoints in the path.
        waypoints: usize,
    },
    /// Confirms that the game was reset.
    GameRestarted {
        /// Currency available after the reset.
        currency: u32,
    },
    /// Confirms a difficulty change.
    DifficultyChanged {
        /// Level now active.
        difficulty: Difficulty,
        /// Currency available after the change.
        currency: u32,
    },
    /// Reports that a difficulty change was refused.
    DifficultyChangeRejected {
        /// Level that was requested.
        difficulty: Difficulty,
        /// Reason for the refusal.
        reason: DifficultyError,
    },
    /// Confirms the dynamic difficulty toggle.
    DynamicDifficultyToggled {
        /// Whether adjustments are now applied.
        enabled: bool,
    },
    /// Confirms new research multipliers.
    ResearchConfigured {
        /// Multipliers now in effect for new towers.
        modifiers: ResearchModifiers,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Health after difficulty scaling.
        health: f32,
    },
    /// Reports damage dealt to an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage dealt before shield absorption.
        amount: f32,
        /// Tower credited with the damage, if any.
        tower: Option<TowerId>,
    },
    /// Reports an enemy transitioning from alive to dead.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Currency awarded for the kill.
        reward: u32,
        /// Tower credited with the kill, if any.
        tower: Option<TowerId>,
    },
    /// Reports that a dead splitting enemy released children.
    EnemySplit {
        /// Enemy that split.
        parent: EnemyId,
        /// Children spawned at the parent's progress.
        children: Vec<EnemyId>,
    },
    /// Reports an enemy reaching the end of the path alive.
    EnemyLeaked {
        /// Enemy that leaked.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Base health remaining after the leak.
        base_health: u32,
        /// Whether an active shield ability absorbed the penalty.
        blocked: bool,
    },
    /// Confirms that a tower was built.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Kind of tower built.
        kind: TowerKind,
        /// Centre of the tower.
        position: Vec2,
        /// Currency spent.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Requested centre.
        position: Vec2,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Confirms a tower upgrade.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level after the upgrade.
        level: u32,
        /// Currency spent.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower named by the request.
        tower: TowerId,
        /// Reason for the rejection.
        reason: UpgradeError,
    },
    /// Confirms a tower sale.
    TowerSold {
        /// Tower that was removed.
        tower: TowerId,
        /// Currency refunded.
        refund: u32,
    },
    /// Reports that a sale request was rejected.
    TowerSaleRejected {
        /// Tower named by the request.
        tower: TowerId,
        /// Reason for the rejection.
        reason: SellError,
    },
    /// Confirms a targeting rule change.
    TargetingModeChanged {
        /// Tower that was reconfigured.
        tower: TowerId,
        /// Rule now in effect.
        mode: TargetingMode,
    },
    /// Reports that a targeting change was rejected.
    TargetingModeRejected {
        /// Tower named by the request.
        tower: TowerId,
        /// Reason for the rejection.
        reason: TargetingError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile is bound to.
        target: EnemyId,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Seed of the map the wave runs on.
        seed: u32,
        /// Number of enemies the wave spawns.
        enemy_count: u32,
        /// Time between consecutive spawns.
        spawn_interval: Duration,
    },
    /// Reports that a wave could not start.
    WaveStartRejected {
        /// Reason for the rejection.
        reason: WaveError,
    },
    /// Announces the end of a wave.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
        /// Enemies that leaked during the wave.
        leaks: u32,
        /// Whether nothing leaked.
        perfect: bool,
        /// Currency bonus paid for the wave.
        bonus: u32,
        /// Research points earned for the wave.
        research_points: u32,
    },
    /// Confirms an ability activation.
    AbilityActivated {
        /// Ability that was activated.
        kind: AbilityKind,
        /// Time at which the effect ends.
        until: Duration,
    },
    /// Reports that an ability activation was rejected.
    AbilityRejected {
        /// Ability that was requested.
        kind: AbilityKind,
        /// Reason for the rejection.
        reason: AbilityError,
    },
    /// Reports that an ability effect ended.
    AbilityExpired {
        /// Ability whose effect ended.
        kind: AbilityKind,
    },
    /// Confirms an airstrike detonation.
    AirstrikeExecuted {
        /// Centre of the strike.
        position: Vec2,
        /// Number of enemies damaged.
        hits: u32,
    },
    /// Reports that an airstrike request was rejected.
    AirstrikeRejected {
        /// Requested centre.
        position: Vec2,
        /// Reason for the rejection.
        reason: AirstrikeError,
    },
    /// Announces that the base was destroyed.
    GameOver {
        /// Wave during which the base fell.
        wave: u32,
        /// Enemies killed over the whole game.
        kills: u32,
    },
}

/// Generational handle of an enemy stored in the world's arena.
///
/// The generation advances every time a slot is reused, so a stale handle
/// held by a tower or projectile never resolves to a newer enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Unique identifier assigned to each tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Aura multipliers applied to a tower by nearby support towers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportMultipliers {
    /// Scales the tower's damage.
    pub damage: f32,
    /// Scales the tower's range.
    pub range: f32,
}

impl SupportMultipliers {
    /// Multipliers of a tower outside every aura.
    pub const NEUTRAL: Self = Self {
        damage: 1.0,
        range: 1.0,
    };
}

impl Default for SupportMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Global flags mutated only by ability activation and expiry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationEffects {
    /// Divides every tower's fire interval.
    pub fire_rate_multiplier: f32,
    /// Scales every enemy's speed.
    pub enemy_speed_multiplier: f32,
    /// Leaks cost no base health while set.
    pub incoming_damage_blocked: bool,
    /// The next airstrike request detonates while set.
    pub airstrike_armed: bool,
}

impl SimulationEffects {
    /// Effects with no ability active.
    pub const NEUTRAL: Self = Self {
        fire_rate_multiplier: 1.0,
        enemy_speed_multiplier: 1.0,
        incoming_damage_blocked: false,
        airstrike_armed: false,
    };

    /// Interval between shots of a tower whose base interval is `base`.
    ///
    /// A non-positive multiplier leaves the interval unchanged.
    #[must_use]
    pub fn fire_interval(&self, base: Duration) -> Duration {
        if self.fire_rate_multiplier > 0.0 {
            base.div_f64(f64::from(self.fire_rate_multiplier))
        } else {
            base
        }
    }
}

impl Default for SimulationEffects {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The position lies too close to the enemy path.
    #[error("towers cannot be placed on the path")]
    OnPath,
    /// The position lies too close to an existing tower.
    #[error("too close to another tower")]
    TooCloseToTower,
    /// The player cannot afford the tower.
    #[error("insufficient currency")]
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The player cannot afford the upgrade.
    #[error("insufficient currency")]
    InsufficientFunds,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SellError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Reasons a targeting change may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum TargetingError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Reasons a wave may not start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveError {
    /// A wave is still running.
    #[error("a wave is already in progress")]
    InProgress,
    /// The pause between waves has not elapsed.
    #[error("the next wave is still counting down")]
    CountdownActive,
    /// The base has fallen.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a difficulty change may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DifficultyError {
    /// Difficulty is locked once the first wave starts.
    #[error("difficulty can only change before the first wave")]
    Locked,
}

/// Reasons an ability activation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AbilityError {
    /// The player cannot afford the ability.
    #[error("insufficient currency")]
    InsufficientFunds,
    /// The cooldown since the previous use has not elapsed.
    #[error("ability is cooling down")]
    CoolingDown,
    /// The ability's effect is still running.
    #[error("ability is already active")]
    AlreadyActive,
}

/// Reasons an airstrike request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AirstrikeError {
    /// No airstrike has been armed.
    #[error("no airstrike is armed")]
    NotArmed,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current position in world units.
    pub position: Vec2,
    /// Fraction of the path covered.
    pub progress: f32,
    /// Current health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Remaining shield capacity.
    pub shield: f32,
    /// Collision radius.
    pub size: f32,
    /// Facing angle in radians.
    pub angle: f32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Whether a slow is currently applied.
    pub slowed: bool,
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view from snapshots already ordered by spawn time.
    ///
    /// The order is preserved because targeting ties resolve to the first
    /// enemy encountered.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Vec2,
    /// Upgrade level, starting at one.
    pub level: u32,
    /// Range before aura multipliers.
    pub base_range: f32,
    /// Range after aura multipliers.
    pub effective_range: f32,
    /// Active targeting rule.
    pub targeting_mode: TargetingMode,
    /// Enemy currently targeted.
    pub target: Option<EnemyId>,
    /// Aura multipliers currently applied.
    pub support: SupportMultipliers,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Target chosen for a tower during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerTarget {
    /// Tower that aims.
    pub tower: TowerId,
    /// Enemy being aimed at.
    pub enemy: EnemyId,
}

/// Shot timing of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower described by the snapshot.
    pub tower: TowerId,
    /// Kind of the tower; support towers never fire.
    pub kind: TowerKind,
    /// Interval between shots before ability effects.
    pub fire_interval: Duration,
    /// Time of the last shot, `None` if the tower never fired.
    pub last_shot: Option<Duration>,
}

/// Read-only snapshot of every tower's cooldown.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a view sorted by tower identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Timing of a single tower, if it is part of the view.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerCooldownSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.tower)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Iterator over the snapshots in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Player facing statistics of a tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerStats {
    /// Lowercase name of the tower kind.
    pub name: &'static str,
    /// Upgrade level.
    pub level: u32,
    /// Damage per hit before aura multipliers.
    pub damage: f32,
    /// Range after aura multipliers.
    pub range: f32,
    /// Interval between shots.
    pub fire_rate: Duration,
    /// Damage per second including aura multipliers; zero for support towers.
    pub dps: f32,
    /// Enemies killed by the tower.
    pub kills: u32,
    /// Damage dealt over the tower's lifetime.
    pub total_damage: f32,
    /// Cost of the next upgrade.
    pub upgrade_cost: u32,
    /// Currency refunded if sold now.
    pub sell_value: u32,
    /// Active targeting rule.
    pub targeting_mode: TargetingMode,
}

/// Progress of the wave lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Number of the current or last wave; zero before the first.
    pub wave: u32,
    /// Whether a wave is running.
    pub in_progress: bool,
    /// Enemies of the running wave not yet spawned.
    pub remaining_spawns: u32,
    /// Time left before the next wave may start.
    pub countdown: Option<Duration>,
    /// Whether the base has fallen.
    pub game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::{
        wave_enemy_count, AbilityKind, Difficulty, EnemyId, EnemyKind, PlacementError,
        SimulationEffects, TargetingMode, TowerId, TowerKind, UnknownDifficulty, WaveError,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&EnemyId::new(7, 3));
    }

    #[test]
    fn kinds_and_errors_round_trip_through_bincode() {
        assert_round_trip(&TowerKind::Chain);
        assert_round_trip(&EnemyKind::Splitting);
        assert_round_trip(&AbilityKind::FreezeWave);
        assert_round_trip(&Difficulty::Nightmare);
        assert_round_trip(&PlacementError::TooCloseToTower);
        assert_round_trip(&WaveError::CountdownActive);
    }

    #[test]
    fn simulation_effects_round_trip_through_bincode() {
        let effects = SimulationEffects {
            fire_rate_multiplier: 2.0,
            enemy_speed_multiplier: 0.1,
            incoming_damage_blocked: true,
            airstrike_armed: false,
        };
        assert_round_trip(&effects);
    }

    #[test]
    fn speed_boost_halves_the_fire_interval() {
        let base = std::time::Duration::from_millis(1_000);
        assert_eq!(SimulationEffects::NEUTRAL.fire_interval(base), base);

        let boosted = SimulationEffects {
            fire_rate_multiplier: 2.0,
            ..SimulationEffects::NEUTRAL
        };
        assert_eq!(
            boosted.fire_interval(base),
            std::time::Duration::from_millis(500)
        );

        let stalled = SimulationEffects {
            fire_rate_multiplier: 0.0,
            ..SimulationEffects::NEUTRAL
        };
        assert_eq!(stalled.fire_interval(base), base);
    }

    #[test]
    fn difficulty_names_parse_back_to_their_level() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.name().parse(), Ok(difficulty));
        }
        assert_eq!(" HARD ".parse(), Ok(Difficulty::Hard));
        assert_eq!(
            "brutal".parse::<Difficulty>(),
            Err(UnknownDifficulty("brutal".to_owned()))
        );
    }

    #[test]
    fn targeting_mode_cycles_through_every_rule() {
        let mut mode = TargetingMode::Closest;
        let mut visited = Vec::new();
        for _ in 0..5 {
            visited.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, TargetingMode::Closest);
        assert_eq!(
            visited,
            vec![
                TargetingMode::Closest,
                TargetingMode::Farthest,
                TargetingMode::Strongest,
                TargetingMode::Weakest,
                TargetingMode::First,
            ]
        );
    }

    #[test]
    fn unknown_kind_names_fall_back_to_basic() {
        assert_eq!(EnemyKind::from_name("dragon"), EnemyKind::Basic);
        assert_eq!(EnemyKind::from_name("Shielded"), EnemyKind::Shielded);
        assert_eq!(TowerKind::from_name("laser"), TowerKind::Basic);
        assert_eq!(TowerKind::from_name("chain"), TowerKind::Chain);
    }

    #[test]
    fn capabilities_follow_the_behavior_table() {
        let shielded = EnemyKind::Shielded.capabilities();
        assert!(shielded.has_shield && !shielded.splits);
        assert!(EnemyKind::Flying.capabilities().is_flying);
        assert!(EnemyKind::Regenerating.capabilities().regenerates);
        assert!(EnemyKind::Splitting.capabilities().splits);
        assert_eq!(
            EnemyKind::Basic.capabilities(),
            super::EnemyCapabilities::default()
        );
    }

    #[test]
    fn only_cannons_ignore_flying_enemies() {
        for kind in TowerKind::ALL {
            assert_eq!(kind.targets_flying(), kind != TowerKind::Cannon);
        }
    }

    #[test]
    fn wave_sizes_grow_with_wave_number() {
        assert_eq!(wave_enemy_count(1), 17);
        assert_eq!(wave_enemy_count(3), 26);
        assert_eq!(wave_enemy_count(10), 50);
    }
}

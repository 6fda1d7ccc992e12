//! Static stat tables for every enemy, tower, ability and difficulty kind.

use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Types of enemies that travel along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy without special behaviour.
    Basic,
    /// Quick, fragile enemy.
    Fast,
    /// Slow enemy with a large health pool.
    Tank,
    /// Rare, very durable enemy worth a large reward.
    Boss,
    /// Airborne enemy that ground-only towers cannot target.
    Flying,
    /// Enemy carrying a shield that absorbs damage before health.
    Shielded,
    /// Enemy that periodically heals while alive.
    Regenerating,
    /// Enemy that breaks into basic enemies when killed.
    Splitting,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Boss,
        EnemyKind::Flying,
        EnemyKind::Shielded,
        EnemyKind::Regenerating,
        EnemyKind::Splitting,
    ];

    /// Returns the immutable stat profile bound to the kind.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::Basic => EnemyProfile::plain("basic", 50.0, 0.0003, 10, 20.0),
            Self::Fast => EnemyProfile::plain("fast", 30.0, 0.0005, 15, 18.0),
            Self::Tank => EnemyProfile::plain("tank", 150.0, 0.0002, 25, 28.0),
            Self::Boss => EnemyProfile::plain("boss", 500.0, 0.000_15, 100, 35.0),
            Self::Flying => EnemyProfile {
                flying: true,
                ..EnemyProfile::plain("flying", 40.0, 0.0004, 20, 18.0)
            },
            Self::Shielded => EnemyProfile {
                shield: Some(30.0),
                ..EnemyProfile::plain("shielded", 80.0, 0.000_25, 20, 22.0)
            },
            Self::Regenerating => EnemyProfile {
                regeneration: Some(Regeneration {
                    amount: 5.0,
                    interval_ticks: 30,
                }),
                ..EnemyProfile::plain("regenerating", 100.0, 0.000_25, 25, 24.0)
            },
            Self::Splitting => EnemyProfile {
                split: Some(SplitRule {
                    count: 2,
                    child: EnemyKind::Basic,
                }),
                ..EnemyProfile::plain("splitting", 120.0, 0.000_25, 30, 26.0)
            },
        }
    }

    /// Reports the capability flags of the kind.
    #[must_use]
    pub const fn capabilities(self) -> EnemyCapabilities {
        let profile = self.profile();
        EnemyCapabilities {
            has_shield: profile.shield.is_some(),
            regenerates: profile.regeneration.is_some(),
            splits: profile.split.is_some(),
            is_flying: profile.flying,
        }
    }

    /// Lowercase name used in text formats.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.profile().name
    }

    /// Parses a kind from its lowercase name, falling back to [`EnemyKind::Basic`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Self::Basic)
    }
}

/// Immutable base statistics of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    /// Lowercase display name.
    pub name: &'static str,
    /// Health before difficulty scaling.
    pub max_health: f32,
    /// Fraction of the path covered per tick.
    pub speed: f32,
    /// Currency awarded on kill before multipliers.
    pub reward: u32,
    /// Collision radius in world units.
    pub size: f32,
    /// Shield capacity, when the kind carries one.
    pub shield: Option<f32>,
    /// Healing behaviour, when the kind regenerates.
    pub regeneration: Option<Regeneration>,
    /// Split behaviour, when the kind breaks apart on death.
    pub split: Option<SplitRule>,
    /// Whether the kind flies over ground-only defences.
    pub flying: bool,
}

impl EnemyProfile {
    const fn plain(name: &'static str, max_health: f32, speed: f32, reward: u32, size: f32) -> Self {
        Self {
            name,
            max_health,
            speed,
            reward,
            size,
            shield: None,
            regeneration: None,
            split: None,
            flying: false,
        }
    }
}

/// Periodic healing applied to regenerating enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Regeneration {
    /// Health restored per pulse.
    pub amount: f32,
    /// Number of movement ticks between pulses.
    pub interval_ticks: u32,
}

/// Describes the children produced when a splitting enemy dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitRule {
    /// Number of children spawned.
    pub count: u32,
    /// Kind assigned to every child.
    pub child: EnemyKind,
}

/// Capability set derived from an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct EnemyCapabilities {
    /// The kind spawns with a shield.
    pub has_shield: bool,
    /// The kind heals over time.
    pub regenerates: bool,
    /// The kind splits on death.
    pub splits: bool,
    /// The kind is airborne.
    pub is_flying: bool,
}

/// Types of towers the player may construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// All-round single target tower.
    Basic,
    /// Fast firing, low damage tower.
    Rapid,
    /// Long range, high damage tower.
    Sniper,
    /// Ground-only tower dealing splash damage.
    Cannon,
    /// Tower that slows what it hits.
    Debuff,
    /// Tower that boosts nearby towers and never fires.
    Support,
    /// Tower whose hits arc between nearby enemies.
    Chain,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 7] = [
        TowerKind::Basic,
        TowerKind::Rapid,
        TowerKind::Sniper,
        TowerKind::Cannon,
        TowerKind::Debuff,
        TowerKind::Support,
        TowerKind::Chain,
    ];

    /// Returns the base statistics of the kind.
    #[must_use]
    pub const fn profile(self) -> TowerProfile {
        match self {
            Self::Basic => {
                TowerProfile::new("basic", 15.0, 150.0, 1_000, 50, 30, TowerBehavior::SingleTarget)
            }
            Self::Rapid => {
                TowerProfile::new("rapid", 8.0, 120.0, 300, 100, 50, TowerBehavior::SingleTarget)
            }
            Self::Sniper => {
                TowerProfile::new("sniper", 50.0, 300.0, 2_000, 150, 75, TowerBehavior::SingleTarget)
            }
            Self::Cannon => TowerProfile::new(
                "cannon",
                40.0,
                180.0,
                1_500,
                200,
                100,
                TowerBehavior::Area { radius: 60.0 },
            ),
            Self::Debuff => TowerProfile::new(
                "debuff",
                5.0,
                200.0,
                2_000,
                175,
                90,
                TowerBehavior::Debuff {
                    slow: 0.5,
                    duration: Duration::from_millis(3_000),
                },
            ),
            Self::Support => TowerProfile::new(
                "support",
                0.0,
                250.0,
                0,
                150,
                80,
                TowerBehavior::Support {
                    damage_boost: 1.3,
                    range_boost: 1.2,
                },
            ),
            Self::Chain => TowerProfile::new(
                "chain",
                25.0,
                160.0,
                1_200,
                225,
                110,
                TowerBehavior::Chain {
                    hops: 3,
                    hop_range: 100.0,
                    falloff: 0.7,
                },
            ),
        }
    }

    /// Reports whether towers of this kind may target flying enemies.
    #[must_use]
    pub const fn targets_flying(self) -> bool {
        !matches!(self, Self::Cannon)
    }

    /// Reports whether the kind is a passive aura tower.
    #[must_use]
    pub const fn is_support(self) -> bool {
        matches!(self, Self::Support)
    }

    /// Lowercase name used in text formats.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.profile().name
    }

    /// Parses a kind from its lowercase name, falling back to [`TowerKind::Basic`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Self::Basic)
    }
}

/// Base statistics of a tower kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProfile {
    /// Lowercase display name.
    pub name: &'static str,
    /// Damage dealt per hit.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Minimum time between shots.
    pub fire_interval: Duration,
    /// Construction cost.
    pub cost: u32,
    /// Cost of the first upgrade.
    pub upgrade_cost: u32,
    /// How hits from this tower resolve.
    pub behavior: TowerBehavior,
}

impl TowerProfile {
    const fn new(
        name: &'static str,
        damage: f32,
        range: f32,
        fire_interval_ms: u64,
        cost: u32,
        upgrade_cost: u32,
        behavior: TowerBehavior,
    ) -> Self {
        Self {
            name,
            damage,
            range,
            fire_interval: Duration::from_millis(fire_interval_ms),
            cost,
            upgrade_cost,
            behavior,
        }
    }
}

/// Damage resolution strategy of a tower kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TowerBehavior {
    /// Full damage to the bound target only.
    SingleTarget,
    /// Full damage to every ground enemy within `radius` of the impact.
    ///
    /// Flying enemies are spared by the splash even when they sit inside it.
    Area {
        /// Splash radius around the impact point.
        radius: f32,
    },
    /// Damage hops to the nearest unhit enemy after the primary hit.
    Chain {
        /// Maximum number of hops after the primary target.
        hops: u32,
        /// Search radius around the current link.
        hop_range: f32,
        /// Fraction of the base damage dealt by every hop.
        falloff: f32,
    },
    /// Damage plus a timed slow on the bound target.
    Debuff {
        /// Fraction of speed removed while slowed.
        slow: f32,
        /// Length of the slow.
        duration: Duration,
    },
    /// Passive aura boosting other towers in range.
    Support {
        /// Damage multiplier granted to boosted towers.
        damage_boost: f32,
        /// Range multiplier granted to boosted towers.
        range_boost: f32,
    },
}

/// Rule a tower uses to pick among enemies in range.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetingMode {
    /// Nearest enemy to the tower.
    #[default]
    Closest,
    /// Furthest enemy from the tower that is still in range.
    Farthest,
    /// Enemy with the most current health.
    Strongest,
    /// Enemy with the least current health.
    Weakest,
    /// Enemy furthest along the path.
    First,
}

impl TargetingMode {
    /// Cycles to the following mode, wrapping after [`TargetingMode::First`].
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Closest => Self::Farthest,
            Self::Farthest => Self::Strongest,
            Self::Strongest => Self::Weakest,
            Self::Weakest => Self::First,
            Self::First => Self::Closest,
        }
    }

    /// Lowercase name of the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Closest => "closest",
            Self::Farthest => "farthest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
            Self::First => "first",
        }
    }
}

/// Global player abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Doubles the fire rate of every tower.
    SpeedBoost,
    /// Slows every enemy to a crawl.
    FreezeWave,
    /// Arms a single area strike at a chosen point.
    Airstrike,
    /// Prevents leaks from costing base health.
    Shield,
}

impl AbilityKind {
    /// Every ability in declaration order.
    pub const ALL: [AbilityKind; 4] = [
        AbilityKind::SpeedBoost,
        AbilityKind::FreezeWave,
        AbilityKind::Airstrike,
        AbilityKind::Shield,
    ];

    /// Cost and timing of the ability.
    #[must_use]
    pub const fn profile(self) -> AbilityProfile {
        match self {
            Self::SpeedBoost => AbilityProfile::new("speed_boost", 100, 30, 10),
            Self::FreezeWave => AbilityProfile::new("freeze_wave", 150, 45, 5),
            Self::Airstrike => AbilityProfile::new("airstrike", 200, 60, 0),
            Self::Shield => AbilityProfile::new("shield", 250, 90, 8),
        }
    }
}

/// Cost and timing of an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityProfile {
    /// Snake case name.
    pub name: &'static str,
    /// Currency deducted on activation.
    pub cost: u32,
    /// Time that must pass between activations.
    pub cooldown: Duration,
    /// Length of the effect; zero for instantaneous abilities.
    pub duration: Duration,
}

impl AbilityProfile {
    const fn new(name: &'static str, cost: u32, cooldown_secs: u64, duration_secs: u64) -> Self {
        Self {
            name,
            cost,
            cooldown: Duration::from_secs(cooldown_secs),
            duration: Duration::from_secs(duration_secs),
        }
    }
}

/// Selectable difficulty level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// More currency, weaker enemies.
    Easy,
    /// Neutral multipliers.
    #[default]
    Normal,
    /// Less currency, stronger enemies.
    Hard,
    /// Scarce currency, much stronger enemies.
    Nightmare,
}

impl Difficulty {
    /// Every difficulty level from easiest to hardest.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Nightmare,
    ];

    /// Lowercase name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Nightmare => "nightmare",
        }
    }

    /// Multipliers applied by the difficulty level.
    #[must_use]
    pub const fn multipliers(self) -> DifficultyMultipliers {
        match self {
            Self::Easy => DifficultyMultipliers::new(1.5, 0.7, 1.2, 0.8),
            Self::Normal => DifficultyMultipliers::NEUTRAL,
            Self::Hard => DifficultyMultipliers::new(0.7, 1.5, 0.8, 1.2),
            Self::Nightmare => DifficultyMultipliers::new(0.5, 2.0, 0.6, 1.5),
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownDifficulty(value.to_owned()))
    }
}

/// Name that matches no difficulty level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty '{0}'")]
pub struct UnknownDifficulty(pub String);

/// Economy and enemy scaling factors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultipliers {
    /// Scales starting currency.
    pub currency: f64,
    /// Scales spawned enemy health.
    pub enemy_health: f64,
    /// Scales kill rewards.
    pub enemy_reward: f64,
    /// Scales spawn frequency.
    pub spawn_rate: f64,
}

impl DifficultyMultipliers {
    /// Multipliers that leave every value unchanged.
    pub const NEUTRAL: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a multiplier set.
    #[must_use]
    pub const fn new(currency: f64, enemy_health: f64, enemy_reward: f64, spawn_rate: f64) -> Self {
        Self {
            currency,
            enemy_health,
            enemy_reward,
            spawn_rate,
        }
    }

    /// Component-wise product of two multiplier sets.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self::new(
            self.currency * other.currency,
            self.enemy_health * other.enemy_health,
            self.enemy_reward * other.enemy_reward,
            self.spawn_rate * other.spawn_rate,
        )
    }
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Multipliers granted by the research layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchModifiers {
    /// Scales tower damage at construction.
    pub damage: f64,
    /// Scales tower range at construction.
    pub range: f64,
    /// Scales the tower fire interval at construction.
    pub fire_rate: f64,
    /// Scales kill rewards.
    pub economy: f64,
}

impl ResearchModifiers {
    /// Modifiers that leave every value unchanged.
    pub const NEUTRAL: Self = Self {
        damage: 1.0,
        range: 1.0,
        fire_rate: 1.0,
        economy: 1.0,
    };
}

impl Default for ResearchModifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

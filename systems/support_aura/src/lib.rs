#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves support tower auras into multiplier commands.

use glam::Vec2;
use seedpath_core::{Command, SupportMultipliers, TowerBehavior, TowerId, TowerView};

/// Support aura system that reuses its aura buffer between ticks.
#[derive(Debug, Default)]
pub struct SupportAura {
    auras: Vec<Aura>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Aura {
    source: TowerId,
    centre: Vec2,
    radius: f32,
    multipliers: SupportMultipliers,
}

impl SupportAura {
    /// Creates a new support aura system with an empty aura buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::SetSupportMultipliers` for every tower whose multipliers
    /// differ from what the surrounding support towers grant.
    ///
    /// A tower inside any support tower's range receives that tower's boosts;
    /// one outside every range falls back to neutral multipliers. Support
    /// towers never boost each other.
    pub fn handle(&mut self, towers: &TowerView, out: &mut Vec<Command>) {
        self.auras.clear();
        for tower in towers.iter() {
            if let TowerBehavior::Support {
                damage_boost,
                range_boost,
            } = tower.kind.profile().behavior
            {
                self.auras.push(Aura {
                    source: tower.id,
                    centre: tower.position,
                    radius: tower.base_range,
                    multipliers: SupportMultipliers {
                        damage: damage_boost,
                        range: range_boost,
                    },
                });
            }
        }

        for tower in towers.iter() {
            if tower.kind.is_support() {
                continue;
            }
            let granted = self
                .auras
                .iter()
                .find(|aura| {
                    aura.source != tower.id && aura.centre.distance(tower.position) <= aura.radius
                })
                .map_or(SupportMultipliers::NEUTRAL, |aura| aura.multipliers);
            if granted != tower.support {
                out.push(Command::SetSupportMultipliers {
                    tower: tower.id,
                    multipliers: granted,
                });
            }
        }
    }
}
